/*!
 * The correction workset for one review session.
 *
 * A `ReviewSession` owns a verification result and everything the reviewer
 * does to it: point edits, bulk status changes, filtering, selection and
 * suggestions. Timecodes and mismatch flags are never touched after merge.
 */

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use uuid::Uuid;

use crate::subtitle_processor::{TimedBlock, to_srt};
use crate::verification::{AssignableStatus, VerificationItem, VerificationResult, VerificationStatus};

use super::filter::{StatusFilter, filter_items};
use super::suggestions::{PendingSuggestions, SuggestionOutcome, SuggestionTicket};

/// Status a bulk action may assign
pub type BulkStatus = AssignableStatus;

/// Number of items per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub correct: usize,
    pub minor_issue: usize,
    pub incorrect: usize,
    pub corrected: usize,
    pub timestamp_mismatch: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.correct + self.minor_issue + self.incorrect + self.corrected
    }
}

/// Mutable review state over one verification result
#[derive(Debug, Clone)]
pub struct ReviewSession {
    /// Session identifier used in log lines
    id: Uuid,
    /// Items under review
    result: VerificationResult,
    /// Active visibility filter
    filter: StatusFilter,
    /// Whether selection is enabled
    bulk_mode: bool,
    /// Selected item IDs
    selection: BTreeSet<u32>,
    /// Suggestions waiting to be applied or dismissed
    suggestions: PendingSuggestions,
}

impl ReviewSession {
    /// Open a session over a verification result.
    ///
    /// Items repeating an earlier ID are dropped so IDs stay unique.
    pub fn new(result: VerificationResult) -> Self {
        let id = Uuid::new_v4();
        let result = dedupe_items(result);
        info!(
            "Review session {} opened with {} item(s)",
            &id.to_string()[..8],
            result.items.len()
        );

        Self {
            id,
            result,
            filter: StatusFilter::default(),
            bulk_mode: false,
            selection: BTreeSet::new(),
            suggestions: PendingSuggestions::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// First eight characters of the session ID
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn result(&self) -> &VerificationResult {
        &self.result
    }

    /// Close the session, handing back the edited result
    pub fn into_result(self) -> VerificationResult {
        self.result
    }

    /// Replace the result with a fresh run, dropping selection and pending suggestions
    pub fn replace_result(&mut self, result: VerificationResult) {
        self.result = dedupe_items(result);
        self.bulk_mode = false;
        self.selection.clear();
        self.suggestions = PendingSuggestions::new();
        debug!("Session {}: result replaced", self.short_id());
    }

    pub fn items(&self) -> &[VerificationItem] {
        &self.result.items
    }

    pub fn item(&self, id: u32) -> Option<&VerificationItem> {
        self.result.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: u32) -> Option<&mut VerificationItem> {
        self.result.items.iter_mut().find(|item| item.id == id)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Replace a line's translation and mark it `corrected`.
    ///
    /// Returns `false` for an unknown ID. A pending suggestion for the line
    /// is dropped when the text changes, since it was made for the old text.
    pub fn edit_text(&mut self, id: u32, text: impl Into<String>) -> bool {
        let text = text.into();
        let Some(item) = self.item_mut(id) else {
            return false;
        };
        let changed = item.translated_text != text;
        item.translated_text = text;
        item.status = VerificationStatus::Corrected;

        if changed && self.suggestions.remove(id) {
            debug!("Session {}: dropped suggestion for edited line {}", self.short_id(), id);
        }
        true
    }

    /// Set the status of the given lines, then clear the selection.
    ///
    /// Unknown IDs are ignored. Returns the number of lines updated.
    pub fn bulk_set_status(&mut self, ids: impl IntoIterator<Item = u32>, status: BulkStatus) -> usize {
        let ids: HashSet<u32> = ids.into_iter().collect();
        let status = VerificationStatus::from(status);

        let mut updated = 0;
        for item in self.result.items.iter_mut().filter(|item| ids.contains(&item.id)) {
            item.status = status;
            updated += 1;
        }

        self.selection.clear();
        debug!("Session {}: set {} line(s) to {}", self.short_id(), updated, status);
        updated
    }

    /// Apply a status to the current selection
    pub fn apply_bulk_status(&mut self, status: BulkStatus) -> usize {
        let ids: Vec<u32> = self.selection.iter().copied().collect();
        self.bulk_set_status(ids, status)
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Change the visible subset; the selection is kept
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn visible_items(&self) -> Vec<&VerificationItem> {
        filter_items(&self.result.items, self.filter)
    }

    // =========================================================================
    // Bulk mode and selection
    // =========================================================================

    pub fn is_bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    pub fn enter_bulk_mode(&mut self) {
        self.bulk_mode = true;
        self.selection.clear();
    }

    pub fn exit_bulk_mode(&mut self) {
        self.bulk_mode = false;
        self.selection.clear();
    }

    pub fn toggle_bulk_mode(&mut self) {
        self.bulk_mode = !self.bulk_mode;
        self.selection.clear();
    }

    pub fn selection(&self) -> &BTreeSet<u32> {
        &self.selection
    }

    pub fn is_selected(&self, id: u32) -> bool {
        self.selection.contains(&id)
    }

    /// Flip one line's selection. Returns whether it is now selected.
    ///
    /// Outside bulk mode, or for an unknown ID, nothing changes.
    pub fn toggle_selection(&mut self, id: u32) -> bool {
        if !self.bulk_mode || self.item(id).is_none() {
            return false;
        }
        if self.selection.remove(&id) {
            false
        } else {
            self.selection.insert(id);
            true
        }
    }

    /// Select every visible line, or deselect them all if they already are.
    ///
    /// Selections of hidden lines are left alone. No-op outside bulk mode.
    pub fn toggle_select_all(&mut self) {
        if !self.bulk_mode {
            return;
        }

        let visible: Vec<u32> = self.visible_items().iter().map(|item| item.id).collect();
        let all_selected = !visible.is_empty() && visible.iter().all(|id| self.selection.contains(id));

        if all_selected {
            for id in &visible {
                self.selection.remove(id);
            }
        } else {
            self.selection.extend(visible);
        }
    }

    // =========================================================================
    // Suggestions
    // =========================================================================

    /// Describe a suggestion request for a line, snapshotting its current text
    pub fn begin_suggestion(&self, id: u32) -> Option<SuggestionTicket> {
        self.item(id).map(|item| SuggestionTicket {
            id,
            source_text: item.source_text.clone(),
            snapshot: item.translated_text.clone(),
        })
    }

    /// Store a reply unless its line changed since the ticket was issued
    pub fn receive_suggestion(&mut self, ticket: &SuggestionTicket, text: impl Into<String>) -> SuggestionOutcome {
        let Some(item) = self.item(ticket.id) else {
            return SuggestionOutcome::UnknownItem;
        };

        if item.translated_text != ticket.snapshot {
            warn!(
                "Session {}: discarding stale suggestion for line {}",
                self.short_id(),
                ticket.id
            );
            return SuggestionOutcome::Stale;
        }

        self.suggestions.insert(ticket.id, text.into());
        SuggestionOutcome::Stored
    }

    pub fn pending_suggestion(&self, id: u32) -> Option<&str> {
        self.suggestions.get(id)
    }

    /// Line IDs with a suggestion waiting
    pub fn pending_suggestion_ids(&self) -> Vec<u32> {
        self.suggestions.ids()
    }

    /// Apply the pending suggestion as a point edit. Returns `false` if none is pending.
    pub fn apply_suggestion(&mut self, id: u32) -> bool {
        match self.suggestions.take(id) {
            Some(text) => self.edit_text(id, text),
            None => false,
        }
    }

    /// Drop the pending suggestion without touching the line
    pub fn dismiss_suggestion(&mut self, id: u32) -> bool {
        self.suggestions.remove(id)
    }

    // =========================================================================
    // Export and stats
    // =========================================================================

    /// Blocks with the current translations on source timing, in item order
    pub fn export(&self) -> Vec<TimedBlock> {
        self.result.items.iter().map(VerificationItem::to_block).collect()
    }

    pub fn export_srt(&self) -> String {
        to_srt(&self.export())
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.result.items {
            match item.status {
                VerificationStatus::Correct => counts.correct += 1,
                VerificationStatus::MinorIssue => counts.minor_issue += 1,
                VerificationStatus::Incorrect => counts.incorrect += 1,
                VerificationStatus::Corrected => counts.corrected += 1,
            }
            if item.timestamp_mismatch {
                counts.timestamp_mismatch += 1;
            }
        }
        counts
    }
}

fn dedupe_items(mut result: VerificationResult) -> VerificationResult {
    let mut seen = HashSet::new();
    let before = result.items.len();
    result.items.retain(|item| seen.insert(item.id));
    if result.items.len() != before {
        warn!("Dropped {} review item(s) with repeated IDs", before - result.items.len());
    }
    result
}
