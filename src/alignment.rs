/*!
 * Source/target alignment and timestamp drift detection.
 *
 * Lines are paired by ID. The source side is authoritative for timing: an
 * aligned record always carries the source timecodes, and the target's own
 * timecodes only feed the mismatch flag.
 */

use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use log::debug;

use crate::subtitle_processor::TimedBlock;

/// One source line paired with the target line sharing its ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentRecord {
    /// Shared line ID
    pub id: u32,
    /// Source-language text
    pub source_text: String,
    /// Target-language text
    pub translated_text: String,
    /// Source start timecode
    pub start_time: String,
    /// Source end timecode
    pub end_time: String,
    /// Whether either bound differs between source and target
    pub timestamp_mismatch: bool,
}

/// Output of [`align`]: the aligned records plus the IDs that did not pair up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    /// Aligned records, in source order
    pub records: Vec<AlignmentRecord>,
    /// Source IDs with no target counterpart, in source order
    pub dropped_source_ids: Vec<u32>,
    /// Target IDs with no source counterpart, in target order
    pub unmatched_target_ids: Vec<u32>,
    /// Source IDs seen more than once; only the first occurrence is aligned
    pub duplicate_source_ids: Vec<u32>,
}

impl Alignment {
    /// Number of aligned records flagged with timestamp drift
    pub fn timestamp_mismatch_count(&self) -> usize {
        self.records.iter().filter(|r| r.timestamp_mismatch).count()
    }

    /// Number of source lines excluded for lack of a target line
    pub fn dropped_count(&self) -> usize {
        self.dropped_source_ids.len()
    }

    /// Whether nothing aligned at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Exact string comparison of both bounds; no tolerance window
pub fn timestamps_differ(source: &TimedBlock, target: &TimedBlock) -> bool {
    source.start_time != target.start_time || source.end_time != target.end_time
}

/// Pair source and target blocks by ID.
///
/// When the target repeats an ID the last occurrence wins. When the source
/// repeats an ID only its first occurrence is aligned, keeping record IDs
/// unique.
pub fn align(source: &[TimedBlock], target: &[TimedBlock]) -> Alignment {
    let target_by_id: HashMap<u32, &TimedBlock> = target
        .iter()
        .map(|block| (block.id, block))
        .collect();

    let mut alignment = Alignment::default();
    let mut seen: HashSet<u32> = HashSet::with_capacity(source.len());

    for src in source {
        if !seen.insert(src.id) {
            alignment.duplicate_source_ids.push(src.id);
            continue;
        }

        let Some(tgt) = target_by_id.get(&src.id) else {
            alignment.dropped_source_ids.push(src.id);
            continue;
        };

        alignment.records.push(AlignmentRecord {
            id: src.id,
            source_text: src.text.clone(),
            translated_text: tgt.text.clone(),
            start_time: src.start_time.clone(),
            end_time: src.end_time.clone(),
            timestamp_mismatch: timestamps_differ(src, tgt),
        });
    }

    let mut reported: HashSet<u32> = HashSet::new();
    alignment.unmatched_target_ids = target
        .iter()
        .map(|block| block.id)
        .filter(|id| !seen.contains(id) && reported.insert(*id))
        .collect();

    debug!(
        "Aligned {} line(s): {} timestamp mismatch(es), {} dropped source ID(s), {} unmatched target ID(s)",
        alignment.records.len(),
        alignment.timestamp_mismatch_count(),
        alignment.dropped_source_ids.len(),
        alignment.unmatched_target_ids.len()
    );

    alignment
}
