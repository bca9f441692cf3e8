/*!
 * Reconciles structural alignment facts with an external judgment.
 *
 * Structural fields (IDs, texts, timecodes, mismatch flags) always come from
 * the alignment; the judgment only contributes status, feedback, score and
 * summary.
 */

use crate::alignment::{Alignment, AlignmentRecord};

use super::judgment::Judgment;
use super::models::{VerificationItem, VerificationResult, VerificationStatus};

pub const DEFAULT_SUMMARY: &str = "Analysis completed.";
pub const FEEDBACK_TIMESTAMP_MISMATCH: &str = "Timestamp mismatch detected";
pub const FEEDBACK_NO_ISSUES: &str = "No issues found";

/// Merge aligned records (in source order) with a judgment
pub fn merge(records: &[AlignmentRecord], judgment: &Judgment) -> VerificationResult {
    let items: Vec<VerificationItem> = records
        .iter()
        .map(|record| merge_record(record, judgment))
        .collect();

    let timestamp_mismatch_count = records.iter().filter(|r| r.timestamp_mismatch).count();

    VerificationResult {
        overall_score: judgment.overall_score.unwrap_or(0),
        summary: judgment
            .summary
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        items,
        timestamp_mismatch_count,
        dropped_source_ids: Vec::new(),
        unmatched_target_ids: Vec::new(),
    }
}

/// Merge a full alignment, carrying its unpaired IDs into the result
pub fn merge_alignment(alignment: &Alignment, judgment: &Judgment) -> VerificationResult {
    VerificationResult {
        dropped_source_ids: alignment.dropped_source_ids.clone(),
        unmatched_target_ids: alignment.unmatched_target_ids.clone(),
        ..merge(&alignment.records, judgment)
    }
}

fn merge_record(record: &AlignmentRecord, judgment: &Judgment) -> VerificationItem {
    let judged = judgment.item(record.id);

    let status = judged
        .and_then(|item| item.status)
        .map(VerificationStatus::from)
        .unwrap_or(VerificationStatus::Correct);

    let feedback = judged
        .and_then(|item| item.feedback.clone())
        .unwrap_or_else(|| {
            if record.timestamp_mismatch {
                FEEDBACK_TIMESTAMP_MISMATCH.to_string()
            } else {
                FEEDBACK_NO_ISSUES.to_string()
            }
        });

    VerificationItem {
        id: record.id,
        status,
        feedback,
        source_text: record.source_text.clone(),
        translated_text: record.translated_text.clone(),
        start_time: record.start_time.clone(),
        end_time: record.end_time.clone(),
        timestamp_mismatch: record.timestamp_mismatch,
    }
}
