/*!
 * Verification of a translated subtitle file against its source.
 *
 * - `models`: per-line records, statuses and the run result
 * - `judgment`: tolerant reading of the external assessment
 * - `merge`: folding the judgment into the aligned structural facts
 */

use log::{info, warn};

use crate::alignment::align;
use crate::errors::{SubtitleError, TranslationError};
use crate::language_utils::LanguageSpec;
use crate::subtitle_processor::TimedBlock;
use crate::translation::{LanguageModel, request_assessment};

pub use self::judgment::{Judgment, JudgmentItem};
pub use self::merge::{merge, merge_alignment};
pub use self::models::{AssignableStatus, ScoreBand, VerificationItem, VerificationResult, VerificationStatus};

pub mod judgment;
pub mod merge;
pub mod models;

/// Align, assess and merge one source/target pair.
///
/// Empty inputs and pairs with no shared line ID fail before the model is
/// contacted. A failed assessment request fails the whole run.
pub async fn verify<M: LanguageModel + ?Sized>(
    model: &M,
    source: &[TimedBlock],
    target: &[TimedBlock],
    source_language: &LanguageSpec,
    target_language: &LanguageSpec,
) -> Result<VerificationResult, TranslationError> {
    if source.is_empty() {
        return Err(SubtitleError::NoBlocks("source".to_string()).into());
    }
    if target.is_empty() {
        return Err(SubtitleError::NoBlocks("target".to_string()).into());
    }

    let alignment = align(source, target);
    if alignment.is_empty() {
        return Err(SubtitleError::NoAlignedLines {
            source_count: source.len(),
            target_count: target.len(),
        }
        .into());
    }

    if !alignment.dropped_source_ids.is_empty() {
        warn!(
            "{} source line(s) missing from the target and left out: {:?}",
            alignment.dropped_count(),
            alignment.dropped_source_ids
        );
    }
    if !alignment.unmatched_target_ids.is_empty() {
        warn!(
            "{} target line(s) have no source counterpart: {:?}",
            alignment.unmatched_target_ids.len(),
            alignment.unmatched_target_ids
        );
    }

    info!(
        "Assessing {} aligned lines with {}",
        alignment.records.len(),
        model.describe()
    );
    let judgment = request_assessment(model, &alignment.records, source_language, target_language).await?;

    Ok(merge_alignment(&alignment, &judgment))
}
