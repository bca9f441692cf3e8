/*!
 * Quality assessment requests.
 *
 * Aligned pairs go out as `ID/Source/Translation` blocks; the reply is read
 * as a loosely shaped JSON judgment.
 */

use log::{debug, warn};

use crate::alignment::AlignmentRecord;
use crate::errors::ProviderError;
use crate::language_utils::LanguageSpec;
use crate::verification::Judgment;

use super::core::{CompletionRequest, LanguageModel};
use super::prompts::AssessmentPromptBuilder;

/// Format aligned pairs for the assessment prompt
pub fn format_pairs(records: &[AlignmentRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "ID: {}\nSource: {}\nTranslation: {}",
                record.id, record.source_text, record.translated_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Ask the model to judge aligned pairs.
///
/// Transport failures are errors; a reply that is not usable JSON becomes an
/// empty judgment so every line falls back to its defaults.
pub async fn request_assessment<M: LanguageModel + ?Sized>(
    model: &M,
    records: &[AlignmentRecord],
    source_language: &LanguageSpec,
    target_language: &LanguageSpec,
) -> Result<Judgment, ProviderError> {
    let (system, user) = AssessmentPromptBuilder::new(source_language, target_language)
        .build(&format_pairs(records));

    let reply = model.generate(CompletionRequest::new(system, user).json()).await?;
    debug!("Assessment reply: {} chars", reply.len());

    let judgment = Judgment::parse(&reply);
    if judgment.items.len() < records.len() {
        warn!(
            "Assessment covered {} of {} lines; the rest use default status",
            judgment.items.len(),
            records.len()
        );
    }

    Ok(judgment)
}
