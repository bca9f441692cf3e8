use log::debug;

use crate::errors::ProviderError;
use crate::language_utils::LanguageSpec;

use super::core::{CompletionRequest, LanguageModel};
use super::prompts::SuggestionPromptBuilder;

/// Ask the model for one improved translation of a line.
///
/// An empty reply yields `current_translation` unchanged.
pub async fn request_suggestion<M: LanguageModel + ?Sized>(
    model: &M,
    source_text: &str,
    current_translation: &str,
    source_language: &LanguageSpec,
    target_language: &LanguageSpec,
) -> Result<String, ProviderError> {
    let (system, user) = SuggestionPromptBuilder::new(source_language, target_language)
        .build(source_text, current_translation);

    let reply = model.generate(CompletionRequest::new(system, user)).await?;
    let suggestion = clean_reply(&reply);
    debug!("Suggestion reply: {:?}", suggestion);

    if suggestion.is_empty() {
        Ok(current_translation.to_string())
    } else {
        Ok(suggestion)
    }
}

/// Trim whitespace and one pair of wrapping quotes
fn clean_reply(reply: &str) -> String {
    let trimmed = reply.trim();
    for (open, close) in [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')] {
        if let Some(inner) = trimmed.strip_prefix(open).and_then(|s| s.strip_suffix(close)) {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}
