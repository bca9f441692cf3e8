/*!
 * Prompt construction for the three external requests.
 *
 * - Translation of `[ID:n] text` payloads
 * - Assessment of aligned source/translation pairs (JSON reply)
 * - Single-line improvement suggestions
 */

pub mod templates;

// Re-export main types
pub use templates::{
    AssessmentPromptBuilder, PromptTemplate, SuggestionPromptBuilder, TranslationPromptBuilder,
};
