/*!
 * Requests to the external language model.
 *
 * This module contains everything that talks to a provider:
 *
 * - `core`: the `LanguageModel` boundary and the provider-backed service
 * - `batch`: chunked `[ID:n]` translation of subtitle blocks
 * - `assessment`: quality judgment of aligned pairs
 * - `suggestion`: improved wording for a single line
 * - `prompts`: prompt templates and builders
 */

// Re-export main types for easier usage
pub use self::assessment::request_assessment;
pub use self::batch::BatchTranslator;
pub use self::core::{CompletionRequest, LanguageModel, TranslationService};
pub use self::suggestion::request_suggestion;

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod assessment;
pub mod batch;
pub mod core;
pub mod prompts;
pub mod suggestion;
