/*!
 * # subcheck - subtitle translation and verification
 *
 * Translates SRT subtitles with a language model and checks existing
 * translations against their source, line by line.
 *
 * ## Features
 *
 * - SRT parsing and serialization that tolerates malformed blocks
 * - Chunked translation through Ollama, OpenAI, Anthropic or LM Studio
 * - Source/target alignment by caption ID with timing drift detection
 * - Verification results merged from an external quality judgment
 * - Review sessions with filters, bulk status changes, edits and suggestions
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and writing
 * - `alignment`: Pairing source and target blocks
 * - `verification`: Judgment parsing and result merging
 * - `review`: The correction workset
 * - `translation`: Language-model boundary, prompts, batch translation
 * - `providers`: HTTP clients for each provider plus a mock
 * - `app_controller`: Command orchestration and the review loop
 * - `file_utils`, `language_utils`, `errors`
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod alignment;
pub mod verification;
pub mod review;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{SubtitleCollection, TimedBlock, parse_srt, to_srt};
pub use alignment::{Alignment, AlignmentRecord, align};
pub use verification::{VerificationItem, VerificationResult, VerificationStatus, verify};
pub use review::{ReviewSession, StatusFilter};
pub use translation::{LanguageModel, TranslationService};
pub use language_utils::{LanguageSpec, language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
