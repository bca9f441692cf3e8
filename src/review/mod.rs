/*!
 * Interactive correction of a verification result.
 *
 * - `session`: the owned workset and its state machine
 * - `filter`: status filters over review items
 * - `suggestions`: snapshot tickets and pending suggestions
 */

pub mod filter;
pub mod session;
pub mod suggestions;

// Re-export main types
pub use filter::{StatusFilter, filter_items};
pub use session::{BulkStatus, ReviewSession, StatusCounts};
pub use suggestions::{PendingSuggestions, SuggestionOutcome, SuggestionTicket};
