/// Shared formatting helpers (display names, log previews).
pub mod formatting;
/// Shared time helpers.
pub mod time;
