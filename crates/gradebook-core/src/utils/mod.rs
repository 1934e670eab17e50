//! Utility functions for string formatting, collation and timestamps.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{age_display, clip, cmp_ignore_case, contains_ignore_case, text_or};
