//! Command implementations for the histmatch CLI.

mod index;
mod info;
mod nearest;

// Re-export all command functions
pub use index::cmd_index;
pub use info::cmd_info;
pub use nearest::{cmd_match, MatchQuery};
