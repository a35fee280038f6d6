//! Completion signalling for agent turns.
//!
//! The agent is told to end its turn with one of three literal tokens:
//!
//! - `FEATURE_COMPLETE` - the feature is done
//! - `FEATURE_BLOCKED` - human intervention is needed
//! - `FEATURE_FAILED` - an unresolvable error was hit
//!
//! Only the tail of the transcript is inspected, so tokens quoted early in a
//! long turn do not count.

mod detector;
mod types;

pub use detector::{TAIL_WINDOW_CHARS, detect, tail_window};
pub use types::{BLOCKED_TOKEN, COMPLETE_TOKEN, FAILED_TOKEN, IterationOutcome};
