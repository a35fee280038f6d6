//! The feature backlog: the ordered list of work items the agent is driven
//! through, plus optional shared project context.
//!
//! The backlog file is the single source of truth. It is re-read at the top of
//! every operation that needs it because humans (and the agent itself) are
//! expected to edit it between iterations.

mod store;
mod types;

pub use store::{BacklogStore, DEFAULT_BACKLOG_FILE};
pub use types::{Backlog, BacklogShape, Feature, Priority, ProjectContext, TextOrList};
