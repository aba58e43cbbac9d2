//! The filtered, sorted table view over one search's groups.

mod events;
mod panel;
mod sort;

pub use events::{EventBus, TableEvent};
pub use panel::{Rejected, ResultPanel};
pub use sort::{SortDirection, SortKey, SortOrder};
