//! Search-result core for a peer-to-peer file-sharing client.
//!
//! Results streamed from network threads are grouped into duplicates,
//! filtered and sorted into a table view, and published as row events for
//! whatever front end draws them. The root module re-exports the types most
//! embedders need.

pub mod displayer;
pub mod filters;
pub mod grouping;
pub mod logging;
pub mod metadata;
mod options;
pub mod view;

pub use displayer::{Delivery, PumpStats, ResultSink, SearchDisplayer, SearchId, SearchInfo, SearchPanel};
pub use filters::{CompositeFilter, JunkPolicy, RowFilter};
pub use grouping::{GroupId, GroupingIndex, ResultGroup, ResultId};
pub use hitlist_result_api as api;
pub use options::{DEFAULT_MAX_SEARCHES, PanelOptions};
pub use view::{ResultPanel, SortDirection, SortKey, SortOrder, TableEvent};
