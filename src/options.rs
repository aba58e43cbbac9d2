use serde::{Deserialize, Serialize};

use crate::filters::{DEFAULT_SPAM_THRESHOLD, JunkPolicy};
use crate::view::SortOrder;

/// Default number of searches a displayer keeps open at once.
pub const DEFAULT_MAX_SEARCHES: usize = 10;

/// Behaviour shared by every result panel a displayer opens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
	/// Merge duplicate results into one row.
	pub group_results: bool,
	pub junk_policy: JunkPolicy,
	/// Spam rating at or above which a group is junk.
	pub spam_threshold: f32,
	/// Relocate rows as merges change their sort value.
	pub real_time_sort: bool,
	/// Order applied to new panels; `None` keeps arrival order.
	pub sort: Option<SortOrder>,
	pub max_searches: usize,
}

impl Default for PanelOptions {
	fn default() -> Self {
		Self {
			group_results: true,
			junk_policy: JunkPolicy::default(),
			spam_threshold: DEFAULT_SPAM_THRESHOLD,
			real_time_sort: true,
			sort: None,
			max_searches: DEFAULT_MAX_SEARCHES,
		}
	}
}
