use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use hitlist_result_api::{MediaTypeRegistry, SearchResult, ValidationError};
use indexmap::IndexSet;

use super::events::{EventBus, TableEvent};
use super::sort::{RowOrder, SortDirection, SortKey, SortOrder};
use crate::filters::{AllowAll, JunkFilter, JunkPolicy, RowFilter};
use crate::grouping::{GroupId, GroupingIndex, Placement, ResultGroup, ResultId};
use crate::metadata::MetadataModel;
use crate::options::PanelOptions;

/// A result the panel refused to take.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
	pub result: SearchResult,
	pub error: ValidationError,
}

/// Where a group currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
	Visible(usize),
	Hidden,
}

/// The grouped, filtered and sorted results of one search.
///
/// Every group is either a visible row or in the hidden bucket. Hidden groups
/// still count toward [`total_sources`](Self::total_sources) and come back
/// when a rebuild lets them through again. Row changes are published as
/// [`TableEvent`]s to every [`subscribe`](Self::subscribe)r.
pub struct ResultPanel {
	index: GroupingIndex,
	rows: Vec<GroupId>,
	hidden: IndexSet<GroupId>,
	filtered_sources: usize,
	hidden_sources: usize,
	filter: Box<dyn RowFilter>,
	junk_policy: JunkPolicy,
	junk: JunkFilter,
	sort: Option<SortOrder>,
	real_time_sort: bool,
	selection: HashSet<GroupId>,
	metadata: MetadataModel,
	rejected: Vec<Rejected>,
	events: EventBus,
}

impl Default for ResultPanel {
	fn default() -> Self {
		Self::new(&PanelOptions::default())
	}
}

impl ResultPanel {
	#[must_use]
	pub fn new(options: &PanelOptions) -> Self {
		Self::with_registry(options, Arc::new(MediaTypeRegistry::default()))
	}

	#[must_use]
	pub fn with_registry(options: &PanelOptions, registry: Arc<MediaTypeRegistry>) -> Self {
		Self {
			index: GroupingIndex::new(options.group_results),
			rows: Vec::new(),
			hidden: IndexSet::new(),
			filtered_sources: 0,
			hidden_sources: 0,
			filter: Box::new(AllowAll),
			junk_policy: options.junk_policy,
			junk: JunkFilter::new(options.spam_threshold),
			sort: options.sort,
			real_time_sort: options.real_time_sort,
			selection: HashSet::new(),
			metadata: MetadataModel::new(registry),
			rejected: Vec::new(),
			events: EventBus::default(),
		}
	}

	/// Receive every row change from now on.
	pub fn subscribe(&mut self) -> Receiver<TableEvent> {
		self.events.subscribe()
	}

	fn order(&self) -> RowOrder {
		RowOrder {
			sort: self.sort,
			sink: (self.junk_policy == JunkPolicy::Sink).then_some(self.junk),
		}
	}

	fn junk_hidden(&self, group: &ResultGroup) -> bool {
		self.junk_policy == JunkPolicy::Hide && self.junk.is_junk(group)
	}

	fn shows(&self, group: &ResultGroup) -> bool {
		!self.junk_hidden(group) && self.filter.allow(group)
	}

	fn slot(&self, group_id: GroupId) -> Option<Slot> {
		if let Some(row) = self.row_of(group_id) {
			Some(Slot::Visible(row))
		} else if self.hidden.contains(&group_id) {
			Some(Slot::Hidden)
		} else {
			None
		}
	}

	/// Take a result from the network.
	///
	/// Malformed results are kept for [`take_rejected`](Self::take_rejected)
	/// and `None` is returned.
	pub fn add_result(&mut self, result: SearchResult) -> Option<Placement> {
		if let Err(error) = result.validate() {
			log::warn!("rejecting result '{}': {error}", result.file_name);
			self.rejected.push(Rejected { result, error });
			return None;
		}
		let placement = match self.index.insert(result) {
			Ok(placement) => placement,
			Err(error) => {
				log::warn!("rejecting result: {error}");
				return None;
			}
		};

		match placement {
			Placement::Created { group, .. } => self.place_new(group),
			Placement::Merged { group, .. } => {
				match self.slot(group) {
					Some(Slot::Visible(_)) => self.filtered_sources += 1,
					Some(Slot::Hidden) => self.hidden_sources += 1,
					None => {}
				}
				self.replace(group);
			}
		}
		Some(placement)
	}

	fn place_new(&mut self, group_id: GroupId) {
		let Some(group) = self.index.group(group_id) else {
			return;
		};
		let count = group.source_count();
		let junk_hidden = self.junk_hidden(group);
		if !junk_hidden {
			self.metadata.add_group(group);
		}
		if !junk_hidden && self.filter.allow(group) {
			self.place_visible(group_id, count);
		} else {
			self.hidden.insert(group_id);
			self.hidden_sources += count;
		}
	}

	/// Row a new group goes to: after every row that does not sort after it.
	fn insertion_row(&self, group: &ResultGroup) -> usize {
		let order = self.order();
		self.rows.partition_point(|id| {
			self.index
				.group(*id)
				.is_none_or(|row| order.compare(row, group) != Ordering::Greater)
		})
	}

	/// Re-evaluate an existing group after its contents changed.
	fn replace(&mut self, group_id: GroupId) {
		let Some(group) = self.index.group(group_id) else {
			return;
		};
		let count = group.source_count();
		let junk_hidden = self.junk_hidden(group);
		let shows = self.shows(group);
		let sinks = self.junk_policy == JunkPolicy::Sink && self.junk.is_junk(group);
		if junk_hidden {
			self.metadata.remove_group(group_id);
		} else {
			self.metadata.add_group(group);
		}

		match (self.slot(group_id), shows) {
			(Some(Slot::Visible(row)), true) => {
				if self.real_time_sort || sinks {
					self.relocate(row);
				} else {
					self.events.emit(TableEvent::Updated {
						row,
						group: group_id,
					});
				}
			}
			(Some(Slot::Visible(row)), false) => {
				self.rows.remove(row);
				self.selection.remove(&group_id);
				self.filtered_sources -= count;
				self.hidden_sources += count;
				self.hidden.insert(group_id);
				self.events.emit(TableEvent::Removed {
					row,
					group: group_id,
				});
			}
			(Some(Slot::Hidden), true) => {
				self.hidden.shift_remove(&group_id);
				self.hidden_sources -= count;
				self.place_visible(group_id, count);
			}
			(Some(Slot::Hidden), false) | (None, _) => {}
		}
	}

	fn place_visible(&mut self, group_id: GroupId, count: usize) {
		let Some(group) = self.index.group(group_id) else {
			return;
		};
		let row = self.insertion_row(group);
		self.rows.insert(row, group_id);
		self.filtered_sources += count;
		self.events.emit(TableEvent::Inserted {
			row,
			group: group_id,
		});
	}

	/// Move the row at `from` to where the current order wants it, scanning
	/// outward from its old position.
	fn relocate(&mut self, from: usize) {
		let group_id = self.rows[from];
		let Some(group) = self.index.group(group_id) else {
			return;
		};
		let order = self.order();
		let compares = |row: usize, wanted: Ordering| {
			self.index
				.group(self.rows[row])
				.is_some_and(|other| order.compare(group, other) == wanted)
		};

		let mut to = from;
		while to > 0 && compares(to - 1, Ordering::Less) {
			to -= 1;
		}
		if to == from {
			while to + 1 < self.rows.len() && compares(to + 1, Ordering::Greater) {
				to += 1;
			}
		}

		if to == from {
			self.events.emit(TableEvent::Updated {
				row: from,
				group: group_id,
			});
		} else {
			log::trace!("moving {group_id} from row {from} to {to}");
			self.rows.remove(from);
			self.rows.insert(to, group_id);
			self.events.emit(TableEvent::Moved {
				from,
				to,
				group: group_id,
			});
		}
	}

	/// Take one result back out, dropping its group once empty.
	pub fn remove_result(&mut self, result_id: ResultId) -> bool {
		let Some(group_id) = self.index.group_of(result_id) else {
			log::debug!("ignoring removal of unknown result {result_id}");
			return false;
		};
		let slot = self.slot(group_id);
		let Some(detached) = self.index.remove(result_id) else {
			return false;
		};
		match slot {
			Some(Slot::Visible(_)) => self.filtered_sources -= 1,
			Some(Slot::Hidden) => self.hidden_sources -= 1,
			None => {}
		}

		if detached.group_removed {
			self.metadata.remove_group(group_id);
			self.selection.remove(&group_id);
			match slot {
				Some(Slot::Visible(row)) => {
					self.rows.remove(row);
					self.events.emit(TableEvent::Removed {
						row,
						group: group_id,
					});
				}
				Some(Slot::Hidden) => {
					self.hidden.shift_remove(&group_id);
				}
				None => {}
			}
		} else {
			self.replace(group_id);
		}
		true
	}

	/// Remove a whole group. Unknown ids are ignored.
	pub fn remove_group(&mut self, group_id: GroupId) -> bool {
		let Some(slot) = self.slot(group_id) else {
			log::debug!("ignoring removal of unknown group {group_id}");
			return false;
		};
		let Some(group) = self.index.remove_group(group_id) else {
			return false;
		};
		let count = group.source_count();
		self.metadata.remove_group(group_id);
		self.selection.remove(&group_id);
		match slot {
			Slot::Visible(row) => {
				self.rows.remove(row);
				self.filtered_sources -= count;
				self.events.emit(TableEvent::Removed {
					row,
					group: group_id,
				});
			}
			Slot::Hidden => {
				self.hidden.shift_remove(&group_id);
				self.hidden_sources -= count;
			}
		}
		true
	}

	/// Remove the group shown at `row`. Out-of-range rows are ignored.
	pub fn remove_row(&mut self, row: usize) -> bool {
		match self.rows.get(row) {
			Some(&group_id) => self.remove_group(group_id),
			None => {
				log::debug!("ignoring removal of row {row} of {}", self.rows.len());
				false
			}
		}
	}

	/// Replace the user filter and rebuild.
	pub fn set_filter(&mut self, filter: impl RowFilter + 'static) {
		self.filter = Box::new(filter);
		self.rebuild();
	}

	/// Rebuild after the state behind the current filter changed.
	pub fn filters_changed(&mut self) {
		self.rebuild();
	}

	pub fn set_junk_policy(&mut self, policy: JunkPolicy) {
		if self.junk_policy != policy {
			self.junk_policy = policy;
			self.rebuild();
		}
	}

	pub fn set_spam_threshold(&mut self, threshold: f32) {
		let junk = JunkFilter::new(threshold);
		if self.junk != junk {
			self.junk = junk;
			self.rebuild();
		}
	}

	/// Record the user's spam verdict for a group.
	pub fn mark_junk(&mut self, group_id: GroupId, junk: bool) -> bool {
		let Some(group) = self.index.group_mut(group_id) else {
			log::debug!("ignoring junk mark for unknown group {group_id}");
			return false;
		};
		group.set_user_junk(Some(junk));
		self.replace(group_id);
		true
	}

	/// Partition every group anew and re-sort the visible rows.
	///
	/// Rows sort stably from arrival order. Selected rows that stay visible
	/// stay selected.
	fn rebuild(&mut self) {
		let order = self.order();
		let mut visible = Vec::new();
		self.hidden.clear();
		self.metadata.clear();
		self.filtered_sources = 0;
		self.hidden_sources = 0;

		for group in self.index.groups() {
			let junk_hidden = self.junk_hidden(group);
			if !junk_hidden {
				self.metadata.add_group(group);
			}
			if !junk_hidden && self.filter.allow(group) {
				visible.push(group);
				self.filtered_sources += group.source_count();
			} else {
				self.hidden.insert(group.id());
				self.hidden_sources += group.source_count();
			}
		}
		visible.sort_by(|a, b| order.compare(a, b));
		self.rows = visible.into_iter().map(ResultGroup::id).collect();

		let hidden = &self.hidden;
		self.selection.retain(|id| !hidden.contains(id));
		log::debug!(
			"rebuilt panel: {} visible, {} hidden",
			self.rows.len(),
			self.hidden.len()
		);
		self.events.emit(TableEvent::Reset);
	}

	/// Sort the visible rows; ties keep their current relative order.
	pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
		self.sort = Some(SortOrder::new(key, direction));
		self.resort();
	}

	/// Drop the sort order and return to arrival order.
	pub fn clear_sort(&mut self) {
		self.sort = None;
		let rows: HashSet<GroupId> = self.rows.iter().copied().collect();
		self.rows = self
			.index
			.groups()
			.map(ResultGroup::id)
			.filter(|id| rows.contains(id))
			.collect();
		self.resort();
	}

	fn resort(&mut self) {
		let order = self.order();
		let index = &self.index;
		self.rows.sort_by(|a, b| match (index.group(*a), index.group(*b)) {
			(Some(a), Some(b)) => order.compare(a, b),
			_ => Ordering::Equal,
		});
		self.events.emit(TableEvent::Reset);
	}

	pub fn set_real_time_sort(&mut self, enabled: bool) {
		self.real_time_sort = enabled;
	}

	/// Toggle duplicate grouping for results that arrive from now on.
	pub fn set_grouping(&mut self, grouping: bool) {
		self.index.set_grouping(grouping);
	}

	/// Forget every result.
	pub fn clear(&mut self) {
		self.index.clear();
		self.rows.clear();
		self.hidden.clear();
		self.selection.clear();
		self.metadata.clear();
		self.filtered_sources = 0;
		self.hidden_sources = 0;
		self.events.emit(TableEvent::Reset);
	}

	/// Select a visible group. Returns whether it is visible.
	pub fn select(&mut self, group_id: GroupId) -> bool {
		if self.row_of(group_id).is_none() {
			return false;
		}
		self.selection.insert(group_id);
		true
	}

	pub fn deselect(&mut self, group_id: GroupId) -> bool {
		self.selection.remove(&group_id)
	}

	pub fn clear_selection(&mut self) {
		self.selection.clear();
	}

	#[must_use]
	pub fn is_selected(&self, group_id: GroupId) -> bool {
		self.selection.contains(&group_id)
	}

	/// Selected groups in row order.
	#[must_use]
	pub fn selected(&self) -> Vec<GroupId> {
		self.rows
			.iter()
			.copied()
			.filter(|id| self.selection.contains(id))
			.collect()
	}

	/// Results handed back since the last call.
	pub fn take_rejected(&mut self) -> Vec<Rejected> {
		std::mem::take(&mut self.rejected)
	}

	/// Visible group ids in row order.
	#[must_use]
	pub fn rows(&self) -> &[GroupId] {
		&self.rows
	}

	#[must_use]
	pub fn row(&self, row: usize) -> Option<&ResultGroup> {
		self.rows.get(row).and_then(|id| self.index.group(*id))
	}

	/// Visible groups in row order.
	pub fn visible(&self) -> impl Iterator<Item = &ResultGroup> {
		self.rows.iter().filter_map(|id| self.index.group(*id))
	}

	/// Hidden groups in the order they were hidden.
	pub fn hidden(&self) -> impl Iterator<Item = &ResultGroup> {
		self.hidden.iter().filter_map(|id| self.index.group(*id))
	}

	#[must_use]
	pub fn row_of(&self, group_id: GroupId) -> Option<usize> {
		self.rows.iter().position(|id| *id == group_id)
	}

	#[must_use]
	pub fn group(&self, group_id: GroupId) -> Option<&ResultGroup> {
		self.index.group(group_id)
	}

	#[must_use]
	pub fn is_hidden(&self, group_id: GroupId) -> bool {
		self.hidden.contains(&group_id)
	}

	/// Number of visible rows.
	#[must_use]
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	#[must_use]
	pub fn hidden_len(&self) -> usize {
		self.hidden.len()
	}

	#[must_use]
	pub fn group_count(&self) -> usize {
		self.index.len()
	}

	/// Sources across every group, hidden or not.
	#[must_use]
	pub fn total_sources(&self) -> usize {
		self.filtered_sources + self.hidden_sources
	}

	/// Sources across the visible rows.
	#[must_use]
	pub fn filtered_sources(&self) -> usize {
		self.filtered_sources
	}

	#[must_use]
	pub fn hidden_sources(&self) -> usize {
		self.hidden_sources
	}

	#[must_use]
	pub fn sort(&self) -> Option<SortOrder> {
		self.sort
	}

	#[must_use]
	pub fn junk_policy(&self) -> JunkPolicy {
		self.junk_policy
	}

	#[must_use]
	pub fn spam_threshold(&self) -> f32 {
		self.junk.threshold()
	}

	#[must_use]
	pub fn metadata(&self) -> &MetadataModel {
		&self.metadata
	}

	#[must_use]
	pub fn index(&self) -> &GroupingIndex {
		&self.index
	}
}
