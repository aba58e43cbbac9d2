//! Row predicates deciding which groups a result panel shows.

mod facet;
mod junk;

pub use facet::{FacetFilter, FieldFilter, PropertyFilter};
pub use junk::{DEFAULT_SPAM_THRESHOLD, JunkFilter, JunkPolicy};

use crate::grouping::ResultGroup;

/// Decides whether a group may be shown.
pub trait RowFilter: Send {
	fn allow(&self, group: &ResultGroup) -> bool;
}

impl<F> RowFilter for F
where
	F: Fn(&ResultGroup) -> bool + Send,
{
	fn allow(&self, group: &ResultGroup) -> bool {
		self(group)
	}
}

/// Lets every group through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllowAll;

impl RowFilter for AllowAll {
	fn allow(&self, _group: &ResultGroup) -> bool {
		true
	}
}

/// A fixed number of facet slots combined with logical AND.
///
/// Each slot corresponds to one facet chooser; an empty slot allows
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeFilter {
	slots: Vec<Option<FacetFilter>>,
}

impl CompositeFilter {
	#[must_use]
	pub fn new(depth: usize) -> Self {
		Self {
			slots: vec![None; depth],
		}
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.slots.len()
	}

	/// Empty every slot.
	pub fn reset(&mut self) {
		self.slots.iter_mut().for_each(|slot| *slot = None);
	}

	/// Replace the filter at `depth`. Returns whether anything changed, so
	/// callers can skip rebuilding a panel for a no-op.
	pub fn set_filter(&mut self, depth: usize, filter: Option<FacetFilter>) -> bool {
		let Some(slot) = self.slots.get_mut(depth) else {
			log::debug!("ignoring filter for slot {depth} of {}", self.slots.len());
			return false;
		};
		if *slot == filter {
			return false;
		}
		*slot = filter;
		true
	}

	#[must_use]
	pub fn filter(&self, depth: usize) -> Option<&FacetFilter> {
		self.slots.get(depth).and_then(Option::as_ref)
	}

	/// True when no slot holds a filter.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.iter().all(Option::is_none)
	}
}

impl RowFilter for CompositeFilter {
	fn allow(&self, group: &ResultGroup) -> bool {
		self.slots
			.iter()
			.flatten()
			.all(|filter| filter.allow(group))
	}
}

#[cfg(test)]
mod tests {
	use hitlist_result_api::SearchResult;

	use super::*;
	use crate::grouping::GroupingIndex;

	fn single(result: SearchResult) -> (GroupingIndex, crate::grouping::GroupId) {
		let mut index = GroupingIndex::default();
		let group = index.insert(result).unwrap().group();
		(index, group)
	}

	#[test]
	fn composite_requires_every_slot() {
		let (index, id) = single(SearchResult::new("song.mp3", 1).with_vendor("LIME"));
		let group = index.group(id).unwrap();

		let mut composite = CompositeFilter::new(3);
		assert!(composite.allow(group));
		assert!(composite.set_filter(
			0,
			Some(FacetFilter::Property(PropertyFilter::Extension("MP3".into())))
		));
		assert!(composite.allow(group));
		assert!(composite.set_filter(
			2,
			Some(FacetFilter::Property(PropertyFilter::Vendor("BEAR".into())))
		));
		assert!(!composite.allow(group));

		composite.reset();
		assert!(composite.is_empty());
		assert!(composite.allow(group));
	}

	#[test]
	fn set_filter_reports_changes_only() {
		let mut composite = CompositeFilter::new(1);
		let filter = FacetFilter::Property(PropertyFilter::Vendor("LIME".into()));
		assert!(composite.set_filter(0, Some(filter.clone())));
		assert!(!composite.set_filter(0, Some(filter)));
		assert!(!composite.set_filter(5, None));
		assert!(composite.set_filter(0, None));
	}

	#[test]
	fn closures_are_filters() {
		let (index, id) = single(SearchResult::new("big.iso", 10_000));
		let group = index.group(id).unwrap();
		let large = |group: &ResultGroup| group.size() > 1_000;
		assert!(large.allow(group));
		assert!(AllowAll.allow(group));
	}
}
