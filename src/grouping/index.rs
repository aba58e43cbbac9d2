use std::collections::HashMap;

use hitlist_result_api::{ContentHash, SearchResult, ValidationError};
use indexmap::IndexMap;

use super::group::{GroupId, ResultGroup, ResultId};
use super::matcher::Fingerprint;
use super::size_index::SizeIndex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HashKey {
	hash: ContentHash,
	extension: String,
}

impl HashKey {
	fn of(fingerprint: &Fingerprint) -> Option<Self> {
		fingerprint.hash.clone().map(|hash| Self {
			hash,
			extension: fingerprint.extension.clone(),
		})
	}
}

/// Where an accepted result ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	/// The result started a new group.
	Created { result: ResultId, group: GroupId },
	/// The result joined an existing group.
	Merged { result: ResultId, group: GroupId },
}

impl Placement {
	#[must_use]
	pub fn group(self) -> GroupId {
		match self {
			Self::Created { group, .. } | Self::Merged { group, .. } => group,
		}
	}

	#[must_use]
	pub fn result(self) -> ResultId {
		match self {
			Self::Created { result, .. } | Self::Merged { result, .. } => result,
		}
	}
}

/// A result taken back out of the index.
#[derive(Debug, Clone)]
pub struct Detached {
	pub result: SearchResult,
	pub group: GroupId,
	/// The group lost its last member and no longer exists.
	pub group_removed: bool,
}

/// Maps incoming results to the groups they belong to, for one search.
///
/// Hashed results are found through an exact map; the rest go through the
/// size-ordered [`SizeIndex`]. Groups are kept in arrival order.
#[derive(Debug)]
pub struct GroupingIndex {
	groups: IndexMap<GroupId, ResultGroup>,
	by_hash: HashMap<HashKey, GroupId>,
	by_size: SizeIndex,
	membership: HashMap<ResultId, GroupId>,
	grouping: bool,
	next_group: u64,
	next_result: u64,
}

impl Default for GroupingIndex {
	fn default() -> Self {
		Self::new(true)
	}
}

impl GroupingIndex {
	/// Create an empty index. With `grouping` off every result gets its own
	/// group.
	#[must_use]
	pub fn new(grouping: bool) -> Self {
		Self {
			groups: IndexMap::new(),
			by_hash: HashMap::new(),
			by_size: SizeIndex::new(),
			membership: HashMap::new(),
			grouping,
			next_group: 0,
			next_result: 0,
		}
	}

	#[must_use]
	pub fn grouping(&self) -> bool {
		self.grouping
	}

	/// Toggle grouping for results inserted from now on.
	pub fn set_grouping(&mut self, grouping: bool) {
		self.grouping = grouping;
	}

	#[must_use]
	pub fn lookup_by_hash(&self, hash: &ContentHash, extension: &str) -> Option<GroupId> {
		self.by_hash
			.get(&HashKey {
				hash: hash.clone(),
				extension: extension.to_lowercase(),
			})
			.copied()
	}

	#[must_use]
	pub fn lookup_by_similarity(&self, fingerprint: &Fingerprint) -> Option<GroupId> {
		self.by_size.find(fingerprint)
	}

	fn lookup(&self, fingerprint: &Fingerprint) -> Option<GroupId> {
		match HashKey::of(fingerprint) {
			Some(key) => self.by_hash.get(&key).copied(),
			None => self.lookup_by_similarity(fingerprint),
		}
	}

	/// Validate `result` and place it in a matching group or a new one.
	///
	/// # Errors
	///
	/// Returns the [`ValidationError`] of a malformed result, which is not
	/// inserted.
	pub fn insert(&mut self, result: SearchResult) -> Result<Placement, ValidationError> {
		result.validate()?;
		let fingerprint = Fingerprint::of(&result);
		let result_id = ResultId(self.next_result);
		self.next_result += 1;

		let existing = if self.grouping {
			self.lookup(&fingerprint)
		} else {
			None
		};

		if let Some(group_id) = existing {
			if let Some(group) = self.groups.get_mut(&group_id) {
				group.push(result_id, result);
				self.membership.insert(result_id, group_id);
				return Ok(Placement::Merged {
					result: result_id,
					group: group_id,
				});
			}
		}

		let group_id = GroupId(self.next_group);
		self.next_group += 1;
		self.register(group_id, fingerprint);
		self.groups
			.insert(group_id, ResultGroup::new(group_id, result_id, result));
		self.membership.insert(result_id, group_id);
		Ok(Placement::Created {
			result: result_id,
			group: group_id,
		})
	}

	/// Detach one result from its group, dropping the group once empty.
	pub fn remove(&mut self, result_id: ResultId) -> Option<Detached> {
		let group_id = self.membership.remove(&result_id)?;
		let group = self.groups.get_mut(&group_id)?;
		let was_canonical = group.canonical_id() == result_id;
		let old_fingerprint = Fingerprint::of(group.canonical());
		let result = group.detach(result_id)?;

		let group_removed = group.is_empty();
		let new_fingerprint = if group_removed || !was_canonical {
			None
		} else {
			Some(Fingerprint::of(group.canonical()))
		};

		if group_removed {
			self.unregister(group_id, &old_fingerprint);
			self.groups.shift_remove(&group_id);
		} else if let Some(fingerprint) = new_fingerprint {
			self.unregister(group_id, &old_fingerprint);
			self.register(group_id, fingerprint);
		}

		Some(Detached {
			result,
			group: group_id,
			group_removed,
		})
	}

	/// Remove a whole group and all of its results.
	pub fn remove_group(&mut self, group_id: GroupId) -> Option<ResultGroup> {
		let group = self.groups.shift_remove(&group_id)?;
		self.unregister(group_id, &Fingerprint::of(group.canonical()));
		for (result_id, _) in group.results() {
			self.membership.remove(&result_id);
		}
		Some(group)
	}

	pub fn clear(&mut self) {
		self.groups.clear();
		self.by_hash.clear();
		self.by_size.clear();
		self.membership.clear();
	}

	fn register(&mut self, group_id: GroupId, fingerprint: Fingerprint) {
		match HashKey::of(&fingerprint) {
			Some(key) => {
				self.by_hash.entry(key).or_insert(group_id);
			}
			None => self.by_size.add(group_id, fingerprint),
		}
	}

	fn unregister(&mut self, group_id: GroupId, fingerprint: &Fingerprint) {
		match HashKey::of(fingerprint) {
			Some(key) => {
				if self.by_hash.get(&key) == Some(&group_id) {
					self.by_hash.remove(&key);
				}
			}
			None => {
				self.by_size.remove(group_id, fingerprint.size);
			}
		}
	}

	#[must_use]
	pub fn group(&self, group_id: GroupId) -> Option<&ResultGroup> {
		self.groups.get(&group_id)
	}

	pub(crate) fn group_mut(&mut self, group_id: GroupId) -> Option<&mut ResultGroup> {
		self.groups.get_mut(&group_id)
	}

	/// Groups in the order they were created.
	pub fn groups(&self) -> impl Iterator<Item = &ResultGroup> {
		self.groups.values()
	}

	#[must_use]
	pub fn group_of(&self, result_id: ResultId) -> Option<GroupId> {
		self.membership.get(&result_id).copied()
	}

	#[must_use]
	pub fn contains(&self, group_id: GroupId) -> bool {
		self.groups.contains_key(&group_id)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	/// Number of accepted results across all groups.
	#[must_use]
	pub fn result_count(&self) -> usize {
		self.membership.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hash(fill: char) -> ContentHash {
		ContentHash::parse(&fill.to_string().repeat(32)).unwrap()
	}

	fn insert(index: &mut GroupingIndex, result: SearchResult) -> Placement {
		index.insert(result).expect("valid result")
	}

	#[test]
	fn hashed_results_merge_by_hash() {
		let mut index = GroupingIndex::default();
		let first = insert(&mut index, SearchResult::new("a.mp3", 1).with_hash(hash('A')));
		let second = insert(&mut index, SearchResult::new("b.mp3", 2).with_hash(hash('A')));
		assert!(matches!(first, Placement::Created { .. }));
		assert_eq!(
			second,
			Placement::Merged {
				result: second.result(),
				group: first.group()
			}
		);
		assert_eq!(index.lookup_by_hash(&hash('A'), "MP3"), Some(first.group()));
		assert_eq!(index.group(first.group()).unwrap().source_count(), 2);
	}

	#[test]
	fn similar_results_merge_into_the_exact_size_group() {
		let mut index = GroupingIndex::default();
		let mut groups = Vec::new();
		for size in [90, 99, 100, 101, 110] {
			groups.push(insert(&mut index, SearchResult::new("file.mp3", size)).group());
		}
		let placement = insert(&mut index, SearchResult::new("file.mp3", 100));
		assert_eq!(placement.group(), groups[2]);
		assert_eq!(index.len(), 5);
		assert_eq!(index.result_count(), 6);
	}

	#[test]
	fn hashed_and_unhashed_results_stay_apart() {
		let mut index = GroupingIndex::default();
		let hashed = insert(&mut index, SearchResult::new("a.mp3", 1).with_hash(hash('A')));
		let plain = insert(&mut index, SearchResult::new("a.mp3", 1));
		assert_ne!(hashed.group(), plain.group());
	}

	#[test]
	fn grouping_can_be_disabled() {
		let mut index = GroupingIndex::new(false);
		let a = insert(&mut index, SearchResult::new("a.mp3", 1));
		let b = insert(&mut index, SearchResult::new("a.mp3", 1));
		assert_ne!(a.group(), b.group());
		assert!(!index.grouping());
	}

	#[test]
	fn malformed_results_are_rejected() {
		let mut index = GroupingIndex::default();
		assert_eq!(
			index.insert(SearchResult::new("", 1)),
			Err(ValidationError::EmptyFileName)
		);
		assert!(index.is_empty());
	}

	#[test]
	fn removing_the_canonical_result_reindexes_the_group() {
		let mut index = GroupingIndex::default();
		let first = insert(&mut index, SearchResult::new("Track One.mp3", 100));
		let second = insert(&mut index, SearchResult::new("track one.mp3", 100));
		assert_eq!(first.group(), second.group());

		let detached = index.remove(first.result()).unwrap();
		assert!(!detached.group_removed);
		assert_eq!(index.group(first.group()).unwrap().file_name(), "track one.mp3");

		let third = insert(&mut index, SearchResult::new("TRACK ONE.mp3", 100));
		assert_eq!(third.group(), first.group());

		index.remove(second.result()).unwrap();
		let last = index.remove(third.result()).unwrap();
		assert!(last.group_removed);
		assert!(index.is_empty());
		assert!(index.remove(third.result()).is_none());
	}

	#[test]
	fn remove_group_forgets_members_and_keys() {
		let mut index = GroupingIndex::default();
		let a = insert(&mut index, SearchResult::new("a.mp3", 1).with_hash(hash('A')));
		let b = insert(&mut index, SearchResult::new("a.mp3", 1).with_hash(hash('A')));
		assert!(index.remove_group(a.group()).is_some());
		assert!(index.remove_group(a.group()).is_none());
		assert_eq!(index.group_of(b.result()), None);
		assert_eq!(index.lookup_by_hash(&hash('A'), "mp3"), None);
	}
}
