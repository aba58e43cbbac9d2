use std::collections::BTreeMap;

use super::group::GroupId;
use super::matcher::{Fingerprint, MatchOutcome, match_fingerprints};

/// Result of scanning one size bucket.
enum BucketScan {
	Found(GroupId),
	/// Nothing matched, but a neighbouring bucket still could.
	KeepScanning,
	/// A candidate was too far away in size; stop this direction.
	Stop,
}

/// Finds groups without a content hash by approximate comparison.
///
/// Two results can only match when their sizes agree, so candidates are kept
/// in buckets ordered by size and scanned outward from the probe's size.
/// Several files of exactly the same size share one bucket.
#[derive(Debug, Default)]
pub struct SizeIndex {
	buckets: BTreeMap<u64, Vec<(GroupId, Fingerprint)>>,
}

impl SizeIndex {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.buckets.is_empty()
	}

	pub fn clear(&mut self) {
		self.buckets.clear();
	}

	/// Register `group` under its canonical fingerprint.
	pub fn add(&mut self, group: GroupId, fingerprint: Fingerprint) {
		self.buckets
			.entry(fingerprint.size)
			.or_default()
			.push((group, fingerprint));
	}

	/// Drop `group` from the bucket for `size`. Returns whether it was present.
	pub fn remove(&mut self, group: GroupId, size: u64) -> bool {
		let Some(bucket) = self.buckets.get_mut(&size) else {
			return false;
		};
		let before = bucket.len();
		bucket.retain(|(id, _)| *id != group);
		let removed = bucket.len() != before;
		if bucket.is_empty() {
			self.buckets.remove(&size);
		}
		removed
	}

	/// Find a registered group whose fingerprint matches `probe`.
	///
	/// Buckets at or above the probe's size are scanned upward first, then
	/// the smaller ones downward. Each direction ends at the first bucket
	/// holding a size mismatch.
	#[must_use]
	pub fn find(&self, probe: &Fingerprint) -> Option<GroupId> {
		for bucket in self.buckets.range(probe.size..).map(|(_, bucket)| bucket) {
			match scan_bucket(bucket, probe) {
				BucketScan::Found(id) => return Some(id),
				BucketScan::Stop => break,
				BucketScan::KeepScanning => {}
			}
		}

		for bucket in self.buckets.range(..probe.size).rev().map(|(_, bucket)| bucket) {
			match scan_bucket(bucket, probe) {
				BucketScan::Found(id) => return Some(id),
				BucketScan::Stop => break,
				BucketScan::KeepScanning => {}
			}
		}

		None
	}

	/// Number of registered groups across all buckets.
	#[must_use]
	pub fn len(&self) -> usize {
		self.buckets.values().map(Vec::len).sum()
	}
}

fn scan_bucket(bucket: &[(GroupId, Fingerprint)], probe: &Fingerprint) -> BucketScan {
	for (id, candidate) in bucket {
		match match_fingerprints(candidate, probe) {
			MatchOutcome::Identical => return BucketScan::Found(*id),
			MatchOutcome::Different => return BucketScan::Stop,
			MatchOutcome::SameSizeDifferentName => {}
		}
	}
	BucketScan::KeepScanning
}

#[cfg(test)]
mod tests {
	use hitlist_result_api::SearchResult;

	use super::*;

	fn fp(name: &str, size: u64) -> Fingerprint {
		Fingerprint::of(&SearchResult::new(name, size))
	}

	#[test]
	fn finds_exact_size_among_neighbours() {
		let mut index = SizeIndex::new();
		for (id, size) in [90, 99, 100, 101, 110].into_iter().enumerate() {
			index.add(GroupId(id as u64), fp("file.mp3", size));
		}
		assert_eq!(index.find(&fp("file.mp3", 100)), Some(GroupId(2)));
		assert_eq!(index.find(&fp("file.mp3", 95)), None);
		assert_eq!(index.find(&fp("other.mp3", 100)), None);
	}

	#[test]
	fn scans_past_same_size_mismatches_in_a_bucket() {
		let mut index = SizeIndex::new();
		index.add(GroupId(1), fp("alpha.mp3", 100));
		index.add(GroupId(2), fp("alpha.ogg", 100));
		index.add(GroupId(3), fp("beta.ogg", 100));
		assert_eq!(index.find(&fp("beta.ogg", 100)), Some(GroupId(3)));
	}

	#[test]
	fn remove_drops_empty_buckets() {
		let mut index = SizeIndex::new();
		index.add(GroupId(1), fp("a.mp3", 100));
		assert!(index.remove(GroupId(1), 100));
		assert!(!index.remove(GroupId(1), 100));
		assert!(index.is_empty());
		assert_eq!(index.find(&fp("a.mp3", 100)), None);
	}

	#[test]
	fn probes_with_no_buckets_return_none() {
		let index = SizeIndex::new();
		assert_eq!(index.find(&fp("a.mp3", 1)), None);
		assert_eq!(index.len(), 0);
	}
}
