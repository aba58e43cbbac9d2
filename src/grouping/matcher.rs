//! Decides whether two search results describe the same file.

use hitlist_result_api::{ContentHash, SearchResult};

/// Names may differ by at most this many edits, however long they are.
const MAX_NAME_EDITS: usize = 4;

/// Verdict of comparing two fingerprints.
///
/// Size-ordered scans rely on the distinction between the last two variants:
/// a [`MatchOutcome::Different`] candidate is too far away in size, so no
/// candidate further along the scan can match either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
	Identical,
	/// Same size, but the extension or the name disagrees.
	SameSizeDifferentName,
	Different,
}

/// The parts of a result that duplicate detection looks at, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
	pub hash: Option<ContentHash>,
	/// Case-folded extension without the dot.
	pub extension: String,
	pub size: u64,
	/// Stem after [`ApproximateMatcher::normalize`].
	pub normalized_name: String,
	/// Character count of the stem before normalization.
	pub name_len: usize,
}

impl Fingerprint {
	#[must_use]
	pub fn of(result: &SearchResult) -> Self {
		let stem = result.stem();
		Self {
			hash: result.hash.clone(),
			extension: result.extension().to_lowercase(),
			size: result.size,
			normalized_name: ApproximateMatcher::normalize(stem),
			name_len: stem.chars().count(),
		}
	}

	/// Number of edits tolerated between this name and `other`'s.
	#[must_use]
	pub fn allowed_edits(&self, other: &Fingerprint) -> usize {
		let shorter = self.name_len.min(other.name_len);
		let tenth = (shorter as f64 * 0.10).round() as usize;
		tenth.min(MAX_NAME_EDITS)
	}
}

/// Case- and whitespace-insensitive bounded edit distance over file names.
pub struct ApproximateMatcher;

impl ApproximateMatcher {
	/// Lower-case `name` and collapse every whitespace run to one space.
	#[must_use]
	pub fn normalize(name: &str) -> String {
		name.split_whitespace()
			.map(str::to_lowercase)
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// True when `a` can be turned into `b` with at most `max_edits`
	/// insertions, deletions or substitutions.
	#[must_use]
	pub fn matches(a: &str, b: &str, max_edits: usize) -> bool {
		if a == b {
			return true;
		}
		let a: Vec<char> = a.chars().collect();
		let b: Vec<char> = b.chars().collect();
		if a.len().abs_diff(b.len()) > max_edits {
			return false;
		}

		let mut previous: Vec<usize> = (0..=b.len()).collect();
		let mut current = vec![0; b.len() + 1];
		for (i, ca) in a.iter().enumerate() {
			current[0] = i + 1;
			let mut row_min = current[0];
			for (j, cb) in b.iter().enumerate() {
				let cost = usize::from(ca != cb);
				current[j + 1] = (previous[j + 1] + 1)
					.min(current[j] + 1)
					.min(previous[j] + cost);
				row_min = row_min.min(current[j + 1]);
			}
			if row_min > max_edits {
				return false;
			}
			std::mem::swap(&mut previous, &mut current);
		}
		previous[b.len()] <= max_edits
	}
}

/// Compare two fingerprints.
///
/// Extensions must always agree. When both sides carry a content hash the
/// hash alone decides; otherwise sizes must be equal and the normalized names
/// within [`Fingerprint::allowed_edits`].
#[must_use]
pub fn match_fingerprints(a: &Fingerprint, b: &Fingerprint) -> MatchOutcome {
	if let (Some(left), Some(right)) = (&a.hash, &b.hash) {
		return if left == right && a.extension == b.extension {
			MatchOutcome::Identical
		} else {
			MatchOutcome::Different
		};
	}

	if a.size != b.size {
		return MatchOutcome::Different;
	}
	if a.extension != b.extension {
		return MatchOutcome::SameSizeDifferentName;
	}
	if ApproximateMatcher::matches(&a.normalized_name, &b.normalized_name, a.allowed_edits(b)) {
		MatchOutcome::Identical
	} else {
		MatchOutcome::SameSizeDifferentName
	}
}

/// Convenience wrapper comparing two raw results.
#[must_use]
pub fn match_results(a: &SearchResult, b: &SearchResult) -> MatchOutcome {
	match_fingerprints(&Fingerprint::of(a), &Fingerprint::of(b))
}
