//! Duplicate detection and the per-search grouping index.

mod group;
mod index;
pub mod matcher;
mod size_index;

pub use group::{GroupId, ResultGroup, ResultId, ResultTier};
pub use index::{Detached, GroupingIndex, Placement};
pub use matcher::{ApproximateMatcher, Fingerprint, MatchOutcome, match_fingerprints, match_results};
pub use size_index::SizeIndex;
