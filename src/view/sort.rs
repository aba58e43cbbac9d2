use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filters::JunkFilter;
use crate::grouping::{ResultGroup, ResultTier};

/// Column a result table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
	/// Star quality, the default relevance order.
	Quality,
	/// Number of sources, with privileged results ranked above any count.
	Count,
	Name,
	Size,
	Speed,
	Date,
	Vendor,
	Spam,
}

impl SortKey {
	pub const ALL: [SortKey; 8] = [
		Self::Quality,
		Self::Count,
		Self::Name,
		Self::Size,
		Self::Speed,
		Self::Date,
		Self::Vendor,
		Self::Spam,
	];

	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Self::Quality => "quality",
			Self::Count => "count",
			Self::Name => "name",
			Self::Size => "size",
			Self::Speed => "speed",
			Self::Date => "date",
			Self::Vendor => "vendor",
			Self::Spam => "spam",
		}
	}

	fn compare(self, a: &ResultGroup, b: &ResultGroup) -> Ordering {
		match self {
			Self::Quality => a.quality().cmp(&b.quality()),
			Self::Count => count_rank(a)
				.cmp(&count_rank(b))
				.then_with(|| a.quality().cmp(&b.quality())),
			Self::Name => a
				.file_name()
				.to_lowercase()
				.cmp(&b.file_name().to_lowercase()),
			Self::Size => a.size().cmp(&b.size()),
			Self::Speed => a.speed().cmp(&b.speed()),
			Self::Date => a.created_at().cmp(&b.created_at()),
			Self::Vendor => a.vendor().cmp(b.vendor()),
			Self::Spam => a.spam_score().total_cmp(&b.spam_score()),
		}
	}
}

impl fmt::Display for SortKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for SortKey {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let wanted = value.trim().to_ascii_lowercase();
		match wanted.as_str() {
			"relevance" => Ok(Self::Quality),
			"sources" => Ok(Self::Count),
			other => Self::ALL
				.into_iter()
				.find(|key| key.label() == other)
				.ok_or_else(|| format!("unknown sort key '{value}'")),
		}
	}
}

/// Tier first; ordinary groups then rank by their source count.
fn count_rank(group: &ResultGroup) -> (ResultTier, usize) {
	match group.tier() {
		ResultTier::Ordinary => (ResultTier::Ordinary, group.source_count()),
		tier => (tier, 0),
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Ascending,
	#[default]
	Descending,
}

impl SortDirection {
	fn apply(self, ordering: Ordering) -> Ordering {
		match self {
			Self::Ascending => ordering,
			Self::Descending => ordering.reverse(),
		}
	}
}

/// A sort key together with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
	pub key: SortKey,
	#[serde(default)]
	pub direction: SortDirection,
}

impl SortOrder {
	#[must_use]
	pub fn new(key: SortKey, direction: SortDirection) -> Self {
		Self { key, direction }
	}

	#[must_use]
	pub fn ascending(key: SortKey) -> Self {
		Self::new(key, SortDirection::Ascending)
	}

	#[must_use]
	pub fn descending(key: SortKey) -> Self {
		Self::new(key, SortDirection::Descending)
	}
}

/// Row ordering of a result table.
///
/// Promoted groups always come first and, when sinking junk, junk groups
/// always come last. Everything between is ordered by the active
/// [`SortOrder`]; with no order, or on ties, callers keep the existing
/// relative order.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowOrder {
	pub(crate) sort: Option<SortOrder>,
	pub(crate) sink: Option<JunkFilter>,
}

impl RowOrder {
	pub(crate) fn compare(&self, a: &ResultGroup, b: &ResultGroup) -> Ordering {
		b.is_promoted()
			.cmp(&a.is_promoted())
			.then_with(|| match &self.sink {
				Some(junk) => junk.is_junk(a).cmp(&junk.is_junk(b)),
				None => Ordering::Equal,
			})
			.then_with(|| match self.sort {
				Some(order) => order.direction.apply(order.key.compare(a, b)),
				None => Ordering::Equal,
			})
	}
}
