use serde::{Deserialize, Serialize};

use super::RowFilter;
use crate::grouping::ResultGroup;

/// What a result panel does with groups classified as junk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JunkPolicy {
	/// Keep junk out of the visible rows.
	#[default]
	Hide,
	/// Show junk below everything else.
	Sink,
	/// Treat junk like any other group.
	Ignore,
}

impl JunkPolicy {
	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Self::Hide => "hide",
			Self::Sink => "sink",
			Self::Ignore => "ignore",
		}
	}
}

impl std::str::FromStr for JunkPolicy {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"hide" => Ok(Self::Hide),
			"sink" => Ok(Self::Sink),
			"ignore" | "show" => Ok(Self::Ignore),
			_ => Err(format!("unknown junk policy '{value}'")),
		}
	}
}

/// Default spam rating at or above which a group counts as junk.
pub const DEFAULT_SPAM_THRESHOLD: f32 = 0.9;

/// Classifies groups by spam rating; allows the ones that are not junk.
///
/// Promoted results are never junk unless the user marks them so.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunkFilter {
	threshold: f32,
}

impl JunkFilter {
	/// Thresholds are clamped into `0.0..=1.0`; a NaN falls back to the default.
	#[must_use]
	pub fn new(threshold: f32) -> Self {
		let threshold = if threshold.is_nan() {
			DEFAULT_SPAM_THRESHOLD
		} else {
			threshold.clamp(0.0, 1.0)
		};
		Self { threshold }
	}

	#[must_use]
	pub fn threshold(&self) -> f32 {
		self.threshold
	}

	/// The user's verdict wins over the spam rating, whatever the threshold.
	#[must_use]
	pub fn is_junk(&self, group: &ResultGroup) -> bool {
		match group.user_junk() {
			Some(verdict) => verdict,
			None => !group.is_promoted() && group.spam_score() >= self.threshold,
		}
	}
}

impl Default for JunkFilter {
	fn default() -> Self {
		Self::new(DEFAULT_SPAM_THRESHOLD)
	}
}

impl RowFilter for JunkFilter {
	fn allow(&self, group: &ResultGroup) -> bool {
		!self.is_junk(group)
	}
}
