use std::collections::BTreeSet;
use std::fmt;

use hitlist_result_api::{
	ContentHash, MediaType, MediaTypeRegistry, Quality, ResultDocument, ResultKind, SearchResult,
	SpeedClass,
};

/// Identifies a [`ResultGroup`] for the lifetime of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) u64);

impl fmt::Display for GroupId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "g{}", self.0)
	}
}

/// Identifies one accepted [`SearchResult`] inside a grouping index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultId(pub(crate) u64);

impl fmt::Display for ResultId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "r{}", self.0)
	}
}

/// Privilege level of a group, from lowest to highest.
///
/// Privileged tiers outrank any ordinary source count when sorting by count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResultTier {
	Ordinary,
	Multicast,
	Secure,
	Promoted,
}

/// Results believed to describe the same file, shown as one row.
///
/// The first member is the canonical result; its name, size and vendor are
/// what the row displays. Aggregates are kept current as members come and go.
#[derive(Debug, Clone)]
pub struct ResultGroup {
	id: GroupId,
	members: Vec<(ResultId, SearchResult)>,
	sources: BTreeSet<String>,
	speed: u32,
	measured_speed: bool,
	quality: Quality,
	spam_score: f32,
	secure: bool,
	multicast: bool,
	created_at: Option<i64>,
	document: Option<ResultDocument>,
	user_junk: Option<bool>,
}

impl ResultGroup {
	pub(crate) fn new(id: GroupId, result_id: ResultId, result: SearchResult) -> Self {
		let mut group = Self {
			id,
			members: Vec::with_capacity(1),
			sources: BTreeSet::new(),
			speed: 0,
			measured_speed: false,
			quality: Quality::Poor,
			spam_score: 0.0,
			secure: false,
			multicast: false,
			created_at: None,
			document: None,
			user_junk: None,
		};
		group.push(result_id, result);
		group
	}

	/// Merge another member in and fold it into the aggregates.
	pub(crate) fn push(&mut self, result_id: ResultId, result: SearchResult) {
		self.absorb(&result);
		self.members.push((result_id, result));
	}

	/// Remove a member, recomputing aggregates from the remaining ones.
	pub(crate) fn detach(&mut self, result_id: ResultId) -> Option<SearchResult> {
		let position = self.members.iter().position(|(id, _)| *id == result_id)?;
		let (_, removed) = self.members.remove(position);
		self.recompute();
		Some(removed)
	}

	pub(crate) fn set_user_junk(&mut self, verdict: Option<bool>) {
		self.user_junk = verdict;
	}

	fn absorb(&mut self, result: &SearchResult) {
		let first = self.members.is_empty();
		if let Some(source) = &result.source {
			self.sources.insert(source.clone());
		}
		if first || result.speed > self.speed {
			self.speed = result.speed;
			self.measured_speed = result.measured_speed;
		}
		self.quality = if first {
			result.quality
		} else {
			self.quality.max(result.quality)
		};
		self.spam_score = if first {
			result.spam_score
		} else {
			self.spam_score.max(result.spam_score)
		};
		self.secure |= result.secure;
		self.multicast |= result.kind == ResultKind::Multicast;
		if let Some(created) = result.creation_time() {
			self.created_at = Some(self.created_at.map_or(created, |known| known.min(created)));
		}
		if self.document.is_none() {
			self.document = result.document.clone().filter(|doc| !doc.is_empty());
		}
	}

	fn recompute(&mut self) {
		let members = std::mem::take(&mut self.members);
		self.sources.clear();
		self.speed = 0;
		self.measured_speed = false;
		self.quality = Quality::Poor;
		self.spam_score = 0.0;
		self.secure = false;
		self.multicast = false;
		self.created_at = None;
		self.document = None;
		for (id, result) in members {
			self.push(id, result);
		}
	}

	#[must_use]
	pub fn id(&self) -> GroupId {
		self.id
	}

	/// The result the row is named after.
	///
	/// # Panics
	///
	/// Never in practice: groups with no members are dropped by the index.
	#[must_use]
	pub fn canonical(&self) -> &SearchResult {
		&self.members[0].1
	}

	pub(crate) fn canonical_id(&self) -> ResultId {
		self.members[0].0
	}

	/// Every member after the canonical one.
	pub fn others(&self) -> impl Iterator<Item = &SearchResult> {
		self.members.iter().skip(1).map(|(_, result)| result)
	}

	pub fn results(&self) -> impl Iterator<Item = (ResultId, &SearchResult)> {
		self.members.iter().map(|(id, result)| (*id, result))
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.members.is_empty()
	}

	/// Number of results merged into this group.
	#[must_use]
	pub fn source_count(&self) -> usize {
		self.members.len()
	}

	/// Distinct host addresses that reported this file.
	pub fn sources(&self) -> impl Iterator<Item = &str> {
		self.sources.iter().map(String::as_str)
	}

	#[must_use]
	pub fn file_name(&self) -> &str {
		&self.canonical().file_name
	}

	#[must_use]
	pub fn extension(&self) -> &str {
		self.canonical().extension()
	}

	#[must_use]
	pub fn size(&self) -> u64 {
		self.canonical().size
	}

	#[must_use]
	pub fn hash(&self) -> Option<&ContentHash> {
		self.canonical().hash.as_ref()
	}

	#[must_use]
	pub fn vendor(&self) -> &str {
		&self.canonical().vendor
	}

	/// Fastest speed any member advertised.
	#[must_use]
	pub fn speed(&self) -> u32 {
		self.speed
	}

	#[must_use]
	pub fn measured_speed(&self) -> bool {
		self.measured_speed
	}

	#[must_use]
	pub fn speed_class(&self) -> SpeedClass {
		SpeedClass::from_kbps(self.speed)
	}

	/// Best quality any member reported.
	#[must_use]
	pub fn quality(&self) -> Quality {
		self.quality
	}

	#[must_use]
	pub fn is_secure(&self) -> bool {
		self.secure
	}

	#[must_use]
	pub fn is_promoted(&self) -> bool {
		self.canonical().kind == ResultKind::Promoted
	}

	#[must_use]
	pub fn tier(&self) -> ResultTier {
		if self.is_promoted() {
			ResultTier::Promoted
		} else if self.secure {
			ResultTier::Secure
		} else if self.multicast {
			ResultTier::Multicast
		} else {
			ResultTier::Ordinary
		}
	}

	/// Spam rating of the group: the user's verdict when one was given,
	/// otherwise the worst score any member carried.
	#[must_use]
	pub fn spam_score(&self) -> f32 {
		match self.user_junk {
			Some(true) => 1.0,
			Some(false) => 0.0,
			None => self.spam_score,
		}
	}

	#[must_use]
	pub fn user_junk(&self) -> Option<bool> {
		self.user_junk
	}

	/// Earliest known creation time among members.
	#[must_use]
	pub fn created_at(&self) -> Option<i64> {
		self.created_at
	}

	#[must_use]
	pub fn document(&self) -> Option<&ResultDocument> {
		self.document.as_ref()
	}

	/// Media family, preferring the metadata schema over the extension.
	#[must_use]
	pub fn media_type(&self, registry: &MediaTypeRegistry) -> MediaType {
		match &self.document {
			Some(document) => registry.for_schema(&document.schema),
			None => registry.for_extension(self.extension()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn group_of(results: Vec<SearchResult>) -> ResultGroup {
		let mut iter = results.into_iter().enumerate();
		let (_, first) = iter.next().unwrap();
		let mut group = ResultGroup::new(GroupId(1), ResultId(0), first);
		for (index, result) in iter {
			group.push(ResultId(index as u64), result);
		}
		group
	}

	#[test]
	fn aggregates_take_best_values() {
		let group = group_of(vec![
			SearchResult::new("a.mp3", 5)
				.with_speed(40, false)
				.with_quality(Quality::Fair)
				.with_spam_score(0.2)
				.with_created_at(300)
				.with_source("1.1.1.1:6346"),
			SearchResult::new("a.mp3", 5)
				.with_speed(900, true)
				.with_quality(Quality::Good)
				.with_spam_score(0.7)
				.with_created_at(100)
				.with_source("2.2.2.2:6346"),
			SearchResult::new("a.mp3", 5).with_source("1.1.1.1:6346"),
		]);
		assert_eq!(group.source_count(), 3);
		assert_eq!(group.sources().count(), 2);
		assert_eq!(group.speed(), 900);
		assert!(group.measured_speed());
		assert_eq!(group.quality(), Quality::Good);
		assert_eq!(group.spam_score(), 0.7);
		assert_eq!(group.created_at(), Some(100));
	}

	#[test]
	fn detach_recomputes_and_promotes_next_canonical() {
		let mut group = group_of(vec![
			SearchResult::new("first.mp3", 5).with_speed(900, false),
			SearchResult::new("second.mp3", 5).with_speed(10, false),
		]);
		assert!(group.detach(ResultId(0)).is_some());
		assert_eq!(group.file_name(), "second.mp3");
		assert_eq!(group.speed(), 10);
		assert!(group.detach(ResultId(0)).is_none());
		assert!(group.detach(ResultId(1)).is_some());
		assert!(group.is_empty());
	}

	#[test]
	fn tier_prefers_promotion_then_security_then_multicast() {
		let multicast = group_of(vec![
			SearchResult::new("a", 1),
			SearchResult::new("a", 1).with_kind(ResultKind::Multicast),
		]);
		assert_eq!(multicast.tier(), ResultTier::Multicast);

		let secure = group_of(vec![
			SearchResult::new("a", 1).with_kind(ResultKind::Multicast),
			SearchResult::new("a", 1).with_secure(true),
		]);
		assert_eq!(secure.tier(), ResultTier::Secure);

		let promoted = group_of(vec![
			SearchResult::new("a", 1)
				.with_kind(ResultKind::Promoted)
				.with_secure(true),
		]);
		assert_eq!(promoted.tier(), ResultTier::Promoted);
		assert!(ResultTier::Promoted > ResultTier::Secure);
		assert!(ResultTier::Multicast > ResultTier::Ordinary);
	}

	#[test]
	fn user_verdict_overrides_spam_score() {
		let mut group = group_of(vec![SearchResult::new("a", 1).with_spam_score(0.3)]);
		group.set_user_junk(Some(true));
		assert_eq!(group.spam_score(), 1.0);
		group.set_user_junk(Some(false));
		assert_eq!(group.spam_score(), 0.0);
		group.set_user_junk(None);
		assert_eq!(group.spam_score(), 0.3);
	}

	#[test]
	fn media_type_prefers_document_schema() {
		let registry = MediaTypeRegistry::default();
		let plain = group_of(vec![SearchResult::new("clip.avi", 1)]);
		assert_eq!(plain.media_type(&registry), MediaType::Video);

		let tagged = group_of(vec![
			SearchResult::new("clip.avi", 1)
				.with_document(ResultDocument::new("audio").with_field("artist", "x")),
		]);
		assert_eq!(tagged.media_type(&registry), MediaType::Audio);
	}
}
