use std::sync::Arc;

use hitlist_result_api::{MediaType, MediaTypeRegistry, SpeedClass};

use super::RowFilter;
use crate::grouping::ResultGroup;

/// Matches a simple property of the group's canonical result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyFilter {
	/// File extension, compared case-insensitively.
	Extension(String),
	Speed(SpeedClass),
	/// Vendor code, compared case-insensitively.
	Vendor(String),
}

impl RowFilter for PropertyFilter {
	fn allow(&self, group: &ResultGroup) -> bool {
		match self {
			Self::Extension(extension) => extension.eq_ignore_ascii_case(group.extension()),
			Self::Speed(class) => group.speed_class() == *class,
			Self::Vendor(vendor) => vendor.eq_ignore_ascii_case(group.vendor().trim()),
		}
	}
}

/// Matches one metadata field of a given media family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
	pub media: MediaType,
	pub field: String,
	pub value: String,
}

impl FieldFilter {
	#[must_use]
	pub fn new(media: MediaType, field: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			media,
			field: field.into(),
			value: value.into(),
		}
	}

	fn allow_with(&self, group: &ResultGroup, registry: &MediaTypeRegistry) -> bool {
		let Some(document) = group.document() else {
			return false;
		};
		registry.for_schema(&document.schema) == self.media
			&& document
				.value(&self.field)
				.is_some_and(|value| value.trim().eq_ignore_ascii_case(self.value.trim()))
	}
}

/// One facet selection, as stored in a [`CompositeFilter`](super::CompositeFilter) slot.
#[derive(Debug, Clone)]
pub enum FacetFilter {
	Property(PropertyFilter),
	Field {
		filter: FieldFilter,
		registry: Arc<MediaTypeRegistry>,
	},
	Media {
		media: MediaType,
		registry: Arc<MediaTypeRegistry>,
	},
}

impl FacetFilter {
	#[must_use]
	pub fn field(filter: FieldFilter, registry: Arc<MediaTypeRegistry>) -> Self {
		Self::Field { filter, registry }
	}

	#[must_use]
	pub fn media(media: MediaType, registry: Arc<MediaTypeRegistry>) -> Self {
		Self::Media { media, registry }
	}
}

impl PartialEq for FacetFilter {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Property(a), Self::Property(b)) => a == b,
			(
				Self::Field {
					filter: a,
					registry: ra,
				},
				Self::Field {
					filter: b,
					registry: rb,
				},
			) => a == b && Arc::ptr_eq(ra, rb),
			(
				Self::Media {
					media: a,
					registry: ra,
				},
				Self::Media {
					media: b,
					registry: rb,
				},
			) => a == b && Arc::ptr_eq(ra, rb),
			_ => false,
		}
	}
}

impl RowFilter for FacetFilter {
	fn allow(&self, group: &ResultGroup) -> bool {
		match self {
			Self::Property(filter) => filter.allow(group),
			Self::Field { filter, registry } => filter.allow_with(group, registry),
			Self::Media { media, registry } => group.media_type(registry) == *media,
		}
	}
}

#[cfg(test)]
mod tests {
	use hitlist_result_api::{ResultDocument, SearchResult};

	use super::*;
	use crate::grouping::GroupingIndex;

	fn index_with(results: Vec<SearchResult>) -> GroupingIndex {
		let mut index = GroupingIndex::new(false);
		for result in results {
			index.insert(result).unwrap();
		}
		index
	}

	#[test]
	fn property_filters_match_extension_speed_and_vendor() {
		let index = index_with(vec![
			SearchResult::new("a.MP3", 1)
				.with_speed(300, true)
				.with_vendor("LIME"),
		]);
		let group = index.groups().next().unwrap();
		assert!(PropertyFilter::Extension("mp3".into()).allow(group));
		assert!(!PropertyFilter::Extension("ogg".into()).allow(group));
		assert!(PropertyFilter::Speed(SpeedClass::Cable).allow(group));
		assert!(!PropertyFilter::Speed(SpeedClass::T1).allow(group));
		assert!(PropertyFilter::Vendor("LIME".into()).allow(group));
		assert!(PropertyFilter::Vendor("lime".into()).allow(group));
		assert!(!PropertyFilter::Vendor("BEAR".into()).allow(group));
	}

	#[test]
	fn field_filter_needs_matching_schema_and_value() {
		let registry = Arc::new(MediaTypeRegistry::default());
		let index = index_with(vec![
			SearchResult::new("a.mp3", 1)
				.with_document(ResultDocument::new("audio").with_field("artist", "Sammy B")),
			SearchResult::new("b.mp3", 1),
		]);
		let mut groups = index.groups();
		let tagged = groups.next().unwrap();
		let untagged = groups.next().unwrap();

		let filter = FacetFilter::field(
			FieldFilter::new(MediaType::Audio, "artist", "sammy b"),
			Arc::clone(&registry),
		);
		assert!(filter.allow(tagged));
		assert!(!filter.allow(untagged));

		let wrong_schema = FacetFilter::field(
			FieldFilter::new(MediaType::Video, "artist", "sammy b"),
			registry,
		);
		assert!(!wrong_schema.allow(tagged));
	}

	#[test]
	fn media_filter_uses_registry() {
		let registry = Arc::new(MediaTypeRegistry::default());
		let index = index_with(vec![SearchResult::new("movie.mkv", 1)]);
		let group = index.groups().next().unwrap();
		assert!(FacetFilter::media(MediaType::Video, Arc::clone(&registry)).allow(group));
		assert!(!FacetFilter::media(MediaType::Audio, registry).allow(group));
	}
}
