use std::fmt;
use std::sync::Arc;

use hitlist_result_api::{MediaType, MediaTypeRegistry, SpeedClass};

use crate::filters::{FacetFilter, FieldFilter, PropertyFilter};

/// Properties every group has, independent of metadata documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
	/// File extension.
	Type,
	Speed,
	Vendor,
}

impl PropertyKind {
	pub const ALL: [PropertyKind; 3] = [Self::Type, Self::Speed, Self::Vendor];

	#[must_use]
	pub fn label(self) -> &'static str {
		match self {
			Self::Type => "type",
			Self::Speed => "speed",
			Self::Vendor => "vendor",
		}
	}
}

/// Axis a facet chooser can browse by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
	/// Media family of the group.
	Media,
	/// One field of a metadata document of the given family.
	Field { media: MediaType, field: String },
	Property(PropertyKind),
}

impl Selector {
	#[must_use]
	pub fn field(media: MediaType, field: impl Into<String>) -> Self {
		Self::Field {
			media,
			field: field.into(),
		}
	}

	/// Filter that keeps only groups carrying `value` on this axis.
	///
	/// Returns `None` when the value cannot occur on this axis.
	#[must_use]
	pub fn filter_for(
		&self,
		value: &FacetValue,
		registry: &Arc<MediaTypeRegistry>,
	) -> Option<FacetFilter> {
		match (self, value) {
			(Self::Media, FacetValue::Media(media)) => {
				Some(FacetFilter::media(*media, Arc::clone(registry)))
			}
			(Self::Field { media, field }, FacetValue::Text(text)) => Some(FacetFilter::field(
				FieldFilter::new(*media, field.clone(), text.clone()),
				Arc::clone(registry),
			)),
			(Self::Property(PropertyKind::Type), FacetValue::Text(extension)) => Some(
				FacetFilter::Property(PropertyFilter::Extension(extension.clone())),
			),
			(Self::Property(PropertyKind::Speed), FacetValue::Speed(class)) => {
				Some(FacetFilter::Property(PropertyFilter::Speed(*class)))
			}
			(Self::Property(PropertyKind::Vendor), FacetValue::Text(vendor)) => {
				Some(FacetFilter::Property(PropertyFilter::Vendor(vendor.clone())))
			}
			_ => None,
		}
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Media => f.write_str("media"),
			Self::Field { media, field } => write!(f, "{media}.{field}"),
			Self::Property(kind) => f.write_str(kind.label()),
		}
	}
}

/// A value seen on some [`Selector`] axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FacetValue {
	Media(MediaType),
	Speed(SpeedClass),
	Text(String),
}

impl FacetValue {
	/// Key under which equivalent values are counted together.
	pub(super) fn key(&self) -> FacetValue {
		match self {
			Self::Text(text) => Self::Text(text.to_lowercase()),
			other => other.clone(),
		}
	}
}

impl fmt::Display for FacetValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Media(media) => write!(f, "{media}"),
			Self::Speed(class) => write!(f, "{class}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}
