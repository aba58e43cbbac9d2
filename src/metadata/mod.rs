//! Facet index over the groups of one search.
//!
//! Every group is indexed under its media family, the fields of its metadata
//! document and its simple properties. Facet choosers list the values seen on
//! an axis together with how many groups carry them, optionally narrowed to
//! the groups selected on another axis.

mod selector;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use hitlist_result_api::MediaTypeRegistry;

pub use selector::{FacetValue, PropertyKind, Selector};

use crate::grouping::{GroupId, ResultGroup};

#[derive(Debug, Clone)]
struct Bucket {
	/// Spelling used by the earliest group still in the bucket.
	label: FacetValue,
	labelled_by: GroupId,
	groups: BTreeSet<GroupId>,
}

type Entry = (Selector, FacetValue);

#[derive(Debug, Clone)]
pub struct MetadataModel {
	registry: Arc<MediaTypeRegistry>,
	facets: BTreeMap<Selector, BTreeMap<FacetValue, Bucket>>,
	indexed: HashMap<GroupId, Vec<Entry>>,
}

impl Default for MetadataModel {
	fn default() -> Self {
		Self::new(Arc::new(MediaTypeRegistry::default()))
	}
}

impl MetadataModel {
	#[must_use]
	pub fn new(registry: Arc<MediaTypeRegistry>) -> Self {
		Self {
			registry,
			facets: BTreeMap::new(),
			indexed: HashMap::new(),
		}
	}

	#[must_use]
	pub fn registry(&self) -> &Arc<MediaTypeRegistry> {
		&self.registry
	}

	/// Index `group`, replacing whatever was recorded for it before.
	pub fn add_group(&mut self, group: &ResultGroup) {
		let entries = self.entries_of(group);
		self.replace(group.id(), entries);
	}

	/// Forget `group_id`. Returns whether it was indexed.
	pub fn remove_group(&mut self, group_id: GroupId) -> bool {
		let Some(entries) = self.indexed.remove(&group_id) else {
			return false;
		};
		for (selector, value) in entries {
			self.unlink(group_id, &selector, &value);
		}
		true
	}

	/// Re-read one property of an indexed group after a merge changed it.
	///
	/// Returns whether the recorded value changed. Groups that are not
	/// indexed are left alone.
	pub fn update_property(&mut self, group: &ResultGroup, kind: PropertyKind) -> bool {
		let Some(current) = self.indexed.get(&group.id()) else {
			return false;
		};
		let axis = Selector::Property(kind);
		let mut entries: Vec<Entry> = current
			.iter()
			.filter(|(selector, _)| *selector != axis)
			.cloned()
			.collect();
		entries.extend(property_value(group, kind).map(|value| (axis.clone(), value)));
		self.replace(group.id(), entries)
	}

	/// Re-read every facet of an indexed group. Returns whether anything
	/// changed.
	pub fn refresh_group(&mut self, group: &ResultGroup) -> bool {
		if !self.indexed.contains_key(&group.id()) {
			return false;
		}
		let entries = self.entries_of(group);
		self.replace(group.id(), entries)
	}

	fn replace(&mut self, group_id: GroupId, entries: Vec<Entry>) -> bool {
		let previous = self.indexed.remove(&group_id).unwrap_or_default();
		let changed = previous.len() != entries.len()
			|| previous.iter().any(|entry| !entries.contains(entry));
		for (selector, value) in previous.iter().filter(|entry| !entries.contains(entry)) {
			self.unlink(group_id, selector, value);
		}
		for (selector, value) in entries.iter().filter(|entry| !previous.contains(entry)) {
			self.link(group_id, selector, value);
		}
		self.indexed.insert(group_id, entries);
		changed
	}

	fn link(&mut self, group_id: GroupId, selector: &Selector, value: &FacetValue) {
		self.facets
			.entry(selector.clone())
			.or_default()
			.entry(value.key())
			.or_insert_with(|| Bucket {
				label: value.clone(),
				labelled_by: group_id,
				groups: BTreeSet::new(),
			})
			.groups
			.insert(group_id);
	}

	/// Spelling `group_id` recorded for the value keyed `key` on `selector`.
	fn spelling_of(
		&self,
		group_id: GroupId,
		selector: &Selector,
		key: &FacetValue,
	) -> Option<FacetValue> {
		self.indexed
			.get(&group_id)?
			.iter()
			.find(|(axis, value)| axis == selector && value.key() == *key)
			.map(|(_, value)| value.clone())
	}

	fn unlink(&mut self, group_id: GroupId, selector: &Selector, value: &FacetValue) {
		let Some(values) = self.facets.get_mut(selector) else {
			return;
		};
		let key = value.key();
		let mut relabel = None;
		if let Some(bucket) = values.get_mut(&key) {
			bucket.groups.remove(&group_id);
			match bucket.groups.first() {
				None => {
					values.remove(&key);
				}
				Some(&next) if bucket.labelled_by == group_id => relabel = Some(next),
				Some(_) => {}
			}
		}
		if values.is_empty() {
			self.facets.remove(selector);
		}

		let Some(next) = relabel else {
			return;
		};
		let label = self.spelling_of(next, selector, &key);
		if let Some(bucket) = self
			.facets
			.get_mut(selector)
			.and_then(|values| values.get_mut(&key))
		{
			if let Some(label) = label {
				bucket.label = label;
			}
			bucket.labelled_by = next;
		}
	}

	fn entries_of(&self, group: &ResultGroup) -> Vec<Entry> {
		let media = FacetValue::Media(group.media_type(&self.registry));
		let mut entries = vec![(Selector::Media, media)];
		if let Some(document) = group.document() {
			let media = self.registry.for_schema(&document.schema);
			for (field, value) in &document.fields {
				let value = value.trim();
				if !value.is_empty() {
					entries.push((
						Selector::field(media, field.clone()),
						FacetValue::Text(value.to_string()),
					));
				}
			}
		}
		for kind in PropertyKind::ALL {
			if let Some(value) = property_value(group, kind) {
				entries.push((Selector::Property(kind), value));
			}
		}
		entries
	}

	/// Axes that currently have at least one value: media first, then
	/// document fields, then properties.
	#[must_use]
	pub fn selector_options(&self) -> Vec<Selector> {
		self.facets.keys().cloned().collect()
	}

	/// Values seen on `selector` with the number of groups carrying each.
	#[must_use]
	pub fn values(&self, selector: &Selector) -> Vec<(FacetValue, usize)> {
		self.facets
			.get(selector)
			.map(|values| {
				values
					.values()
					.map(|bucket| (bucket.label.clone(), bucket.groups.len()))
					.collect()
			})
			.unwrap_or_default()
	}

	/// Groups carrying `value` on `selector`.
	#[must_use]
	pub fn groups_for(&self, selector: &Selector, value: &FacetValue) -> Option<&BTreeSet<GroupId>> {
		self.facets
			.get(selector)?
			.get(&value.key())
			.map(|bucket| &bucket.groups)
	}

	/// Values on `child` among the groups that carry `selection` on `parent`,
	/// with counts restricted to those groups.
	#[must_use]
	pub fn intersection(
		&self,
		parent: &Selector,
		selection: &FacetValue,
		child: &Selector,
	) -> Vec<(FacetValue, usize)> {
		let Some(selected) = self.groups_for(parent, selection) else {
			return Vec::new();
		};
		let Some(values) = self.facets.get(child) else {
			return Vec::new();
		};
		values
			.values()
			.filter_map(|bucket| {
				let count = bucket.groups.intersection(selected).count();
				(count > 0).then(|| (bucket.label.clone(), count))
			})
			.collect()
	}

	#[must_use]
	pub fn contains(&self, group_id: GroupId) -> bool {
		self.indexed.contains_key(&group_id)
	}

	/// Number of indexed groups.
	#[must_use]
	pub fn len(&self) -> usize {
		self.indexed.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.indexed.is_empty()
	}

	pub fn clear(&mut self) {
		self.facets.clear();
		self.indexed.clear();
	}
}

fn property_value(group: &ResultGroup, kind: PropertyKind) -> Option<FacetValue> {
	match kind {
		PropertyKind::Type => {
			let extension = group.extension();
			(!extension.is_empty()).then(|| FacetValue::Text(extension.to_lowercase()))
		}
		PropertyKind::Speed => Some(FacetValue::Speed(group.speed_class())),
		PropertyKind::Vendor => {
			let vendor = group.vendor().trim();
			(!vendor.is_empty()).then(|| FacetValue::Text(vendor.to_string()))
		}
	}
}

#[cfg(test)]
mod tests;
