use hitlist_result_api::{MediaType, ResultDocument, SearchResult, SpeedClass};

use super::*;
use crate::grouping::GroupingIndex;

fn tagged(name: &str, artist: &str, genre: &str) -> SearchResult {
	SearchResult::new(name, 1).with_document(
		ResultDocument::new("audio")
			.with_field("artist", artist)
			.with_field("genre", genre),
	)
}

fn indexed(results: Vec<SearchResult>) -> (GroupingIndex, MetadataModel) {
	let mut index = GroupingIndex::new(false);
	let mut model = MetadataModel::default();
	for result in results {
		let group = index.insert(result).unwrap().group();
		model.add_group(index.group(group).unwrap());
	}
	(index, model)
}

fn text(value: &str) -> FacetValue {
	FacetValue::Text(value.to_string())
}

#[test]
fn counts_values_per_axis() {
	let (_, model) = indexed(vec![
		tagged("a.mp3", "Sammy B", "Rock"),
		tagged("b.mp3", "Sammy B", "rock"),
		tagged("c.mp3", "Other", "Jazz"),
		SearchResult::new("d.avi", 1).with_vendor("LIME"),
	]);

	assert_eq!(
		model.values(&Selector::Media),
		vec![
			(FacetValue::Media(MediaType::Audio), 3),
			(FacetValue::Media(MediaType::Video), 1),
		]
	);
	assert_eq!(
		model.values(&Selector::field(MediaType::Audio, "genre")),
		vec![(text("Jazz"), 1), (text("Rock"), 2)]
	);
	assert_eq!(
		model.values(&Selector::Property(PropertyKind::Type)),
		vec![(text("avi"), 1), (text("mp3"), 3)]
	);
	assert_eq!(
		model.values(&Selector::Property(PropertyKind::Vendor)),
		vec![(text("LIME"), 1)]
	);
	assert_eq!(model.len(), 4);
}

#[test]
fn selector_options_list_populated_axes_in_order() {
	let (_, model) = indexed(vec![tagged("a.mp3", "Sammy B", "Rock")]);
	assert_eq!(
		model.selector_options(),
		vec![
			Selector::Media,
			Selector::field(MediaType::Audio, "artist"),
			Selector::field(MediaType::Audio, "genre"),
			Selector::Property(PropertyKind::Type),
			Selector::Property(PropertyKind::Speed),
		]
	);
}

#[test]
fn intersection_narrows_child_counts() {
	let (_, model) = indexed(vec![
		tagged("a.mp3", "Sammy B", "Rock"),
		tagged("b.mp3", "Sammy B", "Jazz"),
		tagged("c.mp3", "Other", "Rock"),
	]);
	let artist = Selector::field(MediaType::Audio, "artist");
	let genre = Selector::field(MediaType::Audio, "genre");

	assert_eq!(
		model.intersection(&artist, &text("sammy b"), &genre),
		vec![(text("Jazz"), 1), (text("Rock"), 1)]
	);
	assert_eq!(
		model.intersection(&artist, &text("Other"), &genre),
		vec![(text("Rock"), 1)]
	);
	assert!(model.intersection(&artist, &text("nobody"), &genre).is_empty());
}

#[test]
fn removing_groups_drops_empty_values_and_axes() {
	let (index, mut model) = indexed(vec![
		tagged("a.mp3", "Sammy B", "Rock"),
		SearchResult::new("b.mp3", 1),
	]);
	let first = index.groups().next().unwrap().id();
	assert!(model.remove_group(first));
	assert!(!model.remove_group(first));
	assert!(model.values(&Selector::field(MediaType::Audio, "artist")).is_empty());
	assert!(
		!model
			.selector_options()
			.contains(&Selector::field(MediaType::Audio, "genre"))
	);
	assert_eq!(
		model.values(&Selector::Property(PropertyKind::Type)),
		vec![(text("mp3"), 1)]
	);
}

#[test]
fn labels_follow_the_earliest_remaining_group() {
	let (index, mut model) = indexed(vec![
		tagged("a.mp3", "Sammy B", "ROCK"),
		tagged("b.mp3", "Sammy B", "Rock"),
		tagged("c.mp3", "Sammy B", "rock"),
	]);
	let genre = Selector::field(MediaType::Audio, "genre");
	let ids: Vec<GroupId> = index.groups().map(ResultGroup::id).collect();
	assert_eq!(model.values(&genre), vec![(text("ROCK"), 3)]);

	assert!(model.remove_group(ids[0]));
	assert_eq!(model.values(&genre), vec![(text("Rock"), 2)]);

	assert!(model.remove_group(ids[2]));
	assert_eq!(model.values(&genre), vec![(text("Rock"), 1)]);
}

#[test]
fn update_property_follows_merged_speed() {
	let mut index = GroupingIndex::default();
	let mut model = MetadataModel::default();
	let group = index
		.insert(SearchResult::new("a.mp3", 1).with_speed(40, false))
		.unwrap()
		.group();
	model.add_group(index.group(group).unwrap());
	let speed = Selector::Property(PropertyKind::Speed);
	assert_eq!(model.values(&speed), vec![(FacetValue::Speed(SpeedClass::Modem), 1)]);

	index
		.insert(SearchResult::new("a.mp3", 1).with_speed(2_000, true))
		.unwrap();
	assert!(model.update_property(index.group(group).unwrap(), PropertyKind::Speed));
	assert!(!model.update_property(index.group(group).unwrap(), PropertyKind::Speed));
	assert_eq!(model.values(&speed), vec![(FacetValue::Speed(SpeedClass::T3), 1)]);
}

#[test]
fn refresh_picks_up_late_documents() {
	let mut index = GroupingIndex::default();
	let mut model = MetadataModel::default();
	let group = index.insert(SearchResult::new("song.mp3", 1)).unwrap().group();
	model.add_group(index.group(group).unwrap());

	index.insert(tagged("song.mp3", "Sammy B", "Rock")).unwrap();
	assert!(model.refresh_group(index.group(group).unwrap()));
	assert_eq!(
		model.values(&Selector::field(MediaType::Audio, "artist")),
		vec![(text("Sammy B"), 1)]
	);
}

#[test]
fn selected_values_become_filters() {
	let (index, model) = indexed(vec![tagged("a.mp3", "Sammy B", "Rock")]);
	let group = index.groups().next().unwrap();
	let selector = Selector::field(MediaType::Audio, "genre");
	let (value, _) = model.values(&selector).remove(0);
	let filter = selector.filter_for(&value, model.registry()).unwrap();
	assert!(crate::filters::RowFilter::allow(&filter, group));
}
