use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use relate_core::{
    CollectionOptions, Criteria, Dataset, Field, LinkError, LinkerConfig, Query, Record, RecordId,
    Registry, Relation, RelationMap,
};
use serde_json::{Value, json};

fn music() -> Dataset {
    Dataset::from_value(json!({
        "artists": [
            {"id": 1, "name": "Turnover", "songs": [1, 2]},
            {"id": 2, "name": "Vinyl Theatre", "songs": [3, 4]}
        ],
        "songs": [
            {"id": 1, "title": "Most Of The Time", "artist": 1},
            {"id": 2, "title": "New Scream", "artist": 1},
            {"id": 3, "title": "Breaking Up My Bones", "artist": 2},
            {"id": 4, "title": "Shaking In The Dead Of Night", "artist": 2}
        ]
    }))
    .unwrap()
}

fn setup(config: LinkerConfig, dataset: Dataset) -> Registry {
    let mut registry = Registry::with_config(config);
    registry.import(dataset).unwrap();
    registry
}

fn songs_by_artist() -> LinkerConfig {
    LinkerConfig::new().with_map("songs", RelationMap::new().with("artist", "artists"))
}

#[test]
fn import_registers_every_record_under_its_id() {
    let dataset = music();
    let registry = setup(LinkerConfig::new(), dataset.clone());

    for name in dataset.names() {
        let collection = registry.collection(name).unwrap();
        for record in dataset.records(name).unwrap() {
            let item = collection.get(record.id().unwrap()).into_item().unwrap();
            assert_eq!(item.record(), record);
        }
    }
}

#[test]
fn get_by_missing_id_is_none() {
    let registry = setup(LinkerConfig::new(), music());

    assert!(registry.collection("artists").unwrap().get(0).into_item().is_none());
}

#[test]
fn get_by_ids_keeps_length_and_order() {
    let registry = setup(LinkerConfig::new(), music());
    let artists = registry.collection("artists").unwrap();

    let found = artists.get(vec![2_i64, 9, 1]).into_items();

    assert_eq!(found.len(), 3);
    assert_eq!(found[0].unwrap().field("name"), Some(&json!("Vinyl Theatre")));
    assert!(found[1].is_none());
    assert_eq!(found[2].unwrap().field("name"), Some(&json!("Turnover")));
}

#[test]
fn get_by_predicate_can_follow_relations() {
    let registry = setup(songs_by_artist(), music());
    let songs = registry.collection("songs").unwrap();

    let matched = songs
        .get(Query::filter(|song| {
            song.get("artist").get("name").value() == Some(&json!("Turnover"))
        }))
        .present();

    let titles: Vec<&Value> = matched.iter().filter_map(|song| song.field("title")).collect();
    assert_eq!(titles, vec![&json!("Most Of The Time"), &json!("New Scream")]);
}

#[test]
fn get_by_criteria_matches_related_id() {
    let registry = setup(songs_by_artist(), music());
    let artist = registry.collection("artists").unwrap().get(1).into_item().unwrap();

    let songs = registry
        .collection("songs")
        .unwrap()
        .get(Criteria::new().field("artist", artist.id().clone()))
        .present();

    let ids: Vec<&RecordId> = songs.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec![&RecordId::from(1), &RecordId::from(2)]);
}

#[test]
fn get_by_criteria_on_plain_field() {
    let registry = setup(LinkerConfig::new(), music());

    let found = registry
        .collection("artists")
        .unwrap()
        .get(Criteria::new().field("name", "Turnover"))
        .present();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), &RecordId::from(1));
}

#[test]
fn list_relation_round_trip() {
    let dataset = Dataset::from_value(json!({
        "artists": [{"id": 1, "name": "A", "songs": [10, 11]}],
        "songs": [{"id": 10, "title": "x"}, {"id": 11, "title": "y"}]
    }))
    .unwrap();
    let registry = setup(LinkerConfig::new(), dataset);
    let songs = registry.collection("songs").unwrap();

    let related = registry
        .collection("artists")
        .unwrap()
        .get(1)
        .into_item()
        .unwrap()
        .get("songs")
        .items();

    assert_eq!(related, vec![songs.get(10).into_item(), songs.get(11).into_item()]);
}

#[test]
fn scalar_field_named_after_collection_resolves() {
    let dataset = Dataset::from_value(json!({
        "artists": [{"id": 1, "name": "Turnover", "songs": [1]}],
        "songs": [{"id": 1, "name": "Most Of The Time", "artists": 1}]
    }))
    .unwrap();
    let registry = setup(LinkerConfig::new(), dataset);

    let song = registry.collection("songs").unwrap().get(1).into_item().unwrap();
    let artist = song.get("artists").item().unwrap();

    let artists = registry.collection("artists").unwrap();
    assert_eq!(Some(artist), artists.get(artist.id().clone()).into_item());
}

#[test]
fn mapped_alias_resolves_and_unmapped_field_stays_raw() {
    let registry = setup(songs_by_artist(), music());
    let song = registry.collection("songs").unwrap().get(1).into_item().unwrap();

    let artist = song.get("artist").item().unwrap();
    assert_eq!(artist.collection().name(), "artists");
    assert_eq!(artist.field("name"), Some(&json!("Turnover")));

    assert_eq!(song.get("title"), Field::Value(&json!("Most Of The Time")));
    assert!(song.get("someUnmappedField").is_absent());
}

#[test]
fn several_keys_mapped_to_one_collection() {
    let config = LinkerConfig::new().with_map(
        "songs",
        RelationMap::new().with("artist", "artists").with("composer", "artists"),
    );
    let dataset = Dataset::from_value(json!({
        "artists": [{"id": 1, "name": "Turnover", "songs": [1]}],
        "songs": [{"id": 1, "name": "Most Of The Time", "artist": 1, "composer": 1}]
    }))
    .unwrap();
    let registry = setup(config, dataset);

    let song = registry.collection("songs").unwrap().get(1).into_item().unwrap();
    assert_eq!(song.get("artist"), song.get("composer"));
    assert!(song.get("artist").item().is_some());
}

#[test]
fn collection_name_claimed_by_override_reads_as_plain_value() {
    let mut registry = setup(songs_by_artist(), music());

    registry
        .lookup_mut("songs")
        .unwrap()
        .record_mut(&RecordId::from(1))
        .unwrap()
        .set("artists", "test")
        .unwrap();

    let songs = registry.collection("songs").unwrap();
    let song = songs.get(1).into_item().unwrap();
    assert_eq!(registry.resolve_target(songs.collection(), "artists"), None);
    assert_eq!(song.get("artists"), Field::Value(&json!("test")));
}

#[test]
fn repeated_resolution_is_stable_and_follows_mutation() {
    let mut registry = setup(songs_by_artist(), music());

    {
        let song = registry.collection("songs").unwrap().get(1).into_item().unwrap();
        let first = song.get("artist").item().unwrap();
        let second = song.get("artist").item().unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first, second);
    }

    registry
        .lookup_mut("songs")
        .unwrap()
        .record_mut(&RecordId::from(1))
        .unwrap()
        .set("artist", 2)
        .unwrap();

    let song = registry.collection("songs").unwrap().get(1).into_item().unwrap();
    assert_eq!(song.get("artist").item().unwrap().id(), &RecordId::from(2));
}

#[test]
fn relation_handle_built_by_hand() {
    let registry = setup(LinkerConfig::new(), music());

    let artist = Relation::new("artists", 1).get(&registry).unwrap().into_item().unwrap();
    assert_eq!(artist.field("name"), Some(&json!("Turnover")));
}

#[test]
fn duplicate_identifier_is_rejected() {
    let mut registry = Registry::new();
    let artists = registry.create("artists", CollectionOptions::new()).unwrap();

    artists.add(Record::new().with("id", 1).with("name", "Turnover")).unwrap();
    let err = artists
        .add(Record::new().with("id", 1).with("name", "Vinyl Theatre"))
        .unwrap_err();

    assert_eq!(
        err,
        LinkError::DuplicateIdentifier {
            collection: "artists".into(),
            id: RecordId::from(1)
        }
    );
    assert_eq!(artists.len(), 1);
    assert_eq!(
        artists.record(&RecordId::from(1)).unwrap().field("name"),
        Some(&json!("Turnover"))
    );
}

#[test]
fn string_and_integer_spellings_of_an_id_collide() {
    let mut registry = Registry::new();
    let artists = registry.create("artists", CollectionOptions::new()).unwrap();

    artists.add(Record::new().with("id", 1)).unwrap();
    let err = artists.add(Record::new().with("id", "1")).unwrap_err();

    assert!(matches!(err, LinkError::DuplicateIdentifier { .. }));
    assert_eq!(artists.len(), 1);
}

#[test]
fn string_typed_reference_resolves_to_integer_id() {
    let dataset = Dataset::from_value(json!({
        "artists": [{"id": 1, "name": "Turnover"}],
        "songs": [{"id": 10, "artists": "1"}]
    }))
    .unwrap();
    let registry = setup(LinkerConfig::new(), dataset);
    let artists = registry.collection("artists").unwrap();

    let song = registry.collection("songs").unwrap().get(10).into_item().unwrap();
    let artist = song.get("artists").item().unwrap();

    assert_eq!(artist.field("name"), Some(&json!("Turnover")));
    assert_eq!(artists.get("1").into_item(), Some(artist));
}

type Calls = Arc<Mutex<Vec<(String, RecordId)>>>;

fn spy(
    label: &'static str,
    calls: &Calls,
) -> impl Fn(Record, &relate_core::Collection) -> Record + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |record: Record, _: &relate_core::Collection| {
        if let Some(id) = record.id() {
            calls.lock().unwrap().push((label.to_string(), id));
        }
        record
    }
}

fn calls_of(calls: &Calls, label: &str) -> Vec<RecordId> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, _)| l == label)
        .map(|(_, id)| id.clone())
        .collect()
}

#[test]
fn per_call_transform_wins_over_configured_ones() {
    let calls: Calls = Arc::default();
    let config = LinkerConfig::new()
        .with_transform("musicians", spy("named", &calls))
        .with_default_transform(spy("default", &calls));
    let mut registry = Registry::with_config(config);

    registry
        .create("musicians", CollectionOptions::new().transform(spy("explicit", &calls)))
        .unwrap()
        .import(vec![Record::new().with("id", 1), Record::new().with("id", 2)])
        .unwrap();

    assert_eq!(calls_of(&calls, "explicit"), vec![RecordId::from(1), RecordId::from(2)]);
    assert!(calls_of(&calls, "named").is_empty());
    assert!(calls_of(&calls, "default").is_empty());
}

#[test]
fn named_transform_wins_over_default() {
    let calls: Calls = Arc::default();
    let config = LinkerConfig::new()
        .with_transform("artists", spy("artists", &calls))
        .with_default_transform(spy("default", &calls));

    setup(config, music());

    assert_eq!(calls_of(&calls, "artists"), vec![RecordId::from(1), RecordId::from(2)]);
    // songs have no named transform
    assert_eq!(calls_of(&calls, "default"), (1..=4).map(RecordId::from).collect::<Vec<_>>());
}

#[test]
fn default_transform_runs_once_per_imported_record() {
    let calls: Calls = Arc::default();
    let config = LinkerConfig::new().with_default_transform(spy("default", &calls));

    setup(config, music());

    assert_eq!(calls.lock().unwrap().len(), 6);
}

#[test]
fn transformed_record_is_what_gets_stored() {
    let uppercase = |record: Record, _: &relate_core::Collection| {
        let upper = record
            .field("name")
            .and_then(Value::as_str)
            .map(str::to_uppercase)
            .unwrap_or_default();
        record.with("name", upper)
    };
    let config = LinkerConfig::new().with_transform("artists", uppercase);
    let registry = setup(config, music());

    let artist = registry.collection("artists").unwrap().get(2).into_item().unwrap();
    assert_eq!(artist.field("name"), Some(&json!("VINYL THEATRE")));
}

#[test]
fn explicit_map_beats_configured_map() {
    let config =
        LinkerConfig::new().with_map("musicians", RelationMap::new().with("artist", "songs"));
    let mut registry = setup(config, music());

    registry
        .create(
            "musicians",
            CollectionOptions::new().map(RelationMap::new().with("artist", "artists")),
        )
        .unwrap()
        .import(vec![Record::new().with("id", 1).with("artist", 1)])
        .unwrap();

    let musician = registry.collection("musicians").unwrap().get(1).into_item().unwrap();
    assert_eq!(
        musician.get("artist").item(),
        registry.collection("artists").unwrap().get(1).into_item()
    );
}

#[test]
fn unknown_collection_lookup_fails() {
    let registry = setup(LinkerConfig::new(), music());

    assert_eq!(registry.collection("musicians").unwrap_err(), LinkError::not_found("musicians"));
}

proptest! {
    #[test]
    fn id_list_lookup_matches_single_lookups(ids in prop::collection::vec(-3_i64..8, 0..24)) {
        let registry = setup(LinkerConfig::new(), music());
        let songs = registry.collection("songs").unwrap();

        let found = songs.get(ids.clone()).into_items();

        prop_assert_eq!(found.len(), ids.len());
        for (slot, id) in found.iter().zip(&ids) {
            prop_assert_eq!(*slot, songs.get(*id).into_item());
        }
    }
}
