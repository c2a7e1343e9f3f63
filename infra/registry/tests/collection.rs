use dmap_registry::*;
use serde_json::json;

#[test]
fn test_get_returns_default_only_when_missing() {
    let mut collection = KeyedCollection::new(KeyMode::Strict);
    assert_eq!(collection.get("k"), None);
    assert_eq!(collection.get_or("k", &0), &0);

    collection.set("k", 7);
    assert_eq!(collection.get_or("k", &0), &7);
    assert!(collection.has("k"));
}

#[test]
fn test_scalar_kinds_are_distinct_keys() {
    for mode in [KeyMode::Strict, KeyMode::Structural] {
        let mut collection = KeyedCollection::new(mode);
        collection.set("1", "text");
        collection.set(1, "number");
        collection.set(true, "bool");
        collection.set((), "null");

        assert_eq!(collection.len(), 4, "{mode:?}");
        assert_eq!(collection.get("1"), Some(&"text"));
        assert_eq!(collection.get(1), Some(&"number"));
        assert_eq!(collection.get(true), Some(&"bool"));
        assert_eq!(collection.get(()), Some(&"null"));
    }
}

#[test]
fn test_structural_string_does_not_collide_with_object_text() {
    let mut collection = KeyedCollection::new(KeyMode::Structural);
    collection.set(r#"{"a":1}"#, "string");
    collection.set(json!({ "a": 1 }), "object");

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.get(r#"{"a":1}"#), Some(&"string"));
}

#[test]
fn test_structural_member_order_is_irrelevant() {
    let mut collection = KeyedCollection::new(KeyMode::Structural);
    let first = Key::from_serialize(&json!({ "b": 2, "a": 1 })).unwrap();
    let second = Key::from_serialize(&json!({ "a": 1, "b": 2 })).unwrap();

    collection.set(first, "v");
    assert_eq!(collection.get(&second), Some(&"v"));
}

#[test]
fn test_structural_keys_from_serializable_structs() {
    #[derive(serde::Serialize)]
    struct Route<'a> {
        path: &'a str,
        method: &'a str,
    }

    let mut collection = KeyedCollection::new(KeyMode::Structural);
    let key = Key::from_serialize(&Route { path: "/", method: "GET" }).unwrap();
    collection.set(key, "index");

    let probe = Key::from_serialize(&Route { path: "/", method: "GET" }).unwrap();
    assert_eq!(collection.get(&probe), Some(&"index"));
    assert_eq!(collection.keys(), vec![Key::from(json!({ "method": "GET", "path": "/" }))]);
}

#[test]
fn test_clear_leaves_collection_usable() {
    let mut collection = KeyedCollection::new(KeyMode::Structural);
    collection.extend([("a", 1), ("b", 2)]);

    collection.clear();
    assert!(collection.is_empty());
    assert!(collection.keys().is_empty());

    collection.set("c", 3);
    assert_eq!(collection.len(), 1);
}

#[test]
fn test_keys_snapshot_is_detached() {
    let mut collection = KeyedCollection::new(KeyMode::Strict);
    collection.set("a", 1);

    let snapshot = collection.keys();
    collection.set("b", 2);
    collection.delete("a");

    assert_eq!(snapshot, vec![Key::from("a")]);
    assert_eq!(collection.keys(), vec![Key::from("b")]);
}

#[test]
fn test_for_each_passes_value_then_restored_key() {
    let mut collection = KeyedCollection::new(KeyMode::Structural);
    collection.set(json!({ "id": 1 }), "one");
    collection.set("plain", "two");

    let mut seen = Vec::new();
    collection.for_each(|value, key| seen.push((*value, key)));

    assert_eq!(
        seen,
        vec![("one", Key::from(json!({ "id": 1 }))), ("two", Key::from("plain"))]
    );
}

#[test]
fn test_iter_and_values_follow_storage_order() {
    let mut collection = KeyedCollection::new(KeyMode::Strict);
    collection.extend([(3, 'c'), (1, 'a'), (2, 'b')]);

    let values: String = collection.values().collect();
    assert_eq!(values, "cab");

    let keys: Vec<Key> = collection.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![Key::from(3), Key::from(1), Key::from(2)]);
}

#[test]
fn test_strict_identity_survives_source_drop() {
    let mut collection = KeyedCollection::new(KeyMode::Strict);
    let key = ObjectKey::new(json!({ "tmp": true }));
    collection.set(key.clone(), 1);
    let keys = collection.keys();
    drop(key);

    let Key::Object(stored) = &keys[0] else { panic!("expected object key") };
    assert_eq!(collection.get(stored), Some(&1));
}

#[test]
fn test_builder_creates_standalone_collection() {
    let collection: KeyedCollection<()> =
        RegistryBuilder::new().key_mode(KeyMode::Structural).build_collection();
    assert_eq!(collection.key_mode(), KeyMode::Structural);
    assert_eq!(KeyedCollection::<()>::default().key_mode(), KeyMode::Strict);
}

#[test]
fn test_strict_numbers_compare_by_value() {
    let mut collection = KeyedCollection::new(KeyMode::Strict);
    collection.set(json!(1.5), "fraction");
    collection.set(json!(u64::MAX), "large");
    collection.set(json!(2.0), "integral");

    assert_eq!(collection.get(&Key::from(json!(1.5))), Some(&"fraction"));
    assert_eq!(collection.get(&Key::from(1.5)), Some(&"fraction"));
    assert_eq!(collection.get(&Key::from(u64::MAX)), Some(&"large"));
    assert_eq!(collection.get(2), Some(&"integral"));
    assert_eq!(collection.keys(), vec![Key::from(1.5), Key::from(u64::MAX), Key::from(2)]);
}

#[test]
fn test_structural_integral_floats_match_integers() {
    let mut collection = KeyedCollection::new(KeyMode::Structural);
    collection.set(json!({ "n": 1 }), "v");

    assert_eq!(collection.get(&Key::from(json!({ "n": 1.0 }))), Some(&"v"));
    assert_eq!(collection.get(&Key::from(json!({ "n": 1.5 }))), None);
}

#[test]
fn test_structural_deep_keys_come_back_as_objects() {
    let mut nested = json!(0);
    for _ in 0..150 {
        nested = serde_json::Value::Array(vec![nested]);
    }

    let mut collection = KeyedCollection::new(KeyMode::Structural);
    collection.set(nested.clone(), "deep");

    let probe = Key::from(nested);
    assert_eq!(collection.get(&probe), Some(&"deep"));
    assert_eq!(collection.keys(), vec![probe]);
}
