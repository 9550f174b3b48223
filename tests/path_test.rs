//! Integration tests for FlatKey.

use dictize::{flat_key, Control, FlatKey, Segment};

#[test]
fn test_key_construction_and_display() {
    assert_eq!(FlatKey::root().to_string(), "");
    assert_eq!(FlatKey::root().push_field("name").to_string(), "name");

    let key = FlatKey::root()
        .push_field("resources")
        .push_index(0)
        .push_field("views")
        .push_index(2)
        .push_field("kind");
    assert_eq!(key.to_string(), "resources[0].views[2].kind");

    let extras = flat_key!["numbers", 1, Control::Extras];
    assert_eq!(extras.to_string(), "numbers[1].__extras");
}

#[test]
fn test_segments_preserved() {
    let key = flat_key!["data", 42, "value"];
    let segments: Vec<&Segment> = key.segments().collect();
    assert_eq!(segments.len(), 3);

    match segments[0] {
        Segment::Field(name) => assert_eq!(name, "data"),
        _ => panic!("Expected Field segment"),
    }
    match segments[1] {
        Segment::Index(idx) => assert_eq!(*idx, 42),
        _ => panic!("Expected Index segment"),
    }
}

#[test]
fn test_key_is_immutable() {
    let base = FlatKey::from_field("items");

    let first = base.push_index(0);
    let second = base.push_index(1);

    assert_eq!(base.to_string(), "items");
    assert_eq!(first.to_string(), "items[0]");
    assert_eq!(second.to_string(), "items[1]");
}

#[test]
fn test_ordering_is_length_first() {
    let mut keys = vec![
        flat_key!["numbers", 0, "code"],
        flat_key!["zzz"],
        flat_key!["numbers", 10, "code"],
        flat_key!["numbers", 2, "code"],
        flat_key!["aaa"],
    ];
    keys.sort();

    let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "aaa",
            "zzz",
            "numbers[0].code",
            "numbers[2].code",
            "numbers[10].code",
        ]
    );
}

#[test]
fn test_control_segments_sort_after_fields() {
    let mut keys = vec![flat_key![Control::Extras], flat_key!["zzz"], flat_key![Control::After]];
    keys.sort();
    assert_eq!(keys[0], flat_key!["zzz"]);
    assert!(keys[1..].iter().all(|k| k.control().is_some()));
}

#[test]
fn test_shapes_and_truncation() {
    let key = flat_key!["resources", 3, "views", 1, "kind"];
    assert_eq!(key.shape(), flat_key!["resources", "views", "kind"]);
    assert_eq!(key.parent_shape(), flat_key!["resources", "views"]);
    assert_eq!(key.truncate_end(1), flat_key!["resources", 3, "views", 1]);
    assert_eq!(key.truncate_end(3), flat_key!["resources", 3]);
    assert_eq!(key.truncate_end(10), FlatKey::root());
    assert!(key.starts_with(&flat_key!["resources", 3]));
    assert!(!key.starts_with(&flat_key!["resources", 4]));
}
