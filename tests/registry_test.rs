//! Tests for schema registry operations.

use dictize::validators::{convert_int, default, ignore_missing, name_validator, not_empty};
use dictize::{Context, DataError, RegistryError, Schema, SchemaRegistry};
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn group_schema() -> Schema {
    Schema::new()
        .field("name", [not_empty(), name_validator()])
        .field("title", [ignore_missing()])
}

#[test]
fn test_register_and_get() {
    let registry = SchemaRegistry::new();

    registry.register("group", group_schema()).unwrap();

    let schema = registry.get("group");
    assert!(schema.is_some());
    assert_eq!(schema.unwrap().field_names(), vec!["name", "title"]);

    let missing = registry.get("package");
    assert!(missing.is_none());
}

#[test]
fn test_duplicate_registration_fails() {
    let registry = SchemaRegistry::new();

    registry.register("group", group_schema()).unwrap();

    let result = registry.register("group", Schema::new());
    assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "group"));
}

#[test]
fn test_names_are_sorted() {
    let registry = SchemaRegistry::new();
    registry.register("tag", Schema::new()).unwrap();
    registry.register("group", Schema::new()).unwrap();
    registry.register("package", Schema::new()).unwrap();

    assert_eq!(registry.names(), vec!["group", "package", "tag"]);
}

#[test]
fn test_validate_with_registry() {
    let registry = SchemaRegistry::new();

    registry.register("group", group_schema()).unwrap();

    let outcome = registry
        .validate("group", &object(json!({"name": "health"})), &Context::new())
        .unwrap();
    assert!(outcome.is_valid());
    assert_eq!(json!(outcome.data()), json!({"name": "health"}));

    let outcome = registry
        .validate("group", &object(json!({"name": "Health!"})), &Context::new())
        .unwrap();
    assert_eq!(
        json!(outcome.errors()),
        json!({"name": ["Must be purely lowercase alphanumeric (ascii) characters and these symbols: -_"]})
    );
}

#[test]
fn test_validate_missing_schema() {
    let registry = SchemaRegistry::new();

    let result = registry.validate("missing", &Map::new(), &Context::new());
    assert!(matches!(result, Err(RegistryError::SchemaNotFound(name)) if name == "missing"));
}

#[test]
fn test_data_errors_pass_through() {
    let registry = SchemaRegistry::new();
    registry
        .register(
            "person",
            Schema::new().sub_schema("numbers", Schema::new().field("number", [convert_int()])),
        )
        .unwrap();

    let result = registry.validate("person", &object(json!({"numbers": 5})), &Context::new());
    assert!(matches!(
        result,
        Err(RegistryError::Data(DataError::NotAListOfDicts { .. }))
    ));
}

#[test]
fn test_clones_share_storage() {
    let registry = SchemaRegistry::new();
    let clone = registry.clone();

    clone
        .register("person", Schema::new().field("gender", [default(json!("female"))]))
        .unwrap();

    let outcome = registry
        .validate("person", &Map::new(), &Context::new())
        .unwrap();
    assert_eq!(json!(outcome.data()), json!({"gender": "female"}));
}
