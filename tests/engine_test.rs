//! Integration tests for the validation engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dictize::validators::{
    convert_int, default, empty, ignore, ignore_missing, keep_extras, not_empty,
};
use dictize::{
    validate, validate_value, Context, DataError, Datum, EngineConfig, Schema, Validator,
};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn person_schema() -> Schema {
    Schema::new()
        .field("name", [not_empty()])
        .field("age", [ignore_missing(), convert_int()])
        .field("gender", [default(json!("female"))])
}

#[test]
fn test_missing_fields_are_defaulted_or_dropped() {
    let outcome = validate(
        &object(json!({"name": "fred", "age": "32"})),
        &person_schema(),
        &Context::new(),
    )
    .unwrap();

    let (data, errors) = outcome.into_parts();
    assert_eq!(Value::Object(data), json!({"gender": "female", "age": 32, "name": "fred"}));
    assert!(errors.is_empty());
}

#[test]
fn test_errors_collected_and_extras_kept() {
    let outcome = validate(
        &object(json!({"name": "", "age": "dsa32", "extra": "extra"})),
        &person_schema(),
        &Context::new(),
    )
    .unwrap();

    assert_eq!(
        json!(outcome.errors()),
        json!({"age": ["Please enter an integer value"], "name": ["Missing value"]})
    );
    assert_eq!(outcome.data()["__extras"], json!({"extra": "extra"}));
    assert_eq!(outcome.field_errors().len(), 2);
    assert!(!outcome.is_valid());
}

#[test]
fn test_sub_entity_errors_keep_list_positions() {
    let schema = Schema::new().sub_schema(
        "numbers",
        Schema::new()
            .field("number", [convert_int()])
            .field("code", [not_empty()]),
    );
    let outcome = validate(
        &object(json!({"numbers": [{"number": "1"}, {"number": "2", "code": "+44"}]})),
        &schema,
        &Context::new(),
    )
    .unwrap();

    assert_eq!(
        json!(outcome.errors()),
        json!({"numbers": [{"code": ["Missing value"]}, {}]})
    );
    assert_eq!(
        outcome.data()["numbers"],
        json!([{"number": 1}, {"number": 2, "code": "+44"}])
    );
}

#[test]
fn test_validators_see_a_copy_of_the_context() {
    let caller = Context::new().with_value("user", json!("alice"));
    let caller_addr = &caller as *const Context as usize;

    let seen_addr = Arc::new(AtomicUsize::new(0));
    let seen_user = Arc::new(Mutex::new(None));
    let observe = {
        let seen_addr = Arc::clone(&seen_addr);
        let seen_user = Arc::clone(&seen_user);
        Validator::context(move |_, _, _, ctx| {
            seen_addr.store(ctx as *const Context as usize, Ordering::SeqCst);
            *seen_user.lock() = ctx.value("user").cloned();
            ctx.set_value("user", json!("mallory"));
            Ok(())
        })
    };

    let schema = Schema::new().field("f", [observe]);
    validate(&object(json!({"f": "x"})), &schema, &caller).unwrap();

    assert_ne!(seen_addr.load(Ordering::SeqCst), 0);
    assert_ne!(seen_addr.load(Ordering::SeqCst), caller_addr);
    assert_eq!(*seen_user.lock(), Some(json!("alice")));
    assert_eq!(caller.value("user"), Some(&json!("alice")));
}

#[test]
fn test_schema_keys_are_visible_to_validators() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observe = {
        let seen = Arc::clone(&seen);
        Validator::value_context(move |value, ctx| {
            *seen.lock() = ctx.schema_keys().to_vec();
            Ok(value)
        })
    };

    let schema = Schema::new().field("f", [observe]);
    validate(&object(json!({"f": "x"})), &schema, &Context::new()).unwrap();

    assert_eq!(*seen.lock(), vec!["f".to_string()]);
}

#[test]
fn test_phase_order() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let record = |label: &'static str| {
        let log = Arc::clone(&log);
        Validator::context(move |key, _, _, _| {
            log.lock().push(format!("{label}:{key}"));
            Ok(())
        })
    };

    let schema = Schema::new()
        .field("name", [record("main")])
        .before([record("before")])
        .after([record("after")])
        .extras([record("extras")])
        .junk([record("junk")])
        .sub_schema(
            "numbers",
            Schema::new()
                .field("number", [record("main")])
                .after([record("after")]),
        );

    validate(
        &object(json!({"name": "x", "numbers": [{"number": "1"}, {"number": "2"}]})),
        &schema,
        &Context::new(),
    )
    .unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "before:__before",
            "main:name",
            "main:numbers[0].number",
            "main:numbers[1].number",
            "extras:__extras",
            "after:numbers[1].__after",
            "after:numbers[0].__after",
            "after:__after",
            "junk:__junk",
        ]
    );
}

#[test]
fn test_stop_only_ends_that_keys_chain() {
    let touched = Arc::new(AtomicUsize::new(0));
    let count = {
        let touched = Arc::clone(&touched);
        Validator::converter(move |value| {
            touched.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        })
    };

    let schema = Schema::new()
        .field("a", [not_empty(), count.clone()])
        .field("b", [not_empty(), count]);

    let outcome = validate(&object(json!({"b": "x"})), &schema, &Context::new()).unwrap();

    assert_eq!(touched.load(Ordering::SeqCst), 1);
    assert_eq!(json!(outcome.errors()), json!({"a": ["Missing value"]}));
}

#[test]
fn test_invalid_does_not_stop_chain() {
    let schema = Schema::new().field(
        "age",
        [
            convert_int(),
            Validator::converter(|value| {
                assert_eq!(value, Datum::from("abc"));
                Ok(Datum::from("after"))
            }),
        ],
    );
    let outcome = validate(&object(json!({"age": "abc"})), &schema, &Context::new()).unwrap();

    assert_eq!(outcome.data()["age"], json!("after"));
    assert_eq!(json!(outcome.errors()), json!({"age": ["Please enter an integer value"]}));
}

#[test]
fn test_junk_rejected_by_empty() {
    let schema = Schema::new()
        .field("name", [])
        .junk([empty()])
        .extras([ignore()]);

    let outcome = validate(
        &object(json!({"name": "x", "contacts": [{"email": "a@b"}], "colour": "red"})),
        &schema,
        &Context::new(),
    )
    .unwrap();

    assert_eq!(
        json!(outcome.errors()),
        json!({"__junk": ["The input field contacts[0].email was not expected."]})
    );
    assert_eq!(json!(outcome.data()), json!({"name": "x"}));
}

#[test]
fn test_extras_in_sub_schema() {
    let schema = Schema::new().sub_schema(
        "resources",
        Schema::new().field("url", [not_empty()]).extras([keep_extras()]),
    );
    let outcome = validate(
        &object(json!({"resources": [{"url": "a", "format": "csv"}]})),
        &schema,
        &Context::new(),
    )
    .unwrap();

    assert!(outcome.is_valid());
    assert_eq!(outcome.data()["resources"], json!([{"url": "a", "format": "csv"}]));
}

#[test]
fn test_scalar_against_sub_schema_is_a_data_error() {
    let schema = Schema::new().sub_schema("numbers", Schema::new().field("number", []));
    let err = validate(&object(json!({"numbers": "1"})), &schema, &Context::new()).unwrap_err();
    assert!(matches!(err, DataError::NotAListOfDicts { found: "string", .. }));
}

#[test]
fn test_mixed_list_is_a_data_error() {
    let schema = Schema::new().sub_schema("numbers", Schema::new().field("number", []));
    let err = validate(
        &object(json!({"numbers": [{"number": 1}, 2]})),
        &schema,
        &Context::new(),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::NonDictListItem { .. }));
}

#[test]
fn test_non_object_record() {
    let err = validate_value(&json!([1, 2]), &Schema::new(), &Context::new()).unwrap_err();
    assert_eq!(err, DataError::NotAnObject { found: "array" });
}

#[test]
fn test_empty_top_level_lists_are_restored() {
    let schema = Schema::new()
        .field("name", [])
        .sub_schema("tags", Schema::new().field("name", []))
        .extras([ignore()]);
    let record = object(json!({"name": "x", "tags": []}));

    let outcome = validate(&record, &schema, &Context::new()).unwrap();
    assert_eq!(json!(outcome.data()), json!({"name": "x", "tags": []}));

    let config = EngineConfig {
        fix_partial_updates: false,
    };
    let outcome = validate(&record, &schema, &Context::new().with_config(&config)).unwrap();
    assert_eq!(json!(outcome.data()), json!({"name": "x"}));
}

#[test]
fn test_ignore_drops_supplied_values() {
    let schema = Schema::new().field("secret", [ignore()]).field("name", []);
    let outcome = validate(
        &object(json!({"secret": "s", "name": "n"})),
        &schema,
        &Context::new(),
    )
    .unwrap();
    assert_eq!(json!(outcome.data()), json!({"name": "n"}));
}
