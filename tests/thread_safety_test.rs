//! Tests for concurrent validation and storage access.

use dictize::validators::{convert_int, name_unique, not_empty};
use dictize::{
    table_dict_save, validate_batch, ColumnType, Context, EntityKind, MemorySession, Schema,
    SchemaRegistry, Session,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::thread;

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn person_schema() -> Schema {
    Schema::new()
        .field("name", [not_empty()])
        .field("age", [convert_int()])
        .sub_schema("numbers", Schema::new().field("number", [convert_int()]))
}

fn package_kind() -> EntityKind {
    EntityKind::new("package")
        .column("name", ColumnType::Text)
        .column("state", ColumnType::Text)
        .unique(["name"])
}

#[test]
fn test_concurrent_validation() {
    let registry = Arc::new(SchemaRegistry::new());

    registry.register("person", person_schema()).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let record = object(json!({
                    "name": format!("user{}", i),
                    "age": format!("{}", 20 + i),
                    "numbers": [{"number": format!("{}", i)}]
                }));
                let outcome = registry.validate("person", &record, &Context::new()).unwrap();
                assert!(outcome.is_valid());
                assert_eq!(outcome.data()["age"], json!(20 + i));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_schema_access() {
    let registry = Arc::new(SchemaRegistry::new());

    registry.register("person", person_schema()).unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let schema = registry.get("person");
                assert!(schema.is_some());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_registry_clone_thread_safety() {
    let registry = SchemaRegistry::new();

    registry.register("person", person_schema()).unwrap();

    let cloned = registry.clone();

    let handle1 = thread::spawn(move || {
        let record = object(json!({"name": "a", "age": "1"}));
        let outcome = registry.validate("person", &record, &Context::new()).unwrap();
        assert!(outcome.is_valid());
    });

    let handle2 = thread::spawn(move || {
        let record = object(json!({"name": "", "age": "x"}));
        let outcome = cloned.validate("person", &record, &Context::new()).unwrap();
        assert_eq!(outcome.field_errors().len(), 2);
    });

    handle1.join().unwrap();
    handle2.join().unwrap();
}

#[test]
fn test_concurrent_mixed_operations() {
    let registry = Arc::new(SchemaRegistry::new());

    registry.register("person", person_schema()).unwrap();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                if i % 2 == 0 {
                    let record = object(json!({"name": "x", "age": i}));
                    let outcome = registry.validate("person", &record, &Context::new()).unwrap();
                    assert!(outcome.is_valid());
                } else {
                    registry
                        .register(format!("schema{}", i), Schema::new())
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.names().len(), 11);
}

#[test]
fn test_batch_validation_keeps_records_apart() {
    let records: Vec<Map<String, Value>> = (0..50)
        .map(|i| {
            if i % 5 == 0 {
                object(json!({"name": "", "age": i}))
            } else {
                object(json!({"name": format!("n{}", i), "age": format!("{}", i)}))
            }
        })
        .collect();

    let outcomes = validate_batch(&records, &person_schema(), &Context::new());
    assert_eq!(outcomes.len(), 50);

    for (i, outcome) in outcomes.into_iter().enumerate() {
        let outcome = outcome.unwrap();
        assert_eq!(outcome.data()["age"], json!(i));
        assert_eq!(outcome.is_valid(), i % 5 != 0);
    }
}

#[test]
fn test_concurrent_saves_share_a_session() {
    let session = Arc::new(MemorySession::new());
    let kind = package_kind();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let session = Arc::clone(&session);
            let kind = kind.clone();
            thread::spawn(move || {
                let context = Context::new().with_session(session);
                let record = object(json!({"name": format!("pkg{}", i), "state": "active"}));
                table_dict_save(&record, &kind, &context).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(session.staged_len(), 10);
    session.commit();
    assert_eq!(session.rows("package").len(), 10);
}

#[test]
fn test_session_lookups_from_many_threads() {
    let session = Arc::new(MemorySession::new());
    let kind = package_kind();
    let seed = Context::new().with_session(session.clone());
    table_dict_save(&object(json!({"id": "p1", "name": "taken"})), &kind, &seed).unwrap();
    session.commit();

    let schema = Arc::new(Schema::new().field("name", [not_empty(), name_unique(kind.clone())]));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let session: Arc<dyn Session> = session.clone();
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let context = Context::new().with_session(session);
                let name = if i % 2 == 0 { "taken".to_string() } else { format!("free{}", i) };
                let outcome =
                    dictize::validate(&object(json!({"name": name})), &schema, &context).unwrap();
                assert_eq!(outcome.is_valid(), i % 2 == 1);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
