//! Integration tests for classical inheritance
//!
//! Tests cover:
//! - Shallow, child-biased field merging
//! - Delegate attachment and lookup stability
//! - Delegate sharing between a parent and its classical children
//! - The `create` and `getDelegate` builtins on standard prototypes
//! - Argument validation without partial state

use sparrow_inherit::{
    Delegate, EngineOptions, EngineStats, InheritError, InheritanceEngine, Record, RecordId, Value,
};

fn insert(engine: &mut InheritanceEngine, record: Record) -> RecordId {
    engine.insert(record).unwrap()
}

fn delegate_of(engine: &InheritanceEngine, id: RecordId) -> RecordId {
    engine
        .get_delegate(id)
        .unwrap()
        .as_record()
        .expect("record should have a delegate")
}

#[test]
fn test_name_and_age_example() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new().with("name", "john"));
    let spec = insert(&mut engine, Record::new().with("age", 28));

    let person = engine.classical_create(parent, Some(spec), true).unwrap();
    let record = engine.record(person).unwrap();

    assert_eq!(record.field_names(), vec!["age", "name"]);
    assert_eq!(record.get_own("name"), Some(&Value::from("john")));
    assert_eq!(record.get_own("age"), Some(&Value::from(28)));
}

#[test]
fn test_child_fields_win() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new().with("a", 1).with("b", 2));
    let spec = insert(&mut engine, Record::new().with("b", 20).with("c", 30));

    let child = engine.classical_create(parent, Some(spec), true).unwrap();
    let record = engine.record(child).unwrap();

    assert_eq!(record.field_names(), vec!["a", "b", "c"]);
    assert_eq!(record.get_own("a"), Some(&Value::from(1)));
    assert_eq!(record.get_own("b"), Some(&Value::from(20)));
    assert_eq!(record.get_own("c"), Some(&Value::from(30)));
}

#[test]
fn test_parent_is_not_modified() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new().with("a", 1));
    let spec = insert(&mut engine, Record::new().with("a", 2));

    engine.classical_create(parent, Some(spec), true).unwrap();

    assert_eq!(
        engine.record(parent).unwrap().get_own("a"),
        Some(&Value::from(1))
    );
    assert!(engine.get_delegate(parent).unwrap().is_root());
}

#[test]
fn test_delegate_always_attached() {
    let mut engine = InheritanceEngine::new();
    let empty = insert(&mut engine, Record::new());
    let child = engine.classical_create(empty, None, true).unwrap();

    assert_ne!(engine.get_delegate(child).unwrap(), Delegate::Root);
}

#[test]
fn test_get_delegate_is_stable() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new().with("x", 1));
    let child = engine.classical_create(parent, None, true).unwrap();

    let first = engine.get_delegate(child).unwrap();
    let second = engine.get_delegate(child).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_plain_record_has_root_delegate() {
    let mut engine = InheritanceEngine::new();
    let plain = insert(&mut engine, Record::new().with("x", 1));
    assert_eq!(engine.get_delegate(plain).unwrap(), Delegate::Root);
}

#[test]
fn test_chained_children_share_delegate() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new().with("name", "base"));
    let spec = insert(&mut engine, Record::new().with("x", 1));

    let a = engine.classical_create(root, None, true).unwrap();
    let b = engine.classical_create(a, Some(spec), true).unwrap();

    let shared = delegate_of(&engine, a);
    assert_eq!(delegate_of(&engine, b), shared);

    // Fields added to the shared delegate later are visible through both
    // records, so the delegate was linked, not copied.
    engine.set(shared, "greeting", "hi").unwrap();
    assert_eq!(engine.get(b, "greeting").unwrap(), Some(&Value::from("hi")));
    assert_eq!(engine.get(a, "greeting").unwrap(), Some(&Value::from("hi")));

    assert_eq!(engine.record(b).unwrap().field_names(), vec!["name", "x"]);
}

#[test]
fn test_long_chain_keeps_first_delegate() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let first = engine.classical_create(root, None, true).unwrap();
    let shared = delegate_of(&engine, first);

    let mut current = first;
    for i in 0..5 {
        let spec = insert(&mut engine, Record::new().with(format!("f{}", i), i));
        current = engine.classical_create(current, Some(spec), true).unwrap();
        assert_eq!(delegate_of(&engine, current), shared);
    }
    assert_eq!(engine.record(current).unwrap().len(), 5);
}

#[test]
fn test_delegate_walk_ends_at_root() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let spec = insert(&mut engine, Record::new().with("x", 1));
    let a = engine.classical_create(root, None, true).unwrap();
    let b = engine.classical_create(a, Some(spec), true).unwrap();

    let mut current = b;
    let mut steps = 0;
    while let Delegate::Record(next) = engine.get_delegate(current).unwrap() {
        assert_ne!(next, current, "record is its own delegate");
        current = next;
        steps += 1;
        assert!(steps <= 4, "delegate walk did not terminate");
    }
    assert_eq!(current, delegate_of(&engine, a));
    assert!(engine.get_delegate(current).unwrap().is_root());
}

#[test]
fn test_copy_delegate_false_synthesizes_fresh_prototype() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let spec = insert(&mut engine, Record::new());
    let a = engine.classical_create(root, None, true).unwrap();

    let c = engine.classical_create(a, Some(spec), false).unwrap();
    let fresh = delegate_of(&engine, c);

    assert_ne!(fresh, delegate_of(&engine, a));
    let prototype = engine.record(fresh).unwrap();
    assert!(prototype.is_class_chain());
    assert_eq!(prototype.field_names(), vec!["create", "getDelegate"]);
}

#[test]
fn test_nested_records_are_aliased() {
    let mut engine = InheritanceEngine::new();
    let inner = insert(&mut engine, Record::new().with("v", 1));
    let parent = insert(&mut engine, Record::new().with("inner", inner));

    let child = engine.classical_create(parent, None, true).unwrap();
    assert_eq!(engine.get(child, "inner").unwrap(), Some(&Value::Record(inner)));

    engine.set(inner, "v", 2).unwrap();
    let shared = engine
        .get(child, "inner")
        .unwrap()
        .and_then(Value::as_record)
        .unwrap();
    assert_eq!(engine.get(shared, "v").unwrap(), Some(&Value::from(2)));
}

#[test]
fn test_inherited_builtins_are_not_own_fields() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new().with("name", "john"));
    let child = engine.classical_create(parent, None, true).unwrap();

    assert!(engine.has_field(child, "create").unwrap());
    assert!(!engine.has_own(child, "create").unwrap());
    assert!(engine.has_field(child, "getDelegate").unwrap());
    assert_eq!(engine.record(child).unwrap().field_names(), vec!["name"]);
}

#[test]
fn test_create_builtin_matches_classical_create() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new().with("name", "john"));
    let spec = insert(&mut engine, Record::new().with("age", 28));
    let a = engine.classical_create(root, None, true).unwrap();

    let made = engine
        .call_method(a, "create", &[Value::Record(spec)])
        .unwrap()
        .as_record()
        .unwrap();

    assert_eq!(engine.record(made).unwrap().field_names(), vec!["age", "name"]);
    assert_eq!(delegate_of(&engine, made), delegate_of(&engine, a));
}

#[test]
fn test_create_builtin_respects_copy_flag() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let a = engine.classical_create(root, None, true).unwrap();

    let made = engine
        .call_method(a, "create", &[Value::Null, Value::Bool(false)])
        .unwrap()
        .as_record()
        .unwrap();
    assert_ne!(delegate_of(&engine, made), delegate_of(&engine, a));

    // Anything but an explicit `false` keeps delegate copying on.
    let made = engine
        .call_method(a, "create", &[Value::Null, Value::from(0)])
        .unwrap()
        .as_record()
        .unwrap();
    assert_eq!(delegate_of(&engine, made), delegate_of(&engine, a));
}

#[test]
fn test_create_builtin_rejects_non_record_spec() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let a = engine.classical_create(root, None, true).unwrap();
    let before = engine.stats();

    let result = engine.call_method(a, "create", &[Value::from("oops")]);
    assert!(matches!(result, Err(InheritError::InvalidArgument(_))));
    assert_eq!(engine.stats(), before);
}

#[test]
fn test_get_delegate_builtin() {
    let mut engine = InheritanceEngine::new();
    let root = insert(&mut engine, Record::new());
    let a = engine.classical_create(root, None, true).unwrap();

    let value = engine.call_method(a, "getDelegate", &[]).unwrap();
    assert_eq!(value, Value::Record(delegate_of(&engine, a)));
}

#[test]
fn test_foreign_parent_rejected_without_mutation() {
    let mut other = InheritanceEngine::new();
    let foreign = other.insert(Record::new()).unwrap();

    let mut engine = InheritanceEngine::new();
    let local = insert(&mut engine, Record::new());
    let before = engine.stats();

    let result = engine.classical_create(foreign, None, true);
    assert!(matches!(result, Err(InheritError::InvalidArgument(_))));

    let result = engine.classical_create(local, Some(foreign), true);
    assert!(matches!(result, Err(InheritError::InvalidArgument(_))));

    assert_eq!(engine.stats(), before);
}

#[test]
fn test_foreign_record_value_rejected() {
    let mut other = InheritanceEngine::new();
    let foreign = other.insert(Record::new()).unwrap();

    let mut engine = InheritanceEngine::new();
    let result = engine.insert(Record::new().with("link", foreign));
    assert!(matches!(result, Err(InheritError::InvalidArgument(_))));
    assert_eq!(engine.stats().records, 0);
}

#[test]
fn test_record_limit_leaves_no_partial_state() {
    let mut engine = InheritanceEngine::with_options(EngineOptions::with_record_limit(4));
    let parent = insert(&mut engine, Record::new());
    engine.classical_create(parent, None, true).unwrap();
    let before = engine.stats();
    assert_eq!(
        before,
        EngineStats {
            records: 3,
            delegates: 1
        }
    );

    let result = engine.classical_create(parent, None, true);
    assert!(matches!(
        result,
        Err(InheritError::RecordLimitExceeded { limit: 4 })
    ));
    assert_eq!(engine.stats(), before);
}

#[test]
fn test_create_map_over_record_limit_leaves_no_state() {
    let mut engine = InheritanceEngine::with_options(EngineOptions::with_record_limit(2));
    let spec = insert(&mut engine, Record::new().with("name", "john"));
    let before = engine.stats();

    let result = engine.create_map(spec);
    assert!(matches!(
        result,
        Err(InheritError::RecordLimitExceeded { limit: 2 })
    ));
    assert_eq!(engine.stats(), before);
    assert_eq!(before.records, 1);
}

#[test]
fn test_reset_invalidates_handles() {
    let mut engine = InheritanceEngine::new();
    let parent = insert(&mut engine, Record::new());
    let child = engine.classical_create(parent, None, true).unwrap();
    let old_id = engine.id();

    engine.reset();

    assert_ne!(engine.id(), old_id);
    assert_eq!(
        engine.stats(),
        EngineStats {
            records: 0,
            delegates: 0
        }
    );
    assert!(matches!(
        engine.get_delegate(child),
        Err(InheritError::InvalidArgument(_))
    ));
}
