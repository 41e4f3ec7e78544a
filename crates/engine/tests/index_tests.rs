//! Integration tests for index attachment and notification
//!
//! - Factories attach indexes only to relations created after registration
//! - Dynamic indexes mirror the relation domain after every call
//! - Static indexes never change after construction and are flagged stale
//! - Fixed-capacity relations reject deletes

use relstore_core::{Batch, Error, RowId, TypeDescriptor, Value};
use relstore_engine::index::{
    DistanceMetric, KnnIndex, KnnIndexFactory, LabelIndex, LabelIndexFactory, MembershipIndex,
    MembershipIndexFactory, SortedValueIndex, SortedValueIndexFactory,
};
use relstore_engine::{Index, IndexFactory, RelationId, Store};
use relstore_storage::{ArrayIdMap, FixedFloatRelation, Relation};

fn vectors(points: &[[f64; 2]]) -> Batch {
    Batch::new()
        .with_column(
            TypeDescriptor::vector(2),
            points.iter().map(|p| Value::Vector(p.to_vec())).collect(),
        )
        .unwrap()
}

fn ints(values: &[i64]) -> Batch {
    Batch::new()
        .with_column(
            TypeDescriptor::Int,
            values.iter().map(|&v| Value::Int(v)).collect(),
        )
        .unwrap()
}

#[test]
fn membership_reflects_domain_after_insert_and_delete() {
    let mut store = Store::builder()
        .index_factory(MembershipIndexFactory)
        .build()
        .unwrap();
    let ids = store.insert(ints(&[1, 2, 3, 4, 5])).unwrap();
    store.delete(ids[0]).unwrap();
    store.delete(ids[3]).unwrap();

    let index_id = store.indexes_for(RelationId::from_position(0))[0];
    let index = store.index_as::<MembershipIndex>(index_id).unwrap();
    let relation = store.relation(RelationId::from_position(0)).unwrap();
    assert_eq!(index.members(), relation.ids());
    assert_eq!(index.len(), 3);
}

#[test]
fn static_index_unchanged_by_later_insert() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mut store = Store::builder()
        .index_factory(SortedValueIndexFactory)
        .build()
        .unwrap();
    store.insert(ints(&[10, 20])).unwrap();

    let index_id = store.indexes_for(RelationId::from_position(0))[0];
    // built when the relation was created, before any row arrived
    assert_eq!(store.index_as::<SortedValueIndex>(index_id).unwrap().len(), 0);
    assert!(store.is_index_stale(index_id));

    store.insert(ints(&[30])).unwrap();
    assert_eq!(store.index_as::<SortedValueIndex>(index_id).unwrap().len(), 0);
}

#[test]
fn factories_are_not_retroactive() {
    let mut store = Store::new();
    store.insert(ints(&[1])).unwrap();
    store.add_index_factory(Box::new(MembershipIndexFactory));

    store.insert(ints(&[2])).unwrap();
    assert_eq!(store.index_count(), 0);

    // a second int column in one batch needs a new relation
    let batch = ints(&[3])
        .with_column(TypeDescriptor::Int, vec![Value::Int(4)])
        .unwrap();
    store.insert(batch).unwrap();
    assert_eq!(store.index_count(), 1);
    assert_eq!(
        store.indexes_for(RelationId::from_position(1)).len(),
        1
    );
}

#[test]
fn knn_index_follows_store() {
    let mut store = Store::builder()
        .index_factory(KnnIndexFactory::new(DistanceMetric::Euclidean))
        .build()
        .unwrap();
    let ids = store
        .insert(vectors(&[[0.0, 0.0], [1.0, 0.0], [5.0, 5.0]]))
        .unwrap();
    let index_id = store.indexes_for(RelationId::from_position(0))[0];

    let knn = store.index_as::<KnnIndex>(index_id).unwrap();
    let hits = knn.search(&[0.9, 0.0], 2).unwrap();
    assert_eq!(hits[0].0, ids[1]);
    assert_eq!(hits[1].0, ids[0]);

    store.delete(ids[1]).unwrap();
    let knn = store.index_as::<KnnIndex>(index_id).unwrap();
    assert_eq!(knn.search(&[0.9, 0.0], 1).unwrap()[0].0, ids[0]);
    assert_eq!(knn.len(), 2);
}

#[test]
fn label_index_follows_bulk_delete() {
    let mut store = Store::builder()
        .index_factory(LabelIndexFactory::class_labels())
        .build()
        .unwrap();
    let batch = Batch::new()
        .with_column(
            TypeDescriptor::ClassLabel,
            ["a", "b", "a"]
                .iter()
                .map(|s| Value::ClassLabel(s.to_string()))
                .collect(),
        )
        .unwrap();
    let ids = store.insert(batch).unwrap();
    let index_id = store.indexes_for(RelationId::from_position(0))[0];
    assert_eq!(
        store.index_as::<LabelIndex>(index_id).unwrap().lookup("a"),
        vec![ids[0], ids[2]]
    );

    store.delete_all(&[ids[0], ids[1]]).unwrap();
    let index = store.index_as::<LabelIndex>(index_id).unwrap();
    assert_eq!(index.lookup("a"), vec![ids[2]]);
    assert_eq!(index.labels(), vec!["a"]);
}

#[test]
fn attach_index_initializes_from_current_contents() {
    let mut store = Store::new();
    let ids = store.insert(ints(&[3, 1, 2])).unwrap();
    let index_id = store
        .attach_index(RelationId::from_position(0), Box::new(SortedValueIndex::new()))
        .unwrap();

    let index = store.index_as::<SortedValueIndex>(index_id).unwrap();
    assert_eq!(index.range(1.0, 2.0), vec![ids[1], ids[2]]);
    assert!(!store.is_index_stale(index_id));
    assert!(store.index(index_id).is_some());
    assert!(store.index_as::<MembershipIndex>(index_id).is_none());
}

#[test]
fn attach_to_identity_relation() {
    let mut store = Store::new();
    let index_id = store
        .attach_index(RelationId::IDENTITY, Box::new(MembershipIndex::new()))
        .unwrap();
    let ids = store.insert(ints(&[1, 2])).unwrap();
    assert_eq!(
        store.index_as::<MembershipIndex>(index_id).unwrap().members(),
        ids
    );
}

#[test]
fn fixed_capacity_delete_rejected() {
    let ids = [RowId::new(2), RowId::new(5)];
    let mut relation = FixedFloatRelation::with_default(ArrayIdMap::new(ids), 0.5);
    relation.set(RowId::new(5), Value::Float(9.0)).unwrap();

    let err = relation.delete(RowId::new(5)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedMutation(_)));
    assert_eq!(relation.get(RowId::new(5)).unwrap().as_float(), Some(9.0));
    assert_eq!(relation.len(), 2);

    // the contract's static index runs over any backend
    let factory = SortedValueIndexFactory;
    assert!(factory
        .input_type_restriction()
        .accepts(&relation.type_descriptor()));
    let mut index = factory.instantiate(&relation);
    index.initialize(&relation).unwrap();
    let sorted = index.as_any().downcast_ref::<SortedValueIndex>().unwrap();
    assert_eq!(sorted.range(0.0, 1.0), vec![RowId::new(2)]);
}
