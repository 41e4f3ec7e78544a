//! Label resolution
//!
//! Finds the relation best suited as a textual label. Two modes exist and
//! differ only in preference order:
//!
//! | Mode          | Order                              |
//! |---------------|------------------------------------|
//! | `ClassLabel`  | class label, label list, string    |
//! | `ObjectLabel` | label list, string, class label    |
//!
//! Both fall through to plain strings, so a store holding only a string
//! column resolves the same relation in either mode.

use crate::database::{RelationId, Store};
use relstore_core::{Error, Result, RowId, TypeDescriptor};
use relstore_storage::LabelView;
use std::collections::BTreeSet;

/// Which kind of label the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPreference {
    /// Best class/category label
    ClassLabel,
    /// Best free-text object label
    ObjectLabel,
}

impl LabelPreference {
    /// Column kinds tried, in order
    pub fn order(&self) -> [TypeDescriptor; 3] {
        match self {
            LabelPreference::ClassLabel => [
                TypeDescriptor::ClassLabel,
                TypeDescriptor::LabelList,
                TypeDescriptor::String,
            ],
            LabelPreference::ObjectLabel => [
                TypeDescriptor::LabelList,
                TypeDescriptor::String,
                TypeDescriptor::ClassLabel,
            ],
        }
    }
}

/// A resolved label relation, viewed as strings
#[derive(Debug, Clone, Copy)]
pub struct LabelColumn<'a> {
    /// The relation that was picked
    pub relation: RelationId,
    /// String view over it
    pub view: LabelView<'a>,
}

impl LabelColumn<'_> {
    /// Label text of `id`
    pub fn label(&self, id: RowId) -> Result<String> {
        self.view.label(id)
    }
}

/// Resolve the label relation for `preference`
///
/// # Errors
///
/// `NoLabelLikeColumn` if no relation matches any kind in the order.
pub fn resolve(store: &Store, preference: LabelPreference) -> Result<LabelColumn<'_>> {
    preference
        .order()
        .into_iter()
        .find_map(|kind| store.relation_by_type(kind).ok())
        .map(|(relation, rel)| LabelColumn {
            relation,
            view: LabelView::new(rel),
        })
        .ok_or(Error::NoLabelLikeColumn)
}

/// Best class/category label relation
pub fn guess_label_relation(store: &Store) -> Result<LabelColumn<'_>> {
    resolve(store, LabelPreference::ClassLabel)
}

/// Best free-text object label relation
pub fn guess_object_label_relation(store: &Store) -> Result<LabelColumn<'_>> {
    resolve(store, LabelPreference::ObjectLabel)
}

/// Distinct class labels of the first class label relation, sorted
///
/// # Errors
///
/// `NoSupportedDataType` if the store has no class label relation.
pub fn class_labels(store: &Store) -> Result<BTreeSet<String>> {
    let (_, relation) = store.relation_by_type(TypeDescriptor::ClassLabel)?;
    let mut labels = BTreeSet::new();
    for id in relation.ids() {
        if let Some(label) = relation.get(id)?.as_class_label() {
            labels.insert(label.to_string());
        }
    }
    Ok(labels)
}

/// Ids whose class label satisfies `matches`, ascending
///
/// The label relation is resolved in class label mode and each row is
/// matched on its string view, so label lists match as one joined string.
pub fn objects_by_label_match<F>(store: &Store, matches: F) -> Result<Vec<RowId>>
where
    F: Fn(&str) -> bool,
{
    let column = guess_label_relation(store)?;
    let mut hits = Vec::new();
    for id in store.relation(column.relation)?.ids() {
        if matches(&column.label(id)?) {
            hits.push(id);
        }
    }
    Ok(hits)
}
