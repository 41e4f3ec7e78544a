//! Inverted label index
//!
//! Maps each label to the ids carrying it. Label lists contribute one entry
//! per element; class labels and strings contribute their text. Empty id
//! sets are dropped so `labels()` only reports labels that are in use.

use super::{DynamicIndex, Index, IndexFactory};
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use relstore_storage::Relation;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

/// Dynamic label -> ids index
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    by_label: BTreeMap<String, BTreeSet<RowId>>,
    by_id: FxHashMap<RowId, Vec<String>>,
}

fn labels_of(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::LabelList(list) => Ok(list.clone()),
        Value::ClassLabel(s) | Value::String(s) => Ok(vec![s.clone()]),
        other => Err(Error::TypeMismatch {
            expected: TypeDescriptor::LabelList,
            actual: other.type_name(),
        }),
    }
}

impl LabelIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids carrying `label`, ascending
    pub fn lookup(&self, label: &str) -> Vec<RowId> {
        self.by_label
            .get(label)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Distinct labels in use, sorted
    pub fn labels(&self) -> Vec<&str> {
        self.by_label.keys().map(String::as_str).collect()
    }

    /// Number of indexed ids
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn add(&mut self, id: RowId, labels: Vec<String>) {
        self.remove(id);
        if labels.is_empty() {
            return;
        }
        for label in &labels {
            self.by_label.entry(label.clone()).or_default().insert(id);
        }
        self.by_id.insert(id, labels);
    }

    fn remove(&mut self, id: RowId) {
        let Some(labels) = self.by_id.remove(&id) else {
            return;
        };
        for label in labels {
            if let Some(ids) = self.by_label.get_mut(&label) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_label.remove(&label);
                }
            }
        }
    }
}

impl Index for LabelIndex {
    fn name(&self) -> &'static str {
        "label"
    }

    fn initialize(&mut self, relation: &dyn Relation) -> Result<()> {
        self.by_label.clear();
        self.by_id.clear();
        for id in relation.ids() {
            let labels = labels_of(&*relation.get(id)?)?;
            self.add(id, labels);
        }
        Ok(())
    }

    fn as_dynamic(&mut self) -> Option<&mut dyn DynamicIndex> {
        Some(self)
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DynamicIndex for LabelIndex {
    fn insert(&mut self, id: RowId, relation: &dyn Relation) -> Result<()> {
        if !relation.contains(id) {
            return Ok(());
        }
        let labels = labels_of(&*relation.get(id)?)?;
        self.add(id, labels);
        Ok(())
    }

    fn delete(&mut self, id: RowId) -> Result<()> {
        self.remove(id);
        Ok(())
    }
}

/// Attaches a [`LabelIndex`] to new relations of one label-like kind
#[derive(Debug, Clone, Copy)]
pub struct LabelIndexFactory {
    kind: TypeDescriptor,
}

impl LabelIndexFactory {
    /// Index class label relations
    pub fn class_labels() -> Self {
        Self {
            kind: TypeDescriptor::ClassLabel,
        }
    }

    /// Index label list relations
    pub fn label_lists() -> Self {
        Self {
            kind: TypeDescriptor::LabelList,
        }
    }

    /// Index plain string relations
    pub fn strings() -> Self {
        Self {
            kind: TypeDescriptor::String,
        }
    }
}

impl IndexFactory for LabelIndexFactory {
    fn name(&self) -> &'static str {
        "label"
    }

    fn input_type_restriction(&self) -> TypeDescriptor {
        self.kind
    }

    fn instantiate(&self, _relation: &dyn Relation) -> Box<dyn Index> {
        Box::new(LabelIndex::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relstore_storage::MaterializedRelation;

    fn labels(list: &[&str]) -> Value {
        Value::LabelList(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_label_list_elements_indexed() {
        let mut rel = MaterializedRelation::new(TypeDescriptor::LabelList);
        rel.set(RowId::new(1), labels(&["a", "b"])).unwrap();
        rel.set(RowId::new(2), labels(&["b"])).unwrap();

        let mut index = LabelIndex::new();
        index.initialize(&rel).unwrap();
        assert_eq!(index.lookup("b"), vec![RowId::new(1), RowId::new(2)]);
        assert_eq!(index.lookup("a"), vec![RowId::new(1)]);
        assert_eq!(index.labels(), vec!["a", "b"]);
    }

    #[test]
    fn test_delete_drops_unused_labels() {
        let mut rel = MaterializedRelation::new(TypeDescriptor::ClassLabel);
        rel.set(RowId::new(1), Value::ClassLabel("x".into())).unwrap();
        rel.set(RowId::new(2), Value::ClassLabel("y".into())).unwrap();

        let mut index = LabelIndex::new();
        index.initialize(&rel).unwrap();
        index.delete(RowId::new(1)).unwrap();
        assert_eq!(index.labels(), vec!["y"]);
        assert!(index.lookup("x").is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_insert_replaces_previous_labels() {
        let mut rel = MaterializedRelation::new(TypeDescriptor::String);
        rel.set(RowId::new(1), Value::from("old")).unwrap();
        let mut index = LabelIndex::new();
        index.insert(RowId::new(1), &rel).unwrap();

        rel.set(RowId::new(1), Value::from("new")).unwrap();
        index.insert(RowId::new(1), &rel).unwrap();
        assert_eq!(index.labels(), vec!["new"]);
    }

    #[test]
    fn test_non_label_values_rejected() {
        let mut rel = MaterializedRelation::new(TypeDescriptor::Float);
        rel.set(RowId::new(1), Value::Float(1.0)).unwrap();
        let mut index = LabelIndex::new();
        assert!(matches!(
            index.initialize(&rel),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_factory_restriction() {
        let factory = LabelIndexFactory::class_labels();
        assert!(factory
            .input_type_restriction()
            .accepts(&TypeDescriptor::ClassLabel));
        assert!(!factory
            .input_type_restriction()
            .accepts(&TypeDescriptor::String));
    }
}
