//! Brute-force k-nearest-neighbour index over vector relations
//!
//! O(n) per query. Vectors are kept in a `BTreeMap` so iteration is in id
//! order, and results are sorted by (distance asc, id asc). Identical
//! queries against identical contents return identical results.

use super::{DynamicIndex, Index, IndexFactory};
use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use relstore_storage::Relation;
use std::any::Any;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Distance function used by [`KnnIndex`]
///
/// All metrics are distances: lower means closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// L2 distance
    #[default]
    Euclidean,
    /// Squared L2 distance
    SquaredEuclidean,
    /// L1 distance
    Manhattan,
    /// 1 - cosine similarity; 1.0 when either vector has zero norm
    Cosine,
}

impl DistanceMetric {
    /// Distance between two equal-length vectors
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "Dimension mismatch in distance");
        match self {
            DistanceMetric::Euclidean => squared_euclidean(a, b).sqrt(),
            DistanceMetric::SquaredEuclidean => squared_euclidean(a, b),
            DistanceMetric::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Cosine => {
                let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = l2_norm(a);
                let norm_b = l2_norm(b);
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
        }
    }
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dynamic k-nearest-neighbour index
#[derive(Debug, Clone, Default)]
pub struct KnnIndex {
    metric: DistanceMetric,
    vectors: BTreeMap<RowId, Vec<f64>>,
}

impl KnnIndex {
    /// Create an empty index
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            vectors: BTreeMap::new(),
        }
    }

    /// Configured metric
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Is `id` indexed?
    pub fn contains(&self, id: RowId) -> bool {
        self.vectors.contains_key(&id)
    }

    /// The `k` nearest ids to `query` with their distances
    ///
    /// Only vectors of the query's dimension are candidates; an open-dimension
    /// relation may hold several lengths.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the index is non-empty but holds no vector of the
    /// query's dimension.
    pub fn search(&self, query: &[f64], k: usize) -> Result<Vec<(RowId, f64)>> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<(RowId, f64)> = self
            .vectors
            .iter()
            .filter(|(_, vector)| vector.len() == query.len())
            .map(|(&id, vector)| (id, self.metric.distance(query, vector)))
            .collect();
        if results.is_empty() {
            return Err(Error::invalid_input(format!(
                "no indexed vector has dimension {}",
                query.len()
            )));
        }

        // Sort by (distance asc, RowId asc)
        results.sort_by(|(id_a, d_a), (id_b, d_b)| {
            d_a.partial_cmp(d_b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        results.truncate(k);
        Ok(results)
    }

    fn load(&mut self, id: RowId, relation: &dyn Relation) -> Result<()> {
        let value = relation.get(id)?;
        match &*value {
            Value::Vector(v) => {
                self.vectors.insert(id, v.clone());
                Ok(())
            }
            other => Err(Error::TypeMismatch {
                expected: TypeDescriptor::any_vector(),
                actual: other.type_name(),
            }),
        }
    }
}

impl Index for KnnIndex {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn initialize(&mut self, relation: &dyn Relation) -> Result<()> {
        self.vectors.clear();
        for id in relation.ids() {
            self.load(id, relation)?;
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

impl DynamicIndex for KnnIndex {
    fn insert(&mut self, id: RowId, relation: &dyn Relation) -> Result<()> {
        if relation.contains(id) {
            self.load(id, relation)?;
        }
        Ok(())
    }

    fn delete(&mut self, id: RowId) -> Result<()> {
        self.vectors.remove(&id);
        Ok(())
    }
}

/// Attaches a [`KnnIndex`] to every new vector relation
#[derive(Debug, Clone, Copy, Default)]
pub struct KnnIndexFactory {
    metric: DistanceMetric,
}

impl KnnIndexFactory {
    /// Factory producing indexes with `metric`
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }
}

impl IndexFactory for KnnIndexFactory {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn input_type_restriction(&self) -> TypeDescriptor {
        TypeDescriptor::any_vector()
    }

    fn instantiate(&self, _relation: &dyn Relation) -> Box<dyn Index> {
        Box::new(KnnIndex::new(self.metric))
    }
}
