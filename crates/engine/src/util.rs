//! Numeric helpers over relations
//!
//! Vector relations are read as points; scalar numeric relations are read
//! as one-dimensional points.

use relstore_core::{Error, Result, RowId, TypeDescriptor, Value};
use relstore_storage::Relation;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::borrow::Cow;
use std::cmp::Ordering;

fn point(value: &Value) -> Result<Vec<f64>> {
    match value {
        Value::Vector(v) => Ok(v.clone()),
        other => other.as_number().map(|x| vec![x]).ok_or(Error::TypeMismatch {
            expected: TypeDescriptor::any_vector(),
            actual: other.type_name(),
        }),
    }
}

fn coordinate(relation: &dyn Relation, id: RowId, dim: usize) -> Result<f64> {
    let p = point(&*relation.get(id)?)?;
    p.get(dim).copied().ok_or_else(|| {
        Error::invalid_input(format!("dimension {} out of range for {}", dim, id))
    })
}

/// Iterate `(id, value)` over the relation's domain in id order
pub fn iter_values<'a>(
    relation: &'a dyn Relation,
) -> impl Iterator<Item = Result<(RowId, Cow<'a, Value>)>> + 'a {
    relation
        .ids()
        .into_iter()
        .map(move |id| relation.get(id).map(|v| (id, v)))
}

/// Dimensionality of a numeric relation
///
/// Fixed-dimension vector descriptors answer directly; open vector
/// relations report the length of their first value; scalars are 1.
pub fn dimensionality(relation: &dyn Relation) -> Option<usize> {
    match relation.type_descriptor() {
        TypeDescriptor::Vector {
            dimension: Some(d),
        } => Some(d),
        TypeDescriptor::Vector { dimension: None } => {
            let first = relation.ids().into_iter().next()?;
            relation.get(first).ok()?.as_vector().map(<[f64]>::len)
        }
        TypeDescriptor::Int | TypeDescriptor::Float | TypeDescriptor::Number => Some(1),
        _ => None,
    }
}

/// Per-dimension minimum and maximum
///
/// An empty relation of known dimensionality yields `f64::MAX` minima and
/// `-f64::MAX` maxima.
pub fn compute_min_max(relation: &dyn Relation) -> Result<(Vec<f64>, Vec<f64>)> {
    let dim = dimensionality(relation).ok_or_else(|| {
        Error::invalid_input(format!(
            "relation of type {} has no numeric dimensionality",
            relation.type_descriptor()
        ))
    })?;
    let mut min = vec![f64::MAX; dim];
    let mut max = vec![-f64::MAX; dim];
    for id in relation.ids() {
        let p = point(&*relation.get(id)?)?;
        if p.len() != dim {
            return Err(Error::invalid_input(format!(
                "row {} has dimension {}, expected {}",
                id,
                p.len(),
                dim
            )));
        }
        for (d, x) in p.into_iter().enumerate() {
            min[d] = min[d].min(x);
            max[d] = max[d].max(x);
        }
    }
    Ok((min, max))
}

/// Sample variance of each dimension around `centroid`
///
/// # Errors
///
/// `InvalidInput` for fewer than two ids or a dimension mismatch.
pub fn variances(relation: &dyn Relation, centroid: &[f64], ids: &[RowId]) -> Result<Vec<f64>> {
    if ids.len() < 2 {
        return Err(Error::invalid_input("variance needs at least two rows"));
    }
    let mut sums = vec![0.0; centroid.len()];
    for &id in ids {
        let p = point(&*relation.get(id)?)?;
        if p.len() != centroid.len() {
            return Err(Error::invalid_input(format!(
                "row {} has dimension {}, centroid has {}",
                id,
                p.len(),
                centroid.len()
            )));
        }
        for ((sum, x), c) in sums.iter_mut().zip(&p).zip(centroid) {
            *sum += (x - c) * (x - c);
        }
    }
    let n = (ids.len() - 1) as f64;
    Ok(sums.into_iter().map(|s| s / n).collect())
}

/// Median of dimension `dim` over `ids`
///
/// Even counts average the two middle values.
pub fn exact_median(relation: &dyn Relation, ids: &[RowId], dim: usize) -> Result<f64> {
    if ids.is_empty() {
        return Err(Error::invalid_input("median of an empty id set"));
    }
    let mut values = ids
        .iter()
        .map(|&id| coordinate(relation, id, dim))
        .collect::<Result<Vec<_>>>()?;
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Ok(values[mid])
    } else {
        Ok((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Median estimate from a seeded sample of `sample_size` ids
///
/// Falls back to [`exact_median`] when the set is not larger than the
/// sample.
pub fn quick_median(
    relation: &dyn Relation,
    ids: &[RowId],
    dim: usize,
    sample_size: usize,
    seed: u64,
) -> Result<f64> {
    if ids.len() <= sample_size || sample_size == 0 {
        return exact_median(relation, ids, dim);
    }
    let sample = random_sample(ids, sample_size, seed);
    exact_median(relation, &sample, dim)
}

/// `k` distinct ids drawn uniformly with a fixed seed, in id order
///
/// Returns all ids when `k` is not smaller than the set.
pub fn random_sample(ids: &[RowId], k: usize, seed: u64) -> Vec<RowId> {
    let mut sample: Vec<RowId> = if k >= ids.len() {
        ids.to_vec()
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, ids.len(), k)
            .into_iter()
            .map(|i| ids[i])
            .collect()
    };
    sample.sort_unstable();
    sample
}
