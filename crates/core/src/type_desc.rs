//! Column type descriptors
//!
//! A [`TypeDescriptor`] names the logical type of a column and answers the
//! assignability question used to route incoming batch columns onto existing
//! relations: "may a column described by `other` be stored here?".
//!
//! Assignability is a partial order:
//! - `Any` accepts every descriptor
//! - `Number` accepts `Int`, `Float` and `Number`
//! - `Vector { dimension: None }` accepts every vector descriptor; a fixed
//!   dimension accepts only the same dimension
//! - every other descriptor accepts only itself

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    /// Accepts anything
    Any,
    /// Row identities; only the store's identity relation carries it
    Identity,
    /// Booleans
    Bool,
    /// Signed integers
    Int,
    /// Floating point numbers
    Float,
    /// Any scalar number (Int or Float)
    Number,
    /// Free text
    String,
    /// Class/category labels
    ClassLabel,
    /// Lists of object labels
    LabelList,
    /// Numeric vectors, optionally of fixed dimension
    Vector {
        /// Fixed dimensionality, or `None` for "any dimension"
        dimension: Option<usize>,
    },
    /// Raw bytes
    Bytes,
}

impl TypeDescriptor {
    /// Vector descriptor of fixed dimension
    pub const fn vector(dimension: usize) -> Self {
        TypeDescriptor::Vector {
            dimension: Some(dimension),
        }
    }

    /// Vector descriptor of any dimension
    pub const fn any_vector() -> Self {
        TypeDescriptor::Vector { dimension: None }
    }

    /// Is a column described by `other` storable in a column described by `self`?
    pub fn accepts(&self, other: &TypeDescriptor) -> bool {
        match (self, other) {
            (TypeDescriptor::Any, _) => true,
            (
                TypeDescriptor::Number,
                TypeDescriptor::Int | TypeDescriptor::Float | TypeDescriptor::Number,
            ) => true,
            (TypeDescriptor::Vector { dimension: None }, TypeDescriptor::Vector { .. }) => true,
            (
                TypeDescriptor::Vector { dimension: Some(a) },
                TypeDescriptor::Vector { dimension: Some(b) },
            ) => a == b,
            (a, b) => a == b,
        }
    }

    /// Is this single value storable under `self`?
    ///
    /// `Null` is accepted everywhere; it marks a missing cell.
    pub fn accepts_value(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (TypeDescriptor::Any, _) => true,
            (TypeDescriptor::Vector { dimension }, Value::Vector(v)) => {
                dimension.map_or(true, |d| d == v.len())
            }
            (TypeDescriptor::Number, Value::Int(_) | Value::Float(_)) => true,
            (TypeDescriptor::Identity, Value::Id(_))
            | (TypeDescriptor::Bool, Value::Bool(_))
            | (TypeDescriptor::Int, Value::Int(_))
            | (TypeDescriptor::Float, Value::Float(_))
            | (TypeDescriptor::String, Value::String(_))
            | (TypeDescriptor::ClassLabel, Value::ClassLabel(_))
            | (TypeDescriptor::LabelList, Value::LabelList(_))
            | (TypeDescriptor::Bytes, Value::Bytes(_)) => true,
            _ => false,
        }
    }

    /// Most specific descriptor for a value (`None` for `Null`)
    pub fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(_) => TypeDescriptor::Bool,
            Value::Int(_) => TypeDescriptor::Int,
            Value::Float(_) => TypeDescriptor::Float,
            Value::String(_) => TypeDescriptor::String,
            Value::ClassLabel(_) => TypeDescriptor::ClassLabel,
            Value::LabelList(_) => TypeDescriptor::LabelList,
            Value::Vector(v) => TypeDescriptor::vector(v.len()),
            Value::Bytes(_) => TypeDescriptor::Bytes,
            Value::Id(_) => TypeDescriptor::Identity,
        })
    }

    /// True for the row identity descriptor
    pub fn is_identity(&self) -> bool {
        matches!(self, TypeDescriptor::Identity)
    }

    /// Fixed dimensionality of a vector descriptor
    pub fn dimension(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Vector { dimension } => *dimension,
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Vector {
                dimension: Some(d),
            } => write!(f, "Vector({})", d),
            TypeDescriptor::Vector { dimension: None } => write!(f, "Vector"),
            other => write!(f, "{:?}", other),
        }
    }
}
