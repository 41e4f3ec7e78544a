//! Value types for relstore
//!
//! This module defines:
//! - Value: the dynamically typed cell stored in a relation
//!
//! ## Type Rules
//!
//! - No implicit coercions: `Int(1) != Float(1.0)`
//! - `ClassLabel("a") != String("a")`: label kinds are distinct column types
//! - Float uses IEEE-754 equality: `NaN != NaN`
//! - `Null` marks a missing cell; it is accepted by every column and never
//!   enters a relation's domain

use crate::types::RowId;
use serde::{Deserialize, Serialize};

/// Separator used when a label list is rendered as a single string
pub const LABEL_CONCATENATION: &str = " ";

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing cell
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Float(f64),
    /// Free-text string
    String(String),
    /// Class/category label
    ClassLabel(String),
    /// Ordered list of object labels
    LabelList(Vec<String>),
    /// Numeric feature vector
    Vector(Vec<f64>),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Row identity (only valid in identity columns)
    Id(RowId),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::ClassLabel(_) => "ClassLabel",
            Value::LabelList(_) => "LabelList",
            Value::Vector(_) => "Vector",
            Value::Bytes(_) => "Bytes",
            Value::Id(_) => "Id",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric view of Int and Float values
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the label if this is a ClassLabel value
    pub fn as_class_label(&self) -> Option<&str> {
        match self {
            Value::ClassLabel(s) => Some(s),
            _ => None,
        }
    }

    /// Get the labels if this is a LabelList value
    pub fn as_label_list(&self) -> Option<&[String]> {
        match self {
            Value::LabelList(l) => Some(l),
            _ => None,
        }
    }

    /// Get as &[f64] if this is a Vector value
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get the row id if this is an Id value
    pub fn as_id(&self) -> Option<RowId> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    /// Render a label-like value (class label, label list, string) as text
    ///
    /// Label lists are joined with [`LABEL_CONCATENATION`].
    pub fn to_label_string(&self) -> Option<String> {
        match self {
            Value::String(s) | Value::ClassLabel(s) => Some(s.clone()),
            Value::LabelList(l) => Some(l.join(LABEL_CONCATENATION)),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        Value::Id(id)
    }
}
