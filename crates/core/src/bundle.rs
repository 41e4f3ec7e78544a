//! Object bundles: the data-transfer shapes for insert and delete
//!
//! - [`Batch`]: positionally aligned, type-tagged columns for one or more rows
//! - [`RowSnapshot`]: the cells of a single row, one per column
//!
//! Rows in a batch carry no identity of their own. A column tagged with
//! [`TypeDescriptor::Identity`] supplies explicit ids; otherwise the store
//! allocates them.

use crate::error::{Error, Result};
use crate::stream::{BundleStream, StreamEvent};
use crate::type_desc::TypeDescriptor;
use crate::value::Value;

/// One column of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Declared type of the column
    pub descriptor: TypeDescriptor,
    /// One value per row
    pub values: Vec<Value>,
}

/// A set of equal-length columns awaiting insertion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    columns: Vec<Column>,
    rows: usize,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Batch::append_column`]
    pub fn with_column(mut self, descriptor: TypeDescriptor, values: Vec<Value>) -> Result<Self> {
        self.append_column(descriptor, values)?;
        Ok(self)
    }

    /// Append a column
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the length differs from the existing columns
    /// - `TypeMismatch` if a value is not accepted by `descriptor`
    pub fn append_column(&mut self, descriptor: TypeDescriptor, values: Vec<Value>) -> Result<()> {
        if !self.columns.is_empty() && values.len() != self.rows {
            return Err(Error::invalid_input(format!(
                "column length {} does not match batch length {}",
                values.len(),
                self.rows
            )));
        }
        if let Some(bad) = values.iter().find(|v| !descriptor.accepts_value(v)) {
            return Err(Error::TypeMismatch {
                expected: descriptor,
                actual: bad.type_name(),
            });
        }
        self.rows = values.len();
        self.columns.push(Column { descriptor, values });
        Ok(())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Descriptor of column `i`
    pub fn meta(&self, i: usize) -> Option<&TypeDescriptor> {
        self.columns.get(i).map(|c| &c.descriptor)
    }

    /// Descriptors of all columns, in order
    pub fn metas(&self) -> Vec<TypeDescriptor> {
        self.columns.iter().map(|c| c.descriptor).collect()
    }

    /// Value at (`row`, `column`)
    pub fn data(&self, row: usize, column: usize) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.values.get(row))
    }

    /// All columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consume the batch into its columns
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Position of the identity column, if any
    pub fn identity_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.descriptor.is_identity())
    }

    /// Copy out row `j` as a snapshot
    pub fn row(&self, j: usize) -> Option<RowSnapshot> {
        if j >= self.rows {
            return None;
        }
        Some(RowSnapshot {
            cells: self
                .columns
                .iter()
                .map(|c| (c.descriptor, c.values[j].clone()))
                .collect(),
        })
    }

    /// Materialize a pull-based stream into a batch
    ///
    /// A meta change may extend the column set; rows read before the new
    /// columns appeared are padded with `Null`.
    pub fn from_stream(stream: &mut dyn BundleStream) -> Result<Batch> {
        let mut batch = Batch::new();
        loop {
            match stream.next_event()? {
                StreamEvent::MetaChanged => {
                    let meta = stream.meta().to_vec();
                    if meta.len() < batch.columns.len() {
                        return Err(Error::invalid_input(
                            "stream meta lost columns mid-stream",
                        ));
                    }
                    for (i, descriptor) in meta.into_iter().enumerate() {
                        match batch.columns.get_mut(i) {
                            Some(column) => column.descriptor = descriptor,
                            None => batch.columns.push(Column {
                                descriptor,
                                values: vec![Value::Null; batch.rows],
                            }),
                        }
                    }
                }
                StreamEvent::NextObject => {
                    for (i, column) in batch.columns.iter_mut().enumerate() {
                        let value = stream.data(i).cloned().unwrap_or(Value::Null);
                        if !column.descriptor.accepts_value(&value) {
                            return Err(Error::TypeMismatch {
                                expected: column.descriptor,
                                actual: value.type_name(),
                            });
                        }
                        column.values.push(value);
                    }
                    batch.rows += 1;
                }
                StreamEvent::EndOfStream => return Ok(batch),
            }
        }
    }
}

/// The cells of one row, each tagged with its column descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSnapshot {
    cells: Vec<(TypeDescriptor, Value)>,
}

impl RowSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `value` is not accepted by `descriptor`.
    pub fn append(&mut self, descriptor: TypeDescriptor, value: Value) -> Result<()> {
        if !descriptor.accepts_value(&value) {
            return Err(Error::TypeMismatch {
                expected: descriptor,
                actual: value.type_name(),
            });
        }
        self.cells.push((descriptor, value));
        Ok(())
    }

    /// Builder form of [`RowSnapshot::append`]
    pub fn with(mut self, descriptor: TypeDescriptor, value: Value) -> Result<Self> {
        self.append(descriptor, value)?;
        Ok(self)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the snapshot holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Descriptor of cell `i`
    pub fn meta(&self, i: usize) -> Option<&TypeDescriptor> {
        self.cells.get(i).map(|(d, _)| d)
    }

    /// Value of cell `i`
    pub fn value(&self, i: usize) -> Option<&Value> {
        self.cells.get(i).map(|(_, v)| v)
    }

    /// First value whose descriptor equals `descriptor`
    pub fn value_of(&self, descriptor: &TypeDescriptor) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(d, _)| d == descriptor)
            .map(|(_, v)| v)
    }

    /// Iterate over (descriptor, value) cells
    pub fn iter(&self) -> impl Iterator<Item = &(TypeDescriptor, Value)> {
        self.cells.iter()
    }

    /// Turn the snapshot into a one-row batch
    pub fn into_batch(self) -> Batch {
        let columns: Vec<Column> = self
            .cells
            .into_iter()
            .map(|(descriptor, value)| Column {
                descriptor,
                values: vec![value],
            })
            .collect();
        let rows = usize::from(!columns.is_empty());
        Batch { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamFromBatch;
    use crate::types::RowId;

    fn floats(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| Value::Float(*v)).collect()
    }

    #[test]
    fn test_append_columns() {
        let batch = Batch::new()
            .with_column(TypeDescriptor::Float, floats(&[1.0, 2.0]))
            .unwrap()
            .with_column(
                TypeDescriptor::String,
                vec![Value::from("a"), Value::from("b")],
            )
            .unwrap();
        assert_eq!(batch.row_count(), 2);
        assert_eq!(batch.column_count(), 2);
        assert_eq!(batch.data(1, 1), Some(&Value::from("b")));
        assert_eq!(batch.meta(0), Some(&TypeDescriptor::Float));
    }

    #[test]
    fn test_ragged_column_rejected() {
        let mut batch = Batch::new();
        batch
            .append_column(TypeDescriptor::Float, floats(&[1.0, 2.0]))
            .unwrap();
        let err = batch
            .append_column(TypeDescriptor::Float, floats(&[1.0]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(batch.column_count(), 1);
    }

    #[test]
    fn test_mistyped_value_rejected() {
        let err = Batch::new()
            .with_column(TypeDescriptor::Float, vec![Value::Int(1)])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_identity_column_lookup() {
        let batch = Batch::new()
            .with_column(TypeDescriptor::Float, floats(&[1.0]))
            .unwrap()
            .with_column(TypeDescriptor::Identity, vec![Value::Id(RowId::new(7))])
            .unwrap();
        assert_eq!(batch.identity_column(), Some(1));
    }

    #[test]
    fn test_row_snapshot_round_trip_through_batch() {
        let row = RowSnapshot::new()
            .with(TypeDescriptor::Int, Value::Int(4))
            .unwrap()
            .with(TypeDescriptor::ClassLabel, Value::ClassLabel("x".into()))
            .unwrap();
        assert_eq!(
            row.value_of(&TypeDescriptor::ClassLabel),
            Some(&Value::ClassLabel("x".into()))
        );
        let batch = row.clone().into_batch();
        assert_eq!(batch.row_count(), 1);
        assert_eq!(batch.row(0), Some(row));
    }

    #[test]
    fn test_from_stream_materializes_rows() {
        let source = Batch::new()
            .with_column(TypeDescriptor::Float, floats(&[1.0, 2.0, 3.0]))
            .unwrap();
        let mut stream = StreamFromBatch::new(source.clone());
        let batch = Batch::from_stream(&mut stream).unwrap();
        assert_eq!(batch, source);
    }
}
