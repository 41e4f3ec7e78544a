//! Row identity types
//!
//! - RowId: opaque, totally ordered identifier of one logical record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a row in a store
///
/// At most one live row holds a given RowId. Once the row is deleted the id
/// returns to the allocator and may be issued again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(u64);

impl RowId {
    /// Create a RowId from its raw value
    pub const fn new(raw: u64) -> Self {
        RowId(raw)
    }

    /// Get the underlying u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RowId {
    fn from(raw: u64) -> Self {
        RowId(raw)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_ordering() {
        assert!(RowId::new(1) < RowId::new(2));
        assert_eq!(RowId::from(5), RowId::new(5));
    }

    #[test]
    fn test_row_id_display() {
        assert_eq!(RowId::new(17).to_string(), "17");
        assert_eq!(RowId::new(17).as_u64(), 17);
    }
}
