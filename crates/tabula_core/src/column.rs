//! Column metadata.

use serde::{Deserialize, Serialize};

/// A table column as reported by the catalog.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_new::new,
)]
pub struct ColumnDescriptor {
    /// Physical column name
    #[new(into)]
    name: String,
    /// Human-readable label (catalog comment, or the name when absent)
    #[new(into)]
    label: String,
    /// Catalog data type, lower case (e.g. `int`, `varchar`)
    #[new(into)]
    data_type: String,
}

impl ColumnDescriptor {
    /// Whether the catalog type is an integer family type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self.data_type.as_str(),
            "tinyint"
                | "smallint"
                | "mediumint"
                | "int"
                | "integer"
                | "bigint"
                | "int2"
                | "int4"
                | "int8"
                | "serial"
                | "bigserial"
                | "smallserial"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_integer() {
        assert!(ColumnDescriptor::new("id", "id", "bigint").is_integer());
        assert!(ColumnDescriptor::new("qty", "Quantity", "int4").is_integer());
        assert!(!ColumnDescriptor::new("name", "Name", "varchar").is_integer());
        assert!(!ColumnDescriptor::new("price", "Price", "numeric").is_integer());
    }
}
