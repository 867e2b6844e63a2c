//! Logical collection addressing for persistable entities.
//!
//! # Responsibility
//! - Name every logical table an entity can belong to.
//! - Declare the column set and column types the store may address.
//!
//! # Invariants
//! - Every table carries the shared base columns (`name`, `deleted`,
//!   `display`, `folder`).
//! - Only stock-trackable tables expose an inventory table.

use serde::{Deserialize, Serialize};

/// Declared storage type of one column.
///
/// The store uses this to encode/decode values without guessing from the
/// raw SQLite representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Bool,
    Int,
    Double,
    Text,
    Date,
    DateTime,
}

impl ColumnType {
    /// Stable name used in type-mismatch diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "date_time",
        }
    }
}

/// Base columns shared by every entity table.
const BASE_COLUMNS: &[(&str, ColumnType)] = &[
    ("name", ColumnType::Text),
    ("deleted", ColumnType::Bool),
    ("display", ColumnType::Bool),
    ("folder", ColumnType::Text),
];

/// The logical collection an entity belongs to.
///
/// Immutable after construction; together with the row key it uniquely
/// identifies a stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Hop,
    Fermentable,
    Yeast,
    Misc,
    Style,
}

impl Table {
    /// SQL table name for entity rows.
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Hop => "hop",
            Self::Fermentable => "fermentable",
            Self::Yeast => "yeast",
            Self::Misc => "misc",
            Self::Style => "style",
        }
    }

    /// SQL name of the linked inventory table, for stock-trackable tables.
    pub fn inventory_sql_name(self) -> Option<&'static str> {
        match self {
            Self::Hop => Some("hop_inventory"),
            Self::Fermentable => Some("fermentable_inventory"),
            Self::Yeast => Some("yeast_inventory"),
            Self::Misc => Some("misc_inventory"),
            Self::Style => None,
        }
    }

    /// Extra columns beyond the shared base set.
    fn extra_columns(self) -> &'static [(&'static str, ColumnType)] {
        match self {
            Self::Hop => &[
                ("alpha", ColumnType::Double),
                ("origin", ColumnType::Text),
                ("notes", ColumnType::Text),
            ],
            Self::Fermentable => &[
                ("yield_pct", ColumnType::Double),
                ("color_srm", ColumnType::Double),
                ("notes", ColumnType::Text),
            ],
            Self::Yeast => &[
                ("attenuation", ColumnType::Double),
                ("laboratory", ColumnType::Text),
                ("production_date", ColumnType::Date),
                ("notes", ColumnType::Text),
            ],
            Self::Misc => &[
                ("use_for", ColumnType::Text),
                ("notes", ColumnType::Text),
            ],
            Self::Style => &[
                ("category", ColumnType::Text),
                ("notes", ColumnType::Text),
            ],
        }
    }

    /// Declared type of `column`, or `None` when this table has no such
    /// column.
    pub fn column_type(self, column: &str) -> Option<ColumnType> {
        BASE_COLUMNS
            .iter()
            .chain(self.extra_columns())
            .find(|(name, _)| *name == column)
            .map(|(_, column_type)| *column_type)
    }
}

/// Declared type of `column` on every inventory table, or `None`.
///
/// Inventory tables share one shape regardless of the owning entity table.
pub fn inventory_column_type(column: &str) -> Option<ColumnType> {
    match column {
        "amount" => Some(ColumnType::Double),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{inventory_column_type, ColumnType, Table};

    #[test]
    fn every_table_has_base_columns() {
        for table in [
            Table::Hop,
            Table::Fermentable,
            Table::Yeast,
            Table::Misc,
            Table::Style,
        ] {
            assert_eq!(table.column_type("name"), Some(ColumnType::Text));
            assert_eq!(table.column_type("deleted"), Some(ColumnType::Bool));
            assert_eq!(table.column_type("display"), Some(ColumnType::Bool));
            assert_eq!(table.column_type("folder"), Some(ColumnType::Text));
            assert_eq!(table.column_type("no_such_column"), None);
        }
    }

    #[test]
    fn style_is_not_stock_trackable() {
        assert_eq!(Table::Style.inventory_sql_name(), None);
        assert_eq!(Table::Hop.inventory_sql_name(), Some("hop_inventory"));
    }

    #[test]
    fn inventory_tables_share_one_shape() {
        assert_eq!(inventory_column_type("amount"), Some(ColumnType::Double));
        assert_eq!(inventory_column_type("alpha"), None);
    }
}
