use serde::{Deserialize, Serialize};
use super::column::Column;
use super::data_type::SqlType;

/// Conventional aliases SQLite accepts for the implicit row identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RowIdName {
    #[serde(rename = "_ROWID_")]
    UnderscoreRowId,
    #[serde(rename = "ROWID")]
    RowId,
    #[serde(rename = "OID")]
    Oid,
}

impl RowIdName {
    /// Lookup order used when picking an alias.
    ///
    /// This order is a naming policy, not part of the driver contract; other
    /// drivers may expose the aliases differently.
    pub const PRIORITY: [Self; 3] = [Self::UnderscoreRowId, Self::RowId, Self::Oid];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderscoreRowId => "_ROWID_",
            Self::RowId => "ROWID",
            Self::Oid => "OID",
        }
    }

    /// Picks the alias a table's rows should be addressed by.
    ///
    /// A table with an INTEGER column in its primary key needs no alias, that
    /// column already is the row identifier. Otherwise the first alias that
    /// no real column shadows wins; if all three are shadowed there is none.
    #[must_use]
    pub fn resolve(columns: &[Column]) -> Option<Self> {
        let has_integer_primary_key = columns
            .iter()
            .any(|c| c.in_primary_key && c.sql_type == SqlType::Integer);
        if has_integer_primary_key {
            return None;
        }

        Self::PRIORITY
            .into_iter()
            .find(|alias| columns.iter().all(|c| c.name != alias.as_str()))
    }
}

impl std::fmt::Display for RowIdName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub row_id_name: Option<RowIdName>,
    pub is_view: bool,
}

impl Table {
    /// Builds a table descriptor, resolving its row-identifier alias.
    #[must_use]
    pub fn new(name: String, columns: Vec<Column>, is_view: bool) -> Self {
        let row_id_name = RowIdName::resolve(&columns);
        Self {
            name,
            columns,
            row_id_name,
            is_view,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.in_primary_key)
    }
}
