use serde::{Deserialize, Serialize};
use super::data_type::SqlType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub in_primary_key: bool,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType, in_primary_key: bool) -> Self {
        Self {
            name: name.into(),
            sql_type,
            in_primary_key,
        }
    }
}

/// Column of a row set, as reported when the statement was executed.
///
/// `declared_type` is only known when the result column maps straight onto
/// a table column; expressions and aggregates carry `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultColumn {
    pub name: String,
    pub declared_type: Option<SqlType>,
}
