use serde::{Deserialize, Serialize};
use super::column::ResultColumn;
use super::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Builds a row from raw driver values, decoding each cell positionally
    /// against the matching result column.
    #[must_use]
    pub fn decode(raw: Vec<Value>, columns: &[ResultColumn]) -> Self {
        let values = raw
            .into_iter()
            .enumerate()
            .map(|(i, value)| value.decode(columns.get(i).and_then(|c| c.declared_type)))
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
