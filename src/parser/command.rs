use crate::types::Value;

/// One line of interactive input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    ListTables,
    Describe(String),
    Schema,
    Bind(Vec<Value>),
    Unbind,
    Sql(String),
}
