// Module declarations
pub mod error;
pub mod value;
pub mod data_type;
pub mod column;
pub mod row;
pub mod table;
pub mod schema;
pub mod statement;

// Re-exports for convenience
pub use error::{CursorError, CursorId, DatabaseError, DriverError};
pub use value::Value;
pub use data_type::SqlType;
pub use column::{Column, ResultColumn};
pub use row::Row;
pub use table::{RowIdName, Table};
pub use schema::Schema;
pub use statement::Statement;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn column(name: &str, sql_type: SqlType, in_primary_key: bool) -> Column {
        Column::new(name, sql_type, in_primary_key)
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(3.5).to_string(), "3.5");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "\\xdead");
    }

    #[test]
    fn test_value_as_int() {
        assert_eq!(Value::Integer(42).as_int(), Some(42));
        assert_eq!(Value::Text("hello".to_string()).as_int(), None);
        assert_eq!(Value::Null.as_int(), None);
    }

    #[test]
    fn test_value_sql_literal() {
        assert_eq!(Value::Text("O'Brien".to_string()).to_sql_literal(), "'O''Brien'");
        assert_eq!(Value::Blob(vec![0xab, 0x01]).to_sql_literal(), "x'ab01'");
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
    }

    #[test]
    fn test_decode_without_declared_type_keeps_raw() {
        let raw = Value::Text("12".to_string());
        assert_eq!(raw.clone().decode(None), raw);
    }

    #[test]
    fn test_decode_boolean() {
        assert_eq!(Value::Integer(1).decode(Some(SqlType::Boolean)), Value::Boolean(true));
        assert_eq!(Value::Integer(0).decode(Some(SqlType::Boolean)), Value::Boolean(false));
        assert_eq!(
            Value::Text("false".to_string()).decode(Some(SqlType::Boolean)),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_decode_numeric_conversions() {
        assert_eq!(Value::Integer(3).decode(Some(SqlType::Double)), Value::Real(3.0));
        assert_eq!(Value::Real(4.0).decode(Some(SqlType::Integer)), Value::Integer(4));
        assert_eq!(Value::Real(4.5).decode(Some(SqlType::Integer)), Value::Real(4.5));
        assert_eq!(
            Value::Text("abc".to_string()).decode(Some(SqlType::Integer)),
            Value::Text("abc".to_string())
        );
        assert_eq!(Value::Integer(7).decode(Some(SqlType::Varchar)), Value::Text("7".to_string()));
    }

    #[test]
    fn test_decode_dates() {
        assert_eq!(
            Value::Text("2024-02-29".to_string()).decode(Some(SqlType::Date)),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(
            Value::Text("2024-01-02 03:04:05".to_string()).decode(Some(SqlType::Timestamp)),
            Value::Timestamp(ts)
        );
        assert_eq!(Value::Null.decode(Some(SqlType::Timestamp)), Value::Null);
    }

    #[test]
    fn test_type_code_resolution() {
        assert_eq!(SqlType::from_type_code(4), Some(SqlType::Integer));
        assert_eq!(SqlType::from_type_code(12), Some(SqlType::Varchar));
        assert_eq!(SqlType::from_type_code(2004), Some(SqlType::Blob));
        assert_eq!(SqlType::from_type_code(424_242), None);
        assert_eq!(SqlType::Timestamp.type_code(), 93);
    }

    #[test]
    fn test_row_id_not_needed_with_integer_primary_key() {
        let columns = vec![
            column("id", SqlType::Integer, true),
            column("name", SqlType::Varchar, false),
        ];
        assert_eq!(RowIdName::resolve(&columns), None);
    }

    #[test]
    fn test_row_id_defaults_to_underscore_alias() {
        let columns = vec![column("name", SqlType::Varchar, false)];
        assert_eq!(RowIdName::resolve(&columns), Some(RowIdName::UnderscoreRowId));
    }

    #[test]
    fn test_row_id_skips_shadowed_aliases() {
        let columns = vec![
            column("name", SqlType::Varchar, false),
            column("_ROWID_", SqlType::Varchar, false),
        ];
        assert_eq!(RowIdName::resolve(&columns), Some(RowIdName::RowId));

        let columns = vec![
            column("_ROWID_", SqlType::Varchar, false),
            column("ROWID", SqlType::Varchar, false),
        ];
        assert_eq!(RowIdName::resolve(&columns), Some(RowIdName::Oid));

        let columns = vec![
            column("_ROWID_", SqlType::Varchar, false),
            column("ROWID", SqlType::Varchar, false),
            column("OID", SqlType::Varchar, false),
        ];
        assert_eq!(RowIdName::resolve(&columns), None);
    }

    #[test]
    fn test_row_id_needed_for_non_integer_primary_key() {
        let columns = vec![
            column("code", SqlType::Varchar, true),
            column("id", SqlType::BigInt, true),
        ];
        assert_eq!(RowIdName::resolve(&columns), Some(RowIdName::UnderscoreRowId));
    }

    #[test]
    fn test_table_creation() {
        let table = Table::new(
            "users".to_string(),
            vec![
                column("id", SqlType::Integer, true),
                column("name", SqlType::Varchar, false),
            ],
            false,
        );
        assert_eq!(table.name, "users");
        assert_eq!(table.get_column_index("name"), Some(1));
        assert_eq!(table.get_column_index("age"), None);
        assert_eq!(table.primary_key().count(), 1);
        assert!(table.row_id_name.is_none());
    }

    #[test]
    fn test_row_decoding_uses_result_columns() {
        let columns = vec![
            ResultColumn { name: "flag".to_string(), declared_type: Some(SqlType::Boolean) },
            ResultColumn { name: "expr".to_string(), declared_type: None },
        ];
        let row = Row::decode(vec![Value::Integer(1), Value::Integer(1)], &columns);
        assert_eq!(row.values, vec![Value::Boolean(true), Value::Integer(1)]);
    }

    #[test]
    fn test_statement_bind() {
        let statement = Statement::new("SELECT * FROM t WHERE a = ? AND b = ?")
            .bind(Value::Integer(1))
            .bind(Value::Text("x".to_string()));
        assert_eq!(statement.params.len(), 2);
    }
}
