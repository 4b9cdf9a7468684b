/// Schema reader - builds a schema snapshot from driver metadata
///
/// Runs on the connection's worker. Any metadata failure aborts the whole
/// read: there is no partial snapshot.

use std::collections::HashSet;

use crate::core::{Column, DriverError, Schema, SqlType, Table};
use crate::driver::Driver;

/// Object kind the driver reports for views.
pub const VIEW_KIND: &str = "VIEW";

pub struct SchemaReader;

impl SchemaReader {
    pub fn read(driver: &mut dyn Driver) -> Result<Schema, DriverError> {
        let entries = driver.tables()?;
        let mut tables = Vec::with_capacity(entries.len());

        for entry in entries {
            let columns = Self::read_columns(driver, &entry.name)?;
            let is_view = entry.kind == VIEW_KIND;
            tables.push(Table::new(entry.name, columns, is_view));
        }

        Ok(Schema::new(tables))
    }

    fn read_columns(driver: &mut dyn Driver, table: &str) -> Result<Vec<Column>, DriverError> {
        let entries = driver.columns(table)?;
        let key_columns: HashSet<String> = driver.primary_key_columns(table)?.into_iter().collect();

        entries
            .into_iter()
            .map(|entry| {
                let sql_type = SqlType::from_type_code(entry.type_code)
                    .ok_or(DriverError::UnknownTypeCode(entry.type_code))?;
                let in_primary_key = key_columns.contains(&entry.name);
                Ok(Column {
                    name: entry.name,
                    sql_type,
                    in_primary_key,
                })
            })
            .collect()
    }
}
