// Interactive input parser (meta-commands and bound parameters)
mod command;
mod common;
mod meta;

pub use command::Command;
pub use common::{identifier, literal, literal_list};

use nom::{branch::alt, combinator::all_consuming};

/// Parses one line of interactive input.
///
/// Lines starting with a backslash are meta-commands; anything else is
/// passed through as SQL.
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();

    if !input.starts_with('\\') {
        return Ok(Command::Sql(input.to_string()));
    }

    // Longer tags first: \dt before \d, \unbind before \bind
    let result = all_consuming(alt((
        meta::quit,
        meta::help,
        meta::list_tables,
        meta::schema,
        meta::unbind,
        meta::bind,
        meta::describe,
    )))(input);

    match result {
        Ok((_, command)) => Ok(command),
        Err(_) => Err(format!("Unknown or malformed meta-command: {input}. Use \\? for help.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_sql_passthrough() {
        assert_eq!(
            parse_command("  SELECT * FROM users;  "),
            Ok(Command::Sql("SELECT * FROM users;".to_string()))
        );
    }

    #[test]
    fn test_meta_commands() {
        assert_eq!(parse_command("\\q"), Ok(Command::Quit));
        assert_eq!(parse_command("\\quit"), Ok(Command::Quit));
        assert_eq!(parse_command("\\?"), Ok(Command::Help));
        assert_eq!(parse_command("\\dt"), Ok(Command::ListTables));
        assert_eq!(parse_command("\\schema"), Ok(Command::Schema));
        assert_eq!(parse_command("\\unbind"), Ok(Command::Unbind));
        assert_eq!(
            parse_command("\\d users"),
            Ok(Command::Describe("users".to_string()))
        );
        assert_eq!(
            parse_command("\\d \"order items\""),
            Ok(Command::Describe("order items".to_string()))
        );
    }

    #[test]
    fn test_bind() {
        assert_eq!(
            parse_command("\\bind 1, 'Alice', NULL"),
            Ok(Command::Bind(vec![
                Value::Integer(1),
                Value::Text("Alice".to_string()),
                Value::Null,
            ]))
        );
        assert_eq!(parse_command("\\bind"), Ok(Command::Bind(Vec::new())));
    }

    #[test]
    fn test_unknown_meta_command() {
        assert!(parse_command("\\zz").is_err());
        assert!(parse_command("\\d").is_err());
        assert!(parse_command("\\qx").is_err());
    }
}
