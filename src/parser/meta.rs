use super::command::Command;
use super::common::{identifier, literal_list, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::multispace1,
    combinator::{map, value},
    sequence::preceded,
    IResult,
};

pub fn quit(input: &str) -> IResult<&str, Command> {
    value(Command::Quit, ws(alt((tag("\\quit"), tag("\\q")))))(input)
}

pub fn help(input: &str) -> IResult<&str, Command> {
    value(Command::Help, ws(alt((tag("\\help"), tag("\\h"), tag("\\?")))))(input)
}

pub fn list_tables(input: &str) -> IResult<&str, Command> {
    value(Command::ListTables, ws(tag("\\dt")))(input)
}

pub fn describe(input: &str) -> IResult<&str, Command> {
    map(
        preceded(ws(preceded(tag("\\d"), multispace1)), ws(identifier)),
        Command::Describe,
    )(input)
}

pub fn schema(input: &str) -> IResult<&str, Command> {
    value(Command::Schema, ws(tag("\\schema")))(input)
}

// \bind 1, 'text', NULL - parameters for the next statement
pub fn bind(input: &str) -> IResult<&str, Command> {
    map(preceded(ws(tag("\\bind")), literal_list), Command::Bind)(input)
}

pub fn unbind(input: &str) -> IResult<&str, Command> {
    value(Command::Unbind, ws(tag("\\unbind")))(input)
}
