use crate::types::Value;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit0, digit1, hex_digit0, multispace0, none_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

// Bare identifier or a "double quoted" one ("" escapes a quote)
pub fn identifier(input: &str) -> IResult<&str, String> {
    alt((
        map(
            recognize(pair(
                take_while1(|c: char| c.is_alphabetic() || c == '_'),
                take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
            )),
            |s: &str| s.to_string(),
        ),
        map(
            delimited(
                char('"'),
                many0(alt((value('"', tag("\"\"")), none_of("\"")))),
                char('"'),
            ),
            |chars: Vec<char>| chars.into_iter().collect(),
        ),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    map_res(
        recognize(tuple((
            opt(alt((char('-'), char('+')))),
            digit1,
            opt(pair(char('.'), digit0)),
        ))),
        |s: &str| {
            if s.contains('.') {
                s.parse::<f64>().map(Value::Real).map_err(|e| e.to_string())
            } else {
                s.parse::<i64>().map(Value::Integer).map_err(|e| e.to_string())
            }
        },
    )(input)
}

fn string_literal(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            char('\''),
            many0(alt((value('\'', tag("''")), none_of("'")))),
            char('\''),
        ),
        |chars: Vec<char>| Value::Text(chars.into_iter().collect()),
    )(input)
}

fn blob_literal(input: &str) -> IResult<&str, Value> {
    map_res(
        preceded(tag_no_case("x'"), terminated(hex_digit0, char('\''))),
        |hex_str: &str| hex::decode(hex_str).map(Value::Blob),
    )(input)
}

// SQL literal: NULL, TRUE/FALSE, numbers, 'text', x'blob'
pub fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Null, tag_no_case("NULL")),
        value(Value::Boolean(true), tag_no_case("TRUE")),
        value(Value::Boolean(false), tag_no_case("FALSE")),
        blob_literal,
        string_literal,
        number,
    ))(input)
}

pub fn literal_list(input: &str) -> IResult<&str, Vec<Value>> {
    separated_list0(ws(char(',')), ws(literal))(input)
}
