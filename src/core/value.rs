use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime};
use super::data_type::SqlType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    // Storage classes reported by the driver
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    // Produced by decoding against a declared column type
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Value {
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a raw driver value according to the declared column type.
    ///
    /// Values that do not fit the declared type are returned unchanged:
    /// SQLite does not enforce declared types, so a TEXT cell in an INTEGER
    /// column is legal and must survive the round trip.
    #[must_use]
    pub fn decode(self, declared: Option<SqlType>) -> Self {
        let Some(sql_type) = declared else {
            return self;
        };

        match (sql_type, self) {
            (_, Self::Null) => Self::Null,
            (SqlType::Boolean | SqlType::Bit, Self::Integer(i)) => Self::Boolean(i != 0),
            (SqlType::Boolean | SqlType::Bit, Self::Text(s)) => {
                match s.to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Self::Boolean(true),
                    "false" | "f" | "0" => Self::Boolean(false),
                    _ => Self::Text(s),
                }
            }
            (t, Self::Real(r)) if t.is_integral() && r.fract() == 0.0 && r.abs() < 9.0e15 => {
                Self::Integer(r as i64)
            }
            (t, Self::Text(s)) if t.is_integral() => match s.trim().parse::<i64>() {
                Ok(i) => Self::Integer(i),
                Err(_) => Self::Text(s),
            },
            (t, Self::Integer(i)) if t.is_floating() => Self::Real(i as f64),
            (t, Self::Text(s)) if t.is_floating() => match s.trim().parse::<f64>() {
                Ok(r) => Self::Real(r),
                Err(_) => Self::Text(s),
            },
            (t, Self::Integer(i)) if t.is_textual() => Self::Text(i.to_string()),
            (t, Self::Real(r)) if t.is_textual() => Self::Text(r.to_string()),
            (t, Self::Text(s)) if t.is_binary() => Self::Blob(s.into_bytes()),
            (SqlType::Date, Self::Text(s)) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                Ok(d) => Self::Date(d),
                Err(_) => Self::Text(s),
            },
            (SqlType::Timestamp, Self::Text(s)) => parse_timestamp(s.trim())
                .map_or(Self::Text(s), Self::Timestamp),
            (SqlType::Timestamp, Self::Integer(secs)) => chrono::DateTime::from_timestamp(secs, 0)
                .map_or(Self::Integer(secs), |dt| Self::Timestamp(dt.naive_utc())),
            (_, other) => other,
        }
    }

    /// Renders the value as a SQL literal, quoting text and blobs.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(b) => format!("x'{}'", hex::encode(b)),
            Self::Boolean(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
            Self::Date(d) => format!("'{}'", d.format(DATE_FORMAT)),
            Self::Timestamp(t) => format!("'{}'", t.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Blob(b) => write!(f, "\\x{}", hex::encode(b)),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}
