use serde::{Deserialize, Serialize};

/// Fixed set of SQL types a column can be declared with.
///
/// Discriminants follow the JDBC numeric type codes, which is what the
/// driver layer reports for every column it enumerates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SqlType {
    // Numeric types
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Boolean,
    // String types
    Char,
    Varchar,
    LongVarchar,
    Clob,
    // Date/Time types
    Date,
    Time,
    Timestamp,
    // Binary types
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    // Special types
    Null,
    Other,
}

impl SqlType {
    /// Resolves a driver type code. Unknown codes have no counterpart.
    #[must_use]
    pub const fn from_type_code(code: i32) -> Option<Self> {
        let sql_type = match code {
            -7 => Self::Bit,
            -6 => Self::TinyInt,
            5 => Self::SmallInt,
            4 => Self::Integer,
            -5 => Self::BigInt,
            6 => Self::Float,
            7 => Self::Real,
            8 => Self::Double,
            2 => Self::Numeric,
            3 => Self::Decimal,
            16 => Self::Boolean,
            1 => Self::Char,
            12 => Self::Varchar,
            -1 => Self::LongVarchar,
            2005 => Self::Clob,
            91 => Self::Date,
            92 => Self::Time,
            93 => Self::Timestamp,
            -2 => Self::Binary,
            -3 => Self::VarBinary,
            -4 => Self::LongVarBinary,
            2004 => Self::Blob,
            0 => Self::Null,
            1111 => Self::Other,
            _ => return None,
        };
        Some(sql_type)
    }

    #[must_use]
    pub const fn type_code(self) -> i32 {
        match self {
            Self::Bit => -7,
            Self::TinyInt => -6,
            Self::SmallInt => 5,
            Self::Integer => 4,
            Self::BigInt => -5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Boolean => 16,
            Self::Char => 1,
            Self::Varchar => 12,
            Self::LongVarchar => -1,
            Self::Clob => 2005,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::Binary => -2,
            Self::VarBinary => -3,
            Self::LongVarBinary => -4,
            Self::Blob => 2004,
            Self::Null => 0,
            Self::Other => 1111,
        }
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt)
    }

    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Real | Self::Double)
    }

    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Char | Self::Varchar | Self::LongVarchar | Self::Clob)
    }

    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::VarBinary | Self::LongVarBinary | Self::Blob
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bit => "BIT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Boolean => "BOOLEAN",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Null => "NULL",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
