//! The closed set of parameter kinds and their token parsing rules.

use std::fmt;
use std::str::FromStr;

use crate::error::{UnknownKindError, ValueError};
use crate::value::Value;

/// A parameter's value type.
///
/// Each kind has one canonical Rust storage type (see [`Kind::type_name`]),
/// which is the type a handler must accept in that parameter's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    String,
    Float64,
    Duration,
    /// Parsing and rendering are delegated to a [`crate::CustomValue`].
    Custom,
}

impl Kind {
    pub const ALL: [Kind; 9] = [
        Kind::Bool,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint32,
        Kind::Uint64,
        Kind::String,
        Kind::Float64,
        Kind::Duration,
        Kind::Custom,
    ];

    /// The label used in configuration files and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::String => "string",
            Kind::Float64 => "float64",
            Kind::Duration => "duration",
            Kind::Custom => "value",
        }
    }

    /// The canonical storage type, spelled the way handler signatures show it.
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int32 => "i32",
            Kind::Int64 => "i64",
            Kind::Uint32 => "u32",
            Kind::Uint64 => "u64",
            Kind::String => "String",
            Kind::Float64 => "f64",
            Kind::Duration => "Duration",
            Kind::Custom => "Box<dyn CustomValue>",
        }
    }

    /// Value placeholder shown after a flag in usage text.
    ///
    /// Empty for bool flags, which take no value.
    pub fn placeholder(self) -> &'static str {
        match self {
            Kind::Bool => "",
            Kind::Int32 | Kind::Int64 => "int",
            Kind::Uint32 | Kind::Uint64 => "uint",
            Kind::String => "string",
            Kind::Float64 => "float",
            Kind::Duration => "duration",
            Kind::Custom => "value",
        }
    }

    /// The zero value of the kind. Custom kinds have none.
    pub fn zero(self) -> Option<Value> {
        Some(match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int32 => Value::Int32(0),
            Kind::Int64 => Value::Int64(0),
            Kind::Uint32 => Value::Uint32(0),
            Kind::Uint64 => Value::Uint64(0),
            Kind::String => Value::String(String::new()),
            Kind::Float64 => Value::Float64(0.0),
            Kind::Duration => Value::Duration(std::time::Duration::ZERO),
            Kind::Custom => return None,
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Kind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Kind::Bool),
            "int32" | "int" => Ok(Kind::Int32),
            "int64" => Ok(Kind::Int64),
            "uint32" | "uint" => Ok(Kind::Uint32),
            "uint64" => Ok(Kind::Uint64),
            "string" => Ok(Kind::String),
            "float64" | "float" => Ok(Kind::Float64),
            "duration" => Ok(Kind::Duration),
            "value" | "custom" => Ok(Kind::Custom),
            other => Err(UnknownKindError(other.to_string())),
        }
    }
}

// =============================================================================
// Token parsing
// =============================================================================

pub(crate) fn parse_bool(token: &str) -> Result<bool, ValueError> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::Bool(token.to_string())),
    }
}

/// Splits an integer token into digits `from_str_radix` accepts and a radix.
fn split_radix(token: &str) -> (String, u32) {
    let (sign, rest) = match token.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.strip_prefix('+').unwrap_or(token)),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        Some("0o" | "0O") => (8, &rest[2..]),
        Some("0b" | "0B") => (2, &rest[2..]),
        _ => (10, rest),
    };
    // A second sign, or one after the radix prefix, is left for the parser
    // to reject.
    if digits.starts_with(['+', '-']) {
        return (token.to_string(), 10);
    }
    // Separators only count between digits; anything else is left for the
    // parser to reject.
    let digits = if !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__")
    {
        digits.replace('_', "")
    } else {
        digits.to_string()
    };
    (format!("{sign}{digits}"), radix)
}

macro_rules! int_parser {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $name(token: &str) -> Result<$ty, ValueError> {
                let (digits, radix) = split_radix(token);
                <$ty>::from_str_radix(&digits, radix).map_err(|source| ValueError::Int {
                    token: token.to_string(),
                    source,
                })
            }
        )*
    };
}

int_parser! {
    parse_i32 => i32,
    parse_i64 => i64,
    parse_u32 => u32,
    parse_u64 => u64,
}

pub(crate) fn parse_f64(token: &str) -> Result<f64, ValueError> {
    token.parse().map_err(|source| ValueError::Float {
        token: token.to_string(),
        source,
    })
}

pub(crate) fn parse_duration(token: &str) -> Result<std::time::Duration, ValueError> {
    crate::duration::parse(token).map_err(|reason| ValueError::Duration {
        token: token.to_string(),
        reason,
    })
}
