//! Type coercion for flag values
//!
//! Declared defaults are coerced leniently: a malformed default degrades to
//! the kind's zero value. Tokens taken from the command line go through the
//! strict parsers instead, so a bad value surfaces as a parse error.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Primitive kinds a flag can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Int,
    String,
}

impl FieldKind {
    /// Type hint shown in help output
    pub fn type_hint(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::String => "string",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_hint())
    }
}

/// A bound flag value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::Str(_) => FieldKind::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Zero value of a kind
pub fn zero(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Bool => Value::Bool(false),
        FieldKind::Int => Value::Int(0),
        FieldKind::String => Value::Str(String::new()),
    }
}

/// Coerce a declared default into a typed value. Never fails.
pub fn coerce(raw: &str, kind: FieldKind) -> Value {
    match kind {
        FieldKind::Bool => Value::Bool(raw == "true"),
        FieldKind::Int => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return zero(kind);
            }
            match trimmed.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(e) => {
                    warn!("Malformed integer default '{}' ({}), using 0", raw, e);
                    zero(kind)
                }
            }
        }
        FieldKind::String => Value::Str(raw.to_string()),
    }
}

/// Parse a boolean flag value given on the command line
pub fn parse_bool_token(token: &str) -> std::result::Result<bool, String> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean value '{token}'")),
    }
}

/// Parse an integer flag value given on the command line.
///
/// Accepts an optional sign and a radix prefix: `0x` (hex), `0o` or a bare
/// leading `0` (octal), `0b` (binary). `010` is therefore 8. Single `_`
/// separators may appear between digits or right after a prefix.
pub fn parse_int_token(token: &str) -> std::result::Result<i64, String> {
    let invalid = || format!("invalid integer value '{token}'");

    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, digits, prefixed) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..], true),
        Some("0o" | "0O") => (8, &body[2..], true),
        Some("0b" | "0B") => (2, &body[2..], true),
        Some(_) if body.starts_with('0') => (8, &body[1..], true),
        _ => (10, body, false),
    };

    if digits.is_empty()
        || digits.starts_with(['+', '-'])
        || digits.ends_with('_')
        || digits.contains("__")
        || (!prefixed && digits.starts_with('_'))
    {
        return Err(invalid());
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    // Parse with the sign attached so i64::MIN stays representable
    let signed = if negative {
        format!("-{cleaned}")
    } else {
        cleaned
    };

    i64::from_str_radix(&signed, radix).map_err(|_| invalid())
}
