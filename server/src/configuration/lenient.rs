//! Tolerant decoding for hand-edited `config.json` files.
//!
//! Operators write these documents by hand, so the decoder accepts a few
//! things strict JSON does not:
//!
//! - `//`, `#` and `/* */` comments outside string literals
//! - integers written as strings (`"mail_port": "587"`)
//! - numbers and booleans where a string is expected
//! - `null`, which counts as an absent field
//!
//! # Invariants
//!
//! - String literals pass through [`strip_comments`] byte for byte
//! - A value that is out of range for its field is still an error

use std::fmt;

use serde::{Deserialize, Deserializer, de::Error};

/// A JSON scalar as written in the document.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::Signed(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Remove comments outside string literals.
///
/// A block comment becomes a single space so that it still separates tokens.
/// An unterminated block comment runs to the end of the input.
#[must_use]
pub fn strip_comments(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut bytes = input.iter().copied().peekable();

    while let Some(byte) = bytes.next() {
        let next = bytes.peek().copied();
        match (byte, next) {
            (b'"', _) => {
                output.push(byte);
                while let Some(byte) = bytes.next() {
                    output.push(byte);
                    match byte {
                        b'\\' => {
                            if let Some(escaped) = bytes.next() {
                                output.push(escaped);
                            }
                        }
                        b'"' => break,
                        _ => {}
                    }
                }
            }
            (b'/', Some(b'/')) | (b'#', _) => {
                if bytes.by_ref().any(|byte| byte == b'\n') {
                    output.push(b'\n');
                }
            }
            (b'/', Some(b'*')) => {
                bytes.next();
                let mut previous = 0;
                for byte in bytes.by_ref() {
                    if previous == b'*' && byte == b'/' {
                        break;
                    }
                    previous = byte;
                }
                output.push(b' ');
            }
            _ => output.push(byte),
        }
    }

    output
}

/// A string field. Numbers and booleans are taken as their text.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        other => other.to_string(),
    }))
}

/// A non-negative integer field, written either as a number or as a string.
pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let Some(value) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let parsed = match &value {
        Scalar::Unsigned(n) => Some(*n),
        Scalar::Text(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| T::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            D::Error::custom(format!("invalid value {value}, expected an integer in range"))
        })
}
