//! # Reply values
//!
//! [ReplyValue] is the single representation of everything the server can send back, for both
//! RESP2 and RESP3. Values are created by the [reply parser](crate::network::ReplyParser) only
//! and consumed exactly once, either by the pending request they answer or by the pub/sub
//! classifier.
//!
//! Converting a value to the shape a caller expects goes through [FromReply]:
//! ```
//! use resp_pipeline::value::{FromReply, ReplyValue};
//!
//! let score = f64::from_reply(ReplyValue::bulk("-inf")).unwrap();
//! assert_eq!(f64::NEG_INFINITY, score);
//!
//! let missing: Option<i64> = FromReply::from_reply(ReplyValue::BulkString(None)).unwrap();
//! assert!(missing.is_none());
//! ```
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::Bytes;
use core::fmt::{Display, Formatter};

/// Any RESP2/RESP3 reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyValue {
    /// RESP2 null array/bulk or RESP3 `_`
    Nil,
    Integer(i64),
    /// RESP3 double, including infinities and NaN
    Double(f64),
    Boolean(bool),
    SimpleString(String),
    /// Binary safe string. `None` is the RESP2 null bulk string (`$-1`), which differs from an
    /// empty string.
    BulkString(Option<Bytes>),
    /// Error reply, split in error code (first token) and message
    Error { code: String, message: String },
    Array(Vec<ReplyValue>),
    /// RESP3 out-of-band push frame
    Push(Vec<ReplyValue>),
    /// RESP3 big number, kept as decimal text
    BigNumber(String),
    /// RESP3 map, in wire order
    Map(Vec<(ReplyValue, ReplyValue)>),
    /// RESP3 set, in wire order
    Set(Vec<ReplyValue>),
}

impl ReplyValue {
    /// Creates a bulk string value
    pub fn bulk<B: Into<Bytes>>(data: B) -> Self {
        ReplyValue::BulkString(Some(data.into()))
    }

    /// Creates a simple string value
    pub fn simple(data: &str) -> Self {
        ReplyValue::SimpleString(data.to_string())
    }

    /// Creates an error value from a raw error line, e.g. `WRONGTYPE Operation against a key`
    pub fn error(line: &str) -> Self {
        let (code, message) = match line.split_once(' ') {
            Some((code, message)) => (code, message),
            None => (line, ""),
        };

        ReplyValue::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// True for `Nil` and null bulk strings
    pub fn is_nil(&self) -> bool {
        matches!(self, ReplyValue::Nil | ReplyValue::BulkString(None))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReplyValue::Error { .. })
    }

    /// Returns true if the value is the simple string `expected`
    pub fn is_status(&self, expected: &str) -> bool {
        matches!(self, ReplyValue::SimpleString(status) if status == expected)
    }

    /// Returns the raw bytes of string like values
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ReplyValue::SimpleString(data) | ReplyValue::BigNumber(data) => Some(data.as_bytes()),
            ReplyValue::BulkString(Some(data)) => Some(data.as_ref()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ReplyValue::Integer(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the elements of `Array`, `Push` and `Set` values
    pub fn as_elements(&self) -> Option<&[ReplyValue]> {
        match self {
            ReplyValue::Array(elements) | ReplyValue::Push(elements) | ReplyValue::Set(elements) => {
                Some(elements)
            }
            _ => None,
        }
    }

    /// Name of the variant, used for type mismatch reporting
    pub fn kind(&self) -> &'static str {
        match self {
            ReplyValue::Nil => "nil",
            ReplyValue::Integer(_) => "integer",
            ReplyValue::Double(_) => "double",
            ReplyValue::Boolean(_) => "boolean",
            ReplyValue::SimpleString(_) => "simple string",
            ReplyValue::BulkString(None) => "nil bulk string",
            ReplyValue::BulkString(Some(_)) => "bulk string",
            ReplyValue::Error { .. } => "error",
            ReplyValue::Array(_) => "array",
            ReplyValue::Push(_) => "push",
            ReplyValue::BigNumber(_) => "big number",
            ReplyValue::Map(_) => "map",
            ReplyValue::Set(_) => "set",
        }
    }
}

/// Reply shape does not match the requested type
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("expected {expected}, received {found}")]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl TypeMismatch {
    pub fn new(expected: &'static str, value: &ReplyValue) -> Self {
        TypeMismatch {
            expected,
            found: value.kind(),
        }
    }
}

/// Conversion of a reply to a typed result
pub trait FromReply: Sized {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch>;
}

impl FromReply for ReplyValue {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        Ok(value)
    }
}

impl FromReply for () {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Error { .. } => Err(TypeMismatch::new("any non-error reply", &value)),
            _ => Ok(()),
        }
    }
}

impl FromReply for Bytes {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::BulkString(Some(data)) => Ok(data),
            ReplyValue::SimpleString(data) | ReplyValue::BigNumber(data) => Ok(Bytes::from(data)),
            ReplyValue::Integer(number) => Ok(Bytes::from(number.to_string())),
            _ => Err(TypeMismatch::new("string", &value)),
        }
    }
}

impl FromReply for String {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::SimpleString(data) | ReplyValue::BigNumber(data) => Ok(data),
            ReplyValue::BulkString(Some(ref data)) => match core::str::from_utf8(data) {
                Ok(text) => Ok(text.to_string()),
                Err(_) => Err(TypeMismatch::new("utf-8 string", &value)),
            },
            ReplyValue::Integer(number) => Ok(number.to_string()),
            _ => Err(TypeMismatch::new("string", &value)),
        }
    }
}

impl FromReply for i64 {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Integer(number) => Ok(number),
            ReplyValue::Boolean(flag) => Ok(flag as i64),
            _ => parse_text(&value).ok_or_else(|| TypeMismatch::new("integer", &value)),
        }
    }
}

impl FromReply for u64 {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        let mismatch = TypeMismatch::new("unsigned integer", &value);
        match value {
            ReplyValue::Integer(number) => u64::try_from(number).map_err(|_| mismatch),
            _ => parse_text(&value).ok_or(mismatch),
        }
    }
}

impl FromReply for usize {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        let mismatch = TypeMismatch::new("unsigned integer", &value);
        let number = u64::from_reply(value).map_err(|_| mismatch.clone())?;
        usize::try_from(number).map_err(|_| mismatch)
    }
}

impl FromReply for f64 {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Double(number) => Ok(number),
            ReplyValue::Integer(number) => Ok(number as f64),
            _ => value
                .as_bytes()
                .and_then(parse_float)
                .ok_or_else(|| TypeMismatch::new("float", &value)),
        }
    }
}

impl FromReply for bool {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Boolean(flag) => Ok(flag),
            ReplyValue::Integer(0) => Ok(false),
            ReplyValue::Integer(1) => Ok(true),
            ReplyValue::SimpleString(ref status) if status == "OK" => Ok(true),
            _ => Err(TypeMismatch::new("boolean", &value)),
        }
    }
}

impl<T: FromReply> FromReply for Option<T> {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        if value.is_nil() {
            return Ok(None);
        }

        Ok(Some(T::from_reply(value)?))
    }
}

impl<T: FromReply> FromReply for Vec<T> {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Array(elements) | ReplyValue::Set(elements) | ReplyValue::Push(elements) => {
                elements.into_iter().map(T::from_reply).collect()
            }
            ReplyValue::Nil => Ok(Vec::new()),
            _ => Err(TypeMismatch::new("array", &value)),
        }
    }
}

impl<K: FromReply + Ord, V: FromReply> FromReply for BTreeMap<K, V> {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Map(pairs) => pairs
                .into_iter()
                .map(|(key, value)| Ok((K::from_reply(key)?, V::from_reply(value)?)))
                .collect(),
            ReplyValue::Array(ref elements) if elements.len() % 2 != 0 => {
                Err(TypeMismatch::new("even number of elements", &value))
            }
            ReplyValue::Array(elements) => {
                let mut map = BTreeMap::new();
                let mut iterator = elements.into_iter();
                while let (Some(key), Some(value)) = (iterator.next(), iterator.next()) {
                    map.insert(K::from_reply(key)?, V::from_reply(value)?);
                }
                Ok(map)
            }
            _ => Err(TypeMismatch::new("map", &value)),
        }
    }
}

impl<A: FromReply, B: FromReply> FromReply for (A, B) {
    fn from_reply(value: ReplyValue) -> Result<Self, TypeMismatch> {
        match value {
            ReplyValue::Array(elements) if elements.len() == 2 => {
                let mut iterator = elements.into_iter();
                match (iterator.next(), iterator.next()) {
                    (Some(first), Some(second)) => Ok((A::from_reply(first)?, B::from_reply(second)?)),
                    _ => Err(TypeMismatch::new("pair", &ReplyValue::Nil)),
                }
            }
            _ => Err(TypeMismatch::new("pair", &value)),
        }
    }
}

/// Parses numeric-looking string replies
fn parse_text<T: core::str::FromStr>(value: &ReplyValue) -> Option<T> {
    let text = core::str::from_utf8(value.as_bytes()?).ok()?;
    text.parse().ok()
}

/// Parses floats including the textual infinities Redis uses for scores
pub(crate) fn parse_float(data: &[u8]) -> Option<f64> {
    match data {
        b"inf" | b"+inf" | b"infinity" | b"+infinity" => Some(f64::INFINITY),
        b"-inf" | b"-infinity" => Some(f64::NEG_INFINITY),
        b"nan" | b"-nan" => Some(f64::NAN),
        _ => core::str::from_utf8(data).ok()?.parse().ok(),
    }
}

impl Display for ReplyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ReplyValue::Nil | ReplyValue::BulkString(None) => write!(f, "(nil)"),
            ReplyValue::Integer(number) => write!(f, "(integer) {}", number),
            ReplyValue::Double(number) => write!(f, "(double) {}", number),
            ReplyValue::Boolean(flag) => write!(f, "({})", flag),
            ReplyValue::SimpleString(data) | ReplyValue::BigNumber(data) => write!(f, "{}", data),
            ReplyValue::BulkString(Some(data)) => write!(f, "\"{}\"", data.escape_ascii()),
            ReplyValue::Error { code, message } => write!(f, "(error) {} {}", code, message),
            ReplyValue::Array(elements) | ReplyValue::Push(elements) | ReplyValue::Set(elements) => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            ReplyValue::Map(pairs) => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
