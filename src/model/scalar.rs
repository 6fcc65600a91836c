//! Payloads of non-container values

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use super::symbol::SymbolToken;
use super::types::IonType;

/// Content of a non-null scalar value
///
/// Byte payloads are owned: constructors copy the caller's bytes rather
/// than aliasing them.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit signed)
    Int(i64),
    /// Binary floating point value
    Float(f64),
    /// Decimal value with arbitrary precision
    Decimal(Decimal),
    /// Timestamp with offset
    Timestamp(DateTime<FixedOffset>),
    /// Symbol value
    Symbol(SymbolToken),
    /// String value
    String(String),
    /// Character large object
    Clob(Vec<u8>),
    /// Binary large object
    Blob(Vec<u8>),
}

impl Scalar {
    /// Type of value this payload belongs to
    pub fn ion_type(&self) -> IonType {
        match self {
            Scalar::Bool(_) => IonType::Bool,
            Scalar::Int(_) => IonType::Int,
            Scalar::Float(_) => IonType::Float,
            Scalar::Decimal(_) => IonType::Decimal,
            Scalar::Timestamp(_) => IonType::Timestamp,
            Scalar::Symbol(_) => IonType::Symbol,
            Scalar::String(_) => IonType::String,
            Scalar::Clob(_) => IonType::Clob,
            Scalar::Blob(_) => IonType::Blob,
        }
    }

    /// Boolean content, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is an int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float content, if this is a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Decimal content, if this is a decimal
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Scalar::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Timestamp content, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Scalar::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Token of a symbol value
    pub fn as_symbol(&self) -> Option<&SymbolToken> {
        match self {
            Scalar::Symbol(token) => Some(token),
            _ => None,
        }
    }

    /// Bytes of a clob or blob
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Scalar::Clob(bytes) | Scalar::Blob(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub(crate) fn symbol_mut(&mut self) -> Option<&mut SymbolToken> {
        match self {
            Scalar::Symbol(token) => Some(token),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<Decimal> for Scalar {
    fn from(value: Decimal) -> Self {
        Scalar::Decimal(value)
    }
}

impl From<DateTime<FixedOffset>> for Scalar {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Scalar::Timestamp(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        assert_eq!(Scalar::from(true).ion_type(), IonType::Bool);
        assert_eq!(Scalar::from(42i64).ion_type(), IonType::Int);
        assert_eq!(Scalar::from("text").ion_type(), IonType::String);
        assert_eq!(Scalar::Blob(vec![1, 2]).ion_type(), IonType::Blob);
        assert_eq!(
            Scalar::Symbol(SymbolToken::from_text("a")).ion_type(),
            IonType::Symbol
        );
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Scalar::Int(7).as_int(), Some(7));
        assert_eq!(Scalar::Int(7).as_bool(), None);
        assert_eq!(Scalar::Clob(b"hi".to_vec()).as_bytes(), Some(&b"hi"[..]));
        assert_eq!(Scalar::from("x").as_str(), Some("x"));
    }
}
