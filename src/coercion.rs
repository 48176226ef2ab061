//! Operand coercion for binary operators.
//!
//! The value model has no static types, so a binary operator first has to
//! pick the kind its operation runs in. The rules are:
//!
//! | lhs       | rhs       | domain                                              |
//! |-----------|-----------|-----------------------------------------------------|
//! | string    | string    | string                                              |
//! | string    | number    | number if the string converts to a number, else string |
//! | timestamp | string    | timestamp if the string converts to a timestamp, else string |
//! | number    | number    | number                                              |
//! | timestamp | number    | string                                              |
//! | timestamp | timestamp | timestamp                                           |
//!
//! The table is symmetric: swapping the operands selects the same domain.
//! `timestamp` and `number` fall back to `string`; that is conservative, not
//! necessarily the most useful choice.
//!
//! Logical operators then reduce each operand to a boolean through
//! [`truthiness`].

use std::fmt;

use snafu::ResultExt;

use crate::{
    conversion::{ConversionError, Convert},
    error::{Error, TypeConversionSnafu},
    value::{Kind, Value},
};

/// The kind of value a binary operation is performed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    Bytes,
    Numeric,
    Timestamp,
}

impl Domain {
    /// Converts `value` into this domain.
    pub fn coerce<C>(self, converter: &C, value: &Value) -> Result<Value, ConversionError>
    where
        C: Convert + ?Sized,
    {
        match self {
            Domain::Bytes => converter.to_bytes(value).map(Value::Bytes),
            Domain::Numeric => converter.to_numeric(value),
            Domain::Timestamp => converter.to_timestamp(value).map(Value::Timestamp),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Domain::Bytes => "string",
            Domain::Numeric => "number",
            Domain::Timestamp => "timestamp",
        })
    }
}

/// Selects the domain a binary operation on `lhs` and `rhs` runs in.
pub fn domain<C>(converter: &C, lhs: &Value, rhs: &Value) -> Domain
where
    C: Convert + ?Sized,
{
    use Kind::*;

    match (lhs.kind(), rhs.kind()) {
        (Bytes, Bytes) => Domain::Bytes,
        (Bytes, Integer | Float) => numeric_or_bytes(converter, lhs),
        (Integer | Float, Bytes) => numeric_or_bytes(converter, rhs),
        (Timestamp, Bytes) => timestamp_or_bytes(converter, rhs),
        (Bytes, Timestamp) => timestamp_or_bytes(converter, lhs),
        (Integer | Float, Integer | Float) => Domain::Numeric,
        (Timestamp, Integer | Float) | (Integer | Float, Timestamp) => Domain::Bytes,
        (Timestamp, Timestamp) => Domain::Timestamp,
    }
}

fn numeric_or_bytes<C: Convert + ?Sized>(converter: &C, text: &Value) -> Domain {
    if converter.to_numeric(text).is_ok() {
        Domain::Numeric
    } else {
        Domain::Bytes
    }
}

fn timestamp_or_bytes<C: Convert + ?Sized>(converter: &C, text: &Value) -> Domain {
    if converter.to_timestamp(text).is_ok() {
        Domain::Timestamp
    } else {
        Domain::Bytes
    }
}

/// The boolean interpretation of `value` for the logical operator
/// `operation`.
///
/// Timestamps have no truthiness; using one as a boolean is an error rather
/// than a silent `true` or `false`.
pub fn truthiness<C>(converter: &C, value: &Value, operation: &'static str) -> Result<bool, Error>
where
    C: Convert + ?Sized,
{
    if value.is_timestamp() {
        return Err(Error::UnsupportedOperation {
            operation,
            kind: value.kind(),
        });
    }

    converter.to_boolean(value).context(TypeConversionSnafu)
}
