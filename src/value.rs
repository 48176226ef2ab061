mod kind;

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use ordered_float::NotNan;

pub use kind::Kind;

/// A single, immutable datum that can live on the VM stack.
///
/// There is no dedicated boolean variant: booleans are produced as
/// `Integer(1)` / `Integer(0)` and read back through numeric conversion.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Value {
    Bytes(Bytes),
    Integer(i64),
    Float(NotNan<f64>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Creates a float value, or `None` if `value` is NaN.
    pub fn from_f64(value: f64) -> Option<Self> {
        NotNan::new(value).ok().map(Value::Float)
    }

    pub const fn kind(&self) -> Kind {
        match self {
            Value::Bytes(_) => Kind::Bytes,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Timestamp(_) => Kind::Timestamp,
        }
    }

    pub const fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bytes(val) => write!(
                f,
                r#""{}""#,
                String::from_utf8_lossy(val)
                    .replace('\\', r"\\")
                    .replace('"', r#"\""#)
                    .replace('\n', r"\n")
            ),
            Value::Integer(val) => write!(f, "{val}"),
            Value::Float(val) => write!(f, "{val}"),
            Value::Timestamp(val) => {
                write!(f, "t'{}'", val.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<NotNan<f64>> for Value {
    fn from(v: NotNan<f64>) -> Self {
        Value::Float(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use chrono::DateTime;
    use indoc::indoc;
    use ordered_float::NotNan;

    use super::{Kind, Value};

    #[test]
    fn test_display_string() {
        assert_eq!(
            Value::Bytes(Bytes::from("Hello, world!")).to_string(),
            r#""Hello, world!""#
        );
    }

    #[test]
    fn test_display_string_with_quotes_and_backslashes() {
        assert_eq!(
            Value::from(r#"say "hi" \ bye"#).to_string(),
            r#""say \"hi\" \\ bye""#
        );
    }

    #[test]
    fn test_display_string_with_newlines() {
        assert_eq!(
            Value::from(indoc! {"
                Some
                lines
            "})
            .to_string(),
            r#""Some\nlines\n""#
        );
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Integer(-4712).to_string(), "-4712");
        assert_eq!(
            Value::Float(NotNan::new(123.45).unwrap()).to_string(),
            "123.45"
        );
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(
            Value::Timestamp(
                DateTime::parse_from_rfc3339("2000-10-10T20:55:36Z")
                    .unwrap()
                    .into()
            )
            .to_string(),
            "t'2000-10-10T20:55:36Z'"
        );
    }

    #[test]
    fn booleans_are_integers() {
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from(false), Value::Integer(0));
    }

    #[test]
    fn nan_is_not_a_value() {
        assert_eq!(Value::from_f64(f64::NAN), None);
        assert_eq!(Value::from_f64(0.5).map(|v| v.kind()), Some(Kind::Float));
    }
}
