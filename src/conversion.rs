use std::num::ParseFloatError;

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone as _, Utc};
use snafu::{ResultExt, Snafu};

use crate::{
    datetime::{datetime_to_utc, TimeZone},
    value::{Kind, Value},
};

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConversionError {
    #[snafu(display("Invalid number {:?}: {}", s, source))]
    FloatParse { s: String, source: ParseFloatError },
    #[snafu(display("{:?} is not a finite number", s))]
    NotANumber { s: String },
    #[snafu(display("No matching timestamp format found for {:?}", s))]
    TimestampParse { s: String },
    #[snafu(display("Timestamp {} is out of range", seconds))]
    TimestampRange { seconds: i64 },
    #[snafu(display("Can't convert {} to {}", from, to))]
    Unsupported { from: Kind, to: Kind },
}

/// The primitive conversions the VM relies on when an operation needs a
/// value of a different kind than the one it was given.
///
/// A [`Vm`](crate::Vm) receives its converter at construction, so hosts can
/// plug in their own parsing rules. [`StandardConversion`] is the default.
pub trait Convert {
    /// Converts to `Value::Integer` or `Value::Float`.
    fn to_numeric(&self, value: &Value) -> Result<Value, ConversionError>;

    fn to_bytes(&self, value: &Value) -> Result<Bytes, ConversionError>;

    fn to_timestamp(&self, value: &Value) -> Result<DateTime<Utc>, ConversionError>;

    /// Zero is `false`, every other number is `true`. This means `"0"` is
    /// false while `"-4712"` is true.
    fn to_boolean(&self, value: &Value) -> Result<bool, ConversionError> {
        match self.to_numeric(value)? {
            Value::Integer(v) => Ok(v != 0),
            Value::Float(v) => Ok(v.into_inner() != 0.0),
            other => Err(ConversionError::Unsupported {
                from: other.kind(),
                to: Kind::Integer,
            }),
        }
    }
}

/// Converts between value kinds the same way Vector's field `types`
/// conversions do: numbers are parsed strictly, timestamps are guessed from
/// a fixed list of common formats.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardConversion {
    timezone: TimeZone,
}

impl StandardConversion {
    pub const fn new(timezone: TimeZone) -> Self {
        Self { timezone }
    }

    pub const fn timezone(&self) -> TimeZone {
        self.timezone
    }
}

impl Convert for StandardConversion {
    fn to_numeric(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Integer(_) | Value::Float(_) => Ok(value.clone()),
            Value::Bytes(bytes) => parse_number(&String::from_utf8_lossy(bytes)),
            Value::Timestamp(ts) => Ok(Value::Integer(ts.timestamp())),
        }
    }

    fn to_bytes(&self, value: &Value) -> Result<Bytes, ConversionError> {
        Ok(match value {
            Value::Bytes(bytes) => bytes.clone(),
            Value::Integer(v) => v.to_string().into(),
            Value::Float(v) => v.to_string().into(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true).into(),
        })
    }

    fn to_timestamp(&self, value: &Value) -> Result<DateTime<Utc>, ConversionError> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Integer(seconds) => from_unix_seconds(*seconds),
            Value::Bytes(bytes) => parse_timestamp(self.timezone, &String::from_utf8_lossy(bytes)),
            Value::Float(_) => Err(ConversionError::Unsupported {
                from: Kind::Float,
                to: Kind::Timestamp,
            }),
        }
    }
}

/// Parse a string as an integer, falling back to a finite float.
fn parse_number(s: &str) -> Result<Value, ConversionError> {
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Value::Integer(n));
    }

    let f = s.parse::<f64>().with_context(|_| FloatParseSnafu { s })?;
    if !f.is_finite() {
        return NotANumberSnafu { s }.fail();
    }

    Value::from_f64(f).ok_or_else(|| ConversionError::NotANumber { s: s.into() })
}

fn from_unix_seconds(seconds: i64) -> Result<DateTime<Utc>, ConversionError> {
    DateTime::from_timestamp(seconds, 0).ok_or(ConversionError::TimestampRange { seconds })
}

/// The list of allowed "automatic" timestamp formats with assumed local time zone
const TIMESTAMP_LOCAL_FORMATS: &[&str] = &[
    "%F %T",           // YYYY-MM-DD HH:MM:SS
    "%v %T",           // DD-Mmm-YYYY HH:MM:SS
    "%FT%T",           // ISO 8601 / RFC 3339 without TZ
    "%m/%d/%Y:%T",     // Apache common log
    "%a, %d %b %Y %T", // RFC 822/2822 without TZ
    "%a %d %b %T %Y",  // `date` command output without TZ
    "%A %d %B %T %Y",  // `date` command output without TZ, long names
    "%a %b %e %T %Y",  // ctime format
];

/// The list of allowed "automatic" timestamp formats for UTC
const TIMESTAMP_UTC_FORMATS: &[&str] = &[
    "%FT%TZ", // ISO 8601 / RFC 3339 UTC
];

/// The list of allowed "automatic" timestamp formats with time zones
const TIMESTAMP_TZ_FORMATS: &[&str] = &[
    "%a %d %b %T %z %Y",  // `date` command output, numeric TZ
    "%a %d %b %T %#z %Y", // `date` command output, numeric TZ
];

/// Parse a string into a timestamp using one of a set of formats
fn parse_timestamp(tz: TimeZone, s: &str) -> Result<DateTime<Utc>, ConversionError> {
    for format in TIMESTAMP_LOCAL_FORMATS {
        if let Some(result) = tz.datetime_from_str(s, format) {
            return Ok(result);
        }
    }
    // UNIX timestamp
    if let Ok(seconds) = s.parse::<i64>() {
        return from_unix_seconds(seconds);
    }
    for format in TIMESTAMP_UTC_FORMATS {
        if let Ok(result) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&result));
        }
    }
    if let Ok(result) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime_to_utc(result));
    }
    if let Ok(result) = DateTime::parse_from_rfc2822(s) {
        return Ok(datetime_to_utc(result));
    }
    for format in TIMESTAMP_TZ_FORMATS {
        if let Ok(result) = DateTime::parse_from_str(s, format) {
            return Ok(datetime_to_utc(result));
        }
    }
    TimestampParseSnafu { s }.fail()
}
