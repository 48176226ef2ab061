use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone as _, Utc};
use chrono_tz::Tz;
use serde::{de, Deserialize, Deserializer};

/// The time zone used to interpret timestamps that carry no zone of their
/// own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeZone {
    #[default]
    Local,
    Named(Tz),
}

impl TimeZone {
    /// Parses `"local"` (or an empty string) as the system time zone and
    /// anything else as an IANA time zone name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "local" => Some(Self::Local),
            _ => s.parse::<Tz>().ok().map(Self::Named),
        }
    }

    /// Parses `s` with `format` as a local date time in this zone.
    ///
    /// Ambiguous or non-existent local times (DST transitions) don't parse.
    pub(crate) fn datetime_from_str(&self, s: &str, format: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(s, format).ok()?;
        match self {
            Self::Local => chrono::Local
                .from_local_datetime(&naive)
                .single()
                .map(datetime_to_utc),
            Self::Named(tz) => tz
                .from_local_datetime(&naive)
                .single()
                .map(datetime_to_utc),
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl<'de> Deserialize<'de> for TimeZone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| de::Error::custom(format!("unknown time zone {s:?}")))
    }
}

/// Convert a timestamp with a non-UTC time zone into UTC.
pub(crate) fn datetime_to_utc<TZ: chrono::TimeZone>(ts: DateTime<TZ>) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use chrono_tz::Australia;

    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(TimeZone::parse("local"), Some(TimeZone::Local));
        assert_eq!(TimeZone::parse(""), Some(TimeZone::Local));
        assert_eq!(
            TimeZone::parse("Australia/Brisbane"),
            Some(TimeZone::Named(Australia::Brisbane))
        );
        assert_eq!(TimeZone::parse("Mars/Olympus_Mons"), None);
    }

    #[test]
    fn named_zone_is_applied() {
        let tz = TimeZone::Named(Australia::Brisbane);
        let parsed = tz.datetime_from_str("2001-02-03 14:05:06", "%F %T");
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap())
        );
    }

    #[test]
    fn display_round_trips() {
        for name in ["local", "UTC", "Europe/Berlin"] {
            assert_eq!(TimeZone::parse(name).unwrap().to_string(), name);
        }
    }
}
