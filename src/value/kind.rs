use std::fmt;

/// The type of a [`Value`](crate::Value), without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bytes,
    Integer,
    Float,
    Timestamp,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Bytes => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
