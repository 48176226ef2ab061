//! Support for loading programs and configuration from multiple formats.

#![deny(missing_docs, missing_debug_implementations)]

use std::fmt;
use std::path::Path;

use serde::de;
use snafu::{ResultExt, Snafu};

/// The format a program or configuration file is written in.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Format {
    /// TOML format is used.
    #[default]
    Toml,
    /// JSON format is used.
    Json,
    /// YAML format is used.
    Yaml,
}

/// Failure to parse a document in a given [`Format`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    /// The TOML document was invalid.
    #[snafu(display("{}", source))]
    Toml {
        /// The underlying parser error.
        source: toml::de::Error,
    },
    /// The JSON document was invalid.
    #[snafu(display("{}", source))]
    Json {
        /// The underlying parser error.
        source: serde_json::Error,
    },
    /// The YAML document was invalid.
    #[snafu(display("{}", source))]
    Yaml {
        /// The underlying parser error.
        source: serde_yaml::Error,
    },
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Format::Toml => "toml",
            Format::Json => "json",
            Format::Yaml => "yaml",
        })
    }
}

impl Format {
    /// Picks the format from the file extension. Extensions are matched
    /// case-sensitively; anything else hands the path back.
    pub fn from_path<T: AsRef<Path>>(path: T) -> Result<Self, T> {
        let format = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            Some("yaml" | "yml") => Format::Yaml,
            _ => return Err(path),
        };
        Ok(format)
    }
}

/// Deserializes `content` written in `format`.
pub fn deserialize<T>(content: &str, format: Format) -> Result<T, FormatError>
where
    T: de::DeserializeOwned,
{
    match format {
        Format::Toml => toml::from_str(content).context(TomlSnafu),
        Format::Yaml => serde_yaml::from_str(content).context(YamlSnafu),
        Format::Json => serde_json::from_str(content).context(JsonSnafu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        let cases = [
            ("or.toml", Some(Format::Toml)),
            ("/programs/or.json", Some(Format::Json)),
            ("or.yaml", Some(Format::Yaml)),
            ("or.yml", Some(Format::Yaml)),
            ("or.json.toml", Some(Format::Toml)),
            ("or.toml.bak", None),
            ("OR.JSON", None),
            (".json", None),
            ("or", None),
            ("", None),
        ];

        for (path, expected) in cases {
            assert_eq!(Format::from_path(Path::new(path)).ok(), expected, "{path}");
        }
    }

    #[test]
    fn test_deserialize_errors() {
        let err = deserialize::<Vec<u8>>("[1, 2", Format::Json).unwrap_err();
        assert!(matches!(err, FormatError::Json { .. }));

        let err = deserialize::<std::collections::BTreeMap<String, u8>>("a = ", Format::Toml)
            .unwrap_err();
        assert!(matches!(err, FormatError::Toml { .. }));

        let err = deserialize::<Vec<u8>>("- [", Format::Yaml).unwrap_err();
        assert!(matches!(err, FormatError::Yaml { .. }));
    }

    #[test]
    fn display_matches_extension() {
        for format in [Format::Toml, Format::Json, Format::Yaml] {
            let path = format!("program.{format}");
            assert_eq!(Format::from_path(path.as_str()), Ok(format));
        }
    }
}
