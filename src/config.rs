use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use snafu::{ResultExt, Snafu};

use crate::{
    datetime::TimeZone,
    format::{self, Format, FormatError},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("Could not read config {}: {}", path.display(), source))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Invalid config {}: {}", path.display(), source))]
    ParseConfig { path: PathBuf, source: FormatError },
}

/// Settings for a [`Vm`](crate::Vm).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VmConfig {
    /// Time zone used when text without a zone is converted to a timestamp.
    #[serde(default)]
    pub timezone: TimeZone,

    /// Number of values the stack is pre-allocated for. The stack grows
    /// beyond this when needed.
    #[serde(default = "default_stack_capacity")]
    pub stack_capacity: usize,

    /// Whether a program must leave exactly one value on the stack. When
    /// disabled, the top value is the result and anything below it is left
    /// on the stack.
    #[serde(default = "default_strict_result")]
    pub strict_result: bool,
}

const fn default_stack_capacity() -> usize {
    16
}

const fn default_strict_result() -> bool {
    true
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            timezone: TimeZone::default(),
            stack_capacity: default_stack_capacity(),
            strict_result: default_strict_result(),
        }
    }
}

impl VmConfig {
    /// Loads a config file. The format is taken from the extension and
    /// defaults to TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::from_path(path).unwrap_or_default();
        let content = fs::read_to_string(path).context(ReadConfigSnafu { path })?;

        format::deserialize(&content, format).context(ParseConfigSnafu { path })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono_tz::Europe;
    use indoc::indoc;

    use super::*;

    #[test]
    fn defaults() {
        let config: VmConfig = toml::from_str("").unwrap();
        assert_eq!(config, VmConfig::default());
        assert_eq!(config.stack_capacity, 16);
        assert!(config.strict_result);
        assert_eq!(config.timezone, TimeZone::Local);
    }

    #[test]
    fn parse_all_fields() {
        let config: VmConfig = toml::from_str(indoc! {r#"
            timezone = "Europe/Paris"
            stack_capacity = 4
            strict_result = false
        "#})
        .unwrap();

        assert_eq!(
            config,
            VmConfig {
                timezone: TimeZone::Named(Europe::Paris),
                stack_capacity: 4,
                strict_result: false,
            }
        );
    }

    #[test]
    fn reject_unknown_fields_and_zones() {
        assert!(toml::from_str::<VmConfig>("stack_size = 4").is_err());
        assert!(toml::from_str::<VmConfig>(r#"timezone = "Nowhere/Special""#).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "strict_result = false").unwrap();

        let config = VmConfig::load(file.path()).unwrap();
        assert!(!config.strict_result);

        let err = VmConfig::load("/nonexistent/vm.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadConfig { .. }));
    }
}
