//! Structured readers that supply module parameters.
//!
//! A [`Reader`] resolves a dot-separated section path (`"Action.parameters"`)
//! inside a structured document and deserializes it into any
//! [`DeserializeOwned`] type. The backing format is irrelevant to the rest
//! of the crate: [`JsonReader`] and [`TomlReader`] are interchangeable.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::{ConfigurationError, ConfigurationResult};

/// Capability to deserialize typed values from named sections of an input.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{JsonReader, Reader};
///
/// let reader = JsonReader::parse(r#"{"parameters": {"beta": 6.0}}"#).unwrap();
/// let beta: f64 = reader.read("parameters.beta").unwrap();
/// assert_eq!(beta, 6.0);
/// ```
pub trait Reader: Send + Sync {
    /// Short name of the backing format, used in diagnostics.
    fn format(&self) -> &str;

    /// Deserialize the value stored under `section`.
    ///
    /// An empty section name addresses the root of the reader.
    fn read<T: DeserializeOwned>(&self, section: &str) -> ConfigurationResult<T>;

    /// Check whether `section` exists.
    fn has_section(&self, section: &str) -> bool;

    /// Create a reader rooted at `section`.
    fn scoped(&self, section: &str) -> ConfigurationResult<Self>
    where
        Self: Sized;
}

/// Join two section paths with the `.` separator.
pub fn join_section(base: &str, section: &str) -> String {
    match (base.is_empty(), section.is_empty()) {
        (true, _) => section.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}.{section}"),
    }
}

fn path_segments(section: &str) -> impl Iterator<Item = &str> {
    section.split('.').filter(|s| !s.is_empty())
}

/// Reader backed by a JSON document.
#[derive(Debug, Clone)]
pub struct JsonReader {
    root: serde_json::Value,
    base: String,
}

impl JsonReader {
    /// Parse a JSON document.
    pub fn parse(input: &str) -> ConfigurationResult<Self> {
        let root = serde_json::from_str(input).map_err(|e| ConfigurationError::Parse {
            format: "json".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_value(root))
    }

    /// Wrap an already parsed JSON value.
    pub fn from_value(root: serde_json::Value) -> Self {
        Self {
            root,
            base: String::new(),
        }
    }

    /// Load and parse a JSON file.
    pub fn from_file(path: &Path) -> ConfigurationResult<Self> {
        let input = fs::read_to_string(path)?;
        Self::parse(&input)
    }

    fn lookup(&self, section: &str) -> Option<&serde_json::Value> {
        path_segments(section).try_fold(&self.root, |value, key| value.get(key))
    }
}

impl FromStr for JsonReader {
    type Err = ConfigurationError;

    fn from_str(input: &str) -> ConfigurationResult<Self> {
        Self::parse(input)
    }
}

impl Reader for JsonReader {
    fn format(&self) -> &str {
        "json"
    }

    fn read<T: DeserializeOwned>(&self, section: &str) -> ConfigurationResult<T> {
        let full = join_section(&self.base, section);
        let value = self
            .lookup(section)
            .ok_or_else(|| ConfigurationError::MissingSection(full.clone()))?;
        T::deserialize(value).map_err(|e| ConfigurationError::Malformed {
            section: full,
            message: e.to_string(),
        })
    }

    fn has_section(&self, section: &str) -> bool {
        self.lookup(section).is_some()
    }

    fn scoped(&self, section: &str) -> ConfigurationResult<Self> {
        let full = join_section(&self.base, section);
        let value = self
            .lookup(section)
            .ok_or_else(|| ConfigurationError::MissingSection(full.clone()))?;
        Ok(Self {
            root: value.clone(),
            base: full,
        })
    }
}

/// Reader backed by a TOML document.
#[derive(Debug, Clone)]
pub struct TomlReader {
    root: toml::Value,
    base: String,
}

impl TomlReader {
    /// Parse a TOML document.
    pub fn parse(input: &str) -> ConfigurationResult<Self> {
        let root = input
            .parse::<toml::Table>()
            .map_err(|e| ConfigurationError::Parse {
                format: "toml".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::from_value(toml::Value::Table(root)))
    }

    /// Wrap an already parsed TOML value.
    pub fn from_value(root: toml::Value) -> Self {
        Self {
            root,
            base: String::new(),
        }
    }

    /// Load and parse a TOML file.
    pub fn from_file(path: &Path) -> ConfigurationResult<Self> {
        let input = fs::read_to_string(path)?;
        Self::parse(&input)
    }

    fn lookup(&self, section: &str) -> Option<&toml::Value> {
        path_segments(section).try_fold(&self.root, |value, key| value.get(key))
    }
}

impl FromStr for TomlReader {
    type Err = ConfigurationError;

    fn from_str(input: &str) -> ConfigurationResult<Self> {
        Self::parse(input)
    }
}

impl Reader for TomlReader {
    fn format(&self) -> &str {
        "toml"
    }

    fn read<T: DeserializeOwned>(&self, section: &str) -> ConfigurationResult<T> {
        let full = join_section(&self.base, section);
        let value = self
            .lookup(section)
            .ok_or_else(|| ConfigurationError::MissingSection(full.clone()))?;
        value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigurationError::Malformed {
                section: full,
                message: e.to_string(),
            })
    }

    fn has_section(&self, section: &str) -> bool {
        self.lookup(section).is_some()
    }

    fn scoped(&self, section: &str) -> ConfigurationResult<Self> {
        let full = join_section(&self.base, section);
        let value = self
            .lookup(section)
            .ok_or_else(|| ConfigurationError::MissingSection(full.clone()))?;
        Ok(Self {
            root: value.clone(),
            base: full,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Gauge {
        beta: f64,
    }

    #[test]
    fn test_join_section() {
        assert_eq!(join_section("", "parameters"), "parameters");
        assert_eq!(join_section("Action", ""), "Action");
        assert_eq!(join_section("Action", "parameters"), "Action.parameters");
    }

    #[test]
    fn test_json_read_nested_section() {
        let reader =
            JsonReader::parse(r#"{"Action": {"parameters": {"beta": 5.6}}}"#).unwrap();

        let gauge: Gauge = reader.read("Action.parameters").unwrap();
        assert_eq!(gauge, Gauge { beta: 5.6 });
        assert!(reader.has_section("Action"));
        assert!(!reader.has_section("Observables"));
    }

    #[test]
    fn test_json_missing_and_malformed() {
        let reader = JsonReader::parse(r#"{"parameters": {"beta": "hot"}}"#).unwrap();

        let missing = reader.read::<Gauge>("other").unwrap_err();
        assert_eq!(missing, ConfigurationError::MissingSection("other".into()));

        let malformed = reader.read::<Gauge>("parameters").unwrap_err();
        assert!(matches!(malformed, ConfigurationError::Malformed { ref section, .. } if section == "parameters"));
    }

    #[test]
    fn test_json_parse_error() {
        let err = JsonReader::parse("{not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { ref format, .. } if format == "json"));
    }

    #[test]
    fn test_scoped_reader_reports_full_path() {
        let reader = JsonReader::parse(r#"{"Action": {"name": "Wilson"}}"#).unwrap();
        let scoped = reader.scoped("Action").unwrap();

        let name: String = scoped.read("name").unwrap();
        assert_eq!(name, "Wilson");

        let err = scoped.read::<Gauge>("parameters").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingSection("Action.parameters".into())
        );
    }

    #[test]
    fn test_toml_reader() {
        let reader = TomlReader::parse(
            r#"
            [Action]
            name = "Wilson"

            [Action.parameters]
            beta = 6.0
            "#,
        )
        .unwrap();

        assert_eq!(reader.format(), "toml");
        let gauge: Gauge = reader.read("Action.parameters").unwrap();
        assert_eq!(gauge.beta, 6.0);

        let scoped = reader.scoped("Action").unwrap();
        assert_eq!(scoped.read::<String>("name").unwrap(), "Wilson");
    }

    #[test]
    fn test_readers_implement_from_str() {
        let json: JsonReader = r#"{"parameters": {"beta": 5.9}}"#.parse().unwrap();
        assert_eq!(json.read::<Gauge>("parameters").unwrap().beta, 5.9);

        let toml: TomlReader = "[parameters]\nbeta = 5.9\n".parse().unwrap();
        assert_eq!(toml.read::<Gauge>("parameters").unwrap().beta, 5.9);

        let err = "= broken".parse::<TomlReader>().unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { ref format, .. } if format == "toml"));
    }

    #[test]
    fn test_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"parameters": {{"beta": 6.2}}}}"#).unwrap();

        let reader = JsonReader::from_file(file.path()).unwrap();
        let gauge: Gauge = reader.read("parameters").unwrap();
        assert_eq!(gauge.beta, 6.2);
    }

    #[test]
    fn test_from_missing_file() {
        let err = TomlReader::from_file(Path::new("/nonexistent/hmc.toml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Io(_)));
    }
}
