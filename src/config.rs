//! Module parameters and the configuration block that holds them.
//!
//! Every module carries exactly one parameter value. Parameter types
//! implement [`Parameters`]; modules that need no configuration use
//! [`NoParameters`], whose operations are all no-ops.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ConfigurationResult};
use crate::reader::Reader;

/// Section a module reads its parameters from unless told otherwise.
pub const DEFAULT_SECTION: &str = "parameters";

/// Capability shared by all module parameter types.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{JsonReader, Parameters};
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, Deserialize)]
/// struct HeatbathParameters {
///     sweeps: u32,
/// }
///
/// impl Parameters for HeatbathParameters {
///     fn validate(&self) -> Result<(), String> {
///         if self.sweeps == 0 {
///             Err("sweeps must be greater than 0".to_string())
///         } else {
///             Ok(())
///         }
///     }
/// }
///
/// let reader = JsonReader::parse(r#"{"parameters": {"sweeps": 4}}"#).unwrap();
/// let params = HeatbathParameters::from_reader(&reader, "parameters").unwrap();
/// assert_eq!(params.sweeps, 4);
/// ```
pub trait Parameters: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Deserialize and validate the parameters stored under `section`.
    fn from_reader<R: Reader>(reader: &R, section: &str) -> ConfigurationResult<Self> {
        let parameters: Self = reader.read(section)?;
        parameters
            .validate()
            .map_err(|message| ConfigurationError::Invalid {
                section: section.to_string(),
                message,
            })?;
        Ok(parameters)
    }

    /// Validates the parameters.
    ///
    /// Returns Ok(()) if valid, or an error message describing the issue.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Diagnostic rendering of the parameters.
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

/// Parameters for modules that need no configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoParameters;

impl Parameters for NoParameters {
    fn from_reader<R: Reader>(_reader: &R, _section: &str) -> ConfigurationResult<Self> {
        Ok(NoParameters)
    }

    fn describe(&self) -> String {
        String::new()
    }
}

/// Holds the parameter value of one module.
///
/// The value is only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationBlock<P: Parameters> {
    parameters: P,
    section: String,
}

impl<P: Parameters> ConfigurationBlock<P> {
    /// Create a block from a parameter value.
    pub fn new(parameters: P) -> Self {
        Self {
            parameters,
            section: DEFAULT_SECTION.to_string(),
        }
    }

    /// Read the block from the default `parameters` section.
    pub fn from_reader<R: Reader>(reader: &R) -> ConfigurationResult<Self> {
        Self::from_section(reader, DEFAULT_SECTION)
    }

    /// Read the block from a named section.
    pub fn from_section<R: Reader>(reader: &R, section: &str) -> ConfigurationResult<Self> {
        let parameters = P::from_reader(reader, section)?;
        Ok(Self {
            parameters,
            section: section.to_string(),
        })
    }

    /// Replace the stored parameters, returning the previous value.
    pub fn replace(&mut self, parameters: P) -> P {
        std::mem::replace(&mut self.parameters, parameters)
    }

    /// The stored parameters.
    pub fn parameters(&self) -> &P {
        &self.parameters
    }

    /// Section the parameters were read from.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Diagnostic rendering of the stored parameters.
    pub fn describe(&self) -> String {
        self.parameters.describe()
    }
}

impl<P: Parameters> fmt::Display for ConfigurationBlock<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::JsonReader;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct GaugeParameters {
        beta: f64,
    }

    impl Parameters for GaugeParameters {}

    #[derive(Debug, Clone, Deserialize)]
    struct WorkerParameters {
        max_workers: u32,
    }

    impl Parameters for WorkerParameters {
        fn validate(&self) -> Result<(), String> {
            if self.max_workers == 0 {
                Err("max_workers must be greater than 0".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_block_from_value() {
        let block = ConfigurationBlock::new(GaugeParameters { beta: 6.0 });
        assert_eq!(block.parameters().beta, 6.0);
        assert_eq!(block.section(), DEFAULT_SECTION);
        assert_eq!(block.describe(), "GaugeParameters { beta: 6.0 }");
        assert_eq!(block.to_string(), block.describe());
    }

    #[test]
    fn test_block_from_reader() {
        let reader = JsonReader::parse(r#"{"parameters": {"beta": 5.8}}"#).unwrap();
        let block = ConfigurationBlock::<GaugeParameters>::from_reader(&reader).unwrap();
        assert_eq!(block.parameters(), &GaugeParameters { beta: 5.8 });
    }

    #[test]
    fn test_block_from_named_section() {
        let reader = JsonReader::parse(r#"{"gauge": {"beta": 5.8}}"#).unwrap();
        let block =
            ConfigurationBlock::<GaugeParameters>::from_section(&reader, "gauge").unwrap();
        assert_eq!(block.section(), "gauge");
    }

    #[test]
    fn test_block_missing_field() {
        let reader = JsonReader::parse(r#"{"parameters": {"mass": 0.1}}"#).unwrap();
        let err = ConfigurationBlock::<GaugeParameters>::from_reader(&reader).unwrap_err();
        assert!(matches!(err, ConfigurationError::Malformed { .. }));
    }

    #[test]
    fn test_block_validation() {
        let reader = JsonReader::parse(r#"{"parameters": {"max_workers": 0}}"#).unwrap();
        let err = ConfigurationBlock::<WorkerParameters>::from_reader(&reader).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::Invalid {
                section: "parameters".into(),
                message: "max_workers must be greater than 0".into(),
            }
        );
    }

    #[test]
    fn test_block_replace() {
        let mut block = ConfigurationBlock::new(GaugeParameters { beta: 6.0 });
        let previous = block.replace(GaugeParameters { beta: 5.7 });
        assert_eq!(previous.beta, 6.0);
        assert_eq!(block.parameters().beta, 5.7);
    }

    #[test]
    fn test_no_parameters_ignores_reader() {
        let reader = JsonReader::parse("{}").unwrap();
        let mut block = ConfigurationBlock::<NoParameters>::from_reader(&reader).unwrap();
        assert_eq!(block.describe(), "");
        assert_eq!(block.replace(NoParameters), NoParameters);
    }
}
