//! Error types for module configuration, registration and initialization.

use thiserror::Error;

/// Root error type for module framework operations.
#[derive(Error, Debug)]
pub enum HmcError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Registry-related errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Module initialization errors
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),
}

/// Errors raised while reading or validating module parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The requested section does not exist in the input
    #[error("Missing configuration section: {0}")]
    MissingSection(String),

    /// The section exists but does not match the expected structure
    #[error("Malformed section '{section}': {message}")]
    Malformed { section: String, message: String },

    /// The section deserialized but failed parameter validation
    #[error("Invalid parameters in '{section}': {message}")]
    Invalid { section: String, message: String },

    /// The whole document could not be parsed
    #[error("Failed to parse {format} input: {message}")]
    Parse { format: String, message: String },

    /// IO error while loading the input
    #[error("IO error: {0}")]
    Io(String),
}

/// Errors that can occur in registry operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No builder registered under this key
    #[error("Unknown {category} module: {key}")]
    UnknownModule { category: String, key: String },

    /// A builder is already registered under this key
    #[error("Module already registered in {category} registry: {key}")]
    DuplicateRegistration { category: String, key: String },

    /// Invalid module key
    #[error("Invalid module name: {0:?}")]
    InvalidName(String),

    /// The builder failed to read its configuration
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Errors raised by a module adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// The build step failed; the adapter stays unusable
    #[error("Module initialization failed for {module}: {message}")]
    Initialization { module: String, message: String },

    /// Parameters cannot change once the product exists
    #[error("Module {module} is already built")]
    AlreadyBuilt { module: String },
}

impl ModuleError {
    /// Shorthand for an initialization failure.
    pub fn initialization(module: impl Into<String>, message: impl Into<String>) -> Self {
        ModuleError::Initialization {
            module: module.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigurationError {
    fn from(err: std::io::Error) -> Self {
        ConfigurationError::Io(err.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type alias for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Result type alias for general framework operations.
pub type HmcResult<T> = Result<T, HmcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_wraps_configuration() {
        let err: RegistryError = ConfigurationError::MissingSection("parameters".into()).into();
        assert!(matches!(err, RegistryError::Configuration(_)));
        assert_eq!(err.to_string(), "Missing configuration section: parameters");
    }

    #[test]
    fn test_root_error_conversions() {
        let err: HmcError = ModuleError::initialization("Wilson", "beta must be positive").into();
        let msg = err.to_string();
        assert!(msg.contains("Wilson"));
        assert!(msg.contains("beta must be positive"));

        let err: HmcError = RegistryError::InvalidName(String::new()).into();
        assert!(matches!(err, HmcError::Registry(_)));
    }
}
