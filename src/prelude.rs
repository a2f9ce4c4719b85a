//! Prelude module for convenient imports.
//!
//! ```rust
//! use hmc_modules::prelude::*;
//! ```

// Configuration
pub use crate::config::{ConfigurationBlock, NoParameters, Parameters};
pub use crate::reader::{JsonReader, Reader, TomlReader};

// Modules
pub use crate::module::{BuildStep, FromReader, Module, ModuleAdapter, ModuleExt, ModuleState};

// Registration
pub use crate::catalog::ModuleCatalog;
pub use crate::registrar::{ModuleRegistry, Registrar};
pub use crate::registry::Registry;

// Built-in modules
pub use crate::qcd::{
    Action, ActionModule, ActionRegistry, Observable, ObservableModule, ObservableRegistry,
    PlaquetteLogger, PlaquetteModule, WilsonGaugeAction, WilsonGaugeModule,
};

// Events
pub use crate::events::{create_stream, EventSender, EventStream, ModuleEvent, StreamBuilder};

// Errors
pub use crate::error::{
    ConfigurationError, ConfigurationResult, HmcError, HmcResult, ModuleError, ModuleResult,
    RegistryError, RegistryResult,
};
