//! # HMC Modules
//!
//! **hmc-modules** lets a simulation driver pick actions and observables by
//! name at run time, configure them from a structured input file, and build
//! the heavy numerical objects only when they are first needed.
//!
//! ## Overview
//!
//! ```text
//! Registry::create(key, reader)
//!     -> builder(reader)              reads the parameters section
//!     -> Box<dyn Module>              configured, nothing built yet
//! module.get_ptr()
//!     -> BuildStep::build(&params)    first call only
//!     -> &Product                     cached for the module's lifetime
//! ```
//!
//! - [`ConfigurationBlock`] holds one [`Parameters`] value ([`NoParameters`]
//!   for modules without configuration)
//! - [`ModuleAdapter`] pairs a configuration block with a lazily built product
//! - [`Registry`] maps keys to builders, one registry per module category
//! - [`Registrar`] binds a module type to a key during startup
//!
//! ## Quick Start
//!
//! ```rust
//! use hmc_modules::prelude::*;
//!
//! let mut actions = ActionRegistry::<JsonReader>::new("gauge");
//! Registrar::new(&mut actions)
//!     .register::<WilsonGaugeModule>("Wilson")
//!     .unwrap();
//!
//! let reader = JsonReader::parse(r#"{"parameters": {"beta": 6.0}}"#).unwrap();
//! let module = actions.create("Wilson", &reader).unwrap();
//! let action = module.get_ptr().unwrap();
//! assert_eq!(
//!     action.as_any().downcast_ref::<WilsonGaugeAction>().unwrap().beta(),
//!     6.0
//! );
//! ```

mod catalog;
mod config;
mod error;
pub mod events;
mod module;
mod reader;
mod registrar;
mod registry;

pub mod prelude;
pub mod qcd;

// Re-export core types
pub use catalog::ModuleCatalog;
pub use config::{ConfigurationBlock, NoParameters, Parameters, DEFAULT_SECTION};
pub use error::{
    ConfigurationError, ConfigurationResult, HmcError, HmcResult, ModuleError, ModuleResult,
    RegistryError, RegistryResult,
};
pub use events::{create_stream, EventSender, EventStream, ModuleEvent, StreamBuilder};
pub use module::{BuildStep, FromReader, Module, ModuleAdapter, ModuleExt, ModuleState};
pub use reader::{join_section, JsonReader, Reader, TomlReader};
pub use registrar::{register, ModuleRegistry, Registrar};
pub use registry::{BuildFn, Registry};
