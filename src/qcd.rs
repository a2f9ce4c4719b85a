//! Gauge action and observable modules.
//!
//! Two module categories exist: actions and observables. Each has its own
//! registry (`"gauge"` and `"observable"`). The products defined here are
//! the configuration-facing ends of the numerical objects; evaluating an
//! action or measuring an observable is left to the simulation driver.

use std::any::Any;
use std::fmt::Debug;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Parameters;
use crate::error::{ModuleError, ModuleResult, RegistryResult};
use crate::module::{BuildStep, Module, ModuleAdapter};
use crate::reader::Reader;
use crate::registrar::{ModuleRegistry, Registrar};

/// Registry category for gauge actions.
pub const ACTION_CATEGORY: &str = "gauge";

/// Registry category for observables.
pub const OBSERVABLE_CATEGORY: &str = "observable";

/// An action contributing to the HMC Hamiltonian.
pub trait Action: Send + Sync + Debug {
    /// Human readable action name.
    fn action_name(&self) -> String;

    /// Parameter summary for run logs.
    fn log_parameters(&self) -> String;

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

/// A measurement performed between trajectories.
pub trait Observable: Send + Sync + Debug {
    /// Human readable observable name.
    fn observable_name(&self) -> String;

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

/// Module producing an [`Action`].
pub type ActionModule = dyn Module<Product = dyn Action>;

/// Module producing an [`Observable`].
pub type ObservableModule = dyn Module<Product = dyn Observable>;

/// Registry of action modules.
pub type ActionRegistry<R> = ModuleRegistry<dyn Action, R>;

/// Registry of observable modules.
pub type ObservableRegistry<R> = ModuleRegistry<dyn Observable, R>;

/// Wilson plaquette gauge action.
#[derive(Debug, Clone, PartialEq)]
pub struct WilsonGaugeAction {
    beta: f64,
}

impl WilsonGaugeAction {
    /// Create the action with coupling `beta`.
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }

    /// The gauge coupling.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl Action for WilsonGaugeAction {
    fn action_name(&self) -> String {
        "Wilson Gauge Action".to_string()
    }

    fn log_parameters(&self) -> String {
        format!("[WilsonGaugeAction] Beta: {}", self.beta)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Parameters of [`WilsonGaugeAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WilsonGaugeActionParameters {
    pub beta: f64,
}

impl Parameters for WilsonGaugeActionParameters {}

/// Build step for the Wilson gauge module.
pub struct WilsonGauge;

impl BuildStep for WilsonGauge {
    type Parameters = WilsonGaugeActionParameters;
    type Product = dyn Action;
    const NAME: &'static str = "Wilson";

    fn build(parameters: &WilsonGaugeActionParameters) -> ModuleResult<Box<dyn Action>> {
        if !parameters.beta.is_finite() || parameters.beta <= 0.0 {
            return Err(ModuleError::initialization(
                Self::NAME,
                format!("beta must be positive and finite, got {}", parameters.beta),
            ));
        }
        Ok(Box::new(WilsonGaugeAction::new(parameters.beta)))
    }
}

/// Wilson gauge action module.
pub type WilsonGaugeModule = ModuleAdapter<WilsonGauge>;

/// Logs the average plaquette to per-trajectory files.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaquetteLogger {
    output_prefix: String,
}

impl PlaquetteLogger {
    /// Create a logger writing to files named after `output_prefix`.
    pub fn new(output_prefix: impl Into<String>) -> Self {
        Self {
            output_prefix: output_prefix.into(),
        }
    }

    /// The output file prefix.
    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    /// File the measurement of `trajectory` is written to.
    pub fn output_file(&self, trajectory: u64) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.output_prefix, trajectory))
    }
}

impl Observable for PlaquetteLogger {
    fn observable_name(&self) -> String {
        "Plaquette".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Parameters of [`PlaquetteLogger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaquetteObsParameters {
    pub output_prefix: String,
}

impl Parameters for PlaquetteObsParameters {}

/// Build step for the plaquette observable module.
pub struct Plaquette;

impl BuildStep for Plaquette {
    type Parameters = PlaquetteObsParameters;
    type Product = dyn Observable;
    const NAME: &'static str = "Plaquette";

    fn build(parameters: &PlaquetteObsParameters) -> ModuleResult<Box<dyn Observable>> {
        if parameters.output_prefix.trim().is_empty() {
            return Err(ModuleError::initialization(
                Self::NAME,
                "output_prefix must not be empty",
            ));
        }
        Ok(Box::new(PlaquetteLogger::new(&parameters.output_prefix)))
    }
}

/// Plaquette observable module.
pub type PlaquetteModule = ModuleAdapter<Plaquette>;

/// Register the built-in action and observable modules.
///
/// Call once during startup, before any lookup.
pub fn register_default_modules<R: Reader + 'static>(
    actions: &mut ActionRegistry<R>,
    observables: &mut ObservableRegistry<R>,
) -> RegistryResult<()> {
    Registrar::new(actions).register::<WilsonGaugeModule>("Wilson")?;
    Registrar::new(observables).register::<PlaquetteModule>("Plaquette")?;
    Ok(())
}
