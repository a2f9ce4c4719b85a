//! Composition root holding one registry per module category.

use tracing::info;

use crate::error::RegistryResult;
use crate::events::{EventSender, ModuleEvent};
use crate::qcd::{
    register_default_modules, ActionModule, ActionRegistry, ObservableModule,
    ObservableRegistry, ACTION_CATEGORY, OBSERVABLE_CATEGORY,
};
use crate::reader::Reader;

/// The action and observable registries of one simulation process.
///
/// Build it once at startup, register modules, then share it read-only
/// (for example behind an `Arc`) with the code driving the run.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{JsonReader, Module, ModuleCatalog};
///
/// let catalog = ModuleCatalog::<JsonReader>::with_defaults().unwrap();
/// let reader = JsonReader::parse(r#"{"parameters": {"beta": 6.0}}"#).unwrap();
///
/// let module = catalog.create_action("Wilson", &reader).unwrap();
/// assert_eq!(module.get_ptr().unwrap().action_name(), "Wilson Gauge Action");
/// ```
#[derive(Debug)]
pub struct ModuleCatalog<R> {
    actions: ActionRegistry<R>,
    observables: ObservableRegistry<R>,
}

impl<R: Reader + 'static> ModuleCatalog<R> {
    /// Create a catalog with empty registries.
    pub fn new() -> Self {
        Self {
            actions: ActionRegistry::new(ACTION_CATEGORY),
            observables: ObservableRegistry::new(OBSERVABLE_CATEGORY),
        }
    }

    /// Create a catalog whose registries report to `sender`.
    pub fn with_events(sender: EventSender<ModuleEvent>) -> Self {
        Self {
            actions: ActionRegistry::new(ACTION_CATEGORY).with_events(sender.clone()),
            observables: ObservableRegistry::new(OBSERVABLE_CATEGORY).with_events(sender),
        }
    }

    /// Create a catalog with the built-in modules registered.
    pub fn with_defaults() -> RegistryResult<Self> {
        let mut catalog = Self::new();
        catalog.register_defaults()?;
        Ok(catalog)
    }

    /// Register the built-in modules.
    pub fn register_defaults(&mut self) -> RegistryResult<()> {
        register_default_modules(&mut self.actions, &mut self.observables)?;
        info!(
            actions = self.actions.len(),
            observables = self.observables.len(),
            "default modules registered"
        );
        Ok(())
    }

    /// The action registry.
    pub fn actions(&self) -> &ActionRegistry<R> {
        &self.actions
    }

    /// The action registry, for registration during startup.
    pub fn actions_mut(&mut self) -> &mut ActionRegistry<R> {
        &mut self.actions
    }

    /// The observable registry.
    pub fn observables(&self) -> &ObservableRegistry<R> {
        &self.observables
    }

    /// The observable registry, for registration during startup.
    pub fn observables_mut(&mut self) -> &mut ObservableRegistry<R> {
        &mut self.observables
    }

    /// Create the action module registered under `key`.
    pub fn create_action(&self, key: &str, reader: &R) -> RegistryResult<Box<ActionModule>> {
        self.actions.create(key, reader)
    }

    /// Create the observable module registered under `key`.
    pub fn create_observable(
        &self,
        key: &str,
        reader: &R,
    ) -> RegistryResult<Box<ObservableModule>> {
        self.observables.create(key, reader)
    }

    /// Summary of both registries.
    pub fn describe(&self) -> String {
        format!("{}; {}", self.actions.describe(), self.observables.describe())
    }
}

impl<R: Reader + 'static> Default for ModuleCatalog<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::events::create_stream;
    use crate::module::{Module, ModuleExt};
    use crate::qcd::{Observable, PlaquetteLogger, PlaquetteModule};
    use crate::reader::JsonReader;

    #[test]
    fn test_catalog_defaults() {
        let catalog = ModuleCatalog::<JsonReader>::with_defaults().unwrap();
        assert_eq!(
            catalog.describe(),
            "gauge modules: [Wilson]; observable modules: [Plaquette]"
        );
    }

    #[test]
    fn test_catalog_categories_are_separate() {
        let catalog = ModuleCatalog::<JsonReader>::with_defaults().unwrap();
        let reader = JsonReader::parse(r#"{"parameters": {"output_prefix": "run1"}}"#).unwrap();

        let err = catalog.create_action("Plaquette", &reader).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownModule { ref category, .. } if category == "gauge"));

        let module = catalog.create_observable("Plaquette", &reader).unwrap();
        assert!(module.is::<PlaquetteModule>());
        let logger = module.get_ptr().unwrap();
        assert_eq!(
            logger
                .as_any()
                .downcast_ref::<PlaquetteLogger>()
                .unwrap()
                .output_prefix(),
            "run1"
        );
    }

    #[test]
    fn test_catalog_events() {
        let (sender, _stream) = create_stream::<ModuleEvent>();
        let mut catalog = ModuleCatalog::<JsonReader>::with_events(sender);
        catalog.register_defaults().unwrap();
        assert_eq!(catalog.actions().len(), 1);
        assert_eq!(catalog.observables_mut().len(), 1);
        assert!(catalog.actions_mut().contains("Wilson"));
    }
}
