//! Registration of concrete module types.
//!
//! A [`Registrar`] binds module types to keys in a module registry. Each
//! call to [`Registrar::register`] inserts one builder equivalent to
//! "construct a `T` from the supplied reader". Registration is an ordinary
//! function call made during startup, so its order is explicit.

use std::fmt;

use tracing::info;

use crate::error::RegistryResult;
use crate::module::{FromReader, Module};
use crate::reader::Reader;
use crate::registry::Registry;

/// Registry of boxed modules producing `P`.
pub type ModuleRegistry<P, R> = Registry<dyn Module<Product = P>, R>;

/// Inserts module builders into one registry.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{
///     BuildStep, JsonReader, ModuleAdapter, ModuleRegistry, ModuleResult, NoParameters,
///     Registrar,
/// };
///
/// struct Unit;
///
/// impl BuildStep for Unit {
///     type Parameters = NoParameters;
///     type Product = u32;
///     const NAME: &'static str = "Unit";
///
///     fn build(_: &NoParameters) -> ModuleResult<Box<u32>> {
///         Ok(Box::new(1))
///     }
/// }
///
/// let mut registry: ModuleRegistry<u32, JsonReader> = ModuleRegistry::new("counter");
/// Registrar::new(&mut registry)
///     .register::<ModuleAdapter<Unit>>("Unit")
///     .unwrap();
///
/// let reader = JsonReader::parse("{}").unwrap();
/// let module = registry.create("Unit", &reader).unwrap();
/// assert_eq!(*module.get_ptr().unwrap(), 1);
/// ```
pub struct Registrar<'a, P: ?Sized + 'static, R> {
    registry: &'a mut ModuleRegistry<P, R>,
}

impl<'a, P: ?Sized + 'static, R: Reader + 'static> Registrar<'a, P, R> {
    /// Create a registrar targeting `registry`.
    pub fn new(registry: &'a mut ModuleRegistry<P, R>) -> Self {
        Self { registry }
    }

    /// Bind module type `T` to `key`.
    ///
    /// Returns the registrar for chaining; a duplicate or blank key aborts
    /// the chain with the registry left unchanged.
    pub fn register<T>(&mut self, key: &str) -> RegistryResult<&mut Self>
    where
        T: Module<Product = P> + FromReader + 'static,
    {
        self.registry.register_builder(key, |reader: &R| {
            let module: Box<dyn Module<Product = P>> = Box::new(T::from_reader(reader)?);
            Ok(module)
        })?;
        info!(
            category = self.registry.category(),
            key,
            module = std::any::type_name::<T>(),
            "module registered"
        );
        Ok(self)
    }

    /// The target registry.
    pub fn registry(&self) -> &ModuleRegistry<P, R> {
        self.registry
    }
}

impl<P: ?Sized + 'static, R> fmt::Debug for Registrar<'_, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("registry", &self.registry)
            .finish()
    }
}

/// Bind module type `T` to `key` in `registry`.
pub fn register<T, P, R>(registry: &mut ModuleRegistry<P, R>, key: &str) -> RegistryResult<()>
where
    T: Module<Product = P> + FromReader + 'static,
    P: ?Sized + 'static,
    R: Reader + 'static,
{
    Registrar::new(registry).register::<T>(key)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameters;
    use crate::error::{ModuleResult, RegistryError};
    use crate::module::{BuildStep, ModuleAdapter, ModuleExt};
    use crate::reader::JsonReader;
    use serde::Deserialize;

    trait Smearing: Send + Sync {
        fn rho(&self) -> f64;
    }

    struct Stout {
        rho: f64,
    }

    impl Smearing for Stout {
        fn rho(&self) -> f64 {
            self.rho
        }
    }

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct StoutParameters {
        rho: f64,
    }

    impl Parameters for StoutParameters {}

    struct StoutStep;

    impl BuildStep for StoutStep {
        type Parameters = StoutParameters;
        type Product = dyn Smearing;
        const NAME: &'static str = "Stout";

        fn build(parameters: &StoutParameters) -> ModuleResult<Box<dyn Smearing>> {
            Ok(Box::new(Stout {
                rho: parameters.rho,
            }))
        }
    }

    struct ApeStep;

    impl BuildStep for ApeStep {
        type Parameters = StoutParameters;
        type Product = dyn Smearing;
        const NAME: &'static str = "APE";

        fn build(parameters: &StoutParameters) -> ModuleResult<Box<dyn Smearing>> {
            Ok(Box::new(Stout {
                rho: parameters.rho * 2.0,
            }))
        }
    }

    type SmearingRegistry = ModuleRegistry<dyn Smearing, JsonReader>;

    #[test]
    fn test_registrar_chain() {
        let mut registry = SmearingRegistry::new("smearing");
        Registrar::new(&mut registry)
            .register::<ModuleAdapter<StoutStep>>("Stout")
            .unwrap()
            .register::<ModuleAdapter<ApeStep>>("APE")
            .unwrap();

        assert_eq!(registry.list_keys(), vec!["Stout", "APE"]);

        let reader = JsonReader::parse(r#"{"parameters": {"rho": 0.1}}"#).unwrap();
        let module = registry.create("APE", &reader).unwrap();
        assert!(module.is::<ModuleAdapter<ApeStep>>());
        assert!(!module.is_built());
        assert_eq!(module.get_ptr().unwrap().rho(), 0.2);
    }

    #[test]
    fn test_register_function_rejects_duplicates() {
        let mut registry = SmearingRegistry::new("smearing");
        register::<ModuleAdapter<StoutStep>, _, _>(&mut registry, "Stout").unwrap();

        let err = register::<ModuleAdapter<ApeStep>, _, _>(&mut registry, "Stout").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                category: "smearing".into(),
                key: "Stout".into(),
            }
        );

        let reader = JsonReader::parse(r#"{"parameters": {"rho": 0.1}}"#).unwrap();
        let module = registry.create("Stout", &reader).unwrap();
        assert!(module.is::<ModuleAdapter<StoutStep>>());
    }

    #[test]
    fn test_registrar_chain_stops_at_duplicate() {
        let mut registry = SmearingRegistry::new("smearing");
        let mut registrar = Registrar::new(&mut registry);

        let err = registrar
            .register::<ModuleAdapter<StoutStep>>("Stout")
            .unwrap()
            .register::<ModuleAdapter<ApeStep>>("Stout")
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));

        let debug = format!("{registrar:?}");
        assert!(debug.contains("smearing"));
        assert!(debug.contains("Stout"));
        assert_eq!(registry.list_keys(), vec!["Stout"]);
    }

    #[test]
    fn test_registrar_exposes_registry() {
        let mut registry = SmearingRegistry::new("smearing");
        let mut registrar = Registrar::new(&mut registry);
        registrar.register::<ModuleAdapter<StoutStep>>("Stout").unwrap();
        assert!(registrar.registry().contains("Stout"));
    }
}
