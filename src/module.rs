//! Module trait and the lazily-building module adapter.
//!
//! A [`Module`] exposes one heavy product behind a uniform interface. The
//! generic [`ModuleAdapter`] owns a [`ConfigurationBlock`] and defers the
//! product's construction to the first [`Module::get_ptr`] call. What is
//! built, and from which parameters, is supplied per module variant by a
//! [`BuildStep`].

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use crate::config::{ConfigurationBlock, Parameters, DEFAULT_SECTION};
use crate::error::{ConfigurationResult, ModuleError, ModuleResult};
use crate::reader::Reader;

/// Uniform interface over a lazily materialized product.
///
/// # Object safety
///
/// This trait is object-safe; registries store modules as
/// `Box<dyn Module<Product = dyn SomeProductTrait>>`.
pub trait Module: Send + Sync + fmt::Debug {
    /// The product handed out by [`get_ptr`](Module::get_ptr).
    type Product: ?Sized;

    /// Returns the name of the module variant.
    fn name(&self) -> &str;

    /// Returns the product, building it on first use.
    ///
    /// The build step runs at most once. Later calls return the same
    /// product, or the same error if the build failed. A build step that
    /// panics counts as failed; it is not rerun.
    fn get_ptr(&self) -> ModuleResult<&Self::Product>;

    /// Diagnostic rendering of the module configuration.
    fn describe(&self) -> String {
        String::new()
    }

    /// Whether the product has been built successfully.
    fn is_built(&self) -> bool;

    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;
}

/// Extension trait for module type checking.
pub trait ModuleExt: Module {
    /// Check if this module is of type T.
    fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to type T.
    fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl<M: Module + ?Sized> ModuleExt for M {}

/// Construction of a module from a reader.
pub trait FromReader: Sized {
    /// Read the module configuration from `reader`.
    fn from_reader<R: Reader>(reader: &R) -> ConfigurationResult<Self>;
}

/// The type-specific build step of a module variant.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{BuildStep, Module, ModuleAdapter, ModuleResult, NoParameters};
///
/// struct Identity;
///
/// impl BuildStep for Identity {
///     type Parameters = NoParameters;
///     type Product = String;
///     const NAME: &'static str = "Identity";
///
///     fn build(_: &NoParameters) -> ModuleResult<Box<String>> {
///         Ok(Box::new("identity".to_string()))
///     }
/// }
///
/// let module = ModuleAdapter::<Identity>::new(NoParameters);
/// assert!(!module.is_built());
/// assert_eq!(module.get_ptr().unwrap(), "identity");
/// assert!(module.is_built());
/// ```
pub trait BuildStep: 'static {
    /// Parameters the product is built from.
    type Parameters: Parameters;

    /// The product type, usually a trait object.
    type Product: ?Sized + Send + Sync + 'static;

    /// Name of the module variant.
    const NAME: &'static str;

    /// Section the parameters are read from.
    const SECTION: &'static str = DEFAULT_SECTION;

    /// Build the product from its parameters.
    fn build(parameters: &Self::Parameters) -> ModuleResult<Box<Self::Product>>;
}

/// Lifecycle state of a [`ModuleAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Configured, product not built yet
    Configured,
    /// Product built and cached
    Built,
    /// Build step failed; the adapter is unusable
    Failed,
}

/// Generic module pairing a configuration block with a lazily built product.
///
/// The adapter exclusively owns its product. Concurrent first calls to
/// [`get_ptr`](Module::get_ptr) are serialized so the build step runs
/// exactly once and every caller sees the same product.
pub struct ModuleAdapter<B: BuildStep> {
    config: ConfigurationBlock<B::Parameters>,
    product: OnceLock<ModuleResult<Box<B::Product>>>,
    _step: PhantomData<fn() -> B>,
}

impl<B: BuildStep> ModuleAdapter<B> {
    /// Create a module from a parameter value. The product is not built.
    pub fn new(parameters: B::Parameters) -> Self {
        Self::with_config(ConfigurationBlock::new(parameters))
    }

    /// Create a module from an existing configuration block.
    pub fn with_config(config: ConfigurationBlock<B::Parameters>) -> Self {
        Self {
            config,
            product: OnceLock::new(),
            _step: PhantomData,
        }
    }

    /// Read the module parameters from a named section.
    pub fn from_section<R: Reader>(reader: &R, section: &str) -> ConfigurationResult<Self> {
        let config = ConfigurationBlock::from_section(reader, section)?;
        debug!(module = B::NAME, section, "module configured from reader");
        Ok(Self::with_config(config))
    }

    /// The module parameters.
    pub fn parameters(&self) -> &B::Parameters {
        self.config.parameters()
    }

    /// The configuration block.
    pub fn config(&self) -> &ConfigurationBlock<B::Parameters> {
        &self.config
    }

    /// Replace the parameters, returning the previous value.
    ///
    /// Fails once the build step has run, successfully or not.
    pub fn configure(&mut self, parameters: B::Parameters) -> ModuleResult<B::Parameters> {
        if self.product.get().is_some() {
            return Err(ModuleError::AlreadyBuilt {
                module: B::NAME.to_string(),
            });
        }
        Ok(self.config.replace(parameters))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModuleState {
        match self.product.get() {
            None => ModuleState::Configured,
            Some(Ok(_)) => ModuleState::Built,
            Some(Err(_)) => ModuleState::Failed,
        }
    }

    fn build(&self) -> ModuleResult<Box<B::Product>> {
        debug!(module = B::NAME, "building module product");
        let parameters = self.config.parameters();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| B::build(parameters)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "build step panicked".to_string());
                Err(ModuleError::initialization(
                    B::NAME,
                    format!("build step panicked: {message}"),
                ))
            });
        match outcome {
            Ok(product) => {
                info!(module = B::NAME, parameters = %self.config, "module product built");
                Ok(product)
            }
            Err(err) => {
                warn!(module = B::NAME, error = %err, "module build failed");
                Err(err)
            }
        }
    }
}

impl<B: BuildStep> FromReader for ModuleAdapter<B> {
    fn from_reader<R: Reader>(reader: &R) -> ConfigurationResult<Self> {
        Self::from_section(reader, B::SECTION)
    }
}

impl<B: BuildStep> Module for ModuleAdapter<B> {
    type Product = B::Product;

    fn name(&self) -> &str {
        B::NAME
    }

    fn get_ptr(&self) -> ModuleResult<&B::Product> {
        match self.product.get_or_init(|| self.build()) {
            Ok(product) => Ok(&**product),
            Err(err) => Err(err.clone()),
        }
    }

    fn describe(&self) -> String {
        self.config.describe()
    }

    fn is_built(&self) -> bool {
        self.state() == ModuleState::Built
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<B: BuildStep> fmt::Debug for ModuleAdapter<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleAdapter")
            .field("name", &B::NAME)
            .field("parameters", self.config.parameters())
            .field("state", &self.state())
            .finish()
    }
}
