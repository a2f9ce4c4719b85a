//! String-keyed builder registry.
//!
//! A `Registry` maps module keys to builder closures that construct a new
//! instance from a [`Reader`]. One registry exists per module category
//! (gauge actions, observables, ...). Registries are populated during an
//! explicit startup phase and only read afterwards; sharing one behind an
//! `Arc` freezes it, and `create` may then run concurrently.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::error::{ConfigurationResult, RegistryError, RegistryResult};
use crate::events::{EventSender, ModuleEvent};
use crate::reader::{join_section, Reader};

/// Builder closure stored in a [`Registry`].
pub type BuildFn<M, R> = Box<dyn Fn(&R) -> ConfigurationResult<Box<M>> + Send + Sync>;

/// A registry of builders for one module category.
///
/// # Example
///
/// ```rust
/// use hmc_modules::{JsonReader, Reader, Registry};
///
/// let mut registry: Registry<f64, JsonReader> = Registry::new("coupling");
/// registry
///     .register_builder("beta", |reader: &JsonReader| Ok(Box::new(reader.read("beta")?)))
///     .unwrap();
///
/// let reader = JsonReader::parse(r#"{"beta": 6.0}"#).unwrap();
/// assert_eq!(*registry.create("beta", &reader).unwrap(), 6.0);
/// ```
pub struct Registry<M: ?Sized, R> {
    category: String,
    builders: HashMap<String, BuildFn<M, R>>,
    ordered: Vec<String>,
    events: Option<EventSender<ModuleEvent>>,
}

impl<M: ?Sized, R: Reader> Registry<M, R> {
    /// Create a new empty registry for `category`.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            builders: HashMap::new(),
            ordered: Vec::new(),
            events: None,
        }
    }

    /// Report registrations and creations to `sender`.
    pub fn with_events(mut self, sender: EventSender<ModuleEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// The module category served by this registry.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Register a builder under `key`.
    ///
    /// Fails if the key is blank or already registered; the registry is
    /// left unchanged in both cases.
    pub fn register_builder<F>(&mut self, key: &str, builder: F) -> RegistryResult<()>
    where
        F: Fn(&R) -> ConfigurationResult<Box<M>> + Send + Sync + 'static,
    {
        if key.trim().is_empty() {
            return Err(RegistryError::InvalidName(key.to_string()));
        }
        if self.builders.contains_key(key) {
            warn!(category = %self.category, key, "duplicate module registration rejected");
            return Err(RegistryError::DuplicateRegistration {
                category: self.category.clone(),
                key: key.to_string(),
            });
        }

        self.ordered.push(key.to_string());
        self.builders.insert(key.to_string(), Box::new(builder));
        debug!(category = %self.category, key, "module builder registered");
        self.emit(ModuleEvent::Registered {
            category: self.category.clone(),
            key: key.to_string(),
        });
        Ok(())
    }

    /// Construct a new instance of the module registered under `key`.
    ///
    /// The builder runs exactly once per call; ownership of the result
    /// passes to the caller.
    pub fn create(&self, key: &str, reader: &R) -> RegistryResult<Box<M>> {
        let result = match self.builders.get(key) {
            Some(builder) => builder(reader).map_err(RegistryError::from),
            None => Err(RegistryError::UnknownModule {
                category: self.category.clone(),
                key: key.to_string(),
            }),
        };

        match &result {
            Ok(_) => {
                debug!(category = %self.category, key, format = reader.format(), "module created");
                self.emit(ModuleEvent::Created {
                    category: self.category.clone(),
                    key: key.to_string(),
                });
            }
            Err(err) => {
                warn!(category = %self.category, key, error = %err, "module creation failed");
                self.emit(ModuleEvent::CreateFailed {
                    category: self.category.clone(),
                    key: key.to_string(),
                    message: err.to_string(),
                });
            }
        }
        result
    }

    /// Construct the module named by `<section>.name`, reading its
    /// configuration relative to `section`.
    pub fn create_from_section(&self, reader: &R, section: &str) -> RegistryResult<Box<M>> {
        let key: String = reader.read(&join_section(section, "name"))?;
        let scoped = reader.scoped(section)?;
        self.create(&key, &scoped)
    }

    /// Keys of all registered builders, in registration order.
    pub fn list_keys(&self) -> Vec<&str> {
        self.ordered.iter().map(|s| s.as_str()).collect()
    }

    /// Check if a builder is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.builders.contains_key(key)
    }

    /// Get the number of registered builders.
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// One-line summary of the registry contents.
    pub fn describe(&self) -> String {
        format!("{} modules: [{}]", self.category, self.ordered.join(", "))
    }

    fn emit(&self, event: ModuleEvent) {
        if let Some(events) = &self.events {
            if events.try_send(event).is_err() {
                debug!(category = %self.category, "module event dropped");
            }
        }
    }
}

impl<M: ?Sized, R> fmt::Debug for Registry<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("category", &self.category)
            .field("keys", &self.ordered)
            .finish()
    }
}
