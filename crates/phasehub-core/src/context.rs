//! Shared context propagated between lifecycle hooks.
//!
//! A [`SharedContext`] is an immutable snapshot of the process-wide
//! capabilities. Hooks never mutate it in place; they derive a new value
//! with [`SharedContext::with`] and hand it back to the executor, which
//! makes it current for the hooks that follow. Readers holding an older
//! snapshot keep seeing that snapshot.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::log::{self, Level, LogRecord, Logger};

/// A cross-cutting capability that can be installed into a context.
#[derive(Clone)]
pub enum Capability {
    /// The structured logger.
    Logger(Arc<dyn Logger>),
    /// A typed extension capability, keyed by its type.
    Extension {
        /// Type key of the value.
        type_id: TypeId,
        /// Type name, for diagnostics.
        name: &'static str,
        /// The value itself.
        value: Arc<dyn Any + Send + Sync>,
    },
}

impl Capability {
    /// Wraps `value` as an extension capability.
    pub fn extension<T: Any + Send + Sync>(value: T) -> Self {
        Self::Extension {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logger(logger) => f.debug_tuple("Logger").field(logger).finish(),
            Self::Extension { name, .. } => f.debug_tuple("Extension").field(name).finish(),
        }
    }
}

#[derive(Clone)]
struct ExtensionEntry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// The capabilities visible through one [`SharedContext`] snapshot.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    logger: Option<Arc<dyn Logger>>,
    extensions: HashMap<TypeId, ExtensionEntry>,
}

impl CapabilitySet {
    /// Returns the installed logger, if any.
    pub fn logger(&self) -> Option<&Arc<dyn Logger>> {
        self.logger.as_ref()
    }

    /// Returns the extension of type `T`, if installed.
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value.clone().downcast::<T>().ok())
    }

    /// Names of all installed capabilities, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.extensions.values().map(|e| e.name).collect();
        names.sort_unstable();
        if self.logger.is_some() {
            names.insert(0, "logger");
        }
        names
    }

    /// Returns whether no capability is installed.
    pub fn is_empty(&self) -> bool {
        self.logger.is_none() && self.extensions.is_empty()
    }

    fn install(&mut self, capability: Capability) {
        match capability {
            Capability::Logger(logger) => self.logger = Some(logger),
            Capability::Extension {
                type_id,
                name,
                value,
            } => {
                self.extensions
                    .insert(type_id, ExtensionEntry { name, value });
            }
        }
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("capabilities", &self.names())
            .finish()
    }
}

/// Replace-only carrier of cross-cutting capabilities.
///
/// Cloning is a reference-count bump.
#[derive(Clone, Default)]
pub struct SharedContext {
    inner: Arc<CapabilitySet>,
}

impl SharedContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the capability set of this snapshot.
    pub fn get(&self) -> &CapabilitySet {
        &self.inner
    }

    /// Returns a new context with `capability` installed.
    ///
    /// `self` is left unchanged.
    pub fn with(&self, capability: Capability) -> Self {
        let mut set = (*self.inner).clone();
        set.install(capability);
        Self {
            inner: Arc::new(set),
        }
    }

    /// Returns a new context with `logger` installed.
    pub fn with_logger(&self, logger: Arc<dyn Logger>) -> Self {
        self.with(Capability::Logger(logger))
    }

    /// Returns a new context with `value` installed as an extension.
    pub fn with_extension<T: Any + Send + Sync>(&self, value: T) -> Self {
        self.with(Capability::extension(value))
    }

    /// Returns the installed logger, if any.
    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.inner.logger().cloned()
    }

    /// Returns the extension of type `T`, if installed.
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.extension::<T>()
    }

    /// Returns whether both handles point at the same snapshot.
    pub fn same_as(&self, other: &SharedContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Logs through the installed logger, or through `tracing` when none
    /// is installed yet.
    pub fn log(&self, level: Level, message: &str, fields: &[(&str, serde_json::Value)]) {
        match self.inner.logger() {
            Some(logger) => logger.emit(level, message, fields),
            None => {
                let record = fields
                    .iter()
                    .fold(LogRecord::new(level, message), |record, (key, value)| {
                        record.with_field(key, value.clone())
                    });
                log::forward_to_tracing(&record);
            }
        }
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContext")
            .field("capabilities", &self.inner.names())
            .finish()
    }
}
