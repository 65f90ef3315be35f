//! Plugin-based resolver registry
//!
//! The registry allows region resolvers to be registered dynamically at
//! runtime, so binaries pick a resolver from configuration without
//! hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use regionwatch_core::registry::ResolverRegistry;
//! use regionwatch_core::config::ResolverSourceConfig;
//!
//! let registry = ResolverRegistry::with_builtins();
//! regionwatch_dns::register(&registry);
//!
//! let resolver = registry.create_resolver(&ResolverSourceConfig::default())?;
//! ```

use crate::config::ResolverSourceConfig;
use crate::error::{Error, Result};
use crate::resolver::StaticRegionResolverFactory;
use crate::traits::{RegionResolver, RegionResolverFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry of region resolver factories keyed by resolver type name
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: RwLock<HashMap<String, Box<dyn RegionResolverFactory>>>,
}

impl ResolverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the resolvers built into this crate
    ///
    /// Currently: `"static"`.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_resolver("static", Box::new(StaticRegionResolverFactory));
        registry
    }

    /// Register a resolver factory
    ///
    /// # Parameters
    ///
    /// - `name`: Resolver type name (e.g., "dns", "static")
    /// - `factory`: Factory object for creating resolver instances
    ///
    /// Registering an existing name replaces the previous factory.
    pub fn register_resolver(
        &self,
        name: impl Into<String>,
        factory: Box<dyn RegionResolverFactory>,
    ) {
        let mut resolvers = self
            .resolvers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resolvers.insert(name.into(), factory);
    }

    /// Create a resolver from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn RegionResolver>)`: Created resolver instance
    /// - `Err(Error)`: If the resolver type is not registered or creation fails
    pub fn create_resolver(
        &self,
        config: &ResolverSourceConfig,
    ) -> Result<Box<dyn RegionResolver>> {
        config.validate()?;

        let resolver_type = config.type_name();
        let resolvers = self
            .resolvers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = resolvers
            .get(resolver_type)
            .ok_or_else(|| Error::config(format!("Unknown resolver type: {}", resolver_type)))?;

        factory.create(config)
    }

    /// List all registered resolver types
    pub fn list_resolvers(&self) -> Vec<String> {
        let resolvers = self
            .resolvers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resolvers.keys().cloned().collect()
    }

    /// Check if a resolver type is registered
    pub fn has_resolver(&self, name: &str) -> bool {
        let resolvers = self
            .resolvers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        resolvers.contains_key(name)
    }
}
