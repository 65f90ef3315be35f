// # Static Region Resolver
//
// Reports the same configured region on every call.
//
// ## When to Use
//
// - Deployments pinned to one region
// - Local development against a single endpoint
// - Embedding without DNS access
//
// A static resolver never reports a region change, so workflows driven by it
// never restart.

use async_trait::async_trait;

use crate::config::ResolverSourceConfig;
use crate::error::{Error, Result};
use crate::region::ActiveRegion;
use crate::traits::{RegionResolver, RegionResolverFactory};

/// Resolver returning a fixed region
#[derive(Debug, Clone)]
pub struct StaticRegionResolver {
    region: ActiveRegion,
}

impl StaticRegionResolver {
    /// Create a resolver always reporting `region`
    pub fn new(region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        if region.is_empty() {
            return Err(Error::config("Static region cannot be empty"));
        }

        Ok(Self {
            region: ActiveRegion::new(region),
        })
    }
}

#[async_trait]
impl RegionResolver for StaticRegionResolver {
    async fn resolve(&self) -> Result<ActiveRegion> {
        Ok(self.region.clone())
    }

    fn resolver_name(&self) -> &'static str {
        "static"
    }
}

/// Factory for StaticRegionResolver
pub struct StaticRegionResolverFactory;

impl RegionResolverFactory for StaticRegionResolverFactory {
    fn create(&self, config: &ResolverSourceConfig) -> Result<Box<dyn RegionResolver>> {
        match config {
            ResolverSourceConfig::Static { region } => {
                Ok(Box::new(StaticRegionResolver::new(region.clone())?))
            }
            _ => Err(Error::config(
                "Static resolver factory requires a static resolver config",
            )),
        }
    }
}
