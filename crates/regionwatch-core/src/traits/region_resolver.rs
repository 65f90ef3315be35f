// # Region Resolver Trait
//
// Defines the interface for looking up the currently active region.
//
// ## Implementations
//
// - DNS CNAME lookup: `regionwatch-dns` crate
// - Fixed region: `StaticRegionResolver` in this crate
//
// ## Usage
//
// ```rust,ignore
// use regionwatch_core::RegionResolver;
//
// #[tokio::main]
// async fn main() -> regionwatch_core::Result<()> {
//     let resolver = /* RegionResolver implementation */;
//
//     let region = resolver.resolve().await?;
//     println!("Active region: {}", region);
//
//     Ok(())
// }
// ```

use crate::region::ActiveRegion;
use async_trait::async_trait;

/// Trait for active region lookups
///
/// # No Caching
///
/// Every call to [`resolve`](RegionResolver::resolve) must perform a fresh
/// lookup. Remembering the last region is the job of
/// [`RegionBoundClientCache`](crate::cache::RegionBoundClientCache), which
/// relies on each lookup reflecting the current state of the indirection
/// record to detect region changes.
///
/// # Errors
///
/// Implementations return [`Error::Resolution`](crate::Error::Resolution)
/// when the lookup cannot be performed or its answer is not exactly one
/// well-formed target. They must not panic on malformed answers.
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// Resolve the currently active region
    ///
    /// # Returns
    ///
    /// - `Ok(ActiveRegion)`: The region currently serving the service
    /// - `Err(Error::Resolution)`: If the region could not be determined
    async fn resolve(&self) -> Result<ActiveRegion, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

/// Helper trait for constructing region resolvers from configuration
pub trait RegionResolverFactory: Send + Sync {
    /// Create a RegionResolver instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Resolver source configuration
    ///
    /// # Returns
    ///
    /// A boxed RegionResolver trait object
    fn create(
        &self,
        config: &crate::config::ResolverSourceConfig,
    ) -> Result<Box<dyn RegionResolver>, crate::Error>;
}
