// # Client Factory Trait
//
// Defines how a region-bound client is built.
//
// Construction is the only expensive, side-effecting step the client cache
// performs, so the cache calls it at most once per region binding.

use crate::region::ActiveRegion;
use async_trait::async_trait;

/// Trait for building clients bound to a specific region
///
/// The produced client is opaque to the core. It is wrapped in an `Arc` by
/// the cache and handed out unchanged until the active region moves.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Client type produced by this factory
    type Client: Send + Sync + 'static;

    /// Build a client bound to `region`
    ///
    /// # Returns
    ///
    /// - `Ok(Client)`: A client talking to the endpoint of `region`
    /// - `Err(Error)`: If the client could not be built. The error fails the
    ///   current call only; the cache stays consistent.
    async fn connect(&self, region: &ActiveRegion) -> Result<Self::Client, crate::Error>;
}
