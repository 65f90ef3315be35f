//! Region-bound client cache
//!
//! [`RegionBoundClientCache`] owns one lazily built client and the region it
//! is bound to. Every access re-resolves the active region:
//!
//! | Cached region | Resolved | Result |
//! |---|---|---|
//! | none | `R` | build client for `R`, remember `R`, return it |
//! | `R` | `R` | return cached client (build it if missing) |
//! | `R_old` | `R_new` | remember `R_new`, drop client, fail with `ActiveRegionChanged` |
//!
//! After a change the next access takes the "build client" path with the
//! region resolved on *that* access, so a client is never bound to a region
//! other than the most recent resolution.
//!
//! ## Concurrency
//!
//! The state lives behind an async mutex held for the whole
//! resolve-and-decide transition. Sharing one cache between tasks through an
//! `Arc` is safe; concurrent callers are serialized.

use crate::error::{Error, Result};
use crate::region::ActiveRegion;
use crate::traits::{ClientFactory, RegionResolver};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Mutable state owned by the cache
///
/// Invariant: `bound_client.is_some()` implies `last_known_region.is_some()`,
/// and a bound client always belongs to `last_known_region`.
struct ClientCacheState<C> {
    last_known_region: Option<ActiveRegion>,
    bound_client: Option<Arc<C>>,
}

impl<C> Default for ClientCacheState<C> {
    fn default() -> Self {
        Self {
            last_known_region: None,
            bound_client: None,
        }
    }
}

/// Cache of a single client bound to the active region
///
/// # Example
///
/// ```rust,ignore
/// let cache = RegionBoundClientCache::new(resolver, factory);
///
/// match cache.get_client().await {
///     Ok(client) => { /* use client */ }
///     Err(Error::ActiveRegionChanged { old, new }) => { /* restart work */ }
///     Err(e) => return Err(e),
/// }
/// ```
pub struct RegionBoundClientCache<C: Send + Sync + 'static> {
    /// Active region lookup
    resolver: Box<dyn RegionResolver>,

    /// Builds clients for a region
    factory: Box<dyn ClientFactory<Client = C>>,

    /// Last known region and the client bound to it
    state: Mutex<ClientCacheState<C>>,
}

impl<C: Send + Sync + 'static> RegionBoundClientCache<C> {
    /// Create an empty cache
    ///
    /// Nothing is resolved or built until the first [`get_client`](Self::get_client).
    pub fn new(
        resolver: Box<dyn RegionResolver>,
        factory: Box<dyn ClientFactory<Client = C>>,
    ) -> Self {
        Self {
            resolver,
            factory,
            state: Mutex::new(ClientCacheState::default()),
        }
    }

    /// Get the client bound to the active region
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<C>)`: The cached client, or a newly built one on first use
    /// - `Err(Error::ActiveRegionChanged)`: The region moved since the last
    ///   access. The new region is recorded, the old client is dropped and no
    ///   client is built on this call.
    /// - `Err(Error::Resolution)`: The region could not be resolved. The
    ///   cache state is left untouched.
    /// - `Err(_)`: Client construction failed. The resolved region is kept,
    ///   the next call retries construction.
    pub async fn get_client(&self) -> Result<Arc<C>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let resolved = self.resolver.resolve().await?;

        match state.last_known_region.take() {
            Some(previous) if previous != resolved => {
                state.bound_client = None;
                state.last_known_region = Some(resolved.clone());
                info!(
                    old_region = %previous,
                    new_region = %resolved,
                    "Active region changed, dropped cached client"
                );
                return Err(Error::ActiveRegionChanged {
                    old: previous,
                    new: resolved,
                });
            }
            Some(previous) => {
                state.last_known_region = Some(previous);
            }
            None => {
                debug!(region = %resolved, "First active region resolution");
                state.last_known_region = Some(resolved.clone());
            }
        }

        if let Some(client) = &state.bound_client {
            debug!(region = %resolved, "Reusing cached client");
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.factory.connect(&resolved).await?);
        info!(
            region = %resolved,
            resolver = self.resolver.resolver_name(),
            "Constructed client for active region"
        );
        state.bound_client = Some(Arc::clone(&client));

        Ok(client)
    }

    /// Region recorded by the last successful resolution, if any
    pub async fn last_known_region(&self) -> Option<ActiveRegion> {
        self.state.lock().await.last_known_region.clone()
    }

    /// Whether a client is currently cached
    pub async fn has_bound_client(&self) -> bool {
        self.state.lock().await.bound_client.is_some()
    }
}
