// # DNS Region Resolver
//
// This crate looks up the active region of a multi-region service through a
// well-known CNAME record.
//
// ## Lookup
//
// The well-known name (by default `global.health.amazonaws.com`) is a CNAME
// pointing at the regional endpoint, e.g. `health.us-east-1.amazonaws.com.`.
// The region is the second label of that target.
//
// - Every `resolve()` performs a fresh lookup. The hickory answer cache is
//   disabled (`cache_size = 0`) so a flipped CNAME is seen immediately; the
//   client cache owns region memory
// - Exactly one CNAME answer is required
// - Transport failures, NXDOMAIN and empty answers are resolution errors
//
// ## Nameservers
//
// Without explicit nameservers the system resolver configuration is used.
// Explicit nameservers are queried over UDP.

use async_trait::async_trait;
use hickory_proto::rr::{RData, RecordType};
use hickory_proto::xfer::Protocol;
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::Resolver;
use regionwatch_core::config::ResolverSourceConfig;
use regionwatch_core::traits::{RegionResolver, RegionResolverFactory};
use regionwatch_core::{ActiveRegion, Error, ResolverRegistry, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Resolver name used in the registry and in logs
pub const RESOLVER_NAME: &str = "dns";

/// Active region resolver backed by a CNAME lookup
pub struct DnsRegionResolver {
    /// Well-known name whose CNAME target encodes the region
    record_name: String,

    /// Upstream DNS resolver
    resolver: Resolver<TokioConnectionProvider>,
}

impl std::fmt::Debug for DnsRegionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsRegionResolver")
            .field("record_name", &self.record_name)
            .finish()
    }
}

impl DnsRegionResolver {
    /// Create a resolver using the system DNS configuration
    ///
    /// # Parameters
    ///
    /// - `record_name`: Well-known name to look up
    /// - `timeout`: Per-query timeout
    pub fn from_system_conf(record_name: impl Into<String>, timeout: Duration) -> Result<Self> {
        let builder = Resolver::builder_tokio().map_err(|e| {
            Error::config(format!("Failed to read system DNS configuration: {}", e))
        })?;

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.cache_size = 0;

        Ok(Self {
            record_name: record_name.into(),
            resolver: builder.with_options(opts).build(),
        })
    }

    /// Create a resolver querying the given nameservers over UDP
    ///
    /// # Parameters
    ///
    /// - `record_name`: Well-known name to look up
    /// - `nameservers`: Nameserver socket addresses
    /// - `timeout`: Per-query timeout
    pub fn with_nameservers(
        record_name: impl Into<String>,
        nameservers: Vec<SocketAddr>,
        timeout: Duration,
    ) -> Result<Self> {
        if nameservers.is_empty() {
            return Err(Error::config("No nameservers configured for DNS resolver"));
        }

        let name_servers: Vec<NameServerConfig> = nameservers
            .into_iter()
            .map(|addr| NameServerConfig::new(addr, Protocol::Udp))
            .collect();
        let config = ResolverConfig::from_parts(None, vec![], name_servers);

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.cache_size = 0;

        let resolver =
            Resolver::builder_with_config(config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Ok(Self {
            record_name: record_name.into(),
            resolver,
        })
    }

    /// The name this resolver looks up
    pub fn record_name(&self) -> &str {
        &self.record_name
    }
}

#[async_trait]
impl RegionResolver for DnsRegionResolver {
    async fn resolve(&self) -> Result<ActiveRegion> {
        let lookup = self
            .resolver
            .lookup(self.record_name.as_str(), RecordType::CNAME)
            .await
            .map_err(|e| {
                Error::resolution(format!("Failed to resolve {}: {}", self.record_name, e))
            })?;

        let targets = cname_targets(lookup.iter());
        debug!(
            record_name = %self.record_name,
            answers = targets.len(),
            "CNAME lookup completed"
        );

        ActiveRegion::from_answers(&self.record_name, &targets)
    }

    fn resolver_name(&self) -> &'static str {
        RESOLVER_NAME
    }
}

/// Collect the CNAME targets of an answer, ignoring other record types
fn cname_targets<'a>(answers: impl Iterator<Item = &'a RData>) -> Vec<String> {
    answers
        .filter_map(|rdata| match rdata {
            RData::CNAME(cname) => Some(cname.0.to_string()),
            _ => None,
        })
        .collect()
}

/// Factory for DnsRegionResolver
pub struct DnsRegionResolverFactory;

impl RegionResolverFactory for DnsRegionResolverFactory {
    fn create(&self, config: &ResolverSourceConfig) -> Result<Box<dyn RegionResolver>> {
        let ResolverSourceConfig::Dns {
            record_name,
            nameservers,
            timeout_secs,
        } = config
        else {
            return Err(Error::config(
                "DNS resolver factory requires a dns resolver config",
            ));
        };

        let timeout = Duration::from_secs(*timeout_secs);

        if nameservers.is_empty() {
            return Ok(Box::new(DnsRegionResolver::from_system_conf(
                record_name.clone(),
                timeout,
            )?));
        }

        let addrs = parse_nameservers(nameservers)?;
        Ok(Box::new(DnsRegionResolver::with_nameservers(
            record_name.clone(),
            addrs,
            timeout,
        )?))
    }
}

/// Parse `ip` or `ip:port` nameserver entries, defaulting to port 53
pub fn parse_nameservers(entries: &[String]) -> Result<Vec<SocketAddr>> {
    entries
        .iter()
        .map(|entry| {
            let entry = entry.trim();
            entry
                .parse::<SocketAddr>()
                .or_else(|_| {
                    entry
                        .parse::<std::net::IpAddr>()
                        .map(|ip| SocketAddr::new(ip, 53))
                })
                .map_err(|_| Error::config(format!("Invalid nameserver address: {}", entry)))
        })
        .collect()
}

/// Register the DNS resolver with a registry
pub fn register(registry: &ResolverRegistry) {
    registry.register_resolver(RESOLVER_NAME, Box::new(DnsRegionResolverFactory));
}
