// # regionwatchd
//
// Lists recent service events against the currently active region, restarting
// the listing whenever the active region changes mid-run.
//
// This binary is a THIN integration layer: region detection, client caching
// and restart policy live in regionwatch-core. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering resolvers and building the client cache
// 4. Running the event listing workflow
//
// ## Configuration
//
// ### Region resolution
// - `REGIONWATCH_RESOLVER_TYPE`: dns (default) or static
// - `REGIONWATCH_RECORD_NAME`: Well-known CNAME (default global.health.amazonaws.com)
// - `REGIONWATCH_NAMESERVERS`: Comma-separated nameservers (default: system config)
// - `REGIONWATCH_DNS_TIMEOUT_SECS`: Per-query timeout (default 5)
// - `REGIONWATCH_STATIC_REGION`: Region for the static resolver
//
// ### Service
// - `REGIONWATCH_ENDPOINT_TEMPLATE`: Endpoint URL with `{region}`
// - `REGIONWATCH_HTTP_TIMEOUT_SECS`: Request timeout (default 30)
// - `REGIONWATCH_EVENTS_PATH`: Event listing path (default /events)
// - `REGIONWATCH_DETAILS_PATH`: Event details path (default /event-details)
// - `REGIONWATCH_LOOKBACK_DAYS`: Event lookback window, 1 to 365 (default 7)
//
// ### Runner
// - `REGIONWATCH_MAX_RESTARTS`: Restart cap (default: unbounded)
// - `REGIONWATCH_RESTART_DELAY_MS`: Pause before restarting (default 0)
// - `REGIONWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export REGIONWATCH_RECORD_NAME=global.health.amazonaws.com
// export REGIONWATCH_MAX_RESTARTS=5
//
// regionwatchd
// ```

use anyhow::{Context, Result};
use regionwatch_core::config::{DEFAULT_RECORD_NAME, ResolverSourceConfig, RunnerConfig};
use regionwatch_core::{
    RegionBoundClientCache, ResolverRegistry, RunnerEvent, WorkflowOutcome, WorkflowRunner,
};
use regionwatch_http::client::{DEFAULT_ENDPOINT_TEMPLATE, DEFAULT_HTTP_TIMEOUT};
use regionwatch_http::events::{DEFAULT_DETAILS_PATH, DEFAULT_EVENTS_PATH, DEFAULT_LOOKBACK_DAYS};
use regionwatch_http::{EventListingWorkflow, RegionalHttpClientFactory};
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum RegionwatchExitCode {
    /// Workflow completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Workflow aborted (e.g. active region could not be resolved)
    Aborted = 2,
}

impl From<RegionwatchExitCode> for ExitCode {
    fn from(code: RegionwatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Longest accepted event lookback window
const MAX_LOOKBACK_DAYS: i64 = 365;

/// Application configuration
struct Config {
    resolver_type: String,
    record_name: String,
    nameservers: Vec<String>,
    dns_timeout_secs: u64,
    static_region: Option<String>,
    endpoint_template: String,
    http_timeout_secs: u64,
    events_path: String,
    details_path: String,
    lookback_days: i64,
    max_restarts: Option<usize>,
    restart_delay_ms: u64,
    log_level: String,
}

/// Read and parse an optional environment variable
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        _ => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            resolver_type: env::var("REGIONWATCH_RESOLVER_TYPE")
                .unwrap_or_else(|_| "dns".to_string()),
            record_name: env::var("REGIONWATCH_RECORD_NAME")
                .unwrap_or_else(|_| DEFAULT_RECORD_NAME.to_string()),
            nameservers: env::var("REGIONWATCH_NAMESERVERS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            dns_timeout_secs: env_parse("REGIONWATCH_DNS_TIMEOUT_SECS")?.unwrap_or(5),
            static_region: env::var("REGIONWATCH_STATIC_REGION").ok(),
            endpoint_template: env::var("REGIONWATCH_ENDPOINT_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT_TEMPLATE.to_string()),
            http_timeout_secs: env_parse("REGIONWATCH_HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT.as_secs()),
            events_path: env::var("REGIONWATCH_EVENTS_PATH")
                .unwrap_or_else(|_| DEFAULT_EVENTS_PATH.to_string()),
            details_path: env::var("REGIONWATCH_DETAILS_PATH")
                .unwrap_or_else(|_| DEFAULT_DETAILS_PATH.to_string()),
            lookback_days: env_parse("REGIONWATCH_LOOKBACK_DAYS")?
                .unwrap_or(DEFAULT_LOOKBACK_DAYS),
            max_restarts: env_parse("REGIONWATCH_MAX_RESTARTS")?,
            restart_delay_ms: env_parse("REGIONWATCH_RESTART_DELAY_MS")?.unwrap_or(0),
            log_level: env::var("REGIONWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.resolver_type.as_str() {
            "dns" => {
                if self.record_name.is_empty() {
                    anyhow::bail!("REGIONWATCH_RECORD_NAME cannot be empty");
                }
            }
            "static" => {
                if self.static_region.as_ref().is_none_or(|r| r.is_empty()) {
                    anyhow::bail!(
                        "REGIONWATCH_STATIC_REGION is required when REGIONWATCH_RESOLVER_TYPE=static. \
                        Set it via: export REGIONWATCH_STATIC_REGION=us-east-1"
                    );
                }
            }
            other => anyhow::bail!(
                "REGIONWATCH_RESOLVER_TYPE '{}' is not supported. \
                Supported types: dns, static",
                other
            ),
        }

        if !(1..=60).contains(&self.dns_timeout_secs) {
            anyhow::bail!(
                "REGIONWATCH_DNS_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                self.dns_timeout_secs
            );
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "REGIONWATCH_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            anyhow::bail!(
                "REGIONWATCH_LOOKBACK_DAYS must be between 1 and {} days. Got: {}",
                MAX_LOOKBACK_DAYS,
                self.lookback_days
            );
        }

        for (name, path) in [
            ("REGIONWATCH_EVENTS_PATH", &self.events_path),
            ("REGIONWATCH_DETAILS_PATH", &self.details_path),
        ] {
            if !path.starts_with('/') {
                anyhow::bail!("{} must start with '/'. Got: {}", name, path);
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "REGIONWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn resolver_config(&self) -> ResolverSourceConfig {
        match (self.resolver_type.as_str(), &self.static_region) {
            ("static", Some(region)) => ResolverSourceConfig::Static {
                region: region.clone(),
            },
            _ => ResolverSourceConfig::Dns {
                record_name: self.record_name.clone(),
                nameservers: self.nameservers.clone(),
                timeout_secs: self.dns_timeout_secs,
            },
        }
    }

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_restarts: self.max_restarts,
            restart_delay_ms: self.restart_delay_ms,
            ..RunnerConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return RegionwatchExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return RegionwatchExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RegionwatchExitCode::ConfigError.into();
    }

    // Sequential workflow: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RegionwatchExitCode::ConfigError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(code) => code,
            Err(e) => {
                error!("Startup error: {:#}", e);
                RegionwatchExitCode::ConfigError
            }
        }
    })
    .into()
}

/// Build the components and run the workflow
async fn run(config: Config) -> Result<RegionwatchExitCode> {
    let registry = ResolverRegistry::with_builtins();

    #[cfg(feature = "dns")]
    {
        debug!("Registering DNS resolver");
        regionwatch_dns::register(&registry);
    }

    let resolver_config = config.resolver_config();
    let resolver = registry
        .create_resolver(&resolver_config)
        .context("Failed to create region resolver")?;
    info!(resolver = resolver.resolver_name(), "Region resolver ready");

    let factory = RegionalHttpClientFactory::new(
        config.endpoint_template.clone(),
        Duration::from_secs(config.http_timeout_secs),
    )?;

    let cache = Arc::new(RegionBoundClientCache::new(resolver, Box::new(factory)));
    let mut workflow = EventListingWorkflow::new(cache)
        .with_paths(config.events_path.clone(), config.details_path.clone())
        .with_lookback_days(config.lookback_days);

    let (runner, events_rx) = WorkflowRunner::new(config.runner_config())?;
    let event_logger = tokio::spawn(log_runner_events(events_rx));

    let report = runner.run(&mut workflow).await;

    // Closing the sender lets the logger drain and finish
    drop(runner);
    if let Err(e) = event_logger.await {
        warn!("Runner event logger failed: {}", e);
    }

    match report.outcome {
        WorkflowOutcome::Completed => {
            info!(
                attempts = report.attempts,
                restarts = report.restarts.len(),
                matched_events = workflow.matched_events(),
                "Event listing finished"
            );
            Ok(RegionwatchExitCode::Completed)
        }
        WorkflowOutcome::Aborted { cause } => {
            debug!(attempts = report.attempts, cause = %cause, "Event listing aborted");
            Ok(RegionwatchExitCode::Aborted)
        }
        WorkflowOutcome::RestartRequested { .. } => {
            // run() never reports a pending restart
            Ok(RegionwatchExitCode::Aborted)
        }
    }
}

/// Trace runner events until the runner is dropped
///
/// The runner logs region changes and aborts itself.
async fn log_runner_events(events_rx: tokio::sync::mpsc::Receiver<RunnerEvent>) {
    let mut events = ReceiverStream::new(events_rx);

    while let Some(event) = events.next().await {
        debug!(event = ?event, "Runner event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            resolver_type: "dns".to_string(),
            record_name: DEFAULT_RECORD_NAME.to_string(),
            nameservers: Vec::new(),
            dns_timeout_secs: 5,
            static_region: None,
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            http_timeout_secs: 30,
            events_path: DEFAULT_EVENTS_PATH.to_string(),
            details_path: DEFAULT_DETAILS_PATH.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_restarts: None,
            restart_delay_ms: 0,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn lookback_days_are_bounded() {
        for days in [1, MAX_LOOKBACK_DAYS] {
            let config = Config {
                lookback_days: days,
                ..valid_config()
            };
            assert!(config.validate().is_ok(), "days={}", days);
        }

        for days in [0, MAX_LOOKBACK_DAYS + 1, 1_000_000_000_000] {
            let config = Config {
                lookback_days: days,
                ..valid_config()
            };
            assert!(config.validate().is_err(), "days={}", days);
        }
    }

    #[test]
    fn static_resolver_requires_region() {
        let config = Config {
            resolver_type: "static".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = Config {
            resolver_type: "static".to_string(),
            static_region: Some("eu-west-1".to_string()),
            ..valid_config()
        };
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.resolver_config(),
            ResolverSourceConfig::Static { .. }
        ));
    }
}
