// # regionwatch-core
//
// Core library for region-aware clients of multi-region services.
//
// ## Architecture Overview
//
// A multi-region service publishes its active region through a well-known
// indirection record. This library keeps a client bound to that region and
// tells callers when the region moves so in-flight work restarts instead of
// talking to a stale endpoint:
// - **RegionResolver**: Trait for looking up the active region
// - **ClientFactory**: Trait for building a client bound to a region
// - **RegionBoundClientCache**: One cached client, re-validated on every access
// - **WorkflowRunner**: Re-runs a workflow from scratch on region change
// - **ResolverRegistry**: Plugin-based registry for region resolvers
//
// ## Control Flow
//
// Two errors drive everything:
// 1. `Error::ActiveRegionChanged` → the runner restarts the workflow
// 2. `Error::Resolution` → the runner aborts the run

pub mod traits;
pub mod region;
pub mod cache;
pub mod runner;
pub mod registry;
pub mod resolver;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{RegionResolver, ClientFactory, Workflow, workflow_fn};
pub use region::ActiveRegion;
pub use cache::RegionBoundClientCache;
pub use runner::{WorkflowRunner, WorkflowOutcome, RunReport, RunnerEvent};
pub use registry::ResolverRegistry;
pub use config::{RegionwatchConfig, ResolverSourceConfig, RunnerConfig};
pub use error::{Error, Result};
pub use resolver::StaticRegionResolver;
