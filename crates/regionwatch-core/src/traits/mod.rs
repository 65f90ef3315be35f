//! Core traits for regionwatch
//!
//! This module defines the seams between the core and its collaborators.
//!
//! - [`RegionResolver`]: Look up the currently active region
//! - [`ClientFactory`]: Build a client bound to a region
//! - [`Workflow`]: A unit of work the runner restarts on region change

pub mod region_resolver;
pub mod client_factory;
pub mod workflow;

pub use region_resolver::{RegionResolver, RegionResolverFactory};
pub use client_factory::ClientFactory;
pub use workflow::{Workflow, FnWorkflow, workflow_fn};
