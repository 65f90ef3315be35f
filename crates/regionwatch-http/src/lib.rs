// # Regional HTTP Service Client
//
// This crate provides the service-facing half of regionwatch:
//
// - `RegionalHttpClient` / `RegionalHttpClientFactory`: a `reqwest` client
//   bound to the endpoint of the active region, built by the
//   `RegionBoundClientCache`
// - `EventListingWorkflow`: lists recent events page by page and fetches
//   their details, obtaining a client from the cache before every request
//
// ## Architectural Constraints
//
// - NO retry logic (restart policy is owned by `WorkflowRunner`)
// - NO region caching (owned by `RegionBoundClientCache`)
// - `ActiveRegionChanged` and `Resolution` errors are propagated unmodified

pub mod client;
pub mod events;

pub use client::{RegionalHttpClient, RegionalHttpClientFactory};
pub use events::{EventFilter, EventListingWorkflow, EventPage, EventSummary};
