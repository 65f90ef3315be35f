// # Region Resolver Implementations
//
// Resolvers that need no external dependencies live here. The DNS-backed
// resolver lives in the `regionwatch-dns` crate.

pub mod static_region;

pub use static_region::{StaticRegionResolver, StaticRegionResolverFactory};
