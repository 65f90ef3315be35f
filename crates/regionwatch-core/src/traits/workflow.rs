// # Workflow Trait
//
// A workflow is a caller-defined unit of work that must be restarted from the
// beginning, never resumed, when the active region changes mid-execution.
//
// Workflows obtain their clients through a shared
// [`RegionBoundClientCache`](crate::cache::RegionBoundClientCache) and let
// `ActiveRegionChanged` and `Resolution` errors escape unmodified so the
// [`WorkflowRunner`](crate::runner::WorkflowRunner) can act on them.

use async_trait::async_trait;
use std::future::Future;

/// A restartable unit of work
#[async_trait]
pub trait Workflow: Send {
    /// Run the workflow once, from the beginning
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The workflow finished
    /// - `Err(Error::ActiveRegionChanged)`: Restart requested
    /// - `Err(_)`: Any other error aborts the run
    async fn execute(&mut self) -> Result<(), crate::Error>;

    /// Workflow name (for logging)
    fn name(&self) -> &str {
        "workflow"
    }
}

/// Adapter turning an async closure into a [`Workflow`]
pub struct FnWorkflow<F> {
    name: String,
    operation: F,
}

/// Wrap `operation` as a named [`Workflow`]
///
/// ```rust,ignore
/// let cache = Arc::new(cache);
/// let workflow = workflow_fn("health-check", move || {
///     let cache = Arc::clone(&cache);
///     async move {
///         let client = cache.get_client().await?;
///         client.ping().await
///     }
/// });
/// ```
pub fn workflow_fn<F, Fut>(name: impl Into<String>, operation: F) -> FnWorkflow<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<(), crate::Error>> + Send,
{
    FnWorkflow {
        name: name.into(),
        operation,
    }
}

#[async_trait]
impl<F, Fut> Workflow for FnWorkflow<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<(), crate::Error>> + Send,
{
    async fn execute(&mut self) -> Result<(), crate::Error> {
        (self.operation)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
