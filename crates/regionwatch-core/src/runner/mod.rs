//! Restart-driven workflow runner
//!
//! The WorkflowRunner is responsible for:
//! - Executing a workflow from the beginning
//! - Restarting it whenever the active region changes mid-execution
//! - Aborting the run when the active region cannot be resolved
//! - Emitting events for monitoring/logging
//!
//! ## Event Flow
//!
//! 1. Execute the workflow
//! 2. `Ok(())` → run completed
//! 3. `ActiveRegionChanged` → log, restart from step 1
//! 4. Any other error → log at error severity, run aborted
//!
//! Restarts are unbounded unless [`RunnerConfig::max_restarts`] is set.

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::region::ActiveRegion;
use crate::traits::Workflow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Outcome of a workflow attempt or run
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// The workflow finished normally
    Completed,

    /// The active region changed; the workflow must start over
    RestartRequested {
        old_region: ActiveRegion,
        new_region: ActiveRegion,
    },

    /// The workflow cannot make progress in this run
    Aborted { cause: Error },
}

impl WorkflowOutcome {
    /// Whether the outcome is `Completed`
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed)
    }
}

/// Summary of a full run
#[derive(Debug)]
pub struct RunReport {
    /// Final outcome: `Completed` or `Aborted`
    pub outcome: WorkflowOutcome,

    /// Number of times the workflow was executed
    pub attempts: usize,

    /// Region transitions that triggered a restart, in order
    pub restarts: Vec<(ActiveRegion, ActiveRegion)>,
}

/// Events emitted by the WorkflowRunner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerEvent {
    /// Run started
    Started { workflow: String },

    /// An attempt is about to execute the workflow
    AttemptStarted { attempt: usize },

    /// The active region changed during an attempt
    RegionChanged {
        old: ActiveRegion,
        new: ActiveRegion,
        attempt: usize,
    },

    /// The workflow completed
    Completed { attempts: usize },

    /// The run was aborted
    Aborted { reason: String, attempts: usize },
}

/// Runs a workflow, restarting it on active region changes
pub struct WorkflowRunner {
    /// Restart limits and delays
    config: RunnerConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<RunnerEvent>,
}

impl WorkflowRunner {
    /// Create a new runner
    ///
    /// # Returns
    ///
    /// A tuple of (runner, event_receiver) where event_receiver yields runner events
    pub fn new(config: RunnerConfig) -> Result<(Self, mpsc::Receiver<RunnerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        Ok((
            Self {
                config,
                event_tx: tx,
            },
            rx,
        ))
    }

    /// Run `workflow` until it completes or the run is aborted
    ///
    /// The returned report's outcome is never `RestartRequested`.
    pub async fn run<W>(&self, workflow: &mut W) -> RunReport
    where
        W: Workflow + ?Sized,
    {
        self.emit_event(RunnerEvent::Started {
            workflow: workflow.name().to_string(),
        });

        let mut attempts = 0;
        let mut restarts = Vec::new();

        loop {
            attempts += 1;
            self.emit_event(RunnerEvent::AttemptStarted { attempt: attempts });

            match self.run_attempt(workflow).await {
                WorkflowOutcome::Completed => {
                    info!(
                        workflow = workflow.name(),
                        attempts, "Workflow completed"
                    );
                    self.emit_event(RunnerEvent::Completed { attempts });
                    return RunReport {
                        outcome: WorkflowOutcome::Completed,
                        attempts,
                        restarts,
                    };
                }
                WorkflowOutcome::RestartRequested {
                    old_region,
                    new_region,
                } => {
                    info!(
                        workflow = workflow.name(),
                        old_region = %old_region,
                        new_region = %new_region,
                        "The active region has changed. Restarting the workflow using the new active region"
                    );
                    self.emit_event(RunnerEvent::RegionChanged {
                        old: old_region.clone(),
                        new: new_region.clone(),
                        attempt: attempts,
                    });
                    restarts.push((old_region, new_region));

                    if let Some(max_restarts) = self.config.max_restarts
                        && restarts.len() > max_restarts
                    {
                        let cause = Error::RestartLimitExceeded {
                            restarts: max_restarts,
                        };
                        return self.abort(workflow.name(), cause, attempts, restarts);
                    }

                    if self.config.restart_delay_ms > 0 {
                        tokio::time::sleep(tokio::time::Duration::from_millis(
                            self.config.restart_delay_ms,
                        ))
                        .await;
                    }
                }
                WorkflowOutcome::Aborted { cause } => {
                    return self.abort(workflow.name(), cause, attempts, restarts);
                }
            }
        }
    }

    /// Execute `workflow` once and classify the result
    ///
    /// # Returns
    ///
    /// - `Completed`: the workflow returned `Ok(())`
    /// - `RestartRequested`: an `ActiveRegionChanged` error escaped
    /// - `Aborted`: any other error escaped
    pub async fn run_attempt<W>(&self, workflow: &mut W) -> WorkflowOutcome
    where
        W: Workflow + ?Sized,
    {
        debug!(workflow = workflow.name(), "Executing workflow");

        match workflow.execute().await {
            Ok(()) => WorkflowOutcome::Completed,
            Err(Error::ActiveRegionChanged { old, new }) => WorkflowOutcome::RestartRequested {
                old_region: old,
                new_region: new,
            },
            Err(cause) => WorkflowOutcome::Aborted { cause },
        }
    }

    fn abort(
        &self,
        workflow: &str,
        cause: Error,
        attempts: usize,
        restarts: Vec<(ActiveRegion, ActiveRegion)>,
    ) -> RunReport {
        if cause.is_resolution() {
            error!(workflow, attempts, "Error looking up active region: {}", cause);
        } else {
            error!(workflow, attempts, "Workflow aborted: {}", cause);
        }

        self.emit_event(RunnerEvent::Aborted {
            reason: cause.to_string(),
            attempts,
        });

        RunReport {
            outcome: WorkflowOutcome::Aborted { cause },
            attempts,
            restarts,
        }
    }

    /// Emit a runner event
    fn emit_event(&self, event: RunnerEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Runner event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::workflow_fn;

    #[tokio::test]
    async fn attempt_classifies_region_change() {
        let (runner, _rx) = WorkflowRunner::new(RunnerConfig::default()).unwrap();
        let mut workflow = workflow_fn("flip", || async {
            Err(Error::ActiveRegionChanged {
                old: ActiveRegion::new("us-east-1"),
                new: ActiveRegion::new("us-west-2"),
            })
        });

        match runner.run_attempt(&mut workflow).await {
            WorkflowOutcome::RestartRequested {
                old_region,
                new_region,
            } => {
                assert_eq!(old_region.as_str(), "us-east-1");
                assert_eq!(new_region.as_str(), "us-west-2");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn attempt_aborts_on_other_errors() {
        let (runner, _rx) = WorkflowRunner::new(RunnerConfig::default()).unwrap();
        let mut workflow = workflow_fn("broken", || async { Err(Error::service("throttled")) });

        let outcome = runner.run_attempt(&mut workflow).await;
        assert!(matches!(
            outcome,
            WorkflowOutcome::Aborted {
                cause: Error::Service(_)
            }
        ));
    }

    #[test]
    fn rejects_zero_capacity_channel() {
        let config = RunnerConfig {
            event_channel_capacity: 0,
            ..RunnerConfig::default()
        };
        assert!(WorkflowRunner::new(config).is_err());
    }

    #[test]
    fn runner_events_compare_by_value() {
        let event = RunnerEvent::RegionChanged {
            old: ActiveRegion::new("a-1"),
            new: ActiveRegion::new("b-2"),
            attempt: 1,
        };
        assert_eq!(event.clone(), event);
    }
}
