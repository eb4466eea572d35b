//! Sequential pipeline execution with first-failure short-circuit.

use std::time::Instant;

use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::stage::{Stage, StageContext, StageReport};
use crate::stages::{EnterWorkdir, FetchSource, RunTests};

/// Runner lifecycle. `Pending` before execution, `Running` while a stage is
/// in flight, then exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running { stage_index: usize },
    Succeeded,
    Failed { stage_index: usize },
}

impl PipelineState {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded | PipelineState::Failed { .. })
    }
}

/// Outcome of a complete pipeline execution.
///
/// Failures are ordinary data here, not `Err`: the runner always produces a
/// report, and the caller decides how to surface it.
#[derive(Debug)]
pub struct PipelineReport {
    /// Per-stage outcomes, in execution order. Stages after the first
    /// failure never ran and have no entry.
    pub stages: Vec<StageReport>,

    /// Terminal state the run reached.
    pub state: PipelineState,

    /// Cause of the failure, wrapped with the stage it occurred in.
    pub failure: Option<PipelineError>,
}

impl PipelineReport {
    /// Whether every stage completed successfully.
    pub fn success(&self) -> bool {
        self.state == PipelineState::Succeeded
    }

    /// Name of the failed stage, if any.
    pub fn failed_stage(&self) -> Option<&str> {
        match self.state {
            PipelineState::Failed { stage_index } => {
                self.stages.get(stage_index).map(|s| s.stage_name.as_str())
            }
            _ => None,
        }
    }
}

/// Executes an ordered stage list against a config, stopping at the first
/// failure. No cleanup or rollback is attempted on failure; side effects of
/// earlier stages (the fetched tree in particular) are left in place for
/// inspection.
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineRunner {
    /// Runner over an explicit stage list.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Runner with the builtin sequence: fetch, enter, test.
    pub fn with_default_stages() -> Self {
        Self::new(vec![
            Box::new(FetchSource),
            Box::new(EnterWorkdir),
            Box::new(RunTests),
        ])
    }

    /// Names of the configured stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Drive the stages strictly in sequence.
    ///
    /// Stage `n + 1` never starts unless stage `n` reported success. On the
    /// first failure the cause is wrapped with the stage name and execution
    /// stops; on all-success the report is `Succeeded`.
    pub async fn execute(
        &self,
        config: &PipelineConfig,
        ctx: &mut StageContext,
    ) -> PipelineReport {
        let mut reports = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            info!(stage = stage.name(), stage_index = index, "starting stage");

            let start = Instant::now();
            let outcome = stage.run(config, ctx).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let succeeded = outcome.is_ok();
            reports.push(StageReport {
                stage_name: stage.name().to_string(),
                duration_ms,
                succeeded,
            });

            if let Err(cause) = outcome {
                error!(stage = stage.name(), %cause, "stage failed");
                return PipelineReport {
                    stages: reports,
                    state: PipelineState::Failed { stage_index: index },
                    failure: Some(cause.in_stage(stage.name())),
                };
            }

            info!(stage = stage.name(), duration_ms, "stage completed");
        }

        PipelineReport {
            stages: reports,
            state: PipelineState::Succeeded,
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_order_is_fixed() {
        let runner = PipelineRunner::with_default_stages();
        assert_eq!(runner.stage_names(), vec!["fetch", "enter", "test"]);
    }

    #[test]
    fn terminal_states() {
        assert!(!PipelineState::Pending.is_terminal());
        assert!(!PipelineState::Running { stage_index: 0 }.is_terminal());
        assert!(PipelineState::Succeeded.is_terminal());
        assert!(PipelineState::Failed { stage_index: 2 }.is_terminal());
    }

    #[test]
    fn failed_stage_resolves_name() {
        let report = PipelineReport {
            stages: vec![
                StageReport {
                    stage_name: "fetch".to_string(),
                    duration_ms: 10,
                    succeeded: true,
                },
                StageReport {
                    stage_name: "enter".to_string(),
                    duration_ms: 1,
                    succeeded: false,
                },
            ],
            state: PipelineState::Failed { stage_index: 1 },
            failure: Some(PipelineError::Fetch("x".to_string()).in_stage("enter")),
        };

        assert!(!report.success());
        assert_eq!(report.failed_stage(), Some("enter"));
    }
}
