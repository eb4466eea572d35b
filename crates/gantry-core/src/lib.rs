//! gantry-core - pipeline automation core
//!
//! Provides the pieces the `gantry` CLI composes:
//! - A durable YAML round-trip for [`PipelineConfig`] ([`ConfigStore`])
//! - An ordered [`Stage`] list driven by [`PipelineRunner`], halting at the
//!   first failure with the cause wrapped per stage

pub mod config;
pub mod error;
pub mod runner;
pub mod stage;
pub mod stages;
pub mod telemetry;

// Re-export key types
pub use config::{ConfigStore, PipelineConfig, DEFAULT_CONFIG_PATH};
pub use error::{PipelineError, Result};
pub use runner::{PipelineReport, PipelineRunner, PipelineState};
pub use stage::{Stage, StageContext, StageReport, CHECKOUT_DIR_NAME};
pub use stages::{EnterWorkdir, FetchSource, RunTests};
pub use telemetry::init_tracing;
