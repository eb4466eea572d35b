//! Builtin pipeline stages: fetch, enter, test.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::stage::{Stage, StageContext};

/// Clone the configured repository into the checkout directory.
///
/// Refuses to run if the checkout directory already exists: proceeding
/// against a stale tree is a correctness hazard, so the condition is
/// surfaced instead of silently reusing or overwriting it.
pub struct FetchSource;

#[async_trait]
impl Stage for FetchSource {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn run(&self, config: &PipelineConfig, ctx: &mut StageContext) -> Result<()> {
        if ctx.checkout_dir.exists() {
            return Err(PipelineError::Fetch(format!(
                "destination {} already exists; remove it or point the pipeline elsewhere",
                ctx.checkout_dir.display()
            )));
        }

        debug!(url = %config.repository_url, dest = %ctx.checkout_dir.display(), "cloning");

        // Inherited stdio so clone progress reaches the console as it happens.
        let status = Command::new("git")
            .arg("clone")
            .arg(&config.repository_url)
            .arg(&ctx.checkout_dir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(PipelineError::Fetch(format!(
                "git clone of {} exited with {}",
                config.repository_url, status
            )));
        }

        Ok(())
    }
}

/// Repoint the working directory at the fetched checkout.
///
/// The directory being absent here means fetch did not actually produce a
/// tree; checked anyway so the failure names this stage rather than
/// surfacing later as a confusing spawn error.
pub struct EnterWorkdir;

#[async_trait]
impl Stage for EnterWorkdir {
    fn name(&self) -> &'static str {
        "enter"
    }

    async fn run(&self, _config: &PipelineConfig, ctx: &mut StageContext) -> Result<()> {
        if !ctx.checkout_dir.is_dir() {
            return Err(PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("checkout directory {} is missing", ctx.checkout_dir.display()),
            )));
        }

        ctx.working_dir = ctx.checkout_dir.clone();
        Ok(())
    }
}

/// Run the configured test command inside the working directory.
///
/// Output streams to the console in real time (inherited stdio), so a
/// long-running failure is observable before the command finishes. The
/// runner blocks until the child exits; there is no timeout.
pub struct RunTests;

#[async_trait]
impl Stage for RunTests {
    fn name(&self) -> &'static str {
        "test"
    }

    async fn run(&self, config: &PipelineConfig, ctx: &mut StageContext) -> Result<()> {
        debug!(command = %config.test_script, dir = %ctx.working_dir().display(), "running tests");

        let status = Command::new("sh")
            .arg("-c")
            .arg(&config.test_script)
            .current_dir(ctx.working_dir())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(PipelineError::CommandFailed {
                command: config.test_script.clone(),
                code: status.code(),
            });
        }

        Ok(())
    }
}
