//! Stage capability trait and execution context.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Directory name the source tree is fetched into, under the workspace root.
pub const CHECKOUT_DIR_NAME: &str = "project-directory";

/// Working-directory state threaded through stage calls.
///
/// Kept as an explicit value rather than mutating the process-global current
/// directory, so two pipelines in one process cannot interfere and tests stay
/// isolated.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Root under which the pipeline operates.
    pub workspace_root: PathBuf,

    /// Target directory for the fetched source tree.
    pub checkout_dir: PathBuf,

    /// Directory commands execute in. Starts at the workspace root; the
    /// enter stage repoints it at the checkout.
    pub working_dir: PathBuf,
}

impl StageContext {
    /// Context rooted at `workspace_root`, with the checkout directory at
    /// the conventional location beneath it.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let checkout_dir = workspace_root.join(CHECKOUT_DIR_NAME);
        let working_dir = workspace_root.clone();
        Self {
            workspace_root,
            checkout_dir,
            working_dir,
        }
    }

    /// Context with an explicit checkout directory.
    pub fn with_checkout_dir(mut self, checkout_dir: impl Into<PathBuf>) -> Self {
        self.checkout_dir = checkout_dir.into();
        self
    }

    /// Directory the next command would run in.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// A single pipeline step.
///
/// The runner holds an ordered list of these and drives them strictly in
/// sequence; a stage signals failure by returning `Err`, which halts the
/// pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short stable name, used in reports and error wrapping.
    fn name(&self) -> &'static str;

    /// Execute the stage against the config and mutable context.
    async fn run(&self, config: &PipelineConfig, ctx: &mut StageContext) -> Result<()>;
}

/// Outcome of one stage execution. Transient; never persisted.
#[derive(Debug)]
pub struct StageReport {
    /// Stage name.
    pub stage_name: String,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the stage succeeded.
    pub succeeded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_paths_derive_from_workspace_root() {
        let ctx = StageContext::new("/tmp/ws");
        assert_eq!(ctx.workspace_root, PathBuf::from("/tmp/ws"));
        assert_eq!(ctx.checkout_dir, PathBuf::from("/tmp/ws/project-directory"));
        assert_eq!(ctx.working_dir(), Path::new("/tmp/ws"));
    }

    #[test]
    fn checkout_dir_override() {
        let ctx = StageContext::new("/tmp/ws").with_checkout_dir("/tmp/elsewhere");
        assert_eq!(ctx.checkout_dir, PathBuf::from("/tmp/elsewhere"));
    }
}
