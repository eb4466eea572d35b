//! gantry - minimal pipeline automation
//!
//! ## Commands
//!
//! - `configure`: prompt for pipeline settings and persist them
//! - `run`: load the saved settings and execute the fetch/enter/test pipeline

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use gantry_core::{ConfigStore, PipelineConfig, PipelineRunner, StageContext, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "gantry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pipeline automation: configure once, then fetch, enter, test", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Path to the pipeline config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for pipeline settings and save them to the config file
    Configure {
        /// Repository URL (prompted for when omitted)
        #[arg(long)]
        repository_url: Option<String>,

        /// Branch name (prompted for when omitted; may be empty)
        #[arg(long)]
        branch_name: Option<String>,

        /// Test command to run in the fetched tree (prompted for when omitted)
        #[arg(long)]
        test_script: Option<String>,
    },

    /// Execute the pipeline described by the saved config
    Run {
        /// Directory the pipeline operates under (checkout is created here)
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    gantry_core::init_tracing(cli.json, level);

    let store = ConfigStore::at(&cli.config);

    match cli.command {
        Some(Commands::Configure {
            repository_url,
            branch_name,
            test_script,
        }) => cmd_configure(&store, repository_url, branch_name, test_script),
        Some(Commands::Run { workspace }) => cmd_run(&store, &workspace).await,
        None => {
            // Bare invocation prints guidance and exits cleanly.
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Read one line from stdin after printing a prompt.
fn prompt_line(question: &str) -> Result<String> {
    print!("{question}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("failed to read input")?;
    Ok(input.trim().to_string())
}

/// Take the flag value if given, otherwise prompt for it.
fn resolve(flag: Option<String>, question: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value),
        None => prompt_line(question),
    }
}

fn cmd_configure(
    store: &ConfigStore,
    repository_url: Option<String>,
    branch_name: Option<String>,
    test_script: Option<String>,
) -> Result<()> {
    println!("Configuring pipeline...");

    let config = PipelineConfig {
        repository_url: resolve(repository_url, "Enter repository URL")?,
        branch_name: resolve(branch_name, "Enter branch name")?,
        test_script: resolve(test_script, "Enter test command")?,
    };

    store
        .save(&config)
        .context("failed to save pipeline config")?;

    println!("Pipeline configuration saved to {}", store.path().display());
    Ok(())
}

async fn cmd_run(store: &ConfigStore, workspace: &PathBuf) -> Result<()> {
    let config = store
        .load()
        .with_context(|| format!("failed to load pipeline config from {}", store.path().display()))?;

    println!("Repository URL: {}", config.repository_url);
    println!("Branch name:    {}", config.branch_name);
    println!("Test command:   {}", config.test_script);
    println!();

    info!(workspace = %workspace.display(), "running pipeline");

    let runner = PipelineRunner::with_default_stages();
    let mut ctx = StageContext::new(workspace.clone());
    let report = runner.execute(&config, &mut ctx).await;

    println!();
    for stage in &report.stages {
        let mark = if stage.succeeded { "✓" } else { "✗" };
        println!("  {} {} ({}ms)", mark, stage.stage_name, stage.duration_ms);
    }
    println!();

    if report.success() {
        println!("Pipeline completed successfully");
        Ok(())
    } else {
        let cause = report
            .failure
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown failure".to_string());
        anyhow::bail!("pipeline failed: {cause}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn configure_with_flags_skips_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("pipeline_config.yaml"));

        cmd_configure(
            &store,
            Some("https://example.com/r.git".to_string()),
            Some("main".to_string()),
            Some("make test".to_string()),
        )
        .unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.repository_url, "https://example.com/r.git");
        assert_eq!(config.branch_name, "main");
        assert_eq!(config.test_script, "make test");
    }

    #[tokio::test]
    async fn run_with_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("absent.yaml"));

        let result = cmd_run(&store, &dir.path().to_path_buf()).await;
        assert!(result.is_err());
    }
}
