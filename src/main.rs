use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checkrun::config::{self, Config};
use checkrun::process::CheckCommand;
use checkrun::runner::{self, RunEvent, RunOptions};

/// Exit status for configuration and usage errors raised before any check runs.
const CONFIG_ERROR_STATUS: i32 = 2;

/// Run the project's checks in order, stopping at the first failure.
#[derive(Debug, Parser)]
#[command(name = "checkrun", version, about)]
struct Cli {
    /// Project directory the checks run in [default: current directory].
    #[arg(short = 'C', long = "base-path", value_name = "DIR")]
    base_path: Option<PathBuf>,

    /// Config file [default: <base-path>/.checkrun.yaml].
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Echo each command before running it.
    #[arg(short, long)]
    verbose: bool,

    /// Print the planned commands in order and exit without running them.
    #[arg(long)]
    list: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let (cfg, base_path) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("checkrun: {e:#}");
            process::exit(CONFIG_ERROR_STATUS);
        }
    };

    let plan = match runner::build_plan(&cfg) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("checkrun: {e:#}");
            process::exit(CONFIG_ERROR_STATUS);
        }
    };

    if cli.list {
        print_plan(&plan);
        return;
    }

    let options = RunOptions {
        base_path,
        verbose: cli.verbose || cfg.verbose,
    };

    match runner::run_checks(&plan, &options, print_event) {
        Ok(summary) => {
            tracing::debug!(checks = summary.checks_run, "all checks passed");
        }
        Err(failed) => {
            tracing::debug!(error = %failed, "run aborted");
            process::exit(failed.status);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Resolve the base path and load the config that applies to it.
fn prepare(cli: &Cli) -> Result<(Config, PathBuf)> {
    let base_path = match &cli.base_path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    if !base_path.is_dir() {
        anyhow::bail!("base path {} is not a directory", base_path.display());
    }

    let cfg = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(&base_path)?,
    };
    Ok((cfg, base_path))
}

fn print_plan(plan: &[CheckCommand]) {
    let mut stdout = io::stdout().lock();
    for cmd in plan {
        let _ = writeln!(stdout, "{}: {}", cmd.name, runner::render_command_line(cmd));
    }
}

/// Tool output goes to the stream it came from; traces go to stderr.
fn print_event(event: RunEvent<'_>) {
    match event {
        RunEvent::Stdout { bytes, .. } => {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(&bytes);
            let _ = stdout.flush();
        }
        RunEvent::Stderr { bytes, .. } => {
            let _ = io::stderr().lock().write_all(&bytes);
        }
        RunEvent::Trace(line) => {
            let _ = writeln!(io::stderr().lock(), "{line}");
        }
        RunEvent::CheckStarted { .. } | RunEvent::CheckFinished { .. } => {}
    }
}
