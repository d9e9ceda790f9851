use std::time::Duration;

use anyhow::{Result, bail};

use crate::config::{CheckSpec, Config};
use crate::process::CheckCommand;

const SRC_PLACEHOLDER: &str = "{src}";
const TESTS_PLACEHOLDER: &str = "{tests}";

/// Expand every declared check into a runnable command, in declared order.
pub fn build_plan(cfg: &Config) -> Result<Vec<CheckCommand>> {
    let timeout = cfg.timeout.map(Duration::from_secs);
    cfg.checks
        .iter()
        .map(|check| expand_check(cfg, check, timeout))
        .collect()
}

fn expand_check(cfg: &Config, check: &CheckSpec, timeout: Option<Duration>) -> Result<CheckCommand> {
    let program = expand(cfg, &check.program);
    if program.trim().is_empty() {
        bail!("check `{}` has an empty program", check.display_name());
    }

    Ok(CheckCommand {
        name: check.display_name(),
        program,
        args: check.args.iter().map(|arg| expand(cfg, arg)).collect(),
        timeout,
    })
}

fn expand(cfg: &Config, value: &str) -> String {
    value
        .replace(SRC_PLACEHOLDER, &cfg.src_dir)
        .replace(TESTS_PLACEHOLDER, &cfg.tests_dir)
}

/// Shell-quoted rendering of a command, as echoed in verbose mode.
pub fn render_command_line(cmd: &CheckCommand) -> String {
    let mut words = Vec::with_capacity(cmd.args.len() + 1);
    words.push(cmd.program.as_str());
    words.extend(cmd.args.iter().map(String::as_str));
    shell_words::join(words)
}
