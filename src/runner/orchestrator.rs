use crate::process::{self, CheckCommand, OutputLine};

use super::plan::render_command_line;
use super::types::{CheckFailed, RunEvent, RunOptions, RunState, RunSummary};

/// Run `commands` in order, stopping at the first non-zero exit status.
///
/// Each check runs to completion in `options.base_path` before the next one
/// starts. Output bytes are handed to `on_event` unmodified. Returns the
/// first failure, if any; later checks are never spawned.
pub fn run_checks<F>(
    commands: &[CheckCommand],
    options: &RunOptions,
    mut on_event: F,
) -> Result<RunSummary, CheckFailed>
where
    F: FnMut(RunEvent<'_>),
{
    let total = commands.len();
    let mut state = RunState::Pending.start(total);

    while let RunState::Running(index) = state {
        let command = &commands[index];

        if options.verbose {
            on_event(RunEvent::Trace(format!("+ {}", render_command_line(command))));
        }
        tracing::info!(check = %command.name, index, total, "running check");
        on_event(RunEvent::CheckStarted { index, command });

        let status = run_one(index, command, options, &mut on_event);
        on_event(RunEvent::CheckFinished { index, status });

        state = state.advance(status, total);
        if let RunState::Failed(status) = state {
            tracing::warn!(check = %command.name, status, "check failed, skipping the rest");
            return Err(CheckFailed {
                index,
                tool: command.name.clone(),
                status,
            });
        }
        tracing::debug!(check = %command.name, "check passed");
    }

    Ok(RunSummary { checks_run: total })
}

/// Spawn one check, forward its output, and return its exit status.
fn run_one<F>(index: usize, command: &CheckCommand, options: &RunOptions, on_event: &mut F) -> i32
where
    F: FnMut(RunEvent<'_>),
{
    let rx = match process::spawn(command, &options.base_path) {
        Ok(rx) => rx,
        Err(e) => {
            let status = process::spawn_failure_status(&e);
            tracing::debug!(check = %command.name, error = %e, status, "spawn failed");
            on_event(RunEvent::Stderr {
                index,
                bytes: format!("checkrun: {e:#}\n").into_bytes(),
            });
            return status;
        }
    };

    for line in rx {
        match line {
            OutputLine::Stdout(bytes) => on_event(RunEvent::Stdout { index, bytes }),
            OutputLine::Stderr(bytes) => on_event(RunEvent::Stderr { index, bytes }),
            OutputLine::Done(result) => {
                if result.timed_out {
                    on_event(RunEvent::Stderr {
                        index,
                        bytes: format!("checkrun: `{}` timed out\n", command.name).into_bytes(),
                    });
                }
                return result.status;
            }
        }
    }

    // The supervisor always sends `Done`; a closed channel means it died.
    1
}
