use std::path::PathBuf;

use thiserror::Error;

use crate::process::CheckCommand;

/// The only failure a run can end in: the first check that exited non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("check `{tool}` failed with exit status {status}")]
pub struct CheckFailed {
    pub index: usize,
    pub tool: String,
    pub status: i32,
}

/// Settings shared by every check in a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory for every check.
    pub base_path: PathBuf,
    /// Echo each command line before running it.
    pub verbose: bool,
}

/// Result of a run in which every check passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub checks_run: usize,
}

/// Progress of a run. `Failed` and `Succeeded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running(usize),
    Failed(i32),
    Succeeded,
}

impl RunState {
    /// Leave `Pending`: an empty plan succeeds immediately.
    pub fn start(self, total: usize) -> Self {
        match self {
            RunState::Pending if total == 0 => RunState::Succeeded,
            RunState::Pending => RunState::Running(0),
            other => other,
        }
    }

    /// Record the exit status of the running check.
    pub fn advance(self, status: i32, total: usize) -> Self {
        match self {
            RunState::Running(_) if status != 0 => RunState::Failed(status),
            RunState::Running(i) if i + 1 < total => RunState::Running(i + 1),
            RunState::Running(_) => RunState::Succeeded,
            other => other,
        }
    }
}

/// Events emitted while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent<'a> {
    /// Command line echoed before a check runs (verbose mode only).
    Trace(String),
    CheckStarted {
        index: usize,
        command: &'a CheckCommand,
    },
    /// Raw output chunk, passed through without decoding.
    Stdout {
        index: usize,
        bytes: Vec<u8>,
    },
    Stderr {
        index: usize,
        bytes: Vec<u8>,
    },
    CheckFinished {
        index: usize,
        status: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_succeeds_on_start() {
        assert_eq!(RunState::Pending.start(0), RunState::Succeeded);
    }

    #[test]
    fn walks_through_every_check() {
        let mut state = RunState::Pending.start(3);
        assert_eq!(state, RunState::Running(0));
        state = state.advance(0, 3);
        assert_eq!(state, RunState::Running(1));
        state = state.advance(0, 3);
        assert_eq!(state, RunState::Running(2));
        state = state.advance(0, 3);
        assert_eq!(state, RunState::Succeeded);
        assert_eq!(state.advance(0, 3), RunState::Succeeded);
    }

    #[test]
    fn first_non_zero_status_is_terminal() {
        let state = RunState::Running(1).advance(3, 3);
        assert_eq!(state, RunState::Failed(3));
        assert_eq!(state.advance(0, 3), RunState::Failed(3));
        assert_eq!(state.start(3), RunState::Failed(3));
    }

    #[test]
    fn check_failed_message_names_tool_and_status() {
        let err = CheckFailed {
            index: 2,
            tool: "black".into(),
            status: 1,
        };
        assert_eq!(err.to_string(), "check `black` failed with exit status 1");
    }
}
