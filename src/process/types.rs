use std::time::Duration;

/// Status reported when a check is killed for exceeding its timeout.
pub const TIMEOUT_STATUS: i32 = 124;
/// Status reported when the program exists but cannot be executed.
pub const NOT_EXECUTABLE_STATUS: i32 = 126;
/// Status reported when the program cannot be found or spawned.
pub const NOT_FOUND_STATUS: i32 = 127;

/// A fully expanded check invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCommand {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

/// Outcome of a single process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Normalised exit status: the exit code, `128 + signal`, or one of the
    /// `*_STATUS` constants.
    pub status: i32,
    pub timed_out: bool,
}

/// Streamed output from a running check.
///
/// Output chunks are raw bytes, one line each including its trailing
/// newline (the last chunk may lack one). No decoding is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Done(ProcessResult),
}
