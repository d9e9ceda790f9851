pub mod run;
pub mod types;

pub use run::{normalize_status, spawn, spawn_failure_status};
pub use types::{
    CheckCommand, NOT_EXECUTABLE_STATUS, NOT_FOUND_STATUS, OutputLine, ProcessResult,
    TIMEOUT_STATUS,
};
