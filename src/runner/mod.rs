pub mod orchestrator;
pub mod plan;
mod types;

pub use orchestrator::run_checks;
pub use plan::{build_plan, render_command_line};
pub use types::{CheckFailed, RunEvent, RunOptions, RunState, RunSummary};
