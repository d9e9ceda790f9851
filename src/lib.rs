//! Run an ordered list of external project checks, stopping at the first
//! one that exits non-zero and reporting its exit status unchanged.

pub mod config;
pub mod process;
pub mod runner;
