mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, load, load_from};
pub use types::{CheckSpec, Config, default_checks};
