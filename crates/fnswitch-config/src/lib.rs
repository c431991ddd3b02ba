mod raw;
mod loader;
pub mod error;

pub use loader::{load_config, read_config_file, resolve};
pub use raw::{RawConfig, RawEndpoints};
pub use error::ConfigError;
