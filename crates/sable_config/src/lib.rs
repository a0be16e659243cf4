//! Options controlling how a block is lowered to Verilog, loaded from a
//! `sable.toml` file or built programmatically.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_options, load_options_from_str, validate_options, CONFIG_FILE_NAME};
pub use types::*;
