//! Configuration types
//!
//! Board-agnostic dimmer configuration, its validation and the
//! TOML-subset parser used for the embedded configuration file.

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{parse_config, ParseError, RequiredKey};
pub use types::*;
