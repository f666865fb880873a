pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;
pub use config::{toml_config::DigestConfig, LocalStorage};

pub use core::{engine::DigestEngine, pipeline::DigestPipeline};
pub use domain::ports::{Clock, FixedClock, SystemClock};
pub use utils::error::{DigestError, Result};
