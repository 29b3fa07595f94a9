//! Lectern CLI library.
//!
//! Wires the document loader, the TOC extractor, the pipeline, and the
//! report integrator together behind the `lectern` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod reporter;

pub use cli::{Cli, DepthArg};
pub use config::Config;
pub use error::{CliError, Result};
