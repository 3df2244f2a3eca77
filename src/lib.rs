//! Organization-wide skill linking and marketplace publishing.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod linker;
pub mod manifest;
pub mod plugins;
pub mod publish;
pub mod utils;

pub use error::{ChaparralError, Result};
