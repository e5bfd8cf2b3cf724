//! Core module - shared infrastructure for Baton
//!
//! This module contains the conversation types, configuration, and error
//! handling used throughout the crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{BatonError, ErrorKind, Result};
pub use types::*;
