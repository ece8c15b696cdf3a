//! Core module for Foundry
//!
//! Session configuration and error types shared by every command.

pub mod config;
pub mod error;

pub use config::{Config, ConfigReader};
pub use error::{FoundryError, FoundryResult};
