//! Core domain + application logic for repowatch.
//!
//! This crate is intentionally framework-agnostic. GitHub and Telegram live
//! behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod interactions;
pub mod logging;
pub mod messaging;
pub mod pagination;
pub mod poller;
pub mod ports;
pub mod render;

pub use errors::{Error, Result};

#[cfg(test)]
pub(crate) mod test_support;
