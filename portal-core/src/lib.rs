//! Core library for the clock configuration portal.
//! This crate defines the device API contract (types and the `DeviceApi` trait),
//! the HTTP implementation talking to the clock firmware, and the
//! `PortalController` that drives the access point / station views.

pub mod config;
pub mod controller;
pub mod devices;
pub mod page;
pub mod structs;
pub mod traits;

pub use controller::PortalController;

// Define a shared Error and Result type for the entire crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;
