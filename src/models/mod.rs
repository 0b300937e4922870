//! Wire and configuration models.

pub mod admin_api;
#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod blob;
#[cfg(feature = "server")]
pub mod config;
