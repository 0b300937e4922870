//! DTO modules that bridge services with templates and APIs.

pub mod api;
pub mod client;
pub mod clients;
pub mod main;
