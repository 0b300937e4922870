//! Domain aggregates exposed by the admin service layer.

pub mod client;
pub mod editor;
pub mod todo;
pub mod types;
