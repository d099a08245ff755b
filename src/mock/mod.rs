//! In-memory backend serving the same REST surface as the real one.

pub mod api;
mod backend;

pub use api::{setup, spawn, Api};
pub use backend::{Backend, Fault, REQUEST_LOG_CAP};
