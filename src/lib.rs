pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod mock;
pub mod node;
pub mod poller;
pub mod system;
pub mod view;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
