//! Swedish to English translation service with a bounded, persisted history.

pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod server;
pub mod services;

pub use config::ServerConfig;
pub use error::{AppError, AppResult};
