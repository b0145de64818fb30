// Core modules
pub mod config;
pub mod error;
pub mod exchange;
pub mod execution;
pub mod indicators;
pub mod journal;
pub mod models;
pub mod notify;
pub mod risk;
pub mod scheduler;
pub mod strategy;
pub mod trend;

// Re-export commonly used types
pub use error::BotError;
pub use models::*;
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, BotError>;
