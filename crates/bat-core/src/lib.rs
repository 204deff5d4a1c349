//! Core types for the ciao BAT harness.

pub mod config;
pub mod credentials;
pub mod events;
pub mod types;

pub use config::*;
pub use credentials::*;
pub use events::*;
pub use types::*;
