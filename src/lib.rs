//! CivicTwin - Voice-Driven Civic Stress Prediction Client
//!
//! Collects five civic readings (traffic, pollution, power usage, water use,
//! complaints), sends them to a CivicTwin prediction service, renders the
//! verdict and speaks it back. A voice controller can trigger the whole flow
//! from a single spoken command.
//!
//! ## Quick Start
//!
//! ```bash
//! # One prediction
//! civictwin predict --traffic 70 --pollution 55 --power-usage 40 --water-use 35 --complaints 12
//!
//! # Voice command from text or from a recording
//! civictwin voice --transcript "please analyze the city" --traffic 70
//! civictwin voice --audio command.wav --traffic 70
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod page;
pub mod predictor;
pub mod speech;
pub mod voice;

// Re-export commonly used types
pub use error::{CivicError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
