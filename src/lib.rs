//! Blaster - motion, timing and combat core of a 2D arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paths, scheduling, hits, actors, levels)
//! - `audio`: Sound output seam for the host
//! - `config`: Data-driven simulation settings
//! - `error`: Error type shared by every fallible operation

pub mod audio;
pub mod config;
pub mod error;
pub mod sim;

pub use audio::{AudioPlayer, LoggingAudio, NullAudio};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
