//! Library exports for the dentmark annotation canvas.
//!
//! Exposes the drawing model, the canvas state machine and the persistence
//! bridge so an embedding UI can drive them, alongside the configuration types
//! the `dentmark` binary loads.

pub mod config;
pub mod draw;
pub mod input;
pub mod persistence;
pub mod util;

pub use config::Config;
