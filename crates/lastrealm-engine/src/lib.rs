//! Last Realm Engine - headless host for the Last Realm simulation.
//!
//! This crate provides the pieces that sit around a run: configuration
//! files, fixed-step timing, weapon stat and powerup catalog loading, the
//! run summary file, and a scripted player for unattended runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod autopilot;
pub mod catalog_loader;
pub mod config;
pub mod run_report;
pub mod timing;
pub mod weapon_loader;


pub use app::{App, RunOutcome};
pub use config::{EngineConfig, CONFIG_FILE};
