//! Headless simulation for the Echoes engine
//!
//! This crate provides:
//! - Agent trait and RandomAgent
//! - SimConfig / SimulationResult types
//! - HeadlessRunner: full games without a rendering surface

mod agent;
mod runner;
mod types;

pub use agent::*;
pub use runner::*;
pub use types::*;
