//! Echoes Game Engine and Headless Simulation
//!
//! A phase-driven state engine for the tactical board game Echoes, with an
//! agent abstraction and headless driver for scripted play and automated
//! training.
//!
//! This crate re-exports the engine and sim crates for convenience.

pub use echoes_engine::*;
pub use echoes_sim as sim;
