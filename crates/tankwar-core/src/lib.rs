//! Core types and definitions for the tank arena AI.
//!
//! This crate defines the vocabulary shared across all other crates:
//! poses, archetypes, behavior kinds, agent configuration, components,
//! commands, snapshots, events, and constants.
//! It has no dependency on the simulation harness or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
