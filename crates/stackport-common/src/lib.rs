//! # stackport-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire stackport workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the application record and deployment
//! configuration that every other crate passes around.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
