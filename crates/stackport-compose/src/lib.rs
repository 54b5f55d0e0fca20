//! # stackport-compose
//!
//! Turns community app-store Compose files into clean, portable documents.
//!
//! Handles:
//! - **Metadata**: Normalizing vendor blocks, `config.json` sidecars, and
//!   Umbrel manifests into one [`ApplicationRecord`](stackport_common::types::ApplicationRecord).
//! - **Sanitize**: Stripping vendor extensions, remapping data paths, merging
//!   environment overrides, and rebinding the main service's port.
//! - **Secrets**: Planning which environment values are generated at
//!   provisioning time instead of being baked into the document.
//!
//! Every operation is a pure in-memory transformation. Malformed input
//! degrades (no record, or pass-through text) instead of failing.

pub mod document;
pub mod metadata;
pub mod sanitize;
pub mod secrets;

pub use metadata::{AppFolder, FolderFile, normalize, normalize_umbrel};
pub use sanitize::{ComposeOverrides, SanitizedCompose, sanitize};
pub use secrets::{SecretPlan, SecretSlot};
