//! # stackport-script
//!
//! Renders a normalized application into something deployable.
//!
//! - **Provisioning**: a host script that creates a container, installs the
//!   app inside it (generic Compose stack or a community install script), and
//!   reports how to reach it.
//! - **Stack file**: the sanitized Compose document for stack managers.
//!
//! Generation is a pure function of the record and the configuration; all
//! remote text is escaped on its way into the script.

pub mod artifact;
pub mod envelope;
pub mod guest;
pub mod recipe;
pub mod shell;
pub mod stack;
pub mod synth;

pub use artifact::{Artifact, encode_one_liner, generate};
pub use recipe::{InstallRecipe, match_recipe};
pub use stack::emit;
pub use synth::synthesize;
