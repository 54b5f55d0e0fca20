//! `stackport stack`: Write a cleaned Compose file.

use std::path::PathBuf;

use clap::Args;
use stackport_common::config::DeploymentTarget;

use crate::commands::{ConfigArgs, SourceArgs};
use crate::{loader, output};

/// Arguments for the `stack` command.
#[derive(Args, Debug)]
pub struct StackArgs {
    /// Application source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Deployment settings.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `stack` command.
///
/// # Errors
///
/// Returns an error if the source or configuration cannot be read, or the
/// output cannot be written.
pub fn execute(args: &StackArgs) -> anyhow::Result<()> {
    let record = loader::load_record(&args.source)?;
    let mut config = args.config.resolve(&record)?;
    config.target = DeploymentTarget::StackFile;

    let artifact = stackport_script::generate(&record, &config);
    output::emit(&artifact.content, args.output.as_deref())
}
