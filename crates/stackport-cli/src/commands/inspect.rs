//! `stackport inspect`: Print the normalized application record.

use clap::Args;

use crate::commands::SourceArgs;
use crate::{loader, output};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Application source.
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if the source cannot be read or holds no usable app.
pub fn execute(args: &InspectArgs) -> anyhow::Result<()> {
    let record = loader::load_record(&args.source)?;
    let json = serde_json::to_string_pretty(&record)?;
    output::emit(&json, None)
}
