//! `stackport script`: Write a container-host provisioning script.

use std::path::PathBuf;

use clap::Args;
use stackport_common::config::DeploymentTarget;

use crate::commands::{ConfigArgs, SourceArgs};
use crate::{loader, output};

/// Arguments for the `script` command.
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Application source.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Deployment settings.
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Install with this community script instead of the Compose stack.
    #[arg(long, conflicts_with = "recipes")]
    pub recipe: Option<String>,

    /// File listing available community scripts, one name per line.
    #[arg(long)]
    pub recipes: Option<PathBuf>,

    /// Print a single pasteable command instead of the script.
    #[arg(long)]
    pub one_liner: bool,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `script` command.
///
/// # Errors
///
/// Returns an error if the source, configuration or recipe list cannot be
/// read, or the output cannot be written.
pub fn execute(args: &ScriptArgs) -> anyhow::Result<()> {
    let record = loader::load_record(&args.source)?;
    let mut config = args.config.resolve(&record)?;
    config.target = DeploymentTarget::ContainerHostProvisioning;

    if let Some(recipe) = &args.recipe {
        config.matched_recipe = Some(recipe.clone());
    } else if let Some(path) = &args.recipes {
        let registry = loader::load_registry(path)?;
        config.matched_recipe = stackport_script::match_recipe(&record, &registry).map(str::to_owned);
        match &config.matched_recipe {
            Some(name) => tracing::info!(recipe = %name, "matched community script"),
            None => tracing::info!(app = %record.id, "no community script matched"),
        }
    }

    let artifact = stackport_script::generate(&record, &config);
    if args.one_liner {
        let line = stackport_script::encode_one_liner(&artifact.content);
        return output::emit(&line, args.output.as_deref());
    }
    output::write_script(&artifact.content, args.output.as_deref())
}
