//! Functionality related to the `dorado-batch stage` command itself.

use anyhow::Context;
use clap::Args;

use crate::cancel::CancellationToken;
use crate::config::StagingConfig;
use crate::resolve::Resolver;
use crate::tools::aws::AwsCli;
use crate::tools::pod5::Pod5Tool;
use crate::tools::tar::TarTool;
use crate::utils::args::StagingArgs;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `dorado-batch stage`.
#[derive(Args)]
pub struct StageArgs {
    /// Input to stage: a directory, an archive, or an `s3://` archive.
    #[arg(value_name = "REFERENCE")]
    reference: String,

    /// Logs every step that would be taken without performing it.
    #[arg(long)]
    dryrun: bool,

    #[command(flatten)]
    staging: StagingArgs,
}

//==============//
// Main command //
//==============//

/// Main method for the `dorado-batch stage` subcommand. Prints the resolved
/// input as JSON on stdout.
pub fn stage(args: StageArgs) -> anyhow::Result<()> {
    let config = StagingConfig::from(&args.staging);

    let store = AwsCli::new(config.aws);
    let archiver = TarTool::new(config.tar);
    let converter = Pod5Tool::new(config.pod5);
    let resolver =
        Resolver::new(&store, &archiver, &converter, config.scratch_root).dry_run(args.dryrun);

    let resolved = resolver
        .resolve(&args.reference, &CancellationToken::new())
        .with_context(|| format!("staging {}", args.reference))?;

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}
