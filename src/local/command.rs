//! Functionality related to the `dorado-batch local` command itself.

use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::batch::run_batch;
use crate::batch::Cleanup;
use crate::batch::Pipeline;
use crate::cancel::CancellationToken;
use crate::config::read_input_list;
use crate::config::Config;
use crate::resolve::Resolver;
use crate::run::model::Mode;
use crate::run::Runner;
use crate::tools::Toolbox;
use crate::utils::args::BasecallArgs;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `dorado-batch local`.
#[derive(Args)]
pub struct LocalArgs {
    /// File listing one input per line (directories, archives, or `s3://`
    /// archives). Blank lines and lines starting with `#` are ignored.
    #[arg(long, value_name = "PATH")]
    dirlist: PathBuf,

    /// Logs every step that would be taken without staging or basecalling
    /// anything.
    #[arg(long)]
    dryrun: bool,

    /// Writes a JSON report of every job to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    #[command(flatten)]
    basecall: BasecallArgs,
}

//==============//
// Main command //
//==============//

/// Main method for the `dorado-batch local` subcommand.
pub fn local(args: LocalArgs) -> anyhow::Result<()> {
    // (1) Validate everything that is fatal before any job starts.
    let config = Config::from_args(&args.basecall, Mode::Simplex)?;
    let references = read_input_list(&args.dirlist)?;
    info!(
        "basecalling {} inputs from {}",
        references.len(),
        args.dirlist.display()
    );

    // (2) Set up the pipeline. Local inputs are never cleaned up.
    let tools = Toolbox::from_config(&config);
    let resolver = Resolver::from_toolbox(&tools, config.staging.scratch_root.clone());
    let runner = Runner::from_config(tools.basecaller.as_ref(), &config);
    let pipeline = Pipeline::new(
        resolver,
        runner,
        config.model.clone(),
        Cleanup::Keep,
        args.dryrun,
    );

    // (3) Run every job, then report.
    let summary = run_batch(&pipeline, &references, &CancellationToken::new(), true);
    summary.print();

    if let Some(report) = &args.report {
        summary
            .write_json(report)
            .with_context(|| format!("writing report: {}", report.display()))?;
        info!("wrote report to {}", report.display());
    }

    if summary.failed > 0 {
        bail!("{} of {} jobs failed", summary.failed, summary.total());
    }

    Ok(())
}
