//! Functionality related to the `dorado-batch array` command itself.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::batch::Cleanup;
use crate::batch::Pipeline;
use crate::cancel::CancellationToken;
use crate::config::parse_task_index;
use crate::config::select_task_line;
use crate::config::Config;
use crate::resolve::Resolver;
use crate::run::model::Mode;
use crate::run::Runner;
use crate::tools::Toolbox;
use crate::utils::args::BasecallArgs;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `dorado-batch array`.
#[derive(Args)]
pub struct ArrayArgs {
    /// File listing one input per line. The task index selects a line.
    #[arg(long, value_name = "PATH")]
    pod5list: PathBuf,

    /// The 1-based line of the input list to basecall.
    #[arg(long, value_name = "INDEX", env = "SLURM_ARRAY_TASK_ID")]
    task_index: Option<String>,

    /// Basecalls in duplex mode.
    #[arg(long)]
    duplex: bool,

    /// Keeps the staged input in the scratch directory after a successful
    /// run.
    #[arg(long)]
    keep_scratch: bool,

    #[command(flatten)]
    basecall: BasecallArgs,
}

//==============//
// Main command //
//==============//

/// Main method for the `dorado-batch array` subcommand.
pub fn array(args: ArrayArgs) -> anyhow::Result<()> {
    let mode = if args.duplex {
        Mode::Duplex
    } else {
        Mode::Simplex
    };

    let config = Config::from_args(&args.basecall, mode)?;
    let index = parse_task_index(args.task_index.as_deref())?;
    let reference = select_task_line(&args.pod5list, index)?;
    info!("task {}: {} ({} mode)", index, reference, mode);

    let cleanup = if args.keep_scratch {
        Cleanup::Keep
    } else {
        Cleanup::RemoveWorkDir
    };

    let tools = Toolbox::from_config(&config);
    let resolver = Resolver::from_toolbox(&tools, config.staging.scratch_root.clone());
    let runner = Runner::from_config(tools.basecaller.as_ref(), &config);
    let pipeline = Pipeline::new(resolver, runner, config.model.clone(), cleanup, false);

    let completed = pipeline
        .run_job(&reference, &CancellationToken::new())
        .with_context(|| format!("task {}: {}", index, reference))?;

    info!(
        "task {}: wrote {} and {}",
        index,
        completed.output.bam_path.display(),
        completed.output.summary_path.display()
    );

    Ok(())
}
