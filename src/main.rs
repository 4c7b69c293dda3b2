use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;
use tracing::error;

use dorado_batch::array;
use dorado_batch::errors::exit_code_for;
use dorado_batch::errors::ExitCode;
use dorado_batch::local;
use dorado_batch::stage;

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(name = "dorado-batch", propagate_version = true)]
#[command(about = "Stages and basecalls batches of nanopore sequencing runs with Dorado.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Basecalls every input in a list on this machine.
    Local(local::command::LocalArgs),

    /// Basecalls the input selected by a scheduler array task.
    Array(array::command::ArrayArgs),

    /// Stages a single input without basecalling it.
    Stage(stage::command::StageArgs),
}

/// Parses the command line. Usage errors exit with the same code as every
/// other configuration error.
fn parse() -> Cli {
    let version = render_testament!(TESTAMENT);

    Cli::command()
        .version(version)
        .try_get_matches()
        .and_then(|matches| Cli::from_arg_matches(&matches))
        .unwrap_or_else(|err| {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::Failure
            } else {
                ExitCode::Success
            };
            std::process::exit(code as i32);
        })
}

fn main() {
    let cli = parse();

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let result = match cli.command {
        Command::Local(args) => local::command::local(args),
        Command::Array(args) => array::command::array(args),
        Command::Stage(args) => stage::command::stage(args),
    };

    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}
