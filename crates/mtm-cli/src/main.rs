use clap::Parser;
use clap_verbosity_flag::Verbosity;
use mtm_source::Target;
use std::path::PathBuf;

mod commands;
mod error;

#[derive(Parser, Debug)]
#[command(name = "mtm")]
#[command(about = "Compiles .mtm components to React, Vue, Svelte and Solid", long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: Verbosity,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Compile a component
    Build {
        /// Component source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Target framework; repeat for several. Defaults to the frontmatter target
        #[arg(short, long = "target", value_name = "TARGET")]
        targets: Vec<Target>,
        /// Output directory (defaults to `output.out_dir` from mtm.toml)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Report errors, type diagnostics and quick fixes without writing output
    Check {
        /// Component source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Create a project with a starter component
    New {
        /// Project directory; its name becomes the component name
        #[arg(value_name = "NAME")]
        name: PathBuf,
        /// Target framework of the starter component
        #[arg(short, long, default_value_t = Target::React)]
        target: Target,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    match args.command {
        Command::Build { file, targets, out } => {
            commands::handle_build(&file, &targets, out)?;
        }
        Command::Check { file } => commands::handle_check(&file)?,
        Command::New { name, target } => {
            commands::handle_new(&name, target)?;
        }
    }
    Ok(())
}
