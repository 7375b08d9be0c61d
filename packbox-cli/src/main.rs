use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use packbox_cli::{commands, error_kind, Config};

#[derive(Parser)]
#[command(name = "packbox")]
#[command(about = "Build and inspect packbox resource containers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// TOML config file overlaid on the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a box from resource files
    Pack {
        /// Box file to write
        target: PathBuf,
        /// Resource files to pack, stored under their file names
        resources: Vec<PathBuf>,
        /// JSON manifest to store in the header
        #[arg(short = 'd', long = "definition", value_name = "FILE")]
        manifest: Option<PathBuf>,
    },
    /// Extract the manifest and entries of a box
    Unpack {
        source: PathBuf,
        target_dir: PathBuf,
    },
    /// List the entries of a box
    List { source: PathBuf },
    /// Print a resource, resolved against the box and its directory
    Cat {
        source: PathBuf,
        /// Resource URI, e.g. file://local/name.txt
        uri: String,
    },
    /// Generate a manifest template
    Template { target: PathBuf },
    /// Serialize a JSON string map to binary
    MakeMap {
        source: PathBuf,
        target: PathBuf,
        /// Deflate-compress output
        #[arg(short, long)]
        compress: bool,
    },
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config, cli.verbose);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Pack {
            target,
            resources,
            manifest,
        } => commands::pack(&config, &target, &resources, manifest.as_deref())?,
        Commands::Unpack { source, target_dir } => commands::unpack(&config, &source, &target_dir)?,
        Commands::List { source } => commands::list(&source, &mut io::stdout().lock())?,
        Commands::Cat { source, uri } => {
            let mut out = io::stdout().lock();
            commands::cat(&source, &uri, &mut out)?;
            out.flush()?;
        }
        Commands::Template { target } => commands::template(&target)?,
        Commands::MakeMap {
            source,
            target,
            compress,
        } => commands::make_map(&config, &source, &target, compress)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match error_kind(&err) {
                Some(kind) => eprintln!("error [{kind}]: {err:#}"),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
