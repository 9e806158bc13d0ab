#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use commands::lookup::{LookupArgs, Position};
use miette::{IntoDiagnostic, Result};
use pkgref_core::Config;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pkgref")]
#[command(author, version, about = "Jump from a package.json or lockfile entry to the installed package", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Read engine options from this file instead of the project's pkgref.json
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve the package named at a position in a manifest or lockfile
    Lookup {
        /// package.json, package-lock.json, npm-shrinkwrap.json or node_modules/.package-lock.json
        file: PathBuf,

        /// Byte offset of the cursor
        #[arg(long, conflicts_with_all = ["line", "column"], required_unless_present = "line")]
        offset: Option<usize>,

        /// Line of the cursor (0-based)
        #[arg(long, requires = "column")]
        line: Option<usize>,

        /// Column of the cursor in characters (0-based)
        #[arg(long, requires = "line")]
        column: Option<usize>,

        /// Never search for node_modules above this directory (default: working directory)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Do not resolve symlinks while walking up
        #[arg(long, env = "PKGREF_PRESERVE_SYMLINKS")]
        preserve_symlinks: bool,
    },

    /// List packages installed in DIR/node_modules
    List {
        /// Project directory (default: working directory)
        dir: Option<PathBuf>,
    },

    /// Detect the package manager of a project
    Manager {
        /// Project directory (default: working directory)
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // File options first, flags override them
    let config = match &cli.config {
        Some(path) => Config::load(&cwd.join(path)).into_diagnostic()?,
        None => Config::discover(&cwd).into_diagnostic()?,
    }
    .with_cwd(cwd.clone())
    .with_verbosity(cli.verbose)
    .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Lookup {
            file,
            offset,
            line,
            column,
            root,
            preserve_symlinks,
        }) => {
            let span = tracing::info_span!("lookup", cmd = "lookup", cwd = %cwd.display());
            let _guard = span.enter();

            let position = match (offset, line, column) {
                (Some(offset), _, _) => Position::Offset(offset),
                (None, Some(line), Some(column)) => Position::LineColumn { line, column },
                _ => return Err(miette::miette!("either --offset or --line/--column is required")),
            };
            let config = if preserve_symlinks {
                config.with_preserve_symlinks(true)
            } else {
                config
            };
            commands::lookup::run(
                &config,
                LookupArgs {
                    file,
                    position,
                    root,
                },
                cli.json,
            )
        }
        Some(Commands::List { dir }) => {
            let span = tracing::info_span!("list", cmd = "list", cwd = %cwd.display());
            let _guard = span.enter();
            commands::list::run(&resolve_dir(&cwd, dir), cli.json)
        }
        Some(Commands::Manager { dir }) => {
            let span = tracing::info_span!("manager", cmd = "manager", cwd = %cwd.display());
            let _guard = span.enter();
            commands::manager::run(&resolve_dir(&cwd, dir), cli.json)
        }
    }
}

fn resolve_dir(cwd: &Path, dir: Option<PathBuf>) -> PathBuf {
    dir.map_or_else(|| cwd.to_path_buf(), |dir| cwd.join(dir))
}
