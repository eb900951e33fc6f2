#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use commands::session::SessionOptions;
use miette::Result;
use prebundle_core::Namespace;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prebundle")]
#[command(author, version, about = "Inspect dependency pre-bundle routing", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Pass manifest: qualified entries, exports data and optional config
    #[arg(long, global = true, value_name = "FILE", env = "PREBUNDLE_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Project root (overrides the manifest config)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Force the plug-and-play fallbacks on
    #[arg(long, global = true)]
    pnp: bool,

    /// Resolve for a server runtime: Node built-ins are not stubbed
    #[arg(long, global = true)]
    ssr: bool,

    /// Resolver alias, repeatable
    #[arg(long = "alias", global = true, value_name = "FROM=TO")]
    aliases: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// List the registered resolve and load rules
    Hooks,

    /// Resolve a specifier through the pre-bundle hooks
    Resolve {
        /// The import specifier as written
        specifier: String,

        /// Importing module (omit for a top-level entry)
        #[arg(long)]
        importer: Option<String>,

        /// Resolve as if from this directory
        #[arg(long, value_name = "DIR")]
        resolve_dir: Option<PathBuf>,
    },

    /// Load a resolved path or virtual id
    Load {
        /// Resolved path, or a virtual id for `dep` / `browser-external`
        path: String,

        /// Namespace of the load: file, dep or browser-external
        #[arg(long, default_value = "file", value_parser = parse_namespace)]
        namespace: Namespace,
    },
}

fn parse_namespace(value: &str) -> std::result::Result<Namespace, String> {
    Namespace::parse(value)
        .ok_or_else(|| format!("unknown namespace '{value}' (expected file, dep or browser-external)"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    let session = SessionOptions {
        manifest: cli.manifest,
        root: cli.root,
        pnp: cli.pnp,
        ssr: cli.ssr,
        aliases: cli.aliases,
    };

    match cli.command {
        Commands::Version => commands::version::run(cli.json),
        Commands::Hooks => commands::hooks::run(&session, cli.json),
        Commands::Resolve {
            specifier,
            importer,
            resolve_dir,
        } => commands::resolve::run(
            &session,
            commands::resolve::ResolveAction {
                specifier,
                importer,
                resolve_dir,
            },
            cli.json,
        ),
        Commands::Load { path, namespace } => commands::load::run(
            &session,
            commands::load::LoadAction { path, namespace },
            cli.json,
        ),
    }
}
