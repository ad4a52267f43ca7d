//! vkmock command-line interface.

mod commands;
mod config;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vkmock")]
#[command(about = "Generate a mock Vulkan driver from the API registry", version)]
struct Cli {
    /// Extra config file, applied after the global and project configs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the mock driver header and source
    Generate(commands::generate::GenerateArgs),
    /// Print the advertised instance and device extension tables
    Extensions(commands::extensions::ExtensionsArgs),
    /// Print each command's lifecycle role and allocation plan
    Classify(commands::classify::ClassifyArgs),
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "vkmock=debug,vkmock_codegen=debug,info",
            _ => "vkmock=trace,vkmock_codegen=trace,debug",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let code = match cli.command {
        Commands::Generate(args) => commands::generate::run(args, config),
        Commands::Extensions(args) => commands::extensions::run(args, config),
        Commands::Classify(args) => commands::classify::run(args, config),
    };
    std::process::exit(code);
}
