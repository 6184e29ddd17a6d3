use clap::{Parser, Subcommand};
use relkit_cli::commands::config_cmd::{self, ConfigCommands};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// relkit CLI: inspect layered release configuration
#[derive(Parser)]
#[command(name = "relkit")]
#[command(about = "Inspect layered release configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show the CLI version
    Version,
}

fn main() {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("RELKIT_LOG"))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Config(cmd) => {
            if let Err(e) = config_cmd::execute(cmd) {
                error!("Error: {e}");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!(
                "relkit version {}",
                option_env!("RELKIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
        }
    }
}
