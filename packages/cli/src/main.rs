mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, init, list, query, EditArgs, InitArgs, ListArgs, QueryArgs};
use tracing_subscriber::EnvFilter;

/// Recipe CLI - edit, stage and list recipe aggregates
#[derive(Parser, Debug)]
#[command(name = "recipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a recipe workspace
    Init(InitArgs),

    /// Apply mutations to a recipe and print the submit request
    Edit(EditArgs),

    /// Print the list query for a filter
    Query(QueryArgs),

    /// List recipes from a JSON file
    List(ListArgs),
}

async fn run(command: Command) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match command {
        Command::Init(args) => init(args, &cwd),
        Command::Edit(args) => edit(args, &cwd).await,
        Command::Query(args) => query(args, &cwd),
        Command::List(args) => list(args, &cwd).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = run(cli.command).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
