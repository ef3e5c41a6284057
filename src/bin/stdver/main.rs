//! stdver CLI - version identity and resolution for the Go standard library

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use stdver::util::{CancelToken, GlobalContext};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("stdver=debug")
    } else {
        EnvFilter::new("stdver=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Config files first, then env and flags
    let mut ctx = GlobalContext::new()?;
    cli.source.apply(ctx.config_mut());

    let cancel = CancelToken::new();

    // Execute command
    match cli.command {
        Commands::Versions(args) => commands::versions::execute(args, &ctx, &cancel),
        Commands::Branches(args) => commands::branches::execute(args, &ctx, &cancel),
        Commands::Resolve(args) => commands::resolve::execute(args, &ctx, &cancel),
        Commands::Zip(args) => commands::zip::execute(args, &ctx, &cancel),
        Commands::Clone(args) => commands::clone::execute(args, &ctx, &cancel),
        Commands::Tag(args) => commands::tag::execute(args),
        Commands::SortKey(args) => commands::sort_key::execute(args),
        Commands::Latest(args) => commands::latest::execute(args),
        Commands::Classify(args) => commands::classify::execute(args),
    }
}
