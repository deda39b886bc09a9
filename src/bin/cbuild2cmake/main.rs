//! cbuild2cmake CLI - Generate CMakeLists from a CMSIS solution

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cbuild2cmake::builder::GraphError;
use cbuild2cmake::ops::DescriptionError;
use cbuild2cmake::resolver::ToolchainError;
use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        eprint!("{}", help(&e));
        std::process::exit(1);
    }
}

/// Hints attached to the typed error at the root of the chain.
fn help(error: &anyhow::Error) -> String {
    let cause = error.root_cause();
    if let Some(err) = cause.downcast_ref::<ToolchainError>() {
        err.to_diagnostic().format_help(false)
    } else if let Some(err) = cause.downcast_ref::<GraphError>() {
        err.to_diagnostic().format_help(false)
    } else if let Some(err) = cause.downcast_ref::<DescriptionError>() {
        err.to_diagnostic().format_help(false)
    } else {
        String::new()
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    if cli.version {
        println!("cbuild2cmake version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Some(shell) = cli.completions {
        return commands::completions::execute(shell);
    }

    // Set up logging
    let filter = if cli.debug {
        EnvFilter::new("cbuild2cmake=debug")
    } else if cli.quiet {
        EnvFilter::new("cbuild2cmake=error")
    } else {
        EnvFilter::new("cbuild2cmake=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    commands::generate::execute(&cli)
}
