use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use sfdc_git_diff::cli::Cli;
use sfdc_git_diff::git::errors::GitError;
use sfdc_git_diff::{BuildError, commands, output};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), describe(&e));
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    output::set_verbosity(cli.verbosity());

    commands::build::execute(&cli.to_config())?;
    Ok(())
}

/// Diagnostics go to stderr, filtered by `RUST_LOG`
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sfdc_git_diff=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Known failures carry suggestions; anything else prints its context chain
fn describe(error: &anyhow::Error) -> String {
    if let Some(build) = error.downcast_ref::<BuildError>() {
        build.user_message()
    } else if let Some(git) = error.downcast_ref::<GitError>() {
        git.user_message()
    } else {
        format!("{error:#}")
    }
}
