mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{auth, completions, contacts, open_book, Context};
use crate::error::{exit_code_for, report_error};
use contactbook_config as config;
use contactbook_config::SourceConfig;

#[derive(Debug, Parser)]
#[command(name = "contactbook", version, about = "contactbook CLI")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Read contacts from a .vcf or .json file instead of the configured source
    #[arg(long, global = true)]
    source_file: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Auth(auth::AuthCommand),
    /// List all contacts, normalized
    List(contacts::ListArgs),
    /// List contact ids
    Ids(contacts::IdsArgs),
    /// Show one contact as the source returns it
    Show(contacts::ShowArgs),
    /// Show the user's own card
    Me(contacts::MeArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        source_file,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }

            let source = match source_file {
                Some(path) => SourceConfig::from_file(path).with_context(|| "resolve --source-file")?,
                None => app_config.source,
            };
            debug!(kind = source.kind().as_str(), "contact source selected");

            let book = open_book(&source);
            let ctx = Context { book: &book, json };

            match command {
                Command::Auth(cmd) => match cmd {
                    auth::AuthCommand::Status(args) => auth::status(&ctx, args),
                    auth::AuthCommand::Request(args) => auth::request(&ctx, args),
                },
                Command::List(args) => contacts::list_contacts(&ctx, args),
                Command::Ids(args) => contacts::list_ids(&ctx, args),
                Command::Show(args) => contacts::show_contact(&ctx, args),
                Command::Me(args) => contacts::show_me(&ctx, args),
                Command::Completions(_) => {
                    unreachable!("completions command handled before source initialization")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
