//! Quill CLI - Command-line client for a category-organized notes service
//!
//! Signs in against the backend, lists and edits notes, and autosaves edits
//! read from stdin.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::categories::run_categories;
use crate::commands::common::{finish_session, CommandContext, Session};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::create::run_new;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditArgs};
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "quill=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();
    let api_url = cli.api_url.as_deref();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Config { command } => run_config(command, profile, api_url)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
        command => {
            let context = CommandContext::resolve(profile, api_url)?;
            run_backend_command(command, &context).await?;
        }
    }

    Ok(())
}

/// Every backend command shares one session; its cookie jar is written back
/// once the command returns, on success or failure.
async fn run_backend_command(command: Commands, context: &CommandContext) -> Result<(), CliError> {
    let session = context.session()?;
    let outcome = dispatch_backend_command(command, &session, context).await;
    finish_session(&session, outcome)
}

async fn dispatch_backend_command(
    command: Commands,
    session: &Session,
    context: &CommandContext,
) -> Result<(), CliError> {
    match command {
        Commands::Auth { command } => run_auth(command, session, context).await,
        Commands::Categories { json } => run_categories(json, session).await,
        Commands::List { category, json } => run_list(&category, json, session).await,
        Commands::Show { id, json } => run_show(&id, json, session).await,
        Commands::New {
            title,
            content,
            category,
        } => run_new(title, content, category.as_deref(), session).await,
        Commands::Edit {
            id,
            title,
            content,
            category,
            debounce_ms,
            requeue_failed,
            stdin,
        } => {
            let args = EditArgs {
                title,
                content,
                category,
                debounce_ms,
                requeue_failed,
                read_stdin: stdin,
            };
            run_edit(&id, args, session).await
        }
        Commands::Delete { id } => run_delete(&id, session).await,
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
