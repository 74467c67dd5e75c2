//! Command-line front end
//!
//! Every subcommand except `mcp` performs one notes operation, prints the
//! rendered result to stdout and reports failures on stderr.

use std::{process::ExitCode, sync::Arc};

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::{
    build_app,
    config::{Config, ConfigOverrides},
    domain::format::{
        format_deleted, format_note, format_note_list, format_note_not_found, format_system_info,
    },
    errors::{CliError, RpcClientError},
    logging,
    mcp::stdio::serve_stdio,
    notes::{NotesApi, UpdateNoteParams},
    rpc_client::HttpRpcClient,
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "notes-rpc-bridge", version, about = "Talk to the notes application over JSON-RPC")]
pub struct Cli {
    /// Base URL of the application's JSON-RPC endpoint (overrides NOTES_RPC_URL)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Per-request timeout in milliseconds (overrides NOTES_RPC_TIMEOUT_MS); no timeout when unset
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Api(ApiCommand),

    /// Run the MCP tool server
    Mcp(McpArgs),
}

#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// Show application name, version, OS and architecture
    SystemInfo,

    /// Ask the application to echo a message back
    Echo {
        text: String,
    },

    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum NotesCommand {
    /// List all notes
    List,

    /// Show one note
    Get { id: String },

    /// Create a note
    Create { title: String, content: String },

    /// Update a note; omitted values are left unchanged
    Update {
        id: String,
        title: Option<String>,
        content: Option<String>,
    },

    /// Delete a note
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct McpArgs {
    #[arg(long, value_enum, default_value_t = McpTransport::Stdio)]
    pub transport: McpTransport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum McpTransport {
    Stdio,
    Http,
}

pub async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let default_level = match cli.command {
        Command::Mcp(_) => "info",
        Command::Api(_) => "warn",
    };
    logging::init_logging(default_level);

    let config = Config::from_env()?.apply_overrides(ConfigOverrides {
        rpc_url: cli.rpc_url,
        timeout_ms: cli.timeout_ms,
    })?;
    let notes = NotesApi::new(Arc::new(HttpRpcClient::from_config(&config)));

    match cli.command {
        Command::Mcp(args) => {
            serve_mcp(&config, notes, args.transport).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Api(command) => match execute(&notes, command).await {
            Ok(output) => {
                println!("{output}");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("Error: {err}");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

/// Runs one API command and renders its result as text.
pub async fn execute(notes: &NotesApi, command: ApiCommand) -> Result<String, RpcClientError> {
    match command {
        ApiCommand::SystemInfo => Ok(format_system_info(&notes.system_info().await?)),
        ApiCommand::Echo { text } => notes.echo(text).await,
        ApiCommand::Notes { command } => match command {
            NotesCommand::List => Ok(format_note_list(&notes.list_notes().await?)),
            NotesCommand::Get { id } => Ok(match notes.get_note(id.clone()).await? {
                Some(note) => format_note(&note),
                None => format_note_not_found(&id),
            }),
            NotesCommand::Create { title, content } => {
                let note = notes.create_note(title, content).await?;
                Ok(format!("Created note:\n{}", format_note(&note)))
            }
            NotesCommand::Update { id, title, content } => {
                let updated = notes
                    .update_note(UpdateNoteParams {
                        id: id.clone(),
                        title,
                        content,
                    })
                    .await?;
                Ok(match updated {
                    Some(note) => format!("Updated note:\n{}", format_note(&note)),
                    None => format_note_not_found(&id),
                })
            }
            NotesCommand::Delete { id } => {
                let deleted = notes.delete_note(id.clone()).await?;
                Ok(format_deleted(&id, deleted))
            }
        },
    }
}

async fn serve_mcp(
    config: &Config,
    notes: NotesApi,
    transport: McpTransport,
) -> Result<(), CliError> {
    match transport {
        McpTransport::Stdio => {
            info!(rpc_url = %config.rpc_url, "serving mcp over stdio");
            serve_stdio(AppState::new(config.api_token.clone(), notes)).await?;
        }
        McpTransport::Http => {
            let api_token = config.require_api_token()?.to_string();
            let bind_socket = config.bind_socket()?;
            let app = build_app(AppState::new(Some(api_token), notes));
            let listener = tokio::net::TcpListener::bind(bind_socket).await?;

            info!(
                bind_addr = %config.bind_addr,
                bind_port = %config.bind_port,
                rpc_url = %config.rpc_url,
                "mcp http server starting"
            );

            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}
