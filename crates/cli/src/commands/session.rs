// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux session` — supervised agent session commands.

use crate::color;
use crate::context::AppContext;
use crate::output::{display_session_output, OutputFormat};
use crate::table::{Column, Table};
use amux_session::{CreateOptions, ListOptions, StopOptions};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::HashMap;

#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a new supervised agent session
    Run {
        /// Agent ID from config.yaml
        agent_id: String,
        /// Workspace identifier (id, short index, or name); auto-creates one if omitted
        #[arg(long)]
        workspace: Option<String>,
        /// Display name for the session
        #[arg(long)]
        name: Option<String>,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
        /// Text sent to the agent right after it starts
        #[arg(long)]
        prompt: Option<String>,
        /// Extra environment variables (key=value, repeatable)
        #[arg(long = "env", value_parser = parse_key_value)]
        env: Vec<(String, String)>,
        /// Skip lifecycle hooks for this session
        #[arg(long)]
        no_hooks: bool,
    },
    /// List sessions, optionally scoped to one workspace
    List {
        #[arg(long)]
        workspace: Option<String>,
    },
    /// Show a session's current, freshly-refreshed status
    Attach {
        identifier: String,
    },
    /// Gracefully stop a running session
    Stop {
        identifier: String,
        #[arg(long)]
        no_hooks: bool,
    },
    /// Show a session's captured output
    Logs {
        identifier: String,
        /// Number of trailing lines to show
        #[arg(short = 'n', long, default_value = "200")]
        lines: u32,
        /// Keep polling and printing new output
        #[arg(short, long)]
        follow: bool,
    },
    /// Tear down and delete a session
    Remove {
        identifier: String,
    },
    /// Inject text into a running session's process
    Send {
        identifier: String,
        text: String,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) => Ok((k.to_string(), v.to_string())),
        None => Err(format!("expected key=value, got '{s}'")),
    }
}

pub async fn handle(command: SessionCommand, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    match command {
        SessionCommand::Run { agent_id, workspace, name, description, prompt, env, no_hooks } => {
            let session = ctx
                .sessions
                .create(
                    &ctx.project_root,
                    &ctx.config,
                    CreateOptions {
                        agent_id,
                        workspace,
                        name,
                        description,
                        initial_prompt: prompt,
                        env: env.into_iter().collect::<HashMap<_, _>>(),
                        runtime_override: None,
                        no_hooks,
                    },
                )
                .await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
                OutputFormat::Text => {
                    println!("{} {} ({})", color::header("Started session"), session.id.as_str(), session.runtime_kind);
                    println!("  status: {}", color::status(&session.status.status.to_string()));
                }
            }
        }
        SessionCommand::List { workspace } => {
            let sessions = ctx.sessions.list(ListOptions { workspace })?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sessions)?),
                OutputFormat::Text => {
                    if sessions.is_empty() {
                        println!("No sessions");
                        return Ok(());
                    }
                    let mut table = Table::new(vec![
                        Column::muted("ID"),
                        Column::left("AGENT"),
                        Column::left("WORKSPACE"),
                        Column::status("STATUS"),
                    ]);
                    for s in &sessions {
                        table.row(vec![
                            s.id.as_str().to_string(),
                            s.agent_id.clone(),
                            s.workspace_id.as_str().to_string(),
                            s.status.status.to_string(),
                        ]);
                    }
                    table.render(&mut std::io::stdout());
                }
            }
        }
        SessionCommand::Attach { identifier } => {
            let session = ctx.sessions.refresh_status(&identifier).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
                OutputFormat::Text => {
                    println!("{} {}", color::header("Session:"), session.id.as_str());
                    println!("  {} {}", color::context("Agent:"), session.agent_id);
                    println!("  {} {}", color::context("Status:"), color::status(&session.status.status.to_string()));
                    if let Some(name) = &session.multiplexer_session_name {
                        println!("  {} tmux attach -t {}", color::context("Attach with:"), name);
                    }
                }
            }
        }
        SessionCommand::Stop { identifier, no_hooks } => {
            let session = ctx.sessions.stop(&identifier, StopOptions { no_hooks }).await?;
            println!("Stopped session {} ({})", session.id.as_str(), session.status.status);
        }
        SessionCommand::Logs { identifier, lines, follow } => {
            let output = ctx.sessions.output(&identifier, lines).await?;
            let sessions = ctx.sessions.clone();
            let id = identifier.clone();
            display_session_output(output.as_deref(), follow, format, &identifier, move || {
                let sessions = sessions.clone();
                let id = id.clone();
                Box::pin(async move { sessions.output(&id, lines).await.map_err(Into::into) })
            })
            .await?;
        }
        SessionCommand::Remove { identifier } => {
            ctx.sessions.remove(&identifier).await?;
            println!("Removed session {}", identifier);
        }
        SessionCommand::Send { identifier, text } => {
            ctx.sessions.send_input(&identifier, &text).await?;
            println!("Sent input to session {}", identifier);
        }
    }
    Ok(())
}
