// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! amux - a local control plane for running AI coding agents in parallel.

mod color;
mod commands;
mod context;
mod exit_error;
mod output;
mod table;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{config, hooks, mailbox, mcp, session, ws};
use context::AppContext;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "amux", version, about = "Run multiple AI agents in parallel on one repo")]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Workspace management
    Ws(ws::WsArgs),
    /// Session management
    Session(session::SessionArgs),
    /// Mailbox message channel
    Mailbox(mailbox::MailboxArgs),
    /// Lifecycle hook configuration
    Hooks(hooks::HooksArgs),
    /// Config inspection
    Config(config::ConfigArgs),
    /// Serve the MCP tool surface over stdio
    Mcp,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(code);
    }
}

fn cli_command() -> clap::Command {
    Cli::command().styles(color::styles())
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let matches = cli_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let project_root = cli.directory.unwrap_or(std::env::current_dir()?);

    // `config` only reads the file itself, so it works even when the rest
    // of the project layout (worktrees, state dirs) isn't wired up yet.
    if let Commands::Config(args) = cli.command {
        return config::handle(args.command, &project_root, cli.output).await;
    }

    let ctx = AppContext::load(&project_root)?;

    match cli.command {
        Commands::Ws(args) => ws::handle(args.command, &ctx, cli.output).await,
        Commands::Session(args) => session::handle(args.command, &ctx, cli.output).await,
        Commands::Mailbox(args) => mailbox::handle(args.command, &ctx, cli.output).await,
        Commands::Hooks(args) => hooks::handle(args.command, &ctx, cli.output).await,
        Commands::Config(_) => unreachable!(),
        Commands::Mcp => mcp::handle(&ctx).await,
    }
}
