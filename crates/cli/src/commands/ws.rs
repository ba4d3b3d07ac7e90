// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux ws` — workspace management commands.

use crate::color;
use crate::context::AppContext;
use crate::output::OutputFormat;
use crate::table::{Column, Table};
use amux_workspace::{CreateOptions, ListOptions, RemoveOptions};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct WsArgs {
    #[command(subcommand)]
    pub command: WsCommand,
}

#[derive(Subcommand)]
pub enum WsCommand {
    /// Create a new isolated workspace
    Create {
        /// Workspace name (slugified into the branch name)
        name: String,
        /// Base branch to branch from (defaults to the repo's current branch)
        #[arg(long)]
        base: Option<String>,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },
    /// List all workspaces
    List {
        /// Hide orphaned/inconsistent entries
        #[arg(long)]
        consistent_only: bool,
    },
    /// Show details of a workspace, including its holders
    Show {
        /// Workspace ID, short index, or name
        identifier: String,
    },
    /// Remove a workspace
    Remove {
        /// Workspace ID, short index, or name
        identifier: String,
        /// Remove even if the workspace has active holders
        #[arg(long)]
        force: bool,
    },
    /// Remove every orphaned workspace (missing worktree or storage dir)
    Prune {
        /// Show what would be pruned without doing it
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle(command: WsCommand, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    match command {
        WsCommand::Create { name, base, description } => {
            let workspace = ctx
                .workspaces
                .create(
                    &ctx.project_root,
                    CreateOptions {
                        name,
                        description: description.unwrap_or_default(),
                        base_branch: base,
                        auto_created: false,
                    },
                )
                .await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&workspace)?),
                OutputFormat::Text => {
                    println!("{} {} ({})", color::header("Created workspace"), workspace.id.as_str(), workspace.branch);
                    println!("  worktree: {}", workspace.worktree_path.display());
                }
            }
        }
        WsCommand::List { consistent_only } => {
            let workspaces = ctx.workspaces.list(ListOptions { consistent_only })?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&workspaces)?),
                OutputFormat::Text => {
                    if workspaces.is_empty() {
                        println!("No workspaces");
                        return Ok(());
                    }
                    let mut table = Table::new(vec![
                        Column::muted("ID"),
                        Column::left("NAME"),
                        Column::left("BRANCH"),
                        Column::status("STATUS"),
                    ]);
                    for w in &workspaces {
                        let status = w.consistency.map(|c| c.to_string()).unwrap_or_else(|| "consistent".to_string());
                        table.row(vec![w.id.as_str().to_string(), w.name.clone(), w.branch.clone(), status]);
                    }
                    table.render(&mut std::io::stdout());
                }
            }
        }
        WsCommand::Show { identifier } => {
            let workspace = ctx.workspaces.resolve(&identifier)?;
            let holders = ctx.workspaces.holders(&identifier)?;
            match format {
                OutputFormat::Json => {
                    let obj = serde_json::json!({ "workspace": workspace, "holders": holders });
                    println!("{}", serde_json::to_string_pretty(&obj)?);
                }
                OutputFormat::Text => {
                    println!("{} {}", color::header("Workspace:"), workspace.id.as_str());
                    println!("  {} {}", color::context("Name:"), workspace.name);
                    println!("  {} {}", color::context("Branch:"), workspace.branch);
                    println!("  {} {}", color::context("Worktree:"), workspace.worktree_path.display());
                    println!("  {} {}", color::context("Holders:"), holders.len());
                    for h in &holders {
                        println!("    - {} (acquired at {})", h.description, h.acquired_at);
                    }
                }
            }
        }
        WsCommand::Remove { identifier, force } => {
            ctx.workspaces.remove(&ctx.project_root, &identifier, RemoveOptions { force }).await?;
            println!("Removed workspace {}", identifier);
        }
        WsCommand::Prune { dry_run } => {
            let orphaned: Vec<_> = ctx
                .workspaces
                .list(ListOptions::default())?
                .into_iter()
                .filter(|w| matches!(w.consistency, Some(c) if c != amux_core::WorkspaceConsistency::Consistent))
                .collect();

            for w in &orphaned {
                let label = if dry_run { "Would prune" } else { "Pruning" };
                println!("{} {} ({})", label, w.id.as_str(), w.name);
                if !dry_run {
                    ctx.workspaces.remove(&ctx.project_root, w.id.as_str(), RemoveOptions { force: true }).await?;
                }
            }
            println!("{} workspace(s) {}", orphaned.len(), if dry_run { "would be pruned" } else { "pruned" });
        }
    }
    Ok(())
}
