// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux hooks` — lifecycle hook configuration and trust management.

use crate::color;
use crate::context::AppContext;
use crate::output::OutputFormat;
use amux_core::HookEvent;
use amux_hooks::HookContext;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct HooksArgs {
    #[command(subcommand)]
    pub command: HooksCommand,
}

#[derive(Subcommand)]
pub enum HooksCommand {
    /// Write a starter hooks.yaml if one doesn't already exist
    Init,
    /// Record the current hooks.yaml as trusted, enabling it to run
    Trust {
        /// Identifies who is granting trust, recorded in .hooks-trust.yaml
        #[arg(long, default_value = "cli")]
        by: String,
    },
    /// List configured hooks per lifecycle event
    List,
    /// Dry-run the hooks for one lifecycle event, ignoring trust
    Test {
        #[arg(value_enum)]
        event: EventArg,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum EventArg {
    WorkspaceCreate,
    WorkspaceRemove,
    SessionStart,
    SessionStop,
}

impl From<EventArg> for HookEvent {
    fn from(value: EventArg) -> Self {
        match value {
            EventArg::WorkspaceCreate => HookEvent::WorkspaceCreate,
            EventArg::WorkspaceRemove => HookEvent::WorkspaceRemove,
            EventArg::SessionStart => HookEvent::SessionStart,
            EventArg::SessionStop => HookEvent::SessionStop,
        }
    }
}

pub async fn handle(command: HooksCommand, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    match command {
        HooksCommand::Init => {
            let path = amux_hooks::default_hooks_template_path(&ctx.project_root);
            let created = amux_hooks::write_default_template(&path)?;
            if created {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
        }
        HooksCommand::Trust { by } => {
            let config = ctx.hooks.load_config()?;
            let hash = amux_hooks::hash_hook_config(&config)?;
            let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs();
            ctx.hooks.trust_store().trust(hash.clone(), &by, now)?;
            println!("Trusted hooks.yaml ({})", &hash[..12.min(hash.len())]);
        }
        HooksCommand::List => {
            let config = ctx.hooks.load_config()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => {
                    if config.is_empty() {
                        println!("No hooks configured");
                        return Ok(());
                    }
                    for (event, specs) in &config {
                        println!("{}", color::header(&event.to_string()));
                        for spec in specs {
                            println!("  - {}", spec.name);
                        }
                    }
                }
            }
        }
        HooksCommand::Test { event } => {
            let event: HookEvent = event.into();
            let config = ctx.hooks.load_config()?;
            let specs = ctx.hooks.hooks_for_event(&config, event);
            let context = HookContext {
                project_root: ctx.project_root.clone(),
                ..Default::default()
            };
            let results = ctx.hooks.run_event_ignoring_trust(event, &specs, &ctx.project_root, &context).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for r in &results {
                        let verdict = if r.error.is_some() { color::status("failed") } else { color::status("completed") };
                        println!("{} {} ({}ms)", verdict, r.name, (r.ended_at.saturating_sub(r.started_at)) * 1000);
                        if !r.output.is_empty() {
                            println!("{}", r.output);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
