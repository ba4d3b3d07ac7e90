// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux mailbox` — the message channel into and out of a session.

use crate::color;
use crate::context::AppContext;
use crate::output::OutputFormat;
use amux_core::{Direction, SessionId};
use amux_mailbox::ListOptions;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct MailboxArgs {
    #[command(subcommand)]
    pub command: MailboxCommand,
}

#[derive(Subcommand)]
pub enum MailboxCommand {
    /// Write a message into a session's mailbox `in/` directory
    Send {
        session_id: String,
        name: String,
        content: String,
    },
    /// List a session's mailbox messages, newest first
    Recv {
        session_id: String,
        /// Only messages going `in` or `out`
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print one message's contents
    Show {
        session_id: String,
        /// Filename under the mailbox directory, e.g. `1700000000-note.md`
        filename: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum DirectionArg {
    In,
    Out,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::In => Direction::In,
            DirectionArg::Out => Direction::Out,
        }
    }
}

pub async fn handle(command: MailboxCommand, ctx: &AppContext, format: OutputFormat) -> Result<()> {
    match command {
        MailboxCommand::Send { session_id, name, content } => {
            let id = SessionId::from(session_id);
            ctx.mailbox.initialize(&id)?;
            let entry = ctx.mailbox.send_message(&id, &name, &content)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
                OutputFormat::Text => println!("Sent {} to {}", entry.path.display(), id.as_str()),
            }
        }
        MailboxCommand::Recv { session_id, direction, limit } => {
            let id = SessionId::from(session_id);
            let entries = ctx.mailbox.list_messages(&id, ListOptions { direction: direction.map(Into::into), limit })?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("No messages");
                        return Ok(());
                    }
                    for e in &entries {
                        println!(
                            "{} {:<4} {}",
                            color::muted(&e.timestamp.to_string()),
                            e.direction.dir_name(),
                            e.name
                        );
                    }
                }
            }
        }
        MailboxCommand::Show { session_id, filename } => {
            let id = SessionId::from(session_id);
            let matches_filename = |e: &amux_core::MailboxEntry| e.path.file_name().map(|n| n.to_string_lossy() == filename).unwrap_or(false);
            let entry = ctx
                .mailbox
                .list_messages(&id, ListOptions { direction: None, limit: None })?
                .into_iter()
                .find(matches_filename)
                .ok_or_else(|| anyhow::anyhow!("no such mailbox message: {}", filename))?;
            let content = ctx.mailbox.read_message(&entry)?;
            print!("{}", content);
        }
    }
    Ok(())
}
