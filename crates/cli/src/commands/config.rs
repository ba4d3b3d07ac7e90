// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux config` — inspect and validate `.amux/config.yaml`.

use crate::color;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved config
    Show,
    /// Check config.yaml's shape and semantics without starting anything
    Validate,
}

pub async fn handle(command: ConfigCommand, project_root: &std::path::Path, format: OutputFormat) -> Result<()> {
    let path: PathBuf = project_root.join(".amux").join("config.yaml");
    match command {
        ConfigCommand::Show => {
            let config = amux_config::load(&path)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => {
                    println!("{} {}", color::header("version:"), config.version);
                    println!("{}", color::header("agents:"));
                    for (id, agent) in &config.agents {
                        println!("  {} — {} ({})", id, agent.name, agent.runtime);
                    }
                }
            }
        }
        ConfigCommand::Validate => match amux_config::load(&path) {
            Ok(_) => println!("{} is valid", path.display()),
            Err(e) => {
                eprintln!("{} is invalid: {}", path.display(), e);
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
