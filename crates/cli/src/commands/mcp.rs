// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `amux mcp` — serves the MCP tool surface over stdio for an MCP client.

use crate::context::AppContext;
use amux_mcp::AmuxServer;
use anyhow::Result;

pub async fn handle(ctx: &AppContext) -> Result<()> {
    let server = AmuxServer::new(
        ctx.project_root.clone(),
        ctx.workspaces.clone(),
        ctx.sessions.clone(),
        ctx.mailbox.clone(),
        ctx.hooks.clone(),
        ctx.config.clone(),
    );
    amux_mcp::serve_stdio(server).await
}
