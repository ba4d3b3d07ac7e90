// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires [`AmuxServer`](crate::AmuxServer) to stdio, the transport the `amux
//! mcp` subcommand uses when an agent's MCP client spawns it as a child
//! process.

use crate::AmuxServer;
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;

/// Serves `server` over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(server: AmuxServer) -> anyhow::Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
