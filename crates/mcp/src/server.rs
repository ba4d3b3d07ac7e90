// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The MCP tool surface itself: one tool per RPC operation,
//! each a thin wrapper over the manager it delegates to.

use amux_core::HookEvent;
use amux_hooks::{hash_hook_config, HookContext, HookEngine};
use amux_mailbox::{sanitize_name, ListOptions as MailboxListOptions, MailboxManager};
use amux_session::{CreateOptions as SessionCreateOptions, ListOptions as SessionListOptions, SessionManager, StopOptions};
use amux_storage::StorageSurface;
use amux_workspace::{CreateOptions as WorkspaceCreateOptions, ListOptions as WorkspaceListOptions, RemoveOptions, WorkspaceManager};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn ok_json<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn tool_error(e: impl std::fmt::Display) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WorkspaceCreateRequest {
    pub name: String,
    #[serde(default)]
    pub base_branch: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdentifierRequest {
    pub identifier: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WorkspaceRemoveRequest {
    pub identifier: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StoragePathRequest {
    pub identifier: String,
    #[serde(default)]
    pub rel: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StorageWriteRequest {
    pub identifier: String,
    pub rel: String,
    pub content: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct StorageRemoveRequest {
    pub identifier: String,
    pub rel: String,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionCreateRequest {
    pub agent_id: String,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub initial_prompt: Option<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionListRequest {
    #[serde(default)]
    pub workspace: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionSendInputRequest {
    pub identifier: String,
    pub text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SessionOutputRequest {
    pub identifier: String,
    #[serde(default = "default_output_lines")]
    pub lines: u32,
}

fn default_output_lines() -> u32 {
    200
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MailboxSendRequest {
    pub session_id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MailboxListRequest {
    pub session_id: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MailboxReadRequest {
    pub session_id: String,
    pub direction: String,
    pub timestamp: u64,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MailboxCleanRequest {
    pub session_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HooksTestRequest {
    pub event: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HooksTrustRequest {
    pub trusted_by: String,
}

fn parse_direction(raw: &str) -> Result<amux_core::Direction, McpError> {
    match raw {
        "in" => Ok(amux_core::Direction::In),
        "out" => Ok(amux_core::Direction::Out),
        other => Err(McpError::invalid_params(format!("unknown mailbox direction '{other}'"), None)),
    }
}

fn parse_event(raw: &str) -> Result<HookEvent, McpError> {
    match raw {
        "workspace_create" => Ok(HookEvent::WorkspaceCreate),
        "workspace_remove" => Ok(HookEvent::WorkspaceRemove),
        "session_start" => Ok(HookEvent::SessionStart),
        "session_stop" => Ok(HookEvent::SessionStop),
        other => Err(McpError::invalid_params(format!("unknown hook event '{other}'"), None)),
    }
}

/// Binds the workspace, session, mailbox, and hook managers as MCP tools. One instance is created per
/// running `amux mcp` process, rooted at a single project.
#[derive(Clone)]
pub struct AmuxServer {
    project_root: PathBuf,
    workspaces: Arc<WorkspaceManager>,
    sessions: Arc<SessionManager>,
    mailbox: Arc<MailboxManager>,
    hooks: Arc<HookEngine>,
    config: Arc<amux_core::Config>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

#[tool_router]
impl AmuxServer {
    pub fn new(
        project_root: PathBuf,
        workspaces: Arc<WorkspaceManager>,
        sessions: Arc<SessionManager>,
        mailbox: Arc<MailboxManager>,
        hooks: Arc<HookEngine>,
        config: Arc<amux_core::Config>,
    ) -> Self {
        Self {
            project_root,
            workspaces,
            sessions,
            mailbox,
            hooks,
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn storage_surface(&self, identifier: &str) -> Result<StorageSurface, McpError> {
        if let Ok(workspace) = self.workspaces.resolve(identifier) {
            return Ok(StorageSurface::new(workspace.storage_path));
        }
        let session = self.sessions.resolve(identifier).map_err(tool_error)?;
        Ok(StorageSurface::new(session.storage_path))
    }

    #[tool(description = "Create a new isolated workspace (git worktree + storage)")]
    async fn workspace_create(&self, Parameters(req): Parameters<WorkspaceCreateRequest>) -> Result<CallToolResult, McpError> {
        let workspace = self
            .workspaces
            .create(
                &self.project_root,
                WorkspaceCreateOptions {
                    name: req.name,
                    description: req.description.unwrap_or_default(),
                    base_branch: req.base_branch,
                    auto_created: false,
                },
            )
            .await
            .map_err(tool_error)?;
        ok_json(&workspace)
    }

    #[tool(description = "List all workspaces with consistency status and holder count")]
    async fn workspace_list(&self) -> Result<CallToolResult, McpError> {
        let workspaces = self.workspaces.list(WorkspaceListOptions::default()).map_err(tool_error)?;
        ok_json(&workspaces)
    }

    #[tool(description = "Show full detail for one workspace, including its holders")]
    async fn workspace_show(&self, Parameters(req): Parameters<IdentifierRequest>) -> Result<CallToolResult, McpError> {
        let workspace = self.workspaces.resolve(&req.identifier).map_err(tool_error)?;
        let holders = self.workspaces.holders(&req.identifier).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "workspace": workspace, "holders": holders }))
    }

    #[tool(description = "Remove a workspace; errors if in use unless forced")]
    async fn workspace_remove(&self, Parameters(req): Parameters<WorkspaceRemoveRequest>) -> Result<CallToolResult, McpError> {
        self.workspaces
            .remove(&self.project_root, &req.identifier, RemoveOptions { force: req.force })
            .await
            .map_err(tool_error)?;
        ok_json(&serde_json::json!({ "removed": req.identifier }))
    }

    #[tool(description = "Read a file confined to a workspace's or session's storage root")]
    async fn workspace_storage_read(&self, Parameters(req): Parameters<StoragePathRequest>) -> Result<CallToolResult, McpError> {
        let surface = self.storage_surface(&req.identifier)?;
        let bytes = surface.read_file(Path::new(&req.rel)).map_err(tool_error)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        ok_json(&serde_json::json!({ "content": text }))
    }

    #[tool(description = "Write a file confined to a workspace's or session's storage root")]
    async fn workspace_storage_write(&self, Parameters(req): Parameters<StorageWriteRequest>) -> Result<CallToolResult, McpError> {
        let surface = self.storage_surface(&req.identifier)?;
        surface.write_file(Path::new(&req.rel), req.content.as_bytes()).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "written": req.rel }))
    }

    #[tool(description = "List files under a path confined to a workspace's or session's storage root")]
    async fn workspace_storage_list(&self, Parameters(req): Parameters<StoragePathRequest>) -> Result<CallToolResult, McpError> {
        let surface = self.storage_surface(&req.identifier)?;
        let entries = surface.list_files(Path::new(&req.rel)).map_err(tool_error)?;
        ok_json(&entries.into_iter().map(|e| e.relative_path.display().to_string()).collect::<Vec<_>>())
    }

    #[tool(description = "Remove a file or directory confined to a workspace's or session's storage root")]
    async fn workspace_storage_remove(&self, Parameters(req): Parameters<StorageRemoveRequest>) -> Result<CallToolResult, McpError> {
        let surface = self.storage_surface(&req.identifier)?;
        surface.remove(Path::new(&req.rel)).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "removed": req.rel }))
    }

    #[tool(description = "Create and start a new supervised agent session")]
    async fn session_create(&self, Parameters(req): Parameters<SessionCreateRequest>) -> Result<CallToolResult, McpError> {
        let session = self
            .sessions
            .create(
                &self.project_root,
                &self.config,
                SessionCreateOptions {
                    agent_id: req.agent_id,
                    workspace: req.workspace,
                    name: req.name,
                    description: req.description,
                    initial_prompt: req.initial_prompt,
                    env: req.env,
                    runtime_override: None,
                    no_hooks: false,
                },
            )
            .await
            .map_err(tool_error)?;
        ok_json(&session)
    }

    #[tool(description = "List sessions, optionally scoped to one workspace, with fresh status")]
    async fn session_list(&self, Parameters(req): Parameters<SessionListRequest>) -> Result<CallToolResult, McpError> {
        let sessions = self
            .sessions
            .list(SessionListOptions { workspace: req.workspace })
            .map_err(tool_error)?;
        ok_json(&sessions)
    }

    #[tool(description = "Show full detail for one session, with fresh status")]
    async fn session_show(&self, Parameters(req): Parameters<IdentifierRequest>) -> Result<CallToolResult, McpError> {
        let session = self.sessions.refresh_status(&req.identifier).await.map_err(tool_error)?;
        ok_json(&session)
    }

    #[tool(description = "Inject text into a running session's process")]
    async fn session_send_input(&self, Parameters(req): Parameters<SessionSendInputRequest>) -> Result<CallToolResult, McpError> {
        self.sessions.send_input(&req.identifier, &req.text).await.map_err(tool_error)?;
        ok_json(&serde_json::json!({ "sent": true }))
    }

    #[tool(description = "Captured output snapshot from a session's process")]
    async fn session_output(&self, Parameters(req): Parameters<SessionOutputRequest>) -> Result<CallToolResult, McpError> {
        let output = self.sessions.output(&req.identifier, req.lines).await.map_err(tool_error)?;
        ok_json(&serde_json::json!({ "output": output }))
    }

    #[tool(description = "Gracefully stop a running session")]
    async fn session_stop(&self, Parameters(req): Parameters<IdentifierRequest>) -> Result<CallToolResult, McpError> {
        let session = self
            .sessions
            .stop(&req.identifier, StopOptions { no_hooks: false })
            .await
            .map_err(tool_error)?;
        ok_json(&session)
    }

    #[tool(description = "Tear down and delete a session")]
    async fn session_remove(&self, Parameters(req): Parameters<IdentifierRequest>) -> Result<CallToolResult, McpError> {
        self.sessions.remove(&req.identifier).await.map_err(tool_error)?;
        ok_json(&serde_json::json!({ "removed": req.identifier }))
    }

    #[tool(description = "Write a message file into a session's mailbox in/ directory")]
    async fn mailbox_send(&self, Parameters(req): Parameters<MailboxSendRequest>) -> Result<CallToolResult, McpError> {
        let id = amux_core::SessionId::from(req.session_id);
        self.mailbox.initialize(&id).map_err(tool_error)?;
        let entry = self.mailbox.send_message(&id, &req.name, &req.content).map_err(tool_error)?;
        ok_json(&entry)
    }

    #[tool(description = "Enumerate a session's mailbox messages, newest first")]
    async fn mailbox_list(&self, Parameters(req): Parameters<MailboxListRequest>) -> Result<CallToolResult, McpError> {
        let id = amux_core::SessionId::from(req.session_id);
        let direction = req.direction.as_deref().map(parse_direction).transpose()?;
        let entries = self
            .mailbox
            .list_messages(&id, MailboxListOptions { direction, limit: req.limit })
            .map_err(tool_error)?;
        ok_json(&entries)
    }

    #[tool(description = "Read one mailbox message's contents as UTF-8 text")]
    async fn mailbox_read(&self, Parameters(req): Parameters<MailboxReadRequest>) -> Result<CallToolResult, McpError> {
        let direction = parse_direction(&req.direction)?;
        let id = amux_core::SessionId::from(req.session_id);
        let entry = self
            .mailbox
            .list_messages(&id, MailboxListOptions { direction: Some(direction), limit: None })
            .map_err(tool_error)?
            .into_iter()
            .find(|e| e.timestamp == req.timestamp && e.name == sanitize_name(&req.name))
            .ok_or_else(|| McpError::invalid_params("no matching mailbox message", None))?;
        let content = self.mailbox.read_message(&entry).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "content": content }))
    }

    #[tool(description = "Remove a session's whole mailbox tree")]
    async fn mailbox_clean(&self, Parameters(req): Parameters<MailboxCleanRequest>) -> Result<CallToolResult, McpError> {
        let id = amux_core::SessionId::from(req.session_id);
        self.mailbox.clean(&id).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "cleaned": id.as_str() }))
    }

    #[tool(description = "List configured hooks per lifecycle event")]
    async fn hooks_list(&self) -> Result<CallToolResult, McpError> {
        let config = self.hooks.load_config().map_err(tool_error)?;
        ok_json(&config)
    }

    #[tool(description = "Record the current hooks.yaml as trusted, enabling it to run")]
    async fn hooks_trust(&self, Parameters(req): Parameters<HooksTrustRequest>) -> Result<CallToolResult, McpError> {
        let config = self.hooks.load_config().map_err(tool_error)?;
        let hash = hash_hook_config(&config).map_err(tool_error)?;
        self.hooks
            .trust_store()
            .trust(hash.clone(), &req.trusted_by, now_unix())
            .map_err(tool_error)?;
        ok_json(&serde_json::json!({ "trusted_hash": hash }))
    }

    #[tool(description = "Dry-run the hooks registered for one lifecycle event, ignoring trust")]
    async fn hooks_test(&self, Parameters(req): Parameters<HooksTestRequest>) -> Result<CallToolResult, McpError> {
        let event = parse_event(&req.event)?;
        let config = self.hooks.load_config().map_err(tool_error)?;
        let hooks = self.hooks.hooks_for_event(&config, event);
        let context = HookContext {
            project_root: self.project_root.clone(),
            ..Default::default()
        };
        let results = self
            .hooks
            .run_event_ignoring_trust(event, &hooks, &self.project_root, &context)
            .await
            .map_err(tool_error)?;
        ok_json(&results)
    }

    #[tool(description = "Write a starter hooks.yaml if one doesn't already exist")]
    async fn hooks_init(&self) -> Result<CallToolResult, McpError> {
        let path = amux_hooks::default_hooks_template_path(&self.project_root);
        let created = amux_hooks::write_default_template(&path).map_err(tool_error)?;
        ok_json(&serde_json::json!({ "path": path, "created": created }))
    }
}

#[tool_handler]
impl ServerHandler for AmuxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Amux control plane: create isolated workspaces, start supervised agent sessions in them, \
                 and exchange mailbox messages with a running session."
                    .to_string(),
            ),
        }
    }
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
