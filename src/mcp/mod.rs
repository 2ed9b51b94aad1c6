//! MCP server exposing session lifecycle and planning tools to agents.

mod types;

use std::str::FromStr;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::Coordinator;
use crate::error::SessionError;
use crate::models::*;

#[derive(Clone)]
pub struct McpServer {
    sessions: Coordinator,
    history_limit: usize,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(sessions: Coordinator, history_limit: usize) -> Self {
        Self {
            sessions,
            history_limit,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn session_error(e: SessionError) -> McpError {
        match e {
            SessionError::NotFound(msg) | SessionError::Validation(msg) => {
                McpError::invalid_params(msg, None)
            }
            SessionError::Storage(e) => McpError::internal_error(e.to_string(), None),
        }
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // ============================================================
    // Tool logic, shared by the tools and by tests
    // ============================================================

    pub fn test_start_session(
        &self,
        epic: &str,
        external_id: Option<String>,
    ) -> Result<StartSessionResult, McpError> {
        self.sessions
            .start_session(epic, StartSessionInput { external_id })
            .map_err(Self::session_error)
    }

    pub fn test_end_session(&self, req: EndSessionRequest) -> Result<Session, McpError> {
        let input = EndSessionInput {
            summary: req.summary,
            next_steps: req.next_steps,
            blockers: req.blockers,
            decisions: req
                .decisions
                .map(|decisions| decisions.into_iter().map(Decision::from).collect()),
            context_blob: req.context_blob,
        };
        self.sessions
            .end_session(&req.epic, input)
            .map_err(Self::session_error)
    }

    pub fn test_abandon_session(&self, session_id: &str) -> Result<Session, McpError> {
        let session_id = Self::parse_uuid(session_id)?;
        self.sessions
            .abandon_session(session_id)
            .map_err(Self::session_error)
    }

    pub fn test_session_history(
        &self,
        epic: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Session>, McpError> {
        self.sessions
            .get_session_history(epic, limit.unwrap_or(self.history_limit))
            .map_err(Self::session_error)
    }

    /// Validates the request shape; the logging itself never fails.
    pub fn test_log_session_work(
        &self,
        req: LogSessionWorkRequest,
    ) -> Result<Option<Session>, McpError> {
        let kind = WorkItemKind::from_str(&req.item_type).map_err(|_| {
            McpError::invalid_params(
                format!(
                    "Invalid item_type '{}'. Must be: feature or task",
                    req.item_type
                ),
                None,
            )
        })?;
        let id = Self::parse_uuid(&req.item_id)?;

        Ok(self.sessions.log_work(
            &req.epic,
            LogWorkInput {
                kind,
                id,
                identifier: req.identifier,
                action: req.action,
            },
        ))
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        description = "Start a working session on an epic. Call this FIRST when you begin work on an epic. Any session still active on the epic is abandoned. Returns the new session, the previous session (read its summary, next_steps, blockers and decisions to continue where it left off), and epic progress counts."
    )]
    async fn start_session(
        &self,
        params: Parameters<StartSessionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = self.test_start_session(&req.epic, req.external_id)?;
        Self::json_result(&result)
    }

    #[tool(
        description = "End the active session on an epic with a handoff for the next session. Call this when you stop working. summary is required; next_steps, blockers, decisions and context_blob are optional but make the next session far more effective. Fails if the epic has no active session."
    )]
    async fn end_session(
        &self,
        params: Parameters<EndSessionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.test_end_session(params.0)?;
        Self::json_result(&session)
    }

    #[tool(
        description = "Abandon an active session without a handoff. Use when the session's work is being discarded. Fails if the session is not active."
    )]
    async fn abandon_session(
        &self,
        params: Parameters<AbandonSessionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.test_abandon_session(&params.0.session_id)?;
        Self::json_result(&session)
    }

    #[tool(
        description = "Get the active session for an epic, or null if none is active."
    )]
    async fn get_active_session(
        &self,
        params: Parameters<EpicRequest>,
    ) -> Result<CallToolResult, McpError> {
        let session = self
            .sessions
            .get_active_session(&params.0.epic)
            .map_err(Self::session_error)?;
        Self::json_result(&session)
    }

    #[tool(
        description = "List past and current sessions for an epic, newest first. Use this to review what previous sessions accomplished."
    )]
    async fn get_session_history(
        &self,
        params: Parameters<SessionHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let sessions = self.test_session_history(&req.epic, req.limit)?;
        Self::json_result(&sessions)
    }

    #[tool(
        description = "Record work on a feature or task in the epic's active session. Use action 'started', 'completed' or 'blocked'. Does nothing (returns null) when the epic has no active session."
    )]
    async fn log_session_work(
        &self,
        params: Parameters<LogSessionWorkRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self.test_log_session_work(params.0)? {
            Some(session) => Self::json_result(&session),
            None => Ok(CallToolResult::success(vec![Content::text(
                "No active session - nothing logged",
            )])),
        }
    }

    #[tool(
        description = "Get the execution plan for an epic's features: ordered phases, where each phase lists items that can start once earlier phases are done. can_run_in_parallel marks phases whose items may run concurrently. had_cycle is true when a dependency cycle was broken by forcing items into one phase."
    )]
    async fn get_execution_plan(
        &self,
        params: Parameters<EpicRequest>,
    ) -> Result<CallToolResult, McpError> {
        let plan = self
            .sessions
            .execution_plan(&params.0.epic)
            .map_err(Self::session_error)?;
        Self::json_result(&plan)
    }

    #[tool(
        description = "Get completion counts for an epic: total, completed and in-progress features, plus total and completed tasks."
    )]
    async fn get_progress_summary(
        &self,
        params: Parameters<EpicRequest>,
    ) -> Result<CallToolResult, McpError> {
        let progress = self
            .sessions
            .progress(&params.0.epic)
            .map_err(Self::session_error)?;
        Self::json_result(&progress)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "spectree".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"SpecTree plans and tracks agent work on epics (epic → features → tasks).

SESSION WORKFLOW:
1. Call start_session with the epic. Read previous_session for the last handoff.
2. Call get_execution_plan to see which features are ready now and which can run in parallel.
3. As you work, call log_session_work with action 'started', 'completed' or 'blocked'.
4. Call end_session with a summary, next steps, blockers and decisions before you stop.

Only one session per epic is active at a time. Starting a new one abandons the old one."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(server: McpServer) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let running = server.serve((stdin(), stdout())).await?;

    let quit_reason = running.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
