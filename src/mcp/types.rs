//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

use crate::models::Decision;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpicRequest {
    #[schemars(description = "Epic UUID or exact epic name")]
    pub epic: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StartSessionRequest {
    #[schemars(description = "Epic UUID or exact epic name")]
    pub epic: String,
    #[schemars(description = "Optional id of your own conversation or run, stored for traceability")]
    #[serde(default)]
    pub external_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DecisionInput {
    #[schemars(description = "What was decided")]
    pub decision: String,
    #[schemars(description = "Why it was decided")]
    #[serde(default)]
    pub rationale: Option<String>,
}

impl From<DecisionInput> for Decision {
    fn from(input: DecisionInput) -> Self {
        Self {
            decision: input.decision,
            rationale: input.rationale,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EndSessionRequest {
    #[schemars(description = "Epic UUID or exact epic name")]
    pub epic: String,
    #[schemars(description = "Summary of what was accomplished in this session (required)")]
    pub summary: String,
    #[schemars(description = "Concrete next steps for whoever picks the epic up next")]
    #[serde(default)]
    pub next_steps: Option<Vec<String>>,
    #[schemars(description = "Anything blocking further progress")]
    #[serde(default)]
    pub blockers: Option<Vec<String>>,
    #[schemars(description = "Decisions made during the session, with optional rationale")]
    #[serde(default)]
    pub decisions: Option<Vec<DecisionInput>>,
    #[schemars(description = "Free-form context to hand off to the next session")]
    #[serde(default)]
    pub context_blob: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AbandonSessionRequest {
    #[schemars(description = "The UUID of the active session to abandon")]
    pub session_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SessionHistoryRequest {
    #[schemars(description = "Epic UUID or exact epic name")]
    pub epic: String,
    #[schemars(description = "Maximum number of sessions to return, newest first")]
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogSessionWorkRequest {
    #[schemars(description = "Epic UUID or exact epic name")]
    pub epic: String,
    #[schemars(description = "Type of work item: 'feature' or 'task'")]
    pub item_type: String,
    #[schemars(description = "UUID of the feature or task")]
    pub item_id: String,
    #[schemars(description = "Human-readable identifier of the item, e.g. 'F-3-2'")]
    pub identifier: String,
    #[schemars(description = "What happened, e.g. 'started', 'completed', 'blocked'")]
    pub action: String,
}
