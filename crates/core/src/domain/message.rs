use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::QueryResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<QueryResult>,
    /// Diagnostic query trace reported by the remote service, shown verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into(), Vec::new(), None)
    }

    pub fn assistant(
        content: impl Into<String>,
        results: Vec<QueryResult>,
        trace: Option<String>,
    ) -> Self {
        Self::new(MessageRole::Assistant, content.into(), results, trace)
    }

    fn new(
        role: MessageRole,
        content: String,
        results: Vec<QueryResult>,
        trace: Option<String>,
    ) -> Self {
        Self { id: Uuid::new_v4(), role, content, results, trace, created_at: Utc::now() }
    }
}
