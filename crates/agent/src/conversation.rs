use serde::Serialize;
use tally_core::{ChatMessage, Row};
use thiserror::Error;
use tracing::info;

use crate::runtime::{QueryResolver, ResolutionOutcome};

pub const GREETING: &str = "Hello! I'm your Sales AI Assistant. I can analyze your sales data and provide insights. Try asking me about \"Q1 2024 sales\", \"sales by region\", \"top customers\", or \"sales pipeline\". You can also upload CSV files or use voice input!";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("question must not be empty")]
    EmptyQuestion,
}

/// Rows parsed from a user-supplied file, kept for the rest of the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UploadedRows {
    pub filename: String,
    pub rows: Vec<Row>,
}

impl UploadedRows {
    pub fn new(filename: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { filename: filename.into(), rows }
    }

    pub fn announcement(&self) -> String {
        format!(
            "I've uploaded {} with {} rows of data. You can now ask me questions about this data.",
            self.filename,
            self.rows.len()
        )
    }
}

/// Append-only chat session. Owned by the caller; the resolver never sees it.
#[derive(Clone, Debug, Serialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    uploaded: Vec<UploadedRows>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING, Vec::new(), None)],
            uploaded: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn uploaded(&self) -> &[UploadedRows] {
        &self.uploaded
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub async fn ask(
        &mut self,
        resolver: &QueryResolver,
        question: &str,
    ) -> Result<ResolutionOutcome, ConversationError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ConversationError::EmptyQuestion);
        }

        self.messages.push(ChatMessage::user(question));
        let outcome = resolver.resolve_query(question).await;
        self.messages.push(ChatMessage::assistant(
            outcome.message.clone(),
            outcome.results.clone(),
            outcome.trace.clone(),
        ));

        Ok(outcome)
    }

    /// Voice input. Transcripts take the same path as typed questions.
    pub async fn submit_transcript(
        &mut self,
        resolver: &QueryResolver,
        transcript: &str,
    ) -> Result<ResolutionOutcome, ConversationError> {
        self.ask(resolver, transcript).await
    }

    pub async fn submit_upload(
        &mut self,
        resolver: &QueryResolver,
        upload: UploadedRows,
    ) -> Result<ResolutionOutcome, ConversationError> {
        let announcement = upload.announcement();
        info!(
            event_name = "conversation.upload.stored",
            filename = %upload.filename,
            rows = upload.rows.len(),
            "stored uploaded rows"
        );
        self.uploaded.push(upload);
        self.ask(resolver, &announcement).await
    }
}
