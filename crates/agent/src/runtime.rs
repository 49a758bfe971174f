use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tally_core::config::AppConfig;
use tally_core::{aggregate, classify, Dataset, Intent, QueryResult};
use tracing::{info, warn};
use uuid::Uuid;

use crate::remote::{RemoteAnswer, RemoteError, RemoteResolver, RequestMethod, WebhookResolver};

pub const REMOTE_TABLE_TITLE: &str = "Query Results";
pub const REMOTE_CHART_TITLE: &str = "Query Chart";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Remote,
    Local,
}

/// The result envelope handed to renderers, plus where it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolutionOutcome {
    pub message: String,
    pub results: Vec<QueryResult>,
    pub source: AnswerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    pub correlation_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Upper bound for both remote attempts together.
    pub remote_deadline: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { remote_deadline: Duration::from_secs(30) }
    }
}

impl ResolverOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        // Each attempt has its own client timeout; leave room for both.
        Self { remote_deadline: Duration::from_secs(config.remote.timeout_secs.saturating_mul(2)) }
    }
}

/// Query resolution entry point. Stateless and cheap to clone; share one
/// instance across concurrent requests.
#[derive(Clone)]
pub struct QueryResolver {
    remote: Arc<dyn RemoteResolver>,
    dataset: Arc<Dataset>,
    options: ResolverOptions,
}

impl QueryResolver {
    pub fn new(
        remote: Arc<dyn RemoteResolver>,
        dataset: Arc<Dataset>,
        options: ResolverOptions,
    ) -> Self {
        Self { remote, dataset, options }
    }

    pub fn from_config(config: &AppConfig, dataset: Arc<Dataset>) -> Result<Self, RemoteError> {
        let remote = WebhookResolver::from_config(&config.remote)?;
        info!(
            event_name = "query.resolver.initialized",
            remote_configured = remote.endpoint().is_some(),
            timeout_secs = config.remote.timeout_secs,
            "query resolver initialized"
        );
        Ok(Self::new(Arc::new(remote), dataset, ResolverOptions::from_config(config)))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Resolves a question. Never fails: remote problems are logged and the
    /// local aggregator answers instead.
    pub async fn resolve_query(&self, question: &str) -> ResolutionOutcome {
        let correlation_id = Uuid::new_v4().to_string();

        if let Some(answer) = self.resolve_remote(question, &correlation_id).await {
            info!(
                event_name = "query.resolved",
                correlation_id = %correlation_id,
                source = "remote",
                has_rows = answer.data.is_some(),
                "query answered by remote service"
            );
            return remote_outcome(answer, correlation_id);
        }

        let intent = classify(question);
        info!(
            event_name = "query.local.fallback",
            correlation_id = %correlation_id,
            intent = intent.label(),
            "answering from local dataset"
        );
        let local = aggregate(intent, question, &self.dataset);
        info!(
            event_name = "query.resolved",
            correlation_id = %correlation_id,
            source = "local",
            intent = intent.label(),
            result_count = local.results.len(),
            "query answered by local aggregator"
        );

        ResolutionOutcome {
            message: local.message,
            results: local.results,
            source: AnswerSource::Local,
            intent: Some(intent),
            trace: None,
            correlation_id,
        }
    }

    async fn resolve_remote(&self, question: &str, correlation_id: &str) -> Option<RemoteAnswer> {
        let attempts = self.remote_attempts(question, correlation_id);
        let reply = match tokio::time::timeout(self.options.remote_deadline, attempts).await {
            Ok(reply) => reply?,
            Err(_) => {
                warn!(
                    event_name = "query.remote.deadline_exceeded",
                    correlation_id = %correlation_id,
                    deadline_ms = self.options.remote_deadline.as_millis() as u64,
                    "remote attempts exceeded deadline, falling back to local answer"
                );
                return None;
            }
        };

        if !reply.has_answer() {
            info!(
                event_name = "query.remote.no_answer",
                correlation_id = %correlation_id,
                "remote service replied without an answer, falling back to local answer"
            );
            return None;
        }

        Some(reply)
    }

    /// POST, then GET only if the POST itself failed in transit. A POST that
    /// completes without an answer is returned as-is.
    async fn remote_attempts(&self, question: &str, correlation_id: &str) -> Option<RemoteAnswer> {
        let error = match self.remote.resolve(question, RequestMethod::Post).await {
            Ok(reply) => return Some(reply),
            Err(error) => error,
        };

        if !error.is_transport() {
            info!(
                event_name = "query.remote.skipped",
                correlation_id = %correlation_id,
                reason = %error,
                "remote service unavailable, using local answer"
            );
            return None;
        }

        warn!(
            event_name = "query.remote.post_failed",
            correlation_id = %correlation_id,
            error = %error,
            "remote POST failed, retrying with GET"
        );

        match self.remote.resolve(question, RequestMethod::Get).await {
            Ok(reply) => Some(reply),
            Err(error) => {
                warn!(
                    event_name = "query.remote.get_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "remote GET failed, falling back to local answer"
                );
                None
            }
        }
    }
}

fn remote_outcome(reply: RemoteAnswer, correlation_id: String) -> ResolutionOutcome {
    let RemoteAnswer { answer, data, chart_type, sql } = reply;
    let rows = data.filter(|rows| !rows.is_empty());

    let mut results = Vec::new();
    if let Some(rows) = &rows {
        results.push(QueryResult::table(REMOTE_TABLE_TITLE, rows.clone()));
    }
    if let (Some(kind), Some(rows)) = (chart_type, rows) {
        results.push(QueryResult::remote_chart(REMOTE_CHART_TITLE, kind, rows));
    }

    ResolutionOutcome {
        message: answer.unwrap_or_default(),
        results,
        source: AnswerSource::Remote,
        intent: None,
        trace: sql,
        correlation_id,
    }
}
