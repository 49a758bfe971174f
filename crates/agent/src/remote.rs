//! Client for the remote analysis webhook.
//!
//! The service is untrusted: replies are decoded into a loose JSON value and
//! then normalized field by field, so a malformed `data` or unknown
//! `chart_type` degrades to "absent" instead of failing the whole answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tally_core::config::RemoteConfig;
use tally_core::{ChartKind, Row};
use thiserror::Error;
use tracing::{debug, warn};

pub const ANALYZE_ACTION: &str = "analyze";
pub const PING_ACTION: &str = "ping";
const PROBE_QUESTION: &str = "test";
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Post,
    Get,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote analysis endpoint is not configured")]
    NotConfigured,
    #[error("could not build http client: {0}")]
    Client(String),
    #[error("remote request failed: {0}")]
    Transport(String),
    #[error("remote endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("remote response was not valid JSON: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Failures of the call itself, as opposed to the endpoint being absent.
    /// Only these warrant retrying with the other request method.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. } | Self::Decode(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

/// Normalized reply from the analysis service. `answer` is `None` when the
/// service had nothing authoritative to say.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RemoteAnswer {
    pub answer: Option<String>,
    pub data: Option<Vec<Row>>,
    pub chart_type: Option<ChartKind>,
    pub sql: Option<String>,
}

impl RemoteAnswer {
    pub fn has_answer(&self) -> bool {
        self.answer.is_some()
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            debug!(event_name = "remote.response.not_object", "remote reply is not a JSON object");
            return Self::default();
        };

        let answer = match fields.remove("answer") {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
            _ => None,
        };

        let data = match fields.remove("data") {
            Some(Value::Array(items)) => {
                let total = items.len();
                let rows: Vec<Row> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(row) => Some(row),
                        _ => None,
                    })
                    .collect();
                if rows.len() != total {
                    warn!(
                        event_name = "remote.response.rows_dropped",
                        dropped = total - rows.len(),
                        "remote data contained non-object rows"
                    );
                }
                Some(rows)
            }
            _ => None,
        };

        let chart_type = match fields.remove("chart_type") {
            Some(Value::String(raw)) => {
                let parsed = ChartKind::parse(&raw);
                if parsed.is_none() {
                    warn!(
                        event_name = "remote.response.unknown_chart_type",
                        chart_type = %raw,
                        "ignoring unsupported chart type"
                    );
                }
                parsed
            }
            _ => None,
        };

        let sql = match fields.remove("sql") {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };

        Self { answer, data, chart_type, sql }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbeReport {
    pub method: RequestMethod,
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait RemoteResolver: Send + Sync {
    async fn resolve(
        &self,
        question: &str,
        method: RequestMethod,
    ) -> Result<RemoteAnswer, RemoteError>;

    /// Connectivity check: GET first, then a `ping` POST.
    async fn probe(&self) -> Result<ProbeReport, RemoteError>;
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    question: &'a str,
    action: &'a str,
}

#[derive(Clone, Debug)]
pub struct WebhookResolver {
    client: Client,
    endpoint: Option<String>,
}

impl WebhookResolver {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| RemoteError::Client(error.to_string()))?;
        let endpoint = endpoint.map(|url| url.trim().to_string()).filter(|url| !url.is_empty());
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(
            config.active_url().map(str::to_string),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn require_endpoint(&self) -> Result<&str, RemoteError> {
        self.endpoint.as_deref().ok_or(RemoteError::NotConfigured)
    }
}

#[async_trait]
impl RemoteResolver for WebhookResolver {
    async fn resolve(
        &self,
        question: &str,
        method: RequestMethod,
    ) -> Result<RemoteAnswer, RemoteError> {
        let endpoint = self.require_endpoint()?;
        let request = AnalysisRequest { question, action: ANALYZE_ACTION };

        let builder = match method {
            RequestMethod::Post => self.client.post(endpoint).json(&request),
            RequestMethod::Get => self.client.get(endpoint).query(&request),
        };

        debug!(event_name = "remote.request.sent", method = %method, "calling analysis webhook");
        let response = builder.send().await?;
        let body = success_body(response).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|error| RemoteError::Decode(error.to_string()))?;

        Ok(RemoteAnswer::from_value(value))
    }

    async fn probe(&self) -> Result<ProbeReport, RemoteError> {
        let endpoint = self.require_endpoint()?;

        let response = self.client.get(endpoint).send().await?;
        if response.status().is_success() {
            return probe_report(RequestMethod::Get, response).await;
        }

        let ping = AnalysisRequest { question: PROBE_QUESTION, action: PING_ACTION };
        let response = self.client.post(endpoint).json(&ping).send().await?;
        if response.status().is_success() {
            return probe_report(RequestMethod::Post, response).await;
        }

        Err(status_error(response).await)
    }
}

async fn success_body(response: Response) -> Result<String, RemoteError> {
    if !response.status().is_success() {
        return Err(status_error(response).await);
    }
    Ok(response.text().await?)
}

async fn status_error(response: Response) -> RemoteError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(
        event_name = "remote.response.status_error",
        status,
        body = %truncate(&body),
        "analysis webhook returned non-success status"
    );
    RemoteError::Status { status, body }
}

async fn probe_report(method: RequestMethod, response: Response) -> Result<ProbeReport, RemoteError> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Ok(ProbeReport { method, status, body })
}

/// Shortened body for log fields; the error itself keeps the full text.
fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut shortened: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tally_core::ChartKind;

    use super::{
        truncate, RemoteAnswer, RemoteError, RemoteResolver, RequestMethod, WebhookResolver,
        MAX_ERROR_BODY_CHARS,
    };

    #[test]
    fn normalizes_complete_reply() {
        let answer = RemoteAnswer::from_value(json!({
            "answer": "Revenue grew 12%",
            "data": [{"month": "Jan", "revenue": 10}, {"month": "Feb", "revenue": 12}],
            "chart_type": "line",
            "sql": "SELECT month, revenue FROM sales",
            "extra": true
        }));

        assert_eq!(answer.answer.as_deref(), Some("Revenue grew 12%"));
        assert_eq!(answer.data.as_ref().map(Vec::len), Some(2));
        assert_eq!(answer.chart_type, Some(ChartKind::Line));
        assert_eq!(answer.sql.as_deref(), Some("SELECT month, revenue FROM sales"));
    }

    #[test]
    fn blank_or_non_string_answer_counts_as_absent() {
        assert!(!RemoteAnswer::from_value(json!({"answer": "   "})).has_answer());
        assert!(!RemoteAnswer::from_value(json!({"answer": 42})).has_answer());
        assert!(!RemoteAnswer::from_value(json!({"data": []})).has_answer());
        assert!(!RemoteAnswer::from_value(json!([{"answer": "array reply"}])).has_answer());
    }

    #[test]
    fn drops_malformed_rows_and_unknown_chart_types() {
        let answer = RemoteAnswer::from_value(json!({
            "answer": "ok",
            "data": [{"a": 1}, 2, "three", {"b": 2}],
            "chart_type": "scatter"
        }));

        assert_eq!(answer.data.as_ref().map(Vec::len), Some(2));
        assert_eq!(answer.chart_type, None);
    }

    #[test]
    fn empty_sql_is_carried_verbatim() {
        let answer = RemoteAnswer::from_value(json!({"answer": "ok", "sql": ""}));
        assert_eq!(answer.sql.as_deref(), Some(""));

        let answer = RemoteAnswer::from_value(json!({"answer": "ok", "sql": 7}));
        assert_eq!(answer.sql, None);
    }

    #[test]
    fn data_that_is_not_an_array_is_ignored() {
        let answer = RemoteAnswer::from_value(json!({"answer": "ok", "data": {"a": 1}}));
        assert_eq!(answer.data, None);
    }

    #[test]
    fn only_call_failures_are_transport_errors() {
        assert!(!RemoteError::NotConfigured.is_transport());
        assert!(!RemoteError::Client("tls".to_string()).is_transport());
        assert!(RemoteError::Transport("refused".to_string()).is_transport());
        assert!(RemoteError::Status { status: 404, body: String::new() }.is_transport());
        assert!(RemoteError::Decode("eof".to_string()).is_transport());
    }

    #[test]
    fn long_error_bodies_are_truncated_for_logs() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let truncated = truncate(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn missing_endpoint_reports_not_configured() {
        let resolver = WebhookResolver::new(Some("  ".to_string()), Duration::from_secs(1))
            .expect("client builds");

        assert_eq!(resolver.endpoint(), None);
        let error = resolver.resolve("q1 2024", RequestMethod::Post).await.expect_err("no url");
        assert!(matches!(error, RemoteError::NotConfigured));
        let error = resolver.probe().await.expect_err("no url");
        assert!(matches!(error, RemoteError::NotConfigured));
    }
}
