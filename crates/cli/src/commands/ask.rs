use std::sync::Arc;

use serde_json::Value;
use tally_agent::{QueryResolver, ResolutionOutcome};
use tally_core::{ChartSeries, Dataset, QueryResult, ResultPayload, Row};

use crate::commands::{build_runtime, init_tracing, load_config, CommandResult, EXIT_FAILURE};

const COMMAND: &str = "ask";

pub fn run(question: &str, json_output: bool, local_only: bool) -> CommandResult {
    if question.trim().is_empty() {
        return CommandResult::failure(
            COMMAND,
            "invalid_input",
            "question must not be empty",
            EXIT_FAILURE,
        );
    }

    let mut config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    if local_only {
        config.remote.enabled = false;
    }
    init_tracing(&config.logging.level);

    let resolver = match QueryResolver::from_config(&config, Arc::new(Dataset::sample())) {
        Ok(resolver) => resolver,
        Err(error) => {
            return CommandResult::failure(COMMAND, "remote_client", error.to_string(), EXIT_FAILURE)
        }
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(COMMAND, "runtime", format!("{error:#}"), EXIT_FAILURE)
        }
    };

    let outcome = runtime.block_on(resolver.resolve_query(question.trim()));

    let output = if json_output {
        match serde_json::to_string_pretty(&outcome) {
            Ok(output) => output,
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    "serialization",
                    error.to_string(),
                    EXIT_FAILURE,
                )
            }
        }
    } else {
        render_human(&outcome)
    };

    CommandResult { exit_code: 0, output }
}

pub fn render_human(outcome: &ResolutionOutcome) -> String {
    let mut lines = vec![outcome.message.clone()];

    for result in &outcome.results {
        lines.push(String::new());
        lines.extend(render_result(result));
    }

    if let Some(trace) = &outcome.trace {
        lines.push(String::new());
        lines.push(format!("query: {trace}"));
    }

    lines.join("\n")
}

fn render_result(result: &QueryResult) -> Vec<String> {
    let mut lines = vec![format!("## {}", result.title)];
    if let Some(description) = &result.description {
        lines.push(description.clone());
    }

    match &result.payload {
        ResultPayload::Text { formatted, .. } => lines.push(formatted.clone()),
        ResultPayload::Chart { series: ChartSeries::Points { points } } => {
            for point in points {
                let value = point.label.clone().unwrap_or_else(|| point.value.to_string());
                lines.push(format!("- {}: {value}", point.name));
            }
        }
        ResultPayload::Chart { series: ChartSeries::Rows { chart_type, data } } => {
            lines.push(format!("{} chart over {} rows", chart_type.as_str(), data.len()));
        }
        ResultPayload::Table { columns, rows } => {
            lines.push(columns.join(" | "));
            for row in rows {
                lines.push(render_row(columns, row));
            }
        }
    }

    lines
}

fn render_row(columns: &[String], row: &Row) -> String {
    columns
        .iter()
        .map(|column| match row.get(column) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tally_agent::{QueryResolver, ResolverOptions, WebhookResolver};
    use tally_core::Dataset;

    use super::render_human;

    async fn local_outcome(question: &str) -> tally_agent::ResolutionOutcome {
        let remote = WebhookResolver::new(None, std::time::Duration::from_secs(1)).expect("client");
        let resolver = QueryResolver::new(
            Arc::new(remote),
            Arc::new(Dataset::sample()),
            ResolverOptions::default(),
        );
        resolver.resolve_query(question).await
    }

    #[tokio::test]
    async fn renders_table_rows_in_column_order() {
        let outcome = local_outcome("Who are our top customers?").await;
        let rendered = render_human(&outcome);

        assert!(rendered.contains("## Top Customers by Sales"));
        assert!(rendered.contains("Company | Industry | Region | Total Sales"));
        assert!(rendered.contains("Acme Corp | Technology | North America | $250,000"));
    }

    #[tokio::test]
    async fn renders_chart_labels() {
        let outcome = local_outcome("Show me sales by region").await;
        let rendered = render_human(&outcome);

        assert!(rendered.contains("- North America: $250,000"));
    }

    #[tokio::test]
    async fn unrecognized_question_renders_message_only() {
        let outcome = local_outcome("hello there").await;
        let rendered = render_human(&outcome);

        assert_eq!(rendered, outcome.message);
    }
}
