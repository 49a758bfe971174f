use serde::Serialize;
use tally_agent::{RemoteResolver, WebhookResolver};
use tally_core::config::{AppConfig, LoadOptions};
use tally_core::Dataset;

use crate::commands::{build_runtime, CommandResult, EXIT_CONFIG, EXIT_FAILURE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let (report, config_loaded) = build_report();
    let exit_code = match (report.overall_status, config_loaded) {
        (CheckStatus::Fail, false) => EXIT_CONFIG,
        (CheckStatus::Fail, true) => EXIT_FAILURE,
        _ => 0,
    };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> (DoctorReport, bool) {
    let mut checks = Vec::new();
    checks.push(check_dataset());

    let config_loaded = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_remote_endpoint(&config));
            true
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "remote_endpoint",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            false
        }
    };

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, config_loaded)
}

fn check_dataset() -> DoctorCheck {
    let summary = Dataset::sample().summary();
    DoctorCheck {
        name: "bundled_dataset",
        status: CheckStatus::Pass,
        details: format!(
            "{} accounts, {} deals ({} closed won, {} orphaned)",
            summary.accounts, summary.deals, summary.won_deals, summary.orphaned_deals
        ),
    }
}

fn check_remote_endpoint(config: &AppConfig) -> DoctorCheck {
    if config.remote.active_url().is_none() {
        return DoctorCheck {
            name: "remote_endpoint",
            status: CheckStatus::Skipped,
            details: "no webhook configured; answers come from the bundled dataset".to_string(),
        };
    }

    let remote = match WebhookResolver::from_config(&config.remote) {
        Ok(remote) => remote,
        Err(error) => {
            return DoctorCheck {
                name: "remote_endpoint",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "remote_endpoint",
                status: CheckStatus::Fail,
                details: format!("{error:#}"),
            };
        }
    };

    match runtime.block_on(remote.probe()) {
        Ok(report) => DoctorCheck {
            name: "remote_endpoint",
            status: CheckStatus::Pass,
            details: format!("{} answered with status {}", report.method, report.status),
        },
        Err(error) => DoctorCheck {
            name: "remote_endpoint",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
