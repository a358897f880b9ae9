//! Text and JSON report generation.
//!
//! The text report mirrors what an operator reads in the log: the probe
//! results table, the routing instance summary and the commands that ran.

use crate::models::{ActionOutcome, ExecutionResult, InstanceStats, RunReport, ThresholdPolicy};
use anyhow::Result;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use std::path::Path;

const PROBE_HEADERS: [&str; 5] = [
    "routing instance",
    "test name",
    "target address",
    "status",
    "reason",
];

const INSTANCE_HEADERS: [&str; 7] = [
    "routing instance",
    "total count",
    "pass count",
    "fail count",
    "pass percent",
    "fail percent",
    "status",
];

/// Generate the complete text report.
pub fn generate_text_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str(&banner(&format!("rpm check for owner '{}'", report.owner)));
    output.push_str(&format!(
        "started: {}\nfinished: {}\n\n",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(ref err) = report.source_error {
        output.push_str(&format!("probe results unavailable: {}\n\n", err));
    }

    output.push_str(&banner("rpm test results:"));
    output.push_str(&probe_table(&report.instances).to_string());
    output.push_str("\n\n");

    output.push_str(&banner("routing-instance operational status based on RPM"));
    output.push_str(&format_thresholds(&report.policy));
    output.push('\n');
    output.push_str(&instance_table(&report.instances).to_string());
    output.push_str("\n\n");

    output.push_str(&banner("CLI commands to run:"));
    output.push_str(&generate_actions_section(&report.actions));

    output
}

/// One row per probe, grouped by routing instance.
pub fn probe_table(instances: &[InstanceStats]) -> Table {
    let mut table = plain_table(&PROBE_HEADERS);

    for stats in instances {
        for outcome in &stats.records {
            table.add_row(vec![
                Cell::new(&stats.name),
                Cell::new(&outcome.record.test_name),
                Cell::new(&outcome.record.target_address),
                Cell::new(if outcome.passed { "PASS" } else { "FAIL" }),
                Cell::new(outcome.reason()),
            ]);
        }
    }

    table
}

/// One row per routing instance with its counters and verdict.
pub fn instance_table(instances: &[InstanceStats]) -> Table {
    let mut table = plain_table(&INSTANCE_HEADERS);

    for stats in instances {
        table.add_row(vec![
            Cell::new(&stats.name),
            Cell::new(stats.total).set_alignment(CellAlignment::Right),
            Cell::new(stats.pass_count).set_alignment(CellAlignment::Right),
            Cell::new(stats.fail_count).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(stats.pass_percent)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(stats.fail_percent)).set_alignment(CellAlignment::Right),
            Cell::new(stats.verdict),
        ]);
    }

    table
}

fn generate_actions_section(actions: &[ActionOutcome]) -> String {
    if actions.is_empty() {
        return "no commands to run\n".to_string();
    }

    let mut section = String::new();

    for action in actions {
        let request = &action.request;
        section.push_str(&format!(
            "command for '{}' status of RI '{}': \"{}\"\n",
            request.verdict, request.instance_name, request.resolved_command
        ));

        match &action.result {
            ExecutionResult::Output(output) => {
                section.push_str(&format!("output:\n{}\n", output.trim_end()));
            }
            ExecutionResult::Failed(err) => {
                section.push_str(&format!("failed: {}\n", err));
            }
            ExecutionResult::Skipped => section.push_str("skipped (dry run)\n"),
        }
    }

    section
}

fn plain_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

fn banner(title: &str) -> String {
    let stars = "*".repeat(title.len());
    format!("{}\n{}\n{}\n", stars, title, stars)
}

/// Format a percentage with two decimals, e.g. `66.67%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Threshold line as operators know it, e.g. `pass threshold: 30.0%, ...`.
///
/// Thresholds keep their decimal point, so `30` prints as `30.0`.
pub fn format_thresholds(policy: &ThresholdPolicy) -> String {
    format!(
        "pass threshold: {:?}%, fail threshold: {:?}%",
        policy.pass_threshold, policy.fail_threshold
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a report to a file in the given format.
pub fn write_report(report: &RunReport, path: &Path, json: bool) -> Result<()> {
    let content = if json {
        generate_json_report(report)?
    } else {
        generate_text_report(report)
    };

    std::fs::write(path, content)?;
    Ok(())
}
