//! Data models for the probe checker.
//!
//! This module contains the core data structures shared by the engine,
//! the device layer and the report generator.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probe status text reported by the device for a successful probe.
pub const SUCCESS_STATUS: &str = "Response received";

/// A single probe test result as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// Owner of the probe.
    pub owner: String,
    /// Name of the probe test.
    pub test_name: String,
    /// Address the probe was sent to.
    pub target_address: String,
    /// Routing instance the probe ran in.
    pub routing_instance: String,
    /// Raw status text of the last probe.
    pub status_text: String,
}

impl ProbeRecord {
    /// Whether the status text is exactly the success sentinel.
    pub fn passed(&self) -> bool {
        self.status_text == SUCCESS_STATUS
    }
}

/// A probe record together with its derived pass/fail status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub record: ProbeRecord,
    pub passed: bool,
}

impl ProbeOutcome {
    pub fn reason(&self) -> &str {
        &self.record.status_text
    }
}

impl From<ProbeRecord> for ProbeOutcome {
    fn from(record: ProbeRecord) -> Self {
        let passed = record.passed();
        Self { record, passed }
    }
}

/// Health classification of a routing instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
    /// Neither threshold was reached.
    #[default]
    Undetermined,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

/// Running statistics for one routing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceStats {
    /// Routing instance name.
    pub name: String,
    /// Number of probes seen.
    pub total: u32,
    /// Number of passed probes.
    pub pass_count: u32,
    /// Number of failed probes.
    pub fail_count: u32,
    /// Share of passed probes, 0-100.
    pub pass_percent: f64,
    /// Share of failed probes, 0-100.
    pub fail_percent: f64,
    /// Classification, `Undetermined` until classified.
    pub verdict: Verdict,
    /// Probe outcomes in arrival order.
    pub records: Vec<ProbeOutcome>,
}

impl InstanceStats {
    /// Creates empty statistics for a routing instance.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total: 0,
            pass_count: 0,
            fail_count: 0,
            pass_percent: 0.0,
            fail_percent: 0.0,
            verdict: Verdict::Undetermined,
            records: Vec::new(),
        }
    }

    /// Counts one outcome and recomputes both percentages from the counters.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        self.total += 1;
        if outcome.passed {
            self.pass_count += 1;
        } else {
            self.fail_count += 1;
        }

        let total = f64::from(self.total);
        self.pass_percent = f64::from(self.pass_count) * 100.0 / total;
        self.fail_percent = f64::from(self.fail_count) * 100.0 / total;

        self.records.push(outcome);
    }
}

/// Per-instance statistics keyed by routing instance, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceMap {
    owner: String,
    instances: IndexMap<String, InstanceStats>,
}

impl InstanceMap {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            instances: IndexMap::new(),
        }
    }

    /// Owner the records were fetched for.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the stats for `name`, creating them on first use.
    pub fn entry(&mut self, name: &str) -> &mut InstanceStats {
        self.instances
            .entry(name.to_string())
            .or_insert_with(|| InstanceStats::new(name))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &InstanceStats> {
        self.instances.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut InstanceStats> {
        self.instances.values_mut()
    }

    pub fn into_vec(self) -> Vec<InstanceStats> {
        self.instances.into_values().collect()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&InstanceStats> {
        self.instances.get(name)
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Pass/fail thresholds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub pass_threshold: f64,
    pub fail_threshold: f64,
}

pub const DEFAULT_PASS_THRESHOLD: f64 = 30.0;
pub const DEFAULT_FAIL_THRESHOLD: f64 = 100.0;

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            fail_threshold: DEFAULT_FAIL_THRESHOLD,
        }
    }
}

/// Command templates run on a determinate verdict. Empty means no action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplates {
    pub pass: String,
    pub fail: String,
}

/// A command to run for a classified routing instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub instance_name: String,
    pub verdict: Verdict,
    pub resolved_command: String,
}

/// What happened when an action was handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum ExecutionResult {
    /// Raw command output.
    Output(String),
    /// Error description.
    Failed(String),
    /// Not executed (dry run).
    Skipped,
}

impl ExecutionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub request: ActionRequest,
    pub result: ExecutionResult,
}

/// Everything a single check run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Probe owner the run was made for.
    pub owner: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Thresholds used for classification.
    pub policy: ThresholdPolicy,
    /// Per-instance statistics in first-seen order.
    pub instances: Vec<InstanceStats>,
    /// Resolved actions and their execution results.
    pub actions: Vec<ActionOutcome>,
    /// Set when probe results could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
}

impl RunReport {
    /// Number of actions whose execution failed.
    pub fn failed_actions(&self) -> usize {
        self.actions.iter().filter(|a| a.result.is_failure()).count()
    }

    /// Total number of probe records across all instances.
    pub fn total_probes(&self) -> u32 {
        self.instances.iter().map(|i| i.total).sum()
    }
}
