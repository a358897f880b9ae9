//! One probe check run: fetch, aggregate, classify, resolve, execute.

use crate::device::{CommandExecutor, ProbeSource};
use crate::engine;
use crate::models::{
    ActionOutcome, ActionRequest, CommandTemplates, ExecutionResult, RunReport, ThresholdPolicy,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Inputs for a check run.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// Probe owner to check.
    pub owner: String,
    /// Pass/fail thresholds.
    pub policy: ThresholdPolicy,
    /// Commands to run on PASS/FAIL.
    pub templates: CommandTemplates,
    /// Resolve actions without executing them.
    pub dry_run: bool,
}

/// Run a complete check for one owner.
///
/// A failed fetch is logged and treated as zero probe records. A failed
/// action is logged and recorded, and the remaining actions still run.
pub async fn run_check<S, E>(source: &S, executor: &E, settings: &CheckSettings) -> RunReport
where
    S: ProbeSource + ?Sized,
    E: CommandExecutor + ?Sized,
{
    let started_at = Utc::now();

    let (records, source_error) = match source.fetch(&settings.owner).await {
        Ok(records) => (records, None),
        Err(e) => {
            error!("Failed to fetch probe results for '{}': {}", settings.owner, e);
            (Vec::new(), Some(e.to_string()))
        }
    };
    info!(
        "Fetched {} probe results for owner '{}'",
        records.len(),
        settings.owner
    );

    let mut instances = engine::aggregate(&settings.owner, records);
    engine::classify_all(&mut instances, &settings.policy);
    let requests = engine::resolve_all(&instances, &settings.templates);
    debug!(
        "{} routing instances, {} commands resolved",
        instances.len(),
        requests.len()
    );

    let mut actions = Vec::with_capacity(requests.len());
    for request in requests {
        let result = execute_action(executor, &request, settings.dry_run).await;
        actions.push(ActionOutcome { request, result });
    }

    RunReport {
        owner: instances.owner().to_string(),
        started_at,
        finished_at: Utc::now(),
        policy: settings.policy,
        instances: instances.into_vec(),
        actions,
        source_error,
    }
}

async fn execute_action<E>(executor: &E, request: &ActionRequest, dry_run: bool) -> ExecutionResult
where
    E: CommandExecutor + ?Sized,
{
    info!(
        "command for '{}' status of RI '{}': \"{}\"",
        request.verdict, request.instance_name, request.resolved_command
    );

    if dry_run {
        info!("dry run, not executing");
        return ExecutionResult::Skipped;
    }

    match executor.execute(&request.resolved_command).await {
        Ok(output) => {
            info!("output:\n{}", output);
            ExecutionResult::Output(output)
        }
        Err(e) => {
            warn!(
                "command for '{}' status of RI '{}' failed: {}",
                request.verdict, request.instance_name, e
            );
            ExecutionResult::Failed(e.to_string())
        }
    }
}
