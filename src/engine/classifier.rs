//! Threshold classification of routing instances.

use crate::models::{InstanceMap, InstanceStats, ThresholdPolicy, Verdict};

/// Classify one routing instance against the thresholds.
///
/// Both bounds are inclusive and the pass condition is checked first, so an
/// instance meeting both thresholds is `Pass`.
pub fn classify(stats: &InstanceStats, policy: &ThresholdPolicy) -> Verdict {
    if stats.pass_percent >= policy.pass_threshold {
        Verdict::Pass
    } else if stats.fail_percent >= policy.fail_threshold {
        Verdict::Fail
    } else {
        Verdict::Undetermined
    }
}

/// Classify every instance and store the verdict on its stats.
pub fn classify_all(instances: &mut InstanceMap, policy: &ThresholdPolicy) {
    for stats in instances.iter_mut() {
        stats.verdict = classify(stats, policy);
    }
}
