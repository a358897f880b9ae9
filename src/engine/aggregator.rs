//! Per-routing-instance aggregation of probe results.

use crate::models::{InstanceMap, ProbeOutcome, ProbeRecord};

/// Fold probe records into per-routing-instance statistics.
///
/// Records are processed in arrival order. An instance is created the first
/// time one of its records is seen, so every instance in the result has at
/// least one record. `owner` is carried through as-is; records are not
/// filtered on it.
pub fn aggregate<I>(owner: &str, records: I) -> InstanceMap
where
    I: IntoIterator<Item = ProbeRecord>,
{
    let mut instances = InstanceMap::new(owner);

    for record in records {
        let outcome = ProbeOutcome::from(record);
        instances
            .entry(&outcome.record.routing_instance)
            .record(outcome);
    }

    instances
}
