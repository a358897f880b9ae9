//! Probe aggregation and threshold decision engine.
//!
//! The engine is pure: it takes probe records and thresholds, and returns
//! per-instance statistics and the actions to run. It does no I/O and no
//! logging.

pub mod aggregator;
pub mod classifier;
pub mod resolver;

pub use aggregator::aggregate;
pub use classifier::classify_all;
pub use resolver::resolve_all;
