//! Run statistics for a streaming session.
//!
//! Tracks how many samples were pushed and how many inference calls ran,
//! without retaining any signal data. Counters are atomic so the main loop
//! and a status reporter can share one instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for one streaming run.
#[derive(Debug)]
pub struct RunStats {
    /// Number of samples pushed into the scheduler
    samples_pushed: AtomicU64,
    /// Number of inference calls that returned output
    inferences_run: AtomicU64,
    /// Number of inference calls that failed in the engine
    engine_failures: AtomicU64,
    /// Unique id for this run
    run_id: Uuid,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl RunStats {
    /// Create a new stats tracker.
    pub fn new() -> Self {
        Self {
            samples_pushed: AtomicU64::new(0),
            inferences_run: AtomicU64::new(0),
            engine_failures: AtomicU64::new(0),
            run_id: Uuid::new_v4(),
            run_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a stats tracker that can persist to the given path.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);
        stats
    }

    /// Record one pushed sample.
    pub fn record_sample(&self) {
        self.samples_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one successful inference call.
    pub fn record_inference(&self) {
        self.inferences_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one failed inference call.
    pub fn record_engine_failure(&self) {
        self.engine_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Unique id for this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            run_id: self.run_id,
            samples_pushed: self.samples_pushed.load(Ordering::Relaxed),
            inferences_run: self.inferences_run.load(Ordering::Relaxed),
            engine_failures: self.engine_failures.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_secs: (Utc::now() - self.run_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "Run {}:\n\
             - Samples pushed: {}\n\
             - Inferences run: {}\n\
             - Engine failures: {}\n\
             - Duration: {} seconds",
            snapshot.run_id,
            snapshot.samples_pushed,
            snapshot.inferences_run,
            snapshot.engine_failures,
            snapshot.run_duration_secs
        )
    }

    /// Save stats to disk, if a persistence path was configured.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let json =
                serde_json::to_string_pretty(&self.snapshot()).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub run_id: Uuid,
    pub samples_pushed: u64,
    pub inferences_run: u64,
    pub engine_failures: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_secs: u64,
}

/// Thread-safe shared stats handle.
pub type SharedRunStats = Arc<RunStats>;

/// Create a new shared stats tracker.
pub fn create_shared_stats() -> SharedRunStats {
    Arc::new(RunStats::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = RunStats::new();

        stats.record_sample();
        stats.record_sample();
        stats.record_inference();
        stats.record_engine_failure();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.samples_pushed, 2);
        assert_eq!(snapshot.inferences_run, 1);
        assert_eq!(snapshot.engine_failures, 1);
    }

    #[test]
    fn test_summary_format() {
        let stats = RunStats::new();
        stats.record_sample();

        let summary = stats.summary();
        assert!(summary.contains("Samples pushed: 1"));
        assert!(summary.contains("Inferences run: 0"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = RunStats::new();
        let json = serde_json::to_string(&stats.snapshot()).unwrap();
        assert!(json.contains("samples_pushed"));
    }
}
