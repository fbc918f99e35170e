use crate::audit::AuditSink;
use crate::config::{RecoveryConfig, DEFAULT_BATCH_LIMIT};
use crate::store::RecruitmentStore;
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Per-run knobs that are not part of the data snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverySettings {
    pub batch_limit: usize,
    pub report_dir: PathBuf,
}

impl RecoverySettings {
    pub fn from_config(config: &RecoveryConfig) -> Self {
        Self {
            batch_limit: config.batch_limit,
            report_dir: config.report_dir.clone(),
        }
    }
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            report_dir: PathBuf::from("."),
        }
    }
}

/// Everything an operation needs, passed explicitly instead of living in globals.
pub struct RunContext<S, A> {
    pub store: S,
    pub audit: A,
    /// Timestamp stamped on every assignment created by this run.
    pub run_at: NaiveDateTime,
    pub settings: RecoverySettings,
}

impl<S, A> RunContext<S, A>
where
    S: RecruitmentStore,
    A: AuditSink,
{
    pub fn new(store: S, audit: A, run_at: NaiveDateTime, settings: RecoverySettings) -> Self {
        Self {
            store,
            audit,
            run_at,
            settings,
        }
    }
}
