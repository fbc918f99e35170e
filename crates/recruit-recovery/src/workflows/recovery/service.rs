use super::context::RunContext;
use super::cutoff::resolve_cutoff;
use super::distribution::{DistributionEngine, DistributionMode, DistributionOutcome};
use super::domain::EmployeeRole;
use super::report::{
    build_role_rows, count_pre_incident_assigned, find_top_performer, ReportBundle, ReportError,
    ReportWriter, RoleReport, TopPerformer,
};
use crate::audit::AuditSink;
use crate::store::{RecruitmentStore, StoreError};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStep {
    Statistics,
    Distribution,
    Reports,
    TopDeveloper,
}

impl RecoveryStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Statistics => "statistics",
            Self::Distribution => "candidate distribution",
            Self::Reports => "report generation",
            Self::TopDeveloper => "top developer lookup",
        }
    }
}

impl fmt::Display for RecoveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error raised by the recovery service.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("cannot proceed with {step}: the CRM failure cutoff could not be determined")]
    CutoffUndetermined { step: RecoveryStep },
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: RecoveryStep,
    pub cutoff_undetermined: bool,
    pub message: String,
}

/// Outcome of a full run. Steps that failed have no result and an entry in `failures`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub cutoff: Option<NaiveDateTime>,
    pub pre_incident_assigned: Option<u64>,
    pub distribution: Option<DistributionOutcome>,
    pub reports: Option<ReportBundle>,
    pub top_developer: Option<TopPerformer>,
    pub failures: Vec<StepFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, step: RecoveryStep) -> bool {
        self.failures.iter().any(|failure| failure.step == step)
    }
}

/// Service composing the cutoff resolver, distribution engine, and reporting.
///
/// The cutoff is resolved once, when the service is built, and shared by every
/// operation of the run.
pub struct RecruitmentRecovery<S, A> {
    ctx: RunContext<S, A>,
    cutoff: Option<NaiveDateTime>,
}

impl<S, A> RecruitmentRecovery<S, A>
where
    S: RecruitmentStore,
    A: AuditSink,
{
    pub fn new(ctx: RunContext<S, A>) -> Result<Self, RecoveryError> {
        let cutoff = resolve_cutoff(&ctx.store)?;
        match cutoff {
            Some(cutoff) => {
                info!(%cutoff, "incident cutoff resolved");
                ctx.audit
                    .record(&format!("Last correct assignment date before CRM failure: {cutoff}"));
            }
            None => {
                warn!("no dated recruiter assignment found; cutoff undetermined");
                ctx.audit.record("Unable to determine the CRM failure date.");
            }
        }

        Ok(Self { ctx, cutoff })
    }

    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        self.cutoff
    }

    pub fn context(&self) -> &RunContext<S, A> {
        &self.ctx
    }

    pub fn into_context(self) -> RunContext<S, A> {
        self.ctx
    }

    fn require_cutoff(&self, step: RecoveryStep) -> Result<NaiveDateTime, RecoveryError> {
        self.cutoff.ok_or_else(|| {
            self.ctx.audit.record(&format!(
                "Unable to determine the CRM failure date; {step} not performed."
            ));
            RecoveryError::CutoffUndetermined { step }
        })
    }

    /// How many candidates completed the test and were assigned to a recruiter before the failure.
    pub fn stats(&self) -> Result<u64, RecoveryError> {
        let cutoff = self.require_cutoff(RecoveryStep::Statistics)?;
        self.ctx.audit.record("Generating statistics...");

        let store = &self.ctx.store;
        let count = count_pre_incident_assigned(
            &store.employees()?,
            &store.candidates()?,
            &store.assignments()?,
            cutoff,
        );

        info!(count, "pre-incident recruiter assignments counted");
        self.ctx
            .audit
            .record(&format!("Candidates assigned before CRM failure: {count}"));
        Ok(count)
    }

    /// Refreshes attached counts and distributes post-incident candidates atomically.
    pub fn distribute(&mut self, mode: DistributionMode) -> Result<DistributionOutcome, RecoveryError> {
        let cutoff = self.require_cutoff(RecoveryStep::Distribution)?;
        self.ctx.audit.record("Distributing candidates...");

        let engine = DistributionEngine::new(self.ctx.settings.batch_limit);
        let outcome = match engine.distribute(&mut self.ctx.store, cutoff, self.ctx.run_at, mode) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.ctx
                    .audit
                    .record(&format!("Candidates distribution failed and was rolled back: {err}"));
                return Err(err.into());
            }
        };

        let recruiters = outcome.assigned_to(EmployeeRole::Recruiter);
        let developers = outcome.assigned_to(EmployeeRole::Developer);
        let message = match mode {
            DistributionMode::Commit => format!(
                "Candidates distribution completed: {recruiters} to recruiters, {developers} to developers."
            ),
            DistributionMode::DryRun => format!(
                "Dry run: would assign {recruiters} to recruiters, {developers} to developers; nothing persisted."
            ),
        };
        self.ctx.audit.record(&message);
        Ok(outcome)
    }

    /// Builds the report for one role and writes its CSV artifact.
    pub fn role_report(&self, role: EmployeeRole) -> Result<RoleReport, RecoveryError> {
        let cutoff = self.require_cutoff(RecoveryStep::Reports)?;
        self.build_role_report(cutoff, role)
    }

    fn build_role_report(
        &self,
        cutoff: NaiveDateTime,
        role: EmployeeRole,
    ) -> Result<RoleReport, RecoveryError> {
        let store = &self.ctx.store;
        let rows = build_role_rows(&store.employees()?, &store.assignments()?, cutoff, role);

        let writer = ReportWriter::new(&self.ctx.settings.report_dir);
        let file_name = format!("{}.csv", role.report_name());
        let artifact = writer.write(role.report_name(), &rows)?;
        match &artifact {
            Some(_) => self.ctx.audit.record(&format!("Report {file_name} created.")),
            None => {
                info!(%role, "no employees to report");
                self.ctx.audit.record(&format!("No data to write to {file_name}"));
            }
        }

        Ok(RoleReport {
            role,
            rows,
            artifact,
        })
    }

    /// Recruiter and developer reports.
    pub fn generate_reports(&self) -> Result<ReportBundle, RecoveryError> {
        let cutoff = self.require_cutoff(RecoveryStep::Reports)?;
        self.ctx.audit.record("Generating reports...");

        let recruiters = self.build_role_report(cutoff, EmployeeRole::Recruiter)?;
        let developers = self.build_role_report(cutoff, EmployeeRole::Developer)?;

        self.ctx.audit.record("Reports generated.");
        Ok(ReportBundle {
            recruiters,
            developers,
        })
    }

    /// The developer who received the most new candidates in this or any
    /// earlier post-incident run.
    pub fn top_developer(&self) -> Result<Option<TopPerformer>, RecoveryError> {
        let cutoff = self.require_cutoff(RecoveryStep::TopDeveloper)?;
        self.ctx.audit.record("Finding top developer...");

        let store = &self.ctx.store;
        let top = find_top_performer(
            &store.employees()?,
            &store.assignments()?,
            cutoff,
            EmployeeRole::Developer,
        );

        match &top {
            Some(performer) => self.ctx.audit.record(&format!(
                "Top developer: {} with {} candidates.",
                performer.name, performer.new_assignments
            )),
            None => self.ctx.audit.record("No new candidates for developers."),
        }
        Ok(top)
    }

    /// Runs every step in order. A failed step is recorded and the run moves on.
    pub fn run(&mut self, mode: DistributionMode) -> RunSummary {
        let mut failures = Vec::new();

        let pre_incident_assigned = self.capture(RecoveryStep::Statistics, &mut failures, |svc| svc.stats());
        let distribution = self.capture_mut(RecoveryStep::Distribution, &mut failures, |svc| {
            svc.distribute(mode)
        });
        let reports = self.capture(RecoveryStep::Reports, &mut failures, |svc| svc.generate_reports());
        let top_developer = self
            .capture(RecoveryStep::TopDeveloper, &mut failures, |svc| svc.top_developer())
            .flatten();

        RunSummary {
            cutoff: self.cutoff,
            pre_incident_assigned,
            distribution,
            reports,
            top_developer,
            failures,
        }
    }

    fn capture<T>(
        &self,
        step: RecoveryStep,
        failures: &mut Vec<StepFailure>,
        op: impl FnOnce(&Self) -> Result<T, RecoveryError>,
    ) -> Option<T> {
        let result = op(self);
        self.settle(step, failures, result)
    }

    fn capture_mut<T>(
        &mut self,
        step: RecoveryStep,
        failures: &mut Vec<StepFailure>,
        op: impl FnOnce(&mut Self) -> Result<T, RecoveryError>,
    ) -> Option<T> {
        let result = op(self);
        self.settle(step, failures, result)
    }

    fn settle<T>(
        &self,
        step: RecoveryStep,
        failures: &mut Vec<StepFailure>,
        result: Result<T, RecoveryError>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%step, error = %err, "recovery step failed");
                if !matches!(err, RecoveryError::CutoffUndetermined { .. }) {
                    self.ctx.audit.record(&format!("Step {step} failed: {err}"));
                }
                failures.push(StepFailure {
                    step,
                    cutoff_undetermined: matches!(err, RecoveryError::CutoffUndetermined { .. }),
                    message: err.to_string(),
                });
                None
            }
        }
    }
}
