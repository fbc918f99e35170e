//! Post-incident candidate recovery.
//!
//! A run resolves the incident cutoff once, then reports the pre-incident
//! baseline, distributes unassigned post-incident candidates to recruiters and
//! developers inside one store transaction, and reports the outcome per employee.

pub mod capacity;
mod context;
pub mod cutoff;
pub mod distribution;
pub mod domain;
pub mod report;
mod service;

#[cfg(test)]
mod tests;

pub use capacity::CapacityTracker;
pub use context::{RecoverySettings, RunContext};
pub use cutoff::resolve_cutoff;
pub use distribution::{
    DistributionEngine, DistributionMode, DistributionOutcome, EmployeeAllocation, PhaseOutcome,
};
pub use domain::{
    Assignment, Candidate, CandidateId, CandidateKey, CityId, Employee, EmployeeId, EmployeeRole,
};
pub use report::{ReportBundle, ReportError, RoleReport, RoleReportRow, TopPerformer};
pub use service::{RecoveryError, RecoveryStep, RecruitmentRecovery, RunSummary, StepFailure};
