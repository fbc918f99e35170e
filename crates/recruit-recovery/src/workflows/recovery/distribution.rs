use super::capacity::CapacityTracker;
use super::domain::{Assignment, Candidate, CandidateKey, Employee, EmployeeId, EmployeeRole};
use crate::store::{commit_or_rollback, RecruitmentStore, StoreError};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    Commit,
    /// Runs both phases, then rolls the transaction back.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeAllocation {
    pub employee_id: EmployeeId,
    pub name: String,
    pub assigned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseOutcome {
    pub role: EmployeeRole,
    pub eligible: usize,
    pub assigned: usize,
    /// True when eligible candidates were left behind because of the batch limit.
    pub capped: bool,
    pub allocations: Vec<EmployeeAllocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionOutcome {
    pub mode: DistributionMode,
    pub cutoff: NaiveDateTime,
    pub assigned_at: NaiveDateTime,
    pub refreshed_employees: usize,
    pub phases: Vec<PhaseOutcome>,
}

impl DistributionOutcome {
    pub fn phase(&self, role: EmployeeRole) -> Option<&PhaseOutcome> {
        self.phases.iter().find(|phase| phase.role == role)
    }

    pub fn assigned_to(&self, role: EmployeeRole) -> usize {
        self.phase(role).map_or(0, |phase| phase.assigned)
    }

    pub fn total_assigned(&self) -> usize {
        self.phases.iter().map(|phase| phase.assigned).sum()
    }
}

/// Two-phase, capacity-aware allocation of post-incident candidates.
///
/// Recruiters are served first, developers second; each phase creates at most
/// `batch_limit` rows. The count refresh and both phases share one transaction.
#[derive(Debug, Clone, Copy)]
pub struct DistributionEngine {
    batch_limit: usize,
}

impl DistributionEngine {
    pub fn new(batch_limit: usize) -> Self {
        Self { batch_limit }
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    pub fn distribute<S: RecruitmentStore>(
        &self,
        store: &mut S,
        cutoff: NaiveDateTime,
        run_at: NaiveDateTime,
        mode: DistributionMode,
    ) -> Result<DistributionOutcome, StoreError> {
        let assigned_at = if run_at < cutoff {
            warn!(%run_at, %cutoff, "run time precedes cutoff; stamping new rows with the cutoff");
            cutoff
        } else {
            run_at
        };

        store.begin()?;
        let outcome = match self.run_phases(store, cutoff, assigned_at, mode) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback) = store.rollback() {
                    warn!(error = %rollback, "rollback after failed distribution also failed");
                }
                return Err(err);
            }
        };

        match mode {
            DistributionMode::Commit => commit_or_rollback(store)?,
            DistributionMode::DryRun => store.rollback()?,
        }

        info!(
            ?mode,
            recruiters = outcome.assigned_to(EmployeeRole::Recruiter),
            developers = outcome.assigned_to(EmployeeRole::Developer),
            "distribution finished"
        );
        Ok(outcome)
    }

    fn run_phases<S: RecruitmentStore>(
        &self,
        store: &mut S,
        cutoff: NaiveDateTime,
        assigned_at: NaiveDateTime,
        mode: DistributionMode,
    ) -> Result<DistributionOutcome, StoreError> {
        let mut tracker = CapacityTracker::refresh(store)?;
        let employees = store.employees()?;

        let mut phases = Vec::with_capacity(2);
        for role in EmployeeRole::distributed() {
            let pool: Vec<Employee> = employees
                .iter()
                .filter(|employee| employee.role == role)
                .cloned()
                .collect();
            phases.push(self.run_phase(store, &mut tracker, role, &pool, cutoff, assigned_at)?);
        }

        tracker.persist_touched(store)?;

        Ok(DistributionOutcome {
            mode,
            cutoff,
            assigned_at,
            refreshed_employees: tracker.employees(),
            phases,
        })
    }

    fn run_phase<S: RecruitmentStore>(
        &self,
        store: &mut S,
        tracker: &mut CapacityTracker,
        role: EmployeeRole,
        pool: &[Employee],
        cutoff: NaiveDateTime,
        assigned_at: NaiveDateTime,
    ) -> Result<PhaseOutcome, StoreError> {
        let candidates = store.candidates()?;
        let assignments = store.assignments()?;
        let eligible = eligible_candidates(&candidates, &assignments, cutoff);

        let mut per_employee: BTreeMap<EmployeeId, usize> = BTreeMap::new();
        let mut assigned = 0;

        if pool.is_empty() {
            warn!(%role, eligible = eligible.len(), "no employees available for phase");
        } else {
            for candidate in eligible.iter().take(self.batch_limit) {
                let Some(employee) = tracker.select(pool) else {
                    break;
                };
                store.insert_assignment(&Assignment {
                    candidate_id: candidate.id,
                    city_id: candidate.city_id,
                    employee_id: employee.id,
                    created_at: Some(assigned_at),
                })?;
                tracker.record(employee.id);
                *per_employee.entry(employee.id).or_insert(0) += 1;
                assigned += 1;
            }
        }

        let allocations = per_employee
            .into_iter()
            .map(|(employee_id, count)| EmployeeAllocation {
                employee_id,
                name: pool
                    .iter()
                    .find(|employee| employee.id == employee_id)
                    .map(|employee| employee.name.clone())
                    .unwrap_or_default(),
                assigned: count,
            })
            .collect();

        info!(%role, eligible = eligible.len(), assigned, "distribution phase complete");

        Ok(PhaseOutcome {
            role,
            eligible: eligible.len(),
            assigned,
            capped: !pool.is_empty() && eligible.len() > self.batch_limit,
            allocations,
        })
    }
}

/// Candidates tested at or after the cutoff whose (candidate, city) pair has no
/// assignment row, ordered by test time, then candidate id, then city id.
pub(crate) fn eligible_candidates(
    candidates: &[Candidate],
    assignments: &[Assignment],
    cutoff: NaiveDateTime,
) -> Vec<Candidate> {
    let mut seen: HashSet<CandidateKey> = assignments.iter().map(Assignment::key).collect();

    let mut eligible: Vec<Candidate> = candidates
        .iter()
        .filter(|candidate| candidate.tested_at.is_some_and(|tested| tested >= cutoff))
        .cloned()
        .collect();
    eligible.sort_by_key(|candidate| (candidate.tested_at, candidate.id, candidate.city_id));
    // first occurrence wins when a snapshot repeats a candidate/city pair
    eligible.retain(|candidate| seen.insert(candidate.key()));
    eligible
}
