use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

use crate::audit::MemoryAuditLog;
use crate::store::MemoryStore;
use crate::workflows::recovery::context::{RecoverySettings, RunContext};
use crate::workflows::recovery::domain::{
    Assignment, Candidate, CandidateId, CityId, Employee, EmployeeId, EmployeeRole,
};

pub(super) fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// The cutoff produced by [`scenario_store`].
pub(super) fn cutoff() -> NaiveDateTime {
    at(1, 10, 0)
}

pub(super) fn run_at() -> NaiveDateTime {
    at(2, 1, 12)
}

pub(super) fn employee(id: i64, name: &str, role: EmployeeRole, efficiency: i64) -> Employee {
    Employee {
        id: EmployeeId(id),
        name: name.to_string(),
        role,
        efficiency,
        attached_candidates_count: 0,
    }
}

pub(super) fn candidate(id: i64, city: i64, tested_at: Option<NaiveDateTime>) -> Candidate {
    Candidate {
        id: CandidateId(id),
        city_id: CityId(city),
        tested_at,
    }
}

pub(super) fn assignment(
    candidate: i64,
    city: i64,
    employee: i64,
    created_at: Option<NaiveDateTime>,
) -> Assignment {
    Assignment {
        candidate_id: CandidateId(candidate),
        city_id: CityId(city),
        employee_id: EmployeeId(employee),
        created_at,
    }
}

/// Two equally efficient recruiters, two developers, and three candidates:
/// candidate 1 was tested on Jan 5 and assigned to Anna on Jan 8, candidate 2
/// was assigned to Boris exactly at the cutoff, and candidate 3 was tested on
/// Jan 12 and never assigned.
pub(super) fn scenario_store() -> MemoryStore {
    MemoryStore::new()
        .with_employee(employee(1, "Anna Petrova", EmployeeRole::Recruiter, 5))
        .with_employee(employee(2, "Boris Orlov", EmployeeRole::Recruiter, 5))
        .with_employee(employee(10, "Dmitry Kuznetsov", EmployeeRole::Developer, 3))
        .with_employee(employee(11, "Elena Smirnova", EmployeeRole::Developer, 1))
        .with_employee(employee(20, "Fedor Volkov", EmployeeRole::Other, 9))
        .with_candidate(candidate(1, 1, Some(at(1, 5, 0))))
        .with_candidate(candidate(2, 1, Some(at(1, 9, 0))))
        .with_candidate(candidate(3, 1, Some(at(1, 12, 0))))
        .with_assignment(assignment(1, 1, 1, Some(at(1, 8, 0))))
        .with_assignment(assignment(2, 1, 2, Some(cutoff())))
}

pub(super) fn settings(report_dir: &Path, batch_limit: usize) -> RecoverySettings {
    RecoverySettings {
        batch_limit,
        report_dir: report_dir.to_path_buf(),
    }
}

pub(super) fn context<'a>(
    store: MemoryStore,
    audit: &'a MemoryAuditLog,
    report_dir: &Path,
) -> RunContext<MemoryStore, &'a MemoryAuditLog> {
    RunContext::new(store, audit, run_at(), settings(report_dir, 3000))
}

pub(super) fn rows_for(assignments: &[Assignment], candidate: i64, city: i64) -> Vec<&Assignment> {
    assignments
        .iter()
        .filter(|row| row.candidate_id == CandidateId(candidate) && row.city_id == CityId(city))
        .collect()
}
