use super::super::domain::{
    Assignment, Candidate, CandidateId, CandidateKey, Employee, EmployeeId, EmployeeRole,
};
use super::views::{RoleReportRow, TopPerformer};
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Distinct candidates tested before the cutoff that a recruiter picked up
/// before the cutoff (matched on candidate id and city id).
pub(crate) fn count_pre_incident_assigned(
    employees: &[Employee],
    candidates: &[Candidate],
    assignments: &[Assignment],
    cutoff: NaiveDateTime,
) -> u64 {
    let recruiters: HashSet<EmployeeId> = employees
        .iter()
        .filter(|employee| employee.role == EmployeeRole::Recruiter)
        .map(|employee| employee.id)
        .collect();

    let assigned_early: HashSet<CandidateKey> = assignments
        .iter()
        .filter(|assignment| recruiters.contains(&assignment.employee_id))
        .filter(|assignment| assignment.created_before(cutoff))
        .map(Assignment::key)
        .collect();

    candidates
        .iter()
        .filter(|candidate| candidate.tested_at.is_some_and(|tested| tested < cutoff))
        .filter(|candidate| assigned_early.contains(&candidate.key()))
        .map(|candidate| candidate.id)
        .collect::<HashSet<CandidateId>>()
        .len() as u64
}

/// Before/after assignment counts for every employee of `role`, in id order.
/// Employees without any assignment still get a row of zeros.
pub(crate) fn build_role_rows(
    employees: &[Employee],
    assignments: &[Assignment],
    cutoff: NaiveDateTime,
    role: EmployeeRole,
) -> Vec<RoleReportRow> {
    let by_employee = index_by_employee(assignments);

    let mut members: Vec<&Employee> = employees
        .iter()
        .filter(|employee| employee.role == role)
        .collect();
    members.sort_by_key(|employee| employee.id);

    members
        .into_iter()
        .map(|employee| {
            let rows = by_employee
                .get(&employee.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let initial_count = rows.iter().filter(|row| row.created_before(cutoff)).count();
            let final_count = rows.iter().filter(|row| row.created_since(cutoff)).count();
            let assigned_candidates = rows
                .iter()
                .map(|row| row.candidate_id)
                .collect::<HashSet<_>>()
                .len();

            RoleReportRow {
                employee_id: employee.id,
                name: employee.name.clone(),
                initial_count: initial_count as u64,
                final_count: final_count as u64,
                assigned_candidates: assigned_candidates as u64,
            }
        })
        .collect()
}

/// The `role` member with the most assignments created at or after the cutoff.
/// Ties go to the lowest employee id; `None` when nobody got a new row.
pub(crate) fn find_top_performer(
    employees: &[Employee],
    assignments: &[Assignment],
    cutoff: NaiveDateTime,
    role: EmployeeRole,
) -> Option<TopPerformer> {
    let members: HashMap<EmployeeId, &Employee> = employees
        .iter()
        .filter(|employee| employee.role == role)
        .map(|employee| (employee.id, employee))
        .collect();

    let mut tallies: HashMap<EmployeeId, u64> = HashMap::new();
    for assignment in assignments {
        if members.contains_key(&assignment.employee_id) && assignment.created_since(cutoff) {
            *tallies.entry(assignment.employee_id).or_insert(0) += 1;
        }
    }

    tallies
        .into_iter()
        .min_by_key(|(employee_id, count)| (Reverse(*count), *employee_id))
        .and_then(|(employee_id, count)| {
            members.get(&employee_id).map(|employee| TopPerformer {
                employee_id,
                name: employee.name.clone(),
                new_assignments: count,
            })
        })
}

fn index_by_employee(assignments: &[Assignment]) -> HashMap<EmployeeId, Vec<&Assignment>> {
    let mut index: HashMap<EmployeeId, Vec<&Assignment>> = HashMap::new();
    for assignment in assignments {
        index.entry(assignment.employee_id).or_default().push(assignment);
    }
    index
}
