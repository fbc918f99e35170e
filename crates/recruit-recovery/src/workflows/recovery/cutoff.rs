use super::domain::{Assignment, Employee, EmployeeId, EmployeeRole};
use crate::store::{RecruitmentStore, StoreError};
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Latest creation timestamp among recruiter assignments, i.e. the last moment
/// the CRM still recorded recruiter assignments correctly.
///
/// `None` means the cutoff cannot be determined and nothing downstream may run.
pub fn resolve_cutoff<S: RecruitmentStore>(store: &S) -> Result<Option<NaiveDateTime>, StoreError> {
    let employees = store.employees()?;
    let assignments = store.assignments()?;
    Ok(latest_for_role(&employees, &assignments, EmployeeRole::Recruiter))
}

pub(crate) fn latest_for_role(
    employees: &[Employee],
    assignments: &[Assignment],
    role: EmployeeRole,
) -> Option<NaiveDateTime> {
    let members: HashSet<EmployeeId> = employees
        .iter()
        .filter(|employee| employee.role == role)
        .map(|employee| employee.id)
        .collect();

    assignments
        .iter()
        .filter(|assignment| members.contains(&assignment.employee_id))
        .filter_map(|assignment| assignment.created_at)
        .max()
}
