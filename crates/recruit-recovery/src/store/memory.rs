use super::{RecruitmentStore, StoreError};
use crate::workflows::recovery::domain::{Assignment, Candidate, Employee, EmployeeId};
use std::cell::Cell;

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: Vec<Employee>,
    candidates: Vec<Candidate>,
    assignments: Vec<Assignment>,
}

/// In-memory store with snapshot-based transactions.
///
/// Failure switches let tests observe rollback and step isolation without a
/// real database: `fail_inserts_after` rejects the n+1-th assignment insert,
/// `fail_commits` rejects every commit, and `fail_next_candidates_read` makes
/// the next `candidates()` call fail once.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
    checkpoint: Option<Tables>,
    writes: usize,
    inserts: usize,
    fail_inserts_after: Option<usize>,
    fail_commits: bool,
    fail_candidates_read: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.tables.employees.push(employee);
        self
    }

    pub fn with_candidate(mut self, candidate: Candidate) -> Self {
        self.tables.candidates.push(candidate);
        self
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.tables.assignments.push(assignment);
        self
    }

    pub fn push_candidate(&mut self, candidate: Candidate) {
        self.tables.candidates.push(candidate);
    }

    pub fn fail_inserts_after(mut self, successful_inserts: usize) -> Self {
        self.fail_inserts_after = Some(successful_inserts);
        self
    }

    pub fn fail_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    pub fn fail_next_candidates_read(self) -> Self {
        self.fail_candidates_read.set(true);
        self
    }

    /// Number of write calls that reached the store, committed or not.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn in_transaction(&self) -> bool {
        self.checkpoint.is_some()
    }
}

impl RecruitmentStore for MemoryStore {
    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees = self.tables.employees.clone();
        employees.sort_by_key(|employee| employee.id);
        Ok(employees)
    }

    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        if self.fail_candidates_read.replace(false) {
            return Err(StoreError::Unavailable("candidates read rejected".to_string()));
        }
        Ok(self.tables.candidates.clone())
    }

    fn assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self.tables.assignments.clone())
    }

    fn set_attached_count(&mut self, employee: EmployeeId, count: u64) -> Result<(), StoreError> {
        self.writes += 1;
        let record = self
            .tables
            .employees
            .iter_mut()
            .find(|record| record.id == employee)
            .ok_or(StoreError::UnknownEmployee(employee))?;
        record.attached_candidates_count = count;
        Ok(())
    }

    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<(), StoreError> {
        self.writes += 1;
        if let Some(limit) = self.fail_inserts_after {
            if self.inserts >= limit {
                return Err(StoreError::Unavailable(format!(
                    "insert rejected after {limit} rows"
                )));
            }
        }

        let duplicate = self.tables.assignments.iter().any(|existing| {
            existing.key() == assignment.key() && existing.employee_id == assignment.employee_id
        });
        if duplicate {
            return Err(StoreError::DuplicateAssignment {
                candidate: assignment.candidate_id,
                city: assignment.city_id,
                employee: assignment.employee_id,
            });
        }

        self.inserts += 1;
        self.tables.assignments.push(assignment.clone());
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_some() {
            return Err(StoreError::TransactionOpen);
        }
        self.checkpoint = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_commits && self.checkpoint.is_some() {
            return Err(StoreError::Unavailable("commit rejected".to_string()));
        }
        self.checkpoint
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let checkpoint = self.checkpoint.take().ok_or(StoreError::NoTransaction)?;
        self.tables = checkpoint;
        Ok(())
    }
}
