use super::domain::{Assignment, Employee, EmployeeId};
use crate::store::{RecruitmentStore, StoreError};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Live attached-candidate counts used to rank allocation targets.
#[derive(Debug, Clone, Default)]
pub struct CapacityTracker {
    loads: HashMap<EmployeeId, u64>,
    touched: BTreeSet<EmployeeId>,
}

impl CapacityTracker {
    /// Counts every assignment row per employee, regardless of timestamp.
    pub fn from_assignments(employees: &[Employee], assignments: &[Assignment]) -> Self {
        let mut loads: HashMap<EmployeeId, u64> =
            employees.iter().map(|employee| (employee.id, 0)).collect();
        for assignment in assignments {
            if let Some(load) = loads.get_mut(&assignment.employee_id) {
                *load += 1;
            }
        }

        Self {
            loads,
            touched: BTreeSet::new(),
        }
    }

    /// Recomputes and persists `attached_candidates_count` for every employee.
    ///
    /// Must run inside the distribution transaction.
    pub fn refresh<S: RecruitmentStore>(store: &mut S) -> Result<Self, StoreError> {
        let employees = store.employees()?;
        let assignments = store.assignments()?;
        let tracker = Self::from_assignments(&employees, &assignments);

        for employee in &employees {
            store.set_attached_count(employee.id, tracker.load(employee.id))?;
        }
        debug!(employees = employees.len(), "attached candidate counts refreshed");

        Ok(tracker)
    }

    pub fn load(&self, employee: EmployeeId) -> u64 {
        self.loads.get(&employee).copied().unwrap_or(0)
    }

    pub fn employees(&self) -> usize {
        self.loads.len()
    }

    pub fn record(&mut self, employee: EmployeeId) {
        *self.loads.entry(employee).or_insert(0) += 1;
        self.touched.insert(employee);
    }

    /// Highest efficiency first, then lightest current load, then lowest id.
    pub fn select<'e>(&self, pool: &'e [Employee]) -> Option<&'e Employee> {
        pool.iter()
            .min_by_key(|employee| (Reverse(employee.efficiency), self.load(employee.id), employee.id))
    }

    /// Writes back the loads of employees that received rows since the refresh.
    pub fn persist_touched<S: RecruitmentStore>(&self, store: &mut S) -> Result<usize, StoreError> {
        for employee in &self.touched {
            store.set_attached_count(*employee, self.load(*employee))?;
        }
        Ok(self.touched.len())
    }
}
