//! Data access for the CRM snapshot.
//!
//! The recovery workflow only talks to [`RecruitmentStore`]. Writes are limited
//! to refreshing attached-candidate counts and appending assignment rows, and
//! both are expected to happen between [`RecruitmentStore::begin`] and
//! [`RecruitmentStore::commit`].

mod import;
mod memory;
mod sqlite;

pub use import::{parse_timestamp, ImportError, ImportSummary, SnapshotImporter};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::workflows::recovery::domain::{
    Assignment, Candidate, CandidateId, CityId, Employee, EmployeeId,
};
use tracing::warn;

/// Storage abstraction so the recovery workflow can run against SQLite or in memory.
pub trait RecruitmentStore {
    fn employees(&self) -> Result<Vec<Employee>, StoreError>;
    fn candidates(&self) -> Result<Vec<Candidate>, StoreError>;
    fn assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    fn set_attached_count(&mut self, employee: EmployeeId, count: u64) -> Result<(), StoreError>;
    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<(), StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Commits the open transaction. If the commit itself fails, the transaction
/// is rolled back and the commit error is returned.
pub(crate) fn commit_or_rollback<S: RecruitmentStore + ?Sized>(
    store: &mut S,
) -> Result<(), StoreError> {
    if let Err(err) = store.commit() {
        if let Err(rollback) = store.rollback() {
            warn!(error = %rollback, "rollback after failed commit also failed");
        }
        return Err(err);
    }
    Ok(())
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("a transaction is already open")]
    TransactionOpen,
    #[error("no transaction is open")]
    NoTransaction,
    #[error("employee {0} does not exist")]
    UnknownEmployee(EmployeeId),
    #[error("candidate {candidate} in city {city} is already assigned to employee {employee}")]
    DuplicateAssignment {
        candidate: CandidateId,
        city: CityId,
        employee: EmployeeId,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
