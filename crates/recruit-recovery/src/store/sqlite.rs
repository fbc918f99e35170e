use super::{RecruitmentStore, StoreError};
use crate::workflows::recovery::domain::{
    Assignment, Candidate, CandidateId, CityId, Employee, EmployeeId, EmployeeRole,
};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY,
    fio TEXT NOT NULL,
    role TEXT NOT NULL,
    efficiency INTEGER NOT NULL DEFAULT 0,
    attached_candidates_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS candidates (
    id INTEGER NOT NULL,
    city_id INTEGER NOT NULL,
    date_test TEXT,
    PRIMARY KEY (id, city_id)
);

CREATE TABLE IF NOT EXISTS candidate_to_employee_assign (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    candidate_id INTEGER NOT NULL,
    city_id INTEGER NOT NULL,
    employee_id INTEGER NOT NULL,
    created_at TEXT,
    UNIQUE (candidate_id, city_id, employee_id)
);

CREATE INDEX IF NOT EXISTS idx_assign_employee
    ON candidate_to_employee_assign (employee_id);
CREATE INDEX IF NOT EXISTS idx_assign_candidate
    ON candidate_to_employee_assign (candidate_id, city_id);
"#;

/// SQLite-backed gateway over the CRM snapshot tables.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_employee(
        &mut self,
        id: EmployeeId,
        name: &str,
        role_label: &str,
        efficiency: i64,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO employees (id, fio, role, efficiency) VALUES (?1, ?2, ?3, ?4)",
            params![id.0, name, role_label, efficiency],
        )?;
        Ok(())
    }

    pub fn insert_candidate(&mut self, candidate: &Candidate) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO candidates (id, city_id, date_test) VALUES (?1, ?2, ?3)",
            params![candidate.id.0, candidate.city_id.0, candidate.tested_at],
        )?;
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl RecruitmentStore for SqliteStore {
    fn employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT id, fio, role, efficiency, attached_candidates_count
             FROM employees
             ORDER BY id",
        )?;
        let rows = statement.query_map([], |row| {
            let role: String = row.get(2)?;
            let count: i64 = row.get(4)?;
            Ok(Employee {
                id: EmployeeId(row.get(0)?),
                name: row.get(1)?,
                role: EmployeeRole::parse(&role),
                efficiency: row.get(3)?,
                attached_candidates_count: count.max(0) as u64,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let mut statement = self
            .conn
            .prepare("SELECT id, city_id, date_test FROM candidates ORDER BY id, city_id")?;
        let rows = statement.query_map([], |row| {
            Ok(Candidate {
                id: CandidateId(row.get(0)?),
                city_id: CityId(row.get(1)?),
                tested_at: row.get::<_, Option<NaiveDateTime>>(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let mut statement = self.conn.prepare(
            "SELECT candidate_id, city_id, employee_id, created_at
             FROM candidate_to_employee_assign
             ORDER BY id",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(Assignment {
                candidate_id: CandidateId(row.get(0)?),
                city_id: CityId(row.get(1)?),
                employee_id: EmployeeId(row.get(2)?),
                created_at: row.get::<_, Option<NaiveDateTime>>(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn set_attached_count(&mut self, employee: EmployeeId, count: u64) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE employees SET attached_candidates_count = ?1 WHERE id = ?2",
            params![count as i64, employee.0],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownEmployee(employee));
        }
        Ok(())
    }

    fn insert_assignment(&mut self, assignment: &Assignment) -> Result<(), StoreError> {
        let result = self.conn.execute(
            "INSERT INTO candidate_to_employee_assign (candidate_id, city_id, employee_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                assignment.candidate_id.0,
                assignment.city_id.0,
                assignment.employee_id.0,
                assignment.created_at,
            ],
        );

        result
            .map(|_| ())
            .map_err(|err| insert_error(err, assignment))
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.in_transaction() {
            return Err(StoreError::TransactionOpen);
        }
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction() {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction() {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

/// Rows may name employees missing from `employees` (staff who left before the
/// snapshot), so the only constraint with a domain meaning is the unique key.
fn insert_error(err: rusqlite::Error, assignment: &Assignment) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation
                && message
                    .as_deref()
                    .is_some_and(|text| text.starts_with("UNIQUE")) =>
        {
            StoreError::DuplicateAssignment {
                candidate: assignment.candidate_id,
                city: assignment.city_id,
                employee: assignment.employee_id,
            }
        }
        other => StoreError::Sqlite(other),
    }
}
