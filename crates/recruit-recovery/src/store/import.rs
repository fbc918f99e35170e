use super::{commit_or_rollback, RecruitmentStore, SqliteStore, StoreError};
use crate::workflows::recovery::domain::{Assignment, Candidate, CandidateId, CityId, EmployeeId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unrecognized timestamp '{value}'")]
    Timestamp { value: String },
    #[error("could not load snapshot into the store: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub employees: usize,
    pub candidates: usize,
    pub assignments: usize,
}

#[derive(Debug, Deserialize)]
struct EmployeeRow {
    id: i64,
    fio: String,
    role: String,
    #[serde(default)]
    efficiency: i64,
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    id: i64,
    city_id: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    date_test: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    candidate_id: i64,
    city_id: i64,
    employee_id: i64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

/// Loads a CSV export of the CRM tables into a [`SqliteStore`].
///
/// Every file is parsed before anything is written, and the writes happen in a
/// single transaction.
pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn from_paths(
        store: &mut SqliteStore,
        employees: &Path,
        candidates: &Path,
        assignments: Option<&Path>,
    ) -> Result<ImportSummary, ImportError> {
        let employees = File::open(employees)?;
        let candidates = File::open(candidates)?;
        let assignments = assignments.map(File::open).transpose()?;
        Self::from_readers(store, employees, candidates, assignments)
    }

    pub fn from_readers<E: Read, C: Read, A: Read>(
        store: &mut SqliteStore,
        employees: E,
        candidates: C,
        assignments: Option<A>,
    ) -> Result<ImportSummary, ImportError> {
        let employees: Vec<EmployeeRow> = read_rows(employees)?;
        let candidates = read_rows::<CandidateRow, _>(candidates)?
            .into_iter()
            .map(|row| -> Result<Candidate, ImportError> {
                Ok(Candidate {
                    id: CandidateId(row.id),
                    city_id: CityId(row.city_id),
                    tested_at: parse_optional(row.date_test)?,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;
        let assignments = match assignments {
            Some(reader) => read_rows::<AssignmentRow, _>(reader)?
                .into_iter()
                .map(|row| -> Result<Assignment, ImportError> {
                    Ok(Assignment {
                        candidate_id: CandidateId(row.candidate_id),
                        city_id: CityId(row.city_id),
                        employee_id: EmployeeId(row.employee_id),
                        created_at: parse_optional(row.created_at)?,
                    })
                })
                .collect::<Result<Vec<_>, ImportError>>()?,
            None => Vec::new(),
        };

        store.begin()?;
        if let Err(err) = write_snapshot(store, &employees, &candidates, &assignments) {
            if let Err(rollback) = store.rollback() {
                warn!(error = %rollback, "rollback after failed import also failed");
            }
            return Err(err.into());
        }
        commit_or_rollback(store)?;

        let summary = ImportSummary {
            employees: employees.len(),
            candidates: candidates.len(),
            assignments: assignments.len(),
        };
        info!(?summary, "snapshot imported");
        Ok(summary)
    }
}

fn write_snapshot(
    store: &mut SqliteStore,
    employees: &[EmployeeRow],
    candidates: &[Candidate],
    assignments: &[Assignment],
) -> Result<(), StoreError> {
    for employee in employees {
        store.insert_employee(
            EmployeeId(employee.id),
            &employee.fio,
            &employee.role,
            employee.efficiency,
        )?;
    }
    for candidate in candidates {
        store.insert_candidate(candidate)?;
    }
    for assignment in assignments {
        store.insert_assignment(assignment)?;
    }
    Ok(())
}

fn read_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<T>()
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_optional(value: Option<String>) -> Result<Option<NaiveDateTime>, ImportError> {
    value
        .map(|raw| parse_timestamp(&raw).ok_or(ImportError::Timestamp { value: raw }))
        .transpose()
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339, or a bare date (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
