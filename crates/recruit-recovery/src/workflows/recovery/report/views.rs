use super::super::domain::{EmployeeId, EmployeeRole};
use serde::Serialize;
use std::path::PathBuf;

/// One line of a role report. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleReportRow {
    #[serde(skip_serializing)]
    pub employee_id: EmployeeId,
    pub name: String,
    pub initial_count: u64,
    pub final_count: u64,
    pub assigned_candidates: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    pub role: EmployeeRole,
    pub rows: Vec<RoleReportRow>,
    /// Path of the written CSV; `None` when there was nothing to write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl RoleReport {
    pub fn row_for(&self, name: &str) -> Option<&RoleReportRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    pub recruiters: RoleReport,
    pub developers: RoleReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPerformer {
    pub employee_id: EmployeeId,
    pub name: String,
    pub new_assignments: u64,
}
