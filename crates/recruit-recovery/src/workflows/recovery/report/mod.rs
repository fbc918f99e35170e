mod artifact;
mod stats;
pub mod views;

pub use artifact::{ReportError, ReportWriter};
pub use views::{ReportBundle, RoleReport, RoleReportRow, TopPerformer};

pub(crate) use stats::{build_role_rows, count_pre_incident_assigned, find_top_performer};
