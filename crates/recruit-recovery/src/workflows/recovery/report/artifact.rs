use super::views::RoleReportRow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode report {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// Writes role reports as CSV files into one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    /// Writes `<dir>/<name>.csv` with a header row. Returns `None` without
    /// touching the filesystem when there are no rows.
    pub fn write(&self, name: &str, rows: &[RoleReportRow]) -> Result<Option<PathBuf>, ReportError> {
        if rows.is_empty() {
            return Ok(None);
        }

        let path = self.path_for(name);
        fs::create_dir_all(&self.dir).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        write_rows(&path, rows).map_err(|source| ReportError::Csv {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), rows = rows.len(), "report written");
        Ok(Some(path))
    }
}

fn write_rows(path: &Path, rows: &[RoleReportRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
