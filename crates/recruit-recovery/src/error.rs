use crate::config::ConfigError;
use crate::store::{ImportError, StoreError};
use crate::telemetry::TelemetryError;
use crate::workflows::recovery::{RecoveryError, RecoveryStep};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Import(ImportError),
    Recovery(RecoveryError),
    /// A full run finished but some of its steps failed.
    Incomplete(Vec<RecoveryStep>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Recovery(err) => write!(f, "recovery error: {}", err),
            AppError::Incomplete(steps) => {
                let steps: Vec<_> = steps.iter().map(|step| step.label()).collect();
                write!(f, "recovery run incomplete; failed steps: {}", steps.join(", "))
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Recovery(err) => Some(err),
            AppError::Incomplete(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RecoveryError> for AppError {
    fn from(value: RecoveryError) -> Self {
        Self::Recovery(value)
    }
}
