use std::env;
use std::fmt;
use std::path::PathBuf;

/// Rows created per distribution phase when `RECOVERY_BATCH_LIMIT` is unset.
pub const DEFAULT_BATCH_LIMIT: usize = 3000;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a recovery run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub store: StoreConfig,
    pub recovery: RecoveryConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let database = env::var("RECOVERY_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("recruitment.db"));
        let report_dir = env::var("RECOVERY_REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let audit_log = env::var("RECOVERY_AUDIT_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("recruitment.log"));

        let batch_limit = match env::var("RECOVERY_BATCH_LIMIT") {
            Ok(raw) => parse_batch_limit(&raw)?,
            Err(_) => DEFAULT_BATCH_LIMIT,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            store: StoreConfig { database },
            recovery: RecoveryConfig {
                report_dir,
                audit_log,
                batch_limit,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
        })
    }
}

fn parse_batch_limit(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::InvalidBatchLimit {
            value: raw.to_string(),
        }),
    }
}

/// Location of the CRM snapshot database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database: PathBuf,
}

/// Where reports and the audit trail land, and how large a distribution batch may grow.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    pub report_dir: PathBuf,
    pub audit_log: PathBuf,
    pub batch_limit: usize,
}

/// Diagnostic output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBatchLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBatchLimit { value } => write!(
                f,
                "RECOVERY_BATCH_LIMIT must be a positive integer (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
