use crate::cli::{DistributeArgs, GlobalArgs, ImportArgs};
use crate::render;
use chrono::{Local, NaiveDateTime};
use recruit_recovery::audit::FileAuditLog;
use recruit_recovery::config::AppConfig;
use recruit_recovery::error::AppError;
use recruit_recovery::store::{SnapshotImporter, SqliteStore};
use recruit_recovery::telemetry;
use recruit_recovery::workflows::recovery::{
    DistributionMode, RecoverySettings, RecruitmentRecovery, RunContext,
};
use tracing::info;

type Recovery = RecruitmentRecovery<SqliteStore, FileAuditLog>;

/// Loads configuration, applies flag overrides, and starts telemetry.
fn prepare(global: &GlobalArgs) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;

    if let Some(database) = global.database.clone() {
        config.store.database = database;
    }
    if let Some(report_dir) = global.report_dir.clone() {
        config.recovery.report_dir = report_dir;
    }
    if let Some(audit_log) = global.audit_log.clone() {
        config.recovery.audit_log = audit_log;
    }
    if let Some(limit) = global.batch_limit {
        config.recovery.batch_limit = limit;
    }

    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn open_recovery(global: &GlobalArgs) -> Result<Recovery, AppError> {
    let config = prepare(global)?;
    let run_at: NaiveDateTime = global
        .run_at
        .unwrap_or_else(|| Local::now().naive_local());

    let store = SqliteStore::open(&config.store.database)?;
    let audit = FileAuditLog::new(&config.recovery.audit_log);
    info!(
        ?config.environment,
        database = %config.store.database.display(),
        %run_at,
        "recovery session opened"
    );

    let ctx = RunContext::new(
        store,
        audit,
        run_at,
        RecoverySettings::from_config(&config.recovery),
    );
    Ok(RecruitmentRecovery::new(ctx)?)
}

fn mode(args: DistributeArgs) -> DistributionMode {
    if args.dry_run {
        DistributionMode::DryRun
    } else {
        DistributionMode::Commit
    }
}

pub(crate) fn run_all(global: &GlobalArgs, args: DistributeArgs) -> Result<(), AppError> {
    let mut recovery = open_recovery(global)?;
    let summary = recovery.run(mode(args));

    if global.json {
        render::json(&summary);
    } else {
        render::summary(&summary);
    }

    if summary.is_success() {
        Ok(())
    } else {
        Err(AppError::Incomplete(
            summary.failures.iter().map(|failure| failure.step).collect(),
        ))
    }
}

pub(crate) fn stats(global: &GlobalArgs) -> Result<(), AppError> {
    let recovery = open_recovery(global)?;
    let count = recovery.stats()?;

    if global.json {
        render::json(&serde_json::json!({
            "cutoff": recovery.cutoff(),
            "pre_incident_assigned": count,
        }));
    } else {
        render::cutoff(recovery.cutoff());
        render::pre_incident(count);
    }
    Ok(())
}

pub(crate) fn distribute(global: &GlobalArgs, args: DistributeArgs) -> Result<(), AppError> {
    let mut recovery = open_recovery(global)?;
    let outcome = recovery.distribute(mode(args))?;

    if global.json {
        render::json(&outcome);
    } else {
        render::distribution(&outcome);
    }
    Ok(())
}

pub(crate) fn report(global: &GlobalArgs) -> Result<(), AppError> {
    let recovery = open_recovery(global)?;
    let bundle = recovery.generate_reports()?;

    if global.json {
        render::json(&bundle);
    } else {
        render::reports(&bundle);
    }
    Ok(())
}

pub(crate) fn top_developer(global: &GlobalArgs) -> Result<(), AppError> {
    let recovery = open_recovery(global)?;
    let top = recovery.top_developer()?;

    if global.json {
        render::json(&top);
    } else {
        render::top_developer(top.as_ref());
    }
    Ok(())
}

pub(crate) fn init_db(global: &GlobalArgs) -> Result<(), AppError> {
    let config = prepare(global)?;
    SqliteStore::open(&config.store.database)?;
    info!(database = %config.store.database.display(), "schema ready");

    if global.json {
        render::json(&serde_json::json!({ "database": config.store.database }));
    } else {
        println!("Schema ready in {}", config.store.database.display());
    }
    Ok(())
}

pub(crate) fn import(global: &GlobalArgs, args: ImportArgs) -> Result<(), AppError> {
    let config = prepare(global)?;
    let mut store = SqliteStore::open(&config.store.database)?;
    let summary = SnapshotImporter::from_paths(
        &mut store,
        &args.employees,
        &args.candidates,
        args.assignments.as_deref(),
    )?;

    if global.json {
        render::json(&summary);
    } else {
        println!(
            "Imported {} employees, {} candidates, {} assignments into {}",
            summary.employees,
            summary.candidates,
            summary.assignments,
            config.store.database.display()
        );
    }
    Ok(())
}
