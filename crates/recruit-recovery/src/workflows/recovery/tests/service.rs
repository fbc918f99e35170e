use super::common::{assignment, at, candidate, context, cutoff, employee, scenario_store};
use crate::audit::MemoryAuditLog;
use crate::store::{MemoryStore, RecruitmentStore};
use crate::workflows::recovery::distribution::DistributionMode;
use crate::workflows::recovery::domain::EmployeeRole;
use crate::workflows::recovery::service::{RecoveryError, RecoveryStep, RecruitmentRecovery};

fn store_without_cutoff() -> MemoryStore {
    MemoryStore::new()
        .with_employee(employee(1, "Anna Petrova", EmployeeRole::Recruiter, 5))
        .with_employee(employee(10, "Dmitry Kuznetsov", EmployeeRole::Developer, 3))
        .with_candidate(candidate(1, 1, Some(at(1, 12, 0))))
        .with_assignment(assignment(5, 1, 1, None))
}

#[test]
fn undetermined_cutoff_blocks_every_operation_without_writes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery =
        RecruitmentRecovery::new(context(store_without_cutoff(), &audit, dir.path()))
            .expect("service builds");
    assert!(recovery.cutoff().is_none());

    assert!(matches!(
        recovery.stats(),
        Err(RecoveryError::CutoffUndetermined {
            step: RecoveryStep::Statistics
        })
    ));
    assert!(matches!(
        recovery.distribute(DistributionMode::Commit),
        Err(RecoveryError::CutoffUndetermined {
            step: RecoveryStep::Distribution
        })
    ));
    assert!(matches!(
        recovery.generate_reports(),
        Err(RecoveryError::CutoffUndetermined {
            step: RecoveryStep::Reports
        })
    ));
    assert!(matches!(
        recovery.top_developer(),
        Err(RecoveryError::CutoffUndetermined {
            step: RecoveryStep::TopDeveloper
        })
    ));

    let summary = recovery.run(DistributionMode::Commit);
    assert_eq!(summary.failures.len(), 4);
    assert!(summary.failures.iter().all(|failure| failure.cutoff_undetermined));

    assert_eq!(recovery.context().store.write_count(), 0);
    assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
    assert!(audit.contains("Unable to determine the CRM failure date"));
}

#[test]
fn full_run_reports_baseline_distributes_and_writes_reports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery = RecruitmentRecovery::new(context(scenario_store(), &audit, dir.path()))
        .expect("service builds");
    assert_eq!(recovery.cutoff(), Some(cutoff()));

    let summary = recovery.run(DistributionMode::Commit);
    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    assert_eq!(summary.pre_incident_assigned, Some(1));

    let distribution = summary.distribution.expect("distribution outcome");
    assert_eq!(distribution.assigned_to(EmployeeRole::Recruiter), 1);

    let reports = summary.reports.expect("reports");
    let anna = reports.recruiters.row_for("Anna Petrova").expect("anna row");
    assert_eq!((anna.initial_count, anna.final_count), (1, 1));
    let boris = reports.recruiters.row_for("Boris Orlov").expect("boris row");
    assert_eq!((boris.initial_count, boris.final_count), (0, 1));
    assert_eq!(reports.developers.rows.len(), 2);
    assert!(reports.recruiters.row_for("Fedor Volkov").is_none());

    assert!(dir.path().join("recruiter_report.csv").exists());
    assert!(dir.path().join("developer_report.csv").exists());
    assert!(summary.top_developer.is_none());

    for line in [
        "Generating statistics...",
        "Candidates assigned before CRM failure: 1",
        "Distributing candidates...",
        "Candidates distribution completed: 1 to recruiters, 0 to developers.",
        "Report recruiter_report.csv created.",
        "Reports generated.",
        "No new candidates for developers.",
    ] {
        assert!(audit.contains(line), "missing audit line: {line}");
    }
}

#[test]
fn distribution_failure_does_not_stop_the_remaining_steps() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let store = scenario_store().fail_inserts_after(0);
    let mut recovery =
        RecruitmentRecovery::new(context(store, &audit, dir.path())).expect("service builds");

    let summary = recovery.run(DistributionMode::Commit);
    assert!(summary.failed(RecoveryStep::Distribution));
    assert!(!summary.failed(RecoveryStep::Statistics));
    assert!(!summary.failed(RecoveryStep::Reports));
    assert!(summary.distribution.is_none());
    assert!(summary.reports.is_some());
    assert!(audit.contains("rolled back"));

    let store = &recovery.context().store;
    assert_eq!(store.assignments().expect("assignments").len(), 2);
    assert!(store
        .employees()
        .expect("employees")
        .iter()
        .all(|employee| employee.attached_candidates_count == 0));
}

#[test]
fn reports_after_a_failed_commit_do_not_see_uncommitted_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let store = scenario_store().fail_commits();
    let mut recovery =
        RecruitmentRecovery::new(context(store, &audit, dir.path())).expect("service builds");

    let summary = recovery.run(DistributionMode::Commit);
    assert!(summary.failed(RecoveryStep::Distribution));
    assert!(!summary.failed(RecoveryStep::Reports));
    assert!(audit.contains("failed and was rolled back: store unavailable"));

    let reports = summary.reports.expect("reports");
    let anna = reports.recruiters.row_for("Anna Petrova").expect("anna row");
    assert_eq!((anna.initial_count, anna.final_count), (1, 0));
    assert!(!recovery.context().store.in_transaction());
    assert_eq!(
        recovery.context().store.assignments().expect("assignments").len(),
        2
    );
}

#[test]
fn failed_statistics_read_does_not_block_distribution() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let store = scenario_store().fail_next_candidates_read();
    let mut recovery =
        RecruitmentRecovery::new(context(store, &audit, dir.path())).expect("service builds");

    let summary = recovery.run(DistributionMode::Commit);
    assert!(summary.failed(RecoveryStep::Statistics));
    assert!(summary.pre_incident_assigned.is_none());
    assert!(!summary.failed(RecoveryStep::Distribution));
    assert!(!summary.failed(RecoveryStep::Reports));

    let distribution = summary.distribution.expect("distribution ran");
    assert_eq!(distribution.assigned_to(EmployeeRole::Recruiter), 1);
    assert!(audit.contains("Step statistics failed"));
    assert!(audit.contains("Candidates distribution completed: 1 to recruiters, 0 to developers."));
}

#[test]
fn developer_overflow_names_a_top_developer() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut store = scenario_store();
    for id in 0..4 {
        store.push_candidate(candidate(40 + id, 1, Some(at(1, 14, 0))));
    }
    let mut ctx = context(store, &audit, dir.path());
    ctx.settings.batch_limit = 2;
    let mut recovery = RecruitmentRecovery::new(ctx).expect("service builds");

    let outcome = recovery
        .distribute(DistributionMode::Commit)
        .expect("distribution succeeds");
    assert_eq!(outcome.assigned_to(EmployeeRole::Recruiter), 2);
    assert_eq!(outcome.assigned_to(EmployeeRole::Developer), 2);

    // Dmitry is more efficient, so both developer rows go to him.
    let top = recovery
        .top_developer()
        .expect("lookup succeeds")
        .expect("top developer");
    assert_eq!(top.name, "Dmitry Kuznetsov");
    assert_eq!(top.new_assignments, 2);
    assert!(audit.contains("Top developer: Dmitry Kuznetsov with 2 candidates."));
}

#[test]
fn empty_role_report_is_noted_not_written() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let store = MemoryStore::new()
        .with_employee(employee(1, "Anna Petrova", EmployeeRole::Recruiter, 5))
        .with_assignment(assignment(1, 1, 1, Some(cutoff())));
    let recovery =
        RecruitmentRecovery::new(context(store, &audit, dir.path())).expect("service builds");

    let report = recovery
        .role_report(EmployeeRole::Developer)
        .expect("report builds");
    assert!(report.rows.is_empty());
    assert!(report.artifact.is_none());
    assert!(!dir.path().join("developer_report.csv").exists());
    assert!(audit.contains("No data to write to developer_report.csv"));
}

#[test]
fn dry_run_through_the_service_leaves_no_trace() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery = RecruitmentRecovery::new(context(scenario_store(), &audit, dir.path()))
        .expect("service builds");

    let outcome = recovery
        .distribute(DistributionMode::DryRun)
        .expect("dry run succeeds");
    assert_eq!(outcome.total_assigned(), 1);
    assert!(audit.contains("Dry run: would assign 1 to recruiters"));

    let ctx = recovery.into_context();
    assert_eq!(ctx.store.assignments().expect("assignments").len(), 2);
}
