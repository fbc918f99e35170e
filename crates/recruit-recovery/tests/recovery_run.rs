use chrono::{NaiveDate, NaiveDateTime};
use recruit_recovery::audit::{FileAuditLog, MemoryAuditLog};
use recruit_recovery::store::{RecruitmentStore, SnapshotImporter, SqliteStore};
use recruit_recovery::workflows::recovery::{
    Assignment, CandidateId, CityId, DistributionMode, EmployeeId, EmployeeRole, RecoveryError,
    RecoverySettings, RecruitmentRecovery, RunContext,
};
use std::fs;
use std::path::Path;

const EMPLOYEES: &str = "id,fio,role,efficiency
1,Anna Petrova,Рекрутер,5
2,Boris Orlov,recruiter,5
10,Dmitry Kuznetsov,Разработчик,3
11,Elena Smirnova,developer,1
20,Fedor Volkov,HR,9
";

// Candidate 1 was tested and assigned before the failure, candidate 2 was
// tested afterwards and never assigned, candidate 3 never took the test.
// Employee 99 left before the export and is not in the employees file.
const CANDIDATES: &str = "id,city_id,date_test
1,1,2024-01-05 00:00:00
2,1,2024-01-12 00:00:00
3,1,
";

const ASSIGNMENTS: &str = "candidate_id,city_id,employee_id,created_at
1,1,1,2024-01-08 00:00:00
1,1,99,2024-01-09 00:00:00
9,2,2,2024-01-10 00:00:00
";

fn timestamp(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

fn imported_store() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().expect("sqlite opens");
    SnapshotImporter::from_readers(
        &mut store,
        EMPLOYEES.as_bytes(),
        CANDIDATES.as_bytes(),
        Some(ASSIGNMENTS.as_bytes()),
    )
    .expect("snapshot imports");
    store
}

fn settings(report_dir: &Path) -> RecoverySettings {
    RecoverySettings {
        batch_limit: 3000,
        report_dir: report_dir.to_path_buf(),
    }
}

#[test]
fn full_run_against_sqlite_recovers_the_lost_candidate() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit_path = dir.path().join("recruitment.log");
    let ctx = RunContext::new(
        imported_store(),
        FileAuditLog::new(&audit_path),
        timestamp(2, 1, 12),
        settings(dir.path()),
    );

    let mut recovery = RecruitmentRecovery::new(ctx).expect("service builds");
    assert_eq!(recovery.cutoff(), Some(timestamp(1, 10, 0)));

    let summary = recovery.run(DistributionMode::Commit);
    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    assert_eq!(summary.pre_incident_assigned, Some(1));
    assert!(summary.top_developer.is_none());

    let distribution = summary.distribution.expect("distribution ran");
    assert_eq!(distribution.assigned_to(EmployeeRole::Recruiter), 1);
    assert_eq!(distribution.assigned_to(EmployeeRole::Developer), 0);

    let recruiter_csv =
        fs::read_to_string(dir.path().join("recruiter_report.csv")).expect("recruiter report");
    assert_eq!(
        recruiter_csv.lines().collect::<Vec<_>>(),
        vec![
            "name,initial_count,final_count,assigned_candidates",
            "Anna Petrova,1,1,2",
            "Boris Orlov,0,1,1",
        ]
    );
    let developer_csv =
        fs::read_to_string(dir.path().join("developer_report.csv")).expect("developer report");
    assert_eq!(
        developer_csv.lines().collect::<Vec<_>>(),
        vec![
            "name,initial_count,final_count,assigned_candidates",
            "Dmitry Kuznetsov,0,0,0",
            "Elena Smirnova,0,0,0",
        ]
    );

    let ctx = recovery.into_context();
    let assignments = ctx.store.assignments().expect("assignments");
    let lost: Vec<_> = assignments
        .iter()
        .filter(|row| row.candidate_id == CandidateId(2))
        .collect();
    assert_eq!(lost.len(), 1);
    assert_eq!(lost[0].employee_id, EmployeeId(1));
    assert_eq!(lost[0].created_at, Some(timestamp(2, 1, 12)));
    assert!(assignments.iter().all(|row| row.candidate_id != CandidateId(3)));

    let counts: Vec<_> = ctx
        .store
        .employees()
        .expect("employees")
        .into_iter()
        .map(|employee| (employee.id.0, employee.attached_candidates_count))
        .collect();
    assert_eq!(counts, vec![(1, 2), (2, 1), (10, 0), (11, 0), (20, 0)]);

    let audit = fs::read_to_string(&audit_path).expect("audit log written");
    assert!(audit.contains("Last correct assignment date before CRM failure: 2024-01-10 00:00:00"));
    assert!(audit.contains("Candidates distribution completed: 1 to recruiters, 0 to developers."));
    assert!(audit.contains("No new candidates for developers."));
}

#[test]
fn second_run_is_a_no_op_for_assignments() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery = RecruitmentRecovery::new(RunContext::new(
        imported_store(),
        &audit,
        timestamp(2, 1, 12),
        settings(dir.path()),
    ))
    .expect("service builds");

    recovery
        .distribute(DistributionMode::Commit)
        .expect("first distribution");
    let rows = recovery.context().store.assignments().expect("rows").len();

    let second = recovery
        .distribute(DistributionMode::Commit)
        .expect("second distribution");
    assert_eq!(second.total_assigned(), 0);
    assert_eq!(recovery.context().store.assignments().expect("rows").len(), rows);
}

#[test]
fn dry_run_rolls_back_sqlite_changes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery = RecruitmentRecovery::new(RunContext::new(
        imported_store(),
        &audit,
        timestamp(2, 1, 12),
        settings(dir.path()),
    ))
    .expect("service builds");

    let outcome = recovery
        .distribute(DistributionMode::DryRun)
        .expect("dry run");
    assert_eq!(outcome.total_assigned(), 1);

    let store = &recovery.context().store;
    assert_eq!(store.assignments().expect("rows").len(), 3);
    assert!(store
        .employees()
        .expect("employees")
        .iter()
        .all(|employee| employee.attached_candidates_count == 0));
}

#[test]
fn top_developer_counts_only_post_incident_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open_in_memory().expect("sqlite opens");
    store
        .insert_employee(EmployeeId(1), "Anna Petrova", "recruiter", 5)
        .expect("recruiter");
    store
        .insert_employee(EmployeeId(10), "Dmitry Kuznetsov", "developer", 3)
        .expect("developer one");
    store
        .insert_employee(EmployeeId(11), "Elena Smirnova", "developer", 1)
        .expect("developer two");

    let mut rows = vec![Assignment {
        candidate_id: CandidateId(1),
        city_id: CityId(1),
        employee_id: EmployeeId(1),
        created_at: Some(timestamp(1, 10, 0)),
    }];
    for (employee, count, offset) in [(10, 5, 100), (11, 2, 200)] {
        rows.extend((0..count).map(|n| Assignment {
            candidate_id: CandidateId(offset + n),
            city_id: CityId(1),
            employee_id: EmployeeId(employee),
            created_at: Some(timestamp(1, 15, 9)),
        }));
    }
    // Elena's older history must not count
    rows.extend((0..6).map(|n| Assignment {
        candidate_id: CandidateId(300 + n),
        city_id: CityId(1),
        employee_id: EmployeeId(11),
        created_at: Some(timestamp(1, 3, 9)),
    }));
    for row in &rows {
        store.insert_assignment(row).expect("row inserted");
    }

    let audit = MemoryAuditLog::new();
    let recovery = RecruitmentRecovery::new(RunContext::new(
        store,
        &audit,
        timestamp(2, 1, 12),
        settings(dir.path()),
    ))
    .expect("service builds");

    let top = recovery
        .top_developer()
        .expect("lookup succeeds")
        .expect("developer found");
    assert_eq!(top.employee_id, EmployeeId(10));
    assert_eq!(top.new_assignments, 5);
    assert!(audit.contains("Top developer: Dmitry Kuznetsov with 5 candidates."));
}

#[test]
fn empty_database_cannot_determine_the_cutoff() {
    let dir = tempfile::tempdir().expect("temp dir");
    let audit = MemoryAuditLog::new();
    let mut recovery = RecruitmentRecovery::new(RunContext::new(
        SqliteStore::open_in_memory().expect("sqlite opens"),
        &audit,
        timestamp(2, 1, 12),
        settings(dir.path()),
    ))
    .expect("service builds");

    assert!(matches!(
        recovery.distribute(DistributionMode::Commit),
        Err(RecoveryError::CutoffUndetermined { .. })
    ));
    let summary = recovery.run(DistributionMode::Commit);
    assert_eq!(summary.failures.len(), 4);
    assert!(!dir.path().join("recruiter_report.csv").exists());
    assert!(audit.contains("Unable to determine the CRM failure date."));
}
