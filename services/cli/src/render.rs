use chrono::NaiveDateTime;
use recruit_recovery::workflows::recovery::{
    DistributionMode, DistributionOutcome, RecoveryStep, ReportBundle, RoleReport, RunSummary,
    TopPerformer,
};
use serde::Serialize;

pub(crate) fn json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("JSON output unavailable: {}", err),
    }
}

pub(crate) fn cutoff(cutoff: Option<NaiveDateTime>) {
    match cutoff {
        Some(cutoff) => println!("Last correct assignment before CRM failure: {}", cutoff),
        None => println!("CRM failure date could not be determined"),
    }
}

pub(crate) fn pre_incident(count: u64) {
    println!("Candidates assigned before CRM failure: {}", count);
}

pub(crate) fn distribution(outcome: &DistributionOutcome) {
    let heading = match outcome.mode {
        DistributionMode::Commit => "Candidate distribution",
        DistributionMode::DryRun => "Candidate distribution (dry run, nothing persisted)",
    };
    println!("\n{}", heading);
    println!(
        "- stamped {} | counts refreshed for {} employees",
        outcome.assigned_at, outcome.refreshed_employees
    );
    for phase in &outcome.phases {
        let capped = if phase.capped { " (batch limit reached)" } else { "" };
        println!(
            "- {}: {} of {} eligible candidates assigned{}",
            phase.role, phase.assigned, phase.eligible, capped
        );
        for allocation in &phase.allocations {
            println!("    - {}: {}", allocation.name, allocation.assigned);
        }
    }
}

fn role_report(report: &RoleReport) {
    match &report.artifact {
        Some(path) => println!("\n{} report -> {}", report.role, path.display()),
        None => {
            println!("\n{} report: no data", report.role);
            return;
        }
    }
    println!("  name | initial | final | assigned");
    for row in &report.rows {
        println!(
            "  {} | {} | {} | {}",
            row.name, row.initial_count, row.final_count, row.assigned_candidates
        );
    }
}

pub(crate) fn reports(bundle: &ReportBundle) {
    role_report(&bundle.recruiters);
    role_report(&bundle.developers);
}

pub(crate) fn top_developer(top: Option<&TopPerformer>) {
    match top {
        Some(top) => println!(
            "Top developer: {} with {} candidates.",
            top.name, top.new_assignments
        ),
        None => println!("No new candidates for developers."),
    }
}

pub(crate) fn summary(summary: &RunSummary) {
    cutoff(summary.cutoff);
    if let Some(count) = summary.pre_incident_assigned {
        pre_incident(count);
    }
    if let Some(outcome) = &summary.distribution {
        distribution(outcome);
    }
    if let Some(bundle) = &summary.reports {
        reports(bundle);
    }
    if summary.cutoff.is_some() && !summary.failed(RecoveryStep::TopDeveloper) {
        println!();
        top_developer(summary.top_developer.as_ref());
    }

    if !summary.failures.is_empty() {
        println!("\nFailed steps");
        for failure in &summary.failures {
            println!("- {}: {}", failure.step, failure.message);
        }
    }
}
