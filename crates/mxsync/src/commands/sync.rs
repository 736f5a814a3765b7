//! `mxsync sync`: confirm, converge, report.

use std::fmt::Write as _;
use std::io::IsTerminal;

use tabled::Tabled;

use mxsync_core::{ConvergeReport, DnsProvider, MailServer, Reconciler, ZonePlan, plan_zone};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::plan::action_label;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

fn summary_line(report: &ConvergeReport) -> String {
    format!(
        "{} created, {} updated, {} failed",
        report.created(),
        report.updated(),
        report.failed.len()
    )
}

fn table_view(report: &ConvergeReport) -> String {
    let rows: Vec<OutcomeRow> = report
        .applied
        .iter()
        .map(|w| OutcomeRow {
            zone: w.zone.name.clone(),
            result: action_label(&w.action),
            record_type: w.target.record_type.to_string(),
            name: w.target.name.clone(),
            detail: w.record_id.clone().unwrap_or_default(),
        })
        .chain(report.failed.iter().map(|f| OutcomeRow {
            zone: f.zone.name.clone(),
            result: "failed".into(),
            record_type: f.target.record_type.to_string(),
            name: f.target.name.clone(),
            detail: f.error.to_string(),
        }))
        .collect();

    let mut out = String::new();
    if !rows.is_empty() {
        let _ = writeln!(out, "{}", output::render_table(&rows));
    }
    let _ = write!(out, "{}", summary_line(report));
    out
}

fn plain_view(report: &ConvergeReport) -> String {
    let applied = report.applied.iter().map(|w| {
        format!(
            "{}\t{}\t{}\t{}",
            w.zone.name,
            action_label(&w.action),
            w.target.record_type,
            w.target.name
        )
    });
    let failed = report.failed.iter().map(|f| {
        format!(
            "{}\tfailed\t{}\t{}",
            f.zone.name, f.target.record_type, f.target.name
        )
    });
    applied.chain(failed).collect::<Vec<_>>().join("\n")
}

/// Ask before writing; `--yes` skips, a non-terminal stdin refuses.
fn confirm(plans: &[ZonePlan], global: &GlobalOpts) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: "sync".into(),
        });
    }

    let writes: usize = plans.iter().map(|p| p.operations.len()).sum();
    let zones = plans.iter().filter(|p| !p.operations.is_empty()).count();
    eprintln!(
        "{}",
        super::plan::table_view(plans, output::should_color(&global.color))
    );
    dialoguer::Confirm::new()
        .with_prompt(format!("Apply {writes} write(s) across {zones} zone(s)?"))
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

pub async fn handle<P: DnsProvider, M: MailServer>(
    reconciler: &Reconciler<P, M>,
    zone_ids: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcomes = reconciler.analyze(zone_ids).await;
    let (reports, failures) = super::split_outcomes(outcomes);
    super::print_zone_failures(failures.iter().map(|(z, e)| (z.as_str(), e)), global);

    let plans: Vec<ZonePlan> = reports.iter().map(plan_zone).collect();
    // Only rejected records left: nothing to confirm, converge just reports them.
    let writes_pending = plans.iter().any(|p| !p.operations.is_empty());
    let report = if plans.iter().all(ZonePlan::is_empty) {
        if output::is_human(&global.output) && !global.quiet {
            eprintln!("Nothing to do: every analyzed zone is in sync.");
        }
        ConvergeReport::default()
    } else if !writes_pending || confirm(&plans, global)? {
        reconciler.converge(&reports).await
    } else {
        eprintln!("Aborted.");
        return Ok(());
    };

    let rendered = output::render_single(&global.output, &report, table_view, plain_view);
    output::print_output(&rendered, global.quiet);

    if failures.is_empty() && report.is_clean() {
        return Ok(());
    }
    Err(CliError::SyncIncomplete {
        failed_zones: failures.len(),
        failed_writes: report.failed.len(),
    })
}
