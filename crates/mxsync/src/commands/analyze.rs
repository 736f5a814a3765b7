//! `mxsync analyze`: per-zone comparison of desired vs published records.

use std::fmt::Write as _;

use tabled::Tabled;

use mxsync_core::{AnalysisResult, DnsProvider, MailServer, Reconciler, ZoneOutcome, ZoneReport};

use crate::cli::{AnalyzeArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

const CONTENT_WIDTH: usize = 48;

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Actual")]
    actual: String,
}

impl ResultRow {
    fn new(result: &AnalysisResult, color: bool) -> Self {
        Self {
            status: output::paint_status(result.status(), color),
            record_type: result.target.record_type.to_string(),
            name: result.target.name.clone(),
            expected: output::truncate(&result.target.content, CONTENT_WIDTH),
            actual: result
                .actual
                .as_ref()
                .map(|a| output::truncate(&a.content, CONTENT_WIDTH))
                .unwrap_or_default(),
        }
    }
}

fn summary_line(report: &ZoneReport) -> String {
    format!(
        "{} in sync, {} drifted, {} missing",
        report.in_sync(),
        report.drifted(),
        report.missing()
    )
}

fn table_view(outcomes: &[ZoneOutcome], summaries: &[Option<String>], color: bool) -> String {
    let mut out = String::new();
    for (outcome, summary) in outcomes.iter().zip(summaries) {
        let (Ok(report), Some(summary)) = (&outcome.result, summary) else {
            continue;
        };
        if !out.is_empty() {
            out.push('\n');
        }
        let title = format!("{} ({})", report.zone.name, report.zone.id);
        let _ = writeln!(out, "{}", output::heading(&title, color));
        if !report.results.is_empty() {
            let rows: Vec<ResultRow> = report
                .results
                .iter()
                .map(|r| ResultRow::new(r, color))
                .collect();
            let _ = writeln!(out, "{}", output::render_table(&rows));
        }
        let _ = write!(out, "{summary}");
    }
    out
}

fn plain_view(outcomes: &[ZoneOutcome]) -> String {
    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .flat_map(|report| {
            report.results.iter().map(move |r| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    report.zone.name,
                    output::paint_status(r.status(), false),
                    r.target.record_type,
                    r.target.name,
                    r.target.content
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle<P: DnsProvider, M: MailServer>(
    reconciler: &Reconciler<P, M>,
    zone_ids: &[String],
    args: &AnalyzeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut outcomes = reconciler.analyze(zone_ids).await;

    // Counts cover every result, even when the listing is filtered.
    let summaries: Vec<Option<String>> = outcomes
        .iter()
        .map(|o| o.result.as_ref().ok().map(summary_line))
        .collect();

    if args.only_unsynced {
        for outcome in &mut outcomes {
            if let Ok(report) = &mut outcome.result {
                report.results.retain(|r| !r.sync);
            }
        }
    }

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        outcomes.as_slice(),
        |o| table_view(o, &summaries, color),
        plain_view,
    );
    output::print_output(&rendered, global.quiet);

    let failures: Vec<(&str, &mxsync_core::CoreError)> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| (o.zone_id.as_str(), e)))
        .collect();
    if failures.is_empty() {
        return Ok(());
    }
    let failed_zones = failures.len();
    super::print_zone_failures(failures, global);
    Err(CliError::AnalysisIncomplete { failed_zones })
}
