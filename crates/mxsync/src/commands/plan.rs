//! `mxsync plan`: the provider writes `sync` would issue, without issuing them.

use std::fmt::Write as _;

use tabled::Tabled;

use mxsync_core::{
    CanonicalRecord, DnsProvider, MailServer, Reconciler, WriteAction, ZonePlan, plan_zone,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

const CONTENT_WIDTH: usize = 56;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Content")]
    content: String,
}

impl PlanRow {
    fn new(action: String, target: &CanonicalRecord) -> Self {
        Self {
            action,
            record_type: target.record_type.to_string(),
            name: target.name.clone(),
            content: output::truncate(&target.content, CONTENT_WIDTH),
        }
    }
}

pub(crate) fn action_label(action: &WriteAction) -> String {
    match action {
        WriteAction::Create => "create".into(),
        WriteAction::Update { id } => format!("update {id}"),
    }
}

fn plan_rows(plan: &ZonePlan) -> Vec<PlanRow> {
    plan.operations
        .iter()
        .map(|op| PlanRow::new(action_label(&op.action), &op.target))
        .chain(
            plan.rejected
                .iter()
                .map(|r| PlanRow::new(format!("rejected: {}", r.error), &r.target)),
        )
        .collect()
}

pub(crate) fn table_view(plans: &[ZonePlan], color: bool) -> String {
    let mut out = String::new();
    for plan in plans {
        if !out.is_empty() {
            out.push('\n');
        }
        let title = format!("{} ({})", plan.zone.name, plan.zone.id);
        let _ = writeln!(out, "{}", output::heading(&title, color));
        if plan.is_empty() {
            let _ = write!(out, "nothing to do");
        } else {
            let _ = write!(out, "{}", output::render_table(&plan_rows(plan)));
        }
    }
    out
}

fn plain_view(plans: &[ZonePlan]) -> String {
    plans
        .iter()
        .flat_map(|plan| {
            plan.operations.iter().map(move |op| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    plan.zone.name,
                    action_label(&op.action),
                    op.target.record_type,
                    op.target.name,
                    op.target.content
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle<P: DnsProvider, M: MailServer>(
    reconciler: &Reconciler<P, M>,
    zone_ids: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcomes = reconciler.analyze(zone_ids).await;
    let (reports, failures) = super::split_outcomes(outcomes);
    let plans: Vec<ZonePlan> = reports.iter().map(plan_zone).collect();

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        plans.as_slice(),
        |p| table_view(p, color),
        plain_view,
    );
    output::print_output(&rendered, global.quiet);

    if failures.is_empty() {
        return Ok(());
    }
    super::print_zone_failures(failures.iter().map(|(z, e)| (z.as_str(), e)), global);
    Err(CliError::AnalysisIncomplete {
        failed_zones: failures.len(),
    })
}
