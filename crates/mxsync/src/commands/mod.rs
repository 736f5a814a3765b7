//! Command dispatch: bridges CLI args -> reconciler -> output formatting.

pub mod analyze;
pub mod config_cmd;
pub mod plan;
pub mod sync;

use owo_colors::OwoColorize;

use mxsync_core::{CoreError, DnsProvider, MailServer, Reconciler, ZoneOutcome, ZoneReport};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Dispatch a reconciler-bound command to its handler.
pub async fn dispatch<P: DnsProvider, M: MailServer>(
    cmd: Command,
    reconciler: &Reconciler<P, M>,
    zone_ids: &[String],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Analyze(args) => analyze::handle(reconciler, zone_ids, &args, global).await,
        Command::Plan => plan::handle(reconciler, zone_ids, global).await,
        Command::Sync => sync::handle(reconciler, zone_ids, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Split analysis outcomes into usable reports and per-zone failures.
pub(crate) fn split_outcomes(
    outcomes: Vec<ZoneOutcome>,
) -> (Vec<ZoneReport>, Vec<(String, CoreError)>) {
    let mut reports = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => reports.push(report),
            Err(e) => failures.push((outcome.zone_id, e)),
        }
    }
    (reports, failures)
}

/// Report failed zones on stderr; the other zones' output stays on stdout.
pub(crate) fn print_zone_failures<'a>(
    failures: impl IntoIterator<Item = (&'a str, &'a CoreError)>,
    global: &GlobalOpts,
) {
    let color = output::should_color(&global.color);
    for (zone_id, error) in failures {
        if color {
            eprintln!("{} zone {zone_id}: {error}", "✗".red());
        } else {
            eprintln!("✗ zone {zone_id}: {error}");
        }
    }
}
