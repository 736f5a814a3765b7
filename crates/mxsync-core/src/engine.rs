// ── Reconciler ──
//
// Drives analysis and convergence for a set of provider zones. Zones are
// analyzed concurrently on the calling task; within a zone everything is
// sequential. Writes are applied one at a time, best-effort: a failed
// write is recorded and the next one proceeds.

use futures::future::join_all;
use mxsync_api::{CloudflareAuth, CloudflareClient, StalwartClient};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::convert::{mail_server_to_canonical, provider_to_canonical};
use crate::error::CoreError;
use crate::matcher::match_all;
use crate::model::{
    AppliedWrite, CanonicalRecord, ConvergeReport, WriteFailure, Zone, ZoneOutcome, ZoneReport,
};
use crate::planner::{WriteAction, WriteOperation, ZonePlan, plan_zone};
use crate::source::{DnsProvider, MailServer};

/// Reconciles mail-server DNS intent against a DNS provider.
pub struct Reconciler<P, M> {
    provider: P,
    mail_server: M,
}

impl Reconciler<CloudflareClient, StalwartClient> {
    /// Build HTTP clients for both ends from a runtime config.
    pub fn from_config(config: &SyncConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let provider = CloudflareClient::new(
            config.cloudflare.base_url.as_str(),
            &CloudflareAuth::from(&config.cloudflare.auth),
            &transport,
        )?;
        let mail_server =
            StalwartClient::new(config.stalwart.url.as_str(), &config.stalwart.token, &transport)?;
        Ok(Self::new(provider, mail_server))
    }
}

impl<P: DnsProvider, M: MailServer> Reconciler<P, M> {
    pub fn new(provider: P, mail_server: M) -> Self {
        Self {
            provider,
            mail_server,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn mail_server(&self) -> &M {
        &self.mail_server
    }

    // ── Analysis ─────────────────────────────────────────────────────

    /// Analyze one zone: fetch both sides, normalize, and match.
    ///
    /// Any record either side reports with an unmanaged type, or with
    /// unparseable content, fails the whole zone.
    pub async fn analyze_zone(&self, zone_id: &str) -> Result<ZoneReport, CoreError> {
        let zone: Zone = self
            .provider
            .get_zone(zone_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    CoreError::ZoneNotFound {
                        zone_id: zone_id.to_owned(),
                    }
                } else {
                    e.into()
                }
            })?
            .into();
        debug!(zone_id, zone = %zone.name, "analyzing zone");

        let provider_records = self
            .provider
            .list_records(zone_id)
            .await?
            .iter()
            .map(provider_to_canonical)
            .collect::<Result<Vec<_>, _>>()?;

        let desired = self.desired_records(&zone).await?;

        let results = match_all(&desired, &provider_records);
        let report = ZoneReport { zone, results };
        info!(
            zone = %report.zone.name,
            in_sync = report.in_sync(),
            drifted = report.drifted(),
            missing = report.missing(),
            "zone analyzed"
        );
        Ok(report)
    }

    /// Every record the mail server wants published inside `zone`, in
    /// domain order then record order.
    async fn desired_records(&self, zone: &Zone) -> Result<Vec<CanonicalRecord>, CoreError> {
        let domains: Vec<String> = self
            .mail_server
            .list_domains()
            .await?
            .into_iter()
            .filter(|d| zone.contains_domain(d))
            .collect();
        debug!(zone = %zone.name, ?domains, "mail domains in zone");

        let mut desired = Vec::new();
        for domain in &domains {
            for record in self.mail_server.domain_records(domain).await? {
                desired.push(mail_server_to_canonical(&record)?);
            }
        }
        Ok(desired)
    }

    /// Analyze every zone concurrently.
    ///
    /// Outcomes come back in `zone_ids` order; a failing zone carries its
    /// error without affecting the others.
    pub async fn analyze(&self, zone_ids: &[String]) -> Vec<ZoneOutcome> {
        join_all(zone_ids.iter().map(|zone_id| async move {
            let result = self.analyze_zone(zone_id).await;
            if let Err(e) = &result {
                warn!(zone_id = %zone_id, error = %e, "zone analysis failed");
            }
            ZoneOutcome {
                zone_id: zone_id.clone(),
                result,
            }
        }))
        .await
    }

    // ── Convergence ──────────────────────────────────────────────────

    /// Plan and apply the writes for every report, in order.
    pub async fn converge(&self, reports: &[ZoneReport]) -> ConvergeReport {
        let mut outcome = ConvergeReport::default();
        for report in reports {
            self.apply_plan(plan_zone(report), &mut outcome).await;
        }
        info!(
            created = outcome.created(),
            updated = outcome.updated(),
            failed = outcome.failed.len(),
            "convergence finished"
        );
        outcome
    }

    /// Apply one zone's plan, appending to `outcome`.
    pub async fn apply_plan(&self, plan: ZonePlan, outcome: &mut ConvergeReport) {
        let ZonePlan {
            zone,
            operations,
            rejected,
        } = plan;

        for rejected in rejected {
            warn!(
                zone = %zone.name,
                name = %rejected.target.name,
                error = %rejected.error,
                "record cannot be written"
            );
            outcome.failed.push(WriteFailure {
                zone: zone.clone(),
                action: None,
                target: rejected.target,
                error: rejected.error,
            });
        }

        for op in operations {
            match self.execute(&zone, &op).await {
                Ok(record_id) => {
                    info!(
                        zone = %zone.name,
                        name = %op.target.name,
                        record_type = %op.target.record_type,
                        action = ?op.action,
                        "record written"
                    );
                    outcome.applied.push(AppliedWrite {
                        zone: zone.clone(),
                        action: op.action,
                        target: op.target,
                        record_id,
                    });
                }
                Err(error) => {
                    warn!(
                        zone = %zone.name,
                        name = %op.target.name,
                        record_type = %op.target.record_type,
                        error = %error,
                        "record write failed"
                    );
                    outcome.failed.push(WriteFailure {
                        zone: zone.clone(),
                        action: Some(op.action),
                        target: op.target,
                        error,
                    });
                }
            }
        }
    }

    async fn execute(&self, zone: &Zone, op: &WriteOperation) -> Result<Option<String>, CoreError> {
        let written = match &op.action {
            WriteAction::Create => self.provider.create_record(&zone.id, &op.payload).await?,
            WriteAction::Update { id } => {
                self.provider
                    .update_record(&zone.id, id, &op.payload)
                    .await?
            }
        };
        Ok(written.id)
    }
}
