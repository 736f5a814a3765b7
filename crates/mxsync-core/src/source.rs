// ── Remote ends ──
//
// The two capabilities the reconciler needs: read and write a provider
// zone, and read what the mail server wants published. Concrete HTTP
// clients implement these; tests supply in-memory fakes.

use async_trait::async_trait;
use mxsync_api::{CloudflareClient, DnsRecord, MailServerRecord, StalwartClient};

/// A DNS provider holding the zones to reconcile.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    async fn get_zone(&self, zone_id: &str) -> Result<mxsync_api::Zone, mxsync_api::Error>;

    /// Every record of the zone, in provider order.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, mxsync_api::Error>;

    async fn create_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, mxsync_api::Error>;

    /// Overwrite the record `record_id` in place.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, mxsync_api::Error>;
}

/// A mail server that knows which DNS records its domains need.
#[async_trait]
pub trait MailServer: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<String>, mxsync_api::Error>;

    async fn domain_records(&self, domain: &str)
    -> Result<Vec<MailServerRecord>, mxsync_api::Error>;
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    async fn get_zone(&self, zone_id: &str) -> Result<mxsync_api::Zone, mxsync_api::Error> {
        CloudflareClient::get_zone(self, zone_id).await
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<DnsRecord>, mxsync_api::Error> {
        self.list_all_records(zone_id).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, mxsync_api::Error> {
        CloudflareClient::create_record(self, zone_id, record).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &DnsRecord,
    ) -> Result<DnsRecord, mxsync_api::Error> {
        CloudflareClient::update_record(self, zone_id, record_id, record).await
    }
}

#[async_trait]
impl MailServer for StalwartClient {
    async fn list_domains(&self) -> Result<Vec<String>, mxsync_api::Error> {
        StalwartClient::list_domains(self).await
    }

    async fn domain_records(
        &self,
        domain: &str,
    ) -> Result<Vec<MailServerRecord>, mxsync_api::Error> {
        StalwartClient::domain_records(self, domain).await
    }
}
