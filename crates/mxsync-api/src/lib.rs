// mxsync-api: Async clients for the Cloudflare DNS API and the Stalwart management API

pub mod cloudflare;
pub mod error;
pub mod stalwart;
pub mod transport;

pub use cloudflare::{CloudflareAuth, CloudflareClient};
pub use error::Error;
pub use stalwart::StalwartClient;
pub use transport::{TlsMode, TransportConfig};

// Flat access to the wire types most consumers need.
pub use cloudflare::types::{DnsRecord, Page, RecordData, ResultInfo, Zone};
pub use stalwart::types::MailServerRecord;
