// Stalwart mail server management API client.
//
// Only the two read endpoints mxsync needs: the domain list and the
// per-domain DNS record set the server wants published.

pub mod client;
pub mod types;

pub use client::StalwartClient;
