// Cloudflare v4 API client.
//
// Covers the zone lookup and DNS record list/create/update endpoints
// mxsync needs. Responses arrive in the `{ success, errors, result }`
// envelope, which the client strips before callers see them.

pub mod client;
pub mod types;

pub use client::{CloudflareAuth, CloudflareClient, DEFAULT_BASE_URL};
