//! Redfish resource client.
//!
//! A [`Session`](client::Session) performs authenticated requests against a
//! Redfish service, resource documents decode into the typed structs under
//! [`resource`], and cross references stay unresolved [`Link`]s until a
//! caller follows them.

pub mod client;
pub mod error;
pub mod link;
pub mod resource;
pub mod update;

pub use client::{ClientConfig, Session};
pub use error::{RedfishError, Result};
pub use link::{Collection, Link, Members};
pub use resource::service_root::ServiceRoot;

/// Path of the service root on every Redfish implementation.
pub const SERVICE_ROOT_PATH: &str = "/redfish/v1/";

/// Token used when a manufacturer string is empty.
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Access to one Redfish service for the lifetime of a scrape.
///
/// [`Session`] is the HTTP implementation; tests substitute in-memory
/// services. Implementations must be shareable across tasks.
#[async_trait::async_trait]
pub trait RedfishApi: Send + Sync {
    /// Service root fetched when the session was opened.
    fn service_root(&self) -> &ServiceRoot;

    /// GET one document and return it as untyped JSON.
    async fn get(&self, path: &str) -> Result<serde_json::Value>;

    /// PATCH a document with the given properties.
    async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<()>;

    /// Close the session. Never fails; problems are logged.
    async fn logout(&self);
}

/// First whitespace-delimited token of a manufacturer string.
///
/// # Examples
///
/// ```
/// use rackmon_redfish::manufacturer_token;
///
/// assert_eq!(manufacturer_token("HPE ProLiant DL380"), "HPE");
/// assert_eq!(manufacturer_token("Dell"), "Dell");
/// assert_eq!(manufacturer_token(""), "Unknown");
/// ```
pub fn manufacturer_token(manufacturer: &str) -> &str {
    manufacturer
        .split_whitespace()
        .next()
        .unwrap_or(UNKNOWN_MANUFACTURER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturer_token_takes_first_word() {
        assert_eq!(manufacturer_token("Dell Inc."), "Dell");
        assert_eq!(manufacturer_token("  HPE   "), "HPE");
        assert_eq!(manufacturer_token("Lenovo"), "Lenovo");
    }

    #[test]
    fn manufacturer_token_defaults_to_unknown() {
        assert_eq!(manufacturer_token(""), UNKNOWN_MANUFACTURER);
        assert_eq!(manufacturer_token("   "), UNKNOWN_MANUFACTURER);
    }
}
