//! Typed Redfish resources.
//!
//! Resources are immutable snapshots. Cross references are kept as
//! [`Link`](crate::Link)s and resolved only when a caller follows them.

pub mod chassis;
pub mod oem;
pub mod processor;
pub mod service_root;
pub mod storage;
pub mod system;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::marker::PhantomData;

/// A decodable Redfish resource type.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Resource kind used in log lines, e.g. `"Chassis"`.
    const KIND: &'static str;
}

/// `Status` block carried by most resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default, deserialize_with = "nullable")]
    pub health: String,
    #[serde(default, deserialize_with = "nullable")]
    pub health_rollup: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
}

/// Array entry embedded in a parent document and decoded on demand.
///
/// Lets one malformed sensor or device fail on its own instead of failing
/// the whole parent document.
#[derive(Debug, Clone)]
pub struct Embedded<T> {
    raw: serde_json::Value,
    kind: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Embedded<T> {
    pub fn decode(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.raw)
    }
}

impl<T> From<serde_json::Value> for Embedded<T> {
    fn from(raw: serde_json::Value) -> Self {
        Self {
            raw,
            kind: PhantomData,
        }
    }
}

impl<'de, T> Deserialize<'de> for Embedded<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Embedded::from)
    }
}

/// Treat JSON `null` as the type's default. Redfish services emit `null`
/// for unpopulated properties rather than omitting them.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`nullable`] for embedded arrays.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_tolerates_nulls_and_missing_fields() {
        let status: Status =
            serde_json::from_value(json!({"Health": null, "State": "Enabled"})).unwrap();
        assert_eq!(status.health, "");
        assert_eq!(status.state, "Enabled");
        assert_eq!(status.health_rollup, "");
    }

    #[test]
    fn embedded_entry_decodes_lazily() {
        let good: Embedded<Status> = serde_json::from_value(json!({"Health": "OK"})).unwrap();
        assert_eq!(good.decode().unwrap().health, "OK");

        let bad: Embedded<Status> = serde_json::from_value(json!({"Health": 7})).unwrap();
        assert!(bad.decode().is_err());
    }
}
