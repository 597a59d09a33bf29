//! Write-back of the few properties a Redfish service lets clients change.
//!
//! Two decoded snapshots of the same resource are compared over an explicit
//! list of writable properties; only the properties that differ are PATCHed.

use crate::error::Result;
use crate::resource::chassis::Chassis;
use crate::resource::system::ComputerSystem;
use crate::RedfishApi;
use serde_json::{Map, Value};

pub trait Updatable {
    /// Property names accepted by PATCH, as spelled on the wire.
    const READ_WRITE_FIELDS: &'static [&'static str];

    /// Address the PATCH is sent to.
    fn path(&self) -> &str;

    /// Current value of a writable property.
    fn field(&self, name: &str) -> Option<Value>;

    /// Writable properties whose value differs from `original`, with the new value.
    fn changed_fields(&self, original: &Self) -> Map<String, Value> {
        let mut changed = Map::new();
        for &name in Self::READ_WRITE_FIELDS {
            let current = self.field(name);
            if current != original.field(name) {
                if let Some(value) = current {
                    changed.insert(name.to_string(), value);
                }
            }
        }
        changed
    }
}

/// PATCH the properties changed between `original` and `current`.
///
/// Returns `false` without a request when nothing changed.
pub async fn update<T: Updatable + Sync>(
    api: &dyn RedfishApi,
    original: &T,
    current: &T,
) -> Result<bool> {
    let changed = current.changed_fields(original);
    if changed.is_empty() {
        return Ok(false);
    }
    tracing::info!(
        path = original.path(),
        fields = ?changed.keys().collect::<Vec<_>>(),
        "Updating resource"
    );
    api.patch(original.path(), &Value::Object(changed)).await?;
    Ok(true)
}

impl Updatable for Chassis {
    const READ_WRITE_FIELDS: &'static [&'static str] = &["AssetTag", "IndicatorLED"];

    fn path(&self) -> &str {
        &self.odata_id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "AssetTag" => Some(Value::from(self.asset_tag.as_str())),
            "IndicatorLED" => Some(Value::from(self.indicator_led.as_str())),
            _ => None,
        }
    }
}

impl Updatable for ComputerSystem {
    const READ_WRITE_FIELDS: &'static [&'static str] = &[];

    fn path(&self) -> &str {
        &self.odata_id
    }

    fn field(&self, _name: &str) -> Option<Value> {
        None
    }
}
