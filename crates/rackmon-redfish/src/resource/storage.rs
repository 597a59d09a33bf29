use super::{nullable, nullable_vec, Embedded, Resource, Status};
use crate::link::{Collection, Link};
use serde::Deserialize;

/// HPE smart storage service root. Only used as a link target: array
/// controllers live at `<smart storage>/ArrayControllers/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmartStorage {}

impl Resource for SmartStorage {
    const KIND: &'static str = "SmartStorage";
}

/// Sub-path of the smart storage link holding the array controller collection.
pub const ARRAY_CONTROLLERS_SEGMENT: &str = "ArrayControllers/";

/// HPE smart array controller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawArrayController")]
pub struct ArrayController {
    pub id: String,
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
    pub current_operating_mode: String,
    pub status: Status,
    pub links: ArrayControllerLinks,
}

/// iLO 4 2.x sends both `Links` and `links`; they are merged per link.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawArrayController {
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    model: String,
    #[serde(default, deserialize_with = "nullable")]
    serial_number: String,
    #[serde(default, deserialize_with = "nullable")]
    location: String,
    #[serde(default, deserialize_with = "nullable")]
    current_operating_mode: String,
    #[serde(default, deserialize_with = "nullable")]
    status: Status,
    #[serde(default, deserialize_with = "nullable")]
    links: ArrayControllerLinks,
    #[serde(rename = "links", default, deserialize_with = "nullable")]
    legacy_links: ArrayControllerLinks,
}

impl From<RawArrayController> for ArrayController {
    fn from(raw: RawArrayController) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            model: raw.model,
            serial_number: raw.serial_number,
            location: raw.location,
            current_operating_mode: raw.current_operating_mode,
            status: raw.status,
            links: raw.links.or(raw.legacy_links),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArrayControllerLinks {
    #[serde(default)]
    pub logical_drives: Link<Collection<Drive>>,
    #[serde(default)]
    pub physical_drives: Link<Collection<Drive>>,
}

impl ArrayControllerLinks {
    /// Each link falls back to `other` when unset here.
    fn or(self, other: ArrayControllerLinks) -> Self {
        Self {
            logical_drives: self.logical_drives.or(other.logical_drives),
            physical_drives: self.physical_drives.or(other.physical_drives),
        }
    }
}

impl Resource for ArrayController {
    const KIND: &'static str = "ArrayController";
}

/// Physical drive behind an HPE array controller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Drive {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: String,
    #[serde(default, deserialize_with = "nullable")]
    pub interface_type: String,
    #[serde(rename = "CapacityGB", default)]
    pub capacity_gb: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

impl Resource for Drive {
    const KIND: &'static str = "Drive";
}

/// Simple storage controller with its devices inline (Dell iDRAC).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleStorage {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub devices: Vec<Embedded<Device>>,
}

impl Resource for SimpleStorage {
    const KIND: &'static str = "SimpleStorage";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default)]
    pub capacity_bytes: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

impl Device {
    /// Capacity as `bytes / 1024 / 1024` in integer arithmetic, the unit the
    /// drive capacity metric has always carried for this storage path.
    pub fn capacity_scaled(&self) -> Option<u64> {
        self.capacity_bytes.map(|bytes| bytes / 1024 / 1024)
    }
}
