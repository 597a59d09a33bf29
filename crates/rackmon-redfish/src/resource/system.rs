use super::oem::VendorExtension;
use super::processor::Processor;
use super::storage::{ArrayController, SimpleStorage, ARRAY_CONTROLLERS_SEGMENT};
use super::{nullable, Resource, Status};
use crate::link::{Collection, Link};
use crate::manufacturer_token;
use serde::Deserialize;

/// A computer system (server) as seen by its management controller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawComputerSystem")]
pub struct ComputerSystem {
    pub odata_id: String,
    pub id: String,
    pub name: String,
    pub description: String,
    /// Manufacturer string as reported.
    pub manufacturer: String,
    /// First token of `manufacturer`, or `"Unknown"`.
    pub manufacturer_token: String,
    pub model: String,
    pub serial_number: String,
    pub sku: String,
    pub power_state: String,
    pub status: Status,
    pub processor_summary: ProcessorSummary,
    pub memory_summary: MemorySummary,
    pub processors: Link<Collection<Processor>>,
    pub memory: Link<()>,
    pub simple_storage: Link<Collection<SimpleStorage>>,
    pub vendor_extension: Option<VendorExtension>,
}

impl Resource for ComputerSystem {
    const KIND: &'static str = "ComputerSystem";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub logical_processor_count: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemorySummary {
    #[serde(rename = "TotalSystemMemoryGiB", default)]
    pub total_system_memory_gib: Option<f64>,
    #[serde(rename = "TotalSystemPersistentMemoryGiB", default)]
    pub total_system_persistent_memory_gib: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

/// Where the drives of a system are found, chosen by manufacturer token.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageRoute {
    /// HPE: smart storage array controllers, then their physical drives.
    SmartStorage(Link<Collection<ArrayController>>),
    /// Dell: simple storage controllers with inline devices.
    SimpleStorage(Link<Collection<SimpleStorage>>),
    /// Any other manufacturer exposes no drive metrics.
    Unsupported,
}

impl ComputerSystem {
    pub fn storage_route(&self) -> StorageRoute {
        match self.manufacturer_token.as_str() {
            "HPE" => {
                let smart_storage = self
                    .vendor_extension
                    .as_ref()
                    .map(VendorExtension::smart_storage)
                    .unwrap_or_default();
                StorageRoute::SmartStorage(smart_storage.join(ARRAY_CONTROLLERS_SEGMENT))
            }
            "Dell" => StorageRoute::SimpleStorage(self.simple_storage.clone()),
            _ => StorageRoute::Unsupported,
        }
    }

    pub fn battery_health(&self) -> Option<&str> {
        self.vendor_extension
            .as_ref()
            .and_then(VendorExtension::battery_health)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawComputerSystem {
    #[serde(rename = "@odata.id", default)]
    odata_id: String,
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    description: String,
    #[serde(default, deserialize_with = "nullable")]
    manufacturer: String,
    #[serde(default, deserialize_with = "nullable")]
    model: String,
    #[serde(default, deserialize_with = "nullable")]
    serial_number: String,
    #[serde(rename = "SKU", default, deserialize_with = "nullable")]
    sku: String,
    #[serde(default, deserialize_with = "nullable")]
    power_state: String,
    #[serde(default, deserialize_with = "nullable")]
    status: Status,
    #[serde(default, deserialize_with = "nullable")]
    processor_summary: ProcessorSummary,
    #[serde(default, deserialize_with = "nullable")]
    memory_summary: MemorySummary,
    #[serde(default)]
    processors: Link<Collection<Processor>>,
    #[serde(default)]
    memory: Link<()>,
    #[serde(default)]
    simple_storage: Link<Collection<SimpleStorage>>,
    #[serde(rename = "links", default)]
    legacy_links: LegacySystemLinks,
    #[serde(default)]
    oem: Option<serde_json::Value>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacySystemLinks {
    #[serde(default)]
    processors: Link<Collection<Processor>>,
}

impl From<RawComputerSystem> for ComputerSystem {
    fn from(raw: RawComputerSystem) -> Self {
        let manufacturer_token = manufacturer_token(&raw.manufacturer).to_string();
        let vendor_extension = raw.oem.as_ref().and_then(VendorExtension::detect);
        let memory = match &vendor_extension {
            Some(ext) => ext.memory().or(raw.memory),
            None => raw.memory,
        };

        Self {
            odata_id: raw.odata_id,
            id: raw.id,
            name: raw.name,
            description: raw.description,
            manufacturer: raw.manufacturer,
            manufacturer_token,
            model: raw.model,
            serial_number: raw.serial_number,
            sku: raw.sku,
            power_state: raw.power_state,
            status: raw.status,
            processor_summary: raw.processor_summary,
            memory_summary: raw.memory_summary,
            processors: raw.processors.or(raw.legacy_links.processors),
            memory,
            simple_storage: raw.simple_storage,
            vendor_extension,
        }
    }
}
