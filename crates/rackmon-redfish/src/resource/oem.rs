//! Vendor extensions found under a ComputerSystem's `Oem` block.
//!
//! Decoding is two-pass: the common system shape first, then each known
//! vendor shape in a fixed order. The first decoder that succeeds wins;
//! an unknown or malformed block is simply "no extension".

use super::storage::SmartStorage;
use crate::link::Link;
use serde::Deserialize;

/// Known vendor extension shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorExtension {
    /// iLO 4 `Oem.Hp` with `href` links.
    Hp(HpOem),
    /// iLO 5 and later `Oem.Hpe` with `@odata.id` links.
    Hpe(HpOem),
}

/// Fields shared by the HP and HPE system extensions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawHpOem")]
pub struct HpOem {
    links: HpLinks,
    battery: Option<Vec<HpBattery>>,
}

/// iLO 4 uses `links`, iLO 5 `Links`, and some firmware sends both.
#[derive(Deserialize)]
struct RawHpOem {
    #[serde(rename = "Links", default)]
    links: HpLinks,
    #[serde(rename = "links", default)]
    legacy_links: HpLinks,
    #[serde(rename = "Battery", default)]
    battery: Option<Vec<HpBattery>>,
}

impl From<RawHpOem> for HpOem {
    fn from(raw: RawHpOem) -> Self {
        Self {
            links: HpLinks {
                smart_storage: raw.links.smart_storage.or(raw.legacy_links.smart_storage),
                memory: raw.links.memory.or(raw.legacy_links.memory),
            },
            battery: raw.battery,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct HpLinks {
    #[serde(rename = "SmartStorage", default)]
    smart_storage: Link<SmartStorage>,
    #[serde(rename = "Memory", default)]
    memory: Link<()>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct HpBattery {
    #[serde(rename = "Condition", default)]
    condition: Option<String>,
}

type Detector = fn(&serde_json::Value) -> Option<VendorExtension>;

/// Decoders tried in order; first match wins.
const DETECTORS: &[Detector] = &[detect_hp, detect_hpe];

impl VendorExtension {
    pub fn detect(oem: &serde_json::Value) -> Option<Self> {
        DETECTORS.iter().find_map(|detect| detect(oem))
    }

    fn hp(&self) -> &HpOem {
        match self {
            VendorExtension::Hp(oem) | VendorExtension::Hpe(oem) => oem,
        }
    }

    pub fn smart_storage(&self) -> Link<SmartStorage> {
        self.hp().links.smart_storage.clone()
    }

    pub fn memory(&self) -> Link<()> {
        self.hp().links.memory.clone()
    }

    /// Condition of the last battery that reports one.
    pub fn battery_health(&self) -> Option<&str> {
        self.hp()
            .battery
            .iter()
            .flatten()
            .filter_map(|b| b.condition.as_deref())
            .last()
    }
}

fn decode_block(oem: &serde_json::Value, key: &str) -> Option<HpOem> {
    let block = oem.get(key)?;
    HpOem::deserialize(block).ok()
}

fn detect_hp(oem: &serde_json::Value) -> Option<VendorExtension> {
    decode_block(oem, "Hp").map(VendorExtension::Hp)
}

fn detect_hpe(oem: &serde_json::Value) -> Option<VendorExtension> {
    decode_block(oem, "Hpe").map(VendorExtension::Hpe)
}
