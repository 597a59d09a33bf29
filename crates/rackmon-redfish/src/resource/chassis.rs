use super::{nullable, nullable_vec, Embedded, Resource, Status};
use crate::link::Link;
use serde::Deserialize;

/// Physical enclosure: rack mount server, blade, storage shelf.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub chassis_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default, deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(rename = "SKU", default, deserialize_with = "nullable")]
    pub sku: String,
    #[serde(default, deserialize_with = "nullable")]
    pub part_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub asset_tag: String,
    #[serde(rename = "IndicatorLED", default, deserialize_with = "nullable")]
    pub indicator_led: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
    #[serde(default)]
    pub thermal: Link<Thermal>,
    #[serde(default)]
    pub power: Link<Power>,
}

impl Resource for Chassis {
    const KIND: &'static str = "Chassis";
}

/// Temperature sensors and fans of a chassis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermal {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub temperatures: Vec<Embedded<Temperature>>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub fans: Vec<Embedded<Fan>>,
}

impl Resource for Thermal {
    const KIND: &'static str = "Thermal";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Temperature {
    #[serde(default, deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub reading_celsius: Option<f64>,
    #[serde(default)]
    pub upper_threshold_critical: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawFan")]
pub struct Fan {
    pub member_id: String,
    pub name: String,
    pub reading: Option<f64>,
    pub reading_units: String,
    pub status: Status,
}

/// Services may send the legacy iLO 4 spellings alongside the standard
/// ones (iDRAC reports both `Name` and `FanName`), so each is its own field.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFan {
    #[serde(default, deserialize_with = "nullable")]
    member_id: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    fan_name: String,
    #[serde(default)]
    reading: Option<f64>,
    #[serde(default)]
    current_reading: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    reading_units: String,
    #[serde(default, deserialize_with = "nullable")]
    units: String,
    #[serde(default, deserialize_with = "nullable")]
    status: Status,
}

impl From<RawFan> for Fan {
    fn from(raw: RawFan) -> Self {
        Self {
            member_id: raw.member_id,
            name: if raw.name.is_empty() { raw.fan_name } else { raw.name },
            reading: raw.reading.or(raw.current_reading),
            reading_units: if raw.reading_units.is_empty() {
                raw.units
            } else {
                raw.reading_units
            },
            status: raw.status,
        }
    }
}

/// Power supplies of a chassis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Power {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub power_supplies: Vec<Embedded<PowerSupply>>,
}

impl Resource for Power {
    const KIND: &'static str = "Power";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerSupply {
    #[serde(default, deserialize_with = "nullable")]
    pub member_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub serial_number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(default)]
    pub power_capacity_watts: Option<f64>,
    #[serde(default)]
    pub last_power_output_watts: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

impl PowerSupply {
    /// Member id, or the serial number when the service leaves it blank.
    pub fn label_id(&self) -> &str {
        if self.member_id.is_empty() {
            &self.serial_number
        } else {
            &self.member_id
        }
    }
}
