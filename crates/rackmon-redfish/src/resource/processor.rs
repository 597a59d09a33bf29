use super::{nullable, Resource, Status};
use serde::{Deserialize, Deserializer};

/// A single processor socket of a computer system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Processor {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub socket: String,
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "nullable")]
    pub model: String,
    #[serde(rename = "MaxSpeedMHz", default, deserialize_with = "number_or_numeric_string")]
    pub max_speed_mhz: Option<f64>,
    #[serde(default)]
    pub total_cores: Option<u32>,
    #[serde(default)]
    pub total_enabled_cores: Option<u32>,
    #[serde(default)]
    pub total_threads: Option<u32>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Status,
}

impl Resource for Processor {
    const KIND: &'static str = "Processor";
}

/// Some firmware reports `MaxSpeedMHz` as a string. A number is read as is,
/// a numeric string is parsed, anything unparsable leaves the field unset.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SpeedInput {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<SpeedInput>::deserialize(deserializer)? {
        Some(SpeedInput::Number(mhz)) => Some(mhz),
        Some(SpeedInput::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(max_speed: serde_json::Value) -> Processor {
        serde_json::from_value(json!({
            "Id": "CPU.Socket.1",
            "Model": "Intel(R) Xeon(R) Gold 6130 CPU @ 2.10GHz",
            "MaxSpeedMHz": max_speed,
            "TotalCores": 16,
            "TotalThreads": 32,
            "Status": {"Health": "OK", "State": "Enabled"}
        }))
        .unwrap()
    }

    #[test]
    fn max_speed_accepts_number() {
        assert_eq!(decode(json!(4000)).max_speed_mhz, Some(4000.0));
    }

    #[test]
    fn max_speed_falls_back_to_numeric_string() {
        let processor = decode(json!("3600"));
        assert_eq!(processor.max_speed_mhz, Some(3600.0));
        assert_eq!(processor.total_cores, Some(16));
    }

    #[test]
    fn unparsable_max_speed_is_omitted_not_an_error() {
        let processor = decode(json!("fast"));
        assert_eq!(processor.max_speed_mhz, None);
        assert_eq!(processor.total_threads, Some(32));
        assert_eq!(decode(json!(null)).max_speed_mhz, None);
    }

    #[test]
    fn other_malformed_fields_are_reported() {
        let result: Result<Processor, _> =
            serde_json::from_value(json!({"Id": "1", "TotalCores": "sixteen"}));
        assert!(result.is_err());
    }
}
