use super::chassis::Chassis;
use super::nullable;
use super::system::ComputerSystem;
use super::Resource;
use crate::link::{Collection, Link};
use serde::Deserialize;

/// Default session collection when the root does not advertise one.
pub const DEFAULT_SESSIONS_PATH: &str = "/redfish/v1/SessionService/Sessions";

/// Root document of a Redfish service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawServiceRoot")]
pub struct ServiceRoot {
    pub id: String,
    pub name: String,
    pub product: String,
    pub vendor: String,
    pub redfish_version: String,
    pub uuid: String,
    pub chassis: Link<Collection<Chassis>>,
    pub systems: Link<Collection<ComputerSystem>>,
    pub sessions: Link<()>,
}

impl ServiceRoot {
    /// Session collection, falling back to the well-known path.
    pub fn sessions_path(&self) -> &str {
        self.sessions.path().unwrap_or(DEFAULT_SESSIONS_PATH)
    }
}

impl Resource for ServiceRoot {
    const KIND: &'static str = "ServiceRoot";
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawServiceRoot {
    #[serde(default, deserialize_with = "nullable")]
    id: String,
    #[serde(default, deserialize_with = "nullable")]
    name: String,
    #[serde(default, deserialize_with = "nullable")]
    product: String,
    #[serde(default, deserialize_with = "nullable")]
    vendor: String,
    #[serde(default, deserialize_with = "nullable")]
    redfish_version: String,
    #[serde(rename = "UUID", default, deserialize_with = "nullable")]
    uuid: String,
    #[serde(default)]
    chassis: Link<Collection<Chassis>>,
    #[serde(default)]
    systems: Link<Collection<ComputerSystem>>,
    #[serde(default)]
    links: RootLinks,
    /// iLO 4 puts every link under lowercase `links` with `href`.
    #[serde(rename = "links", default)]
    legacy_links: LegacyRootLinks,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RootLinks {
    #[serde(default)]
    sessions: Link<()>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyRootLinks {
    #[serde(default)]
    chassis: Link<Collection<Chassis>>,
    #[serde(default)]
    systems: Link<Collection<ComputerSystem>>,
    #[serde(default)]
    sessions: Link<()>,
}

impl From<RawServiceRoot> for ServiceRoot {
    fn from(raw: RawServiceRoot) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            product: raw.product,
            vendor: raw.vendor,
            redfish_version: raw.redfish_version,
            uuid: raw.uuid,
            chassis: raw.chassis.or(raw.legacy_links.chassis),
            systems: raw.systems.or(raw.legacy_links.systems),
            sessions: raw.links.sessions.or(raw.legacy_links.sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_standard_root() {
        let root: ServiceRoot = serde_json::from_value(json!({
            "@odata.id": "/redfish/v1/",
            "Id": "RootService",
            "Name": "Root Service",
            "RedfishVersion": "1.6.0",
            "Vendor": "Dell",
            "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
            "Systems": {"@odata.id": "/redfish/v1/Systems"},
            "Links": {"Sessions": {"@odata.id": "/redfish/v1/Sessions"}}
        }))
        .unwrap();

        assert_eq!(root.chassis.path(), Some("/redfish/v1/Chassis"));
        assert_eq!(root.systems.path(), Some("/redfish/v1/Systems"));
        assert_eq!(root.sessions_path(), "/redfish/v1/Sessions");
        assert_eq!(root.redfish_version, "1.6.0");
    }

    #[test]
    fn falls_back_to_legacy_links_and_default_sessions() {
        let root: ServiceRoot = serde_json::from_value(json!({
            "Name": "HP RESTful Root Service",
            "links": {
                "Chassis": {"href": "/rest/v1/Chassis"},
                "Systems": {"href": "/rest/v1/Systems"}
            }
        }))
        .unwrap();

        assert_eq!(root.chassis.path(), Some("/rest/v1/Chassis"));
        assert_eq!(root.systems.path(), Some("/rest/v1/Systems"));
        assert_eq!(root.sessions_path(), DEFAULT_SESSIONS_PATH);
    }
}
