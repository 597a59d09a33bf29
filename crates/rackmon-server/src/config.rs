use anyhow::Context;
use rackmon_redfish::ClientConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Per-request timeout towards a BMC. Bounds how long one scrape can hang.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Skip certificate validation when talking to BMCs.
    #[serde(default = "default_insecure")]
    pub insecure: bool,
    #[serde(default)]
    pub groups: HashMap<String, HostConfig>,
}

/// Credentials shared by every BMC in one group.
#[derive(Clone, Default, Deserialize)]
pub struct HostConfig {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub basic_auth: bool,
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("basic_auth", &self.basic_auth)
            .finish()
    }
}

fn default_listen_address() -> String {
    "0.0.0.0:9610".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_insecure() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            request_timeout_secs: default_request_timeout_secs(),
            insecure: default_insecure(),
            groups: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {path}"))?;
        Ok(config)
    }

    pub fn host_config_for_group(&self, group: &str) -> anyhow::Result<&HostConfig> {
        self.groups
            .get(group)
            .ok_or_else(|| anyhow::anyhow!("no credentials found for group {group}"))
    }

    /// Client settings for one scrape of `target`.
    pub fn client_config(&self, target: &str, host: &HostConfig) -> ClientConfig {
        let mut config = ClientConfig::new(target, host.username.as_str(), host.password.as_str());
        config.basic_auth = host.basic_auth;
        config.insecure = self.insecure;
        config.timeout = Duration::from_secs(self.request_timeout_secs);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_applies_defaults() {
        let file = write_config(
            r#"
[groups.dell]
username = "root"
password = "calvin"
basic_auth = true
"#,
        );
        let config = ServerConfig::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.listen_address, "0.0.0.0:9610");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.insecure);

        let dell = config.host_config_for_group("dell").unwrap();
        assert_eq!(dell.username, "root");
        assert!(dell.basic_auth);
    }

    #[test]
    fn unknown_group_names_the_group() {
        let config = ServerConfig::default();
        let err = config.host_config_for_group("hpe").unwrap_err();
        assert!(err.to_string().contains("hpe"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ServerConfig::load("/nonexistent/rackmon.toml").is_err());
    }

    #[test]
    fn client_config_carries_server_settings() {
        let config = ServerConfig {
            request_timeout_secs: 5,
            insecure: false,
            ..ServerConfig::default()
        };
        let host = HostConfig {
            username: "admin".into(),
            password: "secret".into(),
            basic_auth: false,
        };
        let client = config.client_config("10.0.0.5", &host);
        assert_eq!(client.endpoint, "10.0.0.5");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert!(!client.insecure);
        assert!(!format!("{host:?}").contains("secret"));
    }
}
