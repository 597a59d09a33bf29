use crate::error::{RedfishError, Result};
use crate::resource::service_root::ServiceRoot;
use crate::{RedfishApi, SERVICE_ROOT_PATH};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;

/// Header carrying the session token in session-auth mode.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Longest error body kept in [`RedfishError::Http`].
const MAX_ERROR_BODY: usize = 512;

/// Where and how to open a session.
#[derive(Clone)]
pub struct ClientConfig {
    /// `host`, `host:port` or a full URL.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Send HTTP basic credentials on every request instead of creating a session.
    pub basic_auth: bool,
    /// Skip certificate validation; BMCs almost always ship self-signed certs.
    pub insecure: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            basic_auth: false,
            insecure: true,
            timeout: Duration::from_secs(30),
        }
    }

    /// Base URL without a trailing slash. Endpoints without a scheme get `https://`.
    pub fn base_url(&self) -> Result<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(RedfishError::InvalidEndpoint("endpoint is empty".to_string()));
        }
        let url = if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        Ok(url.trim_end_matches('/').to_string())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .field("basic_auth", &self.basic_auth)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

enum Auth {
    Basic { username: String, password: String },
    Token { token: String, location: Option<String> },
}

/// One authenticated connection to a Redfish service.
pub struct Session {
    client: Client,
    base_url: String,
    auth: Auth,
    root: ServiceRoot,
}

impl Session {
    /// Open a session. Every failure is reported as [`RedfishError::Connect`].
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        Self::open(config).await.map_err(|source| RedfishError::Connect {
            endpoint: config.endpoint.clone(),
            source: Box::new(source),
        })
    }

    async fn open(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .build()
            .map_err(|source| RedfishError::Network {
                path: base_url.clone(),
                source,
            })?;

        if config.basic_auth {
            let mut session = Self {
                client,
                base_url,
                auth: Auth::Basic {
                    username: config.username.clone(),
                    password: config.password.clone(),
                },
                root: ServiceRoot::default(),
            };
            session.root = session.fetch_root().await?;
            tracing::debug!(endpoint = %session.base_url, "Opened basic-auth session");
            return Ok(session);
        }

        let mut session = Self {
            client,
            base_url,
            auth: Auth::Token {
                token: String::new(),
                location: None,
            },
            root: ServiceRoot::default(),
        };
        session.root = session.fetch_root().await?;

        let sessions_path = session.root.sessions_path().to_string();
        let body = json!({
            "UserName": config.username,
            "Password": config.password,
        });
        let response = session
            .client
            .post(session.url(&sessions_path))
            .json(&body)
            .send()
            .await
            .map_err(|source| RedfishError::Network {
                path: sessions_path.clone(),
                source,
            })?;
        let response = check_status(&sessions_path, response).await?;

        let token = header_value(&response, AUTH_TOKEN_HEADER).ok_or_else(|| {
            RedfishError::Auth(format!(
                "{AUTH_TOKEN_HEADER} header missing from session response"
            ))
        })?;
        let location = header_value(&response, reqwest::header::LOCATION.as_str());
        session.auth = Auth::Token { token, location };

        tracing::debug!(endpoint = %session.base_url, "Opened token session");
        Ok(session)
    }

    async fn fetch_root(&self) -> Result<ServiceRoot> {
        let document = self.get(SERVICE_ROOT_PATH).await?;
        serde_json::from_value(document)
            .map_err(|source| RedfishError::decode(SERVICE_ROOT_PATH, source))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; paths are resolved against the base URL.
    fn url(&self, path: &str) -> String {
        if path.contains("://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.auth {
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Token { token, .. } if !token.is_empty() => {
                builder.header(AUTH_TOKEN_HEADER, token)
            }
            Auth::Token { .. } => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|source| RedfishError::Network {
            path: path.to_string(),
            source,
        })?;
        check_status(path, response).await
    }
}

#[async_trait::async_trait]
impl RedfishApi for Session {
    fn service_root(&self) -> &ServiceRoot {
        &self.root
    }

    async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let response = self.send(Method::GET, path, None).await?;
        let body = response.bytes().await.map_err(|source| RedfishError::Network {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| RedfishError::decode(path, source))
    }

    async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        self.send(Method::PATCH, path, Some(body)).await?;
        Ok(())
    }

    async fn logout(&self) {
        let Auth::Token {
            location: Some(location),
            ..
        } = &self.auth
        else {
            return;
        };
        match self.send(Method::DELETE, location, None).await {
            Ok(_) => tracing::debug!(endpoint = %self.base_url, "Closed session"),
            Err(e) => {
                tracing::warn!(endpoint = %self.base_url, error = %e, "Failed to close session")
            }
        }
    }
}

async fn check_status(path: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    Err(RedfishError::Http {
        path: path.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
