use crate::config::{HostConfig, ServerConfig};
use crate::exposition;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub err_msg: String,
    pub trace_id: String,
}

pub fn error_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiError {
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
        }),
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub target: Option<String>,
    pub group: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Any non-empty value other than `false`, `0` or `no` turns basic auth on.
    pub basic_auth: Option<String>,
}

impl ScrapeParams {
    fn basic_auth(&self) -> Option<bool> {
        let value = self.basic_auth.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        let off = ["false", "0", "no"]
            .iter()
            .any(|v| value.eq_ignore_ascii_case(v));
        Some(!off)
    }
}

/// Credentials for one scrape. A username in the query wins over the group.
fn resolve_credentials(
    config: &ServerConfig,
    params: &ScrapeParams,
) -> anyhow::Result<HostConfig> {
    if let Some(username) = params.username.as_deref().filter(|u| !u.is_empty()) {
        return Ok(HostConfig {
            username: username.to_string(),
            password: params.password.clone().unwrap_or_default(),
            basic_auth: params.basic_auth().unwrap_or(false),
        });
    }
    match params.group.as_deref().filter(|g| !g.is_empty()) {
        Some(group) => {
            let mut host = config.host_config_for_group(group)?.clone();
            if let Some(basic_auth) = params.basic_auth() {
                host.basic_auth = basic_auth;
            }
            Ok(host)
        }
        None => anyhow::bail!("either 'group' or 'username' must be specified"),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/redfish", get(redfish))
        .route("/metrics", get(exporter_metrics))
}

/// Scrape one BMC and render its samples.
async fn redfish(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    let target = match params.target.as_deref().map(str::trim) {
        Some(target) if !target.is_empty() => target.to_string(),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &trace_id,
                "'target' parameter must be specified",
            )
        }
    };

    let host = match resolve_credentials(&state.config, &params) {
        Ok(host) => host,
        Err(e) => {
            tracing::error!(
                host = %target,
                group = ?params.group,
                error = %e,
                "Error getting credentials"
            );
            return error_response(StatusCode::BAD_REQUEST, &trace_id, &e.to_string());
        }
    };

    let client = state.config.client_config(&target, &host);
    let outcome = state.collector.scrape(&client).await;
    state.metrics.record(&outcome);

    match exposition::render(&state.collector.describe(), &outcome.samples) {
        Ok(body) => ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(host = %target, error = %e, "Failed to render samples");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                &format!("Encoding error: {e}"),
            )
        }
    }
}

async fn exporter_metrics(
    State(state): State<AppState>,
    Extension(trace_id): Extension<TraceId>,
) -> Response {
    match exposition::encode(&state.metrics.registry) {
        Ok(body) => ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &trace_id,
            &format!("Encoding error: {e}"),
        ),
    }
}

const INDEX_HTML: &str = r#"<html>
<head><title>Rackserver Exporter</title></head>
<body>
<h1>Rackserver Exporter</h1>
<form action="/redfish">
<label>Target:</label> <input type="text" name="target" placeholder="X.X.X.X"><br>
<label>Group:</label> <input type="text" name="group" placeholder="group"><br>
<input type="submit" value="Submit">
</form>
<p><a href="/metrics">Local metrics</a></p>
</body>
</html>
"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> ServerConfig {
        let mut groups = HashMap::new();
        groups.insert(
            "dell".to_string(),
            HostConfig {
                username: "root".into(),
                password: "calvin".into(),
                basic_auth: true,
            },
        );
        ServerConfig {
            groups,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn explicit_credentials_win_over_group() {
        let params = ScrapeParams {
            group: Some("dell".into()),
            username: Some("admin".into()),
            password: Some("secret".into()),
            ..ScrapeParams::default()
        };
        let host = resolve_credentials(&config(), &params).unwrap();
        assert_eq!(host.username, "admin");
        assert_eq!(host.password, "secret");
        assert!(!host.basic_auth);
    }

    #[test]
    fn group_credentials_are_used() {
        let params = ScrapeParams {
            group: Some("dell".into()),
            ..ScrapeParams::default()
        };
        let host = resolve_credentials(&config(), &params).unwrap();
        assert_eq!(host.username, "root");
        assert!(host.basic_auth);
    }

    #[test]
    fn basic_auth_flag_is_lenient() {
        let with = |value: &str| ScrapeParams {
            basic_auth: Some(value.to_string()),
            ..ScrapeParams::default()
        };
        assert_eq!(with("1").basic_auth(), Some(true));
        assert_eq!(with("true").basic_auth(), Some(true));
        assert_eq!(with("on").basic_auth(), Some(true));
        assert_eq!(with("FALSE").basic_auth(), Some(false));
        assert_eq!(with("0").basic_auth(), Some(false));
        assert_eq!(with("").basic_auth(), None);
        assert_eq!(ScrapeParams::default().basic_auth(), None);

        let params = ScrapeParams {
            group: Some("dell".into()),
            basic_auth: Some("0".into()),
            ..ScrapeParams::default()
        };
        assert!(!resolve_credentials(&config(), &params).unwrap().basic_auth);
    }

    #[test]
    fn unknown_group_or_nothing_is_rejected() {
        let unknown = ScrapeParams {
            group: Some("hpe".into()),
            ..ScrapeParams::default()
        };
        let err = resolve_credentials(&config(), &unknown).unwrap_err();
        assert!(err.to_string().contains("hpe"));

        assert!(resolve_credentials(&config(), &ScrapeParams::default()).is_err());
    }
}
