//! HTTP surface of the exporter, driven through the router.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use mockito::Server;
use rackmon_server::app::build_http_app;
use rackmon_server::config::{HostConfig, ServerConfig};
use rackmon_server::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    let mut config = ServerConfig {
        request_timeout_secs: 5,
        ..ServerConfig::default()
    };
    config.groups.insert(
        "lab".to_string(),
        HostConfig {
            username: "root".into(),
            password: "calvin".into(),
            basic_auth: true,
        },
    );
    build_http_app(AppState::new(config).expect("metrics should register"))
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, String, Option<String>) {
    let req = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let resp = app.clone().oneshot(req).await.expect("request should be handled");
    let status = resp.status();
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    (status, String::from_utf8_lossy(&bytes).to_string(), trace_id)
}

#[tokio::test]
async fn missing_target_is_a_bad_request() {
    let (status, body, trace_id) = get(&app(), "/redfish?group=lab").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["err_msg"], "'target' parameter must be specified");
    assert_eq!(Some(body["trace_id"].as_str().unwrap().to_string()), trace_id);
}

#[tokio::test]
async fn unknown_group_without_credentials_is_a_bad_request() {
    let (status, body, _) = get(&app(), "/redfish?target=10.0.0.5&group=nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no credentials found for group nope"));
}

#[tokio::test]
async fn index_links_the_scrape_form() {
    let (status, body, _) = get(&app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Rackserver Exporter</h1>"));
    assert!(body.contains(r#"action="/redfish""#));
}

#[tokio::test]
async fn scrape_renders_samples_and_counts_itself() {
    let mut bmc = Server::new_async().await;
    let _root = bmc
        .mock("GET", "/redfish/v1/")
        .match_header("authorization", "Basic cm9vdDpjYWx2aW4=")
        .with_body(
            json!({
                "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
                "Systems": {"@odata.id": "/redfish/v1/Systems"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _chassis = bmc
        .mock("GET", "/redfish/v1/Chassis")
        .with_body(json!({"Members": [{"@odata.id": "/redfish/v1/Chassis/1"}]}).to_string())
        .create_async()
        .await;
    let _chassis_1 = bmc
        .mock("GET", "/redfish/v1/Chassis/1")
        .with_body(
            json!({"Id": "1", "Manufacturer": "Dell Inc.", "SerialNumber": "7XK",
                   "Status": {"Health": "Warning", "State": "Enabled"}})
            .to_string(),
        )
        .create_async()
        .await;
    let _systems = bmc
        .mock("GET", "/redfish/v1/Systems")
        .with_body(json!({"Members": []}).to_string())
        .create_async()
        .await;

    let app = app();
    let uri = format!("/redfish?target={}&group=lab", bmc.url());
    let (status, body, _) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE rackserver_chassis_health gauge"));
    let health = body
        .lines()
        .find(|l| l.starts_with("rackserver_chassis_health{"))
        .unwrap();
    assert!(health.contains(r#"sn="7XK""#));
    assert!(health.ends_with(" 2"));
    assert!(body.contains("rackserver_up 1"));
    assert!(body.contains(r#"rackserver_collector_scrape_status{collector="system"} 1"#));

    let (status, metrics, _) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(metrics.contains(r#"rackmon_scrapes_total{outcome="up"} 1"#));
    assert!(metrics.contains("rackmon_last_scrape_duration_seconds"));
}

#[tokio::test]
async fn unreachable_login_reports_down() {
    let mut bmc = Server::new_async().await;
    let _root = bmc
        .mock("GET", "/redfish/v1/")
        .with_status(503)
        .create_async()
        .await;

    let app = app();
    let uri = format!("/redfish?target={}&username=admin&password=pw", bmc.url());
    let (status, body, _) = get(&app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("rackserver_up 0"));
    assert!(body.contains("rackserver_exporter_collector_duration_seconds"));
    assert!(!body.contains("rackserver_collector_scrape_status"));

    let (_, metrics, _) = get(&app, "/metrics").await;
    assert!(metrics.contains(r#"rackmon_scrapes_total{outcome="down"} 1"#));
}

#[tokio::test]
async fn numeric_basic_auth_flag_is_accepted() {
    let mut bmc = Server::new_async().await;
    // base64("admin:pw")
    let root = bmc
        .mock("GET", "/redfish/v1/")
        .match_header("authorization", "Basic YWRtaW46cHc=")
        .with_body(json!({}).to_string())
        .create_async()
        .await;

    let uri = format!(
        "/redfish?target={}&username=admin&password=pw&basic_auth=1",
        bmc.url()
    );
    let (status, body, _) = get(&app(), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("rackserver_up 1"));
    root.assert_async().await;
}
