//! In-memory Redfish service for collector tests.

use rackmon_redfish::{RedfishApi, RedfishError, Result, ServiceRoot};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockApi {
    root: ServiceRoot,
    documents: HashMap<String, Value>,
    statuses: HashMap<String, u16>,
    requested: Mutex<Vec<String>>,
    pub logouts: AtomicUsize,
}

impl MockApi {
    pub fn new(root: Value) -> Self {
        Self {
            root: serde_json::from_value(root).unwrap(),
            documents: HashMap::new(),
            statuses: HashMap::new(),
            requested: Mutex::new(Vec::new()),
            logouts: AtomicUsize::new(0),
        }
    }

    /// Service root with the standard chassis and systems collections.
    pub fn standard() -> Self {
        Self::new(serde_json::json!({
            "Chassis": {"@odata.id": "/redfish/v1/Chassis"},
            "Systems": {"@odata.id": "/redfish/v1/Systems"}
        }))
    }

    pub fn with(mut self, path: &str, document: Value) -> Self {
        self.documents.insert(path.to_string(), document);
        self
    }

    pub fn failing(mut self, path: &str, status: u16) -> Self {
        self.statuses.insert(path.to_string(), status);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn was_requested(&self, prefix: &str) -> bool {
        self.requested().iter().any(|p| p.starts_with(prefix))
    }
}

#[async_trait::async_trait]
impl RedfishApi for MockApi {
    fn service_root(&self) -> &ServiceRoot {
        &self.root
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.requested.lock().unwrap().push(path.to_string());
        if let Some(status) = self.statuses.get(path) {
            return Err(RedfishError::Http {
                path: path.to_string(),
                status: *status,
                body: String::new(),
            });
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| RedfishError::Http {
                path: path.to_string(),
                status: 404,
                body: String::new(),
            })
    }

    async fn patch(&self, _path: &str, _body: &Value) -> Result<()> {
        Ok(())
    }

    async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}
