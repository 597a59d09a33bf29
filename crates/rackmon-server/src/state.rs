use crate::config::ServerConfig;
use crate::metrics::ExporterMetrics;
use rackmon_collector::RedfishCollector;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub collector: Arc<RedfishCollector>,
    pub metrics: ExporterMetrics,
}

impl AppState {
    pub fn new(config: ServerConfig) -> prometheus::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            collector: Arc::new(RedfishCollector::new()),
            metrics: ExporterMetrics::new()?,
        })
    }
}
