//! Redfish metric collection.
//!
//! A [`RedfishCollector`](scrape::RedfishCollector) opens one session per
//! scrape and runs every registered [`Collector`] concurrently. Each
//! sub-collector walks one resource family and writes [`Sample`]s into a
//! shared [`SampleSink`].

pub mod chassis;
pub mod fanout;
pub mod metric;
pub mod scrape;
pub mod sink;
pub mod status;
pub mod system;

#[cfg(test)]
pub(crate) mod mock;

pub use chassis::ChassisCollector;
pub use metric::{MetricDesc, Sample};
pub use scrape::RedfishCollector;
pub use sink::SampleSink;
pub use system::SystemCollector;

use rackmon_redfish::{RedfishApi, RedfishError};
use std::sync::Arc;

/// One resource family walked per scrape.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Value of the `collector` label on `collector_scrape_status`.
    fn name(&self) -> &'static str;

    /// Every descriptor this collector can emit. Fixed for its lifetime.
    fn describe(&self) -> Vec<Arc<MetricDesc>>;

    /// Walk the resource family and emit samples.
    ///
    /// Only failing to enumerate the top-level resources is an error;
    /// failures below that are logged and the branch is skipped.
    async fn collect(&self, api: Arc<dyn RedfishApi>, sink: SampleSink) -> Result<(), RedfishError>;
}

/// Serial label: the SKU when present, otherwise the serial number.
pub(crate) fn serial_label(sku: &str, serial_number: &str) -> String {
    if sku.is_empty() {
        serial_number.to_string()
    } else {
        sku.to_string()
    }
}
