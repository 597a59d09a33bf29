//! Prometheus text rendering of one scrape.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use rackmon_collector::{MetricDesc, Sample};
use std::collections::HashMap;
use std::sync::Arc;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Registers one gauge family per descriptor in a fresh registry and fills
/// it from `samples`. Families without samples are left out of the output.
pub fn render(descs: &[Arc<MetricDesc>], samples: &[Sample]) -> prometheus::Result<String> {
    let registry = Registry::new();
    let mut gauges = HashMap::with_capacity(descs.len());

    for desc in descs {
        let gauge = GaugeVec::new(
            Opts::new(desc.name.as_str(), desc.help.as_str()),
            &desc.label_names,
        )?;
        registry.register(Box::new(gauge.clone()))?;
        gauges.insert(desc.name.as_str(), gauge);
    }

    for sample in samples {
        let Some(gauge) = gauges.get(sample.name()) else {
            tracing::warn!(metric = sample.name(), "Sample without a registered descriptor");
            continue;
        };
        let values: Vec<&str> = sample.label_values.iter().map(String::as_str).collect();
        gauge.get_metric_with_label_values(values.as_slice())?.set(sample.value);
    }

    encode(&registry)
}

pub fn encode(registry: &Registry) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
