//! Self-metrics of the exporter, served on `/metrics`.

use prometheus::{Gauge, IntCounterVec, Opts, Registry};
use rackmon_collector::scrape::ScrapeOutcome;

#[derive(Clone)]
pub struct ExporterMetrics {
    pub registry: Registry,
    pub scrapes_total: IntCounterVec,
    pub last_scrape_duration_seconds: Gauge,
}

impl ExporterMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let scrapes_total = IntCounterVec::new(
            Opts::new("rackmon_scrapes_total", "Redfish scrapes served, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(scrapes_total.clone()))?;

        let last_scrape_duration_seconds = Gauge::new(
            "rackmon_last_scrape_duration_seconds",
            "Duration of the most recent Redfish scrape",
        )?;
        registry.register(Box::new(last_scrape_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            scrapes_total,
            last_scrape_duration_seconds,
        })
    }

    pub fn record(&self, outcome: &ScrapeOutcome) {
        let label = if outcome.up { "up" } else { "down" };
        self.scrapes_total.with_label_values(&[label]).inc();
        self.last_scrape_duration_seconds
            .set(outcome.duration.as_secs_f64());
    }
}
