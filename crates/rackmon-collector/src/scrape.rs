use crate::metric::{fq_name, MetricDesc, Sample};
use crate::sink;
use crate::{ChassisCollector, Collector, SystemCollector};
use rackmon_redfish::{ClientConfig, RedfishApi, RedfishError, Session};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of one scrape. `up` is false only when no session could be opened.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub samples: Vec<Sample>,
    pub up: bool,
    pub duration: Duration,
}

/// Runs every sub-collector against one target per scrape.
///
/// Phases: connect, dispatch every collector as its own task, aggregate
/// their samples with the status, `up` and duration gauges, and always log
/// the session out.
pub struct RedfishCollector {
    collectors: Vec<Arc<dyn Collector>>,
    up: Arc<MetricDesc>,
    duration: Arc<MetricDesc>,
    scrape_status: Arc<MetricDesc>,
}

impl Default for RedfishCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl RedfishCollector {
    /// Chassis and system collectors.
    pub fn new() -> Self {
        Self::with_collectors(vec![
            Arc::new(ChassisCollector::new()),
            Arc::new(SystemCollector::new()),
        ])
    }

    pub fn with_collectors(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self {
            collectors,
            up: MetricDesc::new(fq_name("", "up"), "redfish up", &[]),
            duration: MetricDesc::new(
                fq_name("exporter", "collector_duration_seconds"),
                "Collector time duration.",
                &[],
            ),
            scrape_status: MetricDesc::new(
                fq_name("", "collector_scrape_status"),
                "collector_scrape_status",
                &["collector"],
            ),
        }
    }

    pub fn describe(&self) -> Vec<Arc<MetricDesc>> {
        let mut descs = vec![
            Arc::clone(&self.up),
            Arc::clone(&self.duration),
            Arc::clone(&self.scrape_status),
        ];
        for collector in &self.collectors {
            descs.extend(collector.describe());
        }
        descs
    }

    /// Open a session to `config.endpoint` and scrape it.
    pub async fn scrape(&self, config: &ClientConfig) -> ScrapeOutcome {
        self.scrape_with(|| async move {
            Session::connect(config)
                .await
                .map(|session| Arc::new(session) as Arc<dyn RedfishApi>)
        })
        .await
    }

    /// Scrape through whatever `connect` opens.
    pub async fn scrape_with<F, Fut>(&self, connect: F) -> ScrapeOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn RedfishApi>, RedfishError>>,
    {
        let started = Instant::now();
        let (sink, stream) = sink::channel();

        let api = match connect().await {
            Ok(api) => api,
            Err(e) => {
                tracing::error!(error = %e, "Error creating redfish client");
                let duration = started.elapsed();
                sink.emit(&self.up, 0.0, &[]);
                sink.emit(&self.duration, duration.as_secs_f64(), &[]);
                drop(sink);
                return ScrapeOutcome {
                    samples: stream.collect().await,
                    up: false,
                    duration,
                };
            }
        };
        let session = LogoutGuard::new(Arc::clone(&api));

        let mut running = Vec::with_capacity(self.collectors.len());
        for collector in &self.collectors {
            let collector = Arc::clone(collector);
            let (api, sink) = (Arc::clone(&api), sink.clone());
            let name = collector.name();
            running.push((name, tokio::spawn(async move { collector.collect(api, sink).await })));
        }

        for (name, task) in running {
            let completed = match task.await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    tracing::warn!(collector = name, error = %e, "Collector scrape failed");
                    false
                }
                Err(e) => {
                    tracing::error!(collector = name, error = %e, "Task panicked");
                    false
                }
            };
            sink.emit(
                &self.scrape_status,
                if completed { 1.0 } else { 0.0 },
                &[name.to_string()],
            );
        }

        session.logout().await;

        let duration = started.elapsed();
        sink.emit(&self.up, 1.0, &[]);
        sink.emit(&self.duration, duration.as_secs_f64(), &[]);
        drop(sink);

        let samples = stream.collect().await;
        tracing::info!(
            samples = samples.len(),
            elapsed_ms = duration.as_millis() as u64,
            "Scrape completed"
        );
        ScrapeOutcome {
            samples,
            up: true,
            duration,
        }
    }
}

/// Logs the session out exactly once, also when the scrape future is dropped
/// before it finishes.
struct LogoutGuard {
    api: Option<Arc<dyn RedfishApi>>,
}

impl LogoutGuard {
    fn new(api: Arc<dyn RedfishApi>) -> Self {
        Self { api: Some(api) }
    }

    async fn logout(mut self) {
        if let Some(api) = self.api.take() {
            api.logout().await;
        }
    }
}

impl Drop for LogoutGuard {
    fn drop(&mut self) {
        let Some(api) = self.api.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { api.logout().await });
            }
            Err(_) => tracing::warn!("Scrape abandoned outside a runtime, session not logged out"),
        }
    }
}
