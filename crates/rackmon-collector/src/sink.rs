use crate::metric::{MetricDesc, Sample};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Many-producer handle that leaf tasks write samples into.
///
/// Cloned into every task. The paired [`SampleStream`] ends once every
/// clone has been dropped, so a scrape cannot finish reading while a
/// producer is still alive.
#[derive(Clone)]
pub struct SampleSink {
    tx: mpsc::UnboundedSender<Sample>,
}

/// Single consumer side of a [`SampleSink`].
pub struct SampleStream {
    rx: mpsc::UnboundedReceiver<Sample>,
}

pub fn channel() -> (SampleSink, SampleStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SampleSink { tx }, SampleStream { rx })
}

impl SampleSink {
    pub fn send(&self, sample: Sample) {
        if self.tx.send(sample).is_err() {
            tracing::debug!("Sample dropped, scrape output already closed");
        }
    }

    pub fn emit(&self, desc: &Arc<MetricDesc>, value: f64, label_values: &[String]) {
        self.send(desc.sample(value, label_values.to_vec()));
    }

    /// Emit only when the value mapped; `None` means "no sample".
    pub fn emit_mapped(&self, desc: &Arc<MetricDesc>, value: Option<f64>, label_values: &[String]) {
        if let Some(value) = value {
            self.emit(desc, value, label_values);
        }
    }
}

impl SampleStream {
    pub async fn recv(&mut self) -> Option<Sample> {
        self.rx.recv().await
    }

    /// Drain until every sink is dropped.
    pub async fn collect(mut self) -> Vec<Sample> {
        let mut samples = Vec::new();
        while let Some(sample) = self.rx.recv().await {
            samples.push(sample);
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::fq_name;

    #[tokio::test]
    async fn stream_ends_after_all_sinks_drop() {
        let (sink, stream) = channel();
        let desc = MetricDesc::new(fq_name("", "up"), "redfish up", &[]);

        let mut handles = Vec::new();
        for i in 0..4 {
            let sink = sink.clone();
            let desc = Arc::clone(&desc);
            handles.push(tokio::spawn(async move {
                sink.emit(&desc, i as f64, &[]);
                sink.emit_mapped(&desc, None, &[]);
            }));
        }
        drop(sink);
        for handle in handles {
            handle.await.unwrap();
        }

        let mut values: Vec<f64> = stream.collect().await.iter().map(|s| s.value).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
