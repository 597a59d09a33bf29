use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Prefix of every metric this exporter emits.
pub const NAMESPACE: &str = "rackserver";

/// Fully qualified metric name: `rackserver_<subsystem>_<name>`.
///
/// # Examples
///
/// ```
/// use rackmon_collector::metric::fq_name;
///
/// assert_eq!(fq_name("chassis", "health"), "rackserver_chassis_health");
/// assert_eq!(fq_name("", "up"), "rackserver_up");
/// ```
pub fn fq_name(subsystem: &str, name: &str) -> String {
    if subsystem.is_empty() {
        format!("{NAMESPACE}_{name}")
    } else {
        format!("{NAMESPACE}_{subsystem}_{name}")
    }
}

/// Name, help text and label schema of one gauge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub label_names: Vec<&'static str>,
}

impl MetricDesc {
    pub fn new(name: String, help: &str, label_names: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            name,
            help: help.to_string(),
            label_names: label_names.to_vec(),
        })
    }

    /// Sample for this descriptor, timestamped now.
    pub fn sample(self: &Arc<Self>, value: f64, label_values: Vec<String>) -> Sample {
        debug_assert_eq!(
            label_values.len(),
            self.label_names.len(),
            "label values for {} do not match its schema",
            self.name
        );
        Sample {
            desc: Arc::clone(self),
            value,
            label_values,
            timestamp: Utc::now(),
        }
    }
}

/// One emitted value.
#[derive(Debug, Clone)]
pub struct Sample {
    pub desc: Arc<MetricDesc>,
    pub value: f64,
    pub label_values: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Value of the label `name`, if the schema has one.
    pub fn label(&self, name: &str) -> Option<&str> {
        let index = self.desc.label_names.iter().position(|l| *l == name)?;
        self.label_values.get(index).map(String::as_str)
    }
}

/// Append a sample when `value` is present.
pub(crate) fn push_mapped(
    samples: &mut Vec<Sample>,
    desc: &Arc<MetricDesc>,
    value: Option<f64>,
    label_values: &[String],
) {
    if let Some(value) = value {
        samples.push(desc.sample(value, label_values.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_labels_follow_schema_order() {
        let desc = MetricDesc::new(
            fq_name("chassis", "health"),
            "health of chassis",
            &["sn", "mfr", "resource", "chassis_id"],
        );
        let sample = desc.sample(
            1.0,
            vec!["CZJ1".into(), "HPE".into(), "chassis".into(), "1".into()],
        );
        assert_eq!(sample.name(), "rackserver_chassis_health");
        assert_eq!(sample.label("mfr"), Some("HPE"));
        assert_eq!(sample.label("chassis_id"), Some("1"));
        assert_eq!(sample.label("fan"), None);
    }
}
