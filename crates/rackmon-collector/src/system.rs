use crate::fanout::FanOut;
use crate::metric::{fq_name, push_mapped, MetricDesc, Sample};
use crate::sink::SampleSink;
use crate::status::{map_health, map_power_state, map_state};
use crate::{serial_label, Collector};
use rackmon_redfish::resource::processor::Processor;
use rackmon_redfish::resource::storage::{Device, Drive};
use rackmon_redfish::resource::system::{ComputerSystem, StorageRoute};
use rackmon_redfish::{RedfishApi, RedfishError};
use std::sync::Arc;

const SUBSYSTEM: &str = "system";

const SYSTEM_LABELS: &[&str] = &["sn", "mfr", "resource", "system_id", "hw_model"];
const PROCESSOR_LABELS: &[&str] = &["sn", "resource", "processor_id", "processor_model"];
const DRIVE_LABELS: &[&str] = &["sn", "resource", "drive_name", "drive_model"];

const HEALTH_HELP: &str = "1(OK),2(Warning),3(Critical)";
const STATE_HELP: &str = concat!(
    "1(Enabled),2(Disabled),3(StandbyOffline),4(StandbySpare),5(InTest),6(Starting),",
    "7(Absent),8(UnavailableOffline),9(Deferring),10(Quiesced),11(Updating)"
);

struct SystemMetrics {
    state: Arc<MetricDesc>,
    health_status: Arc<MetricDesc>,
    power_state: Arc<MetricDesc>,
    processor_summary_state: Arc<MetricDesc>,
    processor_summary_health_status: Arc<MetricDesc>,
    processor_summary_count: Arc<MetricDesc>,
    memory_summary_state: Arc<MetricDesc>,
    memory_summary_health_status: Arc<MetricDesc>,
    memory_summary_size: Arc<MetricDesc>,
    battery_health_status: Arc<MetricDesc>,
    processor_state: Arc<MetricDesc>,
    processor_health_status: Arc<MetricDesc>,
    processor_total_threads: Arc<MetricDesc>,
    processor_total_cores: Arc<MetricDesc>,
    storage_drive_state: Arc<MetricDesc>,
    storage_drive_health_state: Arc<MetricDesc>,
    storage_drive_capacity: Arc<MetricDesc>,
}

impl SystemMetrics {
    fn new() -> Self {
        let desc = |name: &str, help: String, labels: &[&'static str]| {
            MetricDesc::new(fq_name(SUBSYSTEM, name), &help, labels)
        };
        Self {
            state: desc("state", format!("system state, {STATE_HELP}"), SYSTEM_LABELS),
            health_status: desc(
                "health_status",
                format!("system health, {HEALTH_HELP}"),
                SYSTEM_LABELS,
            ),
            power_state: desc(
                "power_state",
                "system power state, 1(On),2(Off),3(PoweringOn),4(PoweringOff)".to_string(),
                SYSTEM_LABELS,
            ),
            processor_summary_state: desc(
                "processor_summary_state",
                format!("system overall processor state, {STATE_HELP}"),
                SYSTEM_LABELS,
            ),
            processor_summary_health_status: desc(
                "processor_summary_health_status",
                format!("system overall processor health, {HEALTH_HELP}"),
                SYSTEM_LABELS,
            ),
            processor_summary_count: desc(
                "processor_summary_count",
                "system total processor count".to_string(),
                SYSTEM_LABELS,
            ),
            memory_summary_state: desc(
                "memory_summary_state",
                format!("system memory state, {STATE_HELP}"),
                SYSTEM_LABELS,
            ),
            memory_summary_health_status: desc(
                "memory_summary_health_status",
                format!("system overall memory health, {HEALTH_HELP}"),
                SYSTEM_LABELS,
            ),
            memory_summary_size: desc(
                "memory_summary_size",
                "system total memory size, GiB".to_string(),
                SYSTEM_LABELS,
            ),
            battery_health_status: desc(
                "battery_health_status",
                format!("system smart storage battery health, {HEALTH_HELP}"),
                SYSTEM_LABELS,
            ),
            processor_state: desc(
                "processor_state",
                format!("system processor state, {STATE_HELP}"),
                PROCESSOR_LABELS,
            ),
            processor_health_status: desc(
                "processor_health_status",
                format!("system processor health state, {HEALTH_HELP}"),
                PROCESSOR_LABELS,
            ),
            processor_total_threads: desc(
                "processor_total_threads",
                "system processor total threads".to_string(),
                PROCESSOR_LABELS,
            ),
            processor_total_cores: desc(
                "processor_total_cores",
                "system processor total cores".to_string(),
                PROCESSOR_LABELS,
            ),
            storage_drive_state: desc(
                "storage_drive_state",
                format!("system storage drive state, {STATE_HELP}"),
                DRIVE_LABELS,
            ),
            storage_drive_health_state: desc(
                "storage_drive_health_state",
                format!("system storage drive health state, {HEALTH_HELP}"),
                DRIVE_LABELS,
            ),
            storage_drive_capacity: desc(
                "storage_drive_capacity",
                concat!(
                    "system storage drive capacity, GiB for smart storage drives, ",
                    "bytes/1024/1024 for simple storage devices"
                )
                .to_string(),
                DRIVE_LABELS,
            ),
        }
    }

    fn all(&self) -> Vec<Arc<MetricDesc>> {
        [
            &self.state,
            &self.health_status,
            &self.power_state,
            &self.processor_summary_state,
            &self.processor_summary_health_status,
            &self.processor_summary_count,
            &self.memory_summary_state,
            &self.memory_summary_health_status,
            &self.memory_summary_size,
            &self.battery_health_status,
            &self.processor_state,
            &self.processor_health_status,
            &self.processor_total_threads,
            &self.processor_total_cores,
            &self.storage_drive_state,
            &self.storage_drive_health_state,
            &self.storage_drive_capacity,
        ]
        .into_iter()
        .cloned()
        .collect()
    }
}

/// Label values shared by a system and its components.
#[derive(Debug, Clone)]
struct SystemIdentity {
    serial: String,
    manufacturer: String,
    system_id: String,
    model: String,
}

impl SystemIdentity {
    fn of(system: &ComputerSystem) -> Self {
        Self {
            serial: serial_label(&system.sku, &system.serial_number),
            manufacturer: system.manufacturer_token.clone(),
            system_id: system.id.clone(),
            model: system.model.clone(),
        }
    }

    fn labels(&self) -> Vec<String> {
        vec![
            self.serial.clone(),
            self.manufacturer.clone(),
            "system".to_string(),
            self.system_id.clone(),
            self.model.clone(),
        ]
    }

    fn component_labels(&self, resource: &str, id: &str, model: &str) -> Vec<String> {
        vec![
            self.serial.clone(),
            resource.to_string(),
            id.to_string(),
            model.to_string(),
        ]
    }
}

/// Status, summaries, processors and drives of every computer system.
pub struct SystemCollector {
    metrics: Arc<SystemMetrics>,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(SystemMetrics::new()),
        }
    }

    async fn collect_system(
        &self,
        api: &Arc<dyn RedfishApi>,
        sink: &SampleSink,
        system: ComputerSystem,
    ) {
        let identity = SystemIdentity::of(&system);
        tracing::debug!(system_id = %identity.system_id, "System scrape started");

        for sample in system_samples(&self.metrics, &identity, &system) {
            sink.send(sample);
        }

        let (processors, storage) = tokio::join!(
            self.processor_tasks(api, sink, &identity, &system),
            self.storage_tasks(api, sink, &identity, &system)
        );
        processors.join().await;
        storage.join().await;

        tracing::debug!(system_id = %identity.system_id, "System scrape completed");
    }

    /// One task per processor; each task fetches and maps its own document.
    async fn processor_tasks(
        &self,
        api: &Arc<dyn RedfishApi>,
        sink: &SampleSink,
        identity: &SystemIdentity,
        system: &ComputerSystem,
    ) -> FanOut {
        let mut fan_out = FanOut::new();
        let links = match system.processors.members(api.as_ref()).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(
                    system_id = %identity.system_id,
                    operation = "system.processors",
                    error = %e,
                    "Failed to get processor data"
                );
                return fan_out;
            }
        };
        if links.is_empty() {
            tracing::debug!(system_id = %identity.system_id, "No processor data found");
        }

        for link in links {
            let path = link.path().unwrap_or_default().to_string();
            let (api, sink) = (Arc::clone(api), sink.clone());
            let (metrics, identity) = (Arc::clone(&self.metrics), identity.clone());
            fan_out.spawn(format!("processor {path}"), async move {
                match link.follow(api.as_ref()).await {
                    Ok(Some(processor)) => processor_samples(&metrics, &identity, &processor)
                        .into_iter()
                        .for_each(|s| sink.send(s)),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(
                        system_id = %identity.system_id,
                        operation = "system.processor",
                        path = %path,
                        error = %e,
                        "Skipping processor"
                    ),
                }
            });
        }
        fan_out
    }

    /// Drive tasks for the storage path matching the manufacturer.
    async fn storage_tasks(
        &self,
        api: &Arc<dyn RedfishApi>,
        sink: &SampleSink,
        identity: &SystemIdentity,
        system: &ComputerSystem,
    ) -> FanOut {
        let mut fan_out = FanOut::new();
        match system.storage_route() {
            StorageRoute::SmartStorage(controllers) => {
                let controllers = match controllers.list(api.as_ref()).await {
                    Ok(members) => members,
                    Err(e) => {
                        tracing::warn!(
                            system_id = %identity.system_id,
                            operation = "system.smart_storage",
                            error = %e,
                            "Failed to get storage data"
                        );
                        return fan_out;
                    }
                };
                for (path, e) in &controllers.failures {
                    tracing::warn!(
                        system_id = %identity.system_id,
                        operation = "system.smart_storage.controller",
                        path = %path,
                        error = %e,
                        "Skipping array controller"
                    );
                }

                for controller in controllers.resources {
                    let drives = match controller
                        .links
                        .physical_drives
                        .members(api.as_ref())
                        .await
                    {
                        Ok(drives) => drives,
                        Err(e) => {
                            tracing::warn!(
                                system_id = %identity.system_id,
                                operation = "system.smart_storage.drives",
                                controller = %controller.id,
                                error = %e,
                                "Failed to get drive data"
                            );
                            continue;
                        }
                    };
                    for link in drives {
                        let path = link.path().unwrap_or_default().to_string();
                        let (api, sink) = (Arc::clone(api), sink.clone());
                        let (metrics, identity) = (Arc::clone(&self.metrics), identity.clone());
                        fan_out.spawn(format!("drive {path}"), async move {
                            match link.follow(api.as_ref()).await {
                                Ok(Some(drive)) => smart_drive_samples(&metrics, &identity, &drive)
                                    .into_iter()
                                    .for_each(|s| sink.send(s)),
                                Ok(None) => {}
                                Err(e) => tracing::warn!(
                                    system_id = %identity.system_id,
                                    operation = "system.smart_storage.drive",
                                    path = %path,
                                    error = %e,
                                    "Skipping drive"
                                ),
                            }
                        });
                    }
                }
            }
            StorageRoute::SimpleStorage(storages) => {
                let storages = match storages.list(api.as_ref()).await {
                    Ok(members) => members,
                    Err(e) => {
                        tracing::warn!(
                            system_id = %identity.system_id,
                            operation = "system.simple_storage",
                            error = %e,
                            "Failed to get storage data"
                        );
                        return fan_out;
                    }
                };
                for (path, e) in &storages.failures {
                    tracing::warn!(
                        system_id = %identity.system_id,
                        operation = "system.simple_storage.controller",
                        path = %path,
                        error = %e,
                        "Skipping storage controller"
                    );
                }

                for storage in storages.resources {
                    for (index, entry) in storage.devices.into_iter().enumerate() {
                        let sink = sink.clone();
                        let (metrics, identity) = (Arc::clone(&self.metrics), identity.clone());
                        let storage_id = storage.id.clone();
                        fan_out.spawn(format!("device {storage_id}/{index}"), async move {
                            match entry.decode() {
                                Ok(device) => simple_device_samples(&metrics, &identity, &device)
                                    .into_iter()
                                    .for_each(|s| sink.send(s)),
                                Err(e) => tracing::warn!(
                                    system_id = %identity.system_id,
                                    operation = "system.simple_storage.device",
                                    storage = %storage_id,
                                    index,
                                    error = %e,
                                    "Skipping malformed device"
                                ),
                            }
                        });
                    }
                }
            }
            StorageRoute::Unsupported => tracing::debug!(
                system_id = %identity.system_id,
                manufacturer = %identity.manufacturer,
                "No storage metrics for this manufacturer"
            ),
        }
        fan_out
    }
}

#[async_trait::async_trait]
impl Collector for SystemCollector {
    fn name(&self) -> &'static str {
        SUBSYSTEM
    }

    fn describe(&self) -> Vec<Arc<MetricDesc>> {
        self.metrics.all()
    }

    async fn collect(
        &self,
        api: Arc<dyn RedfishApi>,
        sink: SampleSink,
    ) -> Result<(), RedfishError> {
        let members = match api.service_root().systems.members(api.as_ref()).await {
            Ok(members) => members,
            Err(e) => {
                tracing::error!(
                    collector = SUBSYSTEM,
                    operation = "service.systems",
                    error = %e,
                    "Failed to get systems from service"
                );
                return Err(e);
            }
        };

        for link in members {
            match link.follow(api.as_ref()).await {
                Ok(Some(system)) => self.collect_system(&api, &sink, system).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    collector = SUBSYSTEM,
                    operation = "system.get",
                    path = link.path().unwrap_or_default(),
                    error = %e,
                    "Skipping system"
                ),
            }
        }
        Ok(())
    }
}

fn system_samples(m: &SystemMetrics, id: &SystemIdentity, system: &ComputerSystem) -> Vec<Sample> {
    let labels = id.labels();
    let processors = &system.processor_summary;
    let memory = &system.memory_summary;
    let mut samples = Vec::new();

    push_mapped(&mut samples, &m.state, map_state(&system.status.state), &labels);
    push_mapped(&mut samples, &m.health_status, map_health(&system.status.health), &labels);
    push_mapped(&mut samples, &m.power_state, map_power_state(&system.power_state), &labels);

    push_mapped(
        &mut samples,
        &m.processor_summary_state,
        map_state(&processors.status.state),
        &labels,
    );
    push_mapped(
        &mut samples,
        &m.processor_summary_health_status,
        map_health(&processors.status.health),
        &labels,
    );
    push_mapped(&mut samples, &m.processor_summary_count, processors.count.map(f64::from), &labels);

    push_mapped(&mut samples, &m.memory_summary_state, map_state(&memory.status.state), &labels);
    push_mapped(
        &mut samples,
        &m.memory_summary_health_status,
        map_health(&memory.status.health),
        &labels,
    );
    push_mapped(&mut samples, &m.memory_summary_size, memory.total_system_memory_gib, &labels);

    push_mapped(
        &mut samples,
        &m.battery_health_status,
        system.battery_health().and_then(map_battery_condition),
        &labels,
    );
    samples
}

/// Smart storage batteries report `Ok` rather than `OK`.
fn map_battery_condition(condition: &str) -> Option<f64> {
    if condition.eq_ignore_ascii_case("ok") {
        map_health("OK")
    } else {
        map_health(condition)
    }
}

fn processor_samples(m: &SystemMetrics, id: &SystemIdentity, processor: &Processor) -> Vec<Sample> {
    let labels = id.component_labels("processor", &processor.id, &processor.model);
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.processor_state, map_state(&processor.status.state), &labels);
    push_mapped(
        &mut samples,
        &m.processor_health_status,
        map_health(&processor.status.health),
        &labels,
    );
    push_mapped(
        &mut samples,
        &m.processor_total_threads,
        processor.total_threads.map(f64::from),
        &labels,
    );
    push_mapped(
        &mut samples,
        &m.processor_total_cores,
        processor.total_cores.map(f64::from),
        &labels,
    );
    samples
}

fn smart_drive_samples(m: &SystemMetrics, id: &SystemIdentity, drive: &Drive) -> Vec<Sample> {
    let labels = id.component_labels("drive", &drive.location, &drive.model);
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.storage_drive_state, map_state(&drive.status.state), &labels);
    push_mapped(
        &mut samples,
        &m.storage_drive_health_state,
        map_health(&drive.status.health),
        &labels,
    );
    push_mapped(&mut samples, &m.storage_drive_capacity, drive.capacity_gb, &labels);
    samples
}

fn simple_device_samples(m: &SystemMetrics, id: &SystemIdentity, device: &Device) -> Vec<Sample> {
    let labels = id.component_labels("drive", &device.name, &device.model);
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.storage_drive_state, map_state(&device.status.state), &labels);
    push_mapped(
        &mut samples,
        &m.storage_drive_health_state,
        map_health(&device.status.health),
        &labels,
    );
    push_mapped(
        &mut samples,
        &m.storage_drive_capacity,
        device.capacity_scaled().map(|c| c as f64),
        &labels,
    );
    samples
}
