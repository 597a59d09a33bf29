use crate::fanout::FanOut;
use crate::metric::{fq_name, push_mapped, MetricDesc, Sample};
use crate::sink::SampleSink;
use crate::status::{map_health, map_state};
use crate::{serial_label, Collector};
use rackmon_redfish::resource::chassis::{Chassis, Fan, PowerSupply, Temperature};
use rackmon_redfish::{manufacturer_token, RedfishApi, RedfishError};
use std::sync::Arc;

const SUBSYSTEM: &str = "chassis";

const CHASSIS_LABELS: &[&str] = &["sn", "mfr", "resource", "chassis_id"];
const TEMPERATURE_LABELS: &[&str] = &["sn", "mfr", "resource", "chassis_id", "sensor", "sensor_id"];
const FAN_LABELS: &[&str] = &["sn", "mfr", "resource", "chassis_id", "fan", "fan_id"];
const POWER_SUPPLY_LABELS: &[&str] = &[
    "sn",
    "mfr",
    "resource",
    "chassis_id",
    "power_supply",
    "power_supply_id",
];

const HEALTH_HELP: &str = "1(OK),2(Warning),3(Critical)";
const STATE_HELP: &str = concat!(
    "1(Enabled),2(Disabled),3(StandbyOffline),4(StandbySpare),5(InTest),6(Starting),",
    "7(Absent),8(UnavailableOffline),9(Deferring),10(Quiesced),11(Updating)"
);

struct ChassisMetrics {
    health: Arc<MetricDesc>,
    state: Arc<MetricDesc>,
    temperature_sensor_state: Arc<MetricDesc>,
    temperature_celsius: Arc<MetricDesc>,
    fan_health: Arc<MetricDesc>,
    fan_state: Arc<MetricDesc>,
    fan_rpm_percentage: Arc<MetricDesc>,
    power_supply_state: Arc<MetricDesc>,
    power_supply_health: Arc<MetricDesc>,
    power_supply_last_output_watts: Arc<MetricDesc>,
    power_supply_capacity_watts: Arc<MetricDesc>,
}

impl ChassisMetrics {
    fn new() -> Self {
        let desc = |name: &str, help: String, labels: &[&'static str]| {
            MetricDesc::new(fq_name(SUBSYSTEM, name), &help, labels)
        };
        Self {
            health: desc("health", format!("health of chassis, {HEALTH_HELP}"), CHASSIS_LABELS),
            state: desc("state", format!("state of chassis, {STATE_HELP}"), CHASSIS_LABELS),
            temperature_sensor_state: desc(
                "temperature_sensor_state",
                format!("status state of temperature on this chassis component, {STATE_HELP}"),
                TEMPERATURE_LABELS,
            ),
            temperature_celsius: desc(
                "temperature_celsius",
                "celsius of temperature on this chassis component".to_string(),
                TEMPERATURE_LABELS,
            ),
            fan_health: desc(
                "fan_health",
                format!("fan health on this chassis component, {HEALTH_HELP}"),
                FAN_LABELS,
            ),
            fan_state: desc(
                "fan_state",
                format!("fan state on this chassis component, {STATE_HELP}"),
                FAN_LABELS,
            ),
            fan_rpm_percentage: desc(
                "fan_rpm_percentage",
                "fan rpm percentage on this chassis component".to_string(),
                FAN_LABELS,
            ),
            power_supply_state: desc(
                "power_powersupply_state",
                format!("powersupply state of chassis component, {STATE_HELP}"),
                POWER_SUPPLY_LABELS,
            ),
            power_supply_health: desc(
                "power_powersupply_health_status",
                format!("powersupply health of chassis component, {HEALTH_HELP}"),
                POWER_SUPPLY_LABELS,
            ),
            power_supply_last_output_watts: desc(
                "power_powersupply_last_power_output_watts",
                "last_power_output_watts of powersupply on this chassis".to_string(),
                POWER_SUPPLY_LABELS,
            ),
            power_supply_capacity_watts: desc(
                "power_powersupply_power_capacity_watts",
                "power_capacity_watts of powersupply on this chassis".to_string(),
                POWER_SUPPLY_LABELS,
            ),
        }
    }

    fn all(&self) -> Vec<Arc<MetricDesc>> {
        [
            &self.health,
            &self.state,
            &self.temperature_sensor_state,
            &self.temperature_celsius,
            &self.fan_health,
            &self.fan_state,
            &self.fan_rpm_percentage,
            &self.power_supply_state,
            &self.power_supply_health,
            &self.power_supply_last_output_watts,
            &self.power_supply_capacity_watts,
        ]
        .into_iter()
        .cloned()
        .collect()
    }
}

/// Label values shared by a chassis and everything below it.
#[derive(Debug, Clone)]
struct ChassisIdentity {
    serial: String,
    manufacturer: String,
    chassis_id: String,
}

impl ChassisIdentity {
    fn of(chassis: &Chassis) -> Self {
        Self {
            serial: serial_label(&chassis.sku, &chassis.serial_number),
            manufacturer: manufacturer_token(&chassis.manufacturer).to_string(),
            chassis_id: chassis.id.clone(),
        }
    }

    fn labels(&self) -> Vec<String> {
        vec![
            self.serial.clone(),
            self.manufacturer.clone(),
            "chassis".to_string(),
            self.chassis_id.clone(),
        ]
    }

    fn component_labels(&self, resource: &str, name: &str, id: &str) -> Vec<String> {
        vec![
            self.serial.clone(),
            self.manufacturer.clone(),
            resource.to_string(),
            self.chassis_id.clone(),
            name.to_string(),
            id.to_string(),
        ]
    }
}

/// Health, state, temperatures, fans and power supplies of every chassis.
pub struct ChassisCollector {
    metrics: Arc<ChassisMetrics>,
}

impl Default for ChassisCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChassisCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(ChassisMetrics::new()),
        }
    }

    async fn collect_chassis(
        &self,
        api: &Arc<dyn RedfishApi>,
        sink: &SampleSink,
        chassis: Chassis,
    ) {
        let identity = ChassisIdentity::of(&chassis);
        tracing::debug!(chassis_id = %identity.chassis_id, "Chassis scrape started");

        for sample in chassis_samples(&self.metrics, &identity, &chassis) {
            sink.send(sample);
        }

        let (thermal, power) = tokio::join!(
            chassis.thermal.follow(api.as_ref()),
            chassis.power.follow(api.as_ref())
        );

        let mut fan_out = FanOut::new();
        match thermal {
            Ok(Some(thermal)) => {
                for (index, entry) in thermal.temperatures.into_iter().enumerate() {
                    let (metrics, identity, sink) =
                        (Arc::clone(&self.metrics), identity.clone(), sink.clone());
                    fan_out.spawn(format!("temperature {index}"), async move {
                        match entry.decode() {
                            Ok(temperature) => {
                                temperature_samples(&metrics, &identity, &temperature)
                                    .into_iter()
                                    .for_each(|s| sink.send(s))
                            }
                            Err(e) => tracing::warn!(
                                chassis_id = %identity.chassis_id,
                                operation = "chassis.thermal.temperature",
                                index,
                                error = %e,
                                "Skipping malformed temperature sensor"
                            ),
                        }
                    });
                }
                for (index, entry) in thermal.fans.into_iter().enumerate() {
                    let (metrics, identity, sink) =
                        (Arc::clone(&self.metrics), identity.clone(), sink.clone());
                    fan_out.spawn(format!("fan {index}"), async move {
                        match entry.decode() {
                            Ok(fan) => fan_samples(&metrics, &identity, &fan)
                                .into_iter()
                                .for_each(|s| sink.send(s)),
                            Err(e) => tracing::warn!(
                                chassis_id = %identity.chassis_id,
                                operation = "chassis.thermal.fan",
                                index,
                                error = %e,
                                "Skipping malformed fan"
                            ),
                        }
                    });
                }
            }
            Ok(None) => tracing::debug!(chassis_id = %identity.chassis_id, "No thermal data found"),
            Err(e) => tracing::warn!(
                chassis_id = %identity.chassis_id,
                operation = "chassis.thermal",
                error = %e,
                "Failed to get thermal data"
            ),
        }

        match power {
            Ok(Some(power)) => {
                for (index, entry) in power.power_supplies.into_iter().enumerate() {
                    let (metrics, identity, sink) =
                        (Arc::clone(&self.metrics), identity.clone(), sink.clone());
                    fan_out.spawn(format!("power supply {index}"), async move {
                        match entry.decode() {
                            Ok(psu) => power_supply_samples(&metrics, &identity, &psu)
                                .into_iter()
                                .for_each(|s| sink.send(s)),
                            Err(e) => tracing::warn!(
                                chassis_id = %identity.chassis_id,
                                operation = "chassis.power.power_supply",
                                index,
                                error = %e,
                                "Skipping malformed power supply"
                            ),
                        }
                    });
                }
            }
            Ok(None) => tracing::debug!(chassis_id = %identity.chassis_id, "No power data found"),
            Err(e) => tracing::warn!(
                chassis_id = %identity.chassis_id,
                operation = "chassis.power",
                error = %e,
                "Failed to get power data"
            ),
        }

        fan_out.join().await;
        tracing::debug!(chassis_id = %identity.chassis_id, "Chassis scrape completed");
    }
}

#[async_trait::async_trait]
impl Collector for ChassisCollector {
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
        let members = match api.service_root().chassis.members(api.as_ref()).await {
            Ok(members) => members,
            Err(e) => {
                tracing::error!(
                    collector = SUBSYSTEM,
                    operation = "service.chassis",
                    error = %e,
                    "Failed to get chassis from service"
                );
                return Err(e);
            }
        };

        for link in members {
            match link.follow(api.as_ref()).await {
                Ok(Some(chassis)) => self.collect_chassis(&api, &sink, chassis).await,
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    collector = SUBSYSTEM,
                    operation = "chassis.get",
                    path = link.path().unwrap_or_default(),
                    error = %e,
                    "Skipping chassis"
                ),
            }
        }
        Ok(())
    }
}

fn chassis_samples(m: &ChassisMetrics, id: &ChassisIdentity, chassis: &Chassis) -> Vec<Sample> {
    let labels = id.labels();
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.health, map_health(&chassis.status.health), &labels);
    push_mapped(&mut samples, &m.state, map_state(&chassis.status.state), &labels);
    samples
}

fn temperature_samples(
    m: &ChassisMetrics,
    id: &ChassisIdentity,
    sensor: &Temperature,
) -> Vec<Sample> {
    let labels = id.component_labels("temperature", &sensor.name, &sensor.member_id);
    let mut samples = Vec::new();
    push_mapped(
        &mut samples,
        &m.temperature_sensor_state,
        map_state(&sensor.status.state),
        &labels,
    );
    push_mapped(&mut samples, &m.temperature_celsius, sensor.reading_celsius, &labels);
    samples
}

fn fan_samples(m: &ChassisMetrics, id: &ChassisIdentity, fan: &Fan) -> Vec<Sample> {
    let labels = id.component_labels("fan", &fan.name, &fan.member_id);
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.fan_health, map_health(&fan.status.health), &labels);
    push_mapped(&mut samples, &m.fan_state, map_state(&fan.status.state), &labels);
    push_mapped(&mut samples, &m.fan_rpm_percentage, fan.reading, &labels);
    samples
}

fn power_supply_samples(
    m: &ChassisMetrics,
    id: &ChassisIdentity,
    psu: &PowerSupply,
) -> Vec<Sample> {
    let labels = id.component_labels("power_supply", &psu.name, psu.label_id());
    let mut samples = Vec::new();
    push_mapped(&mut samples, &m.power_supply_state, map_state(&psu.status.state), &labels);
    push_mapped(&mut samples, &m.power_supply_health, map_health(&psu.status.health), &labels);
    push_mapped(
        &mut samples,
        &m.power_supply_last_output_watts,
        psu.last_power_output_watts,
        &labels,
    );
    push_mapped(&mut samples, &m.power_supply_capacity_watts, psu.power_capacity_watts, &labels);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockApi;
    use crate::sink;
    use serde_json::json;

    async fn run(api: MockApi) -> (Result<(), RedfishError>, Vec<Sample>) {
        let (sink, stream) = sink::channel();
        let api: Arc<dyn RedfishApi> = Arc::new(api);
        let result = ChassisCollector::new().collect(api, sink).await;
        (result, stream.collect().await)
    }

    fn find<'a>(samples: &'a [Sample], name: &str) -> Vec<&'a Sample> {
        samples.iter().filter(|s| s.name() == name).collect()
    }

    fn one_chassis(api: MockApi, chassis: serde_json::Value) -> MockApi {
        api.with(
            "/redfish/v1/Chassis",
            json!({"Members": [{"@odata.id": "/redfish/v1/Chassis/1"}]}),
        )
        .with("/redfish/v1/Chassis/1", chassis)
    }

    #[tokio::test]
    async fn healthy_chassis_with_one_sensor_and_no_power() {
        let api = one_chassis(
            MockApi::standard(),
            json!({
                "Id": "1",
                "Manufacturer": "HPE",
                "SerialNumber": "CZJ1234",
                "Status": {"Health": "OK", "State": "Enabled"},
                "Thermal": {"@odata.id": "/redfish/v1/Chassis/1/Thermal"}
            }),
        )
        .with(
            "/redfish/v1/Chassis/1/Thermal",
            json!({"Temperatures": [{
                "MemberId": "0", "Name": "01-Inlet Ambient",
                "ReadingCelsius": 42, "Status": {"State": "Enabled"}
            }]}),
        );

        let (result, samples) = run(api).await;
        assert!(result.is_ok());

        let health = find(&samples, "rackserver_chassis_health");
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].value, 1.0);
        assert_eq!(health[0].label_values, vec!["CZJ1234", "HPE", "chassis", "1"]);
        assert_eq!(find(&samples, "rackserver_chassis_state")[0].value, 1.0);

        let sensor_state = find(&samples, "rackserver_chassis_temperature_sensor_state");
        assert_eq!(sensor_state.len(), 1);
        assert_eq!(sensor_state[0].value, 1.0);
        assert_eq!(sensor_state[0].label("resource"), Some("temperature"));
        assert_eq!(sensor_state[0].label("sensor"), Some("01-Inlet Ambient"));
        assert_eq!(find(&samples, "rackserver_chassis_temperature_celsius")[0].value, 42.0);

        assert!(samples.iter().all(|s| !s.name().contains("powersupply")));
        assert_eq!(samples.len(), 4);
    }

    #[tokio::test]
    async fn one_malformed_fan_does_not_spoil_the_rest() {
        let fans: Vec<_> = (0..5)
            .map(|i| {
                if i == 3 {
                    json!({"MemberId": "3", "Name": "Fan 3", "Reading": "spinning"})
                } else {
                    json!({
                        "MemberId": i.to_string(), "Name": format!("Fan {i}"),
                        "Reading": 30 + i, "Status": {"Health": "OK", "State": "Enabled"}
                    })
                }
            })
            .collect();
        let api = one_chassis(
            MockApi::standard(),
            json!({"Id": "1", "Thermal": {"@odata.id": "/redfish/v1/Chassis/1/Thermal"}}),
        )
        .with("/redfish/v1/Chassis/1/Thermal", json!({"Fans": fans}));

        let (result, samples) = run(api).await;
        assert!(result.is_ok());
        let rpm = find(&samples, "rackserver_chassis_fan_rpm_percentage");
        assert_eq!(rpm.len(), 4);
        assert!(rpm.iter().all(|s| s.label("fan_id") != Some("3")));
        assert_eq!(find(&samples, "rackserver_chassis_fan_health").len(), 4);
    }

    #[tokio::test]
    async fn power_supply_without_member_id_uses_serial() {
        let api = one_chassis(
            MockApi::standard(),
            json!({"Id": "System.Embedded.1", "SKU": "7XQ1", "Manufacturer": "Dell Inc.",
                   "Power": {"@odata.id": "/redfish/v1/Chassis/1/Power"}}),
        )
        .with(
            "/redfish/v1/Chassis/1/Power",
            json!({"PowerSupplies": [{
                "Name": "PS1 Status", "SerialNumber": "CNLOD0075324D7",
                "PowerCapacityWatts": 750, "LastPowerOutputWatts": 128,
                "Status": {"Health": "Warning", "State": "Enabled"}
            }]}),
        );

        let (_, samples) = run(api).await;
        let health = find(&samples, "rackserver_chassis_power_powersupply_health_status");
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].value, 2.0);
        assert_eq!(
            health[0].label_values,
            vec![
                "7XQ1",
                "Dell",
                "power_supply",
                "System.Embedded.1",
                "PS1 Status",
                "CNLOD0075324D7",
            ]
        );
        assert_eq!(
            find(&samples, "rackserver_chassis_power_powersupply_power_capacity_watts")[0].value,
            750.0
        );
    }

    #[tokio::test]
    async fn failing_thermal_keeps_power_and_identity() {
        let api = one_chassis(
            MockApi::standard(),
            json!({"Id": "1", "Status": {"Health": "Critical"},
                   "Thermal": {"@odata.id": "/redfish/v1/Chassis/1/Thermal"},
                   "Power": {"@odata.id": "/redfish/v1/Chassis/1/Power"}}),
        )
        .failing("/redfish/v1/Chassis/1/Thermal", 500)
        .with(
            "/redfish/v1/Chassis/1/Power",
            json!({"PowerSupplies": [{"MemberId": "0", "LastPowerOutputWatts": 90}]}),
        );

        let (result, samples) = run(api).await;
        assert!(result.is_ok());
        assert_eq!(find(&samples, "rackserver_chassis_health")[0].value, 3.0);
        assert!(find(&samples, "rackserver_chassis_state").is_empty());
        assert_eq!(
            find(&samples, "rackserver_chassis_power_powersupply_last_power_output_watts").len(),
            1
        );
    }

    #[tokio::test]
    async fn enumeration_failure_is_reported() {
        let api = MockApi::standard().failing("/redfish/v1/Chassis", 503);
        let (result, samples) = run(api).await;
        assert!(result.unwrap_err().is_transport());
        assert!(samples.is_empty());
    }

    #[test]
    fn describe_lists_every_descriptor_once() {
        let descs = ChassisCollector::new().describe();
        assert_eq!(descs.len(), 11);
        let mut names: Vec<_> = descs.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"rackserver_chassis_fan_rpm_percentage".to_string()));
    }
}
