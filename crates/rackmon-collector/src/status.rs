//! Redfish enumerations mapped onto the numeric gauge scale.
//!
//! Every function returns `None` for strings outside its vocabulary and the
//! caller skips the sample. Code `0` is never produced.

/// `Status.Health`: OK, Warning, Critical.
pub const HEALTH_VALUES: [&str; 3] = ["OK", "Warning", "Critical"];

/// `Status.State`, in gauge order starting at 1.
pub const STATE_VALUES: [&str; 11] = [
    "Enabled",
    "Disabled",
    "StandbyOffline",
    "StandbySpare",
    "InTest",
    "Starting",
    "Absent",
    "UnavailableOffline",
    "Deferring",
    "Quiesced",
    "Updating",
];

/// `PowerState` of a computer system.
pub const POWER_STATE_VALUES: [&str; 4] = ["On", "Off", "PoweringOn", "PoweringOff"];

fn position(vocabulary: &[&str], value: &str) -> Option<f64> {
    vocabulary
        .iter()
        .position(|candidate| *candidate == value)
        .map(|index| (index + 1) as f64)
}

/// # Examples
///
/// ```
/// use rackmon_collector::status::map_health;
///
/// assert_eq!(map_health("Critical"), Some(3.0));
/// assert_eq!(map_health("ok"), None);
/// ```
pub fn map_health(health: &str) -> Option<f64> {
    position(&HEALTH_VALUES, health)
}

pub fn map_state(state: &str) -> Option<f64> {
    position(&STATE_VALUES, state)
}

pub fn map_power_state(power_state: &str) -> Option<f64> {
    position(&POWER_STATE_VALUES, power_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_vocabulary() {
        assert_eq!(map_health("OK"), Some(1.0));
        assert_eq!(map_health("Warning"), Some(2.0));
        assert_eq!(map_health("Critical"), Some(3.0));
        for miss in ["", "Ok", "Failed", " OK"] {
            assert_eq!(map_health(miss), None, "{miss:?}");
        }
    }

    #[test]
    fn state_vocabulary_is_ordered_from_one() {
        for (index, state) in STATE_VALUES.iter().enumerate() {
            assert_eq!(map_state(state), Some((index + 1) as f64));
        }
        assert_eq!(map_state("Updating"), Some(11.0));
        assert_eq!(map_state(""), None);
        assert_eq!(map_state("StandbyOffinline"), None);
    }

    #[test]
    fn power_state_vocabulary() {
        assert_eq!(map_power_state("On"), Some(1.0));
        assert_eq!(map_power_state("Off"), Some(2.0));
        assert_eq!(map_power_state("PoweringOn"), Some(3.0));
        assert_eq!(map_power_state("PoweringOff"), Some(4.0));
        assert_eq!(map_power_state(""), None);
        assert_eq!(map_power_state("Reset"), None);
    }

    #[test]
    fn mapping_never_yields_zero_and_is_stable() {
        let inputs = ["OK", "Enabled", "On", "", "bogus", "Quiesced", "PoweringOff"];
        for input in inputs.iter().chain(inputs.iter().rev()) {
            for map in [map_health, map_state, map_power_state] {
                let first = map(input);
                assert_ne!(first, Some(0.0));
                assert_eq!(first, map(input));
            }
        }
    }
}
