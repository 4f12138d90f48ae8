//! Generic tier: patterns for metrics no table enumerates.
//!
//! Dotted-prefix patterns are tried first (longest wins), then the trailing
//! path token is compared against the keyword patterns.

use super::prefix::is_dotted_prefix;
use super::MetricDefinition as M;
use super::{DeviceClass, Unit};
use crate::category::Category::*;

pub static PREFIX_PATTERNS: &[M] = &[
    M::binary("v.d", "Door", Door).class(DeviceClass::Door),
    M::vector("v.b.c", "Cell Values", Battery).measurement(),
    M::vector("v.t", "Tire Values", Tire),
    M::text("m.net.mdm", "Modem", Network),
    M::binary("xmg.v.bms.mainrelay", "Main Relay", MgZsEv).class(DeviceClass::PowerState),
];

pub static KEYWORD_PATTERNS: &[M] = &[
    M::sensor("soc", "State of Charge", Battery)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("range", "Range", Battery)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("temp", "Temperature", System)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("voltage", "Voltage", Power)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("current", "Current", Power)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("power", "Power", Power)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("energy", "Energy", Power)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("speed", "Speed", Trip)
        .unit(Unit::KilometerPerHour)
        .class(DeviceClass::Speed)
        .measurement(),
    M::sensor("odometer", "Odometer", Trip)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .total_increasing(),
    M::sensor("pressure", "Pressure", Tire)
        .unit(Unit::Kilopascal)
        .class(DeviceClass::Pressure)
        .measurement(),
    M::sensor("signal", "Signal", Network)
        .unit(Unit::Dbm)
        .class(DeviceClass::SignalStrength)
        .measurement(),
    M::binary("door", "Door", Door).class(DeviceClass::Door),
    M::binary("trunk", "Trunk", Door).class(DeviceClass::Door),
    M::binary("hood", "Hood", Door).class(DeviceClass::Door),
    M::binary("lock", "Lock", Door).class(DeviceClass::Lock),
    M::binary("locked", "Locked", Door).class(DeviceClass::Lock),
    M::binary("charging", "Charging", Charging).class(DeviceClass::BatteryCharging),
    M::binary("timer", "Timer", Charging).class(DeviceClass::Running),
    M::binary("alert", "Alert", Diagnostic).class(DeviceClass::Problem),
    M::text("version", "Version", System),
    M::text("status", "Status", Diagnostic),
    M::switch("switch", "Switch", System),
    M::switch("toggle", "Toggle", System),
    M::switch("enable", "Enable", System),
    M::switch("enabled", "Enabled", System),
];

/// Best generic match: longest dotted prefix, else trailing keyword.
pub fn match_pattern(metric_path: &str) -> Option<&'static M> {
    let by_prefix = PREFIX_PATTERNS
        .iter()
        .filter(|p| is_dotted_prefix(p.key, metric_path))
        .max_by_key(|p| p.key.len());
    if by_prefix.is_some() {
        return by_prefix;
    }

    let token = metric_path.rsplit('.').next()?;
    KEYWORD_PATTERNS.iter().find(|p| p.key == token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::EntityType;

    #[test]
    fn test_prefix_before_keyword() {
        let def = match_pattern("v.d.sunroof").unwrap();
        assert_eq!(def.key, "v.d");
        assert_eq!(def.entity_type, EntityType::BinarySensor);

        // `v.t` is a prefix pattern even though `pressure` is a keyword
        let def = match_pattern("v.t.pressure.front").unwrap();
        assert_eq!(def.key, "v.t");
    }

    #[test]
    fn test_longest_prefix() {
        let def = match_pattern("xmg.v.bms.mainrelay.x").unwrap();
        assert_eq!(def.key, "xmg.v.bms.mainrelay");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(match_pattern("xvu.b.soc").unwrap().device_class, Some(DeviceClass::Battery));
        assert_eq!(match_pattern("v.x.trunk").unwrap().entity_type, EntityType::BinarySensor);
        assert_eq!(match_pattern("xsq.heater.enable").unwrap().entity_type, EntityType::Switch);
        assert!(match_pattern("v.x.nothing").is_none());
        // whole token only
        assert!(match_pattern("v.x.temperature").is_none());
    }
}
