//! Category tier: standard OVMS metrics shared by all vehicles.
//!
//! Adding a metric is a data change only. Keys must be unique across every
//! table in [`TABLES`].

use super::MetricDefinition as M;
use super::{DeviceClass, Unit};
use crate::category::Category::{self, *};

pub static TABLES: &[&[M]] = &[
    BATTERY, CHARGING, CLIMATE, DOOR, LOCATION, TRIP, MOTOR, POWER, NETWORK, SYSTEM, TIRE,
    DIAGNOSTIC, DEVICE,
];

/// Tables grouped by category, for tests and tooling.
pub fn table_for(category: Category) -> &'static [M] {
    match category {
        Battery => BATTERY,
        Charging => CHARGING,
        Climate => CLIMATE,
        Door => DOOR,
        Location => LOCATION,
        Trip => TRIP,
        Motor => MOTOR,
        Power => POWER,
        Network => NETWORK,
        System => SYSTEM,
        Tire => TIRE,
        Diagnostic => DIAGNOSTIC,
        Device => DEVICE,
        _ => &[],
    }
}

pub static BATTERY: &[M] = &[
    M::sensor("v.b.soc", "State of Charge", Battery)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement()
        .icon("mdi:battery"),
    M::sensor("v.b.soh", "State of Health", Battery)
        .unit(Unit::Percent)
        .measurement()
        .icon("mdi:battery-heart-variant"),
    M::sensor("v.b.cac", "Calculated Capacity", Battery)
        .unit(Unit::AmpereHour)
        .measurement(),
    M::text("v.b.health", "Health Status", Battery),
    M::sensor("v.b.range.est", "Estimated Range", Battery)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement()
        .icon("mdi:map-marker-distance"),
    M::sensor("v.b.range.ideal", "Ideal Range", Battery)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("v.b.range.full", "Full Range", Battery)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("v.b.voltage", "Pack Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.b.current", "Pack Current", Battery)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.b.power", "Pack Power", Battery)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("v.b.temp", "Pack Temperature", Battery)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.b.consumption", "Consumption", Battery)
        .unit(Unit::WattHourPerKilometer)
        .measurement(),
    M::sensor("v.b.coulomb.used", "Charge Used", Battery)
        .unit(Unit::AmpereHour)
        .total_increasing(),
    M::sensor("v.b.coulomb.recd", "Charge Recovered", Battery)
        .unit(Unit::AmpereHour)
        .total_increasing(),
    M::sensor("v.b.energy.used", "Energy Used", Battery)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.b.energy.recd", "Energy Recovered", Battery)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.b.12v.voltage", "12V Battery Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement()
        .icon("mdi:car-battery"),
    M::sensor("v.b.12v.current", "12V Battery Current", Battery)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.b.12v.voltage.ref", "12V Reference Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::vector("v.b.c.voltage", "Cell Voltages", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::vector("v.b.c.temp", "Cell Temperatures", Battery)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.b.p.voltage.min", "Lowest Cell Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.b.p.voltage.max", "Highest Cell Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.b.p.voltage.avg", "Average Cell Voltage", Battery)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.b.p.temp.min", "Lowest Cell Temperature", Battery)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.b.p.temp.max", "Highest Cell Temperature", Battery)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
];

pub static CHARGING: &[M] = &[
    M::binary("v.c.charging", "Charging", Charging)
        .class(DeviceClass::BatteryCharging)
        .icon("mdi:ev-station"),
    M::binary("v.c.pilot", "Pilot Signal", Charging).class(DeviceClass::Connectivity),
    M::sensor("v.c.voltage", "Charge Voltage", Charging)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.c.current", "Charge Current", Charging)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.c.climit", "Charge Current Limit", Charging)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.c.power", "Charge Power", Charging)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("v.c.efficiency", "Charge Efficiency", Charging)
        .unit(Unit::Percent)
        .class(DeviceClass::PowerFactor)
        .measurement(),
    M::sensor("v.c.kwh", "Energy Charged", Charging)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.c.kwh.grid", "Grid Energy", Charging)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.c.temp", "Charger Temperature", Charging)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::text("v.c.mode", "Charge Mode", Charging),
    M::text("v.c.state", "Charge State", Charging).icon("mdi:ev-plug-type2"),
    M::text("v.c.substate", "Charge Substate", Charging),
    M::text("v.c.type", "Connector Type", Charging),
    M::sensor("v.c.limit.soc", "SOC Limit", Charging)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("v.c.limit.range", "Range Limit", Charging)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("v.c.duration.full", "Time to Full", Charging)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement()
        .icon("mdi:timer-outline"),
    M::sensor("v.c.duration.range", "Time to Range Limit", Charging)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.c.duration.soc", "Time to SOC Limit", Charging)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.c.time", "Charge Time", Charging)
        .unit(Unit::Second)
        .class(DeviceClass::Duration)
        .measurement(),
    M::binary("v.c.timermode", "Charge Timer", Charging).class(DeviceClass::Running),
    M::sensor("v.c.timerstart", "Charge Timer Start", Charging).class(DeviceClass::Timestamp),
    M::sensor("v.c.timestamp", "Charge Start", Charging).class(DeviceClass::Timestamp),
];

pub static CLIMATE: &[M] = &[
    M::sensor("v.e.cabintemp", "Cabin Temperature", Climate)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement()
        .icon("mdi:thermometer"),
    M::sensor("v.e.cabinsetpoint", "Cabin Setpoint", Climate)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.e.cabinfan", "Cabin Fan", Climate)
        .unit(Unit::Percent)
        .measurement()
        .icon("mdi:fan"),
    M::text("v.e.cabinintake", "Cabin Intake", Climate),
    M::text("v.e.cabinvent", "Cabin Vent", Climate),
    M::binary("v.e.cooling", "Cooling", Climate).class(DeviceClass::Cold),
    M::binary("v.e.heating", "Heating", Climate).class(DeviceClass::Heat),
    M::binary("v.e.hvac", "HVAC", Climate)
        .class(DeviceClass::Running)
        .icon("mdi:air-conditioner"),
    M::sensor("v.e.temp", "Ambient Temperature", Climate)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
];

pub static DOOR: &[M] = &[
    M::binary("v.d.cp", "Charge Port", Door)
        .class(DeviceClass::Door)
        .icon("mdi:ev-plug-type2"),
    M::binary("v.d.fl", "Front Left Door", Door).class(DeviceClass::Door),
    M::binary("v.d.fr", "Front Right Door", Door).class(DeviceClass::Door),
    M::binary("v.d.rl", "Rear Left Door", Door).class(DeviceClass::Door),
    M::binary("v.d.rr", "Rear Right Door", Door).class(DeviceClass::Door),
    M::binary("v.d.hood", "Hood", Door).class(DeviceClass::Door),
    M::binary("v.d.trunk", "Trunk", Door)
        .class(DeviceClass::Door)
        .icon("mdi:car-back"),
    M::binary("v.e.locked", "Locked", Door)
        .class(DeviceClass::Lock)
        .icon("mdi:car-key"),
];

pub static LOCATION: &[M] = &[
    M::sensor("v.p.latitude", "Latitude", Location)
        .unit(Unit::Degree)
        .measurement()
        .icon("mdi:latitude"),
    M::sensor("v.p.longitude", "Longitude", Location)
        .unit(Unit::Degree)
        .measurement()
        .icon("mdi:longitude"),
    M::sensor("v.p.altitude", "Altitude", Location)
        .unit(Unit::Meter)
        .class(DeviceClass::Distance)
        .measurement()
        .icon("mdi:altimeter"),
    M::sensor("v.p.direction", "Direction", Location)
        .unit(Unit::Degree)
        .measurement()
        .icon("mdi:compass"),
    M::sensor("v.p.gpshdop", "GPS HDOP", Location).measurement(),
    M::binary("v.p.gpslock", "GPS Lock", Location).class(DeviceClass::Connectivity),
    M::text("v.p.gpsmode", "GPS Mode", Location),
    M::sensor("v.p.gpssq", "GPS Signal Quality", Location)
        .unit(Unit::Percent)
        .measurement()
        .icon("mdi:signal"),
    M::sensor("v.p.gpsspeed", "GPS Speed", Location)
        .unit(Unit::KilometerPerHour)
        .class(DeviceClass::Speed)
        .measurement(),
    M::sensor("v.p.gpstime", "GPS Time", Location).class(DeviceClass::Timestamp),
    M::sensor("v.p.satcount", "Satellite Count", Location)
        .measurement()
        .icon("mdi:satellite-variant"),
    M::text("v.p.location", "Location Name", Location).icon("mdi:map-marker"),
    M::sensor("v.p.valet.latitude", "Valet Latitude", Location)
        .unit(Unit::Degree)
        .measurement(),
    M::sensor("v.p.valet.longitude", "Valet Longitude", Location)
        .unit(Unit::Degree)
        .measurement(),
];

pub static TRIP: &[M] = &[
    M::sensor("v.p.speed", "Speed", Trip)
        .unit(Unit::KilometerPerHour)
        .class(DeviceClass::Speed)
        .measurement()
        .icon("mdi:speedometer"),
    M::sensor("v.p.acceleration", "Acceleration", Trip)
        .unit(Unit::MeterPerSecondSquared)
        .measurement(),
    M::sensor("v.p.deceleration", "Deceleration", Trip)
        .unit(Unit::MeterPerSecondSquared)
        .measurement(),
    M::sensor("v.p.odometer", "Odometer", Trip)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .total_increasing()
        .icon("mdi:counter"),
    M::sensor("v.p.trip", "Trip Meter", Trip)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .total_increasing(),
    M::sensor("v.p.valet.distance", "Valet Distance", Trip)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .total_increasing(),
    M::sensor("v.e.drivetime", "Drive Time", Trip)
        .unit(Unit::Second)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.e.parktime", "Park Time", Trip)
        .unit(Unit::Second)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.e.throttle", "Throttle", Trip)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("v.e.footbrake", "Foot Brake", Trip)
        .unit(Unit::Percent)
        .measurement(),
];

pub static MOTOR: &[M] = &[
    M::sensor("v.i.temp", "Inverter Temperature", Motor)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.i.power", "Inverter Power", Motor)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("v.i.efficiency", "Inverter Efficiency", Motor)
        .unit(Unit::Percent)
        .class(DeviceClass::PowerFactor)
        .measurement(),
    M::sensor("v.m.rpm", "Motor Speed", Motor)
        .unit(Unit::Rpm)
        .measurement()
        .icon("mdi:engine"),
    M::sensor("v.m.temp", "Motor Temperature", Motor)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::binary("v.e.regenbrake", "Regenerative Braking", Motor).class(DeviceClass::Running),
];

pub static POWER: &[M] = &[
    M::sensor("v.c.12v.current", "DC-DC Current", Power)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.c.12v.power", "DC-DC Power", Power)
        .unit(Unit::Watt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("v.c.12v.temp", "DC-DC Temperature", Power)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.c.12v.voltage", "DC-DC Voltage", Power)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::binary("v.g.generating", "Generating", Power).class(DeviceClass::PowerState),
    M::sensor("v.g.climit", "Generator Current Limit", Power)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.g.current", "Generator Current", Power)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
    M::sensor("v.g.voltage", "Generator Voltage", Power)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("v.g.power", "Generator Power", Power)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("v.g.efficiency", "Generator Efficiency", Power)
        .unit(Unit::Percent)
        .class(DeviceClass::PowerFactor)
        .measurement(),
    M::sensor("v.g.temp", "Generator Temperature", Power)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::sensor("v.g.kwh", "Energy Delivered", Power)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.g.kwh.grid", "Energy to Grid", Power)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.g.kwh.grid.total", "Total Energy to Grid", Power)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
    M::sensor("v.g.duration.empty", "Time to Empty", Power)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.g.duration.range", "Time to Range Limit", Power)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.g.duration.soc", "Time to SOC Limit", Power)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.g.time", "Generating Time", Power)
        .unit(Unit::Second)
        .class(DeviceClass::Duration)
        .measurement(),
    M::sensor("v.g.limit.range", "Range Limit", Power)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("v.g.limit.soc", "SOC Limit", Power)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::text("v.g.mode", "Generator Mode", Power),
    M::text("v.g.state", "Generator State", Power),
    M::text("v.g.substate", "Generator Substate", Power),
    M::text("v.g.type", "Generator Connector", Power),
    M::binary("v.g.pilot", "Generator Pilot", Power).class(DeviceClass::Connectivity),
    M::binary("v.g.timermode", "Generator Timer", Power).class(DeviceClass::Running),
    M::sensor("v.g.timerstart", "Generator Timer Start", Power).class(DeviceClass::Timestamp),
    M::sensor("v.g.timestamp", "Generator Start", Power).class(DeviceClass::Timestamp),
];

pub static NETWORK: &[M] = &[
    M::text("m.net.provider", "Network Provider", Network).icon("mdi:access-point-network"),
    M::text("m.net.type", "Network Type", Network),
    M::sensor("m.net.sq", "Signal Strength", Network)
        .unit(Unit::Dbm)
        .class(DeviceClass::SignalStrength)
        .measurement()
        .icon("mdi:signal"),
    M::sensor("m.net.mdm.sq", "Modem Signal Strength", Network)
        .unit(Unit::Dbm)
        .class(DeviceClass::SignalStrength)
        .measurement(),
    M::sensor("m.net.wifi.sq", "WiFi Signal Strength", Network)
        .unit(Unit::Dbm)
        .class(DeviceClass::SignalStrength)
        .measurement()
        .icon("mdi:wifi"),
    M::text("m.net.wifi.network", "WiFi Network", Network),
    M::text("m.net.mdm.iccid", "SIM ICCID", Network),
    M::text("m.net.mdm.model", "Modem Model", Network),
    M::text("m.net.mdm.network", "Modem Network", Network),
    M::text("m.net.mdm.mode", "Modem Mode", Network),
    M::text("m.net.mdm.netreg", "Network Registration", Network),
];

pub static SYSTEM: &[M] = &[
    M::sensor("m.freeram", "Free RAM", System)
        .unit(Unit::Byte)
        .class(DeviceClass::DataSize)
        .measurement()
        .icon("mdi:memory"),
    M::text("m.hardware", "Hardware", System),
    M::text("m.serial", "Serial Number", System),
    M::text("m.version", "Firmware Version", System).icon("mdi:information-outline"),
    M::sensor("m.monotonic", "Uptime", System)
        .unit(Unit::Second)
        .class(DeviceClass::Duration)
        .total_increasing()
        .icon("mdi:timer-outline"),
    M::binary("m.obdc2ecu.on", "OBD2ECU", System).class(DeviceClass::PowerState),
    M::sensor("m.tasks", "Task Count", System).measurement(),
    M::sensor("m.time.utc", "Module Time", System).class(DeviceClass::Timestamp),
    M::text("m.egpio.input", "EGPIO Input", System),
    M::text("m.egpio.monitor", "EGPIO Monitor", System),
    M::text("m.egpio.output", "EGPIO Output", System),
    M::binary("s.v2.connected", "V2 Server Connected", System).class(DeviceClass::Connectivity),
    M::binary("s.v3.connected", "V3 Server Connected", System).class(DeviceClass::Connectivity),
    M::sensor("s.v2.peers", "V2 Server Peers", System).measurement(),
    M::sensor("s.v3.peers", "V3 Server Peers", System).measurement(),
];

pub static TIRE: &[M] = &[
    M::vector("v.t.pressure", "Tire Pressure", Tire)
        .unit(Unit::Kilopascal)
        .class(DeviceClass::Pressure)
        .measurement()
        .icon("mdi:car-tire-alert"),
    M::vector("v.t.temp", "Tire Temperature", Tire)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::vector("v.t.diff", "Tire Pressure Difference", Tire)
        .unit(Unit::Kilopascal)
        .class(DeviceClass::Pressure)
        .measurement(),
    M::vector("v.t.health", "Tire Health", Tire)
        .unit(Unit::Percent)
        .measurement(),
    M::vector("v.t.alert", "Tire Alert", Tire),
];

pub static DIAGNOSTIC: &[M] = &[
    M::binary("v.e.alarm", "Alarm", Diagnostic).class(DeviceClass::Problem),
    M::binary("v.e.aux12v", "12V Auxiliary", Diagnostic).class(DeviceClass::PowerState),
    M::binary("v.e.awake", "Awake", Diagnostic)
        .class(DeviceClass::PowerState)
        .icon("mdi:sleep-off"),
    M::binary("v.e.on", "Ignition", Diagnostic)
        .class(DeviceClass::PowerState)
        .icon("mdi:key"),
    M::binary("v.e.charging12v", "12V Charging", Diagnostic).class(DeviceClass::BatteryCharging),
    M::binary("v.e.c.config", "Configuration Mode", Diagnostic).class(DeviceClass::Update),
    M::binary("v.e.c.login", "ECU Login", Diagnostic).class(DeviceClass::Connectivity),
    M::text("v.e.drivemode", "Drive Mode", Diagnostic),
    M::text("v.e.gear", "Gear", Diagnostic).icon("mdi:car-shift-pattern"),
    M::binary("v.e.handbrake", "Handbrake", Diagnostic).class(DeviceClass::Problem),
    M::binary("v.e.headlights", "Headlights", Diagnostic).class(DeviceClass::Light),
    M::binary("v.e.valet", "Valet Mode", Diagnostic).class(DeviceClass::Running),
    M::sensor("v.e.serv.range", "Service Range", Diagnostic)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement()
        .icon("mdi:car-wrench"),
    M::sensor("v.e.serv.time", "Service Due", Diagnostic).class(DeviceClass::Timestamp),
];

pub static DEVICE: &[M] = &[
    M::text("v.type", "Vehicle Type", Device).icon("mdi:car-info"),
    M::text("v.vin", "VIN", Device).icon("mdi:identifier"),
];
