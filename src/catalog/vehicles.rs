//! Vehicle tier: manufacturer metrics and per-model overrides.
//!
//! Namespaced metrics (`xmg.*`, `xnl.*`, ...) cannot collide with standard
//! keys, so they are loaded for every model. Overrides of standard keys only
//! apply when their model is configured.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MetricDefinition as M;
use super::{DeviceClass, Unit};
use crate::category::Category::{self, *};

/// Vehicle models with dedicated metric tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleModel {
    VwEup,
    SmartFortwo,
    MgZsEv,
    NissanLeaf,
    RenaultTwizy,
}

impl VehicleModel {
    pub const ALL: [VehicleModel; 5] = [
        VehicleModel::VwEup,
        VehicleModel::SmartFortwo,
        VehicleModel::MgZsEv,
        VehicleModel::NissanLeaf,
        VehicleModel::RenaultTwizy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleModel::VwEup => "vw_eup",
            VehicleModel::SmartFortwo => "smart_fortwo",
            VehicleModel::MgZsEv => "mg_zs_ev",
            VehicleModel::NissanLeaf => "nissan_leaf",
            VehicleModel::RenaultTwizy => "renault_twizy",
        }
    }

    /// Metric namespace used by the vehicle module.
    pub fn namespace(&self) -> &'static str {
        match self {
            VehicleModel::VwEup => "xvu",
            VehicleModel::SmartFortwo => "xsq",
            VehicleModel::MgZsEv => "xmg",
            VehicleModel::NissanLeaf => "xnl",
            VehicleModel::RenaultTwizy => "xrt",
        }
    }

    /// OVMS vehicle type code (as reported in `v.type`).
    pub fn type_code(&self) -> &'static str {
        match self {
            VehicleModel::VwEup => "VWUP",
            VehicleModel::SmartFortwo => "SQ",
            VehicleModel::MgZsEv => "MGEV",
            VehicleModel::NissanLeaf => "NL",
            VehicleModel::RenaultTwizy => "RT",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VehicleModel::VwEup => "VW e-Up",
            VehicleModel::SmartFortwo => "Smart ForTwo",
            VehicleModel::MgZsEv => "MG ZS-EV",
            VehicleModel::NissanLeaf => "Nissan Leaf",
            VehicleModel::RenaultTwizy => "Renault Twizy",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            VehicleModel::VwEup => VwEup,
            VehicleModel::SmartFortwo => SmartFortwo,
            VehicleModel::MgZsEv => MgZsEv,
            VehicleModel::NissanLeaf => NissanLeaf,
            VehicleModel::RenaultTwizy => RenaultTwizy,
        }
    }

    /// Model owning a namespace prefix such as `xnl`.
    pub fn from_namespace(namespace: &str) -> Option<VehicleModel> {
        VehicleModel::ALL.into_iter().find(|m| m.namespace() == namespace)
    }
}

impl FromStr for VehicleModel {
    type Err = String;

    /// Accepts model names (`nissan_leaf`, `Nissan Leaf`), namespaces
    /// (`xnl`) and OVMS type codes (`NL`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        VehicleModel::ALL
            .into_iter()
            .find(|m| {
                m.as_str() == norm
                    || m.namespace() == norm
                    || m.type_code().eq_ignore_ascii_case(&norm)
                    || m.display_name().to_ascii_lowercase().replace([' ', '-'], "_") == norm
            })
            .ok_or_else(|| format!("unknown vehicle model: {}", s))
    }
}

impl std::fmt::Display for VehicleModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Metric tables for one vehicle model.
pub struct VehicleTable {
    pub model: VehicleModel,
    pub namespaced: &'static [M],
    pub overrides: &'static [M],
}

pub static VEHICLES: &[VehicleTable] = &[
    VehicleTable {
        model: VehicleModel::MgZsEv,
        namespaced: MG_ZS_EV,
        overrides: &[],
    },
    VehicleTable {
        model: VehicleModel::NissanLeaf,
        namespaced: NISSAN_LEAF,
        overrides: NISSAN_LEAF_OVERRIDES,
    },
    VehicleTable {
        model: VehicleModel::VwEup,
        namespaced: VW_EUP,
        overrides: &[],
    },
    VehicleTable {
        model: VehicleModel::SmartFortwo,
        namespaced: SMART_FORTWO,
        overrides: &[],
    },
    VehicleTable {
        model: VehicleModel::RenaultTwizy,
        namespaced: RENAULT_TWIZY,
        overrides: RENAULT_TWIZY_OVERRIDES,
    },
];

pub static MG_ZS_EV: &[M] = &[
    M::sensor("xmg.b.capacity", "Battery Capacity", MgZsEv)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::EnergyStorage)
        .measurement(),
    M::sensor("xmg.b.dod.lower", "Lower DoD", MgZsEv)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("xmg.b.dod.upper", "Upper DoD", MgZsEv)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("xmg.c.max.dc.charge", "Max DC Charge Power", MgZsEv)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::binary("xmg.enable.polling", "Polling Enabled", MgZsEv).class(DeviceClass::Running),
    M::sensor("xmg.v.bat.coolant.temp", "Battery Coolant Temperature", MgZsEv)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
    M::binary("xmg.v.bat.error", "Battery Error", MgZsEv).class(DeviceClass::Problem),
    M::sensor("xmg.v.bat.voltage.bms", "BMS Battery Voltage", MgZsEv)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("xmg.v.bat.voltage.vcu", "VCU Battery Voltage", MgZsEv)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("xmg.v.bms.cell.voltage.max", "Max Cell Voltage", MgZsEv)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("xmg.v.bms.cell.voltage.min", "Min Cell Voltage", MgZsEv)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::binary("xmg.v.bms.mainrelay.b", "Main Relay B", MgZsEv).class(DeviceClass::PowerState),
    M::binary("xmg.v.bms.mainrelay.g", "Main Relay G", MgZsEv).class(DeviceClass::PowerState),
    M::binary("xmg.v.bms.mainrelay.p", "Main Relay P", MgZsEv).class(DeviceClass::PowerState),
    M::sensor("xmg.v.soc.raw", "Raw SOC", MgZsEv)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xmg.v.m.torque", "Motor Torque", MgZsEv)
        .unit(Unit::NewtonMeter)
        .measurement(),
    M::binary("xmg.v.radiator.fan", "Radiator Fan", MgZsEv).class(DeviceClass::Running),
    M::binary("xmg.auth.bcm", "BCM Authenticated", MgZsEv).class(DeviceClass::Connectivity),
];

pub static NISSAN_LEAF: &[M] = &[
    M::sensor("xnl.v.b.soc.instrument", "Dash SOC", NissanLeaf)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xnl.v.b.soc.nominal", "Nominal SOC", NissanLeaf)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xnl.v.b.soh.instrument", "Dash SOH", NissanLeaf)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xnl.v.b.soh.newcar", "New Car SOH", NissanLeaf)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xnl.v.b.gids", "GIDs", NissanLeaf)
        .measurement()
        .icon("mdi:battery-outline"),
    M::sensor("xnl.v.b.range.instrument", "Dash Range", NissanLeaf)
        .unit(Unit::Kilometer)
        .class(DeviceClass::Distance)
        .measurement(),
    M::sensor("xnl.v.c.duration", "Charge Duration", NissanLeaf)
        .unit(Unit::Minute)
        .class(DeviceClass::Duration)
        .measurement(),
    M::binary("xnl.v.c.quick", "Quick Charging", NissanLeaf).class(DeviceClass::BatteryCharging),
    M::sensor("xnl.v.c.count.qc", "Quick Charge Count", NissanLeaf).total_increasing(),
    M::sensor("xnl.v.c.count.l0l1l2", "Slow Charge Count", NissanLeaf).total_increasing(),
    M::binary("xnl.cc.remoteheat", "Remote Heating", NissanLeaf).class(DeviceClass::Heat),
    M::binary("xnl.cc.remotecool", "Remote Cooling", NissanLeaf).class(DeviceClass::Cold),
    M::sensor("xnl.bms.temp.int", "BMS Temperatures", NissanLeaf)
        .unit(Unit::Celsius)
        .class(DeviceClass::Temperature)
        .measurement(),
];

pub static NISSAN_LEAF_OVERRIDES: &[M] = &[M::sensor("v.b.soh", "State of Health", NissanLeaf)
    .unit(Unit::Percent)
    .class(DeviceClass::Battery)
    .measurement()];

pub static VW_EUP: &[M] = &[
    M::sensor("xvu.b.cell.delta", "Cell Voltage Delta", VwEup)
        .unit(Unit::Volt)
        .class(DeviceClass::Voltage)
        .measurement(),
    M::sensor("xvu.b.soc.abs", "Absolute SOC", VwEup)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xvu.c.ac.p", "AC Charge Power", VwEup)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::sensor("xvu.c.eff.calc", "Charge Efficiency", VwEup)
        .unit(Unit::Percent)
        .measurement(),
    M::text("xvu.e.serv.days", "Service Interval", VwEup),
];

pub static SMART_FORTWO: &[M] = &[
    M::sensor("xsq.bms.soc.real", "Real SOC", SmartFortwo)
        .unit(Unit::Percent)
        .class(DeviceClass::Battery)
        .measurement(),
    M::sensor("xsq.bms.soh", "BMS SOH", SmartFortwo)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("xsq.evc.12v.dcdc.load", "DC-DC Load", SmartFortwo)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("xsq.use.at.reset", "Energy Since Reset", SmartFortwo)
        .unit(Unit::KilowattHour)
        .class(DeviceClass::Energy)
        .total_increasing(),
];

pub static RENAULT_TWIZY: &[M] = &[
    M::sensor("xrt.s.b.pwr.dyn", "Dynamic Power Limit", RenaultTwizy)
        .unit(Unit::Kilowatt)
        .class(DeviceClass::Power)
        .measurement(),
    M::text("xrt.cfg.profile", "Tuning Profile", RenaultTwizy).icon("mdi:tune"),
    M::sensor("xrt.i.cur.act", "Inverter Current", RenaultTwizy)
        .unit(Unit::Ampere)
        .class(DeviceClass::Current)
        .measurement(),
];

/// The Twizy reports pedal positions from the motor controller.
pub static RENAULT_TWIZY_OVERRIDES: &[M] = &[
    M::sensor("v.e.throttle", "Throttle", Motor)
        .unit(Unit::Percent)
        .measurement(),
    M::sensor("v.e.footbrake", "Foot Brake", Motor)
        .unit(Unit::Percent)
        .measurement(),
];
