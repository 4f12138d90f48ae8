//! Metric catalog
//!
//! Three tiers of static metric definitions keyed by dotted metric path:
//! - vehicle: namespaced metrics (`xmg.*`, `xnl.*`, ...) and per-model
//!   overrides of standard keys
//! - category: the common OVMS metrics grouped by category
//! - generic: dotted-prefix and trailing-keyword patterns for metrics the
//!   tables above do not enumerate
//!
//! Tiers are merged once in [`MetricCatalog::load`]. Higher tiers win;
//! lower tiers only fill gaps. After load the catalog is read-only and can
//! be shared between threads without locking.

pub mod common;
pub mod patterns;
pub mod prefix;
pub mod vehicles;

use std::collections::HashMap;

use serde::Serialize;

use crate::category::{Category, EntityType};
pub use vehicles::VehicleModel;

// ── Definition types ─────────────────────────────────────

/// Semantic unit tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    None,
    Percent,
    Volt,
    Ampere,
    Watt,
    Kilowatt,
    KilowattHour,
    AmpereHour,
    Celsius,
    Kilometer,
    Meter,
    KilometerPerHour,
    MeterPerSecondSquared,
    Second,
    Minute,
    Hour,
    Kilopascal,
    Dbm,
    Degree,
    Byte,
    NewtonMeter,
    Rpm,
    WattHourPerKilometer,
}

impl Unit {
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            Unit::None => return None,
            Unit::Percent => "%",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Watt => "W",
            Unit::Kilowatt => "kW",
            Unit::KilowattHour => "kWh",
            Unit::AmpereHour => "Ah",
            Unit::Celsius => "°C",
            Unit::Kilometer => "km",
            Unit::Meter => "m",
            Unit::KilometerPerHour => "km/h",
            Unit::MeterPerSecondSquared => "m/s²",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Kilopascal => "kPa",
            Unit::Dbm => "dBm",
            Unit::Degree => "°",
            Unit::Byte => "B",
            Unit::NewtonMeter => "Nm",
            Unit::Rpm => "rpm",
            Unit::WattHourPerKilometer => "Wh/km",
        };
        Some(s)
    }

    /// Seconds per unit for time durations, `None` for everything else.
    pub fn seconds_per_unit(&self) -> Option<f64> {
        match self {
            Unit::Second => Some(1.0),
            Unit::Minute => Some(60.0),
            Unit::Hour => Some(3600.0),
            _ => None,
        }
    }

    pub fn is_duration(&self) -> bool {
        self.seconds_per_unit().is_some()
    }
}

/// Shape of the value a metric carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Boolean,
    Numeric,
    Vector,
    Json,
    Text,
    Timestamp,
}

/// Declared semantic type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    // sensor classes
    Battery,
    Temperature,
    Voltage,
    Current,
    Power,
    Energy,
    EnergyStorage,
    Distance,
    Speed,
    Pressure,
    SignalStrength,
    Duration,
    Timestamp,
    DataSize,
    PowerFactor,
    // binary sensor classes
    Door,
    Lock,
    BatteryCharging,
    Connectivity,
    PowerState,
    Problem,
    Running,
    Heat,
    Cold,
    Light,
    Update,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Battery => "battery",
            DeviceClass::Temperature => "temperature",
            DeviceClass::Voltage => "voltage",
            DeviceClass::Current => "current",
            DeviceClass::Power => "power",
            DeviceClass::Energy => "energy",
            DeviceClass::EnergyStorage => "energy_storage",
            DeviceClass::Distance => "distance",
            DeviceClass::Speed => "speed",
            DeviceClass::Pressure => "pressure",
            DeviceClass::SignalStrength => "signal_strength",
            DeviceClass::Duration => "duration",
            DeviceClass::Timestamp => "timestamp",
            DeviceClass::DataSize => "data_size",
            DeviceClass::PowerFactor => "power_factor",
            DeviceClass::Door => "door",
            DeviceClass::Lock => "lock",
            DeviceClass::BatteryCharging => "battery_charging",
            DeviceClass::Connectivity => "connectivity",
            DeviceClass::PowerState => "power",
            DeviceClass::Problem => "problem",
            DeviceClass::Running => "running",
            DeviceClass::Heat => "heat",
            DeviceClass::Cold => "cold",
            DeviceClass::Light => "light",
            DeviceClass::Update => "update",
        }
    }

    pub const fn is_binary(&self) -> bool {
        matches!(
            self,
            DeviceClass::Door
                | DeviceClass::Lock
                | DeviceClass::BatteryCharging
                | DeviceClass::Connectivity
                | DeviceClass::PowerState
                | DeviceClass::Problem
                | DeviceClass::Running
                | DeviceClass::Heat
                | DeviceClass::Cold
                | DeviceClass::Light
                | DeviceClass::Update
        )
    }

    /// Sensor classes whose state must be a number.
    pub const fn requires_numeric(&self) -> bool {
        !self.is_binary() && !matches!(self, DeviceClass::Timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
    Total,
    TotalIncreasing,
}

impl StateClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateClass::Measurement => "measurement",
            StateClass::Total => "total",
            StateClass::TotalIncreasing => "total_increasing",
        }
    }
}

/// A single known metric. Tables are built with the const builders below:
///
/// ```ignore
/// MetricDefinition::sensor("v.b.soc", "State of Charge", Category::Battery)
///     .unit(Unit::Percent)
///     .class(DeviceClass::Battery)
///     .measurement()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Unit,
    pub kind: ValueKind,
    pub category: Category,
    pub entity_type: EntityType,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub icon: Option<&'static str>,
}

impl MetricDefinition {
    const fn base(
        key: &'static str,
        name: &'static str,
        category: Category,
        kind: ValueKind,
        entity_type: EntityType,
    ) -> Self {
        Self {
            key,
            name,
            unit: Unit::None,
            kind,
            category,
            entity_type,
            device_class: None,
            state_class: None,
            icon: None,
        }
    }

    pub const fn sensor(key: &'static str, name: &'static str, category: Category) -> Self {
        Self::base(key, name, category, ValueKind::Numeric, EntityType::Sensor)
    }

    pub const fn text(key: &'static str, name: &'static str, category: Category) -> Self {
        Self::base(key, name, category, ValueKind::Text, EntityType::Sensor)
    }

    pub const fn vector(key: &'static str, name: &'static str, category: Category) -> Self {
        Self::base(key, name, category, ValueKind::Vector, EntityType::Sensor)
    }

    pub const fn binary(key: &'static str, name: &'static str, category: Category) -> Self {
        Self::base(key, name, category, ValueKind::Boolean, EntityType::BinarySensor)
    }

    pub const fn switch(key: &'static str, name: &'static str, category: Category) -> Self {
        Self::base(key, name, category, ValueKind::Boolean, EntityType::Switch)
    }

    pub const fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Binary classes turn the definition into a binary sensor;
    /// `Timestamp` switches the value kind.
    pub const fn class(mut self, class: DeviceClass) -> Self {
        self.device_class = Some(class);
        if class.is_binary() {
            if !matches!(self.entity_type, EntityType::Switch) {
                self.entity_type = EntityType::BinarySensor;
            }
            self.kind = ValueKind::Boolean;
        } else if matches!(class, DeviceClass::Timestamp) {
            self.kind = ValueKind::Timestamp;
        }
        self
    }

    pub const fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn measurement(mut self) -> Self {
        self.state_class = Some(StateClass::Measurement);
        self
    }

    pub const fn total(mut self) -> Self {
        self.state_class = Some(StateClass::Total);
        self
    }

    pub const fn total_increasing(mut self) -> Self {
        self.state_class = Some(StateClass::TotalIncreasing);
        self
    }

    pub const fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    /// True when the state must parse as a number.
    pub fn requires_numeric(&self) -> bool {
        self.device_class.map(|c| c.requires_numeric()).unwrap_or(false)
            || self.state_class.is_some()
    }
}

// ── Catalog ──────────────────────────────────────────────

/// Which tier a definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Vehicle,
    Category,
    Generic,
}

/// A definition together with the tier that supplied it.
#[derive(Debug, Clone, Copy)]
pub struct CatalogMatch {
    pub definition: &'static MetricDefinition,
    pub tier: Tier,
    /// False for generic pattern matches, whose key is a prefix or keyword
    pub exact: bool,
}

/// The merged, read-only metric catalog.
pub struct MetricCatalog {
    model: Option<VehicleModel>,
    entries: HashMap<&'static str, (&'static MetricDefinition, Tier)>,
    prefix_rules: HashMap<&'static str, Category>,
    ordered_rules: Vec<(&'static str, Category)>,
}

impl MetricCatalog {
    /// Merge the tiers for an optional vehicle model.
    pub fn load(model: Option<VehicleModel>) -> Self {
        let mut entries: HashMap<&'static str, (&'static MetricDefinition, Tier)> = HashMap::new();

        for table in vehicles::VEHICLES {
            for def in table.namespaced {
                entries.entry(def.key).or_insert((def, Tier::Vehicle));
            }
            if Some(table.model) == model {
                for def in table.overrides {
                    entries.entry(def.key).or_insert((def, Tier::Vehicle));
                }
            }
        }

        for table in common::TABLES {
            for def in table.iter() {
                entries.entry(def.key).or_insert((def, Tier::Category));
            }
        }

        let prefix_rules = prefix::build_rules(&entries);
        let ordered_rules = prefix::ordered(&prefix_rules);

        tracing::debug!(
            "catalog: loaded {} definitions, {} prefix rules (model: {})",
            entries.len(),
            prefix_rules.len(),
            model.map(|m| m.as_str()).unwrap_or("generic")
        );

        Self {
            model,
            entries,
            prefix_rules,
            ordered_rules,
        }
    }

    pub fn model(&self) -> Option<VehicleModel> {
        self.model
    }

    /// Exact lookup in the vehicle and category tiers.
    pub fn lookup(&self, metric_path: &str) -> Option<&'static MetricDefinition> {
        self.entries.get(metric_path).map(|(def, _)| *def)
    }

    /// Exact lookup, falling back to the generic pattern tier.
    pub fn resolve(&self, metric_path: &str) -> Option<CatalogMatch> {
        if let Some(&(definition, tier)) = self.entries.get(metric_path) {
            return Some(CatalogMatch {
                definition,
                tier,
                exact: true,
            });
        }
        patterns::match_pattern(metric_path).map(|definition| CatalogMatch {
            definition,
            tier: Tier::Generic,
            exact: false,
        })
    }

    /// Vehicle-tier definition for this path, if any.
    pub fn vehicle_override(&self, metric_path: &str) -> Option<&'static MetricDefinition> {
        match self.entries.get(metric_path) {
            Some((def, Tier::Vehicle)) => Some(*def),
            _ => None,
        }
    }

    /// Entity type by tier precedence; unknown metrics default to sensors.
    pub fn entity_type_hint(&self, metric_path: &str) -> EntityType {
        self.resolve(metric_path)
            .map(|m| m.definition.entity_type)
            .unwrap_or(EntityType::Sensor)
    }

    /// Longest dotted-prefix rule covering the path.
    pub fn match_prefix(&self, metric_path: &str) -> Option<(&'static str, Category)> {
        prefix::longest_match(&self.prefix_rules, metric_path)
    }

    /// Prefix rules, most specific first.
    pub fn iterate_prefix_rules(&self) -> impl Iterator<Item = (&'static str, Category)> + '_ {
        self.ordered_rules.iter().copied()
    }

    /// All exact definitions with their tier, in key order.
    pub fn definitions(&self) -> Vec<(&'static MetricDefinition, Tier)> {
        let mut defs: Vec<_> = self.entries.values().copied().collect();
        defs.sort_by_key(|(def, _)| def.key);
        defs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::load(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_unique_within_tier() {
        let mut seen = HashSet::new();
        for table in common::TABLES {
            for def in table.iter() {
                assert!(seen.insert(def.key), "duplicate category-tier key {}", def.key);
            }
        }
        for table in vehicles::VEHICLES {
            let mut seen = HashSet::new();
            for def in table.namespaced.iter().chain(table.overrides.iter()) {
                assert!(seen.insert(def.key), "duplicate vehicle key {}", def.key);
            }
        }
    }

    #[test]
    fn test_namespaced_keys_carry_namespace() {
        for table in vehicles::VEHICLES {
            let ns = format!("{}.", table.model.namespace());
            for def in table.namespaced {
                assert!(def.key.starts_with(&ns), "{} outside {}", def.key, ns);
            }
        }
    }

    #[test]
    fn test_binary_class_implies_binary_sensor() {
        let catalog = MetricCatalog::load(None);
        for (def, _) in catalog.definitions() {
            if let Some(class) = def.device_class {
                if class.is_binary() {
                    assert!(def.entity_type.is_boolean(), "{} should be binary", def.key);
                    assert_eq!(def.kind, ValueKind::Boolean);
                }
            }
        }
    }

    #[test]
    fn test_lookup_and_fallback() {
        let catalog = MetricCatalog::load(None);
        let soc = catalog.lookup("v.b.soc").unwrap();
        assert_eq!(soc.category, Category::Battery);
        assert_eq!(soc.unit, Unit::Percent);

        let m = catalog.resolve("v.b.soc").unwrap();
        assert_eq!(m.tier, Tier::Category);
        assert!(m.exact);

        assert!(catalog.lookup("v.d.sunroof").is_none());
        let m = catalog.resolve("v.d.sunroof").unwrap();
        assert_eq!(m.tier, Tier::Generic);
        assert!(!m.exact);
        assert_eq!(catalog.entity_type_hint("v.d.sunroof"), EntityType::BinarySensor);

        assert_eq!(catalog.entity_type_hint("zz.totally.unknown"), EntityType::Sensor);
    }

    #[test]
    fn test_vehicle_override_requires_model() {
        let generic = MetricCatalog::load(None);
        assert_eq!(generic.lookup("v.e.throttle").unwrap().category, Category::Trip);
        assert!(generic.vehicle_override("v.e.throttle").is_none());

        let twizy = MetricCatalog::load(Some(VehicleModel::RenaultTwizy));
        assert_eq!(twizy.lookup("v.e.throttle").unwrap().category, Category::Motor);
        assert!(twizy.vehicle_override("v.e.throttle").is_some());
    }

    #[test]
    fn test_namespaced_always_eligible() {
        let catalog = MetricCatalog::load(None);
        let def = catalog.vehicle_override("xnl.v.b.soh.instrument").unwrap();
        assert_eq!(def.category, Category::NissanLeaf);
    }

    #[test]
    fn test_prefix_rules_ordered_longest_first() {
        let catalog = MetricCatalog::load(None);
        let depths: Vec<usize> = catalog
            .iterate_prefix_rules()
            .map(|(p, _)| p.split('.').count())
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
        assert!(catalog.iterate_prefix_rules().all(|(p, _)| p != "v.p"));
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(Unit::Minute.seconds_per_unit(), Some(60.0));
        assert!(Unit::Second.is_duration());
        assert!(!Unit::Kilometer.is_duration());
        assert_eq!(Unit::None.symbol(), None);
        assert_eq!(Unit::Celsius.symbol(), Some("°C"));
    }

    #[test]
    fn test_requires_numeric() {
        assert!(DeviceClass::Pressure.requires_numeric());
        assert!(!DeviceClass::Door.requires_numeric());
        assert!(!DeviceClass::Timestamp.requires_numeric());
        let def = MetricDefinition::text("x.y", "Y", Category::System);
        assert!(!def.requires_numeric());
        let def = MetricDefinition::sensor("x.y", "Y", Category::System).measurement();
        assert!(def.requires_numeric());
    }
}
