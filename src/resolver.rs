//! Layered category resolution.
//!
//! Order, first hit wins:
//! 1. vehicle-tier definition for the exact path
//! 2. longest dotted-prefix rule
//! 3. GPS whitelist (only reached when no prefix rule covers the path)
//! 4. trailing token equal to a category label
//! 5. `system`
//!
//! Resolution is a pure function of the catalog and the path.

use serde::Serialize;

use crate::catalog::MetricCatalog;
use crate::category::{Category, EntityType};

/// Trailing tokens that identify position data.
pub const GPS_WHITELIST: &[&str] = &[
    "latitude",
    "longitude",
    "altitude",
    "direction",
    "heading",
    "gpshdop",
    "gpslock",
    "gpsmode",
    "gpssq",
    "gpsspeed",
    "gpstime",
    "satcount",
];

/// Which step produced the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "prefix", rename_all = "snake_case")]
pub enum ResolutionSource {
    VehicleOverride,
    PrefixRule(&'static str),
    BackupWhitelist,
    CategoryLiteral,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryResolution {
    pub category: Category,
    pub source: ResolutionSource,
}

impl CategoryResolution {
    fn new(category: Category, source: ResolutionSource) -> Self {
        Self { category, source }
    }
}

pub fn resolve_category(
    catalog: &MetricCatalog,
    metric_path: &str,
    entity_type_hint: EntityType,
) -> CategoryResolution {
    let resolution = resolve_inner(catalog, metric_path, entity_type_hint);
    tracing::trace!(
        "resolver: {} -> {} via {:?}",
        metric_path,
        resolution.category,
        resolution.source
    );
    resolution
}

fn resolve_inner(
    catalog: &MetricCatalog,
    metric_path: &str,
    entity_type_hint: EntityType,
) -> CategoryResolution {
    if let Some(def) = catalog.vehicle_override(metric_path) {
        return CategoryResolution::new(def.category, ResolutionSource::VehicleOverride);
    }

    if let Some((prefix, category)) = catalog.match_prefix(metric_path) {
        return CategoryResolution::new(category, ResolutionSource::PrefixRule(prefix));
    }

    let token = metric_path.rsplit('.').next().unwrap_or(metric_path);

    if GPS_WHITELIST.contains(&token) || entity_type_hint == EntityType::DeviceTracker {
        return CategoryResolution::new(Category::Location, ResolutionSource::BackupWhitelist);
    }

    if let Some(category) = Category::from_label(token) {
        return CategoryResolution::new(category, ResolutionSource::CategoryLiteral);
    }

    CategoryResolution::new(Category::System, ResolutionSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Tier, VehicleModel};

    fn resolve(catalog: &MetricCatalog, path: &str) -> CategoryResolution {
        resolve_category(catalog, path, catalog.entity_type_hint(path))
    }

    #[test]
    fn test_position_branch_split() {
        let catalog = MetricCatalog::load(None);
        assert_eq!(resolve(&catalog, "v.p.speed").category, Category::Trip);
        assert_eq!(resolve(&catalog, "v.p.odometer").category, Category::Trip);
        assert_eq!(resolve(&catalog, "v.p.latitude").category, Category::Location);
        assert_eq!(resolve(&catalog, "v.p.gpsspeed").category, Category::Location);
        assert_eq!(
            resolve(&catalog, "v.p.speed").source,
            ResolutionSource::PrefixRule("v.p.speed")
        );
    }

    #[test]
    fn test_deterministic() {
        let catalog = MetricCatalog::load(None);
        let paths = ["v.p.speed", "v.b.soc", "v.p.latitude", "xnl.v.b.gids", "q.r.s", "v.e.cabintemp"];
        let first: Vec<_> = paths.iter().map(|p| resolve(&catalog, p)).collect();
        for _ in 0..3 {
            let again: Vec<_> = paths.iter().rev().map(|p| resolve(&catalog, p)).collect();
            let again: Vec<_> = again.into_iter().rev().collect();
            assert_eq!(first, again);
        }
        let other = MetricCatalog::load(None);
        let fresh: Vec<_> = paths.iter().map(|p| resolve(&other, p)).collect();
        assert_eq!(first, fresh);
    }

    #[test]
    fn test_vehicle_tier_wins() {
        let catalog = MetricCatalog::load(Some(VehicleModel::RenaultTwizy));
        let r = resolve(&catalog, "v.e.throttle");
        assert_eq!(r.category, Category::Motor);
        assert_eq!(r.source, ResolutionSource::VehicleOverride);

        let generic = MetricCatalog::load(None);
        assert_eq!(resolve(&generic, "v.e.throttle").category, Category::Trip);
    }

    #[test]
    fn test_vendor_namespace() {
        let catalog = MetricCatalog::load(None);
        let r = resolve(&catalog, "xmg.v.bat.error");
        assert_eq!(r.category, Category::MgZsEv);
        assert_eq!(r.source, ResolutionSource::VehicleOverride);
        let r = resolve(&catalog, "xmg.something.new");
        assert_eq!(r.source, ResolutionSource::PrefixRule("xmg"));
    }

    #[test]
    fn test_fallback_steps() {
        let catalog = MetricCatalog::load(None);
        let r = resolve(&catalog, "q.nav.latitude");
        assert_eq!(r.category, Category::Location);
        assert_eq!(r.source, ResolutionSource::BackupWhitelist);

        let r = resolve(&catalog, "q.climate");
        assert_eq!(r.category, Category::Climate);
        assert_eq!(r.source, ResolutionSource::CategoryLiteral);

        let r = resolve(&catalog, "q.unknown");
        assert_eq!(r.category, Category::System);
        assert_eq!(r.source, ResolutionSource::Default);

        let r = resolve_category(&catalog, "q.pos", EntityType::DeviceTracker);
        assert_eq!(r.category, Category::Location);
    }

    #[test]
    fn test_whitelist_never_overrides_prefix_rule() {
        let catalog = MetricCatalog::load(None);
        // covered by `v.e`
        let r = resolve(&catalog, "v.e.latitude");
        assert_eq!(r.category, Category::Diagnostic);
    }

    #[test]
    fn test_catalog_keys_resolve_to_own_category() {
        for model in std::iter::once(None).chain(VehicleModel::ALL.into_iter().map(Some)) {
            let catalog = MetricCatalog::load(model);
            for (def, tier) in catalog.definitions() {
                let r = resolve(&catalog, def.key);
                assert_eq!(r.category, def.category, "{} ({:?})", def.key, tier);
                assert_ne!(r.source, ResolutionSource::BackupWhitelist, "{}", def.key);
                if tier == Tier::Vehicle {
                    assert_eq!(r.source, ResolutionSource::VehicleOverride);
                }
            }
        }
    }
}
