//! GPS quality attributes and accuracy estimation.

use serde_json::{Map, Value};

pub const GPS_ACCURACY_MIN_METERS: f64 = 5.0;
pub const GPS_ACCURACY_MAX_METERS: f64 = 100.0;
/// Meters of horizontal error per HDOP unit.
pub const GPS_HDOP_METERS_MULTIPLIER: f64 = 5.0;

/// Accuracy from signal quality (0-100 %, higher is better).
pub fn accuracy_from_signal_quality(sq: f64) -> f64 {
    clamp_accuracy(GPS_ACCURACY_MAX_METERS - sq)
}

pub fn accuracy_from_hdop(hdop: f64) -> f64 {
    clamp_accuracy(hdop * GPS_HDOP_METERS_MULTIPLIER)
}

/// Signal quality is preferred when both are known.
pub fn estimate_accuracy(signal_quality: Option<f64>, hdop: Option<f64>) -> Option<f64> {
    signal_quality
        .map(accuracy_from_signal_quality)
        .or_else(|| hdop.map(accuracy_from_hdop))
}

fn clamp_accuracy(meters: f64) -> f64 {
    meters.clamp(GPS_ACCURACY_MIN_METERS, GPS_ACCURACY_MAX_METERS)
}

/// Attributes for the GPS quality metrics (`gpssq`, `gpshdop`, `gpsspeed`).
/// Other paths produce nothing.
pub fn gps_attributes(metric_path: &str, value: f64) -> Map<String, Value> {
    let mut attrs = Map::new();
    if !value.is_finite() {
        return attrs;
    }

    let token = metric_path.rsplit('.').next().unwrap_or(metric_path);
    let accuracy = match token {
        "gpshdop" => {
            attrs.insert("gps_hdop".to_string(), Value::from(value));
            Some(accuracy_from_hdop(value))
        }
        "gpssq" => {
            attrs.insert("gps_signal_quality".to_string(), Value::from(value));
            Some(accuracy_from_signal_quality(value))
        }
        "gpsspeed" => {
            attrs.insert("gps_speed".to_string(), Value::from(value));
            None
        }
        _ => None,
    };

    if let Some(accuracy) = accuracy {
        attrs.insert("gps_accuracy".to_string(), Value::from(accuracy));
        attrs.insert("gps_accuracy_unit".to_string(), Value::from("m"));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accuracy_clamped() {
        assert_relative_eq!(accuracy_from_signal_quality(80.0), 20.0);
        assert_relative_eq!(accuracy_from_signal_quality(99.0), 5.0);
        assert_relative_eq!(accuracy_from_signal_quality(-10.0), 100.0);
        assert_relative_eq!(accuracy_from_hdop(1.2), 6.0);
        assert_relative_eq!(accuracy_from_hdop(0.5), 5.0);
        assert_relative_eq!(accuracy_from_hdop(40.0), 100.0);
    }

    #[test]
    fn test_signal_quality_preferred() {
        assert_eq!(estimate_accuracy(Some(70.0), Some(1.0)), Some(30.0));
        assert_eq!(estimate_accuracy(None, Some(2.0)), Some(10.0));
        assert_eq!(estimate_accuracy(None, None), None);
    }

    #[test]
    fn test_attributes() {
        let attrs = gps_attributes("v.p.gpssq", 85.0);
        assert_eq!(attrs["gps_signal_quality"], 85.0);
        assert_eq!(attrs["gps_accuracy"], 15.0);
        assert_eq!(attrs["gps_accuracy_unit"], "m");

        let attrs = gps_attributes("v.p.gpshdop", 2.0);
        assert_eq!(attrs["gps_hdop"], 2.0);
        assert_eq!(attrs["gps_accuracy"], 10.0);

        let attrs = gps_attributes("v.p.gpsspeed", 42.0);
        assert_eq!(attrs["gps_speed"], 42.0);
        assert!(!attrs.contains_key("gps_accuracy"));

        assert!(gps_attributes("v.b.soc", 80.0).is_empty());
    }
}
