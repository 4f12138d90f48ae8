//! Duration rendering and parsing.

use std::sync::OnceLock;

use regex::Regex;

/// One `<number><unit>` component; longer unit spellings come first.
const COMPONENT: &str =
    r"(\d+(?:\.\d+)?)\s*(days?|d|hours?|hrs?|h|minutes?|mins?|m|seconds?|secs?|s)";

/// Abbreviated form: `1d 2h 3m`, `5m 12s`, `4.5s`.
///
/// Seconds are only shown below one hour; below ten seconds they keep one
/// decimal.
pub fn format_duration(seconds: f64) -> String {
    render(seconds, |n, unit| match unit {
        Part::Days => format!("{}d", n as u64),
        Part::Hours => format!("{}h", n as u64),
        Part::Minutes => format!("{}m", n as u64),
        Part::Seconds if n < 10.0 => format!("{:.1}s", n),
        Part::Seconds => format!("{}s", n.round() as u64),
    })
}

/// Full-word form: `1 day 2 hours 3 minutes`, `4.5 seconds`.
pub fn format_duration_full(seconds: f64) -> String {
    render(seconds, |n, unit| {
        let (one, many) = match unit {
            Part::Days => ("day", "days"),
            Part::Hours => ("hour", "hours"),
            Part::Minutes => ("minute", "minutes"),
            Part::Seconds => ("second", "seconds"),
        };
        if matches!(unit, Part::Seconds) && n < 10.0 && n.fract() != 0.0 {
            return format!("{:.1} {}", n, many);
        }
        let whole = if matches!(unit, Part::Seconds) {
            n.round() as u64
        } else {
            n as u64
        };
        format!("{} {}", whole, if whole == 1 { one } else { many })
    })
}

#[derive(Clone, Copy)]
enum Part {
    Days,
    Hours,
    Minutes,
    Seconds,
}

fn render(seconds: f64, fmt: impl Fn(f64, Part) -> String) -> String {
    if !seconds.is_finite() {
        return seconds.to_string();
    }
    // Round before splitting so carries reach the larger units.
    let tenths = (seconds.abs() * 10.0).round() / 10.0;
    let total = if tenths < 10.0 { tenths } else { seconds.abs().round() };
    let negative = seconds < 0.0 && total > 0.0;

    let days = (total / 86_400.0).floor();
    let rem = total - days * 86_400.0;
    let hours = (rem / 3_600.0).floor();
    let rem = rem - hours * 3_600.0;
    let minutes = (rem / 60.0).floor();
    let secs = rem - minutes * 60.0;

    let mut parts = Vec::new();
    if days > 0.0 {
        parts.push(fmt(days, Part::Days));
    }
    if hours > 0.0 || days > 0.0 {
        parts.push(fmt(hours, Part::Hours));
    }
    if minutes > 0.0 || hours > 0.0 || days > 0.0 {
        parts.push(fmt(minutes, Part::Minutes));
    }
    if parts.is_empty() || (days == 0.0 && hours == 0.0) {
        parts.push(fmt(secs, Part::Seconds));
    }

    let joined = parts.join(" ");
    if negative {
        format!("-{}", joined)
    } else {
        joined
    }
}

/// Parse seconds from a plain number, `HH:MM:SS`, `MM:SS` or a component
/// string such as `1d 2h 30m 45s`.
pub fn parse_duration(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(n) = value.parse::<f64>() {
        return n.is_finite().then_some(n);
    }

    if value.contains(':') {
        let parts: Option<Vec<f64>> = value.split(':').map(|p| p.trim().parse::<f64>().ok()).collect();
        return match parts?.as_slice() {
            [h, m, s] => Some(h * 3600.0 + m * 60.0 + s),
            [m, s] => Some(m * 60.0 + s),
            _ => None,
        };
    }

    parse_components(value)
}

fn component_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("(?i){}", COMPONENT)).ok())
        .as_ref()
}

fn components_only_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?i)^\s*(?:{}\s*)+$", COMPONENT)).ok())
        .as_ref()
}

fn parse_components(value: &str) -> Option<f64> {
    if !components_only_regex()?.is_match(value) {
        return None;
    }

    let mut total = 0.0;
    for caps in component_regex()?.captures_iter(value) {
        let n: f64 = caps[1].parse().ok()?;
        let factor = match caps[2].to_ascii_lowercase().as_str() {
            "d" | "day" | "days" => 86_400.0,
            "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0,
            "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
            _ => 1.0,
        };
        total += n * factor;
    }
    Some(total)
}
