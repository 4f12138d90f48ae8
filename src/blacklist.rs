//! Precompiled substring blacklist.
//!
//! Patterns are deduplicated, escaped and compiled into one [`RegexSet`],
//! so a topic is scanned once regardless of how many patterns are
//! configured. Semantics are plain substring containment.

use regex::RegexSet;

/// Noisy log metrics published by several vehicle modules.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "battery.log",
    "power.log",
    "trip.log",
    "gps.log",
    "xrt.log",
];

#[derive(Debug, Clone)]
pub struct Blacklist {
    patterns: Vec<String>,
    set: RegexSet,
}

impl Blacklist {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for p in patterns {
            let p = p.as_ref().trim();
            if !p.is_empty() && !unique.iter().any(|u| u == p) {
                unique.push(p.to_string());
            }
        }

        let set = RegexSet::new(unique.iter().map(|p| regex::escape(p)))?;
        Ok(Self {
            patterns: unique,
            set,
        })
    }

    /// Matcher with [`DEFAULT_BLACKLIST`].
    pub fn with_defaults() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_BLACKLIST)
    }

    /// First configured pattern contained in `haystack`, if any.
    pub fn find(&self, haystack: &str) -> Option<&str> {
        if self.patterns.is_empty() {
            return None;
        }
        self.set
            .matches(haystack)
            .iter()
            .next()
            .map(|idx| self.patterns[idx].as_str())
    }

    pub fn is_blacklisted(&self, haystack: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(haystack)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_semantics() {
        let bl = Blacklist::new(["log", "xrt.debug"]).unwrap();
        assert_eq!(bl.find("v.b.log.cells"), Some("log"));
        assert_eq!(bl.find("ovms/a/car/metric/xrt/debug"), None);
        assert_eq!(bl.find("xrt.debug.level"), Some("xrt.debug"));
        assert!(!bl.is_blacklisted("v.b.soc"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        // '.' must not match any byte, '(' must not open a group
        let bl = Blacklist::new(["v.b", "x(1)", "a+b"]).unwrap();
        assert!(!bl.is_blacklisted("vxb.soc"));
        assert!(bl.is_blacklisted("ovms.v.b.soc"));
        assert_eq!(bl.find("cell.x(1).temp"), Some("x(1)"));
        assert_eq!(bl.find("a+b"), Some("a+b"));
        assert!(!bl.is_blacklisted("aab"));
    }

    #[test]
    fn test_dedup_and_empty() {
        let bl = Blacklist::new(["a.b", " a.b ", "", "  "]).unwrap();
        assert_eq!(bl.len(), 1);
        let empty = Blacklist::new(Vec::<String>::new()).unwrap();
        assert!(empty.find("anything").is_none());
        assert!(!empty.is_blacklisted("anything"));
        assert!(!Blacklist::default().is_blacklisted("anything"));
    }

    #[test]
    fn test_lowest_index_wins() {
        let bl = Blacklist::new(["v.x", "v.b.c", "b.c"]).unwrap();
        assert_eq!(bl.find("ovms.v.b.c.voltage"), Some("v.b.c"));
    }

    #[test]
    fn test_defaults() {
        let bl = Blacklist::with_defaults().unwrap();
        assert_eq!(bl.len(), DEFAULT_BLACKLIST.len());
        assert!(bl.is_blacklisted("xrt.log.battery"));
        assert!(bl.is_blacklisted("ovms/alice/car1/metric/battery.log"));
        assert!(!bl.is_blacklisted("v.b.soc"));
    }
}
