//! The metadata shape both extraction strategies produce.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata field names recognized by both strategies.
///
/// This is also the allow-list applied to exec reports: keys outside
/// this set are dropped when a report is converted into `Metadata`.
pub const FIELDS: &[&str] = &[
    "name",
    "version",
    "python_requires",
    "install_requires",
    "extras_require",
];

/// Package metadata extracted from a setup.py script.
///
/// All five fields are always present as JSON keys; unresolved single
/// strings serialize as `null` and unresolved collections as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub python_requires: Option<String>,
    #[serde(default)]
    pub install_requires: Vec<String>,
    #[serde(default)]
    pub extras_require: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    /// True when no field resolved to anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.version.is_none()
            && self.python_requires.is_none()
            && self.install_requires.is_empty()
            && self.extras_require.is_empty()
    }

    /// Build metadata from a distribution report mapping (the JSON the
    /// exec driver produces, or any externally supplied report of the
    /// same shape).
    ///
    /// Keys outside [`FIELDS`] are ignored, and values equal to the
    /// distutils "unset" sentinels (`"UNKNOWN"`, `null`, `["UNKNOWN"]`)
    /// are dropped before conversion.
    pub fn from_report(report: &serde_json::Map<String, Value>) -> Self {
        let mut metadata = Self::default();

        for (key, value) in report {
            if !FIELDS.contains(&key.as_str()) || is_unset_sentinel(value) {
                continue;
            }
            match key.as_str() {
                "name" => metadata.name = as_string(value),
                "version" => metadata.version = as_string(value),
                "python_requires" => metadata.python_requires = as_string(value),
                "install_requires" => metadata.install_requires = as_string_list(value),
                "extras_require" => {
                    if let Value::Object(map) = value {
                        for (extra, requires) in map {
                            metadata
                                .extras_require
                                .insert(extra.clone(), as_string_list(requires));
                        }
                    }
                }
                _ => {}
            }
        }

        metadata
    }
}

/// Check for the distutils "value never set" markers.
fn is_unset_sentinel(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s == "UNKNOWN",
        Value::Array(items) => {
            items.len() == 1 && items[0] == Value::String("UNKNOWN".to_string())
        }
        _ => false,
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.to_string())
}

fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        // requirements occasionally arrive as one newline-separated string
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_report_basic() {
        let report = json!({
            "name": "demo",
            "version": "1.2.3",
            "install_requires": ["requests>=2.0", "flask"],
        });

        let metadata = Metadata::from_report(report.as_object().unwrap());
        assert_eq!(metadata.name.as_deref(), Some("demo"));
        assert_eq!(metadata.version.as_deref(), Some("1.2.3"));
        assert_eq!(metadata.install_requires, vec!["requests>=2.0", "flask"]);
        assert!(metadata.python_requires.is_none());
        assert!(metadata.extras_require.is_empty());
    }

    #[test]
    fn test_from_report_drops_sentinels() {
        let report = json!({
            "name": "UNKNOWN",
            "version": null,
            "install_requires": ["UNKNOWN"],
            "python_requires": ">=3.7",
        });

        let metadata = Metadata::from_report(report.as_object().unwrap());
        assert!(metadata.name.is_none());
        assert!(metadata.version.is_none());
        assert!(metadata.install_requires.is_empty());
        assert_eq!(metadata.python_requires.as_deref(), Some(">=3.7"));
    }

    #[test]
    fn test_from_report_ignores_unknown_keys() {
        let report = json!({
            "name": "demo",
            "author": "somebody",
            "entry_points": {"console_scripts": ["demo = demo:main"]},
        });

        let metadata = Metadata::from_report(report.as_object().unwrap());
        assert_eq!(metadata.name.as_deref(), Some("demo"));
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_from_report_extras() {
        let report = json!({
            "extras_require": {"test": ["pytest", "coverage"], "docs": ["sphinx"]},
        });

        let metadata = Metadata::from_report(report.as_object().unwrap());
        assert_eq!(
            metadata.extras_require.get("test").unwrap(),
            &vec!["pytest".to_string(), "coverage".to_string()]
        );
        assert_eq!(
            metadata.extras_require.get("docs").unwrap(),
            &vec!["sphinx".to_string()]
        );
    }

    #[test]
    fn test_serialized_shape_keeps_all_keys() {
        let metadata = Metadata::default();
        let value = serde_json::to_value(&metadata).unwrap();
        let object = value.as_object().unwrap();

        for field in FIELDS {
            assert!(object.contains_key(*field), "missing key {}", field);
        }
    }
}
