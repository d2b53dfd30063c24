//! Compiler configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Opaque diagram compiler configuration as a JSON object.
///
/// The runtime only ever merges it; interpretation is left to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MermaidConfig(Map<String, Value>);

impl MermaidConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration the runtime initializes the compiler with before user
    /// settings are applied.
    #[must_use]
    pub fn defaults() -> Self {
        let value = json!({
            "theme": "default",
            "securityLevel": "loose",
            "startOnLoad": false,
            "flowchart": {
                "useMaxWidth": false,
                "htmlLabels": true
            },
            "sequence": {
                "diagramMarginX": 50,
                "diagramMarginY": 10,
                "actorMargin": 50,
                "width": 150,
                "height": 65,
                "boxMargin": 10,
                "boxTextMargin": 5,
                "noteMargin": 10,
                "messageMargin": 35,
                "mirrorActors": true,
                "bottomMarginAdj": 1,
                "useMaxWidth": false,
                "rightAngles": false,
                "showSequenceNumbers": false
            },
            "gantt": {
                "useMaxWidth": false,
                "topPadding": 50,
                "leftPadding": 50,
                "rightPadding": 50,
                "gridLineStartPadding": 35,
                "barHeight": 50,
                "barGap": 40,
                "displayMode": "compact",
                "axisFormat": "%Y-%m-%d",
                "topAxis": false,
                "tickInterval": "day",
                "useWidth": 2048
            },
            "class": {
                "arrowMarkerAbsolute": false,
                "useMaxWidth": false
            },
            "journey": { "useMaxWidth": false },
            "pie": {},
            "c4": {
                "useMaxWidth": false,
                "diagramMarginX": 20,
                "diagramMarginY": 20
            },
            "gitGraph": {
                "useMaxWidth": false,
                "rotateCommitLabel": false,
                "showBranches": true,
                "showCommitLabel": true,
                "mainBranchName": "main"
            }
        });
        Self::from_value(value).unwrap_or_default()
    }

    /// Wrap a JSON value. Returns `None` unless it is an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Configured theme name.
    #[must_use]
    pub fn theme(&self) -> Option<&str> {
        self.get("theme").and_then(Value::as_str)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Shallow merge: top-level keys of `partial` replace ours.
    pub fn merge(&mut self, partial: &Self) {
        for (key, value) in &partial.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Shallow merge into a copy.
    #[must_use]
    pub fn merged(&self, partial: &Self) -> Self {
        let mut merged = self.clone();
        merged.merge(partial);
        merged
    }
}

impl From<Map<String, Value>> for MermaidConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = MermaidConfig::defaults();
        assert_eq!(config.theme(), Some("default"));
        assert_eq!(config.get("securityLevel"), Some(&json!("loose")));
        assert_eq!(config.get("startOnLoad"), Some(&json!(false)));
        for key in ["flowchart", "sequence", "gantt", "class", "journey", "c4", "gitGraph"] {
            assert_eq!(
                config.get(key).and_then(|v| v.get("useMaxWidth")),
                Some(&json!(false)),
                "{key}"
            );
        }
    }

    #[test]
    fn test_merge_is_shallow() {
        let base = MermaidConfig::defaults();
        let user = MermaidConfig::from_value(json!({
            "theme": "dark",
            "flowchart": { "curve": "basis" }
        }))
        .unwrap();

        let merged = base.merged(&user);
        assert_eq!(merged.theme(), Some("dark"));
        // Nested objects are replaced, not merged.
        assert_eq!(merged.get("flowchart"), Some(&json!({ "curve": "basis" })));
        assert_eq!(merged.get("gantt"), base.get("gantt"));
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(MermaidConfig::from_value(json!([1, 2])).is_none());
        assert!(MermaidConfig::from_value(json!({})).unwrap().is_empty());
    }
}
