//! User-facing toolbar options.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigError;
use crate::toolbar::{
    ButtonState, DownloadFormat, HorizontalPosition, ToolbarButton, VerticalPosition,
};

/// Overrides for one toolbar mode.
///
/// Button states sit next to `positions` and `zoomLevel` in the same object:
///
/// ```json
/// { "zoomIn": "disabled", "positions": { "vertical": "top" }, "zoomLevel": "enabled" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeOverrides {
    #[serde(flatten)]
    pub buttons: BTreeMap<ToolbarButton, ButtonState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<PositionOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<ButtonState>,
}

/// Per-axis position overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PositionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalPosition>,
}

impl ModeOverrides {
    /// Extract the valid parts of a mode object. Anything else is ignored.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut overrides = Self::default();
        let Some(obj) = value.as_object() else {
            return overrides;
        };

        for (key, value) in obj {
            match key.as_str() {
                "positions" => {
                    overrides.positions = Some(PositionOverrides {
                        vertical: value.get("vertical").and_then(VerticalPosition::from_value),
                        horizontal: value
                            .get("horizontal")
                            .and_then(HorizontalPosition::from_value),
                    });
                }
                "zoomLevel" => overrides.zoom_level = ButtonState::from_value(value),
                _ => match (ToolbarButton::from_key(key), ButtonState::from_value(value)) {
                    (Some(button), Some(state)) => {
                        overrides.buttons.insert(button, state);
                    }
                    _ => tracing::debug!(key = %key, "Ignoring toolbar override"),
                },
            }
        }
        overrides
    }
}

/// Toolbar customization as supplied by the site author.
///
/// Deserialization is lenient: malformed fields are dropped individually and
/// the rest of the document still applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct MermaidToolbarOptions {
    /// Keep the host's language badge on rendered blocks. Defaults to true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_language_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_format: Option<DownloadFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desktop: Option<ModeOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<ModeOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullscreen: Option<ModeOverrides>,
}

impl MermaidToolbarOptions {
    /// Extract the valid parts of an options object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            show_language_label: obj.get("showLanguageLabel").and_then(Value::as_bool),
            download_format: obj.get("downloadFormat").and_then(DownloadFormat::from_value),
            desktop: obj.get("desktop").map(ModeOverrides::from_value),
            mobile: obj.get("mobile").map(ModeOverrides::from_value),
            fullscreen: obj.get("fullscreen").map(ModeOverrides::from_value),
        }
    }

    /// Parse options from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not JSON at all.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not TOML at all.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or unparsable.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }
}

impl From<Value> for MermaidToolbarOptions {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_str() {
        let options = MermaidToolbarOptions::from_json_str(
            r#"{"showLanguageLabel": false, "desktop": {"copyCode": "disabled"}}"#,
        )
        .unwrap();
        assert_eq!(options.show_language_label, Some(false));
        assert_eq!(
            options.desktop.unwrap().buttons.get(&ToolbarButton::CopyCode),
            Some(&ButtonState::Disabled)
        );
    }

    #[test]
    fn test_from_json_str_rejects_non_json() {
        assert!(matches!(
            MermaidToolbarOptions::from_json_str("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
showLanguageLabel = true
downloadFormat = "png"

[mobile]
zoomIn = "enabled"
zoomOut = "enabled"

[mobile.positions]
horizontal = "left"
"#;
        let options = MermaidToolbarOptions::from_toml_str(toml).unwrap();
        assert_eq!(options.download_format, Some(DownloadFormat::Png));
        let mobile = options.mobile.unwrap();
        assert_eq!(mobile.buttons.len(), 2);
        let positions = mobile.positions.unwrap();
        assert_eq!(positions.horizontal, Some(HorizontalPosition::Left));
        assert_eq!(positions.vertical, None);
    }

    #[test]
    fn test_lenient_field_level() {
        let options = MermaidToolbarOptions::from_value(&json!({
            "desktop": { "zoomIn": "disabled", "zoomOut": 42 },
            "mobile": 7
        }));
        let desktop = options.desktop.unwrap();
        assert_eq!(desktop.buttons.len(), 1);
        assert_eq!(options.mobile, Some(ModeOverrides::default()));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("toolbar.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"downloadFormat": "jpg"}"#)
            .unwrap();
        let options = MermaidToolbarOptions::load(&json_path).unwrap();
        assert_eq!(options.download_format, Some(DownloadFormat::Jpg));

        let toml_path = dir.path().join("toolbar.toml");
        std::fs::write(&toml_path, "showLanguageLabel = false\n").unwrap();
        let options = MermaidToolbarOptions::load(&toml_path).unwrap();
        assert_eq!(options.show_language_label, Some(false));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MermaidToolbarOptions::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_serialize_flattens_buttons() {
        let options = MermaidToolbarOptions::from_value(&json!({
            "fullscreen": { "resetView": "enabled", "zoomLevel": "disabled" }
        }));
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({ "fullscreen": { "resetView": "enabled", "zoomLevel": "disabled" } })
        );
    }
}
