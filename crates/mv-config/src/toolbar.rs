//! Toolbar configuration resolution.
//!
//! Every mode (desktop, mobile, fullscreen) has a full default configuration.
//! User overrides are merged per button and per position axis; anything that
//! does not parse as a valid value is ignored rather than rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::{MermaidToolbarOptions, ModeOverrides};

/// Every button that can appear in the toolbar, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolbarButton {
    ZoomIn,
    ZoomOut,
    ResetView,
    CopyCode,
    ToggleFullscreen,
}

impl ToolbarButton {
    /// All buttons in canonical order.
    pub const ALL: [Self; 5] = [
        Self::ZoomIn,
        Self::ZoomOut,
        Self::ResetView,
        Self::CopyCode,
        Self::ToggleFullscreen,
    ];

    /// Key used in configuration objects.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoomIn",
            Self::ZoomOut => "zoomOut",
            Self::ResetView => "resetView",
            Self::CopyCode => "copyCode",
            Self::ToggleFullscreen => "toggleFullscreen",
        }
    }

    /// Parse a configuration key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.key() == key)
    }
}

/// Runtime state of a toolbar button or the zoom level indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    Enabled,
    Disabled,
}

impl ButtonState {
    /// Parse a JSON value, accepting only `"enabled"` and `"disabled"`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// Vertical toolbar anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    Top,
    #[default]
    Bottom,
}

impl VerticalPosition {
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Horizontal toolbar anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalPosition {
    Left,
    #[default]
    Right,
}

impl HorizontalPosition {
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Corner of the diagram the toolbar is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positions {
    pub vertical: VerticalPosition,
    pub horizontal: HorizontalPosition,
}

/// File format offered by the download action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    #[default]
    Svg,
    Png,
    Jpg,
}

impl DownloadFormat {
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpg),
            _ => None,
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }
}

/// Toolbar mode a diagram is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarMode {
    Desktop,
    Mobile,
    Fullscreen,
}

impl ToolbarMode {
    /// Pick the active mode. Fullscreen takes precedence over mobile.
    #[must_use]
    pub fn select(is_mobile: bool, is_fullscreen: bool) -> Self {
        if is_fullscreen {
            Self::Fullscreen
        } else if is_mobile {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Built-in defaults for this mode.
    #[must_use]
    pub fn defaults(self) -> ModeConfig {
        use ButtonState::{Disabled, Enabled};
        use ToolbarButton::{CopyCode, ResetView, ToggleFullscreen, ZoomIn, ZoomOut};

        let states = match self {
            Self::Desktop => [Enabled, Enabled, Enabled, Enabled, Enabled],
            Self::Mobile => [Disabled, Disabled, Enabled, Enabled, Enabled],
            Self::Fullscreen => [Disabled, Disabled, Disabled, Disabled, Enabled],
        };
        let buttons = [ZoomIn, ZoomOut, ResetView, CopyCode, ToggleFullscreen]
            .into_iter()
            .zip(states)
            .collect();

        ModeConfig {
            buttons,
            positions: Positions::default(),
            zoom_level: Enabled,
        }
    }
}

/// Fully resolved configuration of one toolbar mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    pub buttons: BTreeMap<ToolbarButton, ButtonState>,
    pub positions: Positions,
    pub zoom_level: ButtonState,
}

impl ModeConfig {
    /// State of a button. Buttons missing from the map count as disabled.
    #[must_use]
    pub fn button(&self, button: ToolbarButton) -> ButtonState {
        self.buttons
            .get(&button)
            .copied()
            .unwrap_or(ButtonState::Disabled)
    }

    #[must_use]
    pub fn is_enabled(&self, button: ToolbarButton) -> bool {
        self.button(button).is_enabled()
    }

    /// Enabled buttons in canonical order.
    #[must_use]
    pub fn enabled_buttons(&self) -> Vec<ToolbarButton> {
        ToolbarButton::ALL
            .into_iter()
            .filter(|&button| self.is_enabled(button))
            .collect()
    }

    /// Whether the zoom percentage indicator is shown.
    #[must_use]
    pub fn shows_zoom_level(&self) -> bool {
        self.zoom_level.is_enabled()
    }

    fn merge(&self, overrides: Option<&ModeOverrides>) -> Self {
        let Some(overrides) = overrides else {
            return self.clone();
        };

        let mut buttons = self.buttons.clone();
        buttons.extend(overrides.buttons.iter().map(|(&k, &v)| (k, v)));

        let axis = overrides.positions.unwrap_or_default();
        let positions = Positions {
            vertical: axis.vertical.unwrap_or(self.positions.vertical),
            horizontal: axis.horizontal.unwrap_or(self.positions.horizontal),
        };

        Self {
            buttons,
            positions,
            zoom_level: overrides.zoom_level.unwrap_or(self.zoom_level),
        }
    }
}

/// Toolbar configuration with every mode fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedToolbarConfig {
    pub desktop: ModeConfig,
    pub mobile: ModeConfig,
    pub fullscreen: ModeConfig,
    pub show_language_label: bool,
    #[serde(default)]
    pub download_format: DownloadFormat,
}

impl Default for ResolvedToolbarConfig {
    fn default() -> Self {
        resolve(None)
    }
}

impl ResolvedToolbarConfig {
    /// Configuration of one mode.
    #[must_use]
    pub fn mode(&self, mode: ToolbarMode) -> &ModeConfig {
        match mode {
            ToolbarMode::Desktop => &self.desktop,
            ToolbarMode::Mobile => &self.mobile,
            ToolbarMode::Fullscreen => &self.fullscreen,
        }
    }
}

/// Merge user overrides with the defaults of every mode.
///
/// Pure and total: the same input always yields the same configuration and
/// no default button key is ever dropped.
#[must_use]
pub fn resolve(overrides: Option<&MermaidToolbarOptions>) -> ResolvedToolbarConfig {
    ResolvedToolbarConfig {
        desktop: ToolbarMode::Desktop
            .defaults()
            .merge(overrides.and_then(|o| o.desktop.as_ref())),
        mobile: ToolbarMode::Mobile
            .defaults()
            .merge(overrides.and_then(|o| o.mobile.as_ref())),
        fullscreen: ToolbarMode::Fullscreen
            .defaults()
            .merge(overrides.and_then(|o| o.fullscreen.as_ref())),
        show_language_label: overrides
            .and_then(|o| o.show_language_label)
            .unwrap_or(true),
        download_format: overrides
            .and_then(|o| o.download_format)
            .unwrap_or_default(),
    }
}

/// Whether a value already has the resolved shape.
///
/// True iff every mode object carries `buttons`, `positions`, and `zoomLevel`
/// and `showLanguageLabel` is a boolean.
#[must_use]
pub fn is_resolved_toolbar_config(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let has_mode = |key: &str| {
        obj.get(key)
            .and_then(Value::as_object)
            .is_some_and(|mode| {
                ["buttons", "positions", "zoomLevel"]
                    .iter()
                    .all(|field| mode.contains_key(*field))
            })
    };
    has_mode("desktop")
        && has_mode("mobile")
        && has_mode("fullscreen")
        && obj.get("showLanguageLabel").is_some_and(Value::is_boolean)
}

/// Toolbar configuration as accepted from callers: raw overrides or an
/// already resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarInput {
    Overrides(MermaidToolbarOptions),
    Resolved(ResolvedToolbarConfig),
}

impl ToolbarInput {
    /// Classify an arbitrary JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        if is_resolved_toolbar_config(&value) {
            match serde_json::from_value::<ResolvedToolbarConfig>(value.clone()) {
                Ok(resolved) => return Self::Resolved(resolved),
                Err(err) => {
                    tracing::debug!(error = %err, "Resolved-shaped toolbar config failed to parse, treating as overrides");
                }
            }
        }
        Self::Overrides(MermaidToolbarOptions::from_value(&value))
    }

    /// Produce a resolved configuration.
    #[must_use]
    pub fn into_resolved(self) -> ResolvedToolbarConfig {
        match self {
            Self::Overrides(overrides) => resolve(Some(&overrides)),
            Self::Resolved(resolved) => resolved,
        }
    }
}

impl From<MermaidToolbarOptions> for ToolbarInput {
    fn from(options: MermaidToolbarOptions) -> Self {
        Self::Overrides(options)
    }
}

impl From<ResolvedToolbarConfig> for ToolbarInput {
    fn from(config: ResolvedToolbarConfig) -> Self {
        Self::Resolved(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_table() {
        let config = resolve(None);
        assert_eq!(
            config.desktop.enabled_buttons(),
            ToolbarButton::ALL.to_vec()
        );
        assert_eq!(
            config.mobile.enabled_buttons(),
            vec![
                ToolbarButton::ResetView,
                ToolbarButton::CopyCode,
                ToolbarButton::ToggleFullscreen
            ]
        );
        assert_eq!(
            config.fullscreen.enabled_buttons(),
            vec![ToolbarButton::ToggleFullscreen]
        );
        for mode in [&config.desktop, &config.mobile, &config.fullscreen] {
            assert_eq!(mode.positions, Positions::default());
            assert!(mode.shows_zoom_level());
        }
        assert!(config.show_language_label);
        assert_eq!(config.download_format, DownloadFormat::Svg);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        assert_eq!(resolve(None), resolve(None));
        assert_eq!(resolve(None), ResolvedToolbarConfig::default());
        assert_eq!(resolve(Some(&MermaidToolbarOptions::default())), resolve(None));
    }

    #[test]
    fn test_overrides_merge_per_button_and_axis() {
        let options = MermaidToolbarOptions::from_value(&json!({
            "showLanguageLabel": false,
            "mobile": {
                "zoomIn": "enabled",
                "positions": { "vertical": "top" },
                "zoomLevel": "disabled"
            },
            "fullscreen": { "copyCode": "enabled" }
        }));
        let config = resolve(Some(&options));

        assert!(!config.show_language_label);
        assert!(config.mobile.is_enabled(ToolbarButton::ZoomIn));
        assert!(!config.mobile.is_enabled(ToolbarButton::ZoomOut));
        assert_eq!(config.mobile.positions.vertical, VerticalPosition::Top);
        assert_eq!(config.mobile.positions.horizontal, HorizontalPosition::Right);
        assert!(!config.mobile.shows_zoom_level());
        assert!(config.fullscreen.is_enabled(ToolbarButton::CopyCode));
        assert_eq!(config.desktop, ToolbarMode::Desktop.defaults());
    }

    #[test]
    fn test_invalid_values_ignored() {
        let options = MermaidToolbarOptions::from_value(&json!({
            "showLanguageLabel": "nope",
            "downloadFormat": "gif",
            "desktop": {
                "zoomIn": "maybe",
                "sparkle": "enabled",
                "positions": { "vertical": "middle", "horizontal": "left" },
                "zoomLevel": 3
            }
        }));
        let config = resolve(Some(&options));

        assert!(config.show_language_label);
        assert_eq!(config.download_format, DownloadFormat::Svg);
        assert!(config.desktop.is_enabled(ToolbarButton::ZoomIn));
        assert_eq!(config.desktop.positions.vertical, VerticalPosition::Bottom);
        assert_eq!(config.desktop.positions.horizontal, HorizontalPosition::Left);
        assert!(config.desktop.shows_zoom_level());
    }

    #[test]
    fn test_resolve_never_drops_button_keys() {
        let samples = [
            json!(null),
            json!({}),
            json!({ "desktop": { "zoomIn": "disabled" } }),
            json!({ "mobile": "garbage", "fullscreen": [] }),
            json!({ "desktop": { "toggleFullscreen": "disabled", "copyCode": "disabled" } }),
        ];
        for sample in samples {
            let config = resolve(Some(&MermaidToolbarOptions::from_value(&sample)));
            for mode in [&config.desktop, &config.mobile, &config.fullscreen] {
                for button in ToolbarButton::ALL {
                    assert!(mode.buttons.contains_key(&button), "{sample} lost {button:?}");
                }
            }
        }
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(ToolbarMode::select(false, false), ToolbarMode::Desktop);
        assert_eq!(ToolbarMode::select(true, false), ToolbarMode::Mobile);
        assert_eq!(ToolbarMode::select(true, true), ToolbarMode::Fullscreen);
        assert_eq!(ToolbarMode::select(false, true), ToolbarMode::Fullscreen);
    }

    #[test]
    fn test_is_resolved_shape() {
        let resolved = serde_json::to_value(resolve(None)).unwrap();
        assert!(is_resolved_toolbar_config(&resolved));

        assert!(!is_resolved_toolbar_config(&json!({ "desktop": { "zoomIn": "enabled" } })));
        assert!(!is_resolved_toolbar_config(&json!(null)));

        let mut missing_label = resolved.clone();
        missing_label["showLanguageLabel"] = json!("yes");
        assert!(!is_resolved_toolbar_config(&missing_label));

        let mut missing_mode_field = resolved;
        missing_mode_field["mobile"]
            .as_object_mut()
            .unwrap()
            .remove("zoomLevel");
        assert!(!is_resolved_toolbar_config(&missing_mode_field));
    }

    #[test]
    fn test_toolbar_input_accepts_both_shapes() {
        let mut resolved = resolve(None);
        resolved.desktop.positions.vertical = VerticalPosition::Top;
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(
            ToolbarInput::from_value(value),
            ToolbarInput::Resolved(resolved.clone())
        );
        assert_eq!(
            ToolbarInput::Resolved(resolved.clone()).into_resolved(),
            resolved
        );

        let input = ToolbarInput::from_value(json!({ "desktop": { "zoomOut": "disabled" } }));
        let config = input.into_resolved();
        assert!(!config.desktop.is_enabled(ToolbarButton::ZoomOut));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let value = serde_json::to_value(resolve(None)).unwrap();
        assert_eq!(value["desktop"]["buttons"]["toggleFullscreen"], json!("enabled"));
        assert_eq!(value["mobile"]["zoomLevel"], json!("enabled"));
        assert_eq!(value["fullscreen"]["positions"]["vertical"], json!("bottom"));
        assert_eq!(value["downloadFormat"], json!("svg"));
    }
}
