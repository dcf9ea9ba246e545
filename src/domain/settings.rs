//! User preferences bag.
//!
//! [`Settings`] is a flat bag of independently validated preferences. Every field
//! owns a normalize function (clamp, trim, or whitelist) and persisted values are
//! read field-by-field: a malformed or out-of-range field falls back to its own
//! default without rejecting the rest of the bag.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

const CARD_WIDTH: RangeInclusive<u32> = 60..=400;
const CARD_HEIGHT: RangeInclusive<u32> = 60..=400;
const SIDEBAR_WIDTH: RangeInclusive<u32> = 80..=400;
const FONT_SIZE: RangeInclusive<u32> = 10..=24;
const CARD_FONT_SIZE: RangeInclusive<u32> = 8..=20;
const CARD_ICON_SCALE: RangeInclusive<u32> = 16..=128;

/// Accepted theme names.
pub const THEMES: [&str; 3] = ["dark", "light", "system"];

/// Launcher preferences.
///
/// Serialized with the camelCase keys of the persisted schema. Deserialization
/// never fails on a JSON object: each key is validated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub language: String,
    pub card_width: u32,
    pub card_height: u32,
    pub toggle_hotkey: String,
    pub theme: String,
    pub sidebar_width: u32,
    pub font_family: String,
    pub font_size: u32,
    pub card_font_size: u32,
    pub card_icon_scale: u32,
    pub dbl_click_blank_to_hide: bool,
    pub always_on_top: bool,
    pub hide_on_startup: bool,
    pub use_relative_path: bool,
    pub enable_group_drag_sort: bool,
    pub auto_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: String::new(),
            card_width: 120,
            card_height: 96,
            toggle_hotkey: String::new(),
            theme: "dark".to_string(),
            sidebar_width: 140,
            font_family: "maye".to_string(),
            font_size: 13,
            card_font_size: 11,
            card_icon_scale: 56,
            dbl_click_blank_to_hide: true,
            always_on_top: true,
            hide_on_startup: false,
            use_relative_path: false,
            enable_group_drag_sort: false,
            auto_start: false,
        }
    }
}

impl Settings {
    /// Builds settings from an arbitrary JSON value.
    ///
    /// Non-object input yields the defaults. Inside an object every field is
    /// parsed and normalized independently.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickdock::domain::Settings;
    ///
    /// let raw = serde_json::json!({ "cardWidth": 9000, "theme": 42, "alwaysOnTop": false });
    /// let settings = Settings::from_value(&raw);
    /// assert_eq!(settings.card_width, 400);
    /// assert_eq!(settings.theme, "dark");
    /// assert!(!settings.always_on_top);
    /// ```
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::debug!("settings payload is not an object, using defaults");
            return Self::default();
        };
        let d = Self::default();

        Self {
            language: string_field(obj, &["language"]).map_or(d.language, |s| s.trim().to_string()),
            card_width: clamped(obj, &["cardWidth", "cardSize"], &CARD_WIDTH, d.card_width),
            card_height: clamped(obj, &["cardHeight"], &CARD_HEIGHT, d.card_height),
            toggle_hotkey: string_field(obj, &["toggleHotkey"])
                .map_or(d.toggle_hotkey, |s| normalize_hotkey(&s)),
            theme: string_field(obj, &["theme"])
                .and_then(|s| normalize_theme(&s))
                .unwrap_or(d.theme),
            sidebar_width: clamped(obj, &["sidebarWidth"], &SIDEBAR_WIDTH, d.sidebar_width),
            font_family: string_field(obj, &["fontFamily"])
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.font_family),
            font_size: clamped(obj, &["fontSize"], &FONT_SIZE, d.font_size),
            card_font_size: clamped(obj, &["cardFontSize"], &CARD_FONT_SIZE, d.card_font_size),
            card_icon_scale: clamped(obj, &["cardIconScale"], &CARD_ICON_SCALE, d.card_icon_scale),
            dbl_click_blank_to_hide: bool_field(obj, "dblClickBlankToHide")
                .unwrap_or(d.dbl_click_blank_to_hide),
            always_on_top: bool_field(obj, "alwaysOnTop").unwrap_or(d.always_on_top),
            hide_on_startup: bool_field(obj, "hideOnStartup").unwrap_or(d.hide_on_startup),
            use_relative_path: bool_field(obj, "useRelativePath").unwrap_or(d.use_relative_path),
            enable_group_drag_sort: bool_field(obj, "enableGroupDragSort")
                .unwrap_or(d.enable_group_drag_sort),
            auto_start: bool_field(obj, "autoStart").unwrap_or(d.auto_start),
        }
    }

    /// Re-applies every field's normalization rule.
    ///
    /// Used on settings submitted by the view, which bypass deserialization.
    #[must_use]
    pub fn normalized(self) -> Self {
        let d = Self::default();
        Self {
            language: self.language.trim().to_string(),
            card_width: clamp(self.card_width, &CARD_WIDTH),
            card_height: clamp(self.card_height, &CARD_HEIGHT),
            toggle_hotkey: normalize_hotkey(&self.toggle_hotkey),
            theme: normalize_theme(&self.theme).unwrap_or(d.theme),
            sidebar_width: clamp(self.sidebar_width, &SIDEBAR_WIDTH),
            font_family: Some(self.font_family.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.font_family),
            font_size: clamp(self.font_size, &FONT_SIZE),
            card_font_size: clamp(self.card_font_size, &CARD_FONT_SIZE),
            card_icon_scale: clamp(self.card_icon_scale, &CARD_ICON_SCALE),
            ..self
        }
    }
}

impl<'de> Deserialize<'de> for Settings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Trims a hotkey combination; blank means "no hotkey".
#[must_use]
pub fn normalize_hotkey(raw: &str) -> String {
    raw.trim().to_string()
}

fn normalize_theme(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    THEMES.contains(&lower.as_str()).then_some(lower)
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

fn clamped(obj: &Map<String, Value>, keys: &[&str], range: &RangeInclusive<u32>, default: u32) -> u32 {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .map_or(default, |n| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let floored = n.floor().clamp(f64::from(*range.start()), f64::from(*range.end())) as u32;
            floored
        })
}

fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}
