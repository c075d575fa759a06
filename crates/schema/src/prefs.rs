//! User preference record and recovery overlay
//!
//! The full [`Preferences`] record is what the UI observes and what gets
//! persisted; [`PartialPreferences`] is the overlay shape recovered from a
//! storage tier, where any subset of fields may be present.

use serde::{Deserialize, Serialize};

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Bright theme with white background
    Light,
    /// Dark theme with near-black background
    Dark,
    /// Warm off-white theme (the launch default)
    #[default]
    Warm,
}

/// Tray icon variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    /// Warm-tinted icon matching the default theme
    #[default]
    Warm,
    /// Monochrome icon for muted menu bars
    Mono,
}

/// UI font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Font {
    /// Serif default
    #[default]
    Garamond,
    /// System sans-serif stack
    #[serde(rename = "SF Pro")]
    SfPro,
    /// Plain Arial
    Arial,
    /// Inherit whatever the host document uses
    Custom,
}

/// The full user preference record
///
/// Every field has a statically known default; once published the record
/// is never partially undefined. Mutation is whole-record replacement, not
/// field patching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Color theme
    #[serde(default)]
    pub theme: Theme,

    /// Tray icon variant
    #[serde(default)]
    pub icon: Icon,

    /// Daily notification time as "HH:MM" (24-hour)
    #[serde(default = "default_notif_time")]
    pub notif_time: String,

    /// Play a sound with the daily notification
    #[serde(default = "default_true")]
    pub notif_sound: bool,

    /// Global keyboard shortcut for the quick-log window
    #[serde(default = "default_shortcut")]
    pub shortcut: String,

    /// UI font family
    #[serde(default)]
    pub font: Font,

    /// Suggest tags automatically when logging an entry
    #[serde(default = "default_true")]
    pub auto_tag: bool,

    /// Blur entry text until the window is focused
    #[serde(default)]
    pub privacy_lock: bool,

    /// Launch at login
    #[serde(default = "default_true")]
    pub startup: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Warm,
            icon: Icon::Warm,
            notif_time: default_notif_time(),
            notif_sound: true,
            shortcut: default_shortcut(),
            font: Font::Garamond,
            auto_tag: true,
            privacy_lock: false,
            startup: true,
        }
    }
}

impl Preferences {
    /// Apply a recovered overlay on top of this record
    ///
    /// Fields the overlay defines win; fields it leaves out keep the base
    /// value. A malformed `notif_time` in the overlay is discarded rather
    /// than merged.
    pub fn merged(&self, overlay: &PartialPreferences) -> Preferences {
        let mut out = self.clone();
        if let Some(theme) = overlay.theme {
            out.theme = theme;
        }
        if let Some(icon) = overlay.icon {
            out.icon = icon;
        }
        if let Some(notif_time) = &overlay.notif_time {
            if is_valid_notif_time(notif_time) {
                out.notif_time = notif_time.clone();
            }
        }
        if let Some(notif_sound) = overlay.notif_sound {
            out.notif_sound = notif_sound;
        }
        if let Some(shortcut) = &overlay.shortcut {
            out.shortcut = shortcut.clone();
        }
        if let Some(font) = overlay.font {
            out.font = font;
        }
        if let Some(auto_tag) = overlay.auto_tag {
            out.auto_tag = auto_tag;
        }
        if let Some(privacy_lock) = overlay.privacy_lock {
            out.privacy_lock = privacy_lock;
        }
        if let Some(startup) = overlay.startup {
            out.startup = startup;
        }
        out
    }
}

/// Partial preference record recovered from a storage tier
///
/// All fields are optional; unknown keys in the stored payload are
/// ignored on deserialization rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PartialPreferences {
    /// Color theme, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,

    /// Tray icon variant, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,

    /// Notification time, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notif_time: Option<String>,

    /// Notification sound toggle, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notif_sound: Option<bool>,

    /// Quick-log shortcut, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,

    /// Font family, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,

    /// Auto-tag toggle, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_tag: Option<bool>,

    /// Privacy lock toggle, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_lock: Option<bool>,

    /// Launch-at-login toggle, if stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<bool>,
}

impl From<&Preferences> for PartialPreferences {
    fn from(prefs: &Preferences) -> Self {
        Self {
            theme: Some(prefs.theme),
            icon: Some(prefs.icon),
            notif_time: Some(prefs.notif_time.clone()),
            notif_sound: Some(prefs.notif_sound),
            shortcut: Some(prefs.shortcut.clone()),
            font: Some(prefs.font),
            auto_tag: Some(prefs.auto_tag),
            privacy_lock: Some(prefs.privacy_lock),
            startup: Some(prefs.startup),
        }
    }
}

/// Validate a notification time string
///
/// Requires the "HH:MM" shape and an in-range hour (00-23) and minute
/// (00-59), so `"9am"` and `"25:99"` are both rejected.
pub fn is_valid_notif_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return false;
    }
    let (Ok(hour), Ok(minute)) = (value[..2].parse::<u8>(), value[3..].parse::<u8>()) else {
        return false;
    };
    hour < 24 && minute < 60
}

fn default_notif_time() -> String {
    "20:00".to_string()
}

fn default_shortcut() -> String {
    "Cmd+Alt+Shift+W".to_string()
}

fn default_true() -> bool {
    true
}
