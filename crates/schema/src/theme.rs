//! Theme token mapping
//!
//! Pure lookup from the two visual preference fields to the CSS custom
//! properties and font stack the webview applies. Consumed by the UI from
//! a store subscription; carries no state of its own.

use crate::prefs::{Font, Theme};

/// CSS custom properties for a theme
pub fn theme_vars(theme: Theme) -> &'static [(&'static str, &'static str)] {
    match theme {
        Theme::Light => &[("--background", "#fff"), ("--text", "#222")],
        Theme::Dark => &[("--background", "#111"), ("--text", "#fff")],
        Theme::Warm => &[("--background", "#fff"), ("--text", "#CC785C")],
    }
}

/// Font-family stack for a font preference
pub fn font_stack(font: Font) -> &'static str {
    match font {
        Font::Garamond => "'Garamond', serif",
        Font::SfPro => {
            "'SF Pro', 'San Francisco', -apple-system, BlinkMacSystemFont, \
             'Segoe UI', Roboto, Arial, sans-serif"
        }
        Font::Arial => "Arial, sans-serif",
        Font::Custom => "inherit",
    }
}
