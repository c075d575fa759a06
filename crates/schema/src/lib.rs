//! Preference schema for Quietwin
//!
//! This crate defines the recognized preference keys, their types and
//! compiled-in defaults, the partial-record overlay used when recovering
//! from storage, and the theme token mapping the UI applies on every
//! settings change.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prefs;
pub mod theme;

pub use prefs::{is_valid_notif_time, Font, Icon, PartialPreferences, Preferences, Theme};
