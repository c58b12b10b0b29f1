//! Theme preference
//!
//! Stored in its own `theme` slot next to the link collection, as the
//! plain string `dark` or `light`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::storage::{KeyValueStorage, StoreResult};

/// Slot holding the theme preference
pub const THEME_SLOT: &str = "theme";

/// Color scheme of the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("Unknown theme '{0}'. Use 'light' or 'dark'.")]
    Unknown(String),
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ThemeError::Unknown(other.to_string())),
        }
    }
}

/// Read the stored theme, falling back to light
pub fn load_theme<S: KeyValueStorage>(storage: &S) -> Theme {
    match storage.get_item(THEME_SLOT) {
        Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
            warn!("Ignoring stored theme: {}", e);
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!("Could not read theme preference: {}", e);
            Theme::default()
        }
    }
}

/// Persist the theme preference
pub fn save_theme<S: KeyValueStorage>(storage: &mut S, theme: Theme) -> StoreResult<()> {
    storage.set_item(THEME_SLOT, theme.as_str())
}
