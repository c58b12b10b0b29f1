//! Theme command handler

use anyhow::Result;
use clap::ValueEnum;

use linkshelf_core::{load_theme, save_theme, KeyValueStorage, Theme};

use crate::output::Output;

/// Requested theme change
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

impl ThemeChoice {
    /// Theme that results from applying this choice to `current`
    fn resolve(self, current: Theme) -> Theme {
        match self {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Toggle => current.toggle(),
        }
    }
}

/// Show the theme, or change it when a choice is given
pub fn run<S: KeyValueStorage>(
    storage: &mut S,
    choice: Option<ThemeChoice>,
    output: &Output,
) -> Result<()> {
    let current = load_theme(storage);

    let Some(choice) = choice else {
        output.print_theme(current);
        return Ok(());
    };

    let theme = choice.resolve(current);
    if let Err(e) = save_theme(storage, theme) {
        output.store_warning(&e);
    }

    output.success(&format!("Theme set to {}", theme));
    Ok(())
}
