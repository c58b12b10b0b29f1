//! Linkshelf TUI
//!
//! Terminal page for saving and browsing links.
//!
//! ## Layout
//!
//! - Top: add-link form (Title, Description, Link)
//! - Middle: Recent Links panel
//! - Bottom: status bar / search prompt
//!
//! Search results and the full collection open in a popup.
//!
//! ## Keys
//!
//! - Tab/Shift-Tab: Move between form fields
//! - Enter: Save link (form) / Open link (popup)
//! - Ctrl-f: Search by title
//! - Ctrl-a: All saved links
//! - Ctrl-t: Toggle dark/light theme
//! - j/k, d: Move and delete inside a popup
//! - F1: Help
//! - Esc: Close popup / Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkshelf_core::{load_theme, Config, KeyValueStorage, LinkRepository};

use app::{App, InputMode};

/// Run the TUI application
pub fn run(config: &Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SHELF_LOG is set)
    init_tui_logging(config);

    // The theme slot shares the namespace with the link slot
    let storage = config.open_storage();
    let mut theme_storage = storage.clone();
    let mut repo = LinkRepository::open(storage);

    let mut app = App::new(&repo, load_theme(&theme_storage), config.recent_count);
    info!("Opened terminal page with {} links", repo.len());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Run app
    let result = run_app(&mut terminal, &mut app, &mut repo, &mut theme_storage);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_app<B: Backend, S: KeyValueStorage, K: KeyValueStorage>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    repo: &mut LinkRepository<S>,
    theme_storage: &mut K,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Short poll so expired notifications disappear without a keypress
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                handle_key(app, repo, theme_storage, key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Dispatch a key press to the active part of the page
fn handle_key<S: KeyValueStorage, K: KeyValueStorage>(
    app: &mut App,
    repo: &mut LinkRepository<S>,
    theme_storage: &mut K,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('t') if ctrl => {
            app.toggle_theme(theme_storage);
            return;
        }
        KeyCode::F(1) => {
            app.toggle_help();
            return;
        }
        _ => {}
    }

    if app.popup.is_some() {
        handle_popup_mode(app, repo, code);
        return;
    }

    match app.input_mode {
        InputMode::Form => handle_form_mode(app, repo, code, ctrl),
        InputMode::Search => handle_search_mode(app, repo, code, ctrl),
    }
}

/// Handle key events while typing into the form
fn handle_form_mode<S: KeyValueStorage>(
    app: &mut App,
    repo: &mut LinkRepository<S>,
    code: KeyCode,
    ctrl: bool,
) {
    match code {
        KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('f') if ctrl => {
            app.enter_search_mode();
        }
        KeyCode::Char('a') if ctrl => {
            app.show_all(repo);
        }
        KeyCode::Tab | KeyCode::Down => {
            app.next_field();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.prev_field();
        }
        KeyCode::Enter => {
            app.submit_form(repo);
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        KeyCode::Char(c) if !ctrl => {
            app.insert_char(c);
        }
        _ => {}
    }
}

/// Handle key events at the search prompt
fn handle_search_mode<S: KeyValueStorage>(
    app: &mut App,
    repo: &LinkRepository<S>,
    code: KeyCode,
    ctrl: bool,
) {
    match code {
        KeyCode::Esc => {
            app.cancel_search();
        }
        KeyCode::Enter => {
            app.run_search(repo);
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        KeyCode::Char(c) if !ctrl => {
            app.insert_char(c);
        }
        _ => {}
    }
}

/// Handle key events while a popup is open
fn handle_popup_mode<S: KeyValueStorage>(
    app: &mut App,
    repo: &mut LinkRepository<S>,
    code: KeyCode,
) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_popup();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.delete_selected(repo);
        }
        KeyCode::Enter => {
            if let Some(url) = app.selected_link().map(|l| l.url.clone()) {
                match open::that(&url) {
                    Ok(()) => app.set_status(format!("Opened {}", url)),
                    Err(e) => app.set_status(format!("⚠ Could not open {}: {}", url, e)),
                }
            }
        }
        _ => {}
    }
}

/// Initialize file-based logging for TUI mode
///
/// Only logs if SHELF_LOG environment variable is set.
/// Logs go to the configured log file (default: {data_dir}/debug.log)
fn init_tui_logging(config: &Config) {
    // Only log if SHELF_LOG is set
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Create log file
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "linkshelf_core={},shelf={}",
        log_level, log_level
    ));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
