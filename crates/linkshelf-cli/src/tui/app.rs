//! Application state and logic

use std::time::{Duration, Instant};

use linkshelf_core::{save_theme, KeyValueStorage, LinkRecord, LinkRepository, Theme};

/// How long a notification stays on screen
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing into the add-link form
    Form,
    /// Typing a search term at the bottom prompt
    Search,
}

/// Field of the add-link form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Link,
}

impl FormField {
    /// Move to the next field (wrapping)
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Link,
            FormField::Link => FormField::Title,
        }
    }

    /// Move to the previous field (wrapping)
    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Link,
            FormField::Description => FormField::Title,
            FormField::Link => FormField::Description,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Link => "Link",
        }
    }
}

/// What a popup lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupKind {
    /// Title search results for a term
    Search(String),
    /// The whole collection
    All,
}

/// Modal list of links
#[derive(Debug, Clone)]
pub struct Popup {
    pub kind: PopupKind,
    pub links: Vec<LinkRecord>,
    /// Currently selected link index
    pub index: usize,
}

impl Popup {
    pub fn title(&self) -> String {
        match &self.kind {
            PopupKind::Search(term) => format!("Search Results for \"{}\"", term),
            PopupKind::All => "All Saved Links".to_string(),
        }
    }

    /// Text shown when the popup has nothing to list
    pub fn empty_message(&self) -> &'static str {
        match self.kind {
            PopupKind::Search(_) => "No links found with that title!",
            PopupKind::All => "No links saved yet.",
        }
    }

    /// Re-run the popup's query against the repository
    fn reload<S: KeyValueStorage>(&mut self, repo: &LinkRepository<S>) {
        self.links = match &self.kind {
            PopupKind::Search(term) => repo.search(term).cloned().collect(),
            PopupKind::All => repo.all().to_vec(),
        };
        self.index = self.index.min(self.links.len().saturating_sub(1));
    }
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Form field receiving typed characters
    pub focused: FormField,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Search prompt buffer
    pub search_input: String,
    /// Newest links, as shown in the recent panel
    pub recent: Vec<LinkRecord>,
    /// Size of the whole collection
    pub total: usize,
    /// How many links the recent panel shows
    pub recent_count: usize,
    /// Open popup, if any
    pub popup: Option<Popup>,
    pub theme: Theme,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl App {
    /// Create a new app showing the repository's current contents
    pub fn new<S: KeyValueStorage>(
        repo: &LinkRepository<S>,
        theme: Theme,
        recent_count: usize,
    ) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Form,
            focused: FormField::Title,
            title: String::new(),
            description: String::new(),
            url: String::new(),
            search_input: String::new(),
            recent: Vec::new(),
            total: 0,
            recent_count,
            popup: None,
            theme,
            status_message: None,
            status_message_time: None,
            show_help: false,
        };
        app.refresh(repo);
        app
    }

    /// Re-read the recent panel and any open popup
    pub fn refresh<S: KeyValueStorage>(&mut self, repo: &LinkRepository<S>) {
        self.recent = repo.recent(self.recent_count).to_vec();
        self.total = repo.len();
        if let Some(popup) = self.popup.as_mut() {
            popup.reload(repo);
        }
    }

    /// Whether the recent panel is hiding older links
    pub fn has_more(&self) -> bool {
        self.total > self.recent.len()
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Text of a form field
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Link => &self.url,
        }
    }

    fn focused_text(&mut self) -> &mut String {
        match self.input_mode {
            InputMode::Search => &mut self.search_input,
            InputMode::Form => match self.focused {
                FormField::Title => &mut self.title,
                FormField::Description => &mut self.description,
                FormField::Link => &mut self.url,
            },
        }
    }

    /// Append a character to the field being edited
    pub fn insert_char(&mut self, c: char) {
        self.focused_text().push(c);
    }

    /// Delete the last character of the field being edited
    pub fn delete_char(&mut self) {
        self.focused_text().pop();
    }

    pub fn next_field(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn prev_field(&mut self) {
        self.focused = self.focused.prev();
    }

    fn clear_form(&mut self) {
        self.title.clear();
        self.description.clear();
        self.url.clear();
        self.focused = FormField::Title;
    }

    /// Save the form as a new link
    ///
    /// On success the form clears; on a validation error it is kept so the
    /// input can be corrected.
    pub fn submit_form<S: KeyValueStorage>(&mut self, repo: &mut LinkRepository<S>) {
        match repo.add(&self.title, &self.description, &self.url) {
            Ok(saved) => {
                self.clear_form();
                match saved.store_error {
                    Some(e) => self.set_status(format!("⚠ Link saved for this session only. {}", e)),
                    None => self.set_status("Link saved successfully!"),
                }
                self.refresh(repo);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Open the search prompt
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input.clear();
    }

    /// Leave the search prompt without searching
    pub fn cancel_search(&mut self) {
        self.input_mode = InputMode::Form;
        self.search_input.clear();
        self.set_status("Search cancelled.");
    }

    /// Search by the prompt's term and show the results
    pub fn run_search<S: KeyValueStorage>(&mut self, repo: &LinkRepository<S>) {
        let term = std::mem::take(&mut self.search_input);
        self.input_mode = InputMode::Form;

        if term.trim().is_empty() {
            self.set_status("Search cancelled.");
            return;
        }

        let links: Vec<LinkRecord> = repo.search(&term).cloned().collect();
        if links.is_empty() {
            self.set_status("No links found with that title!");
            return;
        }

        self.popup = Some(Popup {
            kind: PopupKind::Search(term),
            links,
            index: 0,
        });
    }

    /// Show every saved link
    pub fn show_all<S: KeyValueStorage>(&mut self, repo: &LinkRepository<S>) {
        self.popup = Some(Popup {
            kind: PopupKind::All,
            links: repo.all().to_vec(),
            index: 0,
        });
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Move popup selection up
    pub fn move_up(&mut self) {
        if let Some(popup) = self.popup.as_mut() {
            popup.index = popup.index.saturating_sub(1);
        }
    }

    /// Move popup selection down
    pub fn move_down(&mut self) {
        if let Some(popup) = self.popup.as_mut() {
            if popup.index + 1 < popup.links.len() {
                popup.index += 1;
            }
        }
    }

    /// Get the link selected in the popup
    pub fn selected_link(&self) -> Option<&LinkRecord> {
        self.popup.as_ref().and_then(|p| p.links.get(p.index))
    }

    /// Delete the link selected in the popup
    ///
    /// The popup and the recent panel are refreshed right away.
    pub fn delete_selected<S: KeyValueStorage>(&mut self, repo: &mut LinkRepository<S>) {
        let Some(id) = self.selected_link().map(|l| l.id) else {
            return;
        };

        let saved = repo.remove(id);
        match (saved.value, saved.store_error) {
            (_, Some(e)) => self.set_status(format!("⚠ Deleted for this session only. {}", e)),
            (Some(link), None) => self.set_status(format!("Deleted '{}'", link.title)),
            (None, None) => {}
        }
        self.refresh(repo);
    }

    /// Switch between light and dark, persisting the choice
    pub fn toggle_theme<K: KeyValueStorage>(&mut self, storage: &mut K) {
        self.theme = self.theme.toggle();
        match save_theme(storage, self.theme) {
            Ok(()) => self.set_status(format!("Switched to {} theme", self.theme)),
            Err(e) => self.set_status(format!("⚠ Theme not saved. {}", e)),
        }
    }
}
