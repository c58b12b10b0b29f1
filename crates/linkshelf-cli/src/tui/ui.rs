//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use linkshelf_core::{LinkRecord, Theme};

use super::app::{App, FormField, InputMode, Popup};

/// Colors for one theme
#[derive(Debug, Clone, Copy)]
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    muted: Color,
    warning: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                warning: Color::Red,
            },
            Theme::Dark => Palette {
                fg: Color::White,
                bg: Color::Black,
                accent: Color::Cyan,
                muted: Color::Gray,
                warning: Color::Yellow,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    frame.render_widget(Block::default().style(palette.base()), frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(9),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, &palette, chunks[0]);
    draw_form(frame, app, &palette, chunks[1]);
    draw_recent(frame, app, &palette, chunks[2]);

    match app.input_mode {
        InputMode::Form => draw_status_bar(frame, app, &palette, chunks[3]),
        InputMode::Search => draw_search_input(frame, app, &palette, chunks[3]),
    }

    if let Some(popup) = &app.popup {
        draw_popup(frame, popup, &palette);
    }

    if app.show_help {
        draw_help_overlay(frame, &palette);
    }
}

fn draw_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " Linkshelf ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} links  ·  {} theme", app.total, app.theme),
            palette.muted(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the add-link form
fn draw_form(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    let fields = [FormField::Title, FormField::Description, FormField::Link];
    for (field, row) in fields.into_iter().zip(rows.iter()) {
        let is_active =
            app.focused == field && app.input_mode == InputMode::Form && app.popup.is_none();

        let border_style = if is_active {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.muted()
        };

        let block = Block::default()
            .title(format!(" {} ", field.label()))
            .borders(Borders::ALL)
            .border_style(border_style);

        let text = app.field(field);
        frame.render_widget(Paragraph::new(text).block(block), *row);

        if is_active {
            let max_x = row.x.saturating_add(row.width.saturating_sub(2));
            let cursor_x = cursor_column(row.x.saturating_add(1), text.chars().count(), max_x);
            frame.set_cursor_position((cursor_x, row.y + 1));
        }
    }
}

/// Draw the recent links panel
fn draw_recent(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mut block = Block::default()
        .title(" Recent Links ")
        .borders(Borders::ALL)
        .border_style(palette.muted());

    if app.has_more() {
        block = block.title_bottom(Line::from(Span::styled(
            " See More (Ctrl-a) ",
            Style::default().fg(palette.accent),
        )));
    }

    if app.recent.is_empty() {
        let paragraph = Paragraph::new(Span::styled("No links saved yet.", palette.muted()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .recent
        .iter()
        .map(|link| link_item(link, width, palette))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Title, url and description lines for one link
fn link_item<'a>(link: &'a LinkRecord, width: usize, palette: &Palette) -> ListItem<'a> {
    let mut lines = vec![
        Line::from(Span::styled(
            truncate(&link.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&link.url, width),
            Style::default().fg(palette.accent),
        )),
    ];
    if !link.description.is_empty() {
        lines.push(Line::from(Span::raw(truncate(&link.description, width))));
    }
    lines.push(Line::from(Span::styled(
        format!("Saved {}", link.created_at.format("%Y-%m-%d %H:%M")),
        palette.muted(),
    )));
    ListItem::new(lines)
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let paragraph = match &app.status_message {
        Some(msg) => {
            let style = if msg.starts_with('⚠') {
                Style::default().fg(palette.warning)
            } else {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            };
            Paragraph::new(Span::styled(msg.as_str(), style))
        }
        None => Paragraph::new(Span::styled(
            "Enter:save  Tab:next field  ^F:search  ^A:all links  ^T:theme  F1:help  Esc:quit",
            palette.muted(),
        )),
    };

    frame.render_widget(paragraph, area);
}

/// Draw the search prompt at the bottom
fn draw_search_input(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let prefix = "Enter title to search: ";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(palette.accent)),
        Span::raw(app.search_input.as_str()),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let typed = prefix.chars().count() + app.search_input.chars().count();
    let cursor_x = cursor_column(area.x, typed, area.right().saturating_sub(1));
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw a popup listing links
fn draw_popup(frame: &mut Frame, popup: &Popup, palette: &Palette) {
    let area = centered_rect(frame.area(), 80, 70);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", popup.title()))
        .title_bottom(Line::from(Span::styled(
            " j/k:move  Enter:open  d:delete  Esc:close ",
            palette.muted(),
        )))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .style(palette.base());

    if popup.links.is_empty() {
        let paragraph = Paragraph::new(Span::styled(popup.empty_message(), palette.muted()))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = popup
        .links
        .iter()
        .map(|link| link_item(link, width, palette))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(popup.index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame, palette: &Palette) {
    let area = frame.area();

    // Calculate centered popup area
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 18.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Tab/Shift-Tab  Next/previous field"),
        Line::from("  Enter          Save link"),
        Line::from("  Ctrl-f         Search by title"),
        Line::from("  Ctrl-a         All saved links"),
        Line::from("  Ctrl-t         Toggle dark/light theme"),
        Line::from("  Esc, Ctrl-c    Quit"),
        Line::from(""),
        Line::from("Link lists:"),
        Line::from("  j/k, ↑/↓       Move up/down"),
        Line::from("  Enter          Open link in browser"),
        Line::from("  d              Delete link"),
        Line::from("  Esc            Close"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            palette.muted(),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD))
        .style(palette.base());

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

/// Rectangle covering the given percentages of `area`, centered
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let scale = |len: u16, percent: u16| {
        let scaled = u32::from(len) * u32::from(percent.min(100)) / 100;
        u16::try_from(scaled).unwrap_or(len)
    };
    let width = scale(area.width, percent_x);
    let height = scale(area.height, percent_y);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Column `offset` cells right of `start`, clamped to `max`
fn cursor_column(start: u16, offset: usize, max: u16) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    start.saturating_add(offset).min(max)
}

/// Shorten to `max_len` characters, ending in an ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkshelf_core::{LinkRepository, MemoryStorage};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long title", 6), "a lon…");
    }

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(Rect::new(0, 0, 100, 50), 80, 70);
        assert_eq!(rect, Rect::new(10, 7, 80, 35));
    }

    #[test]
    fn test_centered_rect_on_wide_terminal() {
        let rect = centered_rect(Rect::new(0, 0, 1000, 20), 80, 70);
        assert_eq!(rect, Rect::new(100, 3, 800, 14));
    }

    #[test]
    fn test_cursor_column_clamps() {
        assert_eq!(cursor_column(1, 5, 78), 6);
        assert_eq!(cursor_column(1, 500, 78), 78);
        assert_eq!(cursor_column(10, 100_000, u16::MAX), u16::MAX);
    }

    #[test]
    fn test_long_search_input_renders() {
        let repo = LinkRepository::open(MemoryStorage::new());
        let mut app = App::new(&repo, Theme::Light, 3);
        app.enter_search_mode();
        app.search_input = "x".repeat(70_000);

        let screen = render(&app);
        assert!(screen.contains("Enter title to search: xxx"));
    }

    #[test]
    fn test_empty_page() {
        let repo = LinkRepository::open(MemoryStorage::new());
        let app = App::new(&repo, Theme::Light, 3);

        let screen = render(&app);
        assert!(screen.contains("Recent Links"));
        assert!(screen.contains("No links saved yet."));
        assert!(!screen.contains("See More"));
    }

    #[test]
    fn test_see_more_hint() {
        let mut repo = LinkRepository::open(MemoryStorage::new());
        for title in ["one", "two", "three", "four"] {
            repo.add(title, "", &format!("{}.com", title)).unwrap();
        }
        let app = App::new(&repo, Theme::Dark, 3);

        let screen = render(&app);
        assert!(screen.contains("See More (Ctrl-a)"));
        assert!(screen.contains("https://four.com"));
        assert!(!screen.contains("https://one.com"));
    }

    #[test]
    fn test_popup_title() {
        let mut repo = LinkRepository::open(MemoryStorage::new());
        repo.add("Rust Book", "", "rust-book.com").unwrap();
        let mut app = App::new(&repo, Theme::Light, 3);
        app.show_all(&repo);

        let screen = render(&app);
        assert!(screen.contains("All Saved Links"));
    }
}
