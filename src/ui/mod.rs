//! UI rendering module for Grok SDR
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Rendering only reads [`App`].

pub mod add_lead;
pub mod dashboard;
pub mod evaluation;
pub mod help_overlay;
pub mod lead_detail;
pub mod leads;
pub mod messaging;
pub mod settings;
pub mod sidebar;
pub mod widgets;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::resource::{Resource, Status};
use crate::views::ActiveView;

/// Color scheme shared by every screen
pub(crate) mod colors {
    use ratatui::style::Color;

    /// Section headers and borders
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Hints and placeholders
    pub const MUTED: Color = Color::DarkGray;
    /// Selection and key hints
    pub const SELECTED: Color = Color::Yellow;
    /// Success, balanced weights, high scores
    pub const GOOD: Color = Color::Green;
    /// Warnings
    pub const WARN: Color = Color::Rgb(255, 165, 0);
    /// Errors
    pub const ERROR: Color = Color::Red;
    /// AI-generated content
    pub const GROK: Color = Color::Magenta;
}

const SIDEBAR_WIDTH: u16 = 24;

/// Renders the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[0]);

    sidebar::render(frame, columns[0], app.screen());

    let area = columns[1];
    match &app.view {
        ActiveView::Dashboard(view) => dashboard::render(frame, area, view),
        ActiveView::Leads(view) => leads::render(frame, area, view),
        ActiveView::LeadDetail(view) => lead_detail::render(frame, area, view),
        ActiveView::AddLead(view) => add_lead::render(frame, area, view),
        ActiveView::Messaging(view) => messaging::render(frame, area, view),
        ActiveView::Evaluation(view) => evaluation::render(frame, area, view),
        ActiveView::Settings(view) => settings::render(frame, area, view),
    }

    render_status_bar(frame, rows[1], app);

    if app.show_help {
        help_overlay::render(frame);
    }
    if let Some(message) = &app.alert {
        render_alert(frame, message);
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(colors::GOOD),
        ));
    }
    if !app.pollers.is_empty() {
        spans.push(Span::styled(
            format!(" Enriching {} lead(s) ", app.pollers.len()),
            Style::default().fg(colors::GROK),
        ));
    }
    spans.push(Span::styled(
        " Tab/1-5 switch view · ? help · q quit",
        Style::default().fg(colors::MUTED),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_alert(frame: &mut Frame, message: &str) {
    let width = (message.chars().count() as u16 + 6).clamp(30, 70);
    let area = centered_rect(width, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(colors::PRIMARY),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(colors::MUTED),
        )),
    ];
    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::WARN));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Bordered block with a bold title, as used by every screen
pub(crate) fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
}

/// One-line summary of a resource that is loading or failed, if any
pub(crate) fn resource_notice<T>(resource: &Resource<T>, loading: &str) -> Option<Line<'static>> {
    match &resource.status {
        Status::Loading(_) => Some(Line::from(Span::styled(
            loading.to_string(),
            Style::default().fg(colors::HEADER),
        ))),
        Status::Error(message) => Some(Line::from(Span::styled(
            format!("Error: {}", message),
            Style::default().fg(colors::ERROR),
        ))),
        Status::Empty | Status::Ready => None,
    }
}

/// Key hints line: pairs of (key, action)
pub(crate) fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default()));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(colors::SELECTED),
        ));
        spans.push(Span::styled(
            format!(" {}", action),
            Style::default().fg(colors::MUTED),
        ));
    }
    Line::from(spans)
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::render_to_string;
    use super::*;
    use crate::cache::{CacheManager, ManualClock, MemoryStorage};
    use crate::settings::SettingsStore;
    use crate::views::Screen;

    fn app(initial: Screen) -> App {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let cache = CacheManager::new(Arc::new(MemoryStorage::new()), clock);
        cache
            .set("dashboard_data", &serde_json::json!({"metrics": {"total_leads": 247}}))
            .unwrap();
        App::new(
            cache,
            SettingsStore::new(Arc::new(MemoryStorage::new())),
            initial,
        )
    }

    #[test]
    fn test_renders_sidebar_and_dashboard() {
        let app = app(Screen::Dashboard);

        let screen = render_to_string(120, 30, |frame| render(frame, &app));

        assert!(screen.contains("Grok SDR"));
        assert!(screen.contains("Model Evaluation"));
        assert!(screen.contains("247"));
    }

    #[test]
    fn test_alert_overlay_is_drawn() {
        let mut app = app(Screen::AddLead);
        app.alert = Some("Please fill in all required fields (*)".to_string());

        let screen = render_to_string(100, 30, |frame| render(frame, &app));

        assert!(screen.contains("Notice"));
        assert!(screen.contains("Please fill in all required fields (*)"));
    }

    #[test]
    fn test_every_screen_renders_on_small_terminal() {
        for screen in [
            Screen::Dashboard,
            Screen::Leads,
            Screen::AddLead,
            Screen::Messaging,
            Screen::Evaluation,
            Screen::Settings,
        ] {
            let app = app(screen);
            render_to_string(40, 10, |frame| render(frame, &app));
        }
    }
}
