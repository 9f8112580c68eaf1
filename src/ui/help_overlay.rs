//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{centered_rect, colors};

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let overlay_area = centered_rect(56, 30, frame.area());
    frame.render_widget(Clear, overlay_area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation"),
        help_line("1-5", "Dashboard, Leads, Evaluation, Messaging, Settings"),
        help_line("Tab/S-Tab", "Next / previous screen"),
        help_line("↑/k, ↓/j", "Move selection"),
        help_line("Enter", "Open / confirm"),
        help_line("Esc", "Go back / close"),
        help_line("q, Ctrl-C", "Quit application"),
        Line::from(""),
        section("Leads"),
        help_line("←/h, →/l", "Switch stage filter"),
        help_line("/", "Search company or contact"),
        help_line("Space", "Mark lead for notification"),
        help_line("n", "Notify marked leads"),
        help_line("a", "Add a lead"),
        help_line("s, d, m", "Advance stage, delete, message"),
        Line::from(""),
        section("Forms & settings"),
        help_line("Tab, ↑/↓", "Move between fields"),
        help_line("Ctrl-S", "Save lead"),
        help_line("←/→", "Change value"),
        help_line("s, u, x", "Save, undo, clear cache"),
        Line::from(""),
        section("Other"),
        help_line("r", "Refresh / re-run"),
        help_line("f", "Toggle activity feed"),
        help_line("g", "Generate message"),
        help_line("?", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(colors::MUTED),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(colors::SELECTED)),
        Span::raw(description.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::render_to_string;

    #[test]
    fn test_help_overlay_renders() {
        let content = render_to_string(80, 34, render);

        assert!(content.contains("Help"), "Should render help title");
        assert!(
            content.contains("Navigation"),
            "Should show navigation section"
        );
        assert!(content.contains("Notify marked leads"));
    }
}
