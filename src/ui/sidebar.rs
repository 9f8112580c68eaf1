//! Navigation sidebar

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::colors;
use crate::views::Screen;

pub fn render(frame: &mut Frame, area: Rect, current: Screen) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(colors::MUTED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let title = vec![
        Line::from(Span::styled(
            " Grok SDR",
            Style::default()
                .fg(colors::GROK)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Sales pipeline",
            Style::default().fg(colors::MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let active = current.sidebar_entry();
    let items: Vec<Line> = Screen::SIDEBAR
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let selected = *screen == active;
            let style = if selected {
                Style::default()
                    .fg(colors::SELECTED)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors::SECONDARY)
            };
            Line::from(vec![
                Span::styled(if selected { "▶ " } else { "  " }, style),
                Span::styled(format!("{} ", i + 1), Style::default().fg(colors::MUTED)),
                Span::styled(screen.label(), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(items), chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(
            " Powered by Grok API",
            Style::default().fg(colors::MUTED),
        )),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::render_to_string;

    #[test]
    fn test_sidebar_lists_screens_and_marks_active() {
        let screen = render_to_string(24, 12, |frame| {
            render(frame, frame.area(), Screen::AddLead)
        });

        assert!(screen.contains("1 Dashboard"));
        assert!(screen.contains("▶ 2 Leads"));
        assert!(screen.contains("5 Settings"));
        assert!(screen.contains("Powered by Grok API"));
    }
}
