//! Add-lead form rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{colors, hint_line, titled_block};
use crate::views::{AddLeadView, FormField};

/// Section headings, keyed by the first field of each section
fn section_for(field: FormField) -> Option<&'static str> {
    match field {
        FormField::Company => Some("Company"),
        FormField::FirstName => Some("Contact"),
        FormField::Stage => Some("Deal"),
        _ => None,
    }
}

fn field_line(view: &AddLeadView, index: usize, field: FormField) -> Line<'static> {
    let focused = index == view.focus;
    let marker = if focused { "▶ " } else { "  " };
    let label_style = if focused {
        Style::default()
            .fg(colors::SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::SECONDARY)
    };
    let label = if field.is_required() {
        format!("{}*", field.label())
    } else {
        field.label().to_string()
    };

    let mut spans = vec![
        Span::styled(marker, label_style),
        Span::styled(format!("{:<16}", label), label_style),
    ];
    match view.form.text(field) {
        Some(text) => {
            spans.push(Span::styled(text.clone(), Style::default().fg(colors::PRIMARY)));
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(colors::SELECTED)));
            }
        }
        None => spans.push(Span::styled(
            format!("◀ {} ▶", view.form.stage.label()),
            Style::default().fg(colors::PRIMARY),
        )),
    }
    Line::from(spans)
}

pub fn render(frame: &mut Frame, area: Rect, view: &AddLeadView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let mut lines = Vec::new();
    for (i, field) in FormField::ALL.iter().enumerate() {
        if let Some(section) = section_for(*field) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                section,
                Style::default()
                    .fg(colors::HEADER)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(field_line(view, i, *field));
    }

    // Keep the focused field visible on short terminals
    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let focus_line = lines
        .iter()
        .position(|l| l.spans.first().is_some_and(|s| s.content == "▶ "))
        .unwrap_or(0);
    let scroll = (focus_line + 1).saturating_sub(inner_height) as u16;

    frame.render_widget(
        Paragraph::new(lines)
            .block(titled_block("Add Lead"))
            .scroll((scroll, 0)),
        chunks[0],
    );

    let hints = if view.is_saving() {
        hint_line(&[("", "Saving lead...")])
    } else {
        hint_line(&[
            ("Tab/↑↓", "move"),
            ("←/→", "stage"),
            ("Ctrl-S", "save"),
            ("Esc", "cancel"),
            ("*", "required"),
        ])
    };
    frame.render_widget(Paragraph::new(hints), chunks[1]);
}
