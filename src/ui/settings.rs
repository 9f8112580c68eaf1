//! Settings screen rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::widgets::Bar;
use super::{colors, hint_line, titled_block};
use crate::data::model_name;
use crate::settings::Settings;
use crate::views::settings::SettingsRow;
use crate::views::SettingsView;

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(colors::SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::PRIMARY)
    }
}

fn checkbox(enabled: bool) -> &'static str {
    if enabled {
        "[x] "
    } else {
        "[ ] "
    }
}

fn row_label(draft: &Settings, row: SettingsRow) -> String {
    match row {
        SettingsRow::Criterion(i) => draft.scoring.get(i).map_or_else(String::new, |c| {
            format!("{}{:<18}{:>3}%", checkbox(c.enabled), c.name, c.weight)
        }),
        SettingsRow::Model => format!("{:<18}{}", "Default model", model_name(&draft.default_model)),
        SettingsRow::Temperature => format!("{:<18}{:.1}", "Temperature", draft.temperature),
        SettingsRow::MaxTokens => format!("{:<18}{}", "Max tokens", draft.max_tokens),
        SettingsRow::Stage(i) => draft.stages.get(i).map_or_else(String::new, |s| {
            format!("{}{}", checkbox(s.enabled), s.stage.label())
        }),
    }
}

pub fn render(frame: &mut Frame, area: Rect, view: &SettingsView) {
    let draft = &view.draft;
    let rows = view.rows();
    let criteria = draft.scoring.len() as u16;
    let stages = draft.stages.len() as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(criteria + 3),
            Constraint::Length(5),
            Constraint::Length(stages + 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    // Scoring criteria, each with a weight bar
    let block = titled_block("Lead Scoring");
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    for (i, row) in rows
        .iter()
        .enumerate()
        .filter(|(_, r)| matches!(r, SettingsRow::Criterion(_)))
        .take(inner.height as usize)
    {
        let SettingsRow::Criterion(index) = *row else {
            continue;
        };
        let line_area = Rect::new(inner.x, inner.y + index as u16, inner.width, 1);
        let selected = i == view.row;
        let text = format!("{}{}", if selected { "▶ " } else { "  " }, row_label(draft, *row));
        let text_width = (text.chars().count() as u16 + 2).min(line_area.width);
        frame.render_widget(
            Paragraph::new(Span::styled(text, row_style(selected))),
            Rect::new(line_area.x, line_area.y, text_width, 1),
        );
        let weight = draft.scoring[index].weight;
        frame.render_widget(
            Bar::new(f64::from(weight), 100.0),
            Rect::new(
                line_area.x + text_width,
                line_area.y,
                line_area.width.saturating_sub(text_width).min(30),
                1,
            ),
        );
    }
    let total = draft.total_weight();
    let total_line = if draft.weights_balanced() {
        Span::styled(
            format!("  Total weight {}%", total),
            Style::default().fg(colors::GOOD),
        )
    } else {
        Span::styled(
            format!("  Total weight {}% (should be 100%)", total),
            Style::default().fg(colors::WARN),
        )
    };
    if inner.height > criteria {
        frame.render_widget(
            Paragraph::new(total_line),
            Rect::new(inner.x, inner.y + criteria, inner.width, 1),
        );
    }

    let section = |filter: fn(&SettingsRow) -> bool| -> Vec<Line<'static>> {
        rows.iter()
            .enumerate()
            .filter(|(_, r)| filter(r))
            .map(|(i, r)| {
                let selected = i == view.row;
                Line::from(Span::styled(
                    format!("{}{}", if selected { "▶ " } else { "  " }, row_label(draft, *r)),
                    row_style(selected),
                ))
            })
            .collect()
    };

    let model_rows = section(|r| {
        matches!(
            r,
            SettingsRow::Model | SettingsRow::Temperature | SettingsRow::MaxTokens
        )
    });
    frame.render_widget(
        Paragraph::new(model_rows).block(titled_block("AI Model")),
        chunks[1],
    );

    let stage_rows = section(|r| matches!(r, SettingsRow::Stage(_)));
    frame.render_widget(
        Paragraph::new(stage_rows).block(titled_block("Pipeline Stages")),
        chunks[2],
    );

    let mut hints = vec![
        ("↑↓", "move"),
        ("←/→", "adjust"),
        ("Space", "toggle"),
        ("s", "save"),
        ("u", "undo"),
        ("x", "clear cache"),
    ];
    if view.dirty {
        hints.insert(0, ("●", "unsaved changes"));
    }
    frame.render_widget(Paragraph::new(hint_line(&hints)), chunks[4]);
}
