//! Lead list screen rendering
//!
//! Stage filter tabs with counts, the search line and one row per lead with
//! its notification mark, score, stage and deal value.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{colors, hint_line, resource_notice, titled_block};
use crate::data::{Lead, Stage};
use crate::views::{LeadsView, STAGE_FILTERS};

/// Color for a qualification score
pub(crate) fn score_color(score: u32) -> Color {
    if score >= 80 {
        colors::GOOD
    } else if score >= 60 {
        colors::SELECTED
    } else {
        colors::SECONDARY
    }
}

/// Color for a pipeline stage
pub(crate) fn stage_color(stage: &Stage) -> Color {
    match stage {
        Stage::New => Color::Blue,
        Stage::Contacted => Color::Cyan,
        Stage::Qualified => colors::GOOD,
        Stage::Proposal => colors::WARN,
        Stage::Closed => colors::GROK,
        Stage::Lost => colors::ERROR,
        Stage::Other(_) => colors::SECONDARY,
    }
}

/// Truncates to `width` characters, marking the cut with an ellipsis
pub(crate) fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn render(frame: &mut Frame, area: Rect, view: &LeadsView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(filter_tabs(view)), chunks[0]);
    frame.render_widget(Paragraph::new(search_line(view)), chunks[1]);
    render_table(frame, chunks[2], view);

    let hints = if view.is_notifying() {
        hint_line(&[("", "Sending notifications...")])
    } else {
        hint_line(&[
            ("Enter", "open"),
            ("Space", "mark"),
            ("n", "notify"),
            ("a", "add"),
            ("/", "search"),
            ("r", "reload"),
        ])
    };
    frame.render_widget(Paragraph::new(hints), chunks[3]);
}

fn filter_tabs(view: &LeadsView) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, filter) in STAGE_FILTERS.iter().enumerate() {
        let label = match filter {
            Some(stage) => stage.label(),
            None => "All".to_string(),
        };
        let style = if i == view.filter {
            Style::default()
                .fg(colors::SELECTED)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors::SECONDARY)
        };
        spans.push(Span::styled(
            format!(" {} ({}) ", label, view.count_for(i)),
            style,
        ));
    }
    Line::from(spans)
}

fn search_line(view: &LeadsView) -> Line<'static> {
    if view.searching {
        Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(colors::SELECTED)),
            Span::styled(view.search.clone(), Style::default().fg(colors::PRIMARY)),
            Span::styled("▏", Style::default().fg(colors::SELECTED)),
        ])
    } else if view.search.is_empty() {
        Line::from(Span::styled(
            " Press / to search by company or contact",
            Style::default().fg(colors::MUTED),
        ))
    } else {
        Line::from(vec![
            Span::styled(" Search: ", Style::default().fg(colors::SECONDARY)),
            Span::styled(view.search.clone(), Style::default().fg(colors::PRIMARY)),
            Span::styled("  (Esc to clear)", Style::default().fg(colors::MUTED)),
        ])
    }
}

fn lead_line(lead: &Lead, selected: bool, marked: bool) -> Line<'static> {
    let base = if selected {
        Style::default()
            .fg(colors::SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::PRIMARY)
    };
    Line::from(vec![
        Span::styled(if selected { "▶" } else { " " }, base),
        Span::styled(
            if marked { "[x] " } else { "[ ] " },
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(format!("{:<24}", truncate(&lead.company, 23)), base),
        Span::styled(
            format!("{:<20}", truncate(&lead.contact, 19)),
            Style::default().fg(colors::SECONDARY),
        ),
        Span::styled(
            format!("{:>3}  ", lead.score),
            Style::default().fg(score_color(lead.score)),
        ),
        Span::styled(
            format!("{:<10}", lead.stage.label()),
            Style::default().fg(stage_color(&lead.stage)),
        ),
        Span::styled(lead.value.clone(), Style::default().fg(colors::SECONDARY)),
    ])
}

fn render_table(frame: &mut Frame, area: Rect, view: &LeadsView) {
    let title = match view.marked.len() {
        0 => "Leads".to_string(),
        n => format!("Leads · {} marked", n),
    };
    let block = titled_block(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            "      {:<24}{:<20}{:>3}  {:<10}{}",
            "Company", "Contact", "Scr", "Stage", "Value"
        ),
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(notice) = resource_notice(&view.leads, "Loading leads...") {
        lines.push(notice);
    }

    let visible = view.visible();
    if visible.is_empty() && view.leads.data.is_some() {
        lines.push(Line::from(Span::styled(
            "  No leads match",
            Style::default().fg(colors::MUTED),
        )));
    }

    // Keep the cursor on screen
    let rows = inner.height.saturating_sub(1) as usize;
    let offset = (view.selected + 1).saturating_sub(rows);
    lines.extend(
        visible
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .map(|(i, lead)| lead_line(lead, i == view.selected, view.marked.contains(&lead.id))),
    );

    frame.render_widget(Paragraph::new(lines), inner);
}
