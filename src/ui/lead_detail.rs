//! Lead detail screen rendering

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use super::leads::{score_color, stage_color};
use super::{centered_rect, colors, hint_line, resource_notice, titled_block};
use crate::data::{format_relative, html_to_text, Lead, LeadMessage};
use crate::views::LeadDetailView;

fn field(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(colors::MUTED)),
        Span::styled(value.to_string(), Style::default().fg(colors::PRIMARY)),
    ])
}

fn lead_lines(lead: &Lead) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                lead.company.clone(),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                lead.stage.label(),
                Style::default().fg(stage_color(&lead.stage)),
            ),
            Span::raw("  "),
            Span::styled(
                format!("score {}", lead.score),
                Style::default().fg(score_color(lead.score)),
            ),
        ]),
        Line::from(""),
        field("Contact", &lead.contact),
        field("Email", &lead.email),
        field("Value", &lead.value),
    ];

    let optional = [
        ("Title", &lead.job_title),
        ("Phone", &lead.phone),
        ("Industry", &lead.industry),
        ("Location", &lead.location),
        ("Website", &lead.website),
        ("LinkedIn", &lead.linkedin),
    ];
    lines.extend(
        optional
            .iter()
            .filter_map(|(label, value)| value.as_deref().map(|v| field(label, v))),
    );
    if !lead.tags.is_empty() {
        lines.push(field("Tags", &lead.tags.join(", ")));
    }
    if let Some(notes) = &lead.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notes.clone(),
            Style::default().fg(colors::SECONDARY),
        )));
    }
    lines
}

fn message_lines(message: &LeadMessage) -> Vec<Line<'static>> {
    let details = message.details();
    let mut header = vec![Span::styled(
        format!("{} · {}", message.kind, message.action),
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    )];
    if message.grok_generated {
        header.push(Span::styled(" [Grok]", Style::default().fg(colors::GROK)));
    }
    if let Some(created) = &message.created_at {
        header.push(Span::styled(
            format!("  {}", format_relative(created, Utc::now())),
            Style::default().fg(colors::MUTED),
        ));
    }

    let mut lines = vec![Line::from(header)];
    if let Some(subject) = details.subject {
        lines.push(field("Subject", &subject));
    }
    let meta: Vec<String> = [details.tone, details.goal, details.model]
        .into_iter()
        .flatten()
        .collect();
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            meta.join(" · "),
            Style::default().fg(colors::MUTED),
        )));
    }
    if let Some(body) = details.body {
        lines.extend(
            html_to_text(&body)
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(colors::SECONDARY)))),
        );
    }
    lines.push(Line::from(""));
    lines
}

pub fn render(frame: &mut Frame, area: Rect, view: &LeadDetailView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[0]);

    let mut info: Vec<Line> = resource_notice(&view.overview, "Loading lead...")
        .into_iter()
        .collect();
    let mut history = Vec::new();
    if let Some(overview) = &view.overview.data {
        info.extend(lead_lines(&overview.lead));
        if let Some(error) = &overview.messages_error {
            history.push(Line::from(Span::styled(
                format!("Could not load history: {}", error),
                Style::default().fg(colors::ERROR),
            )));
        } else if overview.messages.is_empty() {
            history.push(Line::from(Span::styled(
                "No messages yet",
                Style::default().fg(colors::MUTED),
            )));
        }
        history.extend(overview.messages.iter().flat_map(message_lines));
    }

    frame.render_widget(
        Paragraph::new(info)
            .block(titled_block("Lead"))
            .wrap(Wrap { trim: false }),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(history)
            .block(titled_block("Message History"))
            .wrap(Wrap { trim: false })
            .scroll((view.scroll, 0)),
        columns[1],
    );

    let hints = if view.is_busy() {
        hint_line(&[("", "Saving...")])
    } else {
        hint_line(&[
            ("s", "advance stage"),
            ("m", "compose message"),
            ("d", "delete"),
            ("r", "reload"),
            ("Esc", "back"),
        ])
    };
    frame.render_widget(Paragraph::new(hints), chunks[1]);

    if view.confirm_delete {
        render_confirm(frame, view);
    }
}

fn render_confirm(frame: &mut Frame, view: &LeadDetailView) {
    let company = view
        .overview
        .data
        .as_ref()
        .map_or("this lead", |o| o.lead.company.as_str());
    let area = centered_rect(44, 5, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(format!("Delete {}?", company)),
        Line::from(""),
        hint_line(&[("y", "delete"), ("n", "cancel")]),
    ];
    let block = titled_block("Confirm").border_style(Style::default().fg(colors::ERROR));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
