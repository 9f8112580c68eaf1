//! Message composer rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{colors, hint_line, resource_notice, titled_block};
use crate::data::MODELS;
use crate::views::messaging::ComposerRow;
use crate::views::MessagingView;

fn option_line(label: &str, value: String, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default()
            .fg(colors::SELECTED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::SECONDARY)
    };
    Line::from(vec![
        Span::styled(if selected { "▶ " } else { "  " }, style),
        Span::styled(format!("{:<8}", label), style),
        Span::styled(format!("◀ {} ▶", value), Style::default().fg(colors::PRIMARY)),
    ])
}

pub fn render(frame: &mut Frame, area: Rect, view: &MessagingView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let lead_label = match (view.selected_lead(), &view.leads.data) {
        (Some(lead), _) => format!("{} ({})", lead.company, lead.contact),
        (None, Some(_)) => "No leads".to_string(),
        (None, None) => "Loading...".to_string(),
    };
    let mut options: Vec<Line> = ComposerRow::ALL
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == view.row;
            match row {
                ComposerRow::Lead => option_line("Lead", lead_label.clone(), selected),
                ComposerRow::Tone => option_line("Tone", view.tone().label().to_string(), selected),
                ComposerRow::Goal => option_line("Goal", view.goal().label().to_string(), selected),
                ComposerRow::Model => {
                    option_line("Model", MODELS[view.model].1.to_string(), selected)
                }
            }
        })
        .collect();
    if let Some(error) = view.leads.error() {
        options.push(Line::from(Span::styled(
            format!("Could not load leads: {}", error),
            Style::default().fg(colors::ERROR),
        )));
    }
    frame.render_widget(
        Paragraph::new(options).block(titled_block("Compose")),
        chunks[0],
    );

    let mut body: Vec<Line> = resource_notice(&view.message, "Grok is drafting your message...")
        .into_iter()
        .collect();
    match &view.message.data {
        Some(message) => {
            body.push(Line::from(vec![
                Span::styled("Subject: ", Style::default().fg(colors::MUTED)),
                Span::styled(
                    message.subject.clone(),
                    Style::default()
                        .fg(colors::PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
            body.push(Line::from(""));
            body.extend(
                message
                    .body_text()
                    .lines()
                    .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(colors::PRIMARY)))),
            );
        }
        None if body.is_empty() => body.push(Line::from(Span::styled(
            "Pick a lead, tone and goal, then press g to generate",
            Style::default().fg(colors::MUTED),
        ))),
        None => {}
    }
    let block = titled_block("Generated Message").border_style(Style::default().fg(colors::GROK));
    frame.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: false }),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(hint_line(&[
            ("↑↓", "option"),
            ("←/→", "change"),
            ("g/Enter", "generate"),
        ])),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GeneratedMessage, Stage};
    use crate::dispatch::Response;
    use crate::ui::testing::render_to_string;
    use crate::views::testing::{lead, Harness};

    #[test]
    fn test_composer_shows_options_and_message() {
        let mut harness = Harness::new();
        let mut view = MessagingView::mount(None, &mut harness.ctx());
        let ticket = view.leads.pending().unwrap();
        view.apply(
            ticket,
            &Ok(Response::Leads(vec![lead(
                "1",
                "Acme Corporation",
                "John Smith",
                Stage::New,
            )])),
        );
        view.message.begin(99);
        view.message.resolve(
            99,
            GeneratedMessage {
                subject: "Quick question".to_string(),
                body: "<p>Hi John,</p><p>Thanks</p>".to_string(),
            },
        );

        let screen = render_to_string(100, 20, |frame| render(frame, frame.area(), &view));

        assert!(screen.contains("Acme Corporation (John Smith)"));
        assert!(screen.contains("◀ Professional ▶"));
        assert!(screen.contains("Subject: Quick question"));
        assert!(screen.contains("Hi John,"));
    }

    #[test]
    fn test_composer_prompts_before_generation() {
        let mut harness = Harness::new();
        let view = MessagingView::mount(None, &mut harness.ctx());

        let screen = render_to_string(100, 20, |frame| render(frame, frame.area(), &view));

        assert!(screen.contains("Loading..."));
        assert!(screen.contains("press g to generate"));
    }
}
