//! Model evaluation rendering
//!
//! One row per model with accuracy drawn as a bar, failure rate and
//! latency, the recommended model, and the failure cases underneath.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::widgets::Bar;
use super::{colors, hint_line, resource_notice, titled_block};
use crate::data::{model_name, EvaluationReport, ModelScore};
use crate::views::EvaluationView;

const NAME_WIDTH: usize = 30;

fn accuracy_color(accuracy: f64) -> ratatui::style::Color {
    if accuracy >= 95.0 {
        colors::GOOD
    } else if accuracy >= 85.0 {
        colors::SELECTED
    } else {
        colors::ERROR
    }
}

fn render_scores(frame: &mut Frame, area: Rect, report: &EvaluationReport) {
    let block = titled_block("Model Accuracy");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let recommended = report.recommended();
    for (i, (id, score)) in report
        .results
        .iter()
        .enumerate()
        .take(inner.height as usize)
    {
        let row = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        render_score_row(frame, row, id, score, recommended == Some(id.as_str()));
    }
}

fn render_score_row(frame: &mut Frame, row: Rect, id: &str, score: &ModelScore, recommended: bool) {
    let name_style = if recommended {
        Style::default()
            .fg(colors::GOOD)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::PRIMARY)
    };
    let label = Line::from(vec![
        Span::styled(if recommended { "★ " } else { "  " }, name_style),
        Span::styled(format!("{:<w$}", model_name(id), w = NAME_WIDTH), name_style),
    ]);
    let stats = Line::from(vec![
        Span::styled(
            format!(" {:>5.1}%", score.accuracy),
            Style::default().fg(accuracy_color(score.accuracy)),
        ),
        Span::styled(
            format!("  fail {:>4.1}%  {:.2}s", score.failure_rate, score.avg_latency),
            Style::default().fg(colors::SECONDARY),
        ),
    ]);

    let label_width = (NAME_WIDTH as u16 + 2).min(row.width);
    let stats_width = 26u16.min(row.width.saturating_sub(label_width));
    let bar_width = row.width.saturating_sub(label_width + stats_width);
    frame.render_widget(Paragraph::new(label), Rect::new(row.x, row.y, label_width, 1));
    frame.render_widget(
        Bar::new(score.accuracy, 100.0).style(Style::default().fg(accuracy_color(score.accuracy))),
        Rect::new(row.x + label_width, row.y, bar_width, 1),
    );
    frame.render_widget(
        Paragraph::new(stats),
        Rect::new(row.x + label_width + bar_width, row.y, stats_width, 1),
    );
}

fn failure_lines(report: &EvaluationReport) -> Vec<Line<'static>> {
    if report.failures.is_empty() {
        return vec![Line::from(Span::styled(
            "No failures recorded",
            Style::default().fg(colors::GOOD),
        ))];
    }
    report
        .failures
        .iter()
        .map(|failure| {
            let mut spans = vec![
                Span::styled(
                    format!("{:<28}", model_name(&failure.model)),
                    Style::default().fg(colors::PRIMARY),
                ),
                Span::styled(
                    format!("{:<20}", failure.category),
                    Style::default().fg(colors::WARN),
                ),
                Span::styled(failure.issue.clone(), Style::default().fg(colors::SECONDARY)),
            ];
            if let Some(ts) = &failure.timestamp {
                spans.push(Span::styled(format!("  {}", ts), Style::default().fg(colors::MUTED)));
            }
            Line::from(spans)
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, view: &EvaluationView) {
    let models = view
        .report
        .data
        .as_ref()
        .map_or(0, |r| r.results.len()) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(models.max(1) + 2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let mut header = vec![resource_notice(&view.report, "Running evaluation, this can take a minute...")
        .unwrap_or_else(|| {
            Line::from(Span::styled(
                " Model Evaluation",
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ))
        })];
    if let Some(best) = view.report.data.as_ref().and_then(EvaluationReport::recommended) {
        header.push(Line::from(vec![
            Span::styled(" Recommended: ", Style::default().fg(colors::MUTED)),
            Span::styled(
                model_name(best).to_string(),
                Style::default()
                    .fg(colors::GOOD)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(header), chunks[0]);

    match &view.report.data {
        Some(report) => {
            render_scores(frame, chunks[1], report);
            frame.render_widget(
                Paragraph::new(failure_lines(report))
                    .block(titled_block("Failure Cases"))
                    .wrap(Wrap { trim: false })
                    .scroll((view.scroll, 0)),
                chunks[2],
            );
        }
        None => frame.render_widget(
            Paragraph::new(Span::styled(
                "No results yet",
                Style::default().fg(colors::MUTED),
            ))
            .block(titled_block("Model Accuracy")),
            chunks[1],
        ),
    }

    frame.render_widget(
        Paragraph::new(hint_line(&[("r", "re-run evaluation"), ("↑↓", "scroll failures")])),
        chunks[3],
    );
}
