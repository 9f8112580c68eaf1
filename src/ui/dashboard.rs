//! Dashboard rendering: headline metrics, pipeline and recent activity

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::widgets::Bar;
use super::{colors, hint_line, resource_notice, titled_block};
use crate::data::{format_relative, Activity, DashboardData};
use crate::views::DashboardView;

const LABEL_WIDTH: usize = 12;

pub fn render(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = resource_notice(&view.data, "Loading dashboard...").unwrap_or_else(|| {
        Line::from(Span::styled(
            " Dashboard",
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
    });
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let data = view.data.data.clone().unwrap_or_default();
    render_metrics(frame, chunks[1], &data);
    render_pipeline(frame, chunks[2], &data);
    render_activities(frame, chunks[3], view);

    let feed_hint = if view.feed.is_some() {
        ("f/Esc", "recent only")
    } else {
        ("f", "full activity feed")
    };
    frame.render_widget(
        Paragraph::new(hint_line(&[("r", "refresh"), feed_hint])),
        chunks[4],
    );
}

fn render_metrics(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let metrics = [
        ("Total Leads", data.metrics.total_leads),
        ("Qualified", data.metrics.qualified_leads),
        ("Messages Sent", data.metrics.messages_sent),
        ("Meetings", data.metrics.meetings_booked),
    ];
    for ((label, value), card) in metrics.into_iter().zip(cards.iter()) {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )))
        .block(titled_block(label));
        frame.render_widget(paragraph, *card);
    }
}

fn render_pipeline(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let block = titled_block("Pipeline");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if data.pipeline.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No pipeline data",
                Style::default().fg(colors::MUTED),
            )),
            inner,
        );
        return;
    }

    let max = data.pipeline.iter().map(|s| s.count).max().unwrap_or(0) as f64;
    for (i, stage) in data.pipeline.iter().enumerate().take(inner.height as usize) {
        let row = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        let label = format!("{:<w$}{:>5} ", stage.name, stage.count, w = LABEL_WIDTH);
        let label_width = (label.chars().count() as u16).min(row.width);
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(colors::SECONDARY))),
            Rect::new(row.x, row.y, label_width, 1),
        );
        let bar_area = Rect::new(
            row.x + label_width,
            row.y,
            row.width.saturating_sub(label_width),
            1,
        );
        frame.render_widget(Bar::new(stage.count as f64, max), bar_area);
    }
}

fn activity_line(activity: &Activity) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{:<9}", activity.kind),
        Style::default().fg(colors::HEADER),
    )];
    spans.push(Span::styled(
        activity.action.clone(),
        Style::default().fg(colors::PRIMARY),
    ));
    if activity.grok_generated {
        spans.push(Span::styled(" [Grok]", Style::default().fg(colors::GROK)));
    }
    if let Some(when) = activity.when() {
        spans.push(Span::styled(
            format!("  {}", format_relative(when, Utc::now())),
            Style::default().fg(colors::MUTED),
        ));
    }
    Line::from(spans)
}

fn render_activities(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let (title, notice) = match &view.feed {
        Some(feed) => ("Activity Feed", resource_notice(feed, "Loading activities...")),
        None => ("Recent Activity", None),
    };

    let mut lines: Vec<Line> = notice.into_iter().collect();
    let activities = view.activities();
    if activities.is_empty() && lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No activity yet",
            Style::default().fg(colors::MUTED),
        )));
    }
    lines.extend(activities.iter().map(activity_line));

    frame.render_widget(Paragraph::new(lines).block(titled_block(title)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Metrics, PipelineStage};
    use crate::resource::Resource;
    use crate::ui::testing::render_to_string;

    fn view() -> DashboardView {
        let data = DashboardData {
            metrics: Metrics {
                total_leads: 247,
                qualified_leads: 89,
                messages_sent: 1342,
                meetings_booked: 34,
            },
            pipeline: vec![
                PipelineStage {
                    name: "New".to_string(),
                    count: 40,
                },
                PipelineStage {
                    name: "Qualified".to_string(),
                    count: 89,
                },
            ],
            recent_activities: vec![Activity {
                id: None,
                lead_id: None,
                kind: "email".to_string(),
                action: "Email sent to Acme Corp".to_string(),
                grok_generated: true,
                timestamp: None,
                created_at: None,
            }],
        };
        DashboardView {
            data: Resource::from_cache(Some(data)),
            feed: None,
        }
    }

    #[test]
    fn test_dashboard_shows_metrics_pipeline_and_activity() {
        let view = view();

        let screen = render_to_string(100, 24, |frame| render(frame, frame.area(), &view));

        assert!(screen.contains("1342"));
        assert!(screen.contains("Qualified      89"));
        assert!(screen.contains("█"));
        assert!(screen.contains("Email sent to Acme Corp [Grok]"));
    }

    #[test]
    fn test_dashboard_shows_error() {
        let mut view = view();
        view.data = Resource::new();
        view.data.begin(1);
        view.data.fail(1, "Cannot reach the backend");

        let screen = render_to_string(100, 24, |frame| render(frame, frame.area(), &view));

        assert!(screen.contains("Error: Cannot reach the backend"));
        assert!(screen.contains("No pipeline data"));
    }
}
