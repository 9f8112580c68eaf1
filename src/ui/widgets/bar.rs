//! Horizontal bar widget for counts and percentages

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Partial block characters in eighths, for the fractional end of a bar
const EIGHTHS: [char; 8] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// A single-row bar filled in proportion to `value / max`
pub struct Bar {
    value: f64,
    max: f64,
    style: Style,
    track_style: Style,
}

impl Bar {
    pub fn new(value: f64, max: f64) -> Self {
        Self {
            value,
            max,
            style: Style::default().fg(Color::Cyan),
            track_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Number of filled eighths for a bar `width` cells wide
    fn filled_eighths(&self, width: u16) -> usize {
        if self.max <= 0.0 {
            return 0;
        }
        let ratio = (self.value / self.max).clamp(0.0, 1.0);
        (ratio * f64::from(width) * 8.0).round() as usize
    }
}

impl Widget for Bar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let eighths = self.filled_eighths(area.width);
        let full = eighths / 8;
        let remainder = eighths % 8;

        for i in 0..area.width as usize {
            let (symbol, style) = if i < full {
                ('█', self.style)
            } else if i == full && remainder > 0 {
                (EIGHTHS[remainder - 1], self.style)
            } else {
                ('·', self.track_style)
            };
            if let Some(cell) = buf.cell_mut((area.x + i as u16, area.y)) {
                cell.set_char(symbol).set_style(style);
            }
        }
    }
}
