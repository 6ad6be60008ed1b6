use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{session::SessionSummary, ui::geometry::centered_rect};

/// Modal shown after a session stops
pub struct SummaryDialog<'a> {
    summary: &'a SessionSummary,
    accent: Color,
}

impl<'a> SummaryDialog<'a> {
    pub fn new(summary: &'a SessionSummary, accent: Color) -> Self {
        Self { summary, accent }
    }

    fn lines(&self) -> Vec<String> {
        vec![
            format!(
                "Total time: {}",
                format_seconds(self.summary.total_elapsed_seconds)
            ),
            format!("Breaths completed: {}", self.summary.breath_count),
            format!(
                "Finished at {}",
                self.summary.finished_at.format("%H:%M:%S")
            ),
        ]
    }
}

impl Widget for SummaryDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body = self.lines();
        let hint = "(enter) close";

        let inner_width = body
            .iter()
            .map(|l| l.width())
            .chain(std::iter::once(hint.width()))
            .max()
            .unwrap_or_default() as u16;
        // borders + one column of padding on each side
        let width = inner_width + 4;
        // borders + body + blank line + hint
        let height = body.len() as u16 + 4;

        let rect = centered_rect(width, height, area);

        let mut text: Vec<Line> = body
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().add_modifier(Modifier::BOLD))))
            .collect();
        text.push(Line::default());
        text.push(Line::from(Span::styled(
            hint,
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        )));

        Clear.render(rect, buf);
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Session Summary ")
                    .title_alignment(Alignment::Center)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.accent)),
            )
            .render(rect, buf);
    }
}

/// "1 second", "42 seconds", "2 min 5 s"
pub fn format_seconds(secs: u64) -> String {
    match secs {
        1 => "1 second".to_string(),
        s if s < 60 => format!("{s} seconds"),
        s => format!("{} min {} s", s / 60, s % 60),
    }
}
