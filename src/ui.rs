pub mod geometry;
pub mod summary;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points, Rectangle},
        Paragraph, Widget, Wrap,
    },
};

use crate::{
    animator::AnimationFrame,
    app::App,
    clock::Clock,
    session::{SessionStatus, SessionView},
    theme::Rgb,
    ui::{
        geometry::{
            marker_point, pulse_radii, square_area, square_bounds, text_row,
            CANVAS_PADDING, MARKER_RADIUS,
        },
        summary::SummaryDialog,
    },
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.session.view();
        let accent: Color = view.frame.color.into();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // padding
                Constraint::Min(4),    // breathing square
                Constraint::Length(1), // settings
                Constraint::Length(1), // key legend
                Constraint::Length(1), // status message
            ])
            .split(area);

        Paragraph::new(Span::styled("Box Breathing", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let box_area = square_area(chunks[2]);
        render_square(&view.frame, box_area, buf);

        match view.status {
            SessionStatus::Running | SessionStatus::Paused => {
                render_phase_text(&view, box_area, buf);
            }
            SessionStatus::Ready if view.show_lead_in => {
                Paragraph::new(Span::styled(
                    "Ready to exhale",
                    Style::default().fg(Color::Gray).patch(italic_style),
                ))
                .alignment(Alignment::Center)
                .render(text_row(box_area, 0.5), buf);
            }
            SessionStatus::Idle if !self.has_started => {
                let instruction = format!(
                    "Exhale, hold, inhale, and hold again, each for {} seconds",
                    view.phase_duration.seconds()
                );
                let inner = Rect {
                    x: box_area.x + box_area.width / 5,
                    width: box_area.width - 2 * (box_area.width / 5),
                    ..text_row(box_area, 0.45)
                };
                Paragraph::new(Span::styled(
                    instruction,
                    Style::default().fg(Color::Gray).patch(italic_style),
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(
                    Rect {
                        height: box_area.height.min(3),
                        ..inner
                    },
                    buf,
                );
            }
            _ => {}
        }

        Paragraph::new(settings_line(&view))
            .style(dim_style)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        Paragraph::new(Span::styled(legend(view.status), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if let Some(message) = &self.message {
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
        }

        if let Some(summary) = self.session.summary() {
            SummaryDialog::new(summary, accent).render(area, buf);
        }
    }
}

/// Draw the square outline and the pulsing marker on a braille canvas
fn render_square(frame: &AnimationFrame, area: Rect, buf: &mut Buffer) {
    let color: Color = frame.color.into();
    let (left, bottom, side) = square_bounds(frame);
    let marker = marker_point(frame);
    let rings = pulse_radii(frame.pulse);

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-CANVAS_PADDING, 1.0 + CANVAS_PADDING])
        .y_bounds([-CANVAS_PADDING, 1.0 + CANVAS_PADDING])
        .paint(|ctx| {
            ctx.draw(&Rectangle {
                x: left,
                y: bottom,
                width: side,
                height: side,
                color,
            });
            for radius in &rings {
                ctx.draw(&Circle {
                    x: marker.0,
                    y: marker.1,
                    radius: *radius,
                    color,
                });
            }
            // filled dot
            ctx.layer();
            ctx.draw(&Circle {
                x: marker.0,
                y: marker.1,
                radius: MARKER_RADIUS / 2.0,
                color,
            });
            ctx.draw(&Points {
                coords: &[marker],
                color,
            });
        })
        .render(area, buf);
}

fn render_phase_text(view: &SessionView, area: Rect, buf: &mut Buffer) {
    let frame = &view.frame;
    let color: Color = frame.color.into();

    let mut label = frame.phase.label().to_string();
    if view.status == SessionStatus::Paused {
        label.push_str(" (paused)");
    }

    Paragraph::new(Span::styled(
        label,
        Style::default()
            .fg(color)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(text_row(area, 0.4), buf);

    Paragraph::new(Span::styled(
        frame.countdown_seconds.to_string(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(text_row(area, 0.65), buf);
}

fn settings_line(view: &SessionView) -> Line<'static> {
    let elapsed = view.elapsed.as_secs();
    let sound = if view.audio.muted { "muted" } else { "on" };

    Line::from(vec![
        Span::raw(format!("duration {}", view.phase_duration)),
        Span::raw("  ·  "),
        Span::raw(format!("theme {}", view.theme)),
        Span::raw("  ·  "),
        Span::raw(format!("music {} ({sound})", view.audio.music)),
        Span::raw("  ·  "),
        Span::raw(format!(
            "breaths {}  {:02}:{:02}",
            view.breath_count,
            elapsed / 60,
            elapsed % 60
        )),
    ])
}

fn legend(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Running => "(space) pause / (s)top / (u) music / (m)ute / (q)uit",
        SessionStatus::Paused => "(space) resume / (s)top / (u) music / (m)ute / (q)uit",
        SessionStatus::Ready => "(s)top / (u) music / (m)ute / (q)uit",
        SessionStatus::Idle | SessionStatus::Stopped => {
            "(space) start / (d)uration / (t)heme / (u) music / (m)ute / (q)uit"
        }
    }
}
