use ratatui::layout::Rect;

use crate::animator::AnimationFrame;

/// Canvas margin around the unit square so the marker's pulse stays visible
pub const CANVAS_PADDING: f64 = 0.15;

/// Radius of the marker's resting ring, in canvas units
pub const MARKER_RADIUS: f64 = 0.035;
const PULSE_GROWTH: f64 = 1.5;
const PULSE_VISIBLE_UNTIL: f64 = 0.85;

/// Largest area inside `area` that renders as a square on a terminal whose
/// cells are about twice as tall as they are wide
pub fn square_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// (left, bottom, side) of the breathing square in canvas coordinates.
/// The square stays centered while it shrinks.
pub fn square_bounds(frame: &AnimationFrame) -> (f64, f64, f64) {
    let side = frame.size_fraction;
    let offset = (1.0 - side) / 2.0;
    (offset, offset, side)
}

/// Marker center in canvas coordinates (y up)
pub fn marker_point(frame: &AnimationFrame) -> (f64, f64) {
    let offset = (1.0 - frame.size_fraction) / 2.0;
    (
        offset + frame.position.x,
        1.0 - (offset + frame.position.y),
    )
}

/// Radii of the marker's two expanding rings, the second trailing by half a
/// period; rings fade out before they wrap
pub fn pulse_radii(pulse: f64) -> Vec<f64> {
    [pulse, (pulse + 0.5) % 1.0]
        .into_iter()
        .filter(|p| *p < PULSE_VISIBLE_UNTIL)
        .map(|p| MARKER_RADIUS * (1.0 + PULSE_GROWTH * p))
        .collect()
}

/// A single text row at `fraction` of the way down `area`
pub fn text_row(area: Rect, fraction: f64) -> Rect {
    let offset = ((area.height.saturating_sub(1)) as f64 * fraction.clamp(0.0, 1.0)).round() as u16;
    Rect {
        x: area.x,
        y: area.y + offset,
        width: area.width,
        height: area.height.min(1),
    }
}

/// A `width` x `height` rect centered in `area`, shrunk to fit
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
