//! Phase animator: a pure mapping from elapsed session time to what the
//! breathing square looks like at that instant.
//!
//! Nothing here holds state. Every frame is recomputed from absolute elapsed
//! time, so frames can be sampled at any rate, skipped, or recomputed after a
//! pause without drift.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::BreathError,
    theme::{ColorTheme, Rgb},
};

/// Visual dwell at both edges of every phase
pub const EDGE_DWELL: Duration = Duration::from_millis(200);

/// Period of the marker's pulse ring
pub const PULSE_PERIOD: Duration = Duration::from_millis(2000);

/// Square size at the bottom of an exhale, as a fraction of full size
pub const MIN_SIZE_FRACTION: f64 = 0.75;

const PHASES_PER_CYCLE: u64 = 4;

/// Marker path, clockwise: UpperRight, LowerRight, LowerLeft, UpperLeft.
/// Unit square, y grows downwards.
const CORNERS: [Point; 4] = [
    Point::new(1.0, 0.0),
    Point::new(1.0, 1.0),
    Point::new(0.0, 1.0),
    Point::new(0.0, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Exhale,
    HoldEmpty,
    Inhale,
    HoldFull,
}

impl Phase {
    pub fn from_index(index: usize) -> Phase {
        match index % 4 {
            0 => Phase::Exhale,
            1 => Phase::HoldEmpty,
            2 => Phase::Inhale,
            _ => Phase::HoldFull,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Phase::Exhale => 0,
            Phase::HoldEmpty => 1,
            Phase::Inhale => 2,
            Phase::HoldFull => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Exhale => "Exhale",
            Phase::HoldEmpty | Phase::HoldFull => "Hold",
            Phase::Inhale => "Inhale",
        }
    }
}

/// Length of each of the four phases. Only 4, 5 and 6 seconds are offered,
/// which keeps every phase comfortably longer than both edge dwells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum PhaseDuration {
    #[default]
    Four,
    Five,
    Six,
}

impl PhaseDuration {
    pub const ALL: [PhaseDuration; 3] =
        [PhaseDuration::Four, PhaseDuration::Five, PhaseDuration::Six];

    pub fn seconds(self) -> u64 {
        match self {
            PhaseDuration::Four => 4,
            PhaseDuration::Five => 5,
            PhaseDuration::Six => 6,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.seconds())
    }

    pub fn next(self) -> PhaseDuration {
        match self {
            PhaseDuration::Four => PhaseDuration::Five,
            PhaseDuration::Five => PhaseDuration::Six,
            PhaseDuration::Six => PhaseDuration::Four,
        }
    }

    fn micros(self) -> u64 {
        self.seconds() * 1_000_000
    }
}

impl TryFrom<u64> for PhaseDuration {
    type Error = BreathError;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        match seconds {
            4 => Ok(PhaseDuration::Four),
            5 => Ok(PhaseDuration::Five),
            6 => Ok(PhaseDuration::Six),
            other => Err(BreathError::InvalidConfig(format!(
                "phase duration must be 4, 5 or 6 seconds, got {other}"
            ))),
        }
    }
}

impl From<PhaseDuration> for u64 {
    fn from(d: PhaseDuration) -> u64 {
        d.seconds()
    }
}

impl FromStr for PhaseDuration {
    type Err = BreathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = s
            .trim()
            .parse::<u64>()
            .map_err(|_| BreathError::InvalidConfig(format!("not a number of seconds: {s:?}")))?;
        PhaseDuration::try_from(seconds)
    }
}

impl fmt::Display for PhaseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, to: Point, t: f64) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    fn scale(self, factor: f64) -> Point {
        Point {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Everything needed to draw one instant of the animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub phase: Phase,
    /// Eased progress through the current phase, in [0, 1]
    pub progress: f64,
    /// Marker position relative to the square's top-left corner, in units of
    /// the full square size (already scaled by `size_fraction`)
    pub position: Point,
    /// Square side as a fraction of its full size, in [0.75, 1]
    pub size_fraction: f64,
    pub color: Rgb,
    /// Whole seconds left in the current phase, rounded up
    pub countdown_seconds: u64,
    /// Position within the marker's pulse period, in [0, 1)
    pub pulse: f64,
}

impl AnimationFrame {
    pub fn phase_index(&self) -> usize {
        self.phase.index()
    }
}

/// Apply the edge dwell to a raw phase fraction: progress sits at 0 for the
/// first dwell, at 1 for the last dwell, and is linear in between.
pub fn ease_progress(raw: f64, phase_duration: PhaseDuration) -> f64 {
    let pause_frac = EDGE_DWELL.as_micros() as f64 / phase_duration.micros() as f64;

    if raw < pause_frac {
        0.0
    } else if raw > 1.0 - pause_frac {
        1.0
    } else {
        ((raw - pause_frac) / (1.0 - 2.0 * pause_frac)).clamp(0.0, 1.0)
    }
}

/// Number of phases fully completed after `elapsed`
pub fn completed_phases(elapsed: Duration, phase_duration: PhaseDuration) -> u64 {
    elapsed.as_micros() as u64 / phase_duration.micros()
}

/// Compute the animation state `elapsed` after the session anchor
pub fn compute_frame(
    elapsed: Duration,
    phase_duration: PhaseDuration,
    theme: ColorTheme,
) -> AnimationFrame {
    let elapsed_us = elapsed.as_micros() as u64;
    let phase_us = phase_duration.micros();
    let cycle_us = elapsed_us % (phase_us * PHASES_PER_CYCLE);

    let phase_index = ((cycle_us / phase_us) % PHASES_PER_CYCLE) as usize;
    let phase = Phase::from_index(phase_index);
    let into_phase_us = cycle_us % phase_us;

    let raw = into_phase_us as f64 / phase_us as f64;
    let progress = ease_progress(raw, phase_duration);

    let size_fraction = match phase {
        Phase::Exhale => 1.0 - (1.0 - MIN_SIZE_FRACTION) * progress,
        Phase::HoldEmpty => MIN_SIZE_FRACTION,
        Phase::Inhale => MIN_SIZE_FRACTION + (1.0 - MIN_SIZE_FRACTION) * progress,
        Phase::HoldFull => 1.0,
    };

    let from = CORNERS[phase_index];
    let to = CORNERS[(phase_index + 1) % CORNERS.len()];
    let position = from.lerp(to, progress).scale(size_fraction);

    let (color1, color2) = theme.endpoints();
    let color = match phase {
        Phase::Exhale => color1.lerp(color2, progress),
        Phase::HoldEmpty => color2,
        Phase::Inhale => color2.lerp(color1, progress),
        Phase::HoldFull => color1,
    };

    let countdown_seconds = phase_us.saturating_sub(into_phase_us).div_ceil(1_000_000);

    let pulse_us = PULSE_PERIOD.as_micros() as u64;
    let pulse = (elapsed_us % pulse_us) as f64 / pulse_us as f64;

    AnimationFrame {
        phase,
        progress,
        position,
        size_fraction,
        color,
        countdown_seconds,
        pulse,
    }
}

/// The resting frame shown before a session starts and after it ends
pub fn rest_frame(phase_duration: PhaseDuration, theme: ColorTheme) -> AnimationFrame {
    compute_frame(Duration::ZERO, phase_duration, theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn phase_and_progress_stay_in_range() {
        for duration in PhaseDuration::ALL {
            for step in 0..2_000u64 {
                let frame = compute_frame(ms(step * 37), duration, ColorTheme::Default);
                assert!(frame.phase_index() < 4);
                assert!((0.0..=1.0).contains(&frame.progress));
                assert!((MIN_SIZE_FRACTION..=1.0).contains(&frame.size_fraction));
                assert!((0.0..1.0).contains(&frame.pulse));
            }
        }
    }

    #[test]
    fn frames_repeat_every_cycle() {
        for duration in PhaseDuration::ALL {
            let cycle = duration.seconds() * 4 * 1000;
            for t in [0, 1, 199, 200, 1234, 3999, 4000, 4200, 9_876, 15_999] {
                let a = compute_frame(ms(t), duration, ColorTheme::GreenPurple);
                let b = compute_frame(ms(t + cycle), duration, ColorTheme::GreenPurple);
                assert_eq!(a.phase, b.phase);
                assert_eq!(a.progress, b.progress);
                assert_eq!(a.position, b.position);
                assert_eq!(a.size_fraction, b.size_fraction);
                assert_eq!(a.color, b.color);
                assert_eq!(a.countdown_seconds, b.countdown_seconds);
            }
        }
    }

    #[test]
    fn same_input_same_frame() {
        let a = compute_frame(ms(7_321), PhaseDuration::Five, ColorTheme::RedYellow);
        let b = compute_frame(ms(7_321), PhaseDuration::Five, ColorTheme::RedYellow);
        assert_eq!(a, b);
    }

    #[test]
    fn countdown_never_increases_within_a_phase() {
        for duration in PhaseDuration::ALL {
            let phase_ms = duration.seconds() * 1000;
            let mut last = u64::MAX;
            for t in (0..phase_ms).step_by(50) {
                let frame = compute_frame(ms(t), duration, ColorTheme::Default);
                assert_eq!(frame.phase, Phase::Exhale);
                assert!(frame.countdown_seconds <= last);
                last = frame.countdown_seconds;
            }
            assert_eq!(last, 1);
        }
    }

    #[test]
    fn countdown_starts_at_full_duration() {
        let frame = compute_frame(ms(0), PhaseDuration::Six, ColorTheme::Default);
        assert_eq!(frame.countdown_seconds, 6);
        let frame = compute_frame(ms(999), PhaseDuration::Six, ColorTheme::Default);
        assert_eq!(frame.countdown_seconds, 6);
        let frame = compute_frame(ms(1000), PhaseDuration::Six, ColorTheme::Default);
        assert_eq!(frame.countdown_seconds, 5);
    }

    #[test]
    fn color_is_continuous_at_phase_boundaries() {
        for theme in ColorTheme::ALL {
            let (c1, c2) = theme.endpoints();
            // last dwell of the exhale equals the held empty color
            let end_exhale = compute_frame(ms(3_900), PhaseDuration::Four, theme);
            assert_eq!(end_exhale.progress, 1.0);
            assert_eq!(end_exhale.color, c2);
            let hold = compute_frame(ms(4_000), PhaseDuration::Four, theme);
            assert_eq!(hold.color, c2);

            let start_inhale = compute_frame(ms(8_100), PhaseDuration::Four, theme);
            assert_eq!(start_inhale.progress, 0.0);
            assert_eq!(start_inhale.color, c2);

            let end_inhale = compute_frame(ms(11_900), PhaseDuration::Four, theme);
            assert_eq!(end_inhale.color, c1);
            let hold_full = compute_frame(ms(12_000), PhaseDuration::Four, theme);
            assert_eq!(hold_full.color, c1);

            let start_exhale = compute_frame(ms(16_050), PhaseDuration::Four, theme);
            assert_eq!(start_exhale.color, c1);
        }
    }

    #[test]
    fn edge_dwell_clamps_progress() {
        let d = PhaseDuration::Four;
        assert_eq!(ease_progress(0.0, d), 0.0);
        assert_eq!(ease_progress(0.049, d), 0.0);
        assert_eq!(ease_progress(0.951, d), 1.0);
        assert!(approx(ease_progress(0.5, d), 0.5));
        // 0.05 .. 0.95 remaps linearly onto 0 .. 1
        assert!(approx(ease_progress(0.14, d), 0.1));
    }

    #[test]
    fn marker_walks_corners_clockwise() {
        let d = PhaseDuration::Four;
        let theme = ColorTheme::Default;

        let start = compute_frame(ms(0), d, theme);
        assert_eq!(start.position, Point::new(1.0, 0.0));

        // middle of the exhale: halfway down the right edge of a shrinking square
        let mid = compute_frame(ms(2_000), d, theme);
        assert!(approx(mid.progress, 0.5));
        assert!(approx(mid.size_fraction, 0.875));
        assert!(approx(mid.position.x, 0.875));
        assert!(approx(mid.position.y, 0.4375));

        let lower_right = compute_frame(ms(4_000), d, theme);
        assert!(approx(lower_right.position.x, 0.75));
        assert!(approx(lower_right.position.y, 0.75));

        let lower_left = compute_frame(ms(8_000), d, theme);
        assert!(approx(lower_left.position.x, 0.0));
        assert!(approx(lower_left.position.y, 0.75));

        let upper_left = compute_frame(ms(12_000), d, theme);
        assert_eq!(upper_left.position, Point::new(0.0, 0.0));
    }

    #[test]
    fn square_shrinks_holds_grows_holds() {
        let d = PhaseDuration::Five;
        let theme = ColorTheme::Default;
        assert_eq!(compute_frame(ms(100), d, theme).size_fraction, 1.0);
        assert_eq!(compute_frame(ms(4_900), d, theme).size_fraction, 0.75);
        assert_eq!(compute_frame(ms(7_500), d, theme).size_fraction, 0.75);
        assert!(approx(compute_frame(ms(12_500), d, theme).size_fraction, 0.875));
        assert_eq!(compute_frame(ms(17_500), d, theme).size_fraction, 1.0);
    }

    #[test]
    fn hold_scenario_two_hundred_ms_in() {
        let frame = compute_frame(ms(4_200), PhaseDuration::Four, ColorTheme::Default);
        assert_eq!(frame.phase_index(), 1);
        assert_eq!(frame.phase, Phase::HoldEmpty);
        assert!(frame.progress.abs() < 1e-9);
        assert_eq!(frame.size_fraction, 0.75);
        assert_eq!(frame.color, ColorTheme::Default.endpoints().1);
        assert_eq!(frame.countdown_seconds, 4);
    }

    #[test]
    fn completed_phases_counts_boundaries() {
        assert_eq!(completed_phases(ms(3_999), PhaseDuration::Four), 0);
        assert_eq!(completed_phases(ms(4_000), PhaseDuration::Four), 1);
        assert_eq!(completed_phases(ms(16_000), PhaseDuration::Four), 4);
        assert_eq!(completed_phases(ms(29_999), PhaseDuration::Six), 4);
    }

    #[test]
    fn rest_frame_is_full_size_at_upper_right() {
        let frame = rest_frame(PhaseDuration::Six, ColorTheme::GreenPurple);
        assert_eq!(frame.size_fraction, 1.0);
        assert_eq!(frame.position, Point::new(1.0, 0.0));
        assert_eq!(frame.color, ColorTheme::GreenPurple.endpoints().0);
    }

    #[test]
    fn pulse_wraps_every_two_seconds() {
        let d = PhaseDuration::Four;
        assert_eq!(compute_frame(ms(0), d, ColorTheme::Default).pulse, 0.0);
        assert!(approx(compute_frame(ms(500), d, ColorTheme::Default).pulse, 0.25));
        assert_eq!(compute_frame(ms(2_000), d, ColorTheme::Default).pulse, 0.0);
    }

    #[test]
    fn phase_duration_parsing() {
        assert_eq!("5".parse::<PhaseDuration>().unwrap(), PhaseDuration::Five);
        assert_eq!(PhaseDuration::try_from(6).unwrap(), PhaseDuration::Six);
        assert!(matches!(
            "7".parse::<PhaseDuration>(),
            Err(BreathError::InvalidConfig(_))
        ));
        assert!(matches!(
            "four".parse::<PhaseDuration>(),
            Err(BreathError::InvalidConfig(_))
        ));
        assert!(serde_json::from_str::<PhaseDuration>("3").is_err());
        assert_eq!(serde_json::to_string(&PhaseDuration::Four).unwrap(), "4");
    }

    #[test]
    fn phase_labels() {
        let labels: Vec<_> = (0..4).map(|i| Phase::from_index(i).label()).collect();
        assert_eq!(labels, ["Exhale", "Hold", "Inhale", "Hold"]);
    }
}
