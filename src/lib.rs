// Library surface for the binary, headless integration tests and reuse.
pub mod animator;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod runtime;
pub mod session;
pub mod theme;
pub mod ui;

pub use animator::{compute_frame, AnimationFrame, Phase, PhaseDuration};
pub use error::BreathError;
pub use session::{BreathingSession, SessionStatus, SessionSummary};
pub use theme::ColorTheme;
