use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    animator::{self, AnimationFrame, PhaseDuration},
    clock::Clock,
    error::BreathError,
    theme::ColorTheme,
};

/// Delay between pressing start and the first exhale
pub const LEAD_IN: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Ready,
    Running,
    Paused,
    Stopped,
}

impl SessionStatus {
    /// Whether duration and theme may be changed
    pub fn is_configurable(self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Stopped)
    }
}

/// Background track selection. Stored and displayed only, never played.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum MusicTrack {
    #[default]
    None,
    River,
    Gong,
    Harp,
}

impl MusicTrack {
    pub fn next(self) -> MusicTrack {
        match self {
            MusicTrack::None => MusicTrack::River,
            MusicTrack::River => MusicTrack::Gong,
            MusicTrack::Gong => MusicTrack::Harp,
            MusicTrack::Harp => MusicTrack::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioSettings {
    pub music: MusicTrack,
    pub muted: bool,
}

/// A one-shot callback due at `due`. Dropping the handle cancels it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: u64,
    pub due: Instant,
}

impl ScheduledTask {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

/// Shown once when a session stops, until closed
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub total_elapsed_seconds: u64,
    pub breath_count: u64,
    pub finished_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    pub phase_duration: PhaseDuration,
    pub theme: ColorTheme,
    pub anchor: Option<Instant>,
    pub paused_elapsed: Option<Duration>,
    /// Completed phases since the session began
    pub cycle_count: u64,
    pub total_elapsed_seconds: Option<u64>,
    pub lead_in: Option<ScheduledTask>,
}

impl SessionState {
    pub fn new(phase_duration: PhaseDuration, theme: ColorTheme) -> Self {
        Self {
            status: SessionStatus::Idle,
            phase_duration,
            theme,
            anchor: None,
            paused_elapsed: None,
            cycle_count: 0,
            total_elapsed_seconds: None,
            lead_in: None,
        }
    }

    pub fn breath_count(&self) -> u64 {
        self.cycle_count / 4
    }
}

/// Snapshot handed to the presentation layer once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub frame: AnimationFrame,
    pub show_lead_in: bool,
    pub phase_duration: PhaseDuration,
    pub theme: ColorTheme,
    pub audio: AudioSettings,
    pub breath_count: u64,
    pub elapsed: Duration,
}

/// Owns the session lifecycle and feeds elapsed time to the animator
#[derive(Debug)]
pub struct BreathingSession<C: Clock> {
    clock: C,
    state: SessionState,
    audio: AudioSettings,
    summary: Option<SessionSummary>,
    next_task_id: u64,
}

impl<C: Clock> BreathingSession<C> {
    pub fn new(clock: C) -> Self {
        Self::with_settings(clock, PhaseDuration::default(), ColorTheme::default())
    }

    pub fn with_settings(clock: C, phase_duration: PhaseDuration, theme: ColorTheme) -> Self {
        Self {
            clock,
            state: SessionState::new(phase_duration, theme),
            audio: AudioSettings::default(),
            summary: None,
            next_task_id: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn audio(&self) -> AudioSettings {
        self.audio
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Start a fresh session, or resume a paused one
    pub fn start(&mut self) {
        let now = self.clock.now();

        match self.state.status {
            SessionStatus::Paused => {
                let paused = self.state.paused_elapsed.take().unwrap_or_default();
                self.state.anchor = Some(now.checked_sub(paused).unwrap_or(now));
                self.state.status = SessionStatus::Running;
                debug!(elapsed_ms = paused.as_millis() as u64, "session resumed");
            }
            SessionStatus::Idle | SessionStatus::Stopped => {
                self.next_task_id += 1;
                self.state.lead_in = Some(ScheduledTask {
                    id: self.next_task_id,
                    due: now + LEAD_IN,
                });
                self.state.status = SessionStatus::Ready;
                self.state.anchor = None;
                self.state.paused_elapsed = None;
                self.state.cycle_count = 0;
                self.state.total_elapsed_seconds = None;
                self.summary = None;
                info!(
                    phase_secs = self.state.phase_duration.seconds(),
                    theme = %self.state.theme,
                    "session starting"
                );
            }
            SessionStatus::Ready | SessionStatus::Running => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state.status != SessionStatus::Running {
            return;
        }
        let elapsed = self.elapsed();
        self.state.paused_elapsed = Some(elapsed);
        self.state.anchor = None;
        self.state.status = SessionStatus::Paused;
        debug!(elapsed_ms = elapsed.as_millis() as u64, "session paused");
    }

    pub fn toggle(&mut self) {
        if self.state.status == SessionStatus::Running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Finish the session and publish its summary
    pub fn stop(&mut self) -> Option<&SessionSummary> {
        match self.state.status {
            SessionStatus::Idle | SessionStatus::Stopped => return None,
            SessionStatus::Ready | SessionStatus::Running | SessionStatus::Paused => {}
        }

        if let Some(task) = self.state.lead_in.take() {
            debug!(task = task.id, "lead-in cancelled");
        }

        let elapsed = self.elapsed();
        // settle any phases completed since the last tick
        self.count_phases(elapsed);
        let total = elapsed.as_secs();

        self.state.total_elapsed_seconds = Some(total);
        self.state.anchor = None;
        self.state.paused_elapsed = None;
        self.state.status = SessionStatus::Stopped;

        info!(
            total_secs = total,
            breaths = self.state.breath_count(),
            "session stopped"
        );

        self.summary = Some(SessionSummary {
            total_elapsed_seconds: total,
            breath_count: self.state.breath_count(),
            finished_at: Local::now(),
        });
        self.summary.as_ref()
    }

    /// Dismiss the summary dialog
    pub fn close(&mut self) {
        self.summary = None;
    }

    /// Advance one frame: fire the lead-in when due and recount phases.
    /// Returns the frame to draw while running.
    pub fn on_tick(&mut self) -> Option<AnimationFrame> {
        let now = self.clock.now();

        if self.state.status == SessionStatus::Ready {
            match self.state.lead_in {
                Some(task) if task.is_due(now) => {
                    // anchor on the deadline, not on whichever tick noticed it
                    self.state.lead_in = None;
                    self.state.anchor = Some(task.due);
                    self.state.status = SessionStatus::Running;
                    debug!(
                        task = task.id,
                        late_ms = now.saturating_duration_since(task.due).as_millis() as u64,
                        "lead-in complete"
                    );
                }
                _ => return None,
            }
        }

        if self.state.status != SessionStatus::Running {
            return None;
        }

        let elapsed = self.elapsed();
        self.count_phases(elapsed);
        Some(animator::compute_frame(
            elapsed,
            self.state.phase_duration,
            self.state.theme,
        ))
    }

    fn count_phases(&mut self, elapsed: Duration) {
        let completed = animator::completed_phases(elapsed, self.state.phase_duration);
        if completed > self.state.cycle_count {
            let breaths_before = self.state.breath_count();
            self.state.cycle_count = completed;
            if self.state.breath_count() > breaths_before {
                debug!(breaths = self.state.breath_count(), "breath completed");
            }
        }
    }

    /// Animation time since the anchor, with paused intervals removed
    pub fn elapsed(&self) -> Duration {
        match self.state.status {
            SessionStatus::Running => self
                .state
                .anchor
                .map(|anchor| self.clock.now().saturating_duration_since(anchor))
                .unwrap_or_default(),
            SessionStatus::Paused => self.state.paused_elapsed.unwrap_or_default(),
            SessionStatus::Idle | SessionStatus::Ready | SessionStatus::Stopped => Duration::ZERO,
        }
    }

    pub fn set_duration(&mut self, phase_duration: PhaseDuration) -> Result<(), BreathError> {
        self.ensure_configurable("change duration")?;
        self.state.phase_duration = phase_duration;
        debug!(phase_secs = phase_duration.seconds(), "duration changed");
        Ok(())
    }

    pub fn set_theme(&mut self, theme: ColorTheme) -> Result<(), BreathError> {
        self.ensure_configurable("change theme")?;
        self.state.theme = theme;
        debug!(%theme, "theme changed");
        Ok(())
    }

    pub fn set_music(&mut self, music: MusicTrack) {
        self.audio.music = music;
    }

    pub fn toggle_mute(&mut self) {
        self.audio.muted = !self.audio.muted;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.muted = muted;
    }

    fn ensure_configurable(&self, operation: &'static str) -> Result<(), BreathError> {
        if self.state.status.is_configurable() {
            Ok(())
        } else {
            warn!(operation, status = %self.state.status, "configuration change rejected");
            Err(BreathError::InvalidState {
                operation,
                status: self.state.status,
            })
        }
    }

    pub fn view(&self) -> SessionView {
        let elapsed = self.elapsed();
        let frame = match self.state.status {
            SessionStatus::Running | SessionStatus::Paused => {
                animator::compute_frame(elapsed, self.state.phase_duration, self.state.theme)
            }
            SessionStatus::Idle | SessionStatus::Ready | SessionStatus::Stopped => {
                animator::rest_frame(self.state.phase_duration, self.state.theme)
            }
        };

        SessionView {
            status: self.state.status,
            frame,
            show_lead_in: self.state.status == SessionStatus::Ready,
            phase_duration: self.state.phase_duration,
            theme: self.state.theme,
            audio: self.audio,
            breath_count: self.state.breath_count(),
            elapsed,
        }
    }
}
