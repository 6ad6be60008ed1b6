use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    clock::Clock,
    config::Config,
    error::BreathError,
    session::{BreathingSession, SessionStatus},
};

/// Application shell: maps keys onto session operations
#[derive(Debug)]
pub struct App<C: Clock> {
    pub session: BreathingSession<C>,
    /// Transient feedback shown in the control bar, e.g. a rejected change
    pub message: Option<String>,
    /// Whether any session has been started since launch
    pub has_started: bool,
    pub should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(clock: C, config: Config) -> Self {
        let mut session = BreathingSession::with_settings(clock, config.phase_duration, config.theme);
        session.set_music(config.music);
        session.set_muted(config.muted);

        Self {
            session,
            message: None,
            has_started: false,
            should_quit: false,
        }
    }

    /// Preferences as currently selected, for saving on exit
    pub fn config(&self) -> Config {
        let state = self.session.state();
        let audio = self.session.audio();
        Config {
            phase_duration: state.phase_duration,
            theme: state.theme,
            music: audio.music,
            muted: audio.muted,
        }
    }

    pub fn on_tick(&mut self) {
        self.session.on_tick();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // an open summary swallows the dismiss keys
        if self.session.summary().is_some()
            && matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('c'))
        {
            self.session.close();
            return;
        }

        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                if self.session.status() != SessionStatus::Running {
                    self.has_started = true;
                }
                self.session.toggle();
            }
            KeyCode::Char('s') => {
                self.session.stop();
            }
            KeyCode::Char('d') => {
                let next = self.session.state().phase_duration.next();
                let result = self.session.set_duration(next);
                self.report(result);
            }
            KeyCode::Char('t') => {
                let next = self.session.state().theme.next();
                let result = self.session.set_theme(next);
                self.report(result);
            }
            KeyCode::Char('u') => {
                let next = self.session.audio().music.next();
                self.session.set_music(next);
            }
            KeyCode::Char('m') => self.session.toggle_mute(),
            _ => {}
        }
    }

    fn report(&mut self, result: Result<(), BreathError>) {
        if let Err(err) = result {
            self.message = Some(format!("{err} (stop first)"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animator::PhaseDuration, clock::ManualClock, session::MusicTrack, session::LEAD_IN,
        theme::ColorTheme,
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (App::new(clock.clone(), Config::default()), clock)
    }

    #[test]
    fn new_app_applies_config() {
        let cfg = Config {
            phase_duration: PhaseDuration::Five,
            theme: ColorTheme::RedYellow,
            music: MusicTrack::River,
            muted: true,
        };
        let app = App::new(ManualClock::new(), cfg);
        assert_eq!(app.config(), cfg);
        assert_eq!(app.session.status(), SessionStatus::Idle);
        assert!(!app.has_started);
    }

    #[test]
    fn space_starts_pauses_and_resumes() {
        let (mut app, clock) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.status(), SessionStatus::Ready);
        assert!(app.has_started);

        clock.advance(LEAD_IN);
        app.on_tick();
        assert_eq!(app.session.status(), SessionStatus::Running);

        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.status(), SessionStatus::Paused);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.session.status(), SessionStatus::Running);
    }

    #[test]
    fn stop_opens_summary_and_enter_closes_it() {
        let (mut app, clock) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        clock.advance(LEAD_IN);
        app.on_tick();
        clock.advance_ms(8_000);
        app.on_tick();

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.session.status(), SessionStatus::Stopped);
        assert_eq!(app.session.summary().unwrap().total_elapsed_seconds, 8);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.session.summary().is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn esc_closes_summary_before_quitting() {
        let (mut app, _clock) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.should_quit);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn config_keys_cycle_when_idle() {
        let (mut app, _clock) = app();
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('t')));
        app.handle_key(key(KeyCode::Char('u')));
        app.handle_key(key(KeyCode::Char('m')));

        let cfg = app.config();
        assert_eq!(cfg.phase_duration, PhaseDuration::Five);
        assert_eq!(cfg.theme, ColorTheme::GreenPurple);
        assert_eq!(cfg.music, MusicTrack::River);
        assert!(cfg.muted);
        assert!(app.message.is_none());
    }

    #[test]
    fn config_keys_rejected_mid_session() {
        let (mut app, _clock) = app();
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Char('d')));

        assert_eq!(app.config().phase_duration, PhaseDuration::Four);
        let message = app.message.clone().expect("rejection message");
        assert!(message.contains("cannot change duration while the session is ready"));

        // music stays adjustable
        app.handle_key(key(KeyCode::Char('u')));
        assert_eq!(app.config().music, MusicTrack::River);
        assert!(app.message.is_none());
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut app, _clock) = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
