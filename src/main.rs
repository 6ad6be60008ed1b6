use boxbreath::{
    animator::PhaseDuration,
    app::App,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{BreathEvent, CrosstermEventSource, Runner},
    session::MusicTrack,
    theme::ColorTheme,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

/// guided box breathing in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Exhale, hold, inhale, and hold again. A square shrinks and grows while a marker traces its edges, one side per phase."
)]
pub struct Cli {
    /// seconds per phase (4, 5 or 6)
    #[clap(short = 'd', long)]
    duration: Option<PhaseDuration>,

    /// color theme
    #[clap(short = 't', long, value_enum)]
    theme: Option<ColorTheme>,

    /// background music selection
    #[clap(long, value_enum)]
    music: Option<MusicTrack>,

    /// start with sound muted
    #[clap(short = 'm', long)]
    mute: bool,

    /// milliseconds between animation frames
    #[clap(long, default_value_t = 33)]
    tick_rate_ms: u64,

    /// write diagnostic logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// remember the selected duration, theme and music for next time
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Overlay command line choices on stored preferences
    fn apply(&self, mut config: Config) -> Config {
        if let Some(duration) = self.duration {
            config.phase_duration = duration;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(music) = self.music {
            config.music = music;
        }
        if self.mute {
            config.muted = true;
        }
        config
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    tracing::info!(?config, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let mut app = App::new(SystemClock, config);
    let result = run(&mut terminal, &mut app, Duration::from_millis(cli.tick_rate_ms.max(1)));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if cli.save {
        store.save(&app.config())?;
        tracing::info!(path = %store.path().display(), "preferences saved");
    }

    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<SystemClock>,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), SystemClock, tick);

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            BreathEvent::Tick => app.on_tick(),
            BreathEvent::Resize => {}
            BreathEvent::Key(key) => app.handle_key(key),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
