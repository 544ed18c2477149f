pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};
use wordfall::{
    config::{Config, ConfigStore, FileConfigStore},
    results::{CsvResultsLog, ResultsLog},
    runtime::{GameEvent, Input, Runner, TerminalInput, WallClock},
    session::{GameSession, GameSummary, ScorePopup, SessionConfig, SessionEvent},
    word_bank::{WordBank, WordBankError},
};

/// How long a score popup stays on screen.
const POPUP_TTL: Duration = Duration::from_millis(200);

/// falling-words typing game: type each word before it reaches the floor
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Words fall down the screen; type each one, followed by a space, before it reaches the floor. Fast typing scores more, misses cost points, and dropping below zero ends the game."
)]
pub struct Cli {
    /// number of words to spawn before the game is won
    #[clap(short = 'e', long)]
    enemies: Option<u32>,

    /// shortest delay between spawns in milliseconds
    #[clap(long)]
    min_delay_ms: Option<u64>,

    /// longest delay between spawns in milliseconds
    #[clap(long)]
    max_delay_ms: Option<u64>,

    /// word length to start with; it grows every 100 points
    #[clap(short = 'l', long)]
    start_level: Option<usize>,

    /// word list to draw from (one word per line, or comma separated rows)
    #[clap(short = 'w', long)]
    words: Option<PathBuf>,

    /// let any falling word take the input instead of only the oldest one
    #[clap(long)]
    lenient: bool,

    /// write the words that were not drawn back to the word list after each game
    #[clap(long)]
    persist_words: bool,

    /// do not append finished games to the results log
    #[clap(long)]
    no_results: bool,

    /// write logs to this file (filtered by RUST_LOG, info by default)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay command line flags on the persisted configuration
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(enemies) = self.enemies {
            cfg.enemies = enemies;
        }
        if let Some(min) = self.min_delay_ms {
            cfg.min_delay_ms = min;
        }
        if let Some(max) = self.max_delay_ms {
            cfg.max_delay_ms = max;
        }
        if let Some(level) = self.start_level {
            cfg.start_level = level;
        }
        if let Some(ref words) = self.words {
            cfg.word_list = Some(words.clone());
        }
        if self.lenient {
            cfg.strict_focus = false;
        }
        if self.persist_words {
            cfg.persist_words = true;
        }
        if self.no_results {
            cfg.log_results = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Playing,
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub popup: ScorePopup,
    pub expires_at: Duration,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub session: Option<GameSession<StdRng>>,
    /// Loop time at which the current game started.
    pub game_start: Duration,
    pub high_score: i64,
    pub popups: Vec<Popup>,
    pub last_summary: Option<GameSummary>,
    pub notice: Option<String>,
    results: Option<CsvResultsLog>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let results = config.log_results.then(CsvResultsLog::new);
        let high_score = results
            .as_ref()
            .and_then(|results_log| match results_log.best_score() {
                Ok(best) => best,
                Err(e) => {
                    log::warn!("could not read results log: {e}");
                    None
                }
            })
            .unwrap_or(0);

        Self {
            config,
            state: AppState::Menu,
            session: None,
            game_start: Duration::ZERO,
            high_score,
            popups: Vec::new(),
            last_summary: None,
            notice: None,
            results,
        }
    }

    #[cfg(test)]
    fn with_results_log(mut self, log: CsvResultsLog) -> Self {
        self.results = Some(log);
        self
    }

    /// Game time for loop time `at`
    fn game_time(&self, at: Duration) -> Duration {
        at.saturating_sub(self.game_start)
    }

    /// Route one input; `false` once the app should exit.
    pub fn on_input(&mut self, input: Input, at: Duration) -> bool {
        match (self.state, input) {
            (_, Input::Interrupt) => return false,
            (AppState::Playing, Input::Cancel) => self.quit_game(at),
            (AppState::Playing, Input::Char(c)) => self.on_char(c, at),
            (AppState::Menu, Input::Char('n') | Input::Confirm) => self.new_game(at),
            (AppState::Menu, Input::Char('q') | Input::Cancel) => return false,
            _ => {}
        }
        true
    }

    fn load_bank(&self) -> Result<WordBank, WordBankError> {
        match self.config.word_list {
            Some(ref path) => WordBank::load(path),
            None => WordBank::embedded(),
        }
    }

    pub fn new_game(&mut self, at: Duration) {
        let bank = match self.load_bank() {
            Ok(bank) => bank,
            Err(e) => {
                log::error!("cannot start a game: {e}");
                self.notice = Some(format!("Cannot load words: {e}"));
                return;
            }
        };

        self.notice = None;
        self.popups.clear();
        self.session = Some(GameSession::new(
            SessionConfig::from(&self.config),
            bank,
            StdRng::from_entropy(),
        ));
        self.game_start = at;
        self.state = AppState::Playing;
        self.on_tick(at);
    }

    pub fn on_tick(&mut self, at: Duration) {
        let now = self.game_time(at);
        if let Some(ref mut session) = self.session {
            session.advance(now);
        }
        self.pump(now);
    }

    pub fn on_char(&mut self, c: char, at: Duration) {
        let now = self.game_time(at);
        if let Some(ref mut session) = self.session {
            session.handle_key(c, now);
        }
        self.pump(now);
    }

    pub fn quit_game(&mut self, at: Duration) {
        let now = self.game_time(at);
        if let Some(ref mut session) = self.session {
            session.quit();
        }
        self.pump(now);
    }

    fn pump(&mut self, now: Duration) {
        self.popups.retain(|p| p.expires_at > now);

        let events = match self.session {
            Some(ref mut session) => session.drain_events(),
            None => return,
        };
        for event in events {
            match event {
                SessionEvent::WordResolved(popup) => self.popups.push(Popup {
                    popup,
                    expires_at: now + POPUP_TTL,
                }),
                SessionEvent::GameOver(summary) => self.end_game(summary),
                SessionEvent::StateChanged(_)
                | SessionEvent::WordSpawned { .. }
                | SessionEvent::SpawnSkipped { .. } => {}
            }
        }
    }

    fn end_game(&mut self, summary: GameSummary) {
        let Some(session) = self.session.take() else {
            return;
        };

        if self.config.persist_words {
            match self.config.word_list {
                Some(ref path) => persist_words(session.bank(), path),
                None => log::warn!("not persisting words: the built-in list is in use"),
            }
        }
        if let Some(ref results_log) = self.results {
            if let Err(e) = results_log.append(&summary) {
                log::warn!("could not append to {}: {e}", results_log.path().display());
            }
        }

        self.high_score = self.high_score.max(summary.final_score);
        self.last_summary = Some(summary);
        self.popups.clear();
        self.state = AppState::Menu;
    }
}

fn persist_words(bank: &WordBank, path: &Path) {
    if let Err(e) = bank.save(path) {
        log::warn!("could not save remaining words to {}: {e}", path.display());
    }
}

fn init_logging(log_file: Option<&Path>) -> io::Result<()> {
    // stderr shares the terminal with the UI, so stay quiet unless asked
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    if cli.save_config {
        store.save(&config)?;
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res?;
    println!("Thanks for playing!");
    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::per_second(TerminalInput::new(), WallClock::new(), app.config.fps);

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            GameEvent::Tick { at } => app.on_tick(at),
            GameEvent::Input { input, at } => {
                if !app.on_input(input, at) {
                    break;
                }
            }
            GameEvent::Closed => break,
        }
    }

    Ok(())
}
