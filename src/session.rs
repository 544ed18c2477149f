use crate::config::{Config, ScoringConfig};
use crate::focus_policy::{self, FocusPolicy};
use crate::scheduler::{Scheduler, TimerId};
use crate::word::{Resolution, Word, WordId, WordState, FIELD_SIZE, SPAWN_X_MAX, SPAWN_X_MIN};
use crate::word_bank::WordBank;
use itertools::Itertools;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

/// Runtime form of [`Config`]: everything a single game needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub enemies: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub start_level: usize,
    pub max_level: usize,
    pub level_step: i64,
    pub frame_interval: Duration,
    pub focus_policy: FocusPolicy,
    pub scoring: ScoringConfig,
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            enemies: cfg.enemies,
            min_delay: Duration::from_millis(cfg.min_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            start_level: cfg.start_level,
            max_level: cfg.max_level,
            level_step: cfg.level_step,
            frame_interval: Duration::from_secs_f64(1.0 / cfg.fps.max(1) as f64),
            focus_policy: FocusPolicy::from_strict(cfg.strict_focus),
            scoring: cfg.scoring,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionStatus {
    Running,
    Won,
    Lost,
    Quit,
}

impl SessionStatus {
    pub fn is_over(self) -> bool {
        self != SessionStatus::Running
    }
}

/// Result of [`GameSession::apply_score_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Ok,
    Lost,
}

/// What the end-of-game screen and the results log get.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub outcome: SessionStatus,
    /// Best score reached during the game.
    pub final_score: i64,
    /// Score at the moment the game ended.
    pub score: i64,
    pub enemies: u32,
    pub missed_words: Vec<String>,
}

impl GameSummary {
    pub fn missed_joined(&self) -> String {
        self.missed_words.iter().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: i64,
    pub max_score: i64,
    pub level: usize,
    pub remaining_spawns: u32,
    pub missed: usize,
    pub active: usize,
}

impl Hud {
    pub fn score_line(&self) -> String {
        format!("Score: {} ({})", self.score, self.max_score)
    }

    pub fn enemies_line(&self) -> String {
        format!("{} enemies remaining...", self.remaining_spawns)
    }

    pub fn missed_line(&self) -> String {
        format!("Missed: {}", self.missed)
    }

    pub fn level_line(&self) -> String {
        format!("Level {}", self.level)
    }
}

/// Render state of one falling word, position in the unit square.
#[derive(Debug, Clone, PartialEq)]
pub struct WordView {
    pub id: WordId,
    pub typed: String,
    pub untyped: String,
    pub x: f64,
    pub y: f64,
    pub focused: bool,
}

/// Transient score label shown where a word was destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePopup {
    pub word: String,
    pub state: WordState,
    pub score: i64,
    pub x: f64,
    pub y: f64,
}

impl ScorePopup {
    pub fn label(&self) -> String {
        if self.score > 0 {
            format!("+{}", self.score)
        } else {
            self.score.to_string()
        }
    }
}

/// Notifications for the presentation layer, drained after each step.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(Hud),
    WordSpawned { id: WordId, text: String },
    SpawnSkipped { length: usize },
    WordResolved(ScorePopup),
    GameOver(GameSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Spawn,
    Fall(WordId),
}

/// One game: spawn cadence, active words, input buffer, score and level.
///
/// All timing is expressed as offsets from the start of the game and fed in
/// by the caller through [`GameSession::advance`] and
/// [`GameSession::handle_key`]. Words are owned here, in spawn order; the
/// focused word is referenced by id only.
#[derive(Debug)]
pub struct GameSession<R: Rng> {
    config: SessionConfig,
    bank: WordBank,
    rng: R,
    scheduler: Scheduler<Timer>,
    words: Vec<Word>,
    fall_timers: HashMap<WordId, TimerId>,
    spawn_timer: Option<TimerId>,
    next_id: u64,
    input: String,
    focused: Option<WordId>,
    score: i64,
    max_score: i64,
    level: usize,
    level_floor: i64,
    remaining_spawns: u32,
    last_delay: Duration,
    missed: Vec<String>,
    status: SessionStatus,
    events: Vec<SessionEvent>,
}

impl<R: Rng> GameSession<R> {
    /// Set up a game whose first word spawns at time zero.
    pub fn new(config: SessionConfig, bank: WordBank, rng: R) -> Self {
        if let Some(warning) = bank_warning(&bank, &config) {
            log::warn!("{warning}");
        }

        let mut scheduler = Scheduler::new();
        let spawn_timer = Some(scheduler.schedule_once(Duration::ZERO, Timer::Spawn));

        let mut session = Self {
            level: config.start_level,
            remaining_spawns: config.enemies,
            last_delay: config.min_delay,
            config,
            bank,
            rng,
            scheduler,
            words: Vec::new(),
            fall_timers: HashMap::new(),
            spawn_timer,
            next_id: 0,
            input: String::new(),
            focused: None,
            score: 0,
            max_score: 0,
            level_floor: 0,
            missed: Vec::new(),
            status: SessionStatus::Running,
            events: Vec::new(),
        };
        session.notify_state();
        session
    }

    /// Run every timer due up to `now`.
    pub fn advance(&mut self, now: Duration) {
        while !self.status.is_over() {
            let Some(fired) = self.scheduler.pop_due(now) else {
                break;
            };
            match fired.payload {
                Timer::Spawn => self.on_spawn(fired.at),
                Timer::Fall(id) => self.on_fall(id),
            }
        }
    }

    /// Feed one typed character.
    ///
    /// Only letters and space count. The extended buffer is matched against
    /// every active word in spawn order according to the focus policy; with
    /// no taker the buffer is dropped.
    pub fn handle_key(&mut self, c: char, now: Duration) {
        if !(c.is_alphabetic() || c == ' ') {
            return;
        }
        self.advance(now);
        if self.status.is_over() {
            return;
        }

        let mut candidate = self.input.clone();
        candidate.push(c);

        let scan = focus_policy::apply_key(
            self.config.focus_policy,
            &mut self.words,
            &candidate,
            now,
        );
        match scan.focused {
            Some(id) => {
                self.input = candidate;
                self.focused = Some(id);
            }
            None => self.clear_input(),
        }

        for res in scan.resolved {
            if self.status.is_over() {
                break;
            }
            self.resolve(res);
        }
    }

    /// End the game early (escape).
    pub fn quit(&mut self) {
        self.finish(SessionStatus::Quit);
    }

    /// Add `delta` to the score and track the best score.
    ///
    /// A negative result loses the game on the spot; callers should stop
    /// processing when `ScoreChange::Lost` comes back.
    pub fn apply_score_delta(&mut self, delta: i64) -> ScoreChange {
        self.score = self.score.saturating_add(delta);
        self.max_score = self.max_score.max(self.score);
        self.notify_state();
        if self.score < 0 {
            self.finish(SessionStatus::Lost);
            return ScoreChange::Lost;
        }
        ScoreChange::Ok
    }

    fn on_spawn(&mut self, at: Duration) {
        self.spawn_timer = None;
        if self.remaining_spawns == 0 {
            return;
        }

        self.update_level();
        self.remaining_spawns -= 1;

        match self.bank.draw(self.level, &mut self.rng) {
            Ok(text) => self.spawn_word(&text, at),
            Err(e) => {
                log::warn!("skipping spawn: {e}");
                self.events.push(SessionEvent::SpawnSkipped { length: self.level });
            }
        }

        self.last_delay = self.next_delay();
        if self.remaining_spawns > 0 {
            self.spawn_timer = Some(self.scheduler.schedule_once(self.last_delay, Timer::Spawn));
        }
        self.notify_state();
        self.check_win();
    }

    fn update_level(&mut self) {
        if self.score > self.level_floor + self.config.level_step {
            self.level_floor += self.config.level_step;
            self.level = (self.level + 1).min(self.config.max_level);
        }
    }

    fn next_delay(&mut self) -> Duration {
        let min = self.config.min_delay.as_millis() as u64;
        let max = (self.config.max_delay.as_millis() as u64).max(min);
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn spawn_word(&mut self, text: &str, at: Duration) {
        let id = WordId(self.next_id);
        self.next_id += 1;

        // sparser spawns fall faster
        let fall_speed = self.last_delay.as_secs_f64();
        let x = self.rng.gen_range(SPAWN_X_MIN..SPAWN_X_MAX);
        let word = Word::new(id, text, at, fall_speed, x, self.config.scoring);
        log::info!("{text} word spawned");

        let timer = self
            .scheduler
            .schedule_repeating(self.config.frame_interval, Timer::Fall(id));
        self.fall_timers.insert(id, timer);
        self.words.push(word);
        self.events.push(SessionEvent::WordSpawned {
            id,
            text: text.to_string(),
        });
    }

    fn on_fall(&mut self, id: WordId) {
        let Some(word) = self.words.iter_mut().find(|w| w.id() == id) else {
            return;
        };
        if let Some(res) = word.tick(1.0) {
            self.resolve(res);
        }
    }

    /// A word left `Falling`: drop it, stop its ticks and book its score.
    fn resolve(&mut self, res: Resolution) {
        self.words.retain(|w| w.id() != res.id);
        if let Some(timer) = self.fall_timers.remove(&res.id) {
            self.scheduler.cancel(timer);
        }
        if self.focused == Some(res.id) {
            self.clear_input();
        }

        let word = res.text.trim_end().to_string();
        match res.state {
            WordState::Defeated => log::debug!("defeated {word}"),
            WordState::Missed => {
                log::debug!("missed {word}");
                self.missed.push(word.clone());
            }
            WordState::Falling => {}
        }
        self.events.push(SessionEvent::WordResolved(ScorePopup {
            word,
            state: res.state,
            score: res.score,
            x: res.x / FIELD_SIZE,
            y: res.y / FIELD_SIZE,
        }));

        if self.apply_score_delta(res.score) == ScoreChange::Lost {
            return;
        }
        self.check_win();
    }

    fn check_win(&mut self) {
        if self.remaining_spawns == 0 && self.words.is_empty() {
            self.finish(SessionStatus::Won);
        }
    }

    fn finish(&mut self, outcome: SessionStatus) {
        if self.status.is_over() {
            return;
        }
        self.status = outcome;
        let cancelled = self.scheduler.cancel_all();
        self.fall_timers.clear();
        self.spawn_timer = None;
        self.clear_input();
        log::info!(
            "game over: {outcome} with {} (best {}), {cancelled} timers cancelled",
            self.score,
            self.max_score
        );
        self.events.push(SessionEvent::GameOver(self.summary()));
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.focused = None;
    }

    fn notify_state(&mut self) {
        self.events.push(SessionEvent::StateChanged(self.hud()));
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.score,
            max_score: self.max_score,
            level: self.level,
            remaining_spawns: self.remaining_spawns,
            missed: self.missed.len(),
            active: self.words.len(),
        }
    }

    pub fn word_views(&self) -> Vec<WordView> {
        self.words
            .iter()
            .map(|w| {
                let (x, y) = w.normalized_position();
                WordView {
                    id: w.id(),
                    typed: w.typed().to_string(),
                    untyped: w.untyped().to_string(),
                    x,
                    y,
                    focused: self.focused == Some(w.id()),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            outcome: self.status,
            final_score: self.max_score,
            score: self.score,
            enemies: self.config.enemies,
            missed_words: self.missed.clone(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn max_score(&self) -> i64 {
        self.max_score
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn remaining_spawns(&self) -> u32 {
        self.remaining_spawns
    }

    pub fn missed_words(&self) -> &[String] {
        &self.missed
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn focused(&self) -> Option<WordId> {
        self.focused
    }

    pub fn active_words(&self) -> &[Word] {
        &self.words
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn spawn_pending(&self) -> bool {
        self.spawn_timer.is_some_and(|id| self.scheduler.is_scheduled(id))
    }

    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Why `bank` might skip spawns under `config`: an empty bucket inside the
/// level range, or fewer words in the whole range than enemies to spawn.
fn bank_warning(bank: &WordBank, config: &SessionConfig) -> Option<String> {
    let levels = config.start_level..=config.max_level;
    let empty: Vec<usize> = bank
        .shortfall(levels.clone(), 1)
        .into_iter()
        .map(|(length, _)| length)
        .collect();
    let available = bank.capacity(levels);
    let enemies = config.enemies as usize;

    match (empty.is_empty(), available < enemies) {
        (true, false) => None,
        (false, false) => Some(format!(
            "no words of length {empty:?}; those spawns may be skipped"
        )),
        (_, true) => Some(format!(
            "only {available} words for {enemies} enemies; spawns will be skipped"
        )),
    }
}
