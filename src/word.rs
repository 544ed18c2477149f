use crate::config::ScoringConfig;
use std::time::Duration;

/// Side length of the play field in field units; render positions are
/// divided by this to land in the unit square.
pub const FIELD_SIZE: f64 = 1000.0;
/// A falling word is missed once its top edge passes this height.
pub const FLOOR: f64 = 900.0;
/// Horizontal spawn band, in field units.
pub const SPAWN_X_MIN: f64 = 100.0;
pub const SPAWN_X_MAX: f64 = 900.0;

const LENGTH_SPEED_DIVISOR: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum WordState {
    Falling,
    Defeated,
    Missed,
}

impl WordState {
    pub fn is_terminal(self) -> bool {
        self != WordState::Falling
    }
}

/// What a word reports to its session when it stops falling.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub id: WordId,
    pub text: String,
    pub state: WordState,
    pub score: i64,
    pub x: f64,
    pub y: f64,
}

/// One falling enemy.
///
/// `text` carries a trailing space: typing the space is what finishes the
/// word. All timestamps are offsets from the start of the session.
#[derive(Debug, Clone)]
pub struct Word {
    id: WordId,
    text: String,
    len: usize,
    spawned_at: Duration,
    fall_speed: f64,
    x: f64,
    y: f64,
    matched: usize,
    key_times: Vec<Duration>,
    state: WordState,
    score: Option<i64>,
    scoring: ScoringConfig,
}

impl Word {
    pub fn new(
        id: WordId,
        word: &str,
        spawned_at: Duration,
        fall_speed: f64,
        x: f64,
        scoring: ScoringConfig,
    ) -> Self {
        let text = format!("{word} ");
        Self {
            id,
            len: text.chars().count(),
            text,
            spawned_at,
            fall_speed,
            x,
            y: 0.0,
            matched: 0,
            key_times: Vec::new(),
            state: WordState::Falling,
            score: None,
            scoring,
        }
    }

    pub fn id(&self) -> WordId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters, including the trailing space.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> WordState {
        self.state
    }

    pub fn matched_len(&self) -> usize {
        self.matched
    }

    pub fn key_times(&self) -> &[Duration] {
        &self.key_times
    }

    pub fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    pub fn fall_speed(&self) -> f64 {
        self.fall_speed
    }

    /// Score fixed when the word left `Falling`; `None` while still falling.
    pub fn score(&self) -> Option<i64> {
        self.score
    }

    /// Field-unit position.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Position in the unit square.
    pub fn normalized_position(&self) -> (f64, f64) {
        (self.x / FIELD_SIZE, self.y / FIELD_SIZE)
    }

    pub fn typed(&self) -> &str {
        let end = self
            .text
            .char_indices()
            .nth(self.matched)
            .map_or(self.text.len(), |(i, _)| i);
        &self.text[..end]
    }

    pub fn untyped(&self) -> &str {
        &self.text[self.typed().len()..]
    }

    /// Advance the fall by `frames` animation frames.
    ///
    /// Longer words fall proportionally faster so every word crosses the
    /// field in roughly the same time.
    pub fn tick(&mut self, frames: f64) -> Option<Resolution> {
        if self.state != WordState::Falling {
            return None;
        }
        self.y += self.fall_speed * self.len as f64 / LENGTH_SPEED_DIVISOR * frames;
        if self.y > FLOOR {
            return Some(self.leave_falling(WordState::Missed));
        }
        None
    }

    /// Match the whole input buffer against this word.
    ///
    /// A prefix match records a keystroke time; anything else resets the
    /// word. Matching the full text defeats it.
    pub fn apply_input(&mut self, candidate: &str, now: Duration) -> Option<Resolution> {
        if self.state != WordState::Falling {
            return None;
        }
        if !candidate.is_empty() && self.text.starts_with(candidate) {
            // one timestamp per matched char, earlier attempts dropped
            self.matched = candidate.chars().count();
            self.key_times.truncate(self.matched - 1);
            self.key_times.resize(self.matched, now);
        } else {
            self.matched = 0;
            self.key_times.clear();
        }

        if self.matched == self.len {
            return Some(self.leave_falling(WordState::Defeated));
        }
        None
    }

    fn leave_falling(&mut self, state: WordState) -> Resolution {
        self.state = state;
        let score = self.compute_score();
        self.score = Some(score);
        log::debug!("{state} {:?} for {score}", self.text.trim_end());
        Resolution {
            id: self.id,
            text: self.text.clone(),
            state,
            score,
            x: self.x,
            y: self.y,
        }
    }

    fn compute_score(&self) -> i64 {
        let len = self.len as f64;
        match self.state {
            WordState::Defeated => {
                let (Some(&first), Some(&last)) = (self.key_times.first(), self.key_times.last())
                else {
                    return 0;
                };
                let reaction = first
                    .saturating_sub(self.spawned_at)
                    .as_secs_f64()
                    .max(self.scoring.creation_floor_secs);
                let typing = last
                    .saturating_sub(first)
                    .as_secs_f64()
                    .max(self.scoring.typing_floor_secs);

                let creation_bonus = 1.0 + 1.0 / reaction;
                let speed_bonus = 1.0 + self.scoring.speed_constant * len / typing;
                (len * creation_bonus * speed_bonus).round().max(0.0) as i64
            }
            WordState::Missed => {
                let penalty = (self.scoring.penalty_factor * len / self.fall_speed).round();
                -(penalty.max(0.0) as i64)
            }
            WordState::Falling => 0,
        }
    }
}
