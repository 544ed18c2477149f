use std::time::Duration;

/// Handle returned for every scheduled timer; used to cancel it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due, carrying the logical time it was due at.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub at: Duration,
    pub payload: T,
}

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: Duration,
    interval: Option<Duration>,
    payload: T,
}

/// Virtual-time timer queue.
///
/// Nothing here reads a wall clock: the owner feeds the current time into
/// [`Scheduler::pop_due`] and receives due timers one at a time, earliest
/// first (ties broken by scheduling order). Logical time only moves forward.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `payload` once, `delay` after the current logical time.
    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerId {
        self.push(self.now + delay, None, payload)
    }

    /// Fire `payload` every `interval`, first one `interval` from now.
    pub fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerId {
        // a zero interval would never let time advance
        let interval = interval.max(Duration::from_nanos(1));
        self.push(self.now + interval, Some(interval), payload)
    }

    fn push(&mut self, due: Duration, interval: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due,
            interval,
            payload,
        });
        id
    }

    /// Returns true when the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Drop every pending timer, returning how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `until`.
    ///
    /// Logical time jumps to the fired timer's due time, so anything it
    /// schedules is relative to that instant. Repeating timers are re-armed.
    /// When nothing is due the clock settles at `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(idx, _)| idx);

        let Some(idx) = idx else {
            self.now = self.now.max(until);
            return None;
        };

        let fired = match self.timers[idx].interval {
            Some(interval) => {
                let timer = &mut self.timers[idx];
                let fired = Fired {
                    id: timer.id,
                    at: timer.due,
                    payload: timer.payload.clone(),
                };
                timer.due += interval;
                fired
            }
            None => {
                let timer = self.timers.swap_remove(idx);
                Fired {
                    id: timer.id,
                    at: timer.due,
                    payload: timer.payload,
                }
            }
        };

        self.now = self.now.max(fired.at);
        Some(fired)
    }
}
