use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a keystroke means to the game, independent of the terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Char(char),
    /// Enter
    Confirm,
    /// Escape
    Cancel,
    /// Ctrl+C
    Interrupt,
}

impl Input {
    /// Translate a terminal key; `None` for keys the game has no use for.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        // key releases would otherwise double every keystroke on some terminals
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Input::Interrupt)
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
            KeyCode::Char(c) => Some(Input::Char(c)),
            KeyCode::Enter => Some(Input::Confirm),
            KeyCode::Esc => Some(Input::Cancel),
            _ => None,
        }
    }
}

/// One step of the game loop, stamped with the runner's clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Input { input: Input, at: Duration },
    /// A frame passed without input.
    Tick { at: Duration },
    /// The input source is gone; nothing more will arrive.
    Closed,
}

/// Where inputs come from.
pub trait InputSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<Input, RecvTimeoutError>;
}

/// Reads the terminal on a background thread and forwards game inputs.
pub struct TerminalInput {
    rx: Receiver<Input>,
}

impl TerminalInput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    let Some(input) = Input::from_key(key) else {
                        continue;
                    };
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("terminal event stream closed: {e}");
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<Input, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Inputs fed through a channel, for driving the loop without a terminal.
pub struct ChannelInput {
    rx: Receiver<Input>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<Input>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn recv_timeout(&self, timeout: Duration) -> Result<Input, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Time source for event stamps.
pub trait Clock: Send + 'static {
    fn now(&self) -> Duration;

    /// Called after a frame passed with no input.
    fn frame_elapsed(&mut self, _waited: Duration) {}
}

/// Real time since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    started: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Game time that only moves by `step` per idle frame, whatever the real
/// wait was. Inputs are stamped with the current frame time.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    now: Duration,
    step: Duration,
}

impl FrameClock {
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }
}

impl Clock for FrameClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn frame_elapsed(&mut self, _waited: Duration) {
        self.now += self.step;
    }
}

/// Drives the loop: waits up to one frame for input, otherwise ticks.
pub struct Runner<I: InputSource, C: Clock> {
    input: I,
    clock: C,
    frame: Duration,
}

impl<I: InputSource, C: Clock> Runner<I, C> {
    pub fn new(input: I, clock: C, frame: Duration) -> Self {
        Self { input, clock, frame }
    }

    /// Runner waking `fps` times a second.
    pub fn per_second(input: I, clock: C, fps: u32) -> Self {
        Self::new(input, clock, Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn step(&mut self) -> GameEvent {
        match self.input.recv_timeout(self.frame) {
            Ok(input) => GameEvent::Input {
                input,
                at: self.clock.now(),
            },
            Err(RecvTimeoutError::Timeout) => {
                self.clock.frame_elapsed(self.frame);
                GameEvent::Tick {
                    at: self.clock.now(),
                }
            }
            Err(RecvTimeoutError::Disconnected) => GameEvent::Closed,
        }
    }
}
