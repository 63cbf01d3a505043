//! Countdown state machine: Start -> Running -> End -> Start.
//!
//! Touches move the game out of Start and End. Running only ends through
//! `tick`, which is called once per rendered frame and reports what the digit
//! display needs to do.

use std::time::{Duration, Instant};

use crate::input::TouchEvent;

pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Start,
    Running,
    End,
}

impl GameState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Running => "running",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CountdownClock {
    pub started_at: Instant,
    pub duration: Duration,
}

impl CountdownClock {
    /// Whole seconds left: `duration - floor(now - started_at)`, clamped at 0.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs();
        self.duration.as_secs().saturating_sub(elapsed)
    }
}

/// `MM:SS`, always five characters for anything under 100 minutes.
pub fn format_remaining(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Result of one per-frame countdown tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Not running; nothing to do.
    Idle,
    /// Running, and the formatted time equals what is already on screen.
    Unchanged,
    /// Running with a new `MM:SS` value to display.
    Show(String),
    /// The countdown just ran out. Reported exactly once per run.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    state: GameState,
    duration: Duration,
    clock: Option<CountdownClock>,
    last_shown: Option<String>,
}

impl Countdown {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: GameState::Start,
            duration,
            clock: None,
            last_shown: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn clock(&self) -> Option<&CountdownClock> {
        self.clock.as_ref()
    }

    pub fn remaining_secs(&self, now: Instant) -> Option<u64> {
        match self.state {
            GameState::Running => self.clock.map(|c| c.remaining_secs(now)),
            _ => None,
        }
    }

    /// Feed one touch event. Only the primary release edge counts, and it is
    /// ignored while running. Returns true when the state changed.
    pub fn handle_touch(&mut self, touch: TouchEvent, now: Instant) -> bool {
        if !touch.is_primary_release() {
            return false;
        }
        match self.state {
            GameState::Start => {
                self.state = GameState::Running;
                self.clock = Some(CountdownClock {
                    started_at: now,
                    duration: self.duration,
                });
                self.last_shown = None;
                log::info!("countdown started ({}s)", self.duration.as_secs());
                true
            }
            GameState::End => {
                self.state = GameState::Start;
                self.clock = None;
                log::info!("back to start");
                true
            }
            GameState::Running => false,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Tick {
        if self.state != GameState::Running {
            return Tick::Idle;
        }
        let Some(clock) = self.clock else {
            return Tick::Idle;
        };

        let remaining = clock.remaining_secs(now);
        if remaining == 0 {
            self.state = GameState::End;
            self.last_shown = None;
            log::info!("countdown expired");
            return Tick::Expired;
        }

        let text = format_remaining(remaining);
        if self.last_shown.as_deref() == Some(text.as_str()) {
            return Tick::Unchanged;
        }
        log::trace!("countdown {text}");
        self.last_shown = Some(text.clone());
        Tick::Show(text)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN)
    }
}
