//! Logical per-round countdown.
//!
//! The clock has no notion of wall time: the presentation layer calls
//! [`Countdown::tick`] from whatever periodic source it owns. Expiry is
//! reported once and names the round the countdown was armed for, so a
//! forced submit can never land on a round that replaced it.

use uuid::Uuid;

/// Default seconds allowed per round.
pub const DEFAULT_ROUND_SECONDS: u32 = 15;

/// Result of advancing the clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining: u32 },
    /// Reached zero on this tick; submit whatever is selected for `round_id`.
    Expired { round_id: Uuid },
    /// Already expired or cancelled.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    round_id: Uuid,
    duration: u32,
    remaining: u32,
    armed: bool,
}

impl Countdown {
    pub fn new(round_id: Uuid, ticks: u32) -> Self {
        Self {
            round_id,
            duration: ticks,
            remaining: ticks,
            armed: true,
        }
    }

    pub fn round_id(&self) -> Uuid {
        self.round_id
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.armed {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            Tick::Expired {
                round_id: self.round_id,
            }
        } else {
            Tick::Running {
                remaining: self.remaining,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once_after_duration() {
        let id = Uuid::new_v4();
        let mut clock = Countdown::new(id, DEFAULT_ROUND_SECONDS);
        for expected in (1..DEFAULT_ROUND_SECONDS).rev() {
            assert_eq!(clock.tick(), Tick::Running { remaining: expected });
        }
        assert_eq!(clock.tick(), Tick::Expired { round_id: id });
        assert_eq!(clock.tick(), Tick::Idle);
        assert!(!clock.is_armed());
    }

    #[test]
    fn cancelled_clock_never_fires() {
        let mut clock = Countdown::new(Uuid::new_v4(), 2);
        clock.tick();
        clock.cancel();
        assert_eq!(clock.tick(), Tick::Idle);
        assert_eq!(clock.remaining(), 1);
    }

    #[test]
    fn zero_duration_fires_on_first_tick() {
        let id = Uuid::nil();
        let mut clock = Countdown::new(id, 0);
        assert_eq!(clock.tick(), Tick::Expired { round_id: id });
    }
}
