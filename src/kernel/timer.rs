// One-shot software timer on top of the logical tick counter
//
// The timer never reads a clock itself; callers pass the current
// tick in. Expiry uses the unsigned difference from the start tick,
// so a timer armed just before the counter wraps still fires on time.

use super::tick::{Tick, elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoftTimer {
    start_tick: Tick,
    duration: Tick,
    running: bool,
}

impl SoftTimer {
    /// An inert timer: not running, never expires.
    pub const fn new() -> Self {
        Self {
            start_tick: 0,
            duration: 0,
            running: false,
        }
    }

    pub fn start(&mut self, now: Tick, duration: Tick) {
        self.start_tick = now;
        self.duration = duration;
        self.running = true;
    }

    // re-arm from `now` with the previous duration
    pub fn restart(&mut self, now: Tick) {
        self.start(now, self.duration);
    }

    // disarm; start tick and duration are kept
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once `duration` ticks have passed since the last start.
    /// A stopped timer never reports expired.
    pub fn expired(&self, now: Tick) -> bool {
        self.running && elapsed(now, self.start_tick) >= self.duration
    }

    /// Ticks left before expiry; 0 when expired or stopped.
    pub fn remaining(&self, now: Tick) -> Tick {
        if !self.running {
            return 0;
        }
        self.duration.saturating_sub(elapsed(now, self.start_tick))
    }

    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    pub fn duration(&self) -> Tick {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_inert() {
        let timer = SoftTimer::new();
        assert!(!timer.is_running());
        assert!(!timer.expired(0));
        assert!(!timer.expired(1_000));
        assert_eq!(timer.remaining(0), 0);
    }

    #[test]
    fn hundred_tick_timer() {
        let mut timer = SoftTimer::new();
        timer.start(0, 100);

        assert!(!timer.expired(50));
        assert_eq!(timer.remaining(50), 50);

        assert!(timer.expired(100));
        assert_eq!(timer.remaining(100), 0);

        assert!(timer.expired(110));
        assert_eq!(timer.remaining(110), 0);
    }

    #[test]
    fn expiry_survives_counter_wraparound() {
        let mut timer = SoftTimer::new();
        timer.start(0xFFFF_FFF0, 32);

        assert!(!timer.expired(0xFFFF_FFFF));
        assert!(!timer.expired(0x0000_000F));
        assert_eq!(timer.remaining(0x0000_000F), 1);
        assert!(timer.expired(0x0000_0010));
    }

    #[test]
    fn stop_keeps_history() {
        let mut timer = SoftTimer::new();
        timer.start(7, 20);
        timer.stop();

        assert!(!timer.is_running());
        assert!(!timer.expired(100));
        assert_eq!(timer.start_tick(), 7);
        assert_eq!(timer.duration(), 20);

        timer.restart(100);
        assert!(timer.is_running());
        assert_eq!(timer.remaining(110), 10);
        assert!(timer.expired(120));
    }

    #[test]
    fn queries_have_no_side_effects() {
        let mut timer = SoftTimer::new();
        timer.start(0, 5);
        let before = timer;
        let _ = timer.expired(10);
        let _ = timer.remaining(10);
        assert_eq!(timer, before);
    }
}
