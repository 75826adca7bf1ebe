// Logical tick source shared by timers and the scheduler
//
// A hardware timer ISR (or a test harness) calls tick(); everything
// else only reads the counter. Ticks are u32 and wrap, so every
// comparison goes through elapsed() rather than comparing absolutes.
// Critical section guards the counter: riscv32imc has no atomic RMW.
// The tick weight lets one interrupt stand for several base ticks
// when the timer is slowed down during idle.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;

pub type Tick = u32;

/// Ticks from `since` to `now`, correct across counter wraparound.
#[inline]
pub const fn elapsed(now: Tick, since: Tick) -> Tick {
    now.wrapping_sub(since)
}

/// Anything that can report the current logical tick.
pub trait Clock {
    fn now(&self) -> Tick;
}

pub struct TickCounter {
    ticks: Mutex<Cell<Tick>>,
    // base ticks per call to tick() (1 when the timer runs at full rate)
    weight: AtomicU32,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(start: Tick) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(start)),
            weight: AtomicU32::new(1),
        }
    }

    // ISR side: advance by the current weight, returns the new value
    pub fn tick(&self) -> Tick {
        let weight = self.weight.load(Ordering::Relaxed);
        critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            let next = ticks.get().wrapping_add(weight);
            ticks.set(next);
            next
        })
    }

    pub fn set_weight(&self, weight: u32) {
        self.weight.store(weight, Ordering::Release);
    }

    pub fn weight(&self) -> u32 {
        self.weight.load(Ordering::Acquire)
    }

    pub fn now(&self) -> Tick {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }

    // harness hook: jump the counter, e.g. to just before wraparound
    pub fn set(&self, value: Tick) {
        critical_section::with(|cs| self.ticks.borrow(cs).set(value));
    }
}

impl Clock for TickCounter {
    fn now(&self) -> Tick {
        TickCounter::now(self)
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}
