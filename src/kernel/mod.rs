// Cooperative runtime core: byte ring, tick source, timers, scheduler
// Single logical thread plus interrupt handlers. Nothing blocks and
// nothing allocates; every operation returns at once with a result or
// a failure value.
//
// ring:      SPSC byte queue shared between an ISR and the main loop
// tick:      wrapping tick counter advanced by a timer ISR
// timer:     one-shot software timers measured in ticks
// scheduler: periodic tasks dispatched from the main loop
// flags:     event bits raised by ISRs, consumed by the main loop

pub mod flags;
pub mod ring;
pub mod scheduler;
pub mod tick;
pub mod timer;

pub use flags::EventFlags;
pub use ring::{Consumer, Drain, Producer, RingBuffer};
pub use scheduler::{Action, RegisterError, Scheduler, TaskInfo};
pub use tick::{Clock, Tick, TickCounter, elapsed};
pub use timer::SoftTimer;
