// no_std interrupt-plus-main-loop runtime pieces
// SPSC byte ring, tick counter, soft timers, periodic scheduler.

#![cfg_attr(not(test), no_std)]

pub mod drivers;
pub mod kernel;
