// Peripheral-facing layers built on the kernel primitives.
//
// uart: interrupt-fed receive queue with a polling read side

pub mod uart;

pub use uart::{RxIsr, SerialRx};
