// Event flags raised from interrupt context, consumed by the main loop
//
// Each source owns one bit. ISRs only ever set bits; the main loop
// tests and clears them. Test-and-clear runs inside a critical section
// so a raise landing between the read and the write is never lost.

use core::cell::Cell;

use critical_section::Mutex;

/// Mask with only bit `n` set.
#[inline]
pub const fn bit(n: u32) -> u32 {
    1 << n
}

#[inline]
pub const fn has_bits(value: u32, mask: u32) -> bool {
    value & mask != 0
}

pub struct EventFlags {
    bits: Mutex<Cell<u32>>,
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            bits: Mutex::new(Cell::new(0)),
        }
    }

    // ISR side
    pub fn raise(&self, mask: u32) {
        critical_section::with(|cs| {
            let bits = self.bits.borrow(cs);
            bits.set(bits.get() | mask);
        });
    }

    pub fn is_set(&self, mask: u32) -> bool {
        has_bits(self.pending(), mask)
    }

    pub fn clear(&self, mask: u32) {
        critical_section::with(|cs| {
            let bits = self.bits.borrow(cs);
            bits.set(bits.get() & !mask);
        });
    }

    /// Clear any of `mask` that are set; true if at least one was.
    pub fn check_and_clear(&self, mask: u32) -> bool {
        critical_section::with(|cs| {
            let bits = self.bits.borrow(cs);
            let current = bits.get();
            if !has_bits(current, mask) {
                return false;
            }
            bits.set(current & !mask);
            true
        })
    }

    /// Consume every pending flag at once.
    pub fn take(&self) -> u32 {
        critical_section::with(|cs| self.bits.borrow(cs).replace(0))
    }

    pub fn pending(&self) -> u32 {
        critical_section::with(|cs| self.bits.borrow(cs).get())
    }
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON_A: u32 = bit(0);
    const BUTTON_B: u32 = bit(1);
    const TIMER: u32 = bit(2);
    const UART_RX: u32 = bit(3);
    const ADC_DONE: u32 = bit(4);

    #[test]
    fn bit_helpers() {
        assert_eq!(bit(0), 0x01);
        assert_eq!(bit(4), 0x10);
        assert!(has_bits(0b1010, bit(1)));
        assert!(!has_bits(0b1010, bit(0)));
    }

    #[test]
    fn raised_flags_are_handled_once() {
        let flags = EventFlags::new();
        flags.raise(BUTTON_A);
        flags.raise(TIMER);
        flags.raise(UART_RX);
        flags.raise(ADC_DONE);
        assert_eq!(flags.pending(), 0x1D);

        let mut handled = [false; 5];
        for (i, mask) in [BUTTON_A, BUTTON_B, TIMER, UART_RX, ADC_DONE]
            .into_iter()
            .enumerate()
        {
            handled[i] = flags.check_and_clear(mask);
        }

        assert_eq!(handled, [true, false, true, true, true]);
        assert_eq!(flags.pending(), 0);
        assert!(!flags.check_and_clear(TIMER));
    }

    #[test]
    fn clear_only_touches_mask() {
        let flags = EventFlags::new();
        flags.raise(BUTTON_A | BUTTON_B);
        flags.clear(BUTTON_A);
        assert!(!flags.is_set(BUTTON_A));
        assert!(flags.is_set(BUTTON_B));
    }

    #[test]
    fn take_drains_everything() {
        let flags = EventFlags::new();
        flags.raise(TIMER | UART_RX);
        assert_eq!(flags.take(), TIMER | UART_RX);
        assert_eq!(flags.take(), 0);
    }
}
