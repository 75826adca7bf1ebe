// UART-style receive path over the byte ring
//
// RxIsr is the interrupt half: the RX handler hands each received
// byte to on_receive(), which queues it and raises the RX event flag.
// SerialRx is the main-loop half. Nothing here blocks; read_byte()
// follows the embedded-hal 0.2 serial convention and answers
// WouldBlock when no byte is waiting.

use core::convert::Infallible;

use log::warn;

use crate::kernel::flags::EventFlags;
use crate::kernel::ring::{Consumer, Drain, Producer};

pub struct RxIsr<'a, const N: usize> {
    tx: Producer<'a, N>,
    flags: &'a EventFlags,
    rx_flag: u32,
}

impl<'a, const N: usize> RxIsr<'a, N> {
    pub fn new(tx: Producer<'a, N>, flags: &'a EventFlags, rx_flag: u32) -> Self {
        Self { tx, flags, rx_flag }
    }

    /// Queue one received byte. On overflow the byte is lost and the
    /// overrun counter goes up.
    pub fn on_receive(&mut self, byte: u8) -> bool {
        if !self.tx.push(byte) {
            warn!("uart rx overflow, lost 0x{:02X}", byte);
            return false;
        }
        self.flags.raise(self.rx_flag);
        true
    }

    pub fn overruns(&self) -> u32 {
        self.tx.overruns()
    }
}

pub struct SerialRx<'a, const N: usize> {
    rx: Consumer<'a, N>,
}

impl<'a, const N: usize> SerialRx<'a, N> {
    pub fn new(rx: Consumer<'a, N>) -> Self {
        Self { rx }
    }

    pub fn available(&self) -> bool {
        self.rx.available()
    }

    pub fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.pop().ok_or(nb::Error::WouldBlock)
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// Copy up to `dest.len()` waiting bytes into `dest`, returns how
    /// many were copied.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let mut n = 0;
        let len = dest.len();
        for (slot, byte) in dest.iter_mut().zip(self.rx.drain(len)) {
            *slot = byte;
            n += 1;
        }
        n
    }

    pub fn drain(&mut self, max_len: usize) -> Drain<'_, 'a, N> {
        self.rx.drain(max_len)
    }

    pub fn overruns(&self) -> u32 {
        self.rx.overruns()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::flags::bit;
    use crate::kernel::ring::RingBuffer;

    const RX_FLAG: u32 = bit(3);

    #[test]
    fn hello_byte_by_byte() {
        let flags = EventFlags::new();
        let mut ring = RingBuffer::<8>::new();
        let (tx, rx) = ring.split();
        let mut isr = RxIsr::new(tx, &flags, RX_FLAG);
        let mut serial = SerialRx::new(rx);

        for b in b"Hello" {
            assert!(isr.on_receive(*b));
        }
        assert!(flags.check_and_clear(RX_FLAG));
        assert!(serial.available());

        let mut text = Vec::new();
        while let Ok(b) = serial.read_byte() {
            text.push(b);
        }
        assert_eq!(text, b"Hello");
        assert!(matches!(serial.read_byte(), Err(nb::Error::WouldBlock)));
        assert!(!serial.available());
    }

    #[test]
    fn bulk_read_returns_actual_count() {
        let flags = EventFlags::new();
        let mut ring = RingBuffer::<8>::new();
        let (tx, rx) = ring.split();
        let mut isr = RxIsr::new(tx, &flags, RX_FLAG);
        let mut serial = SerialRx::new(rx);

        for b in b"World!" {
            isr.on_receive(*b);
        }

        let mut buf = [0u8; 10];
        let n = serial.read(&mut buf);
        assert_eq!(n, 6);
        assert_eq!(&buf[..n], b"World!");
        assert_eq!(serial.read(&mut buf), 0);
    }

    #[test]
    fn bulk_read_leaves_excess_queued() {
        let flags = EventFlags::new();
        let mut ring = RingBuffer::<8>::new();
        let (tx, rx) = ring.split();
        let mut isr = RxIsr::new(tx, &flags, RX_FLAG);
        let mut serial = SerialRx::new(rx);

        for b in b"abcde" {
            isr.on_receive(*b);
        }
        let mut buf = [0u8; 3];
        assert_eq!(serial.read(&mut buf), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(serial.pop(), Some(b'd'));
    }

    #[test]
    fn overflow_drops_and_counts() {
        let flags = EventFlags::new();
        let mut ring = RingBuffer::<4>::new();
        let (tx, rx) = ring.split();
        let mut isr = RxIsr::new(tx, &flags, RX_FLAG);
        let mut serial = SerialRx::new(rx);

        let accepted = b"overflow".iter().filter(|b| isr.on_receive(**b)).count();
        assert_eq!(accepted, 3);
        assert_eq!(isr.overruns(), 5);
        assert_eq!(serial.overruns(), 5);

        let kept: Vec<u8> = serial.drain(10).collect();
        assert_eq!(kept, b"ove");
    }
}
