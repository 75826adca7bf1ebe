// Fixed-capacity single-producer/single-consumer byte ring
//
// One slot is always left empty so head == tail means empty and
// head + 1 == tail means full; no separate length field has to be
// kept in step with the indices. head is written only by the
// producer and tail only by the consumer. Both are atomics published
// with Release and read with Acquire, so neither side can act on a
// stale copy of the other's index.
//
// split() hands out a Producer (interrupt side) and a Consumer (main
// loop side). The ring itself can also be driven directly through
// &mut self when both ends live in the same context.

use core::iter::FusedIterator;
use core::sync::atomic::{AtomicU8, AtomicU32, AtomicUsize, Ordering};

pub struct RingBuffer<const N: usize> {
    storage: [AtomicU8; N],
    head: AtomicUsize,   // next to write, producer only
    tail: AtomicUsize,   // next to read, consumer only
    overruns: AtomicU32, // producer only
}

impl<const N: usize> RingBuffer<N> {
    /// Empty ring with `N` slots (`N - 1` usable). `N < 2` fails to compile.
    pub const fn new() -> Self {
        const { assert!(N >= 2, "ring buffer needs at least two slots") };
        Self {
            storage: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    /// Usable capacity; one slot is reserved.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        Self::next(self.head.load(Ordering::Acquire)) == self.tail.load(Ordering::Acquire)
    }

    pub fn count(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + N - tail) % N
    }

    // rejected byte is handed back
    pub fn write(&mut self, byte: u8) -> Result<(), u8> {
        self.enqueue(byte)
    }

    pub fn read(&mut self) -> Option<u8> {
        self.dequeue()
    }

    pub fn peek(&self) -> Option<u8> {
        self.front()
    }

    /// Writes rejected because the ring was full.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Acquire)
    }

    pub fn clear(&mut self) {
        self.head.store(0, Ordering::Release);
        self.tail.store(0, Ordering::Release);
        self.overruns.store(0, Ordering::Release);
    }

    /// Split into the two ends. The borrow guarantees one of each.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline]
    const fn next(index: usize) -> usize {
        (index + 1) % N
    }

    fn enqueue(&self, byte: u8) -> Result<(), u8> {
        let head = self.head.load(Ordering::Relaxed);
        let next = Self::next(head);
        if next == self.tail.load(Ordering::Acquire) {
            // single writer, no RMW needed
            let dropped = self.overruns.load(Ordering::Relaxed);
            self.overruns.store(dropped.wrapping_add(1), Ordering::Release);
            return Err(byte);
        }
        self.storage[head].store(byte, Ordering::Relaxed);
        self.head.store(next, Ordering::Release);
        Ok(())
    }

    fn dequeue(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.storage[tail].load(Ordering::Relaxed);
        self.tail.store(Self::next(tail), Ordering::Release);
        Some(byte)
    }

    fn front(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        Some(self.storage[tail].load(Ordering::Relaxed))
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write end. Lives in the interrupt / event-injection context.
pub struct Producer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Returns false and drops the byte when the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        self.ring.enqueue(byte).is_ok()
    }

    pub fn write(&mut self, byte: u8) -> Result<(), u8> {
        self.ring.enqueue(byte)
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    pub fn overruns(&self) -> u32 {
        self.ring.overruns()
    }
}

/// Read end. Lives in the main polling loop.
pub struct Consumer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<'a, const N: usize> Consumer<'a, N> {
    pub fn available(&self) -> bool {
        !self.ring.is_empty()
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.ring.dequeue()
    }

    pub fn peek(&self) -> Option<u8> {
        self.ring.front()
    }

    pub fn count(&self) -> usize {
        self.ring.count()
    }

    pub fn overruns(&self) -> u32 {
        self.ring.overruns()
    }

    /// Lazily pop up to `max_len` bytes. Stops for good the first
    /// time the ring is found empty.
    pub fn drain(&mut self, max_len: usize) -> Drain<'_, 'a, N> {
        Drain {
            consumer: self,
            remaining: max_len,
        }
    }
}

pub struct Drain<'c, 'a, const N: usize> {
    consumer: &'c mut Consumer<'a, N>,
    remaining: usize,
}

impl<const N: usize> Iterator for Drain<'_, '_, N> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        match self.consumer.pop() {
            Some(byte) => {
                self.remaining -= 1;
                Some(byte)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<const N: usize> FusedIterator for Drain<'_, '_, N> {}
