// coop-rt host demo and composition root
//
// Boot: logger -> static ring/flags/tick counter -> split ring -> tasks
// Main loop: wait for timer flag -> advance scheduler per tick -> repeat
//
// Two threads stand in for interrupt handlers: a periodic timer that
// bumps the tick counter, and a UART RX line that feeds bytes into the
// ring. Everything else runs cooperatively on the main thread, with the
// UART drained by a scheduled task rather than inline.

use std::cell::{Cell, RefCell};
use std::thread;
use std::time::Duration;

use env_logger::Env;
use log::{info, warn};
use static_cell::StaticCell;

use coop_rt::drivers::{RxIsr, SerialRx};
use coop_rt::kernel::flags::bit;
use coop_rt::kernel::{EventFlags, RingBuffer, Scheduler, SoftTimer, Tick, TickCounter};

const RX_RING_SLOTS: usize = 32;
const MAX_TASKS: usize = 4;

const RUN_TICKS: Tick = 200;
const TICK_MS: u64 = 2;
const UART_BYTE_MS: u64 = 15;

const BLINK_PERIOD: Tick = 10;
const UART_PERIOD: Tick = 5;
const STATUS_PERIOD: Tick = 50;
const WATCHDOG_TICKS: Tick = 100;

const FLAG_TIMER: u32 = bit(0);
const FLAG_UART_RX: u32 = bit(1);

const GREETING: &[u8] = b"Hello";

static RX_RING: StaticCell<RingBuffer<RX_RING_SLOTS>> = StaticCell::new();
static EVENTS: StaticCell<EventFlags> = StaticCell::new();
static TICKS: StaticCell<TickCounter> = StaticCell::new();

// level from COOP_LOG (error/warn/info/debug/trace), info by default
fn init_logger_from_env() {
    env_logger::Builder::from_env(Env::default().filter_or("COOP_LOG", "info")).init();
}

fn main() {
    init_logger_from_env();
    info!("booting...");

    let ring = RX_RING.init(RingBuffer::new());
    let events: &'static EventFlags = EVENTS.init(EventFlags::new());
    let ticks: &'static TickCounter = TICKS.init(TickCounter::new());

    let (tx, rx) = ring.split();
    let mut rx_isr = RxIsr::new(tx, events, FLAG_UART_RX);
    let mut serial = SerialRx::new(rx);

    let timer_irq = thread::spawn(move || {
        for _ in 0..RUN_TICKS {
            thread::sleep(Duration::from_millis(TICK_MS));
            ticks.tick();
            events.raise(FLAG_TIMER);
        }
    });

    let uart_irq = thread::spawn(move || {
        for &byte in GREETING {
            thread::sleep(Duration::from_millis(UART_BYTE_MS));
            rx_isr.on_receive(byte);
        }
        rx_isr.overruns()
    });
    info!("interrupt sources started.");

    let blinks = Cell::new(0u32);
    let received = RefCell::new(Vec::<u8>::new());

    let mut led_on = false;
    let mut blink = || {
        led_on = !led_on;
        blinks.set(blinks.get() + 1);
    };
    let mut poll_uart = || {
        if events.check_and_clear(FLAG_UART_RX) {
            received.borrow_mut().extend(serial.drain(RX_RING_SLOTS));
        }
    };
    let mut status = || {
        info!(
            "uptime {} ticks, {} blinks, {} bytes received",
            ticks.now(),
            blinks.get(),
            received.borrow().len()
        );
    };

    let mut sched: Scheduler<'_, MAX_TASKS> = Scheduler::new();
    for result in [
        sched.register("blink", BLINK_PERIOD, &mut blink),
        sched.register("uart", UART_PERIOD, &mut poll_uart),
        sched.register("status", STATUS_PERIOD, &mut status),
    ] {
        if let Err(err) = result {
            warn!("task registration failed: {}", err);
        }
    }

    let mut watchdog = SoftTimer::new();
    watchdog.start(ticks.now(), WATCHDOG_TICKS);

    let mut last: Tick = ticks.now();
    while last < RUN_TICKS {
        if !events.check_and_clear(FLAG_TIMER) {
            thread::yield_now();
            continue;
        }

        // one advance per logical tick, even if this loop fell behind
        let now = ticks.now();
        while last != now {
            last = last.wrapping_add(1);
            sched.advance(last);
        }

        if watchdog.expired(now) {
            info!("watchdog window of {} ticks elapsed at {}", watchdog.duration(), now);
            watchdog.restart(now);
        }
    }

    if timer_irq.join().is_err() {
        warn!("timer thread panicked");
    }
    let overruns = match uart_irq.join() {
        Ok(n) => n,
        Err(_) => {
            warn!("uart thread panicked");
            0
        }
    };

    for task in sched.tasks() {
        info!("{}", task);
    }
    drop(sched);

    // whatever arrived after the last uart poll
    let mut text = received.into_inner();
    text.extend(serial.drain(RX_RING_SLOTS));
    info!(
        "received {:?} ({} overruns), led {}",
        String::from_utf8_lossy(&text),
        overruns,
        if led_on { "on" } else { "off" }
    );
}
