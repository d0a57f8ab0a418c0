//! Pulse Animation System - Shared clocks per period
//!
//! Periodic effects (the icon pulse) subscribe to a clock instead of owning
//! an interval each. All subscribers with the same period share one timer,
//! so every icon pulses in sync.
//!
//! # Pattern
//!
//! - Timer starts with the first subscriber, stops with the last
//! - A tick counter signal advances on every period
//! - Each subscriber's callback receives the tick number
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use invoice_fx::state::animate::subscribe_to_pulse;
//!
//! let unsubscribe = subscribe_to_pulse(Duration::from_secs(3), |tick| {
//!     // scale the icons up for a moment
//! });
//!
//! unsubscribe();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{Signal, signal};
use tracing::trace;

use super::frame::{self, TimerId};

// =============================================================================
// PULSE REGISTRY
// =============================================================================

type TickCallback = Rc<dyn Fn(u64)>;

/// Per-period registry containing shared timer state
struct PulseClock {
    /// Number of completed periods (reactive)
    ticks: Signal<u64>,
    timer: Option<TimerId>,
    subscribers: Vec<(usize, TickCallback)>,
}

thread_local! {
    /// Map from period (ms) to clock
    static PULSE_CLOCKS: RefCell<HashMap<u64, PulseClock>> = RefCell::new(HashMap::new());
    static NEXT_SUBSCRIBER: RefCell<usize> = const { RefCell::new(0) };
}

fn period_key(period: Duration) -> u64 {
    period.as_millis() as u64
}

fn tick(key: u64) {
    let fired = PULSE_CLOCKS.with(|clocks| {
        let clocks = clocks.borrow();
        let clock = clocks.get(&key)?;
        let tick = clock.ticks.get() + 1;
        clock.ticks.set(tick);
        let subscribers: Vec<TickCallback> =
            clock.subscribers.iter().map(|(_, f)| f.clone()).collect();
        Some((tick, subscribers))
    });

    if let Some((tick, subscribers)) = fired {
        trace!(period_ms = key, tick, "pulse");
        for subscriber in subscribers {
            subscriber(tick);
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to the shared clock with the given period.
///
/// Returns an unsubscribe function. A zero period returns a no-op
/// unsubscribe (pulse disabled).
pub fn subscribe_to_pulse<F>(period: Duration, on_tick: F) -> Box<dyn FnOnce()>
where
    F: Fn(u64) + 'static,
{
    let key = period_key(period);
    if key == 0 {
        return Box::new(|| {});
    }

    let id = NEXT_SUBSCRIBER.with(|n| {
        let mut n = n.borrow_mut();
        let id = *n;
        *n += 1;
        id
    });

    let needs_timer = PULSE_CLOCKS.with(|clocks| {
        let mut clocks = clocks.borrow_mut();
        let clock = clocks.entry(key).or_insert_with(|| PulseClock {
            ticks: signal(0),
            timer: None,
            subscribers: Vec::new(),
        });
        clock.subscribers.push((id, Rc::new(on_tick)));
        clock.timer.is_none()
    });

    // Start timer if first subscriber
    if needs_timer {
        let timer = frame::set_interval(period, move || tick(key));
        PULSE_CLOCKS.with(|clocks| {
            if let Some(clock) = clocks.borrow_mut().get_mut(&key) {
                clock.timer = Some(timer);
            }
        });
    }

    Box::new(move || {
        let stop = PULSE_CLOCKS.with(|clocks| {
            let mut clocks = clocks.borrow_mut();
            let clock = clocks.get_mut(&key)?;
            clock.subscribers.retain(|(sid, _)| *sid != id);
            if clock.subscribers.is_empty() {
                clocks.remove(&key).and_then(|c| c.timer)
            } else {
                None
            }
        });
        if let Some(timer) = stop {
            frame::clear_timer(timer);
        }
    })
}

/// Ticks completed by the clock with this period (0 if not running).
pub fn get_pulse_ticks(period: Duration) -> u64 {
    PULSE_CLOCKS.with(|clocks| {
        clocks
            .borrow()
            .get(&period_key(period))
            .map(|c| c.ticks.get())
            .unwrap_or(0)
    })
}

/// Tick signal of a running clock, for reactive consumers.
pub fn get_pulse_signal(period: Duration) -> Option<Signal<u64>> {
    PULSE_CLOCKS.with(|clocks| {
        clocks
            .borrow()
            .get(&period_key(period))
            .map(|c| c.ticks.clone())
    })
}

pub fn is_pulse_running(period: Duration) -> bool {
    PULSE_CLOCKS.with(|clocks| {
        clocks
            .borrow()
            .get(&period_key(period))
            .is_some_and(|c| c.timer.is_some())
    })
}

pub fn get_subscriber_count(period: Duration) -> usize {
    PULSE_CLOCKS.with(|clocks| {
        clocks
            .borrow()
            .get(&period_key(period))
            .map(|c| c.subscribers.len())
            .unwrap_or(0)
    })
}

/// Stop every clock (for testing)
pub fn reset_pulse_clocks() {
    let timers: Vec<TimerId> = PULSE_CLOCKS.with(|clocks| {
        clocks
            .borrow_mut()
            .drain()
            .filter_map(|(_, c)| c.timer)
            .collect()
    });
    for timer in timers {
        frame::clear_timer(timer);
    }
}
