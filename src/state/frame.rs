//! Frame Module - Deterministic event loop clock
//!
//! Timers and animation frames run on a virtual clock that the host (or a
//! test) advances explicitly. Nothing here sleeps or spawns threads: every
//! callback runs synchronously inside `advance` or `run_animation_frame`.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use invoice_fx::state::frame;
//!
//! frame::set_timeout(Duration::from_millis(150), || { /* settle */ });
//! frame::advance(Duration::from_millis(200)); // fires the timeout
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{Signal, signal};
use tracing::trace;

pub type TimerId = usize;
pub type FrameId = usize;

/// Intervals never repeat faster than this.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Repeat(Rc<dyn Fn()>),
}

struct Timer {
    due: Duration,
    /// Scheduling sequence: breaks ties between timers due at the same time.
    seq: u64,
    interval: Option<Duration>,
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct Scheduler {
    timers: BTreeMap<TimerId, Timer>,
    next_id: TimerId,
    next_seq: u64,
    frames: Vec<(FrameId, Box<dyn FnOnce(Duration)>)>,
    next_frame_id: FrameId,
}

impl Scheduler {
    fn seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn schedule(&mut self, due: Duration, interval: Option<Duration>, callback: TimerCallback) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.seq();
        self.timers.insert(
            id,
            Timer {
                due,
                seq,
                interval,
                callback: Some(callback),
            },
        );
        id
    }

    /// Earliest timer due at or before `limit`.
    fn next_due(&self, limit: Duration) -> Option<TimerId> {
        self.timers
            .iter()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(id, _)| *id)
    }
}

thread_local! {
    static NOW: Signal<Duration> = signal(Duration::ZERO);
    static SCHEDULER: RefCell<Scheduler> = RefCell::new(Scheduler::default());
}

// =============================================================================
// CLOCK
// =============================================================================

/// Current virtual time since the page started.
pub fn now() -> Duration {
    NOW.with(|s| s.get())
}

fn set_now(time: Duration) {
    NOW.with(|s| {
        if s.get() != time {
            s.set(time);
        }
    });
}

// =============================================================================
// TIMERS
// =============================================================================

/// Run `callback` once after `delay`.
pub fn set_timeout<F>(delay: Duration, callback: F) -> TimerId
where
    F: FnOnce() + 'static,
{
    let due = now() + delay;
    SCHEDULER.with(|s| {
        s.borrow_mut()
            .schedule(due, None, TimerCallback::Once(Box::new(callback)))
    })
}

/// Run `callback` every `period` until cleared.
pub fn set_interval<F>(period: Duration, callback: F) -> TimerId
where
    F: Fn() + 'static,
{
    let period = period.max(MIN_INTERVAL);
    let due = now() + period;
    SCHEDULER.with(|s| {
        s.borrow_mut()
            .schedule(due, Some(period), TimerCallback::Repeat(Rc::new(callback)))
    })
}

/// Cancel a timeout or interval. Unknown ids are ignored.
pub fn clear_timer(id: TimerId) {
    SCHEDULER.with(|s| {
        s.borrow_mut().timers.remove(&id);
    });
}

pub fn pending_timers() -> usize {
    SCHEDULER.with(|s| s.borrow().timers.len())
}

/// Advance the clock, firing every timer that comes due in due-time order.
///
/// Timers scheduled by callbacks fire too if they fall inside the window.
/// Returns the number of callbacks run.
pub fn advance(by: Duration) -> usize {
    let target = now() + by;
    let mut fired = 0;

    loop {
        // Take what we need out of the scheduler, then call with no borrow held.
        let next = SCHEDULER.with(|s| {
            let mut s = s.borrow_mut();
            let id = s.next_due(target)?;
            let seq = s.seq();
            let timer = s.timers.get_mut(&id)?;
            let due = timer.due;
            let callback = match timer.interval {
                Some(period) => {
                    timer.due = due + period;
                    timer.seq = seq;
                    match &timer.callback {
                        Some(TimerCallback::Repeat(f)) => Some(TimerCallback::Repeat(f.clone())),
                        _ => None,
                    }
                }
                None => {
                    let callback = timer.callback.take();
                    s.timers.remove(&id);
                    callback
                }
            };
            Some((id, due, callback))
        });

        let Some((id, due, callback)) = next else { break };
        set_now(due);
        trace!(timer = id, at_ms = due.as_millis() as u64, "timer fired");
        match callback {
            Some(TimerCallback::Once(f)) => f(),
            Some(TimerCallback::Repeat(f)) => f(),
            None => {}
        }
        fired += 1;
    }

    set_now(target);
    fired
}

// =============================================================================
// ANIMATION FRAMES
// =============================================================================

/// Queue `callback` for the next animation frame.
pub fn request_animation_frame<F>(callback: F) -> FrameId
where
    F: FnOnce(Duration) + 'static,
{
    SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        let id = s.next_frame_id;
        s.next_frame_id += 1;
        s.frames.push((id, Box::new(callback)));
        id
    })
}

pub fn cancel_animation_frame(id: FrameId) {
    SCHEDULER.with(|s| s.borrow_mut().frames.retain(|(fid, _)| *fid != id));
}

pub fn pending_frames() -> usize {
    SCHEDULER.with(|s| s.borrow().frames.len())
}

/// Run one animation frame. Callbacks requested during the frame wait for
/// the next one. Returns the number of callbacks run.
pub fn run_animation_frame() -> usize {
    let frames = SCHEDULER.with(|s| std::mem::take(&mut s.borrow_mut().frames));
    let time = now();
    let count = frames.len();
    for (_, callback) in frames {
        callback(time);
    }
    count
}

/// Reset clock, timers and frames (for testing)
pub fn reset_frame_state() {
    SCHEDULER.with(|s| *s.borrow_mut() = Scheduler::default());
    set_now(Duration::ZERO);
}
