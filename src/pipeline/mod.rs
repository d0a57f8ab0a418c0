//! Page Pipeline
//!
//! Connects the host page lifecycle to the effects:
//!
//! ```text
//! DOMContentLoaded → mount() → effects wired, reveal observers started
//! load             → window_loaded()
//! host loop        → tick() → timers, animation frames
//! unload           → unmount() / Drop
//! ```

pub mod mount;

pub use mount::{MountHandle, mount, tick, unmount, window_loaded};
