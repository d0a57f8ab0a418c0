//! State Module - Runtime state management systems
//!
//! This module contains the host-facing state that effects run on:
//!
//! - **Window** - Viewport, scroll offset, location, scroll/resize listeners
//! - **Frame** - Virtual clock, timers, animation frames
//! - **Animate** - Shared pulse clocks
//! - **Mouse** - Hit testing, hover tracking, click bubbling
//! - **Intersection** - Viewport intersection observers
//! - **Reveal** - One-shot scroll reveal controller

pub mod animate;
pub mod frame;
pub mod intersection;
pub mod mouse;
pub mod reveal;
pub mod window;

pub use intersection::{IntersectionEntry, ObserverId, ObserverOptions, RootMargin};
pub use mouse::{PointerEvent, PointerHandlers, PointerKind};
pub use reveal::{Fallback, RevealConfig, RevealController, StaggerOrigin, Target, TargetState};
pub use window::ScrollBehavior;

/// Reset every state module (for testing)
pub fn reset_all_state() {
    frame::reset_frame_state();
    animate::reset_pulse_clocks();
    intersection::reset_intersection_state();
    mouse::reset_mouse_state();
    window::reset_window_state();
}
