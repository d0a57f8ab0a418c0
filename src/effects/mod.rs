//! Page Effects - Decorative reactions to pointer, scroll and page load.
//!
//! Each effect has two halves:
//! - pure functions computing a [`StylePatch`](crate::engine::arrays::style::StylePatch)
//!   (or class change) from the effect's inputs
//! - a `setup_*` function that queries its elements, wires listeners and
//!   returns a [`Cleanup`]
//!
//! Setup is null-safe: a selector with no matches or a missing element id
//! wires nothing and returns a no-op cleanup.

pub mod anchor;
pub mod decorate;
pub mod gravity;
pub mod hover;
pub mod parallax;
pub mod ripple;
pub mod stylesheet;
pub mod theme_toggle;

use crate::types::Cleanup;

/// Merge cleanups into one that runs them in reverse order.
pub fn combine(mut cleanups: Vec<Cleanup>) -> Cleanup {
    Box::new(move || {
        while let Some(cleanup) = cleanups.pop() {
            cleanup();
        }
    })
}

/// A cleanup that does nothing.
pub fn noop() -> Cleanup {
    Box::new(|| {})
}

pub use anchor::setup_smooth_anchors;
pub use decorate::{
    decorate_loaded_page, inject_sparkles, mark_content_sections, mark_icons, mark_inputs,
    schedule_zoom_in, setup_icon_pulse, stagger_animations,
};
pub use gravity::setup_gravity;
pub use hover::{HoverEffect, attach_hover, setup_hover};
pub use parallax::setup_parallax;
pub use ripple::{RippleOptions, setup_ripples};
pub use stylesheet::inject_stylesheet;
pub use theme_toggle::setup_theme_toggle;
