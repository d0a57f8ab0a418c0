//! # invoice-fx
//!
//! Presentation effects for the invoicing web UI.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! observable state.
//!
//! ## Architecture
//!
//! The host page is mirrored as a parallel-arrays element tree: elements are
//! indices into columnar arrays (tag, classes, attributes, rect, inline
//! style). Effects never own elements. They query indices, compute a
//! [`StylePatch`](engine::arrays::style::StylePatch) from their own state and
//! apply it.
//!
//! ```text
//! host events → state (window, mouse, frame, intersection) → effects → inline styles
//! ```
//!
//! Time is virtual: timers and animation frames run when the host calls
//! [`pipeline::tick`] (or [`state::frame::advance`] directly), which keeps every
//! effect deterministic under test.
//!
//! ## Modules
//!
//! - [`types`] - Geometry, colours, CSS values
//! - [`engine`] - Element registry, parallel arrays, selectors
//! - [`state`] - Window, clock, pointer, intersection observers, scroll reveal
//! - [`effects`] - Ripples, hover effects, parallax, gravity, decorations
//! - [`forms`] - Password toggles, submit handling, registration checks
//! - [`config`] - TOML configuration
//! - [`pipeline`] - Mount/unmount lifecycle

pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod forms;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{FeedbackMode, FxConfig};
pub use error::{FxError, Result, ValidationError};

pub use engine::{
    ElementProps, Selector, append_child, body, children_of, create_element, get_element_by_id,
    head, insert_after, query_selector, query_selector_all, remove_element, reset_document,
};

pub use state::{
    // Intersection
    IntersectionEntry, ObserverId, ObserverOptions, RootMargin,
    // Pointer
    PointerEvent, PointerHandlers, PointerKind,
    // Reveal
    Fallback, RevealConfig, RevealController, StaggerOrigin, Target, TargetState,
    // Window
    ScrollBehavior,
    reset_all_state,
};

pub use effects::{HoverEffect, RippleOptions};

pub use forms::{
    RegistrationFields, RegistrationGuard, RegistrationRules, SubmitEvent, SubmitOutcome,
    check_registration, on_submit, submit, toggle_input_type,
};

pub use pipeline::{MountHandle, mount, tick, unmount, window_loaded};
