//! Reveal Module - One-shot scroll reveal of page elements
//!
//! A [`RevealController`] owns a set of [`Target`]s. Each target starts
//! `Hidden`, and the first time an intersection entry reports it visible
//! (ratio at or above the threshold) it becomes `Revealed`, gets the settle
//! style and marker class, and is unobserved. Nothing ever moves a target
//! back to `Hidden`.
//!
//! Visuals are pure functions of (config, target): [`hidden_style`] and
//! [`revealed_style`] return style patches and the controller only applies
//! them.
//!
//! # Example
//!
//! ```ignore
//! use invoice_fx::state::reveal::{RevealConfig, RevealController};
//!
//! let cards = RevealController::new(RevealConfig::cards());
//! cards.register();
//! cards.start();
//!
//! // later, on scroll
//! invoice_fx::state::intersection::notify();
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spark_signals::{Signal, signal};
use tracing::{debug, trace, warn};

use super::intersection::{self, IntersectionEntry, ObserverId, ObserverOptions, RootMargin};
use crate::config::RevealSettings;
use crate::engine::arrays::core;
use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::{select, sibling_index};
use crate::error::Result;
use crate::types::{Easing, Transform, Transition};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Hidden,
    Revealed,
}

/// Where a target's stagger index comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaggerOrigin {
    /// Position among all matched targets.
    #[default]
    MatchOrder,
    /// Position among the target's siblings.
    SiblingOrder,
}

/// What `start` does when the host has no intersection facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Reveal every target immediately.
    #[default]
    RevealAll,
    /// Leave targets hidden.
    NoOp,
}

/// Inline style of a hidden target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiddenVisual {
    pub opacity: f32,
    /// Downward offset in px.
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    pub selector: String,
    pub options: ObserverOptions,
    /// `None` for class-only reveals that leave inline style alone.
    pub hidden: Option<HiddenVisual>,
    pub transition: Option<Transition>,
    pub marker_class: String,
    pub stagger_increment: Duration,
    pub stagger_origin: StaggerOrigin,
    pub fallback: Fallback,
}

impl RevealConfig {
    /// Invoice, stat, customer and item cards: fade up from 20px below.
    pub fn cards() -> Self {
        Self {
            selector: ".invoice-card, .stat-card, .customer-card, .item-card".into(),
            options: ObserverOptions::default(),
            hidden: Some(HiddenVisual {
                opacity: 0.0,
                offset_y: 20.0,
            }),
            transition: Some(Transition::all(Duration::from_millis(600), Easing::STANDARD)),
            marker_class: "animate-in".into(),
            stagger_increment: Duration::from_millis(100),
            stagger_origin: StaggerOrigin::MatchOrder,
            fallback: Fallback::RevealAll,
        }
    }

    /// `.fade-in-scroll` sections: the stylesheet animates on `visible`.
    pub fn fade_in_scroll() -> Self {
        Self {
            selector: ".fade-in-scroll".into(),
            hidden: None,
            transition: None,
            marker_class: "visible".into(),
            stagger_increment: Duration::ZERO,
            ..Self::cards()
        }
    }

    /// Card preset with configured overrides.
    pub fn from_settings(settings: &RevealSettings) -> Result<Self> {
        let root_margin: RootMargin = settings.root_margin.parse()?;
        let base = Self::cards();
        Ok(Self {
            options: ObserverOptions {
                threshold: settings.threshold,
                root_margin,
            },
            hidden: Some(HiddenVisual {
                opacity: 0.0,
                offset_y: settings.hidden_offset_px,
            }),
            transition: Some(Transition::all(settings.duration(), Easing::STANDARD)),
            stagger_increment: settings.stagger(),
            ..base
        })
    }
}

/// A watched element and its reveal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub index: usize,
    pub state: TargetState,
    /// Ordinal used for the stagger delay.
    pub delay_index: usize,
}

// =============================================================================
// PURE VISUALS
// =============================================================================

/// `delay_index * increment`, saturating.
pub fn stagger_delay(delay_index: usize, increment: Duration) -> Duration {
    increment.saturating_mul(u32::try_from(delay_index).unwrap_or(u32::MAX))
}

/// Style of a target before it is revealed.
pub fn hidden_style(config: &RevealConfig, target: &Target) -> StylePatch {
    let mut patch = StylePatch::new();
    if let Some(hidden) = config.hidden {
        patch = patch
            .opacity(hidden.opacity)
            .transform(Transform::translate_y(hidden.offset_y));
    }
    if let Some(transition) = config.transition {
        let delay = stagger_delay(target.delay_index, config.stagger_increment);
        patch = patch.transition(transition.with_delay(delay));
    }
    patch
}

/// Settled style of a revealed target.
pub fn revealed_style(config: &RevealConfig, _target: &Target) -> StylePatch {
    match config.hidden {
        Some(_) => StylePatch::new()
            .opacity(1.0)
            .transform(Transform::translate_y(0.0)),
        None => StylePatch::new(),
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

struct ControllerState {
    config: RevealConfig,
    targets: Vec<Target>,
    observer: Option<ObserverId>,
    revealed: Signal<usize>,
}

/// Owns the reveal state of every registered target.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct RevealController {
    state: Rc<RefCell<ControllerState>>,
}

impl RevealController {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(ControllerState {
                config,
                targets: Vec::new(),
                observer: None,
                revealed: signal(0),
            })),
        }
    }

    pub fn config(&self) -> RevealConfig {
        self.state.borrow().config.clone()
    }

    /// Register every element matching the configured selector.
    ///
    /// Returns the number of new targets.
    pub fn register(&self) -> usize {
        let selector = self.state.borrow().config.selector.clone();
        let matches = select(&selector);
        if matches.is_empty() {
            debug!(%selector, "no reveal targets");
            return 0;
        }
        self.register_targets(&matches)
    }

    /// Register specific elements, hiding each one.
    ///
    /// Elements already owned by a controller with the same marker class are
    /// skipped, so no reveal observes an element twice. Controllers with
    /// different markers (cards and `.fade-in-scroll`) each claim it.
    pub fn register_targets(&self, indices: &[usize]) -> usize {
        let (config, observer) = {
            let s = self.state.borrow();
            (s.config.clone(), s.observer)
        };

        let mut added = Vec::new();
        for (position, &index) in indices.iter().enumerate() {
            if !core::claim_reveal(index, &config.marker_class) {
                continue;
            }
            let delay_index = match config.stagger_origin {
                StaggerOrigin::MatchOrder => position,
                StaggerOrigin::SiblingOrder => sibling_index(index),
            };
            let target = Target {
                index,
                state: TargetState::Hidden,
                delay_index,
            };
            style::apply(index, &hidden_style(&config, &target));
            added.push(target);
        }

        // Already running: watch the new targets right away.
        if let Some(id) = observer {
            for target in &added {
                let _ = intersection::observe(id, target.index);
            }
        }

        let count = added.len();
        self.state.borrow_mut().targets.extend(added);
        debug!(selector = %config.selector, count, "registered reveal targets");
        count
    }

    /// Begin observing. Returns false when the host has no intersection
    /// facility, in which case the configured fallback runs.
    pub fn start(&self) -> bool {
        if self.state.borrow().observer.is_some() {
            return true;
        }
        let config = self.config();

        let weak: Weak<RefCell<ControllerState>> = Rc::downgrade(&self.state);
        let created = intersection::create_observer(config.options.clone(), move |entries, _| {
            if let Some(state) = weak.upgrade() {
                RevealController { state }.handle_entries(entries);
            }
        });

        let id = match created {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, fallback = ?config.fallback, selector = %config.selector, "reveal fallback");
                if config.fallback == Fallback::RevealAll {
                    self.reveal_all();
                }
                return false;
            }
        };

        self.state.borrow_mut().observer = Some(id);
        for index in self.pending() {
            let _ = intersection::observe(id, index);
        }
        debug!(
            observer = id,
            options = %intersection::describe(&config.options),
            "reveal observer started"
        );
        true
    }

    /// Apply a batch of entries. Returns the number of targets revealed.
    ///
    /// Entries that are not intersecting, fall below the threshold, or
    /// concern targets already revealed change nothing.
    pub fn handle_entries(&self, entries: &[IntersectionEntry]) -> usize {
        let threshold = self.state.borrow().config.options.threshold;
        entries
            .iter()
            .filter(|e| e.is_intersecting && e.intersection_ratio >= threshold)
            .filter(|e| self.reveal(e.target))
            .count()
    }

    /// Reveal one target. Returns false if it is unknown or already revealed.
    pub fn reveal(&self, index: usize) -> bool {
        let (config, target, observer, revealed) = {
            let mut s = self.state.borrow_mut();
            let Some(target) = s
                .targets
                .iter_mut()
                .find(|t| t.index == index && t.state == TargetState::Hidden)
            else {
                return false;
            };
            target.state = TargetState::Revealed;
            let target = *target;
            (s.config.clone(), target, s.observer, s.revealed.clone())
        };

        style::apply(index, &revealed_style(&config, &target));
        core::add_class(index, &config.marker_class);
        if let Some(id) = observer {
            let _ = intersection::unobserve(id, index);
        }
        revealed.set(revealed.get() + 1);
        trace!(element = index, marker = %config.marker_class, "revealed");
        true
    }

    /// Reveal every hidden target (fallback path).
    pub fn reveal_all(&self) -> usize {
        self.pending()
            .into_iter()
            .filter(|&index| self.reveal(index))
            .count()
    }

    pub fn state_of(&self, index: usize) -> Option<TargetState> {
        self.state
            .borrow()
            .targets
            .iter()
            .find(|t| t.index == index)
            .map(|t| t.state)
    }

    pub fn targets(&self) -> Vec<Target> {
        self.state.borrow().targets.clone()
    }

    /// Targets still hidden, in registration order.
    pub fn pending(&self) -> Vec<usize> {
        self.state
            .borrow()
            .targets
            .iter()
            .filter(|t| t.state == TargetState::Hidden)
            .map(|t| t.index)
            .collect()
    }

    pub fn is_observing(&self, index: usize) -> bool {
        self.state
            .borrow()
            .observer
            .is_some_and(|id| intersection::is_observing(id, index))
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.state.borrow().observer
    }

    pub fn revealed_count(&self) -> usize {
        self.state.borrow().revealed.get()
    }

    /// Reactive count of revealed targets.
    pub fn revealed_signal(&self) -> Signal<usize> {
        self.state.borrow().revealed.clone()
    }

    /// Stop observing and discard the observation set.
    pub fn teardown(&self) {
        let (observer, targets, marker) = {
            let mut s = self.state.borrow_mut();
            (
                s.observer.take(),
                std::mem::take(&mut s.targets),
                s.config.marker_class.clone(),
            )
        };
        if let Some(id) = observer {
            intersection::disconnect(id);
        }
        for target in &targets {
            core::release_reveal(target.index, &marker);
        }
        debug!(targets = targets.len(), "reveal controller torn down");
    }
}
