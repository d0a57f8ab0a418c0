//! Intersection Module - Viewport intersection observers
//!
//! Reports when observed elements enter or leave the (margin-adjusted)
//! viewport. Entries are computed from element geometry and window state on
//! [`notify`]; a host with a native facility can push its own entries with
//! [`deliver`] instead.
//!
//! Delivery follows the browser model: each observer receives one batch per
//! notification containing only targets whose intersecting state changed,
//! and the first computation after `observe` always reports.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, trace};

use super::{frame, window};
use crate::error::{FxError, Result};
use crate::types::{Length, Rect, format_number};

pub type ObserverId = usize;

// =============================================================================
// OPTIONS
// =============================================================================

/// CSS margin shorthand applied to the root before intersecting.
///
/// Negative values shrink the root. Percentages resolve against the root's
/// width (left/right) or height (top/bottom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(Length::Px(0.0))
    }
}

impl RootMargin {
    pub const fn uniform(value: Length) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Grow (or shrink) `root` by the margin.
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

fn parse_margin_value(token: &str) -> Option<Length> {
    if token == "0" {
        return Some(Length::Px(0.0));
    }
    if let Some(number) = token.strip_suffix("px") {
        return number.parse().ok().map(Length::Px);
    }
    if let Some(number) = token.strip_suffix('%') {
        return number.parse().ok().map(Length::Percent);
    }
    None
}

impl FromStr for RootMargin {
    type Err = FxError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || FxError::InvalidRootMargin(input.to_string());

        let values = input
            .split_whitespace()
            .map(parse_margin_value)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(invalid()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.top.css(),
            self.right.css(),
            self.bottom.css(),
            self.left.css()
        )
    }
}

/// Observer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target's area that must be visible.
    pub threshold: f32,
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin {
                top: Length::Px(0.0),
                right: Length::Px(0.0),
                bottom: Length::Px(-50.0),
                left: Length::Px(0.0),
            },
        }
    }
}

// =============================================================================
// ENTRIES
// =============================================================================

/// One intersection change for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: usize,
    pub is_intersecting: bool,
    /// Visible fraction of the target, `0.0..=1.0`.
    pub intersection_ratio: f32,
    pub bounding_client_rect: Rect,
    pub intersection_rect: Rect,
    pub root_bounds: Rect,
    pub time: Duration,
}

impl IntersectionEntry {
    /// An entry with only the fields a host usually knows.
    pub fn new(target: usize, is_intersecting: bool, intersection_ratio: f32) -> Self {
        Self {
            target,
            is_intersecting,
            intersection_ratio,
            bounding_client_rect: Rect::default(),
            intersection_rect: Rect::default(),
            root_bounds: Rect::default(),
            time: frame::now(),
        }
    }
}

/// Compute the entry for `target` against the current viewport.
pub fn compute_entry(target: usize, options: &ObserverOptions) -> IntersectionEntry {
    let root = options.root_margin.apply(window::viewport_rect());
    let rect = window::client_rect(target);
    let overlap = rect.intersection(&root);

    let ratio = match overlap {
        Some(area) if rect.area() > 0.0 => (area.area() / rect.area()).clamp(0.0, 1.0),
        // Zero-area targets count as fully visible when touched.
        Some(_) => 1.0,
        None => 0.0,
    };
    let is_intersecting = overlap.is_some() && ratio >= options.threshold;

    IntersectionEntry {
        target,
        is_intersecting,
        intersection_ratio: ratio,
        bounding_client_rect: rect,
        intersection_rect: overlap.unwrap_or_default(),
        root_bounds: root,
        time: frame::now(),
    }
}

// =============================================================================
// OBSERVER REGISTRY
// =============================================================================

/// Observer callback: a batch of entries and the observer that produced it.
pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry], ObserverId)>;

struct Observer {
    options: ObserverOptions,
    callback: IntersectionCallback,
    /// Observed targets in observation order.
    targets: Vec<usize>,
    /// Last delivered effective state per target: intersecting at or above
    /// the threshold.
    last: HashMap<usize, bool>,
}

thread_local! {
    static OBSERVERS: RefCell<BTreeMap<ObserverId, Observer>> = const { RefCell::new(BTreeMap::new()) };
    static NEXT_OBSERVER: Cell<ObserverId> = const { Cell::new(0) };
    static SUPPORTED: Cell<bool> = const { Cell::new(true) };
}

/// Whether the host provides viewport intersection.
pub fn is_supported() -> bool {
    SUPPORTED.with(|s| s.get())
}

pub fn set_supported(supported: bool) {
    SUPPORTED.with(|s| s.set(supported));
}

/// Create an observer.
pub fn create_observer<F>(options: ObserverOptions, callback: F) -> Result<ObserverId>
where
    F: Fn(&[IntersectionEntry], ObserverId) + 'static,
{
    if !is_supported() {
        debug!("intersection observer requested but unsupported");
        return Err(FxError::IntersectionUnsupported);
    }
    let id = NEXT_OBSERVER.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    });
    OBSERVERS.with(|obs| {
        obs.borrow_mut().insert(
            id,
            Observer {
                options,
                callback: Rc::new(callback),
                targets: Vec::new(),
                last: HashMap::new(),
            },
        );
    });
    Ok(id)
}

fn with_observer<R>(id: ObserverId, f: impl FnOnce(&mut Observer) -> R) -> Result<R> {
    OBSERVERS.with(|obs| {
        obs.borrow_mut()
            .get_mut(&id)
            .map(f)
            .ok_or(FxError::UnknownObserver(id))
    })
}

/// Start observing a target. Observing twice is a no-op.
pub fn observe(id: ObserverId, target: usize) -> Result<()> {
    with_observer(id, |o| {
        if !o.targets.contains(&target) {
            o.targets.push(target);
            o.last.remove(&target);
        }
    })
}

/// Stop observing a target.
pub fn unobserve(id: ObserverId, target: usize) -> Result<()> {
    with_observer(id, |o| {
        o.targets.retain(|&t| t != target);
        o.last.remove(&target);
    })
}

/// Drop an observer and everything it watches. Unknown ids are ignored.
pub fn disconnect(id: ObserverId) {
    OBSERVERS.with(|obs| {
        obs.borrow_mut().remove(&id);
    });
}

pub fn observed_targets(id: ObserverId) -> Vec<usize> {
    OBSERVERS.with(|obs| {
        obs.borrow()
            .get(&id)
            .map(|o| o.targets.clone())
            .unwrap_or_default()
    })
}

pub fn is_observing(id: ObserverId, target: usize) -> bool {
    OBSERVERS.with(|obs| {
        obs.borrow()
            .get(&id)
            .is_some_and(|o| o.targets.contains(&target))
    })
}

pub fn observer_count() -> usize {
    OBSERVERS.with(|obs| obs.borrow().len())
}

// =============================================================================
// DELIVERY
// =============================================================================

/// Keep entries whose effective state differs from the last delivery, and
/// record them.
///
/// Host entries may flag a target as intersecting below the threshold, so a
/// later entry crossing the threshold counts as a change.
fn take_changes(o: &mut Observer, entries: Vec<IntersectionEntry>) -> Vec<IntersectionEntry> {
    let threshold = o.options.threshold;
    entries
        .into_iter()
        .filter(|e| o.targets.contains(&e.target))
        .filter(|e| {
            let met = e.is_intersecting && e.intersection_ratio >= threshold;
            o.last.insert(e.target, met) != Some(met)
        })
        .collect()
}

/// Recompute every observer's targets and deliver changed entries.
///
/// Returns the number of entries delivered.
pub fn notify() -> usize {
    let ids: Vec<ObserverId> = OBSERVERS.with(|obs| obs.borrow().keys().copied().collect());
    let mut delivered = 0;

    for id in ids {
        // An earlier callback may have disconnected this observer.
        let batch = OBSERVERS.with(|obs| {
            let mut obs = obs.borrow_mut();
            let o = obs.get_mut(&id)?;
            let entries = o
                .targets
                .iter()
                .map(|&t| compute_entry(t, &o.options))
                .collect();
            let changed = take_changes(o, entries);
            (!changed.is_empty()).then(|| (o.callback.clone(), changed))
        });

        if let Some((callback, entries)) = batch {
            trace!(observer = id, entries = entries.len(), "intersection batch");
            delivered += entries.len();
            callback(&entries, id);
        }
    }
    delivered
}

/// Deliver host-computed entries to an observer.
///
/// Entries for targets the observer does not watch, and entries that repeat
/// the last delivered state relative to the threshold, are dropped.
pub fn deliver(id: ObserverId, entries: Vec<IntersectionEntry>) -> Result<()> {
    let (callback, changed) = with_observer(id, |o| (o.callback.clone(), take_changes(o, entries)))?;
    if !changed.is_empty() {
        callback(&changed, id);
    }
    Ok(())
}

/// Drop every observer and restore support (for testing)
pub fn reset_intersection_state() {
    OBSERVERS.with(|obs| obs.borrow_mut().clear());
    NEXT_OBSERVER.with(|n| n.set(0));
    SUPPORTED.with(|s| s.set(true));
}

/// Options formatted for logs.
pub(crate) fn describe(options: &ObserverOptions) -> String {
    format!(
        "threshold={} root_margin=\"{}\"",
        format_number(options.threshold),
        options.root_margin
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::state::reveal::{RevealConfig, RevealController, TargetState};

    fn setup() {
        reset_document();
        reset_intersection_state();
        window::reset_window_state();
        window::set_viewport(1000.0, 800.0);
        window::set_document_height(Some(5000.0));
    }

    fn card_at(y: f32) -> usize {
        create_element(ElementProps {
            rect: Rect::new(0.0, y, 300.0, 200.0),
            ..ElementProps::tag("div")
        })
    }

    fn recording() -> (Rc<RefCell<Vec<IntersectionEntry>>>, impl Fn(&[IntersectionEntry], ObserverId)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        (log, move |entries: &[IntersectionEntry], _| {
            l.borrow_mut().extend_from_slice(entries)
        })
    }

    #[test]
    fn test_root_margin_parse() {
        let m: RootMargin = "0px 0px -50px 0px".parse().unwrap();
        assert_eq!(m.bottom, Length::Px(-50.0));
        assert_eq!(m.top, Length::Px(0.0));

        let m: RootMargin = "10%".parse().unwrap();
        assert_eq!(m.left, Length::Percent(10.0));

        let m: RootMargin = "5px 0".parse().unwrap();
        assert_eq!((m.top, m.right), (Length::Px(5.0), Length::Px(0.0)));

        for bad in ["", "5em", "1px 2px 3px 4px 5px", "px"] {
            assert!(bad.parse::<RootMargin>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_root_margin_apply() {
        let root = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let shrunk = ObserverOptions::default().root_margin.apply(root);
        assert_eq!(shrunk, Rect::new(0.0, 0.0, 1000.0, 750.0));

        let grown: RootMargin = "10%".parse().unwrap();
        assert_eq!(grown.apply(root), Rect::new(-100.0, -80.0, 1200.0, 960.0));
    }

    #[test]
    fn test_threshold_and_margin() {
        setup();

        let options = ObserverOptions::default();
        // Top 20px of the card inside the 750px trigger zone: ratio 0.1
        let edge = card_at(730.0);
        let below_zone = card_at(760.0);

        let entry = compute_entry(edge, &options);
        assert!((entry.intersection_ratio - 0.1).abs() < 1e-4);
        assert!(entry.is_intersecting);
        assert!(!compute_entry(below_zone, &options).is_intersecting);
    }

    #[test]
    fn test_first_notify_reports_then_only_changes() {
        setup();

        let (log, callback) = recording();
        let visible = card_at(100.0);
        let hidden = card_at(2000.0);
        let id = create_observer(ObserverOptions::default(), callback).unwrap();
        observe(id, visible).unwrap();
        observe(id, hidden).unwrap();

        assert_eq!(notify(), 2);
        assert_eq!(notify(), 0);

        window::scroll_to(1500.0);
        notify();
        let log = log.borrow();
        assert_eq!(log.len(), 4);
        assert_eq!((log[2].target, log[2].is_intersecting), (visible, false));
        assert_eq!((log[3].target, log[3].is_intersecting), (hidden, true));
    }

    #[test]
    fn test_unsupported() {
        setup();
        set_supported(false);

        let result = create_observer(ObserverOptions::default(), |_, _| {});
        assert!(matches!(result, Err(FxError::IntersectionUnsupported)));
    }

    #[test]
    fn test_unknown_observer() {
        setup();

        assert!(matches!(observe(42, 0), Err(FxError::UnknownObserver(42))));
        assert!(deliver(42, Vec::new()).is_err());
    }

    #[test]
    fn test_deliver_filters_unobserved_and_repeats() {
        setup();

        let (log, callback) = recording();
        let a = card_at(100.0);
        let b = card_at(200.0);
        let id = create_observer(ObserverOptions::default(), callback).unwrap();
        observe(id, a).unwrap();

        deliver(id, vec![IntersectionEntry::new(a, true, 1.0), IntersectionEntry::new(b, true, 1.0)])
            .unwrap();
        deliver(id, vec![IntersectionEntry::new(a, true, 1.0)]).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].target, a);
    }

    #[test]
    fn test_deliver_passes_threshold_crossing() {
        setup();

        let (log, callback) = recording();
        let a = card_at(100.0);
        let id = create_observer(ObserverOptions::default(), callback).unwrap();
        observe(id, a).unwrap();

        // Overlapping but under the 0.1 threshold, then crossing it
        deliver(id, vec![IntersectionEntry::new(a, true, 0.05)]).unwrap();
        deliver(id, vec![IntersectionEntry::new(a, true, 0.08)]).unwrap();
        deliver(id, vec![IntersectionEntry::new(a, true, 0.5)]).unwrap();

        let ratios: Vec<f32> = log.borrow().iter().map(|e| e.intersection_ratio).collect();
        assert_eq!(ratios, vec![0.05, 0.5]);
    }

    #[test]
    fn test_low_entry_then_crossing_reveals() {
        setup();

        let a = card_at(3000.0);
        let controller = RevealController::new(RevealConfig::cards());
        controller.register_targets(&[a]);
        assert!(controller.start());
        let id = controller.observer().unwrap();

        deliver(id, vec![IntersectionEntry::new(a, true, 0.05)]).unwrap();
        assert_eq!(controller.state_of(a), Some(TargetState::Hidden));
        deliver(id, vec![IntersectionEntry::new(a, true, 0.5)]).unwrap();
        assert_eq!(controller.state_of(a), Some(TargetState::Revealed));
    }

    #[test]
    fn test_callback_may_unobserve_reentrantly() {
        setup();

        let a = card_at(100.0);
        let b = card_at(150.0);
        let id = create_observer(ObserverOptions::default(), |entries, observer| {
            for entry in entries {
                unobserve(observer, entry.target).unwrap();
            }
        })
        .unwrap();
        observe(id, a).unwrap();
        observe(id, b).unwrap();

        notify();
        assert!(observed_targets(id).is_empty());
    }

    #[test]
    fn test_observe_twice_is_single_target() {
        setup();

        let a = card_at(100.0);
        let id = create_observer(ObserverOptions::default(), |_, _| {}).unwrap();
        observe(id, a).unwrap();
        observe(id, a).unwrap();
        assert_eq!(observed_targets(id), vec![a]);

        disconnect(id);
        assert!(!is_observing(id, a));
        assert_eq!(observer_count(), 0);
    }
}
