//! Page decoration: class markers, load cascades, icon pulse and sparkles.
//!
//! Most of this runs once at mount. The timed parts (zoom cascade, icon
//! pulse) run on the virtual clock and return cleanups that cancel whatever
//! is still pending.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::{PulseSettings, ZoomSettings};
use crate::engine::arrays::core;
use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::{ElementProps, body, create_element, query_selector, query_selector_within, select};
use crate::state::animate::subscribe_to_pulse;
use crate::state::frame::{self, TimerId};
use crate::state::reveal::stagger_delay;
use crate::types::{
    Animation, Cleanup, Easing, Length, PointerEvents, Position, Transform,
};

pub const ICON_SELECTOR: &str = ".fa-file-invoice-dollar, .fa-chart-line, .fa-users";
pub const SECTION_SELECTOR: &str = ".container, .invoice-card, .stat-card, .customer-card";
pub const INPUT_SELECTOR: &str = "input, select, textarea";
pub const STAGGER_SELECTOR: &str = ".invoice-card, .stat-card";

const ZOOM_DURATION: Duration = Duration::from_millis(500);
const SPARKLE_DURATION: Duration = Duration::from_secs(3);

// =============================================================================
// Class markers
// =============================================================================

fn mark_all(selector: &str, class: &str) -> usize {
    let targets = select(selector);
    if targets.is_empty() {
        debug!(%selector, %class, "nothing to mark");
    }
    for &index in &targets {
        core::add_class(index, class);
    }
    targets.len()
}

/// Icons float.
pub fn mark_icons() -> usize {
    mark_all(ICON_SELECTOR, "floating")
}

/// Content sections fade in on load.
pub fn mark_content_sections() -> usize {
    mark_all(SECTION_SELECTOR, "fade-in")
}

/// Form inputs glow when focused.
pub fn mark_inputs() -> usize {
    mark_all(INPUT_SELECTOR, "glow")
}

/// Delay each card's load animation by its position times `increment`.
pub fn stagger_animations(increment: Duration) -> usize {
    let cards = select(STAGGER_SELECTOR);
    for (position, &card) in cards.iter().enumerate() {
        style::apply(
            card,
            &StylePatch::new().animation_delay(stagger_delay(position, increment)),
        );
    }
    cards.len()
}

// =============================================================================
// Zoom cascade
// =============================================================================

pub fn zoom_in_animation() -> Animation {
    Animation::once("zoomIn", ZOOM_DURATION, Easing::EaseOut).forwards()
}

/// After the start delay, mark the body `loaded` and start each `.zoom-in`
/// element's animation one step after the previous one.
pub fn schedule_zoom_in(settings: &ZoomSettings) -> Cleanup {
    let timers: Rc<RefCell<Vec<TimerId>>> = Rc::new(RefCell::new(Vec::new()));
    let step = Duration::from_millis(settings.step_ms);

    let cascade = timers.clone();
    let start = frame::set_timeout(Duration::from_millis(settings.start_delay_ms), move || {
        if let Some(body) = body() {
            core::add_class(body, "loaded");
        }
        for (position, element) in select(".zoom-in").into_iter().enumerate() {
            let id = frame::set_timeout(stagger_delay(position, step), move || {
                style::apply(element, &StylePatch::new().animation(zoom_in_animation()));
                trace!(element, "zoom in");
            });
            cascade.borrow_mut().push(id);
        }
    });
    timers.borrow_mut().push(start);

    Box::new(move || {
        for id in timers.take() {
            frame::clear_timer(id);
        }
    })
}

// =============================================================================
// Icon pulse
// =============================================================================

/// Every period, scale `.pulse-effect` icons up and drop them back after the
/// hold time. All icons share one clock.
pub fn setup_icon_pulse(settings: &PulseSettings) -> Cleanup {
    let icons = select(".pulse-effect");
    if icons.is_empty() {
        debug!("no pulse icons");
        return Box::new(|| {});
    }

    let hold_timer: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
    let peak = settings.peak_scale;
    let hold = settings.hold();

    let pending = hold_timer.clone();
    let unsubscribe = subscribe_to_pulse(settings.period(), move |_| {
        let up = StylePatch::new().transform(Transform::scale(peak));
        for &icon in icons.iter() {
            style::apply(icon, &up);
        }
        let icons = icons.clone();
        let done = pending.clone();
        let id = frame::set_timeout(hold, move || {
            done.set(None);
            let rest = StylePatch::new().transform(Transform::scale(1.0));
            for &icon in icons.iter() {
                style::apply(icon, &rest);
            }
        });
        if let Some(previous) = pending.replace(Some(id)) {
            frame::clear_timer(previous);
        }
    });

    Box::new(move || {
        unsubscribe();
        if let Some(id) = hold_timer.take() {
            frame::clear_timer(id);
        }
    })
}

// =============================================================================
// Sparkles
// =============================================================================

/// RNG for sparkle placement. A seed makes placement reproducible.
pub fn sparkle_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Randomly placed sparkle: top and right in 10..90%, delay in 0..2s.
pub fn sparkle_style(rng: &mut impl Rng) -> StylePatch {
    let top = rng.gen_range(10.0..90.0);
    let right = rng.gen_range(10.0..90.0);
    let delay = rng.gen_range(0.0..2.0);
    StylePatch::new()
        .position(Position::Absolute)
        .top(Length::Percent(top))
        .right(Length::Percent(right))
        .font_size(Length::Rem(1.2))
        .opacity(0.0)
        .animation(Animation::infinite("sparkle", SPARKLE_DURATION, Easing::EaseInOut))
        .animation_delay(Duration::from_secs_f32(delay))
        .pointer_events(PointerEvents::None)
        .z_index(10)
}

/// Give every `.sparkle-effect` element without one a sparkle child.
///
/// Returns the number of sparkles added.
pub fn inject_sparkles(rng: &mut impl Rng) -> usize {
    let mut added = 0;
    for host in select(".sparkle-effect") {
        if matches!(query_selector_within(host, ".sparkle"), Ok(Some(_))) {
            continue;
        }
        let sparkle = create_element(ElementProps {
            classes: vec!["sparkle".into()],
            text: Some("✨".into()),
            parent: Some(host),
            ..ElementProps::tag("span")
        });
        style::apply(sparkle, &sparkle_style(rng));
        added += 1;
    }
    added
}

// =============================================================================
// Window load
// =============================================================================

/// Load-stage decoration: headline glow and the `effects-loaded` body class.
pub fn decorate_loaded_page() {
    match query_selector(".header h1") {
        Ok(Some(title)) => {
            core::add_class(title, "glow-text");
            core::add_class(title, "gradient-text");
        }
        _ => debug!("no page title to decorate"),
    }
    if let Some(body) = body() {
        core::add_class(body, "effects-loaded");
    }
}
