//! Mount API - Page lifecycle.
//!
//! `mount` does what the page scripts did on `DOMContentLoaded`: inject the
//! stylesheet, decorate elements, start the reveal controllers and wire
//! every interactive effect. `window_loaded` runs the `load` stage.
//!
//! # Example
//!
//! ```ignore
//! use invoice_fx::config::FxConfig;
//! use invoice_fx::pipeline::{mount, tick, window_loaded};
//!
//! let handle = mount(&FxConfig::default());
//! window_loaded(&handle);
//!
//! // Drive timers and animation frames from the host loop
//! while tick(&handle, Duration::from_millis(16)) {
//!     // ...
//! }
//!
//! handle.unmount();
//! ```

use std::time::Duration;

use tracing::{info, warn};

use crate::config::FxConfig;
use crate::effects::{self, RippleOptions, hover};
use crate::forms::{self, RegistrationGuard, RegistrationRules};
use crate::state::intersection;
use crate::state::reveal::{RevealConfig, RevealController};
use crate::state::{frame, window};
use crate::types::Cleanup;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds every cleanup registered during mount, the reveal controllers and
/// the registration guard. Dropping the handle unmounts.
pub struct MountHandle {
    cleanups: Vec<Cleanup>,
    cards: RevealController,
    fade_ins: RevealController,
    guard: Option<RegistrationGuard>,
    running: bool,
}

impl MountHandle {
    /// Card reveal controller.
    pub fn cards(&self) -> &RevealController {
        &self.cards
    }

    /// `.fade-in-scroll` controller.
    pub fn fade_ins(&self) -> &RevealController {
        &self.fade_ins
    }

    pub fn registration_guard(&self) -> Option<&RegistrationGuard> {
        self.guard.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Detach every effect and discard the reveal controllers' observations.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        let count = self.cleanups.len();
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
        self.cards.teardown();
        self.fade_ins.teardown();
        self.guard.take();
        info!(cleanups = count, "effects unmounted");
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

fn reveal_controller(config: RevealConfig) -> RevealController {
    let controller = RevealController::new(config);
    controller.register();
    controller.start();
    controller
}

/// Wire every page effect.
///
/// Missing elements are skipped, so the same call works on every page of
/// the app.
pub fn mount(config: &FxConfig) -> MountHandle {
    let mut cleanups: Vec<Cleanup> = Vec::new();

    effects::inject_stylesheet();

    cleanups.push(effects::setup_ripples(&RippleOptions::buttons()));
    cleanups.push(effects::setup_ripples(&RippleOptions::marked()));

    effects::mark_icons();
    effects::mark_content_sections();
    effects::mark_inputs();
    effects::stagger_animations(config.reveal.stagger());

    let card_config = RevealConfig::from_settings(&config.reveal).unwrap_or_else(|err| {
        warn!(%err, "invalid reveal settings, using defaults");
        RevealConfig::cards()
    });
    let cards = reveal_controller(card_config);
    let fade_ins = reveal_controller(RevealConfig::fade_in_scroll());

    cleanups.push(effects::setup_theme_toggle());
    cleanups.push(effects::setup_parallax(config.parallax.rate));

    cleanups.push(hover::setup_card_lift());
    cleanups.push(hover::setup_card_glow(&config.card_glow));
    cleanups.push(hover::setup_button_pulse());
    cleanups.push(hover::setup_nav_palette(&config.nav_palette));

    cleanups.push(effects::setup_smooth_anchors());
    cleanups.push(effects::setup_gravity(config.gravity.clone()));
    cleanups.push(effects::setup_icon_pulse(&config.pulse));
    cleanups.push(effects::schedule_zoom_in(&config.zoom));

    let mut rng = effects::decorate::sparkle_rng(config.sparkle_seed);
    effects::inject_sparkles(&mut rng);

    cleanups.push(forms::setup_standard_toggles());
    let guard = RegistrationGuard::attach(
        RegistrationRules::from_config(config),
        config.validation.feedback,
    );

    // Observers re-check on every scroll and resize
    let stop_scroll = window::on_scroll(|| {
        intersection::notify();
    });
    let stop_resize = window::on_resize(|| {
        intersection::notify();
    });
    cleanups.push(Box::new(stop_scroll));
    cleanups.push(Box::new(stop_resize));

    // Initial delivery
    intersection::notify();

    info!(
        cleanups = cleanups.len(),
        cards = cards.targets().len(),
        fade_ins = fade_ins.targets().len(),
        registration_guard = guard.is_some(),
        "effects mounted"
    );

    MountHandle {
        cleanups,
        cards,
        fade_ins,
        guard,
        running: true,
    }
}

/// The window `load` stage.
pub fn window_loaded(handle: &MountHandle) {
    if handle.is_running() {
        effects::decorate_loaded_page();
    }
}

/// Advance the clock and run one animation frame.
///
/// Returns false once the handle is unmounted.
pub fn tick(handle: &MountHandle, elapsed: Duration) -> bool {
    if !handle.is_running() {
        return false;
    }
    frame::advance(elapsed);
    frame::run_animation_frame();
    true
}

/// Unmount the page effects.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arrays::{core, style};
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::forms::reset_forms_state;
    use crate::state::{mouse, reset_all_state};
    use crate::state::reveal::TargetState;
    use crate::types::Rect;

    fn setup() -> usize {
        reset_document();
        reset_all_state();
        reset_forms_state();
        window::set_document_height(Some(3000.0));
        create_element(ElementProps::tag("body"))
    }

    fn card(body: usize, y: f32) -> usize {
        create_element(ElementProps {
            classes: vec!["invoice-card".into()],
            rect: Rect::new(0.0, y, 300.0, 200.0),
            parent: Some(body),
            ..ElementProps::tag("div")
        })
    }

    #[test]
    fn test_mount_reveals_visible_cards() {
        let body = setup();
        let visible = card(body, 100.0);
        let below = card(body, 1500.0);

        let handle = mount(&FxConfig::default());
        assert_eq!(handle.cards().state_of(visible), Some(TargetState::Revealed));
        assert_eq!(handle.cards().state_of(below), Some(TargetState::Hidden));
        assert_eq!(style::get_opacity(below), Some(0.0));

        window::scroll_to(1000.0);
        assert_eq!(handle.cards().state_of(below), Some(TargetState::Revealed));
        assert!(core::has_class(below, "animate-in"));
    }

    #[test]
    fn test_unmount_detaches_everything() {
        let body = setup();
        let below = card(body, 1500.0);
        let button = create_element(ElementProps {
            rect: Rect::new(0.0, 0.0, 100.0, 40.0),
            parent: Some(body),
            ..ElementProps::tag("button")
        });

        let handle = mount(&FxConfig::default());
        handle.unmount();

        assert_eq!(intersection::observer_count(), 0);
        window::scroll_to(1000.0);
        assert!(!core::has_class(below, "animate-in"));

        mouse::dispatch(mouse::PointerEvent::click(10.0, 10.0));
        assert!(crate::engine::children_of(button).is_empty());
        assert_eq!(frame::pending_timers(), 0);
    }

    #[test]
    fn test_window_loaded_and_tick() {
        let body = setup();
        let zoom = create_element(ElementProps {
            classes: vec!["zoom-in".into()],
            parent: Some(body),
            ..ElementProps::tag("div")
        });

        let handle = mount(&FxConfig::default());
        window_loaded(&handle);
        assert!(core::has_class(body, "effects-loaded"));

        assert!(tick(&handle, Duration::from_millis(100)));
        assert!(core::has_class(body, "loaded"));
        assert!(style::get_animation(zoom).is_some());

        drop(handle);
        assert_eq!(frame::pending_timers(), 0);
    }
}
