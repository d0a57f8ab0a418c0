//! Theme toggle bounce.
//!
//! The theme switch itself belongs to the page; this only smooths it: the
//! body transitions for half a second and the toggle button bounces.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::engine::arrays::core::{self, EffectFlags};
use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::{body, get_element_by_id};
use crate::state::frame::{self, TimerId};
use crate::state::mouse::{self, PointerEvent, PointerHandlers};
use crate::types::{Cleanup, Easing, Transform, Transition};

pub const THEME_TOGGLE_ID: &str = "theme-toggle";

const BODY_TRANSITION: Duration = Duration::from_millis(500);
const BOUNCE: Duration = Duration::from_millis(150);

pub fn body_transition() -> Transition {
    Transition::all(BODY_TRANSITION, Easing::STANDARD)
}

/// Wire the `#theme-toggle` button. No-op when the page has none.
pub fn setup_theme_toggle() -> Cleanup {
    let Some(toggle) = get_element_by_id(THEME_TOGGLE_ID) else {
        debug!("no theme toggle");
        return Box::new(|| {});
    };
    if !core::mark_effect(toggle, EffectFlags::THEME_BOUNCE) {
        return Box::new(|| {});
    }

    let timers: Rc<RefCell<Vec<TimerId>>> = Rc::new(RefCell::new(Vec::new()));
    let pending = timers.clone();

    let detach = mouse::on_element(
        toggle,
        PointerHandlers {
            on_click: Some(Rc::new(move |_: &PointerEvent| {
                let page = body();
                if let Some(page) = page {
                    style::apply(page, &StylePatch::new().transition(body_transition()));
                }
                style::apply(toggle, &StylePatch::new().transform(Transform::scale(0.9)));

                let mut pending = pending.borrow_mut();
                pending.push(frame::set_timeout(BOUNCE, move || {
                    style::apply(toggle, &StylePatch::new().transform(Transform::scale(1.0)));
                }));
                if let Some(page) = page {
                    pending.push(frame::set_timeout(BODY_TRANSITION, move || {
                        style::apply(page, &StylePatch::new().clear_transition());
                    }));
                }
                trace!(toggle, "theme toggle bounce");
            })),
            ..Default::default()
        },
    );

    Box::new(move || {
        detach();
        for id in timers.take() {
            frame::clear_timer(id);
        }
        core::unmark_effect(toggle, EffectFlags::THEME_BOUNCE);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::state::mouse::dispatch;
    use crate::state::window;
    use crate::types::Rect;

    fn setup() -> (usize, usize) {
        reset_document();
        frame::reset_frame_state();
        mouse::reset_mouse_state();
        window::reset_window_state();

        let body = create_element(ElementProps::tag("body"));
        let toggle = create_element(ElementProps {
            id: Some(THEME_TOGGLE_ID.into()),
            rect: Rect::new(10.0, 10.0, 40.0, 40.0),
            parent: Some(body),
            ..ElementProps::tag("button")
        });
        (body, toggle)
    }

    #[test]
    fn test_bounce_sequence() {
        let (body, toggle) = setup();
        let _cleanup = setup_theme_toggle();

        dispatch(PointerEvent::click(20.0, 20.0));
        assert_eq!(style::get_transition(body), Some(body_transition()));
        assert_eq!(style::get_transform(toggle), Some(Transform::scale(0.9)));

        frame::advance(Duration::from_millis(150));
        assert_eq!(style::get_transform(toggle), Some(Transform::scale(1.0)));
        assert!(style::get_transition(body).is_some());

        frame::advance(Duration::from_millis(350));
        assert_eq!(style::get_transition(body), None);
    }

    #[test]
    fn test_missing_toggle_is_noop() {
        reset_document();
        let cleanup = setup_theme_toggle();
        cleanup();
    }

    #[test]
    fn test_cleanup_cancels_pending_timers() {
        let (body, toggle) = setup();
        let cleanup = setup_theme_toggle();

        dispatch(PointerEvent::click(20.0, 20.0));
        cleanup();
        frame::advance(Duration::from_secs(1));

        assert_eq!(style::get_transform(toggle), Some(Transform::scale(0.9)));
        assert!(style::get_transition(body).is_some());
        assert!(!core::get_effects(toggle).contains(EffectFlags::THEME_BOUNCE));
    }
}
