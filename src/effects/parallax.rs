//! Background parallax: the body background drifts against the scroll.
//!
//! Scroll events only request a frame; the position is written once per
//! animation frame no matter how many scroll events arrived.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::body;
use crate::state::frame::{self, FrameId};
use crate::state::window;
use crate::types::{Cleanup, format_number};

/// `background-position` for a scroll offset.
pub fn background_position(scroll_y: f32, rate: f32) -> String {
    format!("center {}px", format_number(scroll_y * rate))
}

pub fn parallax_style(scroll_y: f32, rate: f32) -> StylePatch {
    StylePatch::new().background_position(background_position(scroll_y, rate))
}

/// Drive the body background from window scroll. Returns cleanup function.
pub fn setup_parallax(rate: f32) -> Cleanup {
    if body().is_none() {
        debug!("parallax skipped: no body");
        return Box::new(|| {});
    }

    let pending: Rc<Cell<Option<FrameId>>> = Rc::new(Cell::new(None));
    let ticking = pending.clone();

    let stop = window::on_scroll(move || {
        if ticking.get().is_some() {
            return;
        }
        let done = ticking.clone();
        let id = frame::request_animation_frame(move |_| {
            done.set(None);
            if let Some(body) = body() {
                style::apply(body, &parallax_style(window::scroll_y(), rate));
            }
        });
        ticking.set(Some(id));
    });

    Box::new(move || {
        stop();
        if let Some(id) = pending.take() {
            frame::cancel_animation_frame(id);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};

    fn setup() -> usize {
        reset_document();
        frame::reset_frame_state();
        window::reset_window_state();
        window::set_document_height(Some(5000.0));
        create_element(ElementProps::tag("body"))
    }

    #[test]
    fn test_background_position() {
        assert_eq!(background_position(0.0, -0.5), "center 0px");
        assert_eq!(background_position(300.0, -0.5), "center -150px");
        assert_eq!(background_position(25.0, -0.5), "center -12.5px");
    }

    #[test]
    fn test_one_update_per_frame() {
        let body = setup();
        let _cleanup = setup_parallax(-0.5);

        window::scroll_to(100.0);
        window::scroll_to(200.0);
        window::scroll_to(400.0);
        assert_eq!(frame::pending_frames(), 1);
        assert_eq!(style::get_background_position(body), None);

        frame::run_animation_frame();
        assert_eq!(
            style::get_background_position(body).as_deref(),
            Some("center -200px")
        );

        window::scroll_to(500.0);
        assert_eq!(frame::pending_frames(), 1);
    }

    #[test]
    fn test_cleanup_cancels_pending_frame() {
        let body = setup();
        let cleanup = setup_parallax(-0.5);

        window::scroll_to(100.0);
        cleanup();
        assert_eq!(frame::run_animation_frame(), 0);

        window::scroll_to(300.0);
        assert_eq!(frame::pending_frames(), 0);
        assert_eq!(style::get_background_position(body), None);
    }

    #[test]
    fn test_no_body_is_noop() {
        reset_document();
        window::reset_window_state();
        frame::reset_frame_state();

        let cleanup = setup_parallax(-0.5);
        cleanup();
    }
}
