//! In-page anchors scroll smoothly instead of jumping.

use std::rc::Rc;

use tracing::{debug, trace};

use super::combine;
use crate::engine::arrays::core::{self, EffectFlags};
use crate::engine::{query_selector, select};
use crate::state::mouse::{self, PointerEvent, PointerHandlers};
use crate::state::window::{self, ScrollBehavior};
use crate::types::Cleanup;

pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

/// Element an in-page `href` points at.
///
/// A bare `#`, a fragment that is not a valid selector, and a fragment with
/// no matching element all resolve to `None`.
pub fn resolve_anchor(href: &str) -> Option<usize> {
    if href.len() <= 1 {
        return None;
    }
    match query_selector(href) {
        Ok(target) => target,
        Err(err) => {
            debug!(%href, %err, "anchor is not a selector");
            None
        }
    }
}

/// Make every `a[href^="#"]` scroll smoothly. Returns cleanup function.
pub fn setup_smooth_anchors() -> Cleanup {
    let mut cleanups: Vec<Cleanup> = Vec::new();
    for anchor in select(ANCHOR_SELECTOR) {
        if !core::mark_effect(anchor, EffectFlags::SMOOTH_ANCHOR) {
            continue;
        }
        let detach = mouse::on_element(
            anchor,
            PointerHandlers {
                on_click: Some(Rc::new(move |event: &PointerEvent| {
                    event.prevent_default();
                    let href = core::get_attribute(anchor, "href").unwrap_or_default();
                    match resolve_anchor(&href) {
                        Some(target) => {
                            trace!(%href, target, "smooth scroll");
                            window::scroll_into_view(target, ScrollBehavior::Smooth);
                        }
                        None => debug!(%href, "anchor target not found"),
                    }
                })),
                ..Default::default()
            },
        );
        cleanups.push(Box::new(move || {
            detach();
            core::unmark_effect(anchor, EffectFlags::SMOOTH_ANCHOR);
        }));
    }
    combine(cleanups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::state::mouse::dispatch;
    use crate::types::Rect;

    fn setup() {
        reset_document();
        mouse::reset_mouse_state();
        window::reset_window_state();
        window::set_document_height(Some(3000.0));
    }

    fn link(href: &str, rect: Rect) -> usize {
        create_element(ElementProps {
            attributes: vec![("href".into(), href.into())],
            rect,
            ..ElementProps::tag("a")
        })
    }

    #[test]
    fn test_resolve_anchor() {
        setup();
        let section = create_element(ElementProps {
            id: Some("invoices".into()),
            ..ElementProps::tag("section")
        });

        assert_eq!(resolve_anchor("#invoices"), Some(section));
        assert_eq!(resolve_anchor("#"), None);
        assert_eq!(resolve_anchor(""), None);
        assert_eq!(resolve_anchor("#missing"), None);
        assert_eq!(resolve_anchor("#bad!"), None);
    }

    #[test]
    fn test_click_scrolls_smoothly() {
        setup();
        create_element(ElementProps {
            id: Some("stats".into()),
            rect: Rect::new(0.0, 1200.0, 800.0, 400.0),
            ..ElementProps::tag("section")
        });
        link("#stats", Rect::new(0.0, 0.0, 80.0, 20.0));
        let _cleanup = setup_smooth_anchors();

        let prevented = dispatch(PointerEvent::click(10.0, 10.0));
        assert!(prevented);
        assert_eq!(window::scroll_y(), 1200.0);
        assert_eq!(window::last_scroll_behavior(), Some(ScrollBehavior::Smooth));
    }

    #[test]
    fn test_unknown_target_still_prevents_jump() {
        setup();
        link("#nowhere", Rect::new(0.0, 0.0, 80.0, 20.0));
        link("/logout", Rect::new(0.0, 40.0, 80.0, 20.0));
        let _cleanup = setup_smooth_anchors();

        assert!(dispatch(PointerEvent::click(10.0, 10.0)));
        assert_eq!(window::scroll_y(), 0.0);

        // Only in-page anchors are wired
        assert!(!dispatch(PointerEvent::click(10.0, 50.0)));
    }
}
