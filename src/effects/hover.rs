//! Hover effects: one parameterised component plus the page's presets.

use std::rc::Rc;

use tracing::debug;

use super::combine;
use crate::engine::arrays::core;
use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::select;
use crate::state::mouse::{self, PointerEvent, PointerHandlers};
use crate::types::{Cleanup, Rgba, Transform, TransformFn};

/// Style applied on mouseenter and mouseleave, plus an optional class held
/// while hovered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverEffect {
    pub enter: StylePatch,
    pub leave: StylePatch,
    pub class: Option<String>,
}

impl HoverEffect {
    /// Cards rise and grow slightly.
    pub fn card_lift() -> Self {
        Self {
            enter: StylePatch::new()
                .transform(Transform::translate_y(-5.0).then(TransformFn::Scale(1.02))),
            leave: StylePatch::new()
                .transform(Transform::translate_y(0.0).then(TransformFn::Scale(1.0))),
            class: None,
        }
    }

    /// Cards glow while hovered.
    pub fn card_glow(shadow: &str) -> Self {
        Self {
            enter: StylePatch::new().box_shadow(shadow.to_string()),
            leave: StylePatch::new().clear_box_shadow(),
            class: None,
        }
    }

    /// Important buttons pulse while hovered.
    pub fn pulse() -> Self {
        Self {
            class: Some("pulse".into()),
            ..Self::default()
        }
    }

    /// The `position`-th navbar link takes its colour from the palette.
    pub fn nav_link(palette: &[Rgba], position: usize) -> Self {
        let mut enter = StylePatch::new()
            .transform(Transform::scale(1.1).then(TransformFn::TranslateY(-2.0)));
        if !palette.is_empty() {
            enter = enter.background(palette[position % palette.len()]);
        }
        Self {
            enter,
            leave: StylePatch::new().clear_background().clear_transform(),
            class: None,
        }
    }
}

/// Attach a hover effect to one element. Returns cleanup function.
pub fn attach_hover(index: usize, effect: HoverEffect) -> Cleanup {
    let effect = Rc::new(effect);
    let (on_enter, on_leave) = (effect.clone(), effect);

    let detach = mouse::on_element(
        index,
        PointerHandlers {
            on_mouse_enter: Some(Rc::new(move |_: &PointerEvent| {
                style::apply(index, &on_enter.enter);
                if let Some(class) = &on_enter.class {
                    core::add_class(index, class);
                }
            })),
            on_mouse_leave: Some(Rc::new(move |_: &PointerEvent| {
                style::apply(index, &on_leave.leave);
                if let Some(class) = &on_leave.class {
                    core::remove_class(index, class);
                }
            })),
            ..Default::default()
        },
    );
    Box::new(detach)
}

/// Attach `effect(position)` to every element matching `selector`.
pub fn setup_hover<F>(selector: &str, effect: F) -> Cleanup
where
    F: Fn(usize) -> HoverEffect,
{
    let targets = select(selector);
    if targets.is_empty() {
        debug!(%selector, "no hover targets");
    }
    combine(
        targets
            .into_iter()
            .enumerate()
            .map(|(position, index)| attach_hover(index, effect(position)))
            .collect(),
    )
}

pub fn setup_card_lift() -> Cleanup {
    setup_hover(".invoice-card, .stat-card, .customer-card", |_| {
        HoverEffect::card_lift()
    })
}

pub fn setup_card_glow(shadow: &str) -> Cleanup {
    setup_hover(".invoice-card, .stat-card", |_| HoverEffect::card_glow(shadow))
}

pub fn setup_button_pulse() -> Cleanup {
    setup_hover(".search-button, .auth-button", |_| HoverEffect::pulse())
}

pub fn setup_nav_palette(palette: &[Rgba]) -> Cleanup {
    setup_hover(".navbar-links a", |position| {
        HoverEffect::nav_link(palette, position)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::state::mouse::dispatch;
    use crate::state::window;
    use crate::types::Rect;
    use pretty_assertions::assert_eq;

    fn setup() {
        reset_document();
        mouse::reset_mouse_state();
        window::reset_window_state();
    }

    fn el(tag: &str, class: &str, rect: Rect, parent: Option<usize>) -> usize {
        create_element(ElementProps {
            classes: vec![class.into()],
            rect,
            parent,
            ..ElementProps::tag(tag)
        })
    }

    #[test]
    fn test_card_lift_and_glow_stack() {
        setup();

        let card = el("div", "invoice-card", Rect::new(0.0, 0.0, 300.0, 200.0), None);
        let _lift = setup_card_lift();
        let _glow = setup_card_glow("0 0 10px red");

        dispatch(PointerEvent::moved(10.0, 10.0));
        assert_eq!(
            style::css_text(card),
            "transform: translateY(-5px) scale(1.02); box-shadow: 0 0 10px red;"
        );

        dispatch(PointerEvent::moved(900.0, 700.0));
        assert_eq!(style::css_text(card), "transform: translateY(0px) scale(1);");
    }

    #[test]
    fn test_pulse_class_while_hovered() {
        setup();

        let button = el("button", "auth-button", Rect::new(0.0, 0.0, 100.0, 40.0), None);
        let _pulse = setup_button_pulse();

        dispatch(PointerEvent::moved(5.0, 5.0));
        assert!(core::has_class(button, "pulse"));
        dispatch(PointerEvent::leave());
        assert!(!core::has_class(button, "pulse"));
    }

    #[test]
    fn test_nav_palette_cycles() {
        setup();

        let palette = [Rgba::from_rgb_int(0x667eea), Rgba::from_rgb_int(0x764ba2)];
        let nav = el("div", "navbar-links", Rect::new(0.0, 0.0, 1000.0, 60.0), None);
        let links: Vec<usize> = (0..3)
            .map(|i| el("a", "nav-link", Rect::new(i as f32 * 100.0, 0.0, 80.0, 40.0), Some(nav)))
            .collect();
        let _cleanup = setup_nav_palette(&palette);

        dispatch(PointerEvent::moved(210.0, 10.0));
        assert_eq!(style::get_background(links[2]), Some(palette[0]));
        assert_eq!(
            style::css_text(links[2]),
            "transform: scale(1.1) translateY(-2px); background: #667eea;"
        );

        dispatch(PointerEvent::moved(110.0, 10.0));
        assert!(style::get_style(links[2]).is_empty());
        assert_eq!(style::get_background(links[1]), Some(palette[1]));
    }

    #[test]
    fn test_cleanup_stops_hover() {
        setup();

        let card = el("div", "stat-card", Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let cleanup = setup_card_lift();
        cleanup();

        dispatch(PointerEvent::moved(10.0, 10.0));
        assert!(style::get_style(card).is_empty());
    }
}
