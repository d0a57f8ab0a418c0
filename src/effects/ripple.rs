//! Ripple - a circle spreading from the click point inside a button.
//!
//! One component serves both the generic button ripple and the explicit
//! `.ripple-effect` marker. Geometry comes from the host's bounding client
//! rectangle, so it is correct inside scrolled or positioned containers.

use std::rc::Rc;

use tracing::{debug, trace};

use super::combine;
use crate::engine::arrays::core::{self, EffectFlags};
use crate::engine::arrays::{geometry, style::{self, StylePatch}};
use crate::engine::{ElementProps, create_element, query_selector_within, remove_element, select};
use crate::state::mouse::{self, PointerEvent, PointerHandlers};
use crate::state::window;
use crate::types::{Cleanup, Length, Overflow, Point, PointerEvents, Position, Rect};

pub const RIPPLE_CLASS: &str = "ripple";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RippleOptions {
    pub selector: String,
    /// Make hosts `position: relative; overflow: hidden`.
    pub prepare_host: bool,
    /// Tag hosts with the `magnetic` hover class.
    pub magnetic: bool,
}

impl RippleOptions {
    /// Every button on the page.
    pub fn buttons() -> Self {
        Self {
            selector: "button, .search-button, .auth-button".into(),
            prepare_host: true,
            magnetic: true,
        }
    }

    /// Elements that opt in with `.ripple-effect`.
    pub fn marked() -> Self {
        Self {
            selector: ".ripple-effect".into(),
            prepare_host: false,
            magnetic: false,
        }
    }
}

/// Size and offset of a ripple relative to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleGeometry {
    pub diameter: f32,
    pub left: f32,
    pub top: f32,
}

/// Circle covering the host's larger side, centred on the click.
///
/// Both `host` and `click` are in client coordinates.
pub fn ripple_geometry(host: Rect, click: Point) -> RippleGeometry {
    let diameter = host.width.max(host.height);
    let radius = diameter / 2.0;
    RippleGeometry {
        diameter,
        left: click.x - host.x - radius,
        top: click.y - host.y - radius,
    }
}

pub fn ripple_style(geometry: &RippleGeometry) -> StylePatch {
    StylePatch::new()
        .width(Length::Px(geometry.diameter))
        .height(Length::Px(geometry.diameter))
        .left(Length::Px(geometry.left))
        .top(Length::Px(geometry.top))
        // Stylesheet rules are invisible to hit testing.
        .pointer_events(PointerEvents::None)
}

/// Replace any ripple in `host` with a new one for this click.
///
/// Returns the new ripple element.
pub fn spawn_ripple(host: usize, event: &PointerEvent) -> usize {
    if let Ok(Some(previous)) = query_selector_within(host, ".ripple") {
        remove_element(previous);
    }

    let host_rect = geometry::get_rect(host);
    let ripple = ripple_geometry(window::client_rect(host), event.client_point());
    let circle = create_element(ElementProps {
        classes: vec![RIPPLE_CLASS.into()],
        rect: Rect::new(
            host_rect.x + ripple.left,
            host_rect.y + ripple.top,
            ripple.diameter,
            ripple.diameter,
        ),
        parent: Some(host),
        ..ElementProps::tag("span")
    });
    style::apply(circle, &ripple_style(&ripple));
    trace!(host, circle, diameter = ripple.diameter, "ripple");
    circle
}

/// Attach ripples to every element matching `options.selector`.
pub fn setup_ripples(options: &RippleOptions) -> Cleanup {
    let hosts = select(&options.selector);
    if hosts.is_empty() {
        debug!(selector = %options.selector, "no ripple hosts");
    }

    let mut cleanups: Vec<Cleanup> = Vec::new();
    for host in hosts {
        if !core::mark_effect(host, EffectFlags::RIPPLE) {
            continue;
        }
        if options.prepare_host {
            style::apply(
                host,
                &StylePatch::new()
                    .position(Position::Relative)
                    .overflow(Overflow::Hidden),
            );
        }
        if options.magnetic {
            core::add_class(host, "magnetic");
        }

        let detach = mouse::on_element(
            host,
            PointerHandlers {
                on_click: Some(Rc::new(move |event: &PointerEvent| {
                    spawn_ripple(host, event);
                })),
                ..Default::default()
            },
        );
        cleanups.push(Box::new(move || {
            detach();
            core::unmark_effect(host, EffectFlags::RIPPLE);
        }));
    }
    combine(cleanups)
}
