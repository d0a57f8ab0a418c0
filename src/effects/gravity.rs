//! Pointer gravity: floating cards lean toward a nearby pointer.

use tracing::trace;

use crate::config::GravitySettings;
use crate::engine::arrays::style::{self, StylePatch};
use crate::engine::select;
use crate::state::mouse::{self, PointerEvent};
use crate::state::window;
use crate::types::{Cleanup, Point, Rect, Transform, TransformFn};

pub const GRAVITY_SELECTOR: &str = ".floating-card";

/// Transform pulling a card at `rect` toward `pointer` (both client space).
///
/// `None` once the pointer is outside the radius, meaning the inline
/// transform is removed.
pub fn gravity_transform(rect: Rect, pointer: Point, settings: &GravitySettings) -> Option<Transform> {
    let center = rect.center();
    let x = pointer.x - center.x;
    let y = pointer.y - center.y;
    let distance = (x * x + y * y).sqrt();
    if distance >= settings.radius {
        return None;
    }

    let force = (settings.radius - distance) / settings.radius;
    let move_x = x * force * settings.strength;
    let move_y = y * force * settings.strength;
    Some(
        Transform::translate(move_x, move_y)
            .then(TransformFn::RotateX(move_y * settings.tilt))
            .then(TransformFn::RotateY(move_x * settings.tilt)),
    )
}

pub fn gravity_style(rect: Rect, pointer: Point, settings: &GravitySettings) -> StylePatch {
    match gravity_transform(rect, pointer, settings) {
        Some(transform) => StylePatch::new().transform(transform),
        None => StylePatch::new().clear_transform(),
    }
}

/// Track the pointer over every `.floating-card`. Returns cleanup function.
///
/// Cards are looked up on each move, so cards added later are picked up.
pub fn setup_gravity(settings: GravitySettings) -> Cleanup {
    let detach = mouse::on_mouse_move(move |event: &PointerEvent| {
        let pointer = event.client_point();
        for card in select(GRAVITY_SELECTOR) {
            let patch = gravity_style(window::client_rect(card), pointer, &settings);
            style::apply(card, &patch);
        }
        trace!(x = pointer.x, y = pointer.y, "gravity");
    });
    Box::new(detach)
}
