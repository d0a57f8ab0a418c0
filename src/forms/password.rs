//! Show/hide password buttons.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::effects::combine;
use crate::engine::arrays::core::{self, EffectFlags};
use crate::engine::{get_element_by_id, query_selector_within};
use crate::state::mouse::{self, PointerEvent, PointerHandlers};
use crate::types::Cleanup;

/// (field id, button id) pairs used by the login and register pages.
pub const STANDARD_TOGGLES: [(&str, &str); 3] = [
    ("password", "togglePassword"),
    ("password", "toggleRegisterPassword"),
    ("confirm_password", "toggleConfirmPassword"),
];

/// Next `type` of a password field. Anything but `password` becomes
/// `password`, so a field never gets stuck visible.
pub fn toggle_input_type(current: &str) -> &'static str {
    if current == "password" { "text" } else { "password" }
}

/// Flip the field's visibility and swap the eye icon inside the button.
pub fn toggle_password(field: usize, button: usize) {
    let current = core::get_attribute(field, "type").unwrap_or_else(|| "text".into());
    let next = toggle_input_type(&current);
    core::set_attribute(field, "type", next);

    if let Ok(Some(icon)) = query_selector_within(button, "i") {
        core::toggle_class(icon, "fa-eye");
        core::toggle_class(icon, "fa-eye-slash");
    }
    trace!(field, next, "password visibility");
}

/// Wire one toggle button. No-op when either element is missing.
pub fn setup_password_toggle(field_id: &str, button_id: &str) -> Cleanup {
    let (Some(field), Some(button)) = (get_element_by_id(field_id), get_element_by_id(button_id))
    else {
        debug!(field_id, button_id, "password toggle skipped");
        return Box::new(|| {});
    };
    if !core::mark_effect(button, EffectFlags::PASSWORD_TOGGLE) {
        return Box::new(|| {});
    }

    let detach = mouse::on_element(
        button,
        PointerHandlers {
            on_click: Some(Rc::new(move |_: &PointerEvent| toggle_password(field, button))),
            ..Default::default()
        },
    );
    Box::new(move || {
        detach();
        core::unmark_effect(button, EffectFlags::PASSWORD_TOGGLE);
    })
}

/// Wire every toggle the auth pages may contain.
pub fn setup_standard_toggles() -> Cleanup {
    combine(
        STANDARD_TOGGLES
            .iter()
            .map(|(field, button)| setup_password_toggle(field, button))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, reset_document};
    use crate::state::mouse::dispatch;
    use crate::state::window;
    use crate::types::Rect;
    use tracing_test::traced_test;

    fn setup() {
        reset_document();
        mouse::reset_mouse_state();
        window::reset_window_state();
    }

    fn field(id: &str) -> usize {
        create_element(ElementProps {
            id: Some(id.into()),
            attributes: vec![("type".into(), "password".into())],
            ..ElementProps::tag("input")
        })
    }

    fn toggle(id: &str, rect: Rect) -> (usize, usize) {
        let button = create_element(ElementProps {
            id: Some(id.into()),
            rect,
            ..ElementProps::tag("button")
        });
        let icon = create_element(ElementProps {
            classes: vec!["fas".into(), "fa-eye".into()],
            rect,
            parent: Some(button),
            ..ElementProps::tag("i")
        });
        (button, icon)
    }

    #[test]
    fn test_toggle_input_type() {
        assert_eq!(toggle_input_type("password"), "text");
        assert_eq!(toggle_input_type("text"), "password");
        assert_eq!(toggle_input_type("email"), "password");
        assert_eq!(toggle_input_type(toggle_input_type("password")), "password");
    }

    #[test]
    fn test_click_on_icon_toggles() {
        setup();
        let input = field("password");
        let (_, icon) = toggle("togglePassword", Rect::new(0.0, 0.0, 30.0, 30.0));
        let _cleanup = setup_standard_toggles();

        dispatch(PointerEvent::click(10.0, 10.0));
        assert_eq!(core::get_attribute(input, "type").as_deref(), Some("text"));
        assert!(core::has_class(icon, "fa-eye-slash"));
        assert!(!core::has_class(icon, "fa-eye"));

        dispatch(PointerEvent::click(10.0, 10.0));
        assert_eq!(core::get_attribute(input, "type").as_deref(), Some("password"));
        assert!(core::has_class(icon, "fa-eye"));
    }

    #[test]
    fn test_confirm_field_toggles_independently() {
        setup();
        let password = field("password");
        let confirm = field("confirm_password");
        toggle("toggleRegisterPassword", Rect::new(0.0, 0.0, 30.0, 30.0));
        toggle("toggleConfirmPassword", Rect::new(0.0, 50.0, 30.0, 30.0));
        let _cleanup = setup_standard_toggles();

        dispatch(PointerEvent::click(10.0, 60.0));
        assert_eq!(core::get_attribute(confirm, "type").as_deref(), Some("text"));
        assert_eq!(core::get_attribute(password, "type").as_deref(), Some("password"));
    }

    #[test]
    #[traced_test]
    fn test_missing_elements_are_skipped() {
        setup();
        field("password");

        let cleanup = setup_password_toggle("password", "togglePassword");
        cleanup();
        let cleanup = setup_password_toggle("missing", "togglePassword");
        cleanup();
        assert!(logs_contain("password toggle skipped"));
    }
}
