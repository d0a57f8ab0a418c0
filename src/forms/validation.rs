//! Registration form checks.
//!
//! These checks mirror the server's rules so users see problems before a
//! round trip. They are a convenience, never a security boundary: the server
//! re-validates everything.
//!
//! Rule order matches the server: required fields, then password match, then
//! minimum length. Only the first failure is reported.
//!
//! Feedback is inline by default. The offending field is marked with
//! `aria-invalid="true"` and the `field-error` class, and a `.field-feedback`
//! element placed right after it carries the message. The next passing
//! submit removes all of it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{SubmitEvent, field_value, on_submit};
use crate::config::{FeedbackMode, FxConfig, Messages};
use crate::engine::arrays::core::{self, EffectFlags};
use crate::engine::{
    ElementProps, create_element, get_element_by_id, insert_after, query_selector, remove_element,
    select,
};
use crate::error::ValidationError;
use crate::state::window;
use crate::types::Cleanup;

pub const FORM_SELECTOR: &str = ".auth-form";
pub const REGISTER_PATH: &str = "/register";
pub const FEEDBACK_CLASS: &str = "field-feedback";
pub const ERROR_CLASS: &str = "field-error";

// =============================================================================
// Rules
// =============================================================================

/// Values of the registration fields. `None` means the field is not on the
/// page; `Some("")` means it is present but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFields {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegistrationFields {
    /// Read `#username`, `#password` and `#confirm_password`.
    pub fn from_document() -> Self {
        Self {
            username: field_value("username"),
            password: field_value("password"),
            confirm_password: field_value("confirm_password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRules {
    pub require_all_fields: bool,
    pub min_password_len: Option<usize>,
    pub messages: Messages,
}

impl RegistrationRules {
    /// Only the password/confirmation match.
    pub fn mismatch_only() -> Self {
        Self {
            require_all_fields: false,
            min_password_len: None,
            messages: Messages::default(),
        }
    }

    pub fn from_config(config: &FxConfig) -> Self {
        Self {
            require_all_fields: config.validation.require_all_fields,
            min_password_len: config.validation.min_password_len,
            messages: config.messages.clone(),
        }
    }
}

impl Default for RegistrationRules {
    fn default() -> Self {
        Self::from_config(&FxConfig::default())
    }
}

/// Check a registration submission. Absent fields are skipped.
pub fn check_registration(
    fields: &RegistrationFields,
    rules: &RegistrationRules,
) -> Result<(), ValidationError> {
    if rules.require_all_fields {
        let named = [
            ("username", &fields.username),
            ("password", &fields.password),
            ("confirm_password", &fields.confirm_password),
        ];
        if let Some((field, _)) = named
            .iter()
            .find(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        {
            return Err(ValidationError::MissingField {
                field: (*field).to_string(),
                message: rules.messages.missing_field.clone(),
            });
        }
    }

    if let (Some(password), Some(confirm)) = (&fields.password, &fields.confirm_password) {
        if password != confirm {
            return Err(ValidationError::PasswordMismatch {
                message: rules.messages.password_mismatch.clone(),
            });
        }
    }

    if let (Some(min), Some(password)) = (rules.min_password_len, &fields.password) {
        if password.chars().count() < min {
            return Err(ValidationError::PasswordTooShort {
                min,
                message: rules
                    .messages
                    .password_too_short
                    .replace("{min}", &min.to_string()),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Inline feedback
// =============================================================================

/// Mark the failing field and show the message after it.
///
/// Returns the feedback element, or `None` when the field is not on the page.
pub fn show_feedback(error: &ValidationError) -> Option<usize> {
    clear_feedback();
    let Some(field) = get_element_by_id(error.field()) else {
        debug!(field = error.field(), "no field for feedback");
        return None;
    };

    core::set_attribute(field, "aria-invalid", "true");
    core::add_class(field, ERROR_CLASS);

    let feedback = create_element(ElementProps {
        classes: vec![FEEDBACK_CLASS.into()],
        attributes: vec![("role".into(), "alert".into())],
        text: Some(error.to_string()),
        ..ElementProps::tag("div")
    });
    if !insert_after(field, feedback) {
        remove_element(feedback);
        return None;
    }
    Some(feedback)
}

/// Remove every inline feedback element and error marker.
pub fn clear_feedback() {
    for feedback in select(".field-feedback") {
        remove_element(feedback);
    }
    for field in select(".field-error") {
        core::remove_class(field, ERROR_CLASS);
        core::remove_attribute(field, "aria-invalid");
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Submit guard on the registration form.
pub struct RegistrationGuard {
    form: usize,
    last_error: Rc<RefCell<Option<ValidationError>>>,
    detach: Option<Cleanup>,
}

impl RegistrationGuard {
    /// Attach to `.auth-form` when the current path is a registration page.
    pub fn attach(rules: RegistrationRules, mode: FeedbackMode) -> Option<Self> {
        if !window::pathname().contains(REGISTER_PATH) {
            return None;
        }
        let form = match query_selector(FORM_SELECTOR) {
            Ok(Some(form)) => form,
            _ => {
                debug!("no registration form");
                return None;
            }
        };
        if !core::mark_effect(form, EffectFlags::SUBMIT_GUARD) {
            return None;
        }

        let last_error: Rc<RefCell<Option<ValidationError>>> = Rc::new(RefCell::new(None));
        let recorded = last_error.clone();

        let detach = on_submit(form, move |event: &SubmitEvent| {
            let result = check_registration(&RegistrationFields::from_document(), &rules);
            match &result {
                Ok(()) => {
                    if mode == FeedbackMode::Inline {
                        clear_feedback();
                    }
                }
                Err(error) => {
                    warn!(field = error.field(), "registration check failed");
                    event.prevent_with(error.to_string());
                    if mode == FeedbackMode::Inline {
                        show_feedback(error);
                    }
                }
            }
            *recorded.borrow_mut() = result.err();
        });

        Some(Self {
            form,
            last_error,
            detach: Some(Box::new(move || {
                detach();
                core::unmark_effect(form, EffectFlags::SUBMIT_GUARD);
            })),
        })
    }

    pub fn form(&self) -> usize {
        self.form
    }

    /// Failure of the latest submission, if it failed.
    pub fn last_error(&self) -> Option<ValidationError> {
        self.last_error.borrow().clone()
    }

    /// Remove the submit handler. Dropping the guard does the same.
    pub fn detach(self) {}
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{children_of, reset_document};
    use crate::forms::{SubmitOutcome, reset_forms_state, submit};
    use pretty_assertions::assert_eq;

    fn fields(username: &str, password: &str, confirm: &str) -> RegistrationFields {
        RegistrationFields {
            username: Some(username.into()),
            password: Some(password.into()),
            confirm_password: Some(confirm.into()),
        }
    }

    fn register_page(password: &str, confirm: &str) -> (usize, usize, usize) {
        reset_document();
        reset_forms_state();
        window::reset_window_state();
        window::set_pathname("/register");

        let form = create_element(ElementProps {
            classes: vec!["auth-form".into()],
            ..ElementProps::tag("form")
        });
        let input = |id: &str, value: &str| {
            create_element(ElementProps {
                id: Some(id.into()),
                value: Some(value.into()),
                parent: Some(form),
                ..ElementProps::tag("input")
            })
        };
        input("username", "sara");
        let pw = input("password", password);
        let confirm = input("confirm_password", confirm);
        create_element(ElementProps {
            parent: Some(form),
            ..ElementProps::tag("button")
        });
        (form, pw, confirm)
    }

    #[test]
    fn test_rule_order() {
        let rules = RegistrationRules::default();

        let err = check_registration(&fields("", "abc", "xyz"), &rules).unwrap_err();
        assert_eq!(err.field(), "username");

        let err = check_registration(&fields("sara", "abc", "xyz"), &rules).unwrap_err();
        assert!(matches!(err, ValidationError::PasswordMismatch { .. }));

        let err = check_registration(&fields("sara", "abc", "abc"), &rules).unwrap_err();
        assert!(matches!(err, ValidationError::PasswordTooShort { min: 6, .. }));

        assert!(check_registration(&fields("sara", "secret1", "secret1"), &rules).is_ok());
    }

    #[test]
    fn test_mismatch_only_rules() {
        let rules = RegistrationRules::mismatch_only();

        assert!(check_registration(&fields("", "abc", "abc"), &rules).is_ok());
        assert_eq!(
            check_registration(&fields("", "abc", "abd"), &rules)
                .unwrap_err()
                .to_string(),
            "كلمة المرور وتأكيد كلمة المرور غير متطابقين!"
        );
    }

    #[test]
    fn test_absent_fields_skipped() {
        let rules = RegistrationRules::default();
        let partial = RegistrationFields {
            username: Some("sara".into()),
            password: Some("secret1".into()),
            confirm_password: None,
        };
        assert!(check_registration(&partial, &rules).is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let rules = RegistrationRules::default();
        // Six Arabic letters are twelve bytes
        assert!(check_registration(&fields("sara", "كلمةسر", "كلمةسر"), &rules).is_ok());
    }

    #[test]
    fn test_guard_only_on_register_page() {
        register_page("a", "b");
        window::set_pathname("/login");
        assert!(RegistrationGuard::attach(RegistrationRules::default(), FeedbackMode::Inline).is_none());
    }

    #[test]
    fn test_inline_feedback_then_cleared() {
        let (form, pw, confirm) = register_page("secret1", "secret2");
        let guard =
            RegistrationGuard::attach(RegistrationRules::default(), FeedbackMode::Inline).unwrap();

        let outcome = submit(form);
        assert_eq!(
            outcome,
            SubmitOutcome::Prevented {
                message: Some("كلمة المرور وتأكيد كلمة المرور غير متطابقين!".into())
            }
        );
        assert_eq!(core::get_attribute(confirm, "aria-invalid").as_deref(), Some("true"));
        assert!(core::has_class(confirm, ERROR_CLASS));

        let children = children_of(form);
        let position = children.iter().position(|&c| c == confirm).unwrap();
        let feedback = children[position + 1];
        assert!(core::has_class(feedback, FEEDBACK_CLASS));
        assert_eq!(core::get_text(feedback), "كلمة المرور وتأكيد كلمة المرور غير متطابقين!");
        assert!(guard.last_error().is_some());

        // Fix the confirmation and resubmit
        core::set_value(confirm, "secret1");
        assert_eq!(submit(form), SubmitOutcome::Proceed);
        assert!(select(".field-feedback").is_empty());
        assert_eq!(core::get_attribute(confirm, "aria-invalid"), None);
        assert!(!core::has_class(pw, ERROR_CLASS));
        assert_eq!(guard.last_error(), None);

        guard.detach();
        core::set_value(confirm, "other");
        assert_eq!(submit(form), SubmitOutcome::Proceed);
    }

    #[test]
    fn test_blocking_mode_only_reports() {
        let (form, _, confirm) = register_page("secret1", "secret2");
        let _guard =
            RegistrationGuard::attach(RegistrationRules::default(), FeedbackMode::Blocking).unwrap();

        assert!(submit(form).is_prevented());
        assert_eq!(core::get_attribute(confirm, "aria-invalid"), None);
        assert!(select(".field-feedback").is_empty());
    }

    #[test]
    fn test_feedback_replaces_previous() {
        let (form, pw, confirm) = register_page("abc", "xyz");
        let _guard =
            RegistrationGuard::attach(RegistrationRules::default(), FeedbackMode::Inline).unwrap();

        submit(form);
        core::set_value(confirm, "abc");
        submit(form);

        // Now the password is too short
        assert_eq!(select(".field-feedback").len(), 1);
        assert!(core::has_class(pw, ERROR_CLASS));
        assert!(!core::has_class(confirm, ERROR_CLASS));
    }
}
