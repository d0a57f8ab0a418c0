//! Forms - Submit handling, password visibility and registration checks.
//!
//! Submit handlers work like click handlers: registered per form element,
//! run in registration order, and any of them may prevent the submission.
//!
//! ```ignore
//! use invoice_fx::forms::{on_submit, submit, SubmitOutcome};
//!
//! let detach = on_submit(form, |event| {
//!     if field_value("username").is_none() {
//!         event.prevent_with("username required");
//!     }
//! });
//! assert!(matches!(submit(form), SubmitOutcome::Prevented { .. }));
//! ```

pub mod password;
pub mod validation;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::engine::arrays::core;
use crate::engine::{get_element_by_id, on_destroy};

pub use password::{setup_password_toggle, setup_standard_toggles, toggle_input_type, toggle_password};
pub use validation::{RegistrationFields, RegistrationGuard, RegistrationRules, check_registration};

// =============================================================================
// EVENT
// =============================================================================

/// A form submission in flight.
#[derive(Debug)]
pub struct SubmitEvent {
    pub form: usize,
    default_prevented: Cell<bool>,
    message: RefCell<Option<String>>,
}

impl SubmitEvent {
    pub fn new(form: usize) -> Self {
        Self {
            form,
            default_prevented: Cell::new(false),
            message: RefCell::new(None),
        }
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Prevent submission and report why.
    pub fn prevent_with(&self, message: impl Into<String>) {
        self.prevent_default();
        *self.message.borrow_mut() = Some(message.into());
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// What the host should do with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Proceed,
    /// Do not send. `message` is set when a handler explained why.
    Prevented { message: Option<String> },
}

impl SubmitOutcome {
    pub fn is_prevented(&self) -> bool {
        matches!(self, Self::Prevented { .. })
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

pub type SubmitHandler = Rc<dyn Fn(&SubmitEvent)>;

#[derive(Default)]
struct SubmitRegistry {
    handlers: HashMap<usize, Vec<(usize, SubmitHandler)>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<SubmitRegistry> = RefCell::new(SubmitRegistry::default());
}

fn remove_handler(form: usize, id: usize) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        if let Some(list) = reg.handlers.get_mut(&form) {
            list.retain(|(hid, _)| *hid != id);
            if list.is_empty() {
                reg.handlers.remove(&form);
            }
        }
    });
}

/// Register a submit handler on a form. Returns cleanup function.
pub fn on_submit<F>(form: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&SubmitEvent) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.handlers
            .entry(form)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });
    on_destroy(form, move || remove_handler(form, id));

    move || remove_handler(form, id)
}

/// Submit a form: run its handlers and report whether to proceed.
pub fn submit(form: usize) -> SubmitOutcome {
    let handlers: Vec<SubmitHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .handlers
            .get(&form)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });

    let event = SubmitEvent::new(form);
    for handler in handlers {
        handler(&event);
    }
    trace!(form, prevented = event.default_prevented(), "submit");

    if event.default_prevented() {
        SubmitOutcome::Prevented {
            message: event.message.take(),
        }
    } else {
        SubmitOutcome::Proceed
    }
}

/// Current value of the field with this id, if the field exists.
pub fn field_value(id: &str) -> Option<String> {
    get_element_by_id(id).map(core::get_value)
}

/// Clear all submit handlers (for testing)
pub fn reset_forms_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = SubmitRegistry::default());
}
