//! Element creation and tree access.
//!
//! The element tree is what page scripts query and style. Hosts build it
//! from their markup (or tests build it by hand) with [`create_element`]:
//!
//! ```ignore
//! use invoice_fx::engine::{create_element, ElementProps};
//!
//! let body = create_element(ElementProps::tag("body"));
//! let card = create_element(ElementProps {
//!     classes: vec!["invoice-card".into()],
//!     rect: Rect::new(0.0, 900.0, 300.0, 200.0),
//!     parent: Some(body),
//!     ..ElementProps::tag("div")
//! });
//! ```

use crate::types::Rect;

use super::arrays::{core, geometry};
use super::registry;

/// Properties of a new element.
#[derive(Debug, Clone, Default)]
pub struct ElementProps {
    pub tag: String,
    /// The `id` attribute.
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    /// Form field value.
    pub value: Option<String>,
    pub rect: Rect,
    /// Parent element. Falls back to the registry's parent context.
    pub parent: Option<usize>,
}

impl ElementProps {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }
}

/// Create an element and append it to its parent.
pub fn create_element(props: ElementProps) -> usize {
    let index = registry::allocate_index(None);

    core::set_tag(index, &props.tag);
    if let Some(id) = &props.id {
        core::set_element_id(index, id);
        core::set_attribute(index, "id", id);
    }
    for class in &props.classes {
        core::add_class(index, class);
    }
    for (name, value) in &props.attributes {
        core::set_attribute(index, name, value);
    }
    if let Some(text) = &props.text {
        core::set_text(index, text);
    }
    if let Some(value) = &props.value {
        core::set_value(index, value);
    }
    geometry::set_rect(index, props.rect);

    if let Some(parent) = props.parent.or_else(registry::get_current_parent_index) {
        append_child(parent, index);
    }

    index
}

/// Append `child` to `parent`, detaching it from any previous parent.
pub fn append_child(parent: usize, child: usize) {
    if let Some(previous) = core::get_parent_index(child) {
        core::remove_child(previous, child);
    }
    core::set_parent_index(child, Some(parent));
    core::push_child(parent, child);
}

/// Move `child` to directly follow `reference` under the same parent.
///
/// Returns false when `reference` is a root.
pub fn insert_after(reference: usize, child: usize) -> bool {
    let Some(parent) = core::get_parent_index(reference) else {
        return false;
    };
    if let Some(previous) = core::get_parent_index(child) {
        core::remove_child(previous, child);
    }
    core::set_parent_index(child, Some(parent));
    core::insert_child_after(parent, reference, child);
    true
}

/// Remove an element and its subtree.
pub fn remove_element(index: usize) {
    registry::release_index(index);
}

pub fn children_of(index: usize) -> Vec<usize> {
    core::get_children(index)
}

/// Position among the parent's children (0 for roots).
pub fn sibling_index(index: usize) -> usize {
    core::get_parent_index(index)
        .and_then(|parent| core::get_children(parent).iter().position(|&c| c == index))
        .unwrap_or(0)
}

/// Root elements in allocation order.
pub fn roots() -> Vec<usize> {
    registry::get_allocated_indices()
        .into_iter()
        .filter(|&i| core::get_parent_index(i).is_none())
        .collect()
}

/// All elements in document (pre-)order.
pub fn document_order() -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack: Vec<usize> = roots().into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        out.push(index);
        for child in core::get_children(index).into_iter().rev() {
            stack.push(child);
        }
    }
    out
}

/// First element in document order whose `id` matches (`getElementById`).
pub fn get_element_by_id(id: &str) -> Option<usize> {
    if id.is_empty() {
        return None;
    }
    document_order()
        .into_iter()
        .find(|&i| core::get_element_id(i) == id)
}

fn first_with_tag(tag: &str) -> Option<usize> {
    document_order()
        .into_iter()
        .find(|&i| core::get_tag(i) == tag)
}

/// The `<head>` element, if the document has one.
pub fn head() -> Option<usize> {
    first_with_tag("head")
}

/// The `<body>` element, if the document has one.
pub fn body() -> Option<usize> {
    first_with_tag("body")
}

/// Drop every element (page teardown).
pub fn reset_document() {
    registry::reset_registry();
}
