//! Core Arrays
//!
//! The most fundamental element arrays:
//! - tag: Element tag name (`button`, `div`, `input`, ...)
//! - parent / children: Tree links, children in insertion order
//! - element id, class list, attributes
//! - text content and form field value
//! - effect flags: which effects are attached (prevents double wiring)

use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{Column, clear, inspect, read, write};

bitflags! {
    /// Effects attached to an element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EffectFlags: u16 {
        const RIPPLE = 1 << 0;
        const PASSWORD_TOGGLE = 1 << 1;
        const PULSE = 1 << 2;
        const SUBMIT_GUARD = 1 << 3;
        const SMOOTH_ANCHOR = 1 << 4;
        const THEME_BOUNCE = 1 << 5;
    }
}

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    static TAG: Column<String> = Column::new(Vec::new());
    static PARENT_INDEX: Column<Option<usize>> = Column::new(Vec::new());
    static CHILDREN: Column<Vec<usize>> = Column::new(Vec::new());
    static ELEMENT_ID: Column<String> = Column::new(Vec::new());
    static CLASSES: Column<Vec<String>> = Column::new(Vec::new());
    static ATTRIBUTES: Column<BTreeMap<String, String>> = Column::new(Vec::new());
    static TEXT: Column<String> = Column::new(Vec::new());
    static VALUE: Column<String> = Column::new(Vec::new());
    static EFFECTS: Column<EffectFlags> = Column::new(Vec::new());
    /// Marker classes of the reveal controllers that own the element.
    static REVEAL_CLAIMS: Column<Vec<String>> = Column::new(Vec::new());
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    write(&TAG, index, |_| ());
    write(&PARENT_INDEX, index, |_| ());
    write(&CHILDREN, index, |_| ());
    write(&ELEMENT_ID, index, |_| ());
    write(&CLASSES, index, |_| ());
    write(&ATTRIBUTES, index, |_| ());
    write(&TEXT, index, |_| ());
    write(&VALUE, index, |_| ());
    write(&EFFECTS, index, |_| ());
    write(&REVEAL_CLAIMS, index, |_| ());
}

/// Clear values at index (called when releasing).
pub fn clear_at_index(index: usize) {
    clear(&TAG, index);
    clear(&PARENT_INDEX, index);
    clear(&CHILDREN, index);
    clear(&ELEMENT_ID, index);
    clear(&CLASSES, index);
    clear(&ATTRIBUTES, index);
    clear(&TEXT, index);
    clear(&VALUE, index);
    clear(&EFFECTS, index);
    clear(&REVEAL_CLAIMS, index);
}

/// Reset all arrays.
pub fn reset() {
    TAG.with(|arr| arr.borrow_mut().clear());
    PARENT_INDEX.with(|arr| arr.borrow_mut().clear());
    CHILDREN.with(|arr| arr.borrow_mut().clear());
    ELEMENT_ID.with(|arr| arr.borrow_mut().clear());
    CLASSES.with(|arr| arr.borrow_mut().clear());
    ATTRIBUTES.with(|arr| arr.borrow_mut().clear());
    TEXT.with(|arr| arr.borrow_mut().clear());
    VALUE.with(|arr| arr.borrow_mut().clear());
    EFFECTS.with(|arr| arr.borrow_mut().clear());
    REVEAL_CLAIMS.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Tag
// =============================================================================

/// Get tag name at index (lowercase).
pub fn get_tag(index: usize) -> String {
    read(&TAG, index)
}

pub fn set_tag(index: usize, tag: &str) {
    write(&TAG, index, |t| *t = tag.to_ascii_lowercase());
}

// =============================================================================
// Tree links
// =============================================================================

pub fn get_parent_index(index: usize) -> Option<usize> {
    read(&PARENT_INDEX, index)
}

pub fn set_parent_index(index: usize, parent: Option<usize>) {
    write(&PARENT_INDEX, index, |p| *p = parent);
}

/// Children in insertion order.
pub fn get_children(index: usize) -> Vec<usize> {
    read(&CHILDREN, index)
}

pub fn push_child(parent: usize, child: usize) {
    write(&CHILDREN, parent, |c| {
        if !c.contains(&child) {
            c.push(child);
        }
    });
}

/// Insert `child` right after `reference` (at the end if `reference` is not
/// a child of `parent`).
pub fn insert_child_after(parent: usize, reference: usize, child: usize) {
    write(&CHILDREN, parent, |c| {
        c.retain(|&i| i != child);
        match c.iter().position(|&i| i == reference) {
            Some(pos) => c.insert(pos + 1, child),
            None => c.push(child),
        }
    });
}

pub fn remove_child(parent: usize, child: usize) {
    write(&CHILDREN, parent, |c| c.retain(|&i| i != child));
}

/// Ancestors from the direct parent up to the root.
pub fn ancestors(index: usize) -> Vec<usize> {
    let mut chain = Vec::new();
    let mut current = get_parent_index(index);
    while let Some(parent) = current {
        if chain.contains(&parent) {
            break;
        }
        chain.push(parent);
        current = get_parent_index(parent);
    }
    chain
}

// =============================================================================
// Element id
// =============================================================================

pub fn get_element_id(index: usize) -> String {
    read(&ELEMENT_ID, index)
}

pub fn set_element_id(index: usize, id: &str) {
    write(&ELEMENT_ID, index, |i| *i = id.to_string());
}

// =============================================================================
// Class list
// =============================================================================

/// Class list in insertion order.
pub fn get_classes(index: usize) -> Vec<String> {
    read(&CLASSES, index)
}

pub fn has_class(index: usize, class: &str) -> bool {
    inspect(&CLASSES, index, |c| c.is_some_and(|c| c.iter().any(|x| x == class)))
}

/// Add a class. Returns false if it was already present.
pub fn add_class(index: usize, class: &str) -> bool {
    write(&CLASSES, index, |c| {
        if c.iter().any(|x| x == class) {
            false
        } else {
            c.push(class.to_string());
            true
        }
    })
}

/// Remove a class. Returns false if it was not present.
pub fn remove_class(index: usize, class: &str) -> bool {
    write(&CLASSES, index, |c| {
        let before = c.len();
        c.retain(|x| x != class);
        c.len() != before
    })
}

/// Toggle a class. Returns whether the class is present afterwards.
pub fn toggle_class(index: usize, class: &str) -> bool {
    if remove_class(index, class) {
        false
    } else {
        add_class(index, class);
        true
    }
}

// =============================================================================
// Attributes
// =============================================================================

pub fn get_attribute(index: usize, name: &str) -> Option<String> {
    inspect(&ATTRIBUTES, index, |a| a.and_then(|a| a.get(name).cloned()))
}

pub fn set_attribute(index: usize, name: &str, value: &str) {
    write(&ATTRIBUTES, index, |a| {
        a.insert(name.to_ascii_lowercase(), value.to_string());
    });
}

pub fn remove_attribute(index: usize, name: &str) -> bool {
    write(&ATTRIBUTES, index, |a| a.remove(name).is_some())
}

// =============================================================================
// Text and value
// =============================================================================

pub fn get_text(index: usize) -> String {
    read(&TEXT, index)
}

pub fn set_text(index: usize, text: &str) {
    write(&TEXT, index, |t| *t = text.to_string());
}

/// Current value of a form field.
pub fn get_value(index: usize) -> String {
    read(&VALUE, index)
}

pub fn set_value(index: usize, value: &str) {
    write(&VALUE, index, |v| *v = value.to_string());
}

// =============================================================================
// Effect flags
// =============================================================================

pub fn get_effects(index: usize) -> EffectFlags {
    read(&EFFECTS, index)
}

/// Mark an effect as attached. Returns false if it already was.
pub fn mark_effect(index: usize, effect: EffectFlags) -> bool {
    write(&EFFECTS, index, |f| {
        if f.contains(effect) {
            false
        } else {
            f.insert(effect);
            true
        }
    })
}

pub fn unmark_effect(index: usize, effect: EffectFlags) {
    write(&EFFECTS, index, |f| f.remove(effect));
}

// =============================================================================
// Reveal claims
// =============================================================================

/// Claim an element for the reveal keyed by `marker`. Returns false if that
/// reveal already owns it. Reveals with different markers coexist.
pub fn claim_reveal(index: usize, marker: &str) -> bool {
    write(&REVEAL_CLAIMS, index, |claims| {
        if claims.iter().any(|m| m == marker) {
            false
        } else {
            claims.push(marker.to_string());
            true
        }
    })
}

pub fn release_reveal(index: usize, marker: &str) {
    write(&REVEAL_CLAIMS, index, |claims| claims.retain(|m| m != marker));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        reset();
    }

    #[test]
    fn test_class_list_operations() {
        setup();

        assert!(add_class(0, "card"));
        assert!(!add_class(0, "card"));
        assert!(add_class(0, "fade-in"));
        assert_eq!(get_classes(0), vec!["card", "fade-in"]);

        assert!(!toggle_class(0, "card"));
        assert!(!has_class(0, "card"));
        assert!(toggle_class(0, "card"));
        assert!(has_class(0, "card"));

        assert!(remove_class(0, "fade-in"));
        assert!(!remove_class(0, "fade-in"));
    }

    #[test]
    fn test_attributes() {
        setup();

        set_attribute(3, "type", "password");
        assert_eq!(get_attribute(3, "type").as_deref(), Some("password"));
        assert_eq!(get_attribute(3, "href"), None);
        assert!(remove_attribute(3, "type"));
        assert_eq!(get_attribute(3, "type"), None);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        setup();

        push_child(0, 2);
        push_child(0, 1);
        push_child(0, 2);
        assert_eq!(get_children(0), vec![2, 1]);

        remove_child(0, 2);
        assert_eq!(get_children(0), vec![1]);
    }

    #[test]
    fn test_ancestors() {
        setup();

        set_parent_index(2, Some(1));
        set_parent_index(1, Some(0));
        assert_eq!(ancestors(2), vec![1, 0]);
        assert!(ancestors(0).is_empty());
    }

    #[test]
    fn test_effect_flags() {
        setup();

        assert!(mark_effect(4, EffectFlags::RIPPLE));
        assert!(!mark_effect(4, EffectFlags::RIPPLE));
        assert!(mark_effect(4, EffectFlags::PULSE));
        assert_eq!(get_effects(4), EffectFlags::RIPPLE | EffectFlags::PULSE);

        unmark_effect(4, EffectFlags::RIPPLE);
        assert_eq!(get_effects(4), EffectFlags::PULSE);
    }

    #[test]
    fn test_reveal_claims_per_marker() {
        setup();

        assert!(claim_reveal(2, "animate-in"));
        assert!(!claim_reveal(2, "animate-in"));
        assert!(claim_reveal(2, "visible"));

        release_reveal(2, "animate-in");
        assert!(claim_reveal(2, "animate-in"));
        clear_at_index(2);
        assert!(claim_reveal(2, "visible"));
    }
}
