//! Element engine - registry, parallel arrays, tree and queries.
//!
//! The engine manages the core data structures:
//! - Registry: Index allocation, ID mapping, parent context
//! - Arrays: Parallel columns for element state
//! - Element: Creation and tree access
//! - Query: Selector matching in document order
//!
//! # Architecture
//!
//! Elements are NOT objects. They are indices into parallel arrays:
//!
//! ```text
//! Index 0: body   (parent=None, classes=[],               style={})
//! Index 1: div    (parent=0,    classes=[invoice-card],   style={opacity: 0})
//! Index 2: button (parent=0,    classes=[search-button],  style={position: relative})
//! ```
//!
//! Effects hold indices, never references, so a host can rebuild or mirror
//! the tree without invalidating anything an effect retains.

mod registry;
pub mod arrays;
pub mod element;
pub mod query;

pub use registry::*;
pub use element::{
    ElementProps, append_child, body, children_of, create_element, document_order,
    get_element_by_id, head, insert_after, remove_element, reset_document, roots, sibling_index,
};
pub use query::{Selector, query_selector, query_selector_all, query_selector_within, select};
