//! Element Parallel Arrays
//!
//! All element state lives in these parallel arrays.
//! Each array index corresponds to one element.
//!
//! Effects write through the typed setters in each category; hosts read the
//! same arrays to mirror state into their own tree.
//!
//! # Array Categories
//!
//! - **core**: Tag, tree links, id, classes, attributes, text, form value
//! - **style**: Inline style (what an effect has applied)
//! - **geometry**: Document-space bounding rectangle

pub mod core;
pub mod geometry;
pub mod style;

use std::cell::RefCell;
use std::thread::LocalKey;

/// A thread-local column of per-element values.
pub(crate) type Column<T> = RefCell<Vec<T>>;

/// Read a slot (default if never written).
pub(crate) fn read<T: Clone + Default + 'static>(
    column: &'static LocalKey<Column<T>>,
    index: usize,
) -> T {
    column.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

/// Borrow a slot without cloning.
pub(crate) fn inspect<T: Default + 'static, R>(
    column: &'static LocalKey<Column<T>>,
    index: usize,
    f: impl FnOnce(Option<&T>) -> R,
) -> R {
    column.with(|arr| f(arr.borrow().get(index)))
}

/// Mutate a slot in place, growing the column as needed.
pub(crate) fn write<T: Default + 'static, R>(
    column: &'static LocalKey<Column<T>>,
    index: usize,
    f: impl FnOnce(&mut T) -> R,
) -> R {
    column.with(|arr| {
        let mut arr = arr.borrow_mut();
        if arr.len() <= index {
            arr.resize_with(index + 1, T::default);
        }
        f(&mut arr[index])
    })
}

/// Reset a slot to its default.
pub(crate) fn clear<T: Default + 'static>(column: &'static LocalKey<Column<T>>, index: usize) {
    column.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = T::default();
        }
    });
}

/// Ensure all arrays have capacity for the given index.
///
/// Called by registry when allocating.
pub fn ensure_all_capacity(index: usize) {
    core::ensure_capacity(index);
    style::ensure_capacity(index);
    geometry::ensure_capacity(index);
}

/// Clear all array values at an index.
///
/// Called by registry when releasing.
pub fn clear_all_at_index(index: usize) {
    core::clear_at_index(index);
    style::clear_at_index(index);
    geometry::clear_at_index(index);
}

/// Reset all parallel arrays to release memory.
///
/// Called automatically when the last element is released.
pub fn reset_all_arrays() {
    core::reset();
    style::reset();
    geometry::reset();
}
