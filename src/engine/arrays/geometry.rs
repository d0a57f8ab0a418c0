//! Geometry Arrays
//!
//! Document-space bounding rectangle per element. The host writes these after
//! its own layout pass; effects read them to hit-test pointers, size ripples
//! and compute viewport intersection.

use super::{Column, clear, read, write};
use crate::types::Rect;

thread_local! {
    static RECT: Column<Rect> = Column::new(Vec::new());
}

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    write(&RECT, index, |_| ());
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    clear(&RECT, index);
}

/// Reset all arrays.
pub fn reset() {
    RECT.with(|arr| arr.borrow_mut().clear());
}

/// Bounding rectangle in document coordinates.
pub fn get_rect(index: usize) -> Rect {
    read(&RECT, index)
}

pub fn set_rect(index: usize, rect: Rect) {
    write(&RECT, index, |r| *r = rect);
}

/// Bounding rectangle relative to the viewport (`getBoundingClientRect`).
pub fn client_rect(index: usize, scroll_x: f32, scroll_y: f32) -> Rect {
    get_rect(index).offset_by(scroll_x, scroll_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rect_follows_scroll() {
        reset();

        set_rect(0, Rect::new(10.0, 500.0, 100.0, 50.0));
        assert_eq!(client_rect(0, 0.0, 200.0), Rect::new(10.0, 300.0, 100.0, 50.0));
        assert_eq!(get_rect(9), Rect::default());
    }
}
