//! Window Module - Viewport, scroll offset and location
//!
//! The host mirrors its window into these signals; effects read them and
//! register scroll/resize listeners.
//!
//! # API
//!
//! - `viewport_width`, `viewport_height` - Viewport size in CSS pixels
//! - `scroll_x`, `scroll_y` - Current scroll offset
//! - `pathname` - Location path (`/register`, `/invoices/42`, ...)
//! - `scroll_to(y)` - Scroll vertically, clamped to the document
//! - `scroll_into_view(index, behavior)` - Bring an element to the top
//! - `on_scroll(fn)`, `on_resize(fn)` - Listeners returning cleanup

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::trace;

use crate::engine::arrays::geometry;
use crate::engine::get_allocated_indices;
use crate::types::Rect;

/// Scroll animation requested by `scroll_into_view`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

// =============================================================================
// STATE
// =============================================================================

const DEFAULT_WIDTH: f32 = 1280.0;
const DEFAULT_HEIGHT: f32 = 800.0;

thread_local! {
    static VIEWPORT_WIDTH: Signal<f32> = signal(DEFAULT_WIDTH);
    static VIEWPORT_HEIGHT: Signal<f32> = signal(DEFAULT_HEIGHT);
    static SCROLL_X: Signal<f32> = signal(0.0);
    static SCROLL_Y: Signal<f32> = signal(0.0);
    static PATHNAME: Signal<String> = signal(String::from("/"));
    /// Explicit document height. `None` derives it from element geometry.
    static DOCUMENT_HEIGHT: Signal<Option<f32>> = signal(None);
    static LAST_SCROLL_BEHAVIOR: Signal<Option<ScrollBehavior>> = signal(None);

    static LISTENERS: RefCell<Listeners> = RefCell::new(Listeners::default());
}

type Listener = Rc<dyn Fn()>;

#[derive(Default)]
struct Listeners {
    scroll: Vec<(usize, Listener)>,
    resize: Vec<(usize, Listener)>,
    next_id: usize,
}

pub fn viewport_width() -> f32 {
    VIEWPORT_WIDTH.with(|s| s.get())
}

pub fn viewport_height() -> f32 {
    VIEWPORT_HEIGHT.with(|s| s.get())
}

pub fn scroll_x() -> f32 {
    SCROLL_X.with(|s| s.get())
}

pub fn scroll_y() -> f32 {
    SCROLL_Y.with(|s| s.get())
}

pub fn pathname() -> String {
    PATHNAME.with(|s| s.get())
}

pub fn set_pathname(path: &str) {
    PATHNAME.with(|s| s.set(path.to_string()));
}

/// Behaviour of the most recent `scroll_into_view`.
pub fn last_scroll_behavior() -> Option<ScrollBehavior> {
    LAST_SCROLL_BEHAVIOR.with(|s| s.get())
}

/// The viewport in client coordinates.
pub fn viewport_rect() -> Rect {
    Rect::new(0.0, 0.0, viewport_width(), viewport_height())
}

/// Bounding rectangle of an element relative to the viewport.
pub fn client_rect(index: usize) -> Rect {
    geometry::client_rect(index, scroll_x(), scroll_y())
}

pub fn set_document_height(height: Option<f32>) {
    DOCUMENT_HEIGHT.with(|s| s.set(height));
}

/// Scrollable height: explicit, or the lowest element edge.
pub fn document_height() -> f32 {
    if let Some(height) = DOCUMENT_HEIGHT.with(|s| s.get()) {
        return height;
    }
    get_allocated_indices()
        .into_iter()
        .map(|i| geometry::get_rect(i).bottom())
        .fold(0.0, f32::max)
}

pub fn max_scroll_y() -> f32 {
    (document_height() - viewport_height()).max(0.0)
}

// =============================================================================
// MUTATION
// =============================================================================

/// Scroll vertically. Clamps to `0..=max_scroll_y()`; listeners fire only when
/// the offset actually changes.
pub fn scroll_to(y: f32) {
    let y = y.clamp(0.0, max_scroll_y());
    let changed = SCROLL_Y.with(|s| {
        if s.get() == y {
            false
        } else {
            s.set(y);
            true
        }
    });
    if changed {
        trace!(y, "scroll");
        emit(|l| &l.scroll);
    }
}

pub fn scroll_by(dy: f32) {
    scroll_to(scroll_y() + dy);
}

/// Resize the viewport and notify resize listeners.
pub fn set_viewport(width: f32, height: f32) {
    VIEWPORT_WIDTH.with(|s| s.set(width.max(0.0)));
    VIEWPORT_HEIGHT.with(|s| s.set(height.max(0.0)));
    emit(|l| &l.resize);
    // A taller viewport can shrink the scroll range.
    let max = max_scroll_y();
    if scroll_y() > max {
        scroll_to(max);
    }
}

/// Scroll so the element's top edge sits at the top of the viewport.
pub fn scroll_into_view(index: usize, behavior: ScrollBehavior) {
    LAST_SCROLL_BEHAVIOR.with(|s| s.set(Some(behavior)));
    scroll_to(geometry::get_rect(index).y);
}

// =============================================================================
// LISTENERS
// =============================================================================

fn emit(select: impl Fn(&Listeners) -> &Vec<(usize, Listener)>) {
    // Snapshot first: listeners may register or remove listeners.
    let listeners: Vec<Listener> = LISTENERS.with(|l| {
        select(&l.borrow()).iter().map(|(_, f)| f.clone()).collect()
    });
    for listener in listeners {
        listener();
    }
}

/// Register a scroll listener. Returns cleanup function.
pub fn on_scroll<F>(listener: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = LISTENERS.with(|l| {
        let mut l = l.borrow_mut();
        let id = l.next_id;
        l.next_id += 1;
        l.scroll.push((id, Rc::new(listener)));
        id
    });

    move || {
        LISTENERS.with(|l| l.borrow_mut().scroll.retain(|(lid, _)| *lid != id));
    }
}

/// Register a resize listener. Returns cleanup function.
pub fn on_resize<F>(listener: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = LISTENERS.with(|l| {
        let mut l = l.borrow_mut();
        let id = l.next_id;
        l.next_id += 1;
        l.resize.push((id, Rc::new(listener)));
        id
    });

    move || {
        LISTENERS.with(|l| l.borrow_mut().resize.retain(|(lid, _)| *lid != id));
    }
}

/// Reset window state (for testing)
pub fn reset_window_state() {
    VIEWPORT_WIDTH.with(|s| s.set(DEFAULT_WIDTH));
    VIEWPORT_HEIGHT.with(|s| s.set(DEFAULT_HEIGHT));
    SCROLL_X.with(|s| s.set(0.0));
    SCROLL_Y.with(|s| s.set(0.0));
    PATHNAME.with(|s| s.set(String::from("/")));
    DOCUMENT_HEIGHT.with(|s| s.set(None));
    LAST_SCROLL_BEHAVIOR.with(|s| s.set(None));
    LISTENERS.with(|l| *l.borrow_mut() = Listeners::default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() {
        reset_window_state();
    }

    #[test]
    fn test_scroll_clamps_to_document() {
        setup();
        set_document_height(Some(2000.0));

        scroll_to(5000.0);
        assert_eq!(scroll_y(), 1200.0);
        scroll_to(-10.0);
        assert_eq!(scroll_y(), 0.0);
    }

    #[test]
    fn test_scroll_listener_fires_on_change_only() {
        setup();
        set_document_height(Some(3000.0));

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cleanup = on_scroll(move || c.set(c.get() + 1));

        scroll_to(100.0);
        scroll_to(100.0);
        assert_eq!(count.get(), 1);

        cleanup();
        scroll_to(200.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_resize_shrinks_scroll() {
        setup();
        set_document_height(Some(1000.0));
        scroll_to(200.0);

        let resized = Rc::new(Cell::new(false));
        let r = resized.clone();
        let _cleanup = on_resize(move || r.set(true));

        set_viewport(1280.0, 900.0);
        assert!(resized.get());
        assert_eq!(scroll_y(), 100.0);
    }

    #[test]
    fn test_listener_can_unregister_itself() {
        setup();
        set_document_height(Some(3000.0));

        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let cleanup = on_scroll(move || {
            if let Some(cleanup) = s.borrow_mut().take() {
                cleanup();
            }
        });
        *slot.borrow_mut() = Some(Box::new(cleanup));

        scroll_to(10.0);
        scroll_to(20.0);
        assert!(slot.borrow().is_none());
    }
}
