//! Mouse Module - Pointer event state and handler registry
//!
//! Hit testing against element geometry, hover tracking with
//! mouseenter/mouseleave semantics, and click bubbling.
//!
//! # API
//!
//! - `pointer_x`, `pointer_y` - Last pointer position (client coordinates)
//! - `hovered_element` - Deepest element under the pointer
//! - `dispatch(event)` - Dispatch a pointer event
//! - `on_element(index, handlers)` - Per-element handlers
//! - `on_mouse_move(fn)` - Global move handler
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use invoice_fx::state::mouse::{self, PointerHandlers};
//!
//! let cleanup = mouse::on_element(button, PointerHandlers {
//!     on_click: Some(Rc::new(|event| {
//!         println!("clicked at ({}, {})", event.client_x, event.client_y);
//!     })),
//!     ..Default::default()
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use super::window;
use crate::engine::arrays::{core, geometry, style};
use crate::engine::{document_order, on_destroy};
use crate::types::{Point, PointerEvents};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Click,
    /// Pointer left the window.
    Leave,
}

/// Pointer event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Position relative to the viewport
    pub client_x: f32,
    pub client_y: f32,
    /// Deepest element under the pointer (filled by dispatch)
    pub target: Option<usize>,
    /// Element whose handler is running (set while bubbling)
    pub current_target: Option<usize>,
    default_prevented: Cell<bool>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, client_x: f32, client_y: f32) -> Self {
        Self {
            kind,
            client_x,
            client_y,
            target: None,
            current_target: None,
            default_prevented: Cell::new(false),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn click(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Click, x, y)
    }

    pub fn leave() -> Self {
        Self::new(PointerKind::Leave, -1.0, -1.0)
    }

    pub fn client_point(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }

    /// Position in document coordinates.
    pub fn page_point(&self) -> Point {
        Point::new(
            self.client_x + window::scroll_x(),
            self.client_y + window::scroll_y(),
        )
    }

    /// Suppress the host's default action (navigation, form submit).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Handler for pointer events.
pub type PointerHandler = Rc<dyn Fn(&PointerEvent)>;

/// Handlers for an element. Several sets may be attached to one element.
#[derive(Default, Clone)]
pub struct PointerHandlers {
    pub on_click: Option<PointerHandler>,
    pub on_mouse_enter: Option<PointerHandler>,
    pub on_mouse_leave: Option<PointerHandler>,
}

// =============================================================================
// REACTIVE STATE
// =============================================================================

thread_local! {
    static POINTER_X: Signal<f32> = signal(0.0);
    static POINTER_Y: Signal<f32> = signal(0.0);
    static HOVERED_ELEMENT: Signal<Option<usize>> = signal(None);
    /// Hovered element and its ancestors, deepest first.
    static HOVER_CHAIN: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

pub fn pointer_x() -> f32 {
    POINTER_X.with(|s| s.get())
}

pub fn pointer_y() -> f32 {
    POINTER_Y.with(|s| s.get())
}

pub fn hovered_element() -> Option<usize> {
    HOVERED_ELEMENT.with(|s| s.get())
}

/// Whether the element is the hovered element or one of its ancestors.
pub fn is_hovered(index: usize) -> bool {
    HOVER_CHAIN.with(|c| c.borrow().contains(&index))
}

// =============================================================================
// HIT TESTING
// =============================================================================

/// Deepest element containing the document-space point.
///
/// Later elements in document order paint on top, so the last hit wins.
/// Empty rectangles and `pointer-events: none` never hit.
pub fn hit_test(point: Point) -> Option<usize> {
    document_order()
        .into_iter()
        .filter(|&i| {
            let rect = geometry::get_rect(i);
            rect.area() > 0.0
                && rect.contains(point)
                && style::get_style(i).pointer_events != Some(PointerEvents::None)
        })
        .last()
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    element_handlers: HashMap<usize, Vec<(usize, PointerHandlers)>>,
    global_move_handlers: Vec<(usize, PointerHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn handlers_for(&self, index: usize) -> Vec<PointerHandlers> {
        self.element_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::default());
}

fn remove_element_handler(index: usize, id: usize) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        if let Some(list) = reg.element_handlers.get_mut(&index) {
            list.retain(|(hid, _)| *hid != id);
            if list.is_empty() {
                reg.element_handlers.remove(&index);
            }
        }
    });
}

/// Register handlers for an element. Returns cleanup function.
///
/// Handlers are also dropped when the element is removed.
pub fn on_element(index: usize, handlers: PointerHandlers) -> impl FnOnce() {
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.element_handlers
            .entry(index)
            .or_default()
            .push((id, handlers));
        id
    });
    on_destroy(index, move || remove_element_handler(index, id));

    move || remove_element_handler(index, id)
}

/// Register a global pointer move handler. Returns cleanup function.
pub fn on_mouse_move<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&PointerEvent) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_move_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .global_move_handlers
                .retain(|(hid, _)| *hid != id);
        });
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a pointer event.
///
/// Returns true if a handler prevented the default action.
pub fn dispatch(mut event: PointerEvent) -> bool {
    if event.kind == PointerKind::Leave {
        update_hover(None, &event);
        return false;
    }

    POINTER_X.with(|s| s.set(event.client_x));
    POINTER_Y.with(|s| s.set(event.client_y));

    event.target = hit_test(event.page_point());
    update_hover(event.target, &event);

    match event.kind {
        PointerKind::Move => {
            let handlers: Vec<PointerHandler> = REGISTRY.with(|reg| {
                reg.borrow()
                    .global_move_handlers
                    .iter()
                    .map(|(_, h)| h.clone())
                    .collect()
            });
            for handler in handlers {
                handler(&event);
            }
        }
        PointerKind::Click => dispatch_click(&mut event),
        PointerKind::Leave => {}
    }

    event.default_prevented()
}

/// Bubble from the target to the root.
fn dispatch_click(event: &mut PointerEvent) {
    let Some(target) = event.target else { return };

    let mut path = vec![target];
    path.extend(core::ancestors(target));

    for index in path {
        let handlers = REGISTRY.with(|reg| reg.borrow().handlers_for(index));
        event.current_target = Some(index);
        for on_click in handlers.into_iter().filter_map(|h| h.on_click) {
            on_click(event);
        }
    }
    event.current_target = None;
}

/// Fire leave (deepest first) on elements no longer under the pointer, then
/// enter (outermost first) on newly entered ones.
fn update_hover(target: Option<usize>, event: &PointerEvent) {
    let new_chain: Vec<usize> = match target {
        Some(t) => std::iter::once(t).chain(core::ancestors(t)).collect(),
        None => Vec::new(),
    };
    let old_chain = HOVER_CHAIN.with(|c| c.replace(new_chain.clone()));
    if old_chain == new_chain {
        return;
    }

    for &index in old_chain.iter().filter(|i| !new_chain.contains(i)) {
        let mut leave = event.clone();
        leave.current_target = Some(index);
        let handlers = REGISTRY.with(|reg| reg.borrow().handlers_for(index));
        for on_leave in handlers.into_iter().filter_map(|h| h.on_mouse_leave) {
            on_leave(&leave);
        }
    }

    for &index in new_chain.iter().rev().filter(|i| !old_chain.contains(i)) {
        let mut enter = event.clone();
        enter.current_target = Some(index);
        let handlers = REGISTRY.with(|reg| reg.borrow().handlers_for(index));
        for on_enter in handlers.into_iter().filter_map(|h| h.on_mouse_enter) {
            on_enter(&enter);
        }
    }

    HOVERED_ELEMENT.with(|s| s.set(target));
}

// =============================================================================
// CLEANUP
// =============================================================================

/// Clear all state and handlers.
pub fn reset_mouse_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::default());
    HOVER_CHAIN.with(|c| c.borrow_mut().clear());
    POINTER_X.with(|s| s.set(0.0));
    POINTER_Y.with(|s| s.set(0.0));
    HOVERED_ELEMENT.with(|s| s.set(None));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementProps, create_element, remove_element, reset_document};
    use crate::types::Rect;

    fn setup() {
        reset_document();
        reset_mouse_state();
        window::reset_window_state();
    }

    fn boxed(tag: &str, rect: Rect, parent: Option<usize>) -> usize {
        create_element(ElementProps {
            rect,
            parent,
            ..ElementProps::tag(tag)
        })
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn logging(log: &Log, name: &str) -> PointerHandlers {
        let (enter, leave, click) = (log.clone(), log.clone(), log.clone());
        let (n1, n2, n3) = (name.to_string(), name.to_string(), name.to_string());
        PointerHandlers {
            on_mouse_enter: Some(Rc::new(move |_| enter.borrow_mut().push(format!("enter {n1}")))),
            on_mouse_leave: Some(Rc::new(move |_| leave.borrow_mut().push(format!("leave {n2}")))),
            on_click: Some(Rc::new(move |_| click.borrow_mut().push(format!("click {n3}")))),
        }
    }

    #[test]
    fn test_hit_test_picks_deepest() {
        setup();

        let card = boxed("div", Rect::new(0.0, 0.0, 200.0, 200.0), None);
        let button = boxed("button", Rect::new(10.0, 10.0, 50.0, 20.0), Some(card));

        assert_eq!(hit_test(Point::new(20.0, 20.0)), Some(button));
        assert_eq!(hit_test(Point::new(150.0, 150.0)), Some(card));
        assert_eq!(hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_pointer_events_none_is_transparent() {
        setup();

        let button = boxed("button", Rect::new(0.0, 0.0, 100.0, 40.0), None);
        let ripple = boxed("span", Rect::new(0.0, 0.0, 100.0, 40.0), Some(button));
        style::apply(ripple, &style::StylePatch::new().pointer_events(PointerEvents::None));

        assert_eq!(hit_test(Point::new(5.0, 5.0)), Some(button));
    }

    #[test]
    fn test_enter_leave_order() {
        setup();

        let log: Log = Rc::default();
        let outer = boxed("div", Rect::new(0.0, 0.0, 300.0, 300.0), None);
        let inner = boxed("div", Rect::new(0.0, 0.0, 100.0, 100.0), Some(outer));
        let other = boxed("div", Rect::new(400.0, 0.0, 100.0, 100.0), None);
        let _c1 = on_element(outer, logging(&log, "outer"));
        let _c2 = on_element(inner, logging(&log, "inner"));
        let _c3 = on_element(other, logging(&log, "other"));

        dispatch(PointerEvent::moved(50.0, 50.0));
        dispatch(PointerEvent::moved(200.0, 200.0));
        dispatch(PointerEvent::moved(450.0, 50.0));

        assert_eq!(
            *log.borrow(),
            vec![
                "enter outer",
                "enter inner",
                "leave inner",
                "leave outer",
                "enter other",
            ]
        );
        assert_eq!(hovered_element(), Some(other));

        dispatch(PointerEvent::leave());
        assert_eq!(hovered_element(), None);
    }

    #[test]
    fn test_click_bubbles_with_current_target() {
        setup();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let link = boxed("a", Rect::new(0.0, 0.0, 100.0, 20.0), None);
        let icon = boxed("i", Rect::new(0.0, 0.0, 10.0, 10.0), Some(link));

        let s = seen.clone();
        let _cleanup = on_element(
            link,
            PointerHandlers {
                on_click: Some(Rc::new(move |e| {
                    s.borrow_mut().push((e.target, e.current_target));
                    e.prevent_default();
                })),
                ..Default::default()
            },
        );

        assert!(dispatch(PointerEvent::click(5.0, 5.0)));
        assert_eq!(*seen.borrow(), vec![(Some(icon), Some(link))]);

        // Outside any handler: nothing prevented
        assert!(!dispatch(PointerEvent::click(500.0, 500.0)));
    }

    #[test]
    fn test_click_uses_scroll_offset() {
        setup();
        window::set_document_height(Some(3000.0));

        let log: Log = Rc::default();
        let button = boxed("button", Rect::new(0.0, 1000.0, 100.0, 40.0), None);
        let _cleanup = on_element(button, logging(&log, "button"));

        window::scroll_to(990.0);
        dispatch(PointerEvent::click(10.0, 20.0));
        assert!(log.borrow().contains(&"click button".to_string()));
    }

    #[test]
    fn test_handlers_dropped_with_element() {
        setup();

        let log: Log = Rc::default();
        let button = boxed("button", Rect::new(0.0, 0.0, 100.0, 40.0), None);
        let _cleanup = on_element(button, logging(&log, "old"));
        remove_element(button);

        // Index is reused by the next element
        let replacement = boxed("button", Rect::new(0.0, 0.0, 100.0, 40.0), None);
        assert_eq!(replacement, button);
        dispatch(PointerEvent::click(5.0, 5.0));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_move_handlers() {
        setup();

        let last = Rc::new(Cell::new(None));
        let l = last.clone();
        let cleanup = on_mouse_move(move |e| l.set(Some(e.client_point())));

        dispatch(PointerEvent::moved(12.0, 34.0));
        assert_eq!(last.get(), Some(Point::new(12.0, 34.0)));
        assert_eq!((pointer_x(), pointer_y()), (12.0, 34.0));

        cleanup();
        dispatch(PointerEvent::moved(1.0, 1.0));
        assert_eq!(last.get(), Some(Point::new(12.0, 34.0)));
    }
}
