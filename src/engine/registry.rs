//! Element Registry - Index allocation for parallel arrays.
//!
//! Manages the lifecycle of element indices:
//! - ID ↔ Index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Reactive element count (hosts re-sync when it changes)
//! - Parent context stack for nested element creation

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use spark_signals::{Signal, signal};

use super::arrays;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Map element ID to array index.
    static ID_TO_INDEX: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());

    /// Map array index to element ID.
    static INDEX_TO_ID: RefCell<HashMap<usize, String>> = RefCell::new(HashMap::new());

    /// Currently allocated indices, ordered.
    static ALLOCATED_INDICES: RefCell<BTreeSet<usize>> = const { RefCell::new(BTreeSet::new()) };

    /// Number of allocated elements (reactive).
    static ELEMENT_COUNT: Signal<usize> = signal(0);

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Counter for generating unique IDs.
    static ID_COUNTER: RefCell<usize> = const { RefCell::new(0) };

    /// Stack of parent indices for nested element creation.
    static PARENT_STACK: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Parent Context Stack
// =============================================================================

/// Get current parent index (None at the document root).
pub fn get_current_parent_index() -> Option<usize> {
    PARENT_STACK.with(|stack| stack.borrow().last().copied())
}

/// Push a parent index onto the stack.
pub fn push_parent_context(index: usize) {
    PARENT_STACK.with(|stack| stack.borrow_mut().push(index));
}

/// Pop a parent index from the stack.
pub fn pop_parent_context() {
    PARENT_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new element.
///
/// # Arguments
/// * `id` - Optional registry key. If not provided, one is generated.
///
/// # Returns
/// The allocated index. An id that is already registered returns its index.
pub fn allocate_index(id: Option<&str>) -> usize {
    let element_key = match id {
        Some(id) => id.to_string(),
        None => ID_COUNTER.with(|counter| {
            let mut counter = counter.borrow_mut();
            let id = format!("e{}", *counter);
            *counter += 1;
            id
        }),
    };

    let existing = ID_TO_INDEX.with(|map| map.borrow().get(&element_key).copied());
    if let Some(index) = existing {
        return index;
    }

    // Reuse free index or allocate new
    let index = FREE_INDICES.with(|free| {
        free.borrow_mut().pop().unwrap_or_else(|| {
            NEXT_INDEX.with(|next| {
                let mut next = next.borrow_mut();
                let index = *next;
                *next += 1;
                index
            })
        })
    });

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().insert(element_key.clone(), index);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().insert(index, element_key);
    });
    ALLOCATED_INDICES.with(|set| {
        set.borrow_mut().insert(index);
    });
    sync_count();

    arrays::ensure_all_capacity(index);

    index
}

/// Release an index back to the pool.
///
/// Also recursively releases all children and unlinks from the parent.
pub fn release_index(index: usize) {
    let id = INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned());
    let Some(id) = id else { return };

    for child_index in arrays::core::get_children(index) {
        release_index(child_index);
    }

    run_destroy_callbacks(index);

    if let Some(parent) = arrays::core::get_parent_index(index) {
        arrays::core::remove_child(parent, index);
    }

    ID_TO_INDEX.with(|map| {
        map.borrow_mut().remove(&id);
    });
    INDEX_TO_ID.with(|map| {
        map.borrow_mut().remove(&index);
    });
    ALLOCATED_INDICES.with(|set| {
        set.borrow_mut().remove(&index);
    });

    arrays::clear_all_at_index(index);

    FREE_INDICES.with(|free| free.borrow_mut().push(index));

    // Reset on zero: when all elements are gone, release array memory
    let is_empty = ALLOCATED_INDICES.with(|set| set.borrow().is_empty());
    if is_empty {
        arrays::reset_all_arrays();
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
    sync_count();
}

fn sync_count() {
    let count = ALLOCATED_INDICES.with(|set| set.borrow().len());
    ELEMENT_COUNT.with(|s| {
        if s.get() != count {
            s.set(count);
        }
    });
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the element at `index` is destroyed.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Get index for a registry key.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).copied())
}

/// Get registry key for an index.
pub fn get_id(index: usize) -> Option<String> {
    INDEX_TO_ID.with(|map| map.borrow().get(&index).cloned())
}

/// All currently allocated indices, ascending.
pub fn get_allocated_indices() -> Vec<usize> {
    ALLOCATED_INDICES.with(|set| set.borrow().iter().copied().collect())
}

pub fn is_allocated(index: usize) -> bool {
    ALLOCATED_INDICES.with(|set| set.borrow().contains(&index))
}

/// Count of allocated elements. Tracks reactively inside deriveds/effects.
pub fn get_allocated_count() -> usize {
    ELEMENT_COUNT.with(|s| s.get())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    INDEX_TO_ID.with(|map| map.borrow_mut().clear());
    ALLOCATED_INDICES.with(|set| set.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    ID_COUNTER.with(|counter| *counter.borrow_mut() = 0);
    PARENT_STACK.with(|stack| stack.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
    sync_count();
    arrays::reset_all_arrays();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_index() {
        reset_registry();

        let idx1 = allocate_index(None);
        let idx2 = allocate_index(None);
        let idx3 = allocate_index(Some("invoice_card"));

        assert_eq!((idx1, idx2, idx3), (0, 1, 2));
        assert!(is_allocated(2));
        assert!(!is_allocated(3));
        assert_eq!(get_allocated_count(), 3);

        // Same key returns the same index
        assert_eq!(allocate_index(Some("invoice_card")), idx3);
    }

    #[test]
    fn test_release_and_reuse() {
        reset_registry();

        let idx1 = allocate_index(None);
        let idx2 = allocate_index(None);

        release_index(idx1);
        assert!(!is_allocated(idx1));
        assert!(is_allocated(idx2));

        let idx3 = allocate_index(None);
        assert_eq!(idx3, idx1);
    }

    #[test]
    fn test_release_is_recursive() {
        reset_registry();

        let parent = allocate_index(None);
        let child = allocate_index(None);
        let keep = allocate_index(None);
        arrays::core::set_parent_index(child, Some(parent));
        arrays::core::push_child(parent, child);

        release_index(parent);
        assert!(!is_allocated(parent));
        assert!(!is_allocated(child));
        assert!(is_allocated(keep));
    }

    #[test]
    fn test_id_mapping() {
        reset_registry();

        let idx = allocate_index(Some("theme-toggle"));
        assert_eq!(get_index("theme-toggle"), Some(idx));
        assert_eq!(get_id(idx), Some("theme-toggle".to_string()));
    }

    #[test]
    fn test_parent_context() {
        reset_registry();

        assert_eq!(get_current_parent_index(), None);
        push_parent_context(5);
        push_parent_context(10);
        assert_eq!(get_current_parent_index(), Some(10));
        pop_parent_context();
        assert_eq!(get_current_parent_index(), Some(5));
        pop_parent_context();
        assert_eq!(get_current_parent_index(), None);
    }

    #[test]
    fn test_destroy_callback() {
        use std::cell::Cell;
        use std::rc::Rc;

        reset_registry();

        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();

        let idx = allocate_index(None);
        on_destroy(idx, move || called_clone.set(true));

        assert!(!called.get());
        release_index(idx);
        assert!(called.get());
    }
}
