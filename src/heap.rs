//! Indexed binary heap for elite tracking.
//!
//! The heap stores *handles* (indices into an external slice) rather than
//! the elements themselves. Every element records its own position in the
//! heap through [`HeapSlot`], and the heap keeps that back-reference in sync
//! on every swap. This makes re-prioritizing an arbitrary element after its
//! key changed externally an O(log n) operation: the element already knows
//! where it lives.
//!
//! # Ordering
//!
//! The ordering is given by a comparator `outranks(a, b)`. The element for
//! which `outranks` holds against every other element sits at the top:
//! use `a.key > b.key` for a max-heap, `a.key < b.key` for a min-heap.

/// Back-reference from an element to its position in an [`IndexedHeap`].
pub trait HeapSlot {
    /// Current heap position, or `None` when the element is not tracked.
    fn heap_slot(&self) -> Option<usize>;

    /// Called by the heap whenever the element moves.
    fn set_heap_slot(&mut self, slot: Option<usize>);
}

/// Binary heap of indices into an external slice of [`HeapSlot`] elements.
#[derive(Clone)]
pub struct IndexedHeap<T> {
    handles: Vec<usize>,
    outranks: fn(&T, &T) -> bool,
}

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

impl<T: HeapSlot> IndexedHeap<T> {
    /// Creates an empty heap ordered by `outranks`.
    pub fn new(outranks: fn(&T, &T) -> bool) -> Self {
        Self {
            handles: Vec::new(),
            outranks,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.handles.reserve(additional);
    }

    /// Removes every handle without touching the elements.
    ///
    /// Callers that keep the elements alive must reset their slots.
    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Handles in heap storage order.
    pub fn handles(&self) -> &[usize] {
        &self.handles
    }

    /// Inserts element `handle` of `items`.
    ///
    /// # Complexity
    /// O(log n)
    pub fn insert(&mut self, items: &mut [T], handle: usize) {
        debug_assert!(
            items[handle].heap_slot().is_none(),
            "element {handle} is already in the heap"
        );
        let pos = self.handles.len();
        self.handles.push(handle);
        items[handle].set_heap_slot(Some(pos));
        self.bubble(items, pos);
    }

    /// Handle of the top element.
    ///
    /// # Panics
    /// Panics if the heap is empty.
    pub fn top(&self) -> usize {
        assert!(!self.handles.is_empty(), "top() on empty heap");
        self.handles[0]
    }

    /// Removes and returns the top handle, resetting its slot to `None`.
    ///
    /// # Panics
    /// Panics if the heap is empty.
    pub fn pop(&mut self, items: &mut [T]) -> usize {
        assert!(!self.handles.is_empty(), "pop() on empty heap");
        let top = self.handles.swap_remove(0);
        items[top].set_heap_slot(None);
        if let Some(&moved) = self.handles.first() {
            items[moved].set_heap_slot(Some(0));
            self.sink(items, 0);
        }
        top
    }

    /// Restores heap order after the key of the element at `slot` changed.
    ///
    /// # Complexity
    /// O(log n)
    pub fn modify_key(&mut self, items: &mut [T], slot: usize) {
        assert!(slot < self.handles.len(), "heap slot {slot} out of range");
        if slot > 0 && self.outranks_at(items, slot, parent(slot)) {
            self.bubble(items, slot);
        } else {
            self.sink(items, slot);
        }
    }

    fn outranks_at(&self, items: &[T], a: usize, b: usize) -> bool {
        (self.outranks)(&items[self.handles[a]], &items[self.handles[b]])
    }

    fn swap(&mut self, items: &mut [T], a: usize, b: usize) {
        self.handles.swap(a, b);
        items[self.handles[a]].set_heap_slot(Some(a));
        items[self.handles[b]].set_heap_slot(Some(b));
    }

    fn bubble(&mut self, items: &mut [T], mut pos: usize) {
        while pos > 0 {
            let up = parent(pos);
            if !self.outranks_at(items, pos, up) {
                break;
            }
            self.swap(items, pos, up);
            pos = up;
        }
    }

    fn sink(&mut self, items: &mut [T], mut pos: usize) {
        let len = self.handles.len();
        loop {
            let left = left_child(pos);
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.outranks_at(items, right, left) {
                right
            } else {
                left
            };
            if !self.outranks_at(items, child, pos) {
                break;
            }
            self.swap(items, pos, child);
            pos = child;
        }
    }
}
