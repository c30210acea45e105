//! Authoritative store of managed windows and their tiling order.
//!
//! Records live in an id-keyed map; the tiling order is a separate list of
//! ids. Reordering (swap, move to front) only touches the order list, never
//! the window records themselves.
//!
//! ```text
//! order:   [ 3 | 1 | 4 | 2 ]
//!            ^   ^^^^^^^^^
//!         master   stack
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use super::error::{TilingError, TilingResult};
use super::state::{ManagedWindow, NewWindow, Rect, WindowId};

/// Stores the windows under management and their order.
///
/// Invariant: the set of ids in the order equals the set of stored ids.
#[derive(Debug, Clone)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, ManagedWindow>,
    order: Vec<WindowId>,
    next_id: u64,
}

impl Default for WindowRegistry {
    fn default() -> Self { Self::new() }
}

impl WindowRegistry {
    /// Creates an empty registry. The first allocated id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Allocates the next sequential id.
    pub const fn next_id(&mut self) -> WindowId {
        let id = WindowId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocates an id for `window` and appends it to the stack.
    pub fn register(&mut self, window: NewWindow) -> WindowId {
        let id = self.next_id();
        self.windows.insert(id, window.into_managed(id));
        self.order.push(id);
        tracing::trace!(window_id = %id, count = self.order.len(), "registered window");
        id
    }

    /// Appends a window to the end of the order.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::DuplicateWindow`] if the id is already managed.
    pub fn add(&mut self, window: ManagedWindow) -> TilingResult<()> {
        let id = window.id;
        if self.windows.contains_key(&id) {
            return Err(TilingError::DuplicateWindow(id));
        }

        // Keep allocation ahead of externally supplied ids.
        self.next_id = self.next_id.max(id.get().saturating_add(1));
        self.windows.insert(id, window);
        self.order.push(id);
        Ok(())
    }

    /// Removes a window. Unknown ids are ignored.
    ///
    /// Returns the removed record, if any.
    pub fn remove(&mut self, id: WindowId) -> Option<ManagedWindow> {
        let removed = self.windows.remove(&id)?;
        self.order.retain(|&other| other != id);
        debug_assert_eq!(self.order.len(), self.windows.len());
        Some(removed)
    }

    /// Exchanges two order slots. Out-of-range indices are a no-op.
    pub fn swap(&mut self, i: usize, j: usize) {
        if i < self.order.len() && j < self.order.len() {
            self.order.swap(i, j);
        }
    }

    /// Moves a window to the master slot.
    ///
    /// Windows that preceded it shift one slot later, keeping their relative
    /// order. Returns `false` (and changes nothing) if the id is unknown.
    pub fn move_to_front(&mut self, id: WindowId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if index > 0 {
            self.order[..=index].rotate_right(1);
        }
        true
    }

    /// Returns a mutable reference to a window record.
    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut ManagedWindow> { self.windows.get_mut(&id) }

    /// Records a new frame for a window. Returns `false` if unknown.
    pub fn update_frame(&mut self, id: WindowId, frame: Rect) -> bool {
        self.get_mut(id).map(|w| w.frame = frame).is_some()
    }

    /// Records a new title for a window. Returns `false` if unknown.
    pub fn update_title(&mut self, id: WindowId, title: &str) -> bool {
        self.get_mut(id).map(|w| title.clone_into(&mut w.title)).is_some()
    }

    /// Marks a window floating or tiled. Returns `false` if unknown.
    pub fn set_floating(&mut self, id: WindowId, floating: bool) -> bool {
        self.get_mut(id).map(|w| w.is_floating = floating).is_some()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a window by id.
    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&ManagedWindow> { self.windows.get(&id) }

    /// Returns the window at an order index.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&ManagedWindow> {
        self.order.get(index).and_then(|id| self.windows.get(id))
    }

    /// Returns the order index of a window.
    #[must_use]
    pub fn index_of(&self, id: WindowId) -> Option<usize> { self.order.iter().position(|&other| other == id) }

    /// Returns the number of managed windows.
    #[must_use]
    pub fn count(&self) -> usize { self.order.len() }

    /// Returns whether no window is managed.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Returns whether a window is managed.
    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool { self.windows.contains_key(&id) }

    /// Returns the tiling order.
    #[must_use]
    pub fn order(&self) -> &[WindowId] { &self.order }

    /// Returns the window at an order index or an error describing why not.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::IndexOutOfRange`] for an invalid index.
    pub fn try_get_at(&self, index: usize) -> TilingResult<&ManagedWindow> {
        self.get_at(index).ok_or(TilingError::IndexOutOfRange { index, count: self.count() })
    }

    /// Iterates windows in tiling order.
    pub fn iter(&self) -> impl Iterator<Item = &ManagedWindow> + '_ {
        self.order.iter().filter_map(|id| self.windows.get(id))
    }

    /// Iterates non-floating windows in tiling order.
    pub fn tiled(&self) -> impl Iterator<Item = &ManagedWindow> + '_ {
        self.iter().filter(|w| !w.is_floating)
    }

    /// Returns a human-readable dump of the registry in tiling order.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("{} managed window(s)\n", self.count());
        for (index, window) in self.iter().enumerate() {
            let slot = if index == 0 { "master" } else { "stack" };
            let floating = if window.is_floating { " [floating]" } else { "" };
            let _ = writeln!(
                out,
                "  [{index}] {slot:<6} #{} {} - {:?} {}{floating}",
                window.id, window.app_name, window.title, window.frame
            );
        }
        out
    }

    /// Verifies that the order and the record map describe the same id set.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.order.len() != self.windows.len() {
            return Err(format!(
                "order has {} ids but {} windows are stored",
                self.order.len(),
                self.windows.len()
            ));
        }
        for (index, id) in self.order.iter().enumerate() {
            if !self.windows.contains_key(id) {
                return Err(format!("order slot {index} holds unknown id {id}"));
            }
            if self.order[..index].contains(id) {
                return Err(format!("id {id} appears twice in the order"));
            }
        }
        Ok(())
    }
}
