use alloc::vec::Vec;

use super::handle::Handle;

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    // Vacant slots form an intrusive free list, most recently freed first.
    Vacant { next_free: Option<Handle> },
}

/// Slot store that owns every node of a tree.
///
/// A freed handle is handed out again by the next [`alloc`](Arena::alloc); holding on to a freed
/// handle and dereferencing it is a logic error that panics.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
    live: usize,
}

impl<T> Arena<T> {
    #[cfg(test)]
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
        }
    }

    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        self.live += 1;

        if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.to_index()];
            self.free_head = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => panic!("`Arena::alloc()` - free list points at an occupied slot!"),
            };
            *slot = Slot::Occupied(element);
            return handle;
        }

        assert!(
            self.slots.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.slots.push(Slot::Occupied(element));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match self.slots.get(handle.to_index()) {
            Some(Slot::Occupied(element)) => element,
            _ => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match self.slots.get_mut(handle.to_index()) {
            Some(Slot::Occupied(element)) => element,
            _ => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, handle: Handle) -> bool {
        matches!(self.slots.get(handle.to_index()), Some(Slot::Occupied(_)))
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match self.slots.get_mut(handle.to_index()).map(|slot| core::mem::replace(slot, vacant)) {
            Some(Slot::Occupied(element)) => {
                self.free_head = Some(handle);
                self.live -= 1;
                element
            }
            Some(previous) => {
                // Put the vacant slot back untouched so the free list stays intact.
                self.slots[handle.to_index()] = previous;
                panic!("`Arena::take()` - `handle` is invalid!");
            }
            None => panic!("`Arena::take()` - `handle` is invalid!"),
        }
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }
}
