//! Fixed-capacity handle pool for cosmetic effects
//!
//! Steam puffs and similar decorations reuse a small set of slots instead of
//! allocating per effect. Acquiring marks a slot active; the slot is handed
//! back with `release` when the effect expires.

/// A pool of `T` with a fixed capacity chosen at construction
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<T>,
    active: Vec<bool>,
}

impl<T> Pool<T> {
    /// Build a pool from pre-constructed slots; all start inactive.
    pub fn new(slots: Vec<T>) -> Self {
        let active = vec![false; slots.len()];
        Self { slots, active }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Claim the first free slot, if any, and mark it active.
    pub fn acquire(&mut self) -> Option<(usize, &mut T)> {
        let index = self.active.iter().position(|a| !*a)?;
        self.active[index] = true;
        Some((index, &mut self.slots[index]))
    }

    /// Return a slot to the free list. Releasing an inactive slot is a no-op.
    pub fn release(&mut self, index: usize) {
        if let Some(flag) = self.active.get_mut(index) {
            *flag = false;
        }
    }

    /// Iterate the active slots with their indices.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .zip(self.active.iter())
            .filter_map(|((i, slot), active)| active.then_some((i, slot)))
    }

    /// Read-only view of the active slots (for the render side).
    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.slots
            .iter()
            .zip(self.active.iter())
            .filter_map(|(slot, active)| active.then_some(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_up_to_capacity() {
        let mut pool = Pool::new(vec![0u32; 3]);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_none());
        assert_eq!(pool.active_count(), 3);
    }

    #[test]
    fn test_release_recycles_slot() {
        let mut pool = Pool::new(vec![0u32; 2]);
        let (first, _) = pool.acquire().unwrap();
        pool.acquire().unwrap();
        pool.release(first);
        let (again, _) = pool.acquire().unwrap();
        assert_eq!(again, first);
    }

    #[test]
    fn test_release_inactive_is_noop() {
        let mut pool = Pool::new(vec![0u32; 1]);
        pool.release(0);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.acquire().is_some());
    }
}
