use serde::{Deserialize, Serialize};

/// Stable handle into a [`SlotArena`]. A recycled slot carries a new
/// generation, so handles to the old occupant stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot arena with a free list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SlotId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotId {
            index,
            generation: 0,
        }
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    SlotId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|v| {
                (
                    SlotId {
                        index: i as u32,
                        generation,
                    },
                    v,
                )
            })
        })
    }

    /// Remove every value for which `keep` returns false. Returns the removed ids.
    pub fn retain(&mut self, mut keep: impl FnMut(SlotId, &T) -> bool) -> Vec<SlotId> {
        let doomed: Vec<SlotId> = self
            .iter()
            .filter(|(id, v)| !keep(*id, *v))
            .map(|(id, _)| id)
            .collect();
        for &id in &doomed {
            self.remove(id);
        }
        doomed
    }

    pub fn clear(&mut self) {
        let ids: Vec<SlotId> = self.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recycled_slot_invalidates_old_handle() {
        let mut arena = SlotArena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));

        let b = arena.insert("b");
        assert_eq!(a.index, b.index, "slot is reused");
        assert_ne!(a.generation, b.generation);
        assert!(arena.get(a).is_none(), "stale handle must not resolve");
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn retain_reports_removed_ids() {
        let mut arena = SlotArena::new();
        let ids: Vec<SlotId> = (0..5).map(|i| arena.insert(i)).collect();
        let removed = arena.retain(|_, v| v % 2 == 0);
        assert_eq!(removed, vec![ids[1], ids[3]]);
        assert_eq!(arena.len(), 3);
        assert!(!arena.contains(ids[1]));
        assert!(arena.contains(ids[2]));
    }

    #[test]
    fn double_remove_is_noop() {
        let mut arena = SlotArena::new();
        let id = arena.insert(7);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert_eq!(arena.len(), 0);
        assert!(arena.is_empty());
    }

    #[test]
    fn clear_empties_and_keeps_slots_reusable() {
        let mut arena = SlotArena::new();
        arena.insert(1);
        arena.insert(2);
        arena.clear();
        assert!(arena.is_empty());
        let id = arena.insert(3);
        assert!(id.index < 2, "cleared slots are recycled");
    }
}
