//! In-memory banner table
//!
//! Maps source banner paths to resident decoded surfaces. Each entry is a
//! shared slot cell rather than a bare surface: texture adapters hold the
//! same slot and resolve through it on every access, so an in-place
//! replacement (rebuild, runtime conversion) is observed without any
//! pointer aliasing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::surface::Surface;

/// Shared handle to one banner's resident surface. `None` means evicted.
pub type BannerSlot = Rc<RefCell<Option<Surface>>>;

/// The table of banners currently resident in memory.
#[derive(Debug, Default)]
pub struct BannerTable {
    slots: HashMap<String, BannerSlot>,
}

impl BannerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a surface is loaded for this path.
    pub fn is_resident(&self, source_path: &str) -> bool {
        self.slots
            .get(source_path)
            .is_some_and(|slot| slot.borrow().is_some())
    }

    /// The slot for a path, if the table knows it.
    pub fn slot(&self, source_path: &str) -> Option<BannerSlot> {
        self.slots.get(source_path).cloned()
    }

    /// Make `surface` resident for `source_path`, replacing any previous
    /// surface. An existing slot cell is reused so adapters bound to it see
    /// the new data.
    pub fn insert(&mut self, source_path: &str, surface: Surface) -> BannerSlot {
        match self.slots.get(source_path) {
            Some(slot) => {
                *slot.borrow_mut() = Some(surface);
                slot.clone()
            }
            None => {
                let slot: BannerSlot = Rc::new(RefCell::new(Some(surface)));
                self.slots.insert(source_path.to_string(), slot.clone());
                slot
            }
        }
    }

    /// Release the surface for one path, if any.
    pub fn evict(&mut self, source_path: &str) {
        if let Some(slot) = self.slots.remove(source_path) {
            *slot.borrow_mut() = None;
        }
    }

    /// Release every resident surface. Idempotent.
    pub fn unload_all(&mut self) {
        for slot in self.slots.values() {
            *slot.borrow_mut() = None;
        }
        self.slots.clear();
    }

    /// Number of resident banners.
    pub fn resident_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.borrow().is_some())
            .count()
    }

    /// Total resident footprint: sum of pitch x height over every loaded
    /// surface.
    pub fn resident_bytes(&self) -> usize {
        self.slots
            .values()
            .filter_map(|slot| slot.borrow().as_ref().map(Surface::byte_size))
            .sum()
    }
}
