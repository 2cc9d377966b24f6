//! Memoized base fields.
//!
//! Resolving page `i` means replaying every earlier page (overlay, lock, line
//! clear). The cache keeps the base field of each page it has walked past so
//! that repeated access to the active page (and its delta minimization during
//! painting) stays cheap. Entries are only valid while no page at or before
//! their index changes; owners call `invalidate_from` at every mutation site.

use std::collections::BTreeMap;

use core_field::Field;
use tracing::trace;

use crate::Page;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evicted: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FieldCache {
    entries: BTreeMap<usize, Field>,
    stats: CacheStats,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base field of `pages[index]`, walking forward from the nearest cached
    /// ancestor (or `initial`) and memoizing every step.
    ///
    /// `index` must be `< pages.len()`.
    pub fn get(&mut self, index: usize, initial: &Field, pages: &[Page]) -> Field {
        if let Some(field) = self.entries.get(&index) {
            self.stats.hits += 1;
            return field.clone();
        }
        self.stats.misses += 1;
        let (mut at, mut field) = match self.entries.range(..index).next_back() {
            Some((at, field)) => (*at, field.clone()),
            None => {
                self.entries.insert(0, initial.clone());
                (0, initial.clone())
            }
        };
        trace!(target: "document.cache", index, from = at, "cache_resolve");
        while at < index {
            let page = &pages[at];
            field = page.settle(&page.resolved_field(&field));
            at += 1;
            self.entries.insert(at, field.clone());
        }
        field
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry at or after `index`.
    pub fn invalidate_from(&mut self, index: usize) {
        let dropped = self.entries.split_off(&index);
        if !dropped.is_empty() {
            self.stats.evicted += dropped.len() as u64;
            trace!(target: "document.cache", index, dropped = dropped.len(), "cache_invalidate");
        }
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate_from(0);
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_field::{CellKey, Piece, Placement, Rotation};

    fn pages_with_drops() -> Vec<Page> {
        let drops = [
            Placement::new(Piece::I, Rotation::Spawn, 1, 0).unwrap(),
            Placement::new(Piece::O, Rotation::Spawn, 4, 0).unwrap(),
            Placement::new(Piece::T, Rotation::Spawn, 7, 0).unwrap(),
        ];
        let mut pages: Vec<Page> = drops.iter().map(|p| Page::new().with_piece(Some(*p))).collect();
        pages.push(Page::new());
        pages
    }

    #[test]
    fn memoizes_every_walked_step() {
        let pages = pages_with_drops();
        let mut cache = FieldCache::new();
        let base = cache.get(3, &Field::empty(), &pages);
        assert_eq!(base.cell(CellKey::at(0, 0).unwrap()), Piece::I);
        assert_eq!(base.cell(CellKey::at(4, 1).unwrap()), Piece::O);
        assert_eq!(base.cell(CellKey::at(7, 1).unwrap()), Piece::T);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.stats().misses, 1);

        let again = cache.get(2, &Field::empty(), &pages);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(again.cell(CellKey::at(7, 1).unwrap()), Piece::Empty);
    }

    #[test]
    fn resumes_from_nearest_ancestor_after_invalidation() {
        let pages = pages_with_drops();
        let mut cache = FieldCache::new();
        cache.get(3, &Field::empty(), &pages);
        cache.invalidate_from(2);
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert_eq!(cache.stats().evicted, 2);
        let base = cache.get(3, &Field::empty(), &pages);
        assert_eq!(base.cell(CellKey::at(7, 1).unwrap()), Piece::T);
    }
}
