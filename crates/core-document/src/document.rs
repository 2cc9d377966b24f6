use std::cell::RefCell;

use core_field::Field;
use tracing::trace;

use crate::{FieldCache, Page, PageFlags};

/// Encoding generation a document was read from. Encoding always writes
/// `V115`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatVersion {
    V110,
    #[default]
    V115,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Render pieces in their guideline colours (fumen "colorize").
    pub guide_color: bool,
    pub version: FormatVersion,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            guide_color: true,
            version: FormatVersion::V115,
        }
    }
}

/// Ordered pages over an initial field.
///
/// Invariants:
/// * `pages` is never empty.
/// * every cache entry `i` equals the base field of `pages[i]`; all mutators
///   below invalidate the cache from the first page whose base can change.
#[derive(Debug, Clone)]
pub struct Document {
    initial_field: Field,
    pages: Vec<Page>,
    meta: DocumentMeta,
    cache: RefCell<FieldCache>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.initial_field == other.initial_field
            && self.pages == other.pages
            && self.meta == other.meta
    }
}

impl Eq for Document {}

impl Document {
    /// Single empty page over an empty field.
    pub fn new() -> Self {
        Self::from_parts(Field::empty(), vec![Page::new()], DocumentMeta::default())
    }

    /// An empty `pages` vector is replaced by a single default page.
    pub fn from_parts(initial_field: Field, mut pages: Vec<Page>, meta: DocumentMeta) -> Self {
        if pages.is_empty() {
            pages.push(Page::new());
        }
        Self {
            initial_field,
            pages,
            meta,
            cache: RefCell::new(FieldCache::new()),
        }
    }

    pub fn initial_field(&self) -> &Field {
        &self.initial_field
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Field of `index` before its own overlay is applied.
    pub fn base_field(&self, index: usize) -> Option<Field> {
        if index >= self.pages.len() {
            return None;
        }
        Some(
            self.cache
                .borrow_mut()
                .get(index, &self.initial_field, &self.pages),
        )
    }

    /// Field shown for `index`: base field plus the page's overlay.
    pub fn resolved_field(&self, index: usize) -> Option<Field> {
        let base = self.base_field(index)?;
        Some(self.pages[index].resolved_field(&base))
    }

    /// Field after `index` settles (what the next page starts from).
    pub fn settled_field(&self, index: usize) -> Option<Field> {
        let resolved = self.resolved_field(index)?;
        Some(self.pages[index].settle(&resolved))
    }

    /// Comment displayed on `index`, following inheritance back to the most
    /// recent explicit comment. Page 0 inherits the empty string.
    pub fn comment_text(&self, index: usize) -> Option<&str> {
        if index >= self.pages.len() {
            return None;
        }
        Some(
            self.pages[..=index]
                .iter()
                .rev()
                .find_map(|page| page.comment().explicit_text())
                .unwrap_or(""),
        )
    }

    /// Stored flags plus the derived `QUIZ` flag.
    pub fn flags(&self, index: usize) -> Option<PageFlags> {
        let mut flags = self.pages.get(index)?.flags();
        if self.comment_text(index)?.starts_with("#Q=") {
            flags |= PageFlags::QUIZ;
        }
        Some(flags)
    }

    pub fn cache_stats(&self) -> crate::CacheStats {
        self.cache.borrow().stats()
    }

    /// Mutate one page in place. Pages after `index` may see a new base.
    pub fn edit_page<R>(&mut self, index: usize, f: impl FnOnce(&mut Page) -> R) -> Option<R> {
        let page = self.pages.get_mut(index)?;
        let result = f(page);
        self.cache.get_mut().invalidate_from(index + 1);
        Some(result)
    }

    /// Insert `page` at `index` (`index == page_count()` appends).
    pub fn insert_page(&mut self, index: usize, page: Page) -> bool {
        if index > self.pages.len() {
            return false;
        }
        self.pages.insert(index, page);
        self.cache.get_mut().invalidate_from(index);
        trace!(target: "document", index, pages = self.pages.len(), "page_inserted");
        true
    }

    /// Remove the page at `index`. The last remaining page cannot be removed.
    pub fn remove_page(&mut self, index: usize) -> Option<Page> {
        if index >= self.pages.len() || self.pages.len() == 1 {
            return None;
        }
        let page = self.pages.remove(index);
        self.cache.get_mut().invalidate_from(index);
        trace!(target: "document", index, pages = self.pages.len(), "page_removed");
        Some(page)
    }

    /// Move the page at `from` so that it ends up at `to`.
    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let len = self.pages.len();
        if from >= len || to >= len {
            return false;
        }
        if from != to {
            let page = self.pages.remove(from);
            self.pages.insert(to, page);
            self.cache.get_mut().invalidate_from(from.min(to));
        }
        true
    }

    /// Replace the initial field (all cached bases become stale).
    pub fn set_initial_field(&mut self, field: Field) -> Field {
        self.cache.get_mut().invalidate_all();
        std::mem::replace(&mut self.initial_field, field)
    }
}
