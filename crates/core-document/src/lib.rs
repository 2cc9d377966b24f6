//! Page-based document model for fumen diagrams.
//!
//! * `Page`: one step of the sequence, stored as a command overlay against its
//!   base field plus an optional piece, a comment and flags.
//! * `Document`: the ordered pages over an initial field, with an owned
//!   `FieldCache` of resolved base fields.
//!
//! Resolution rule: the base of page 0 is the initial field; the base of page
//! `i` is `settle(resolved(i - 1))`; the resolved field of a page is its base
//! with the overlay applied. Only the overlay is ever stored, which keeps both
//! editing and encoding proportional to what actually changed.

mod cache;
mod document;
mod page;

pub use cache::{CacheStats, FieldCache};
pub use document::{Document, DocumentMeta, FormatVersion};
pub use page::{Commands, Comment, Page, PageFlags};

pub use core_field::{CellKey, CellType, Field, Piece, Placement, Rotation};
