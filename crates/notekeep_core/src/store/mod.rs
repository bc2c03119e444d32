//! In-memory collection store and derived views.
//!
//! # Responsibility
//! - Hold the authoritative note and todo collections.
//! - Apply add/update/delete/toggle by stable `id`.
//! - Derive filtered views, categories and counters on demand.
//!
//! # Invariants
//! - `id` values are unique within a collection.
//! - Unknown ids degrade to no-ops; no operation here fails.
//! - Derived views never mutate or cache collection state.

pub mod collection;
pub mod filter;

pub use collection::{Collection, Entity, TodoCounts};
pub use filter::{EntityFilter, FilteredView, StatusFilter};
