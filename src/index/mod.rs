//! Index structures.
//!
//! - [`btree`] - Ordered key index (B-tree)

pub mod btree;
