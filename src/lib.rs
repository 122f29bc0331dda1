//! InterchangeDB B-tree - the ordered key index beneath the storage engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      SharedBTree (optional)                     │
//! │              parking_lot::RwLock, one lock per call             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                             BTree                               │
//! │   root: Option<Box<Node>>   degree: MinDegree   stats, len      │
//! │   insert → grow root on overflow                                │
//! │   delete → collapse keyless root                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                             Node                                │
//! │   insert_non_full + split_child                                 │
//! │   search                                                        │
//! │   remove + fix_underflow (borrow left / borrow right / merge)   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (MinDegree, Error, config and page sizing)
//! - [`index`] - The B-tree itself
//!
//! # Quick Start
//! ```
//! use interchangedb_btree::BTree;
//!
//! let mut tree = BTree::new(3).unwrap();
//! for key in [50, 30, 10, 40, 20, 60, 70] {
//!     tree.insert(key);
//! }
//!
//! tree.delete(&30).unwrap();
//! assert_eq!(tree.traverse().unwrap(), vec![10, 20, 40, 50, 60, 70]);
//! assert!(tree.validate().is_ok());
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BTreeConfig, Error, MinDegree, Result};

pub use index::btree::{BTree, Iter, SharedBTree, StatsSnapshot, TreeStats, Violation};
