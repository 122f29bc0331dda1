//! Configuration constants and node sizing for the B-tree index.
//!
//! The tree itself lives in memory, but a disk-backed integrator stores one
//! node per page. These helpers pick the largest minimum degree whose full
//! node still fits in one page.

use super::degree::MinDegree;
use super::error::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Matches the InterchangeDB storage layer and the OS page size on most
/// systems.
pub const PAGE_SIZE: usize = 4096;

/// Size of a child reference in bytes (a `u32` page id).
pub const NODE_REF_SIZE: usize = 4;

/// Fixed per-node metadata in bytes.
///
/// # Layout (16 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       13    page header (type, checksum, LSN)
/// 13      2     key count (u16, little-endian)
/// 15      1     leaf flag
/// ```
pub const NODE_METADATA_SIZE: usize = 16;

/// Minimum degree used when no configuration is given.
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// Largest minimum degree whose full node fits in `page_size` bytes.
///
/// A full node holds `2t-1` keys, each paired with a child reference, plus
/// one trailing reference and the fixed metadata:
///
/// ```text
/// (key_size + ref_size) * (2t-1) + ref_size + metadata <= page_size
/// ```
///
/// # Errors
/// `Error::InvalidParameter` if `key_size` is zero or if not even `t = 2`
/// fits in the page.
///
/// # Example
/// ```
/// use interchangedb_btree::common::config::max_degree_for_page;
///
/// // 8-byte keys, 4-byte refs, 16 bytes of metadata, 4KB pages.
/// let t = max_degree_for_page(8, 4, 16, 4096).unwrap();
/// assert_eq!(t.get(), 170);
/// ```
pub fn max_degree_for_page(
    key_size: usize,
    ref_size: usize,
    metadata: usize,
    page_size: usize,
) -> Result<MinDegree> {
    if key_size == 0 {
        return Err(Error::InvalidParameter("key size must be non-zero".into()));
    }

    let entry = key_size + ref_size;
    let fixed = ref_size + metadata;
    let max_entries = page_size.saturating_sub(fixed) / entry;

    // max_entries >= 2t - 1  =>  t <= (max_entries + 1) / 2
    let t = (max_entries + 1) / 2;
    if t < MinDegree::MIN.get() {
        return Err(Error::InvalidParameter(format!(
            "a {}-byte key leaves room for only {} entries in a {}-byte page",
            key_size, max_entries, page_size
        )));
    }

    MinDegree::new(t)
}

/// Construction-time settings for a [`BTree`](crate::BTree).
///
/// # Example
/// ```
/// use interchangedb_btree::{BTree, BTreeConfig};
///
/// let config = BTreeConfig::for_page(16).unwrap();
/// let tree: BTree<u128> = BTree::with_config(config);
/// assert!(tree.degree().get() > 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    /// Branching parameter `t`.
    pub min_degree: MinDegree,
}

impl BTreeConfig {
    /// Config with an explicit minimum degree.
    ///
    /// # Errors
    /// `Error::InvalidParameter` if `t < 2`.
    pub fn new(t: usize) -> Result<Self> {
        Ok(Self {
            min_degree: MinDegree::new(t)?,
        })
    }

    /// Config sized so a full node of `key_size`-byte keys fills one
    /// [`PAGE_SIZE`] page.
    ///
    /// # Errors
    /// `Error::InvalidParameter` if the key does not fit (see
    /// [`max_degree_for_page`]).
    pub fn for_page(key_size: usize) -> Result<Self> {
        Ok(Self {
            min_degree: max_degree_for_page(
                key_size,
                NODE_REF_SIZE,
                NODE_METADATA_SIZE,
                PAGE_SIZE,
            )?,
        })
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            min_degree: MinDegree(DEFAULT_MIN_DEGREE),
        }
    }
}
