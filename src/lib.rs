//! An in-memory B+Tree index of unique, ordered keys.
//!
//! [`BPlusTree`] stores every key in its leaves, which are chained left to right, and keeps
//! separator keys in the internal nodes above them. The fan-out is fixed per tree by a [`Degree`]
//! chosen at construction.
//!
//! # Example
//!
//! ```
//! use leaf_index::BPlusTree;
//!
//! let mut index = BPlusTree::new(3)?;
//! for key in [10, 20, 5, 6, 15, 30, 25, 35] {
//!     index.insert(key);
//! }
//!
//! assert!(index.search(&15));
//! assert_eq!(index.height(), 3);
//!
//! // Deleting a key that routes searches hands its place to the next smaller key.
//! assert!(index.delete(&6));
//! assert!(!index.search(&6));
//!
//! print!("{}", index.display());
//! # Ok::<(), leaf_index::DegreeError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one contiguous arena and refer to each other by handle
//! - **Linked leaves** - In-order iteration walks the leaf chain without revisiting the root
//! - **Diagnostics** - Structural events are reported through `tracing` when a subscriber is set
//!
//! # Implementation
//!
//! Each separator equals the largest key of the subtree to its left. Overfilled nodes split in
//! half. Underfilled nodes merge with a sibling, and a merge that overfills is split again, so no
//! keys are ever rotated between siblings.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod degree;
mod raw;

pub mod bplus_tree;

pub use bplus_tree::BPlusTree;
pub use degree::{Degree, DegreeError};
