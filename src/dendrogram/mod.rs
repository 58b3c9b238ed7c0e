//! # Sample Dendrogram
//!
//! Decides the order in which samples are merged.
//!
//! [`DendrogramBuilder`] turns the similarity library into distances and
//! clusters samples with complete linkage, producing a binary [`MergeTree`]
//! whose leaves are named after the samples. [`MergeDriver`] then walks the
//! tree bottom-up: at each internal node, internal children are merged before
//! leaf children, and the accumulated result is always the master list of the
//! next matcher call.
//!
//! ```text
//! cluster#2 distance: 0.412
//!   C (leaf)
//!   cluster#1 distance: 0.050
//!     A (leaf)
//!     B (leaf)
//! ```

mod builder;
mod driver;
mod tree;

#[cfg(test)]
mod tests;

pub use builder::{distance_matrix, DendrogramBuilder};
pub use driver::MergeDriver;
pub use tree::{MergeNode, MergeTree, NodeId};
