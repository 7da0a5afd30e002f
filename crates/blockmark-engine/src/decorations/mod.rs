//! # Code Block Decorations
//!
//! Highlight ranges for every code block, recomputed from scratch on each
//! relevant edit.
//!
//! ```text
//! Document ──► code blocks ──► Tokenizer ──► token tree ──► flatten ──► DecorationTable
//!              (doc order)     (grammar by    (nested)       (offset      (BlockId → ranges)
//!                               language)                     walk)
//! ```
//!
//! A typed token with a nested stream produces a range for itself and then
//! ranges for its children, so ranges may overlap. The render layer resolves
//! overlaps with [`segments`], which unions the tags active over each run of
//! text.
//!
//! The table is rebuilt wholesale and handed back to the caller, which swaps
//! it in with a single assignment. Nothing here mutates a published table.

mod engine;
mod flatten;
mod range;
mod segments;

pub use engine::{DecorationWarning, Recomputation, recompute_decorations};
pub use flatten::flatten;
pub use range::{DecorationRange, DecorationTable};
pub use segments::{Segment, segments};
