//! # Document Model
//!
//! A block tree with inline leaf runs, edited only through [`Cmd`]s.
//!
//! - **`node`**: [`Block`], [`BlockKind`], [`Leaf`] and [`BlockId`]
//! - **`point`**: [`Point`], [`Range`] and paths into the tree
//! - **`commands`**: the [`Cmd`] enum accepted by [`Document::apply`]
//! - **`patch`**: the [`Patch`] each command returns
//! - **`json`**: persistence as a JSON array of block nodes

mod commands;
#[allow(clippy::module_inception)]
mod document;
mod json;
mod node;
mod patch;
mod point;

pub use commands::{Cmd, DeleteUnit};
pub use document::Document;
pub use node::{Block, BlockId, BlockKind, Leaf, Mark, Node, TEXT_LANGUAGE};
pub use patch::{ChangeOrigin, Patch};
pub use point::{Path, Point, Range, Selection};
