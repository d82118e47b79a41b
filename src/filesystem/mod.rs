//! In-memory tree of folders, files and shortcuts.
//!
//! Nodes live in an arena ([`Tree`]) and refer to each other by [`NodeId`].
//! Folders own their branches, shortcuts only alias a target, and every node
//! keeps a weak reference to its enclosing folder for address computation.
//! [`Workspace`] adds the current location and the navigation rules on top.

mod navigation;
mod node;
mod tree;

pub use navigation::{NavigationError, Workspace};
pub use node::{NodeId, NodeKind, NodeKindTag, NodeSpec};
pub use tree::TreeError;
