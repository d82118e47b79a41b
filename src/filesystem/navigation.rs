use std::collections::HashSet;

use snafu::Snafu;
use tracing::{debug, trace};

use super::node::{NodeId, NodeKind};
use super::tree::{Tree, TreeError};
use crate::session::ErrorKind;

/// A shortcut that was taken while settling the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowedShortcut {
    pub shortcut: String,
    pub address: String,
}

/// A tree together with the single current-location pointer.
#[derive(Debug, Clone)]
pub struct Workspace {
    tree: Tree,
    current: NodeId,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Tree::new())
    }
}

impl Workspace {
    pub fn new(tree: Tree) -> Self {
        let current = tree.root();
        Workspace { tree, current }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_address_string(&self) -> Result<String, TreeError> {
        self.tree.address_string(self.current)
    }

    /// Drops the whole tree and starts over from a fresh root.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Enters each named child in turn. Files cannot be entered.
    ///
    /// Stops at the first name that cannot be entered; moves made before it
    /// are kept.
    pub fn move_in<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), NavigationError> {
        for name in names {
            let name = name.as_ref();
            let child = self.enterable_child(name)?;
            trace!("Entering {} ({})", name, child);
            self.current = child;
        }
        Ok(())
    }

    fn enterable_child(&self, name: &str) -> Result<NodeId, NavigationError> {
        for child in self.tree.children(self.current)? {
            let node = match self.tree.get(child) {
                Ok(node) => node,
                // Only a shortcut can list a freed node: its alias.
                Err(_) => {
                    return Err(NavigationError::DanglingAliasError {
                        shortcut: self.current_name(),
                    });
                }
            };
            if node.name() == name && node.is_enterable() {
                return Ok(child);
            }
        }
        Err(NavigationError::NotFoundError {
            name: name.to_string(),
        })
    }

    fn current_name(&self) -> String {
        self.tree
            .get(self.current)
            .map(|node| node.name().to_string())
            .unwrap_or_default()
    }

    pub fn move_out(&mut self) -> Result<(), NavigationError> {
        let node = self.tree.get(self.current)?;
        match node.context() {
            Some(context) => {
                self.current = context;
                Ok(())
            }
            None => Err(NavigationError::NoContextError {
                name: node.name().to_string(),
            }),
        }
    }

    /// Moves to a colon-delimited address.
    ///
    /// If the first segment names a node on the current address, the last such
    /// node is re-entered and the remaining segments are followed from there.
    /// Otherwise the location backs out one level per extra segment and the
    /// whole address is followed from there, provided its first segment is a
    /// child at that point. Names repeated at several depths can therefore
    /// resolve against the wrong ancestor.
    pub fn change_directory(&mut self, target: &str) -> Result<(), NavigationError> {
        let segments: Vec<&str> = target.split(':').collect();
        let head = segments[0];
        let origin = self.current;
        let current_address = self.tree.address(origin)?;
        debug!("Changing directory from {:?} to {:?}", current_address, segments);

        match current_address.iter().rposition(|name| name == head) {
            Some(index) => {
                for _ in index + 1..current_address.len() {
                    self.move_out()?;
                }
                self.move_in(&segments[1..])
            }
            None => {
                for _ in 1..segments.len() {
                    if self.move_out().is_err() {
                        break;
                    }
                }
                if self.tree.branch_names(self.current)?.iter().any(|name| name == head) {
                    self.move_in(&segments)
                } else {
                    self.current = origin;
                    Err(NavigationError::TargetNotFoundError {
                        address: target.to_string(),
                    })
                }
            }
        }
    }

    /// Follows shortcuts until the current location is not one.
    ///
    /// The alias is resolved by address through [`Workspace::change_directory`].
    /// On failure the location falls back to the enclosing folder of the
    /// shortcut that could not be followed.
    pub fn shortcut_entry_check(&mut self) -> Result<Vec<FollowedShortcut>, NavigationError> {
        let mut followed = Vec::new();
        let mut visited = HashSet::new();

        loop {
            let shortcut = self.current;
            let node = self.tree.get(shortcut)?;
            let NodeKind::Shortcut { alias } = node.kind() else {
                return Ok(followed);
            };
            let alias = *alias;
            let name = node.name().to_string();

            if !visited.insert(shortcut) {
                self.fall_back_from(shortcut)?;
                return Err(NavigationError::ShortcutCycleError { shortcut: name });
            }
            let Ok(address) = self.tree.address_string(alias) else {
                self.fall_back_from(shortcut)?;
                return Err(NavigationError::DanglingAliasError { shortcut: name });
            };

            debug!("Following shortcut {} to {}", name, address);
            if let Err(error) = self.change_directory(&address) {
                self.fall_back_from(shortcut)?;
                return Err(error);
            }
            followed.push(FollowedShortcut {
                shortcut: name,
                address,
            });
        }
    }

    fn fall_back_from(&mut self, shortcut: NodeId) -> Result<(), NavigationError> {
        if self.tree.get(self.current)?.alias().is_some() {
            self.current = self
                .tree
                .get(shortcut)?
                .context()
                .unwrap_or_else(|| self.tree.root());
        }
        Ok(())
    }

    /// Resolves an address to the node it names without moving.
    ///
    /// The address only counts when the reached node's own address reads back
    /// as exactly the same text.
    pub fn validate_address(&mut self, address: &str) -> Option<NodeId> {
        let origin = self.current;
        let reached = self.change_directory(address).ok().and_then(|_| {
            let reached_address = self.tree.address_string(self.current).ok()?;
            (reached_address == address).then_some(self.current)
        });
        self.current = origin;
        reached
    }
}

#[derive(Debug, Snafu)]
pub enum NavigationError {
    #[snafu(display("Object {} not found", name))]
    NotFoundError { name: String },
    #[snafu(display("No valid context found for {}", name))]
    NoContextError { name: String },
    #[snafu(display("Unable to find target directory {}", address))]
    TargetNotFoundError { address: String },
    #[snafu(display("Shortcut {} points to an object that no longer exists", shortcut))]
    DanglingAliasError { shortcut: String },
    #[snafu(display("Shortcut {} leads back to itself", shortcut))]
    ShortcutCycleError { shortcut: String },
    #[snafu(transparent)]
    TreeError { source: TreeError },
}

impl NavigationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NavigationError::NotFoundError { .. } | NavigationError::TargetNotFoundError { .. } => {
                ErrorKind::NotFound
            }
            NavigationError::NoContextError { .. } => ErrorKind::NoContext,
            NavigationError::DanglingAliasError { .. } => ErrorKind::DanglingAlias,
            NavigationError::ShortcutCycleError { .. } => ErrorKind::Validation,
            NavigationError::TreeError { source } => source.kind(),
        }
    }
}
