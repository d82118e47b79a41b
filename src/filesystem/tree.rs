use snafu::Snafu;
use tracing::debug;

use super::node::{Node, NodeId, NodeKind, NodeSpec};
use crate::session::ErrorKind;

pub const ROOT_NAME: &str = "root";

/// Arena holding every node of one filesystem.
///
/// Folders own their branches by id; each node keeps a weak `context` id used
/// only to walk upwards. Removing a node frees its slot and, for folders, the
/// slots of everything it owns. Shortcut aliases are never followed when
/// freeing.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<Node>>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let root = Node {
            name: ROOT_NAME.to_string(),
            context: None,
            kind: NodeKind::Folder {
                branches: Vec::new(),
            },
        };
        Tree {
            slots: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TreeError::DanglingError { id })
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TreeError::DanglingError { id })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Appends a new child to `parent`. Name uniqueness is the caller's job,
    /// see [`Tree::unique_name`].
    pub fn populate(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        spec: NodeSpec,
    ) -> Result<NodeId, TreeError> {
        let name = name.into();
        self.ensure_folder(parent)?;

        let kind = match spec {
            NodeSpec::File(content) => NodeKind::File { content },
            NodeSpec::Folder => NodeKind::Folder {
                branches: Vec::new(),
            },
            NodeSpec::Shortcut(alias) => NodeKind::Shortcut { alias },
        };
        let id = self.allocate(Node {
            name,
            context: Some(parent),
            kind,
        });
        self.attach(parent, id)?;
        debug!("Populated {} under {}", id, parent);
        Ok(id)
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        match &mut self.get_mut(parent)?.kind {
            NodeKind::Folder { branches } => {
                branches.push(child);
                Ok(())
            }
            _ => Err(TreeError::NotAFolderError { id: parent }),
        }
    }

    fn ensure_folder(&self, id: NodeId) -> Result<(), TreeError> {
        match self.get(id)?.kind {
            NodeKind::Folder { .. } => Ok(()),
            _ => Err(TreeError::NotAFolderError { id }),
        }
    }

    /// Root-first list of names leading to `id`.
    pub fn address(&self, id: NodeId) -> Result<Vec<String>, TreeError> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current)?;
            names.push(node.name.clone());
            cursor = node.context;
        }
        names.reverse();
        Ok(names)
    }

    pub fn address_string(&self, id: NodeId) -> Result<String, TreeError> {
        Ok(self.address(id)?.join(":"))
    }

    /// Direct branches of a folder, or the single alias of a shortcut.
    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        match &self.get(id)?.kind {
            NodeKind::Folder { branches } => Ok(branches.clone()),
            NodeKind::Shortcut { alias } => Ok(vec![*alias]),
            NodeKind::File { .. } => Err(TreeError::NotAFolderError { id }),
        }
    }

    /// Names of the branches owned by a folder. Shortcut aliases are skipped.
    pub fn branch_names(&self, id: NodeId) -> Result<Vec<String>, TreeError> {
        match &self.get(id)?.kind {
            NodeKind::Folder { branches } => branches
                .iter()
                .map(|branch| self.get(*branch).map(|node| node.name.clone()))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }

    /// For each requested name, the first direct child carrying it. Names
    /// without a match come back in the second list, in request order.
    pub fn resolve_names<S: AsRef<str>>(
        &self,
        folder: NodeId,
        names: &[S],
    ) -> Result<(Vec<NodeId>, Vec<String>), TreeError> {
        let children = self.children(folder)?;
        let mut matches = Vec::new();
        let mut unmatched = Vec::new();

        for name in names {
            let name = name.as_ref();
            let mut found = None;
            for child in &children {
                if self.get(*child)?.name == name {
                    found = Some(*child);
                    break;
                }
            }
            match found {
                Some(child) => matches.push(child),
                None => unmatched.push(name.to_string()),
            }
        }

        Ok((matches, unmatched))
    }

    /// Appends `suffix` to `name` until no branch of `folder` carries it.
    pub fn unique_name(&self, folder: NodeId, name: &str, suffix: &str) -> Result<String, TreeError> {
        let taken = self.branch_names(folder)?;
        let mut candidate = name.to_string();
        while taken.contains(&candidate) {
            candidate.push_str(suffix);
        }
        Ok(candidate)
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_content(&mut self, id: NodeId, content: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::File { content: current } => {
                *current = content.into();
                Ok(())
            }
            _ => Err(TreeError::NotAFileError { id }),
        }
    }

    pub fn append_content(&mut self, id: NodeId, content: &str) -> Result<(), TreeError> {
        match &mut self.get_mut(id)?.kind {
            NodeKind::File { content: current } => {
                current.push_str(content);
                Ok(())
            }
            _ => Err(TreeError::NotAFileError { id }),
        }
    }

    /// Detaches `id` from `parent` and frees it together with everything it
    /// owns. Returns the removed node.
    pub fn remove(&mut self, parent: NodeId, id: NodeId) -> Result<Node, TreeError> {
        if id == self.root {
            return Err(TreeError::RootRemovalError);
        }
        match &mut self.get_mut(parent)?.kind {
            NodeKind::Folder { branches } => {
                let position = branches
                    .iter()
                    .position(|branch| *branch == id)
                    .ok_or(TreeError::NotABranchError { id, parent })?;
                branches.remove(position);
            }
            _ => return Err(TreeError::NotAFolderError { id: parent }),
        }
        let removed = self.free(id)?;
        debug!("Removed {} from {}, {} nodes remain", id, parent, self.len());
        Ok(removed)
    }

    fn free(&mut self, id: NodeId) -> Result<Node, TreeError> {
        let node = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(TreeError::DanglingError { id })?;
        if let NodeKind::Folder { branches } = &node.kind {
            for branch in branches {
                self.free(*branch)?;
            }
        }
        Ok(node)
    }

    /// Deep-copies `source` into `destination` under `name`.
    ///
    /// Files copy their content, folders clone their owned branches, and
    /// shortcuts copy only the alias id.
    pub fn copy_into(
        &mut self,
        source: NodeId,
        destination: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.ensure_folder(destination)?;
        let copy = self.clone_detached(source, destination, Some(name.into()))?;
        self.attach(destination, copy)?;
        Ok(copy)
    }

    // The copy is attached only after its subtree is built, so pasting a
    // folder into itself does not recurse into the fresh copy.
    fn clone_detached(
        &mut self,
        source: NodeId,
        context: NodeId,
        name: Option<String>,
    ) -> Result<NodeId, TreeError> {
        let Node {
            name: original_name,
            kind: original_kind,
            ..
        } = self.get(source)?.clone();
        let kind = match &original_kind {
            NodeKind::File { content } => NodeKind::File {
                content: content.clone(),
            },
            NodeKind::Shortcut { alias } => NodeKind::Shortcut { alias: *alias },
            NodeKind::Folder { .. } => NodeKind::Folder {
                branches: Vec::new(),
            },
        };
        let copy = self.allocate(Node {
            name: name.unwrap_or(original_name),
            context: Some(context),
            kind,
        });

        if let NodeKind::Folder { branches } = original_kind {
            for branch in branches {
                let branch_copy = self.clone_detached(branch, copy, None)?;
                self.attach(copy, branch_copy)?;
            }
        }
        Ok(copy)
    }

    /// Every node below `from` whose name occurs within `needle`, depth first.
    /// Only folders are descended into; shortcut targets are not searched.
    pub fn search(&self, from: NodeId, needle: &str) -> Result<Vec<NodeId>, TreeError> {
        let mut results = Vec::new();
        self.search_into(from, needle, &mut results)?;
        Ok(results)
    }

    fn search_into(
        &self,
        from: NodeId,
        needle: &str,
        results: &mut Vec<NodeId>,
    ) -> Result<(), TreeError> {
        let NodeKind::Folder { branches } = &self.get(from)?.kind else {
            return Ok(());
        };
        for branch in branches {
            let node = self.get(*branch)?;
            if needle.contains(node.name.as_str()) {
                results.push(*branch);
            }
            if let NodeKind::Folder { .. } = node.kind {
                self.search_into(*branch, needle, results)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Node {} no longer exists", id))]
    DanglingError { id: NodeId },
    #[snafu(display("Node {} cannot hold branches", id))]
    NotAFolderError { id: NodeId },
    #[snafu(display("Node {} has no content", id))]
    NotAFileError { id: NodeId },
    #[snafu(display("Node {} is not a branch of {}", id, parent))]
    NotABranchError { id: NodeId, parent: NodeId },
    #[snafu(display("The root folder cannot be deleted"))]
    RootRemovalError,
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::DanglingError { .. } => ErrorKind::DanglingAlias,
            TreeError::NotABranchError { .. } => ErrorKind::NotFound,
            TreeError::RootRemovalError => ErrorKind::NoContext,
            _ => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|id| tree.get(*id).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn new_tree_has_a_lone_root() {
        let tree = Tree::new();
        let root = tree.get(tree.root()).unwrap();

        assert_eq!(root.name(), ROOT_NAME);
        assert_eq!(root.context(), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.address(tree.root()).unwrap(), vec!["root"]);
    }

    #[test]
    fn address_walks_up_to_root() {
        let mut tree = Tree::new();
        let docs = tree.populate(tree.root(), "docs", NodeSpec::Folder).unwrap();
        let readme = tree
            .populate(docs, "readme", NodeSpec::File("hello".into()))
            .unwrap();

        assert_eq!(tree.address(readme).unwrap(), vec!["root", "docs", "readme"]);
        assert_eq!(tree.address_string(readme).unwrap(), "root:docs:readme");
        assert_eq!(tree.get(readme).unwrap().content(), Some("hello"));
    }

    #[test]
    fn populate_into_file_fails() {
        let mut tree = Tree::new();
        let file = tree
            .populate(tree.root(), "a", NodeSpec::File(String::new()))
            .unwrap();

        let result = tree.populate(file, "b", NodeSpec::Folder);
        assert!(matches!(result, Err(TreeError::NotAFolderError { .. })));
    }

    #[test]
    fn resolve_names_reports_unmatched_in_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.populate(root, "a", NodeSpec::Folder).unwrap();
        let b = tree.populate(root, "b", NodeSpec::File(String::new())).unwrap();

        let (matches, unmatched) = tree.resolve_names(root, &["b", "zz", "a", "yy"]).unwrap();

        assert_eq!(matches, vec![b, a]);
        assert_eq!(unmatched, vec!["zz", "yy"]);
    }

    #[test]
    fn unique_name_appends_suffix_until_free() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.populate(root, "a", NodeSpec::Folder).unwrap();
        tree.populate(root, "a_o", NodeSpec::Folder).unwrap();

        assert_eq!(tree.unique_name(root, "a", "_o").unwrap(), "a_o_o");
        assert_eq!(tree.unique_name(root, "b", "_o").unwrap(), "b");
    }

    #[test]
    fn remove_frees_the_owned_subtree_only() {
        let mut tree = Tree::new();
        let root = tree.root();
        let docs = tree.populate(root, "docs", NodeSpec::Folder).unwrap();
        let inner = tree.populate(docs, "inner", NodeSpec::Folder).unwrap();
        let leaf = tree.populate(inner, "leaf", NodeSpec::File("x".into())).unwrap();
        let keep = tree.populate(root, "keep", NodeSpec::Folder).unwrap();
        let link = tree.populate(docs, "link", NodeSpec::Shortcut(keep)).unwrap();

        tree.remove(root, docs).unwrap();

        assert!(!tree.contains(docs));
        assert!(!tree.contains(inner));
        assert!(!tree.contains(leaf));
        assert!(!tree.contains(link));
        assert!(tree.contains(keep));
        assert_eq!(tree.children(root).unwrap(), vec![keep]);
    }

    #[test]
    fn removing_a_target_leaves_shortcut_dangling() {
        let mut tree = Tree::new();
        let root = tree.root();
        let target = tree.populate(root, "target", NodeSpec::Folder).unwrap();
        let link = tree.populate(root, "link", NodeSpec::Shortcut(target)).unwrap();

        tree.remove(root, target).unwrap();

        let alias = tree.get(link).unwrap().alias().unwrap();
        assert!(matches!(tree.get(alias), Err(TreeError::DanglingError { .. })));
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert!(matches!(
            tree.remove(root, root),
            Err(TreeError::RootRemovalError)
        ));
    }

    #[test]
    fn copy_into_copies_subtree_and_keeps_aliases() {
        let mut tree = Tree::new();
        let root = tree.root();
        let target = tree.populate(root, "target", NodeSpec::Folder).unwrap();
        let src = tree.populate(root, "src", NodeSpec::Folder).unwrap();
        tree.populate(src, "f", NodeSpec::File("body".into())).unwrap();
        tree.populate(src, "s", NodeSpec::Shortcut(target)).unwrap();
        let before = tree.len();

        let copy = tree.copy_into(src, root, "src_c").unwrap();

        assert_eq!(tree.len(), before + 3);
        assert_eq!(tree.get(copy).unwrap().context(), Some(root));
        let branches = tree.children(copy).unwrap();
        assert_eq!(names(&tree, &branches), vec!["f", "s"]);
        assert_eq!(tree.get(branches[0]).unwrap().content(), Some("body"));
        assert_eq!(tree.get(branches[1]).unwrap().alias(), Some(target));
        assert_eq!(tree.get(branches[0]).unwrap().context(), Some(copy));
    }

    #[test]
    fn clone_folder_into_itself_terminates() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.populate(root, "a", NodeSpec::Folder).unwrap();
        tree.populate(a, "x", NodeSpec::File(String::new())).unwrap();

        let copy = tree.copy_into(a, a, "a_c").unwrap();

        assert_eq!(names(&tree, &tree.children(a).unwrap()), vec!["x", "a_c"]);
        assert_eq!(names(&tree, &tree.children(copy).unwrap()), vec!["x"]);
    }

    #[test]
    fn search_matches_names_contained_in_needle() {
        let mut tree = Tree::new();
        let root = tree.root();
        let docs = tree.populate(root, "docs", NodeSpec::Folder).unwrap();
        let notes = tree.populate(docs, "notes", NodeSpec::File(String::new())).unwrap();
        let note = tree.populate(root, "note", NodeSpec::File(String::new())).unwrap();
        tree.populate(root, "other", NodeSpec::File(String::new())).unwrap();

        let results = tree.search(root, "notes").unwrap();

        assert_eq!(results, vec![notes, note]);
    }

    #[test]
    fn content_edits_apply_to_files_only() {
        let mut tree = Tree::new();
        let root = tree.root();
        let file = tree.populate(root, "f", NodeSpec::File("a".into())).unwrap();

        tree.append_content(file, "b").unwrap();
        assert_eq!(tree.get(file).unwrap().content(), Some("ab"));
        tree.set_content(file, "c").unwrap();
        assert_eq!(tree.get(file).unwrap().content(), Some("c"));
        assert!(matches!(
            tree.set_content(root, "x"),
            Err(TreeError::NotAFileError { .. })
        ));
    }
}
