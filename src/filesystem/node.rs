use derive_more::Display;

/// Stable handle to a slot in the [`Tree`](super::Tree) arena.
///
/// Slots are never reused, so a handle to a deleted node stays dangling
/// instead of silently pointing at an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("node#{_0}")]
pub struct NodeId(pub(super) usize);

/// The closed set of node kinds, without their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKindTag {
    #[display("file")]
    File,
    #[display("folder")]
    Folder,
    #[display("shortcut")]
    Shortcut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File { content: String },
    /// Owns every node listed in `branches`.
    Folder { branches: Vec<NodeId> },
    /// Refers to `alias` without owning it; the target keeps its own context.
    Shortcut { alias: NodeId },
}

impl NodeKind {
    pub fn tag(&self) -> NodeKindTag {
        match self {
            NodeKind::File { .. } => NodeKindTag::File,
            NodeKind::Folder { .. } => NodeKindTag::Folder,
            NodeKind::Shortcut { .. } => NodeKindTag::Shortcut,
        }
    }
}

/// What to build when populating a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    File(String),
    Folder,
    Shortcut(NodeId),
}

impl NodeSpec {
    pub fn tag(&self) -> NodeKindTag {
        match self {
            NodeSpec::File(_) => NodeKindTag::File,
            NodeSpec::Folder => NodeKindTag::Folder,
            NodeSpec::Shortcut(_) => NodeKindTag::Shortcut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(super) name: String,
    pub(super) context: Option<NodeId>,
    pub(super) kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enclosing folder. Only the root has none.
    pub fn context(&self) -> Option<NodeId> {
        self.context
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn tag(&self) -> NodeKindTag {
        self.kind.tag()
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Shortcut { alias } => Some(alias),
            _ => None,
        }
    }

    /// Folders and shortcuts can become the current location, files cannot.
    pub fn is_enterable(&self) -> bool {
        !matches!(self.kind, NodeKind::File { .. })
    }
}
