use std::fmt;
use std::ops::Range;

use crate::model::ModelError;
use crate::model::descriptor::HashObject;
use crate::model::element::{Attributes, Element};
use crate::model::events::{Listener, NodeEvent};
use crate::model::node::Node;
use crate::model::registry;

/// Index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The node tree: an index over the linear buffer.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]; the parent
/// link is a plain back-index, so there are no ownership cycles. Detached
/// subtrees stay in the arena but are unreachable from the root; their ids
/// must not be handed back to the tree.
///
/// Lengths are the only derived state the tree maintains: every mutation of
/// the underlying buffer reports its length delta explicitly through
/// [`set_length`](DocumentTree::set_length) /
/// [`adjust_length`](DocumentTree::adjust_length), and the change propagates
/// through the parent chain. Offsets and ranges are always recomputed from
/// tree position, never cached.
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
    listeners: Vec<Listener>,
}

impl DocumentTree {
    /// Create a tree holding only its root node. Fails if the root element's
    /// type is not registered.
    pub fn new(root_element: Element) -> Result<Self, ModelError> {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            listeners: Vec::new(),
        };
        tree.root = tree.create_node(root_element, 0)?;
        Ok(tree)
    }

    /// Create a detached node. The type tag is resolved against the registry
    /// here; an unknown tag fails this node's construction only. Default
    /// attributes declared by the type fill in any keys the element lacks.
    pub fn create_node(&mut self, element: Element, length: usize) -> Result<NodeId, ModelError> {
        let descriptor = registry::lookup(&element.node_type)?;
        let mut element = element;
        for (key, value) in &descriptor.default_attributes {
            element
                .attributes
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            element,
            descriptor,
            length,
            parent: None,
            children: Vec::new(),
        });
        Ok(id)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node. Panics on a stale or foreign id; handing such an id to
    /// the tree is a precondition violation.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes ever created in this tree, including detached ones.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Register an observer for node events. Listeners are invoked in
    /// registration order, synchronously, before the mutating call returns.
    pub fn observe(&mut self, listener: impl FnMut(NodeId, &NodeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Inner length of a node.
    pub fn length(&self, id: NodeId) -> usize {
        self.node(id).length
    }

    /// Outer length: inner length plus two wrapper marker positions when the
    /// node's type is wrapped.
    pub fn outer_length(&self, id: NodeId) -> usize {
        self.node(id).outer_length()
    }

    /// Offset of the node in the linear buffer. A node with no parent is at
    /// offset 0; otherwise the offset is recomputed by walking the tree.
    pub fn offset(&self, id: NodeId) -> usize {
        let Some(parent) = self.node(id).parent else {
            return 0;
        };
        let mut offset = self.offset(parent);
        if self.node(parent).is_wrapped() {
            offset += 1;
        }
        for &sibling in self.node(parent).children() {
            if sibling == id {
                break;
            }
            offset += self.outer_length(sibling);
        }
        offset
    }

    /// Content-only range of the node: skips the open marker when wrapped.
    pub fn range(&self, id: NodeId) -> Range<usize> {
        let mut offset = self.offset(id);
        if self.node(id).is_wrapped() {
            offset += 1;
        }
        offset..offset + self.node(id).length
    }

    /// Range of the node including wrapper markers.
    pub fn outer_range(&self, id: NodeId) -> Range<usize> {
        let offset = self.offset(id);
        offset..offset + self.outer_length(id)
    }

    /// Set the inner length of a node and propagate the difference up the
    /// parent chain.
    ///
    /// The whole chain is validated before anything is assigned, so a failing
    /// call leaves every length unchanged and emits no events. On success,
    /// each affected node gets a `LengthChange` followed by an `Update`,
    /// root-most node first.
    ///
    /// This only synchronizes the tree after a change to the underlying
    /// buffer; it does not touch the buffer itself.
    pub fn set_length(&mut self, id: NodeId, new_length: isize) -> Result<(), ModelError> {
        if new_length < 0 {
            return Err(ModelError::InvalidLength {
                requested: new_length,
            });
        }
        let diff = new_length - self.node(id).length as isize;

        let mut chain = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        for &ancestor in &chain[1..] {
            let adjusted = self.node(ancestor).length as isize + diff;
            if adjusted < 0 {
                return Err(ModelError::InvalidLength { requested: adjusted });
            }
        }

        self.nodes[id.0].length = new_length as usize;
        for &ancestor in &chain[1..] {
            let length = self.nodes[ancestor.0].length as isize + diff;
            self.nodes[ancestor.0].length = length as usize;
        }

        let mut events = Vec::with_capacity(chain.len() * 2);
        for &affected in chain.iter().rev() {
            events.push((affected, NodeEvent::LengthChange { diff }));
            events.push((affected, NodeEvent::Update));
        }
        self.dispatch(&events);
        Ok(())
    }

    /// Adjust the inner length of a node by a delta. Same contract as
    /// [`set_length`](DocumentTree::set_length).
    pub fn adjust_length(&mut self, id: NodeId, delta: isize) -> Result<(), ModelError> {
        self.set_length(id, self.node(id).length as isize + delta)
    }

    /// Attach a detached node as a child of `parent` at `index`. The parent
    /// chain grows by the child's outer length.
    pub fn attach(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), ModelError> {
        debug_assert!(
            self.node(child).parent.is_none(),
            "attach of an already-attached node"
        );
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
        let added = self.outer_length(child) as isize;
        self.adjust_length(parent, added)
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), ModelError> {
        let index = self.node(parent).children().len();
        self.attach(parent, index, child)
    }

    /// Detach a node from its parent. The parent chain shrinks by the
    /// subtree's outer length. Detaching a parentless node is a no-op.
    pub fn detach(&mut self, child: NodeId) -> Result<(), ModelError> {
        let Some(parent) = self.node(child).parent else {
            return Ok(());
        };
        let removed = self.outer_length(child) as isize;
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        self.adjust_length(parent, -removed)
    }

    /// Check for an ancestor (including the node itself) whose type matches
    /// `node_type`. When `attributes` is given, every key must be strictly
    /// equal on the matched ancestor; a missing key counts as a mismatch.
    /// The walk stops at the first type match.
    pub fn has_matching_ancestor(
        &self,
        id: NodeId,
        node_type: &str,
        attributes: Option<&Attributes>,
    ) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.node(node).node_type() == node_type {
                if let Some(expected) = attributes {
                    return expected
                        .iter()
                        .all(|(key, value)| self.node(node).attribute(key) == Some(value));
                }
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    /// Whether two nodes may be coalesced into one logical unit by an edit
    /// operation (e.g. joining paragraphs on backward-delete).
    ///
    /// A content node compared against a content container is substituted
    /// with its parent first, so a bare inline node compares against the
    /// block that would contain it. Then both sides walk upward in lock-step:
    /// reaching the root sentinel on one side only (unequal depth) or a type
    /// mismatch at any step means the nodes are not mergeable.
    pub fn can_be_merged_with(&self, node: NodeId, other: NodeId) -> bool {
        let mut left = Some(node);
        let mut right = Some(other);

        if self.node(node).can_contain_content() && self.node(other).is_content() {
            right = self.node(other).parent;
        } else if self.node(other).can_contain_content() && self.node(node).is_content() {
            left = self.node(node).parent;
        }

        while left != right {
            match (left, right) {
                (Some(l), Some(r)) => {
                    if self.node(l).node_type() != self.node(r).node_type() {
                        return false;
                    }
                    left = self.node(l).parent;
                    right = self.node(r).parent;
                }
                _ => return false,
            }
        }
        true
    }

    /// Hash object of a node's own element, per its type's hash function.
    pub fn hash_object(&self, id: NodeId) -> HashObject {
        self.node(id).hash_object()
    }

    fn dispatch(&mut self, events: &[(NodeId, NodeEvent)]) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        for (id, event) in events {
            for listener in listeners.iter_mut() {
                listener(*id, event);
            }
        }
        self.listeners = listeners;
    }
}

impl fmt::Debug for DocumentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTree")
            .field("nodes", &self.nodes)
            .field("root", &self.root)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
