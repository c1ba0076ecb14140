use std::sync::Arc;

use serde_json::Value;

use crate::model::descriptor::{HashObject, TypeDescriptor};
use crate::model::element::Element;
use crate::model::tree::NodeId;

/// A node in the document tree: an element plus the length of linear content
/// it covers and its position in the tree.
///
/// The descriptor is resolved once at construction (an unknown tag fails the
/// node's construction, not the whole document), so capability queries are
/// infallible afterwards. The parent link is a non-owning index used only for
/// upward traversal and length propagation.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) element: Element,
    pub(crate) descriptor: Arc<TypeDescriptor>,
    pub(crate) length: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn node_type(&self) -> &str {
        &self.element.node_type
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.element.attribute(key)
    }

    /// Inner length: the number of linear positions covered by the node's
    /// content, excluding wrapper markers.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Outer length: inner length plus the two wrapper marker positions when
    /// the type is wrapped.
    pub fn outer_length(&self) -> usize {
        self.length + if self.is_wrapped() { 2 } else { 0 }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Structural-identity key of this node's own element (not the subtree),
    /// derived by the type's hash function.
    pub fn hash_object(&self) -> HashObject {
        (self.descriptor.hash_object)(&self.element)
    }

    pub fn is_wrapped(&self) -> bool {
        self.descriptor.is_wrapped
    }

    pub fn is_content(&self) -> bool {
        self.descriptor.is_content
    }

    pub fn can_contain_content(&self) -> bool {
        self.descriptor.can_contain_content
    }

    pub fn handles_own_children(&self) -> bool {
        self.descriptor.handles_own_children
    }

    pub fn is_internal(&self) -> bool {
        self.descriptor.is_internal
    }

    pub fn has_significant_whitespace(&self) -> bool {
        self.descriptor.has_significant_whitespace
    }

    pub fn can_have_children(&self) -> bool {
        self.descriptor.can_have_children()
    }

    pub fn can_have_children_not_content(&self) -> bool {
        self.descriptor.can_have_children_not_content()
    }

    pub fn child_node_types(&self) -> Option<&[String]> {
        self.descriptor.child_node_types.as_deref()
    }

    pub fn parent_node_types(&self) -> Option<&[String]> {
        self.descriptor.parent_node_types.as_deref()
    }

    pub fn suggested_parent_node_types(&self) -> Option<&[String]> {
        self.descriptor.suggested_parent_node_types.as_deref()
    }
}
