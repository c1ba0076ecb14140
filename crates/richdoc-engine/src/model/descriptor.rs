use serde::Serialize;

use crate::model::element::{Attributes, Element};

/// Derives the hash object for an element of a given type. Overridable per
/// registered type so that types with synthetic attributes can control their
/// structural identity.
pub type HashObjectFn = fn(&Element) -> HashObject;

/// Static metadata describing the structural capabilities of a registered
/// node or annotation type.
///
/// A descriptor is pure data: generic tree code consults it instead of
/// branching on type names, and new types extend the model by registering a
/// conforming descriptor.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Registered type tag.
    pub name: String,
    /// If true, this type converts/renders its entire subtree itself; the
    /// generic conversion walk must not recurse into its children.
    pub handles_own_children: bool,
    /// Internal types are excluded from conversion entirely.
    pub is_internal: bool,
    /// Whether the linear model reserves an open and a close marker position
    /// around this node's content. Most types are wrapped.
    pub is_wrapped: bool,
    /// Content (inline) node: cannot have children and may only appear as a
    /// child of a content container.
    pub is_content: bool,
    /// Whether children of this type must all be content nodes.
    pub can_contain_content: bool,
    /// Disables whitespace normalization inside this subtree. Only meaningful
    /// together with `can_contain_content`.
    pub has_significant_whitespace: bool,
    /// Allowed child types. `None` = unrestricted, `Some(empty)` = no
    /// children allowed.
    pub child_node_types: Option<Vec<String>>,
    /// Allowed parent types. `None` = unrestricted, `Some(empty)` = cannot be
    /// a child of anything.
    pub parent_node_types: Option<Vec<String>>,
    /// Parent types the editor will allow but avoid creating.
    pub suggested_parent_node_types: Option<Vec<String>>,
    /// Attributes filled in for newly created elements that don't carry them.
    pub default_attributes: Attributes,
    /// Structural-identity derivation for elements of this type.
    pub hash_object: HashObjectFn,
}

impl TypeDescriptor {
    /// Descriptor with the default capability set: wrapped, non-content,
    /// unrestricted children/parents, default hashing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handles_own_children: false,
            is_internal: false,
            is_wrapped: true,
            is_content: false,
            can_contain_content: false,
            has_significant_whitespace: false,
            child_node_types: None,
            parent_node_types: None,
            suggested_parent_node_types: None,
            default_attributes: Attributes::new(),
            hash_object: default_hash_object,
        }
    }

    /// Whether this type admits children at all (`Some(empty)` child list
    /// means none).
    pub fn can_have_children(&self) -> bool {
        !matches!(&self.child_node_types, Some(types) if types.is_empty())
    }

    /// Whether this type admits children but neither is content nor contains
    /// content.
    pub fn can_have_children_not_content(&self) -> bool {
        self.can_have_children() && !self.is_content && !self.can_contain_content
    }
}

/// Structural-equality key for an element: its type and attributes, with
/// attribute order fixed by the sorted map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashObject {
    pub node_type: String,
    pub attributes: Attributes,
}

impl HashObject {
    /// Canonical string form, usable as a map key for diffing and
    /// deduplication. Stable across calls because attributes are sorted.
    pub fn key(&self) -> String {
        serde_json::to_string(self).expect("hash object serialization cannot fail")
    }
}

/// Default hash derivation: the element's own type and attributes, untouched.
pub fn default_hash_object(element: &Element) -> HashObject {
    HashObject {
        node_type: element.node_type.clone(),
        attributes: element.attributes.clone(),
    }
}
