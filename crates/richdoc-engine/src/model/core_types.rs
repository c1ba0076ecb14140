//! Built-in node and annotation types.
//!
//! Registration is idempotent: descriptors are plain data and re-registering
//! a tag replaces it with identical content, so this is safe to call from
//! any entry point that needs the built-ins present.

use serde_json::json;

use crate::model::annotation::{
    self, bold_renderer, code_renderer, italic_renderer, link_renderer,
};
use crate::model::descriptor::{HashObject, TypeDescriptor};
use crate::model::element::{Attributes, Element};
use crate::model::registry;

/// Register the built-in node types and annotations.
pub fn register_core_types() {
    registry::register(TypeDescriptor {
        is_wrapped: false,
        parent_node_types: Some(vec![]),
        ..TypeDescriptor::new("document")
    });
    registry::register(TypeDescriptor {
        can_contain_content: true,
        ..TypeDescriptor::new("paragraph")
    });
    registry::register(TypeDescriptor {
        can_contain_content: true,
        default_attributes: [("level".to_string(), json!(1))].into(),
        ..TypeDescriptor::new("heading")
    });
    registry::register(TypeDescriptor {
        can_contain_content: true,
        has_significant_whitespace: true,
        ..TypeDescriptor::new("preformatted")
    });
    registry::register(TypeDescriptor {
        child_node_types: Some(vec!["list_item".to_string()]),
        ..TypeDescriptor::new("list")
    });
    registry::register(TypeDescriptor {
        parent_node_types: Some(vec!["list".to_string()]),
        suggested_parent_node_types: Some(vec!["list".to_string()]),
        ..TypeDescriptor::new("list_item")
    });
    registry::register(TypeDescriptor {
        is_content: true,
        is_wrapped: false,
        child_node_types: Some(vec![]),
        ..TypeDescriptor::new("text")
    });
    registry::register(TypeDescriptor {
        is_content: true,
        handles_own_children: true,
        child_node_types: Some(vec![]),
        hash_object: alien_hash,
        ..TypeDescriptor::new("alien_inline")
    });
    registry::register(TypeDescriptor {
        is_internal: true,
        ..TypeDescriptor::new("internal_list")
    });

    annotation::register_annotation("link", Attributes::new(), link_renderer);
    annotation::register_annotation("bold", Attributes::new(), bold_renderer);
    annotation::register_annotation("italic", Attributes::new(), italic_renderer);
    annotation::register_annotation("code", Attributes::new(), code_renderer);
}

/// Alien content is identified by its raw markup alone; other attributes are
/// converter bookkeeping and don't contribute to structural identity.
fn alien_hash(element: &Element) -> HashObject {
    HashObject {
        node_type: element.node_type.clone(),
        attributes: element
            .attributes
            .iter()
            .filter(|(key, _)| key.as_str() == "html")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}
