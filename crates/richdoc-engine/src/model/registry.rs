use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::model::ModelError;
use crate::model::descriptor::TypeDescriptor;

/// Registry mapping type tags to their descriptors.
///
/// Registration is append-only: there is no unregister, and re-registering a
/// tag replaces the previous descriptor. Last-wins replacement is the
/// supported override mechanism for extensions.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    descriptors: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: TypeDescriptor) {
        debug_assert!(
            !descriptor.has_significant_whitespace || descriptor.can_contain_content,
            "has_significant_whitespace is only valid on content containers ({})",
            descriptor.name
        );
        self.descriptors
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    pub fn lookup(&self, tag: &str) -> Result<Arc<TypeDescriptor>, ModelError> {
        self.descriptors
            .get(tag)
            .cloned()
            .ok_or_else(|| ModelError::UnknownType {
                tag: tag.to_string(),
            })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.descriptors.contains_key(tag)
    }

    /// Whether nodes of `tag` admit children at all.
    pub fn can_have_children(&self, tag: &str) -> Result<bool, ModelError> {
        Ok(self.lookup(tag)?.can_have_children())
    }

    /// Whether nodes of `tag` admit children but neither are content nor
    /// contain content.
    pub fn can_have_children_not_content(&self, tag: &str) -> Result<bool, ModelError> {
        Ok(self.lookup(tag)?.can_have_children_not_content())
    }
}

static NODE_TYPES: Lazy<RwLock<TypeRegistry>> = Lazy::new(|| RwLock::new(TypeRegistry::new()));

/// Register a descriptor in the process-wide registry.
pub fn register(descriptor: TypeDescriptor) {
    NODE_TYPES
        .write()
        .expect("type registry lock poisoned")
        .register(descriptor);
}

/// Look up a descriptor in the process-wide registry.
pub fn lookup(tag: &str) -> Result<Arc<TypeDescriptor>, ModelError> {
    NODE_TYPES
        .read()
        .expect("type registry lock poisoned")
        .lookup(tag)
}

pub fn contains(tag: &str) -> bool {
    NODE_TYPES
        .read()
        .expect("type registry lock poisoned")
        .contains(tag)
}

pub fn can_have_children(tag: &str) -> Result<bool, ModelError> {
    NODE_TYPES
        .read()
        .expect("type registry lock poisoned")
        .can_have_children(tag)
}

pub fn can_have_children_not_content(tag: &str) -> Result<bool, ModelError> {
    NODE_TYPES
        .read()
        .expect("type registry lock poisoned")
        .can_have_children_not_content(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("paragraph"));

        let descriptor = registry.lookup("paragraph").unwrap();
        assert_eq!(descriptor.name, "paragraph");
        assert!(registry.contains("paragraph"));
    }

    #[test]
    fn test_lookup_unknown_tag_fails() {
        let registry = TypeRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert!(matches!(err, ModelError::UnknownType { ref tag } if tag == "nope"));
        assert_eq!(err.to_string(), "unknown type: nope");
    }

    #[test]
    fn test_reregistration_last_wins() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("figure"));
        registry.register(TypeDescriptor {
            default_attributes: [("align".to_string(), json!("center"))].into(),
            ..TypeDescriptor::new("figure")
        });

        let descriptor = registry.lookup("figure").unwrap();
        assert_eq!(
            descriptor.default_attributes.get("align"),
            Some(&json!("center"))
        );
    }

    #[test]
    fn test_derived_child_queries() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor {
            can_contain_content: true,
            ..TypeDescriptor::new("paragraph")
        });
        registry.register(TypeDescriptor {
            is_content: true,
            is_wrapped: false,
            child_node_types: Some(vec![]),
            ..TypeDescriptor::new("text")
        });
        registry.register(TypeDescriptor {
            child_node_types: Some(vec!["list_item".to_string()]),
            ..TypeDescriptor::new("list")
        });

        assert!(registry.can_have_children("paragraph").unwrap());
        assert!(!registry.can_have_children("text").unwrap());
        assert!(registry.can_have_children("list").unwrap());

        assert!(!registry.can_have_children_not_content("paragraph").unwrap());
        assert!(!registry.can_have_children_not_content("text").unwrap());
        assert!(registry.can_have_children_not_content("list").unwrap());

        assert!(registry.can_have_children("missing").is_err());
    }
}
