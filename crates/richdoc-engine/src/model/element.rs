use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute map carried by elements and annotations.
///
/// Keys are sorted so that serialized forms (and the hash keys derived from
/// them) are stable across runs.
pub type Attributes = BTreeMap<String, Value>;

/// A typed element as it appears in the linear model: a type tag plus its
/// attribute map. Nodes and open markers both carry one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Registered type tag, e.g. `"paragraph"`.
    pub node_type: String,
    /// Attribute values, e.g. `{"level": 2}` on a heading.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Element {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Deep copy of the element with converter-internal `html/` passthrough
    /// attributes stripped. Clones are what edit operations duplicate, and
    /// passthrough keys must not leak into duplicated elements.
    pub fn cloned(&self) -> Element {
        Element {
            node_type: self.node_type.clone(),
            attributes: self
                .attributes
                .iter()
                .filter(|(key, _)| !key.starts_with("html/"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cloned_strips_html_passthrough_attributes() {
        let element = Element::new("paragraph")
            .with_attribute("align", json!("left"))
            .with_attribute("html/style", json!("color: red"))
            .with_attribute("html/data-x", json!("1"));

        let clone = element.cloned();

        assert_eq!(clone.node_type, "paragraph");
        assert_eq!(clone.attribute("align"), Some(&json!("left")));
        assert_eq!(clone.attribute("html/style"), None);
        assert_eq!(clone.attribute("html/data-x"), None);
    }

    #[test]
    fn test_cloned_preserves_plain_elements() {
        let element = Element::new("heading").with_attribute("level", json!(2));
        assert_eq!(element.cloned(), element);
    }

    #[test]
    fn test_element_round_trips_through_serde() {
        let element = Element::new("heading").with_attribute("level", json!(3));
        let json = serde_json::to_string(&element).unwrap();
        let back: Element = serde_json::from_str(&json).unwrap();
        assert_eq!(back, element);
    }
}
