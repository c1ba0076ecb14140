use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::ModelError;
use crate::model::annotation::{Annotation, AnnotationSpan, SpanId, transform_range};
use crate::model::element::Element;
use crate::model::tree::{DocumentTree, NodeId};

/// One position of the linear buffer.
///
/// Wrapped nodes occupy an `Open` and a `Close` marker around their content;
/// unwrapped nodes (text) are represented purely by their content items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinearItem {
    /// Open marker of a wrapped node.
    Open(Element),
    /// Close marker, carrying the type tag it closes.
    Close(String),
    /// One character of content.
    Char(char),
}

/// A document: the linear buffer (source of truth) plus the node tree
/// indexing it and the annotation spans applied over it.
///
/// The tree is never rebuilt from the buffer after construction; every
/// buffer mutation reports its length delta to the covering node explicitly
/// via [`splice`](Document::splice).
#[derive(Debug)]
pub struct Document {
    linear: Vec<LinearItem>,
    tree: DocumentTree,
    annotations: Vec<AnnotationSpan>,
    version: u64,
}

impl Document {
    /// Build a document from linear data.
    ///
    /// Walks the items once, opening a node per `Open` marker and
    /// synthesizing an unwrapped text node for each run of content
    /// characters. Markers must be balanced and every type tag registered
    /// (built-ins via [`register_core_types`](crate::model::core_types::register_core_types));
    /// an unknown tag or a malformed marker sequence fails the whole build.
    pub fn from_linear(items: Vec<LinearItem>) -> anyhow::Result<Self> {
        let mut tree = DocumentTree::new(Element::new("document"))?;
        let mut stack = vec![tree.root()];

        let mut index = 0;
        while index < items.len() {
            match &items[index] {
                LinearItem::Open(element) => {
                    let parent = *stack.last().expect("marker stack holds at least the root");
                    let node = tree.create_node(element.clone(), 0)?;
                    if !tree.node(node).is_wrapped() {
                        return Err(ModelError::UnwrappedMarker {
                            tag: element.node_type.clone(),
                        }
                        .into());
                    }
                    tree.append(parent, node)?;
                    stack.push(node);
                    index += 1;
                }
                LinearItem::Close(tag) => {
                    let top = *stack.last().expect("marker stack holds at least the root");
                    if stack.len() == 1 || tree.node(top).node_type() != tag {
                        return Err(ModelError::UnbalancedMarkers { tag: tag.clone() }.into());
                    }
                    stack.pop();
                    index += 1;
                }
                LinearItem::Char(_) => {
                    let parent = *stack.last().expect("marker stack holds at least the root");
                    if !tree.node(parent).can_contain_content() {
                        return Err(ModelError::OrphanContent { offset: index }.into());
                    }
                    let run_start = index;
                    while index < items.len() && matches!(items[index], LinearItem::Char(_)) {
                        index += 1;
                    }
                    let text = tree.create_node(Element::new("text"), index - run_start)?;
                    tree.append(parent, text)?;
                }
            }
        }

        if stack.len() != 1 {
            let top = *stack.last().expect("marker stack holds at least the root");
            return Err(ModelError::UnbalancedMarkers {
                tag: tree.node(top).node_type().to_string(),
            }
            .into());
        }

        Ok(Self {
            linear: items,
            tree,
            annotations: Vec::new(),
            version: 0,
        })
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn linear(&self) -> &[LinearItem] {
        &self.linear
    }

    pub fn len(&self) -> usize {
        self.linear.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Version counter, bumped on every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Content characters of the buffer, in order, markers skipped.
    pub fn plain_text(&self) -> String {
        self.linear
            .iter()
            .filter_map(|item| match item {
                LinearItem::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Replace `range` of the buffer with `replacement`, reporting the
    /// length delta to `node`, the node whose content covers the edited
    /// range. The tree never re-scans the buffer; this explicit report is
    /// the only synchronization.
    ///
    /// The length update is validated before the buffer is touched, so a
    /// failing call changes nothing. Annotation spans are shifted through
    /// the edit.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        replacement: Vec<LinearItem>,
        node: NodeId,
    ) -> Result<(), ModelError> {
        let inserted = replacement.len();
        let delta = inserted as isize - range.len() as isize;

        self.tree.adjust_length(node, delta)?;
        self.linear.splice(range.clone(), replacement);
        for span in &mut self.annotations {
            span.range = transform_range(span.range.clone(), &range, inserted);
        }
        self.version += 1;
        Ok(())
    }

    /// Apply an annotation over a half-open buffer range.
    pub fn annotate(&mut self, range: Range<usize>, annotation: Annotation) -> SpanId {
        let id = SpanId::new();
        self.annotations.push(AnnotationSpan {
            id,
            range,
            annotation,
        });
        self.version += 1;
        id
    }

    /// Remove an annotation span. Returns whether it existed.
    pub fn clear_annotation(&mut self, id: SpanId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|span| span.id != id);
        let removed = self.annotations.len() != before;
        if removed {
            self.version += 1;
        }
        removed
    }

    pub fn annotations(&self) -> &[AnnotationSpan] {
        &self.annotations
    }

    /// Annotation spans covering `offset`.
    pub fn annotations_at(&self, offset: usize) -> impl Iterator<Item = &AnnotationSpan> {
        self.annotations
            .iter()
            .filter(move |span| span.range.contains(&offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::core_types::register_core_types;
    use serde_json::json;

    fn open(tag: &str) -> LinearItem {
        LinearItem::Open(Element::new(tag))
    }

    fn close(tag: &str) -> LinearItem {
        LinearItem::Close(tag.to_string())
    }

    fn chars(text: &str) -> Vec<LinearItem> {
        text.chars().map(LinearItem::Char).collect()
    }

    fn paragraph(text: &str) -> Vec<LinearItem> {
        let mut items = vec![open("paragraph")];
        items.extend(chars(text));
        items.push(close("paragraph"));
        items
    }

    #[test]
    fn test_from_linear_builds_tree_and_lengths() {
        register_core_types();
        let doc = Document::from_linear(paragraph("abc")).unwrap();

        let tree = doc.tree();
        let root = tree.root();
        assert_eq!(tree.length(root), 5); // open + abc + close
        assert_eq!(tree.node(root).children().len(), 1);

        let paragraph = tree.node(root).children()[0];
        assert_eq!(tree.node(paragraph).node_type(), "paragraph");
        assert_eq!(tree.length(paragraph), 3);
        assert_eq!(tree.outer_length(paragraph), 5);
        assert_eq!(tree.range(paragraph), 1..4);

        let text = tree.node(paragraph).children()[0];
        assert_eq!(tree.node(text).node_type(), "text");
        assert_eq!(tree.length(text), 3);
        assert_eq!(tree.range(text), 1..4);

        assert_eq!(doc.len(), 5);
        assert_eq!(doc.plain_text(), "abc");
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_from_linear_nested_structure() {
        register_core_types();
        let mut items = vec![open("list"), open("list_item")];
        items.extend(paragraph("hi"));
        items.push(close("list_item"));
        items.push(close("list"));

        let doc = Document::from_linear(items).unwrap();
        let tree = doc.tree();
        let root = tree.root();

        // list(2) > list_item(2) > paragraph(2) > "hi"
        assert_eq!(tree.length(root), 8);
        let list = tree.node(root).children()[0];
        let item = tree.node(list).children()[0];
        let paragraph = tree.node(item).children()[0];
        assert_eq!(tree.node(list).node_type(), "list");
        assert_eq!(tree.length(list), 6);
        assert_eq!(tree.length(item), 4);
        assert_eq!(tree.range(paragraph), 3..5);
    }

    #[test]
    fn test_from_linear_rejects_mismatched_close() {
        register_core_types();
        let items = vec![open("paragraph"), close("list")];
        let err = Document::from_linear(items).unwrap_err();
        assert!(err.to_string().contains("unbalanced"));
    }

    #[test]
    fn test_from_linear_rejects_unclosed_open() {
        register_core_types();
        let items = vec![open("paragraph")];
        let err = Document::from_linear(items).unwrap_err();
        assert!(err.to_string().contains("paragraph"));
    }

    #[test]
    fn test_from_linear_rejects_stray_close() {
        register_core_types();
        let items = vec![close("paragraph")];
        assert!(Document::from_linear(items).is_err());
    }

    #[test]
    fn test_from_linear_rejects_unknown_type() {
        register_core_types();
        let items = vec![open("mystery"), close("mystery")];
        let err = Document::from_linear(items).unwrap_err();
        assert!(err.to_string().contains("unknown type"));
    }

    #[test]
    fn test_from_linear_rejects_content_outside_containers() {
        register_core_types();
        // list may not hold bare characters
        let mut items = vec![open("list")];
        items.extend(chars("x"));
        items.push(close("list"));

        let err = Document::from_linear(items).unwrap_err();
        assert!(err.to_string().contains("content container"));
    }

    #[test]
    fn test_splice_reports_delta_to_covering_node() {
        register_core_types();
        let mut doc = Document::from_linear(paragraph("abc")).unwrap();
        let paragraph_node = doc.tree().node(doc.tree().root()).children()[0];
        let text = doc.tree().node(paragraph_node).children()[0];

        // insert two chars inside the paragraph's content
        doc.splice(2..2, chars("xy"), text).unwrap();

        assert_eq!(doc.plain_text(), "axybc");
        assert_eq!(doc.len(), 7);
        assert_eq!(doc.tree().length(text), 5);
        assert_eq!(doc.tree().length(paragraph_node), 5);
        assert_eq!(doc.tree().length(doc.tree().root()), 7);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_failed_splice_changes_nothing() {
        register_core_types();
        let mut doc = Document::from_linear(paragraph("abc")).unwrap();
        let paragraph_node = doc.tree().node(doc.tree().root()).children()[0];
        let text = doc.tree().node(paragraph_node).children()[0];

        // removing four positions from a three-char text node must fail
        let result = doc.splice(1..5, Vec::new(), text);

        assert!(result.is_err());
        assert_eq!(doc.plain_text(), "abc");
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_annotations_shift_through_splices() {
        register_core_types();
        let mut doc = Document::from_linear(paragraph("hello")).unwrap();
        let paragraph_node = doc.tree().node(doc.tree().root()).children()[0];
        let text = doc.tree().node(paragraph_node).children()[0];

        // annotate "ell" (buffer positions 2..5, inside the wrapper)
        let id = doc.annotate(2..5, Annotation::new("bold"));
        assert_eq!(doc.annotations_at(3).count(), 1);

        // insert one char before the span
        doc.splice(1..1, chars("z"), text).unwrap();
        let span = &doc.annotations()[0];
        assert_eq!(span.range, 3..6);
        assert_eq!(span.id, id);

        assert!(doc.clear_annotation(id));
        assert!(!doc.clear_annotation(id));
        assert_eq!(doc.annotations_at(3).count(), 0);
    }

    #[test]
    fn test_annotation_models_keep_attributes() {
        register_core_types();
        let mut doc = Document::from_linear(paragraph("hi")).unwrap();
        doc.annotate(
            1..3,
            Annotation::new("link").with_attribute("href", json!("https://x")),
        );

        let span = &doc.annotations()[0];
        assert_eq!(span.annotation.attribute("href"), Some(&json!("https://x")));
    }
}
