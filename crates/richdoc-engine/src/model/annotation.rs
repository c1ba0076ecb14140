use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::model::ModelError;
use crate::model::element::Attributes;

/// An inline style span model: a type tag plus attributes, no state.
///
/// Annotations apply to ranges of the linear buffer independent of the node
/// tree; all type-specific behavior lives in the renderer the factory
/// produces for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
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
}

/// The markup a renderer projects for its annotation: an element tag plus
/// string attributes, in deterministic (sorted) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl MarkupSpan {
    /// Serialize as an HTML element around `text`. Attribute values and text
    /// content are escaped; attribute order follows the sorted map.
    pub fn to_html(&self, text: &str) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(&html_escape::encode_text(text));
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        out
    }
}

/// A renderer bound to one annotation model. Output must deterministically
/// reflect the model's attributes; there is no defaulting here beyond what
/// the factory merged in at construction.
pub trait AnnotationRenderer: fmt::Debug {
    fn markup(&self) -> MarkupSpan;

    fn render(&self, text: &str) -> String {
        self.markup().to_html(text)
    }
}

/// Constructor registered per annotation tag. The factory hands it the model
/// with the type's default attributes already merged in.
pub type RendererCtor = fn(Annotation) -> Box<dyn AnnotationRenderer>;

#[derive(Debug)]
struct AnnotationEntry {
    defaults: Attributes,
    ctor: RendererCtor,
}

/// Factory keyed by annotation tag: the single dispatch point for
/// annotation behavior. No code outside the factory branches on annotation
/// type names; new types extend the system purely by registration.
#[derive(Debug, Default)]
pub struct AnnotationFactory {
    entries: HashMap<String, AnnotationEntry>,
}

impl AnnotationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag. Re-registering replaces the previous entry, same as
    /// the type registry.
    pub fn register(&mut self, name: impl Into<String>, defaults: Attributes, ctor: RendererCtor) {
        self.entries
            .insert(name.into(), AnnotationEntry { defaults, ctor });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Produce a renderer bound to `model`. Declared defaults fill in any
    /// attribute the model lacks; the model's own values win.
    pub fn create(&self, model: &Annotation) -> Result<Box<dyn AnnotationRenderer>, ModelError> {
        let entry = self
            .entries
            .get(&model.name)
            .ok_or_else(|| ModelError::UnknownType {
                tag: model.name.clone(),
            })?;
        let mut attributes = entry.defaults.clone();
        attributes.extend(model.attributes.clone());
        Ok((entry.ctor)(Annotation {
            name: model.name.clone(),
            attributes,
        }))
    }
}

static ANNOTATIONS: Lazy<RwLock<AnnotationFactory>> =
    Lazy::new(|| RwLock::new(AnnotationFactory::new()));

/// Register an annotation tag in the process-wide factory.
pub fn register_annotation(name: impl Into<String>, defaults: Attributes, ctor: RendererCtor) {
    ANNOTATIONS
        .write()
        .expect("annotation factory lock poisoned")
        .register(name, defaults, ctor);
}

/// Produce a renderer from the process-wide factory.
pub fn create_renderer(model: &Annotation) -> Result<Box<dyn AnnotationRenderer>, ModelError> {
    ANNOTATIONS
        .read()
        .expect("annotation factory lock poisoned")
        .create(model)
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Anchor-like inline wrapper; `href` is copied from the model untouched.
#[derive(Debug)]
struct LinkRenderer {
    model: Annotation,
}

impl AnnotationRenderer for LinkRenderer {
    fn markup(&self) -> MarkupSpan {
        let mut attributes = BTreeMap::new();
        attributes.insert("class".to_string(), "richdoc-annotation-link".to_string());
        if let Some(href) = self.model.attribute("href") {
            attributes.insert("href".to_string(), attribute_text(href));
        }
        MarkupSpan {
            tag: "a".to_string(),
            attributes,
        }
    }
}

/// Plain text-style wrapper (`<b>`, `<i>`, `<code>`): tag varies, no
/// attributes beyond the styling class.
#[derive(Debug)]
struct TextStyleRenderer {
    model: Annotation,
    tag: &'static str,
}

impl AnnotationRenderer for TextStyleRenderer {
    fn markup(&self) -> MarkupSpan {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "class".to_string(),
            format!("richdoc-annotation-{}", self.model.name),
        );
        MarkupSpan {
            tag: self.tag.to_string(),
            attributes,
        }
    }
}

pub(crate) fn link_renderer(model: Annotation) -> Box<dyn AnnotationRenderer> {
    Box::new(LinkRenderer { model })
}

pub(crate) fn bold_renderer(model: Annotation) -> Box<dyn AnnotationRenderer> {
    Box::new(TextStyleRenderer { model, tag: "b" })
}

pub(crate) fn italic_renderer(model: Annotation) -> Box<dyn AnnotationRenderer> {
    Box::new(TextStyleRenderer { model, tag: "i" })
}

pub(crate) fn code_renderer(model: Annotation) -> Box<dyn AnnotationRenderer> {
    Box::new(TextStyleRenderer { model, tag: "code" })
}

/// Stable identifier for an applied annotation span; survives buffer edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanId(Uuid);

impl SpanId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// An annotation applied to a half-open range `[start, end)` of the linear
/// buffer. Spans are independent of the node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSpan {
    pub id: SpanId,
    pub range: Range<usize>,
    pub annotation: Annotation,
}

/// Map a span range through a buffer splice that replaced `replaced` with
/// `inserted` positions. Positions past the splice shift by the delta;
/// positions inside it are clamped into the replacement.
pub(crate) fn transform_range(
    range: Range<usize>,
    replaced: &Range<usize>,
    inserted: usize,
) -> Range<usize> {
    let delta = inserted as isize - replaced.len() as isize;
    let map = |position: usize| -> usize {
        if position <= replaced.start {
            position
        } else if position >= replaced.end {
            (position as isize + delta) as usize
        } else {
            (position - replaced.start).min(inserted) + replaced.start
        }
    };
    let start = map(range.start);
    let end = map(range.end).max(start);
    start..end
}
