/*!
 * # Structural document model
 *
 * The model keeps two synchronized views of one document:
 *
 * - the **linear buffer**: a flat, offset-addressable sequence of items
 *   (open/close markers and content characters) that is the source of truth
 *   for content, and
 * - the **node tree**: a typed index over that buffer, answering structural
 *   queries (parent, children, containment capabilities) and positional ones
 *   (offset, range, length).
 *
 * Synchronization is one-way and explicit: a buffer mutation reports its
 * length delta to the covering node, and the change propagates up the parent
 * chain. The tree never re-scans the buffer.
 *
 * Node behavior is data-driven. Every type tag resolves to a
 * [`TypeDescriptor`] in the process-wide [`registry`]; generic tree code
 * consults descriptors instead of branching on type names, so new types are
 * pure registrations. Annotations (inline style spans) follow the same
 * pattern through the [`annotation`] factory.
 *
 * ## Module structure
 *
 * - **`element`**: `{type, attributes}` pairs shared by markers and nodes
 * - **`descriptor`** / **`registry`**: per-type capability metadata and its
 *   process-wide registry
 * - **`node`** / **`tree`**: the arena tree with length/offset arithmetic,
 *   merge checking and hashing
 * - **`events`**: synchronous notifications emitted on length mutations
 * - **`annotation`**: annotation models, factory, renderers and spans
 * - **`document`**: the linear buffer plus tree assembly
 * - **`core_types`**: built-in type registrations
 */

pub mod annotation;
pub mod core_types;
pub mod descriptor;
pub mod document;
pub mod element;
pub mod events;
pub mod node;
pub mod registry;
pub mod tree;

pub use annotation::{
    Annotation, AnnotationFactory, AnnotationRenderer, AnnotationSpan, MarkupSpan, SpanId,
};
pub use core_types::register_core_types;
pub use descriptor::{HashObject, TypeDescriptor};
pub use document::{Document, LinearItem};
pub use element::{Attributes, Element};
pub use events::NodeEvent;
pub use node::Node;
pub use registry::TypeRegistry;
pub use tree::{DocumentTree, NodeId};

/// Errors surfaced by the model core.
///
/// Mutations are atomic: a failing call leaves the tree untouched and emits
/// no events. An unknown type is fatal for that element's construction, not
/// for the document as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("length cannot be negative (requested {requested})")]
    InvalidLength { requested: isize },
    #[error("unknown type: {tag}")]
    UnknownType { tag: String },
    #[error("unbalanced structural markers around '{tag}'")]
    UnbalancedMarkers { tag: String },
    #[error("'{tag}' is unwrapped and cannot appear as a marker")]
    UnwrappedMarker { tag: String },
    #[error("content at position {offset} outside a content container")]
    OrphanContent { offset: usize },
}
