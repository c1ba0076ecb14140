pub mod convert;
pub mod model;

// Re-export key types for easier usage
pub use convert::{ConverterContext, must_be_inline};
pub use model::{
    Annotation, AnnotationFactory, AnnotationRenderer, AnnotationSpan, Attributes, Document,
    DocumentTree, Element, HashObject, LinearItem, ModelError, Node, NodeEvent, NodeId, SpanId,
    TypeDescriptor, TypeRegistry, register_core_types,
};
