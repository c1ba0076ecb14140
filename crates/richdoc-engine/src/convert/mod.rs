//! Contracts consumed by the DOM conversion pipeline.
//!
//! The converter itself lives outside the model; this module only fixes the
//! one decision the converter delegates back: whether a converted fragment
//! must be represented as an inline (content) node in its current context.

pub mod classify;

pub use classify::{ConverterContext, is_block_tag, must_be_inline};
