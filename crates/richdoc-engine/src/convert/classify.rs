/// Context the DOM converter exposes while walking a document.
///
/// The converter owns the walk; the classifier only reads these three facts
/// to resolve inline-vs-block ambiguity for a converted fragment.
pub trait ConverterContext {
    /// Whether the current position expects inline content.
    fn is_expecting_content(&self) -> bool;
    /// Whether the walk is inside a generated wrapper paragraph.
    fn is_in_wrapper(&self) -> bool;
    /// Whether that wrapper may be closed at this point.
    fn can_close_wrapper(&self) -> bool;
}

/// HTML tags rendered as blocks. Anything not listed is treated as inline.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "center",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Whether `tag` is a block-level tag. Matching is case-insensitive.
pub fn is_block_tag(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    BLOCK_TAGS.contains(&tag.as_str())
}

/// Decide whether a converted fragment must become an inline (content) node.
///
/// Context constraints always override tag-name inference:
/// 1. expecting inline content outside a wrapper forces inline;
/// 2. a wrapper that cannot be closed here forces inline (emitting a block
///    would break the open wrapper);
/// 3. otherwise the fragment is inline iff every top-level source tag is
///    inline-level.
pub fn must_be_inline(tags: &[&str], context: &dyn ConverterContext) -> bool {
    (context.is_expecting_content() && !context.is_in_wrapper())
        || (context.is_in_wrapper() && !context.can_close_wrapper())
        || tags.iter().all(|tag| !is_block_tag(tag))
}
