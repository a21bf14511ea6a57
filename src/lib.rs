//! A two-layer Markdown tokenizer with pluggable renderers.
//!
//! Input text is split by a line-oriented block tokenizer into a tree of
//! block tokens; each inline-bearing block lazily splits its text into span
//! tokens. Renderers walk the tree through a per-variant dispatch and
//! produce their output format — HTML and JIRA wiki markup ship here, and
//! the [`renderer::Renderer`] trait is the contract for any other.
//!
//! ```
//! use tokenmark::markdown_to_html;
//!
//! assert_eq!(
//!     markdown_to_html("Hello, **世界**!\n"),
//!     "<p>Hello, <strong>世界</strong>!\n</p>\n"
//! );
//! ```
//!
//! Parsing is total: every input produces a document, with the paragraph
//! and raw-text fallbacks absorbing whatever no other matcher claims.
//!
//! ```
//! use tokenmark::{parse_document, renderer::Renderer};
//! use tokenmark::jira::JiraRenderer;
//!
//! let doc = parse_document("## h2 heading\n");
//! assert!(doc.contains("h2 heading"));
//! assert_eq!(JiraRenderer::new().render(&doc), "h2. h2 heading\n\n");
//! ```

pub mod html;
pub mod inlines;
pub mod jira;
pub mod lines;
pub mod nodes;
pub mod parser;
pub mod renderer;
mod strings;


pub use crate::inlines::tokenize_inner;
pub use crate::nodes::{BlockToken, BlockValue, SpanToken, SpanValue};
pub use crate::parser::{parse_document, parse_document_from_lines, tokenize, BlockTokenizer};

use crate::renderer::Renderer;

/// Parses Markdown and renders it as HTML in one step.
pub fn markdown_to_html(buffer: &str) -> String {
    html::HtmlRenderer::new().render(&parse_document(buffer))
}
