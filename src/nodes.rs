//! The Markdown token tree.
//!
//! Every token is one of a closed set of variants, split into two layers:
//! [`BlockValue`] for structural elements and [`SpanValue`] for inline
//! elements. Block children are built during parsing; span children are
//! built lazily from the stored raw text on first access and cached.

use std::cell::OnceCell;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::inlines::SpanRegistry;
use crate::strings;

/// The footnote table of a document: normalized reference key to target.
pub type FootnoteMap = FxHashMap<String, Footnote>;

/// Alignments for the columns of a table, shared with each of its rows.
pub type ColumnAlignments = SmallVec<[TableAlignment; 6]>;

/// The block-level token enum.
#[derive(Debug, Clone)]
pub enum BlockValue {
    /// **Block**. The root of a document. Contains **blocks** and owns the
    /// sole footnote table of its subtree.
    Document(Box<NodeDocument>),

    /// **Block**. An ATX heading (`### heading`). Contains **spans**.
    Heading(NodeHeading),

    /// **Block**. A setext heading: paragraph lines underlined with `=` or
    /// `-`. Contains **spans**.
    SetextHeading(NodeHeading),

    /// **Block**. A paragraph. Contains **spans**.
    Paragraph,

    /// **Block**. A block quote. Contains other **blocks**.
    Quote,

    /// **Block**. A bulleted or ordered list. Contains list items.
    List(NodeList),

    /// **Block**. A list item. Contains other **blocks**.
    ListItem,

    /// **Block**. A fenced code block. Its literal is exposed as a single
    /// verbatim `RawText` child.
    CodeFence(NodeCodeBlock),

    /// **Block**. An indented code block. The language is always empty.
    BlockCode(NodeCodeBlock),

    /// **Block**. A table. Contains table rows; the first row is the header
    /// iff `has_header` is set.
    Table(NodeTable),

    /// **Block**. A table row. Contains table cells and carries the table's
    /// column alignments.
    TableRow(NodeTableRow),

    /// **Block**. A table cell. Contains **spans**.
    TableCell(NodeTableCell),

    /// **Block**. A thematic break. Has no children.
    Separator,

    /// **Block**. A run of link-reference definitions. Contains footnote
    /// entries.
    FootnoteBlock,

    /// **Block**. A single link-reference definition. Has no children.
    FootnoteEntry(NodeFootnoteEntry),

    /// **Block**. Raw block-level HTML, passed through verbatim. Has no
    /// children.
    HtmlBlock(String),
}

/// The span-level token enum.
#[derive(Debug, Clone)]
pub enum SpanValue {
    /// **Span**. Strong emphasis (`**text**` or `__text__`).
    Strong,

    /// **Span**. Emphasis (`*text*` or `_text_`).
    Emphasis,

    /// **Span**. A code span. Its content is a single `RawText` child.
    InlineCode,

    /// **Span**. Struck-through text (`~~text~~`).
    Strikethrough,

    /// **Span**. A link, inline or by reference.
    Link(LinkTarget),

    /// **Span**. An autolink (`<scheme:...>`). The child is the target as
    /// raw text.
    AutoLink(String),

    /// **Span**. An image, inline or by reference. Children form the alt
    /// text.
    Image(LinkTarget),

    /// **Span**. A backslash escape. The child is the escaped character as
    /// raw text.
    EscapeSequence,

    /// **Span**. Plain text. Has no children.
    RawText(String),

    /// **Span**. Raw inline HTML, passed through verbatim. Has no children.
    HtmlSpan(String),

    /// **Span**. A line break; hard when the source line ended with two or
    /// more spaces.
    LineBreak { hard: bool },

    /// **Span**. An extension token produced by a renderer-registered
    /// pattern. Dispatching it to a renderer that did not register a handler
    /// for its name is a programming error.
    Custom(NodeCustomSpan),
}

/// The destination of a link or image.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// `[text](url "title")`: the destination is supplied in place.
    Inline(NodeLink),

    /// `[text][key]`, `[key]`: the destination is looked up in the document
    /// footnote table at render time. `raw` is the matched source text, used
    /// when the key does not resolve.
    Reference { key: String, raw: String },
}

/// The details of a link's destination, or an image's source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeLink {
    /// The URL for the link destination or image source.
    pub url: String,

    /// The title for the link or image. May be empty.
    pub title: String,
}

/// Document-level state: the footnote table.
#[derive(Debug, Clone, Default)]
pub struct NodeDocument {
    /// Link-reference definitions harvested from the whole subtree before
    /// any span tokenization, keyed by normalized label. Later definitions
    /// of the same key win.
    pub footnotes: FootnoteMap,
}

/// A single link-reference target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Footnote {
    pub target: String,
    /// Optional quoted title; empty when absent.
    pub title: String,
}

/// The level of an ATX (1–6) or setext (1–2) heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeading {
    pub level: u8,
}

/// The metadata of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeList {
    /// The ordinal of the first item for ordered lists; `None` for bulleted
    /// lists.
    pub start: Option<u32>,
}

/// The metadata of a fenced or indented code block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeCodeBlock {
    /// The trimmed info string of a fence; always empty for indented code.
    pub language: String,
}

/// The metadata of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    /// Whether the first child row is a header row.
    pub has_header: bool,

    /// Per-column alignment, derived from the delimiter row.
    pub column_align: ColumnAlignments,
}

/// The metadata of a table row.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTableRow {
    /// The owning table's column alignments.
    pub row_align: ColumnAlignments,
}

/// The metadata of a table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTableCell {
    pub align: TableAlignment,
}

/// Alignment of a single table column or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAlignment {
    /// Unaligned; renders left.
    None,

    /// Centered (`:---:`).
    Center,

    /// Right-aligned (`---:`).
    Right,
}

/// A single link-reference definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFootnoteEntry {
    pub key: String,
    pub target: String,
    /// Optional quoted title; empty when absent.
    pub title: String,
}

/// An extension span produced by a renderer-registered pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCustomSpan {
    /// The registered pattern name, used for dispatch.
    pub name: &'static str,

    /// Pattern-defined payload, e.g. a wiki link target.
    pub target: String,
}

#[derive(Debug, Clone)]
enum BlockChildren {
    /// Block-content containers; children built during parsing.
    Blocks(Vec<BlockToken>),

    /// Inline-content blocks; span children built lazily from `raw`.
    Inline(InlineContent),

    /// Code blocks; the literal materializes as one `RawText` child without
    /// pattern scanning.
    Verbatim(InlineContent),

    /// Leaves.
    None,
}

#[derive(Debug, Clone)]
struct InlineContent {
    raw: String,
    spans: OnceCell<Vec<SpanToken>>,
}

impl InlineContent {
    fn new(raw: String) -> InlineContent {
        InlineContent {
            raw,
            spans: OnceCell::new(),
        }
    }
}

/// A block-level token: a tagged value plus its children.
#[derive(Debug, Clone)]
pub struct BlockToken {
    pub value: BlockValue,
    children: BlockChildren,
}

impl BlockToken {
    /// A block-content container.
    pub fn with_blocks(value: BlockValue, children: Vec<BlockToken>) -> BlockToken {
        BlockToken {
            value,
            children: BlockChildren::Blocks(children),
        }
    }

    /// An inline-content block; `raw` is span-tokenized on first child
    /// access.
    pub fn with_inline(value: BlockValue, raw: String) -> BlockToken {
        BlockToken {
            value,
            children: BlockChildren::Inline(InlineContent::new(raw)),
        }
    }

    /// A code block; `literal` materializes as a single verbatim `RawText`
    /// child.
    pub fn with_verbatim(value: BlockValue, literal: String) -> BlockToken {
        BlockToken {
            value,
            children: BlockChildren::Verbatim(InlineContent::new(literal)),
        }
    }

    /// A childless token.
    pub fn leaf(value: BlockValue) -> BlockToken {
        BlockToken {
            value,
            children: BlockChildren::None,
        }
    }

    /// The block children, or an empty slice for inline-content blocks and
    /// leaves.
    pub fn block_children(&self) -> &[BlockToken] {
        match &self.children {
            BlockChildren::Blocks(children) => children,
            _ => &[],
        }
    }

    /// The span children, materialized with the standard pattern set.
    pub fn span_children(&self) -> &[SpanToken] {
        self.span_children_with(&SpanRegistry::standard())
    }

    /// The span children, materialized with the given pattern set on first
    /// access. Subsequent accesses return the cached sequence regardless of
    /// the registry passed; only one renderer scope is active at a time.
    pub fn span_children_with(&self, spans: &SpanRegistry) -> &[SpanToken] {
        match &self.children {
            BlockChildren::Inline(inline) => {
                inline.spans.get_or_init(|| spans.tokenize(&inline.raw))
            }
            BlockChildren::Verbatim(inline) => inline
                .spans
                .get_or_init(|| vec![SpanToken::raw_text(inline.raw.clone())]),
            _ => &[],
        }
    }

    /// The raw inline payload of an inline-content or code block.
    pub fn inline_raw(&self) -> Option<&str> {
        match &self.children {
            BlockChildren::Inline(inline) | BlockChildren::Verbatim(inline) => {
                Some(inline.raw.as_str())
            }
            _ => None,
        }
    }

    /// True when this token has block children.
    pub fn has_block_children(&self) -> bool {
        matches!(self.children, BlockChildren::Blocks(_))
    }

    /// The footnote table, for `Document` tokens.
    pub fn footnotes(&self) -> Option<&FootnoteMap> {
        match &self.value {
            BlockValue::Document(doc) => Some(&doc.footnotes),
            _ => None,
        }
    }

    /// Containment query: true if any `RawText` leaf in the subtree contains
    /// `query` as a substring. Span children materialize with the standard
    /// pattern set.
    pub fn contains(&self, query: &str) -> bool {
        match &self.children {
            BlockChildren::Blocks(children) => {
                children.iter().any(|child| child.contains(query))
            }
            BlockChildren::Inline(_) | BlockChildren::Verbatim(_) => self
                .span_children()
                .iter()
                .any(|span| span.contains(query)),
            BlockChildren::None => false,
        }
    }

    /// Looks up a reference key in this document's footnote table.
    pub fn lookup_footnote(&self, key: &str) -> Option<&Footnote> {
        self.footnotes()?
            .get(&strings::normalize_reference_label(key))
    }
}

/// A span-level token: a tagged value plus its children.
#[derive(Debug, Clone)]
pub struct SpanToken {
    pub value: SpanValue,
    children: Vec<SpanToken>,
}

impl SpanToken {
    pub fn new(value: SpanValue, children: Vec<SpanToken>) -> SpanToken {
        SpanToken { value, children }
    }

    pub fn raw_text<S: Into<String>>(content: S) -> SpanToken {
        SpanToken {
            value: SpanValue::RawText(content.into()),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[SpanToken] {
        &self.children
    }

    /// True if any `RawText` leaf in this span subtree contains `query`.
    pub fn contains(&self, query: &str) -> bool {
        if let SpanValue::RawText(content) = &self.value {
            if content.contains(query) {
                return true;
            }
        }
        self.children.iter().any(|child| child.contains(query))
    }
}
