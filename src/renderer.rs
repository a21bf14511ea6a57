//! Renderer dispatch.
//!
//! A renderer maps every token variant to a handler and walks the tree
//! through [`Renderer::format_block`] and [`Renderer::format_span`].
//! Rendering happens inside a [`RenderScope`]: entering builds the active
//! span-pattern set (standard patterns plus the renderer's extras) and
//! captures the document's footnote table; the scope is a plain value, so
//! its registrations vanish on every exit path. Only one scope should be
//! active at a time.

use std::fmt::{self, Write};

use crate::inlines::{SpanPattern, SpanRegistry};
use crate::nodes::{BlockToken, Footnote, FootnoteMap, SpanToken};

/// The state active while a renderer walks a tree.
pub struct RenderScope<'d> {
    spans: SpanRegistry,
    footnotes: Option<&'d FootnoteMap>,
}

impl<'d> RenderScope<'d> {
    /// Enters a scope: the standard pattern set extended with `extra`, and
    /// the footnote table of `footnotes`' document, if any.
    pub fn enter(extra: Vec<SpanPattern>, footnotes: Option<&'d FootnoteMap>) -> RenderScope<'d> {
        let mut spans = SpanRegistry::standard();
        for pattern in extra {
            spans.insert(pattern);
        }
        RenderScope { spans, footnotes }
    }

    /// The span patterns active in this scope.
    pub fn spans(&self) -> &SpanRegistry {
        &self.spans
    }

    /// Resolves a reference key against the document's footnote table.
    pub fn lookup(&self, key: &str) -> Option<&'d Footnote> {
        self.footnotes?
            .get(&crate::strings::normalize_reference_label(key))
    }
}

/// A renderer: a full set of handlers for the closed token variants, plus
/// optional extra span patterns registered for the duration of a render.
pub trait Renderer {
    /// Extra span patterns active while this renderer's scope lives. The
    /// default set registers nothing.
    fn extra_patterns(&self) -> Vec<SpanPattern> {
        Vec::new()
    }

    /// Writes one block token. Must handle every [`BlockValue`] variant.
    ///
    /// [`BlockValue`]: crate::nodes::BlockValue
    fn format_block(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result;

    /// Writes one span token. Must handle every [`SpanValue`] variant; a
    /// [`Custom`] span whose pattern this renderer did not register is a
    /// programming error and should panic.
    ///
    /// [`SpanValue`]: crate::nodes::SpanValue
    /// [`Custom`]: crate::nodes::SpanValue::Custom
    fn format_span(
        &mut self,
        scope: &RenderScope,
        span: &SpanToken,
        output: &mut dyn Write,
    ) -> fmt::Result;

    /// Concatenates the rendering of a block token's children: block
    /// children through [`Renderer::format_block`], span children (built
    /// with the scope's pattern set) through [`Renderer::format_span`].
    fn format_inner(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        if token.has_block_children() {
            for child in token.block_children() {
                self.format_block(scope, child, output)?;
            }
        } else {
            for span in token.span_children_with(scope.spans()) {
                self.format_span(scope, span, output)?;
            }
        }
        Ok(())
    }

    /// Concatenates the rendering of a span token's children.
    fn format_span_inner(
        &mut self,
        scope: &RenderScope,
        span: &SpanToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        for child in span.children() {
            self.format_span(scope, child, output)?;
        }
        Ok(())
    }

    /// Renders a block token (typically a `Document` root) to a string
    /// inside a fresh scope.
    fn render(&mut self, token: &BlockToken) -> String {
        let scope = RenderScope::enter(self.extra_patterns(), token.footnotes());
        let mut output = String::new();
        // Writing into a String cannot fail.
        self.format_block(&scope, token, &mut output).unwrap();
        output
    }

    /// Renders a standalone span token to a string inside a fresh scope
    /// with no document context.
    fn render_span(&mut self, span: &SpanToken) -> String {
        let scope = RenderScope::enter(self.extra_patterns(), None);
        let mut output = String::new();
        self.format_span(&scope, span, &mut output).unwrap();
        output
    }
}
