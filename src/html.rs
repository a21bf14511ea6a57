//! The HTML renderer.

use std::fmt::{self, Write};

use crate::nodes::{BlockToken, BlockValue, LinkTarget, SpanToken, SpanValue, TableAlignment};
use crate::renderer::{RenderScope, Renderer};

/// Formats a parsed tree as HTML.
pub fn format_document(root: &BlockToken, output: &mut dyn Write) -> fmt::Result {
    let mut renderer = HtmlRenderer::new();
    let scope = RenderScope::enter(renderer.extra_patterns(), root.footnotes());
    renderer.format_block(&scope, root, output)
}

/// Renders the standard HTML output.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> HtmlRenderer {
        HtmlRenderer
    }

    // A list item whose only paragraph leads its children renders that
    // paragraph's inline content bare; the remaining children (nested
    // lists, code) stay blocks. Items with several paragraphs render all
    // children as blocks.
    fn format_list_item(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        output.write_str("<li>")?;
        let children = token.block_children();
        let tight = matches!(children.first().map(|c| &c.value), Some(BlockValue::Paragraph))
            && !children[1..]
                .iter()
                .any(|c| matches!(c.value, BlockValue::Paragraph));
        if tight {
            self.format_inner(scope, &children[0], output)?;
            for child in &children[1..] {
                self.format_block(scope, child, output)?;
            }
        } else {
            self.format_inner(scope, token, output)?;
        }
        output.write_str("</li>\n")
    }

    fn format_table(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        has_header: bool,
        output: &mut dyn Write,
    ) -> fmt::Result {
        output.write_str("<table>\n")?;
        let rows = token.block_children();
        let body = if has_header && !rows.is_empty() {
            output.write_str("<thead>\n")?;
            self.format_block(scope, &rows[0], output)?;
            output.write_str("</thead>\n")?;
            &rows[1..]
        } else {
            rows
        };
        output.write_str("<tbody>\n")?;
        for row in body {
            self.format_block(scope, row, output)?;
        }
        output.write_str("</tbody>\n")?;
        output.write_str("</table>\n")
    }
}

impl Renderer for HtmlRenderer {
    fn format_block(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        match &token.value {
            BlockValue::Document(_) => self.format_inner(scope, token, output),
            BlockValue::Heading(heading) | BlockValue::SetextHeading(heading) => {
                write!(output, "<h{}>", heading.level)?;
                self.format_inner(scope, token, output)?;
                write!(output, "</h{}>\n", heading.level)
            }
            BlockValue::Paragraph => {
                output.write_str("<p>")?;
                self.format_inner(scope, token, output)?;
                output.write_str("</p>\n")
            }
            BlockValue::Quote => {
                output.write_str("<blockquote>\n")?;
                self.format_inner(scope, token, output)?;
                output.write_str("</blockquote>\n")
            }
            BlockValue::List(list) => {
                match list.start {
                    None => output.write_str("<ul>\n")?,
                    Some(1) => output.write_str("<ol>\n")?,
                    Some(start) => write!(output, "<ol start=\"{}\">\n", start)?,
                }
                self.format_inner(scope, token, output)?;
                output.write_str(if list.start.is_some() {
                    "</ol>\n"
                } else {
                    "</ul>\n"
                })
            }
            BlockValue::ListItem => self.format_list_item(scope, token, output),
            BlockValue::CodeFence(code) | BlockValue::BlockCode(code) => {
                output.write_str("<pre>\n")?;
                if code.language.is_empty() {
                    output.write_str("<code>\n")?;
                } else {
                    output.write_str("<code class=\"lang-")?;
                    escape(output, &code.language)?;
                    output.write_str("\">\n")?;
                }
                self.format_inner(scope, token, output)?;
                output.write_str("</code>\n</pre>\n")
            }
            BlockValue::Table(table) => {
                self.format_table(scope, token, table.has_header, output)
            }
            BlockValue::TableRow(_) => {
                output.write_str("<tr>\n")?;
                self.format_inner(scope, token, output)?;
                output.write_str("</tr>\n")
            }
            BlockValue::TableCell(cell) => {
                let align = match cell.align {
                    TableAlignment::None => "left",
                    TableAlignment::Center => "center",
                    TableAlignment::Right => "right",
                };
                write!(output, "<td align=\"{}\">", align)?;
                self.format_inner(scope, token, output)?;
                output.write_str("</td>\n")
            }
            BlockValue::Separator => output.write_str("<hr>\n"),
            // Reference definitions render nothing; they live in the
            // document footnote table.
            BlockValue::FootnoteBlock | BlockValue::FootnoteEntry(_) => Ok(()),
            BlockValue::HtmlBlock(content) => output.write_str(content),
        }
    }

    fn format_span(
        &mut self,
        scope: &RenderScope,
        span: &SpanToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        match &span.value {
            SpanValue::Strong => {
                output.write_str("<strong>")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</strong>")
            }
            SpanValue::Emphasis => {
                output.write_str("<em>")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</em>")
            }
            SpanValue::InlineCode => {
                output.write_str("<code>")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</code>")
            }
            SpanValue::Strikethrough => {
                output.write_str("<del>")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</del>")
            }
            SpanValue::Link(target) => {
                let url = match resolve(scope, target) {
                    Resolved::Url(url, _) => url,
                    Resolved::Degraded(raw) => return escape(output, raw),
                };
                output.write_str("<a href=\"")?;
                escape(output, &url)?;
                output.write_str("\">")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</a>")
            }
            SpanValue::AutoLink(target) => {
                output.write_str("<a href=\"")?;
                escape(output, target)?;
                output.write_str("\">")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</a>")
            }
            SpanValue::Image(target) => {
                let (src, title) = match resolve(scope, target) {
                    Resolved::Url(src, title) => (src, title),
                    Resolved::Degraded(raw) => return escape(output, raw),
                };
                output.write_str("<img src=\"")?;
                escape(output, &src)?;
                output.write_str("\" title=\"")?;
                escape(output, &title)?;
                output.write_str("\" alt=\"")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("\">")
            }
            SpanValue::EscapeSequence => self.format_span_inner(scope, span, output),
            SpanValue::RawText(content) => escape(output, content),
            SpanValue::HtmlSpan(content) => output.write_str(content),
            SpanValue::LineBreak { hard } => {
                output.write_str(if *hard { "<br />\n" } else { "\n" })
            }
            SpanValue::Custom(custom) => panic!(
                "no HTML handler registered for span token `{}`",
                custom.name
            ),
        }
    }
}

enum Resolved<'a> {
    Url(String, String),
    Degraded(&'a str),
}

fn resolve<'a>(scope: &RenderScope, target: &'a LinkTarget) -> Resolved<'a> {
    match target {
        LinkTarget::Inline(link) => Resolved::Url(link.url.clone(), link.title.clone()),
        LinkTarget::Reference { key, raw } => match scope.lookup(key) {
            Some(footnote) => Resolved::Url(footnote.target.clone(), footnote.title.clone()),
            None => Resolved::Degraded(raw),
        },
    }
}

/// Writes `buffer` to `output`, escaping anything that could be interpreted
/// as an HTML tag:
///
/// * U+0022 QUOTATION MARK " is rendered as &quot;
/// * U+0026 AMPERSAND & is rendered as &amp;
/// * U+003C LESS-THAN SIGN < is rendered as &lt;
/// * U+003E GREATER-THAN SIGN > is rendered as &gt;
/// * Everything else is passed through unchanged.
pub fn escape(output: &mut dyn Write, buffer: &str) -> fmt::Result {
    let bytes = buffer.as_bytes();
    let matcher = jetscii::bytes!(b'"', b'&', b'<', b'>');

    let mut offset = 0;
    while let Some(i) = matcher.find(&bytes[offset..]) {
        let esc: &str = match bytes[offset + i] {
            b'"' => "&quot;",
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => unreachable!(),
        };
        output.write_str(&buffer[offset..offset + i])?;
        output.write_str(esc)?;
        offset += i + 1;
    }
    output.write_str(&buffer[offset..])?;
    Ok(())
}
