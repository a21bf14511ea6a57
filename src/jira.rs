//! The JIRA wiki-markup renderer.

use std::fmt::{self, Write};

use crate::nodes::{BlockToken, BlockValue, LinkTarget, SpanToken, SpanValue};
use crate::renderer::{RenderScope, Renderer};

/// Renders JIRA wiki markup.
///
/// Span forms: `*strong*`, `_emphasis_`, `{{code}}`, `-struck-`, `!src!`,
/// `[body|url]`, `[url]`. List markers nest by repeating `*` and `#`.
#[derive(Debug, Default, Clone)]
pub struct JiraRenderer {
    // One entry per open list; true for ordered.
    list_stack: Vec<bool>,
}

impl JiraRenderer {
    pub fn new() -> JiraRenderer {
        JiraRenderer::default()
    }

    fn list_marker(&self) -> String {
        self.list_stack
            .iter()
            .map(|&ordered| if ordered { '#' } else { '*' })
            .collect()
    }

    fn format_table_row(
        &mut self,
        scope: &RenderScope,
        row: &BlockToken,
        header: bool,
        output: &mut dyn Write,
    ) -> fmt::Result {
        let frame = if header { "||" } else { "|" };
        output.write_str(frame)?;
        for cell in row.block_children() {
            self.format_inner(scope, cell, output)?;
            output.write_str(frame)?;
        }
        output.write_str("\n")
    }
}

impl Renderer for JiraRenderer {
    fn format_block(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        match &token.value {
            BlockValue::Document(_) => self.format_inner(scope, token, output),
            BlockValue::Heading(heading) | BlockValue::SetextHeading(heading) => {
                write!(output, "h{}. ", heading.level)?;
                self.format_inner(scope, token, output)?;
                output.write_str("\n\n")
            }
            BlockValue::Paragraph => {
                self.format_inner(scope, token, output)?;
                output.write_str("\n")
            }
            BlockValue::Quote => {
                output.write_str("{quote}\n")?;
                self.format_inner(scope, token, output)?;
                output.write_str("{quote}\n\n")
            }
            BlockValue::List(list) => {
                self.list_stack.push(list.start.is_some());
                self.format_inner(scope, token, output)?;
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    output.write_str("\n")?;
                }
                Ok(())
            }
            BlockValue::ListItem => {
                write!(output, "{} ", self.list_marker())?;
                // The leading paragraph renders bare on the marker line;
                // nested blocks follow on their own lines.
                for child in token.block_children() {
                    match child.value {
                        BlockValue::Paragraph => self.format_inner(scope, child, output)?,
                        _ => self.format_block(scope, child, output)?,
                    }
                }
                Ok(())
            }
            BlockValue::CodeFence(code) | BlockValue::BlockCode(code) => {
                if code.language.is_empty() {
                    output.write_str("{code}\n")?;
                } else {
                    write!(output, "{{code:{}}}\n", code.language)?;
                }
                self.format_inner(scope, token, output)?;
                output.write_str("{code}\n\n")
            }
            BlockValue::Table(table) => {
                let rows = token.block_children();
                let body = if table.has_header && !rows.is_empty() {
                    self.format_table_row(scope, &rows[0], true, output)?;
                    &rows[1..]
                } else {
                    rows
                };
                for row in body {
                    self.format_table_row(scope, row, false, output)?;
                }
                output.write_str("\n")
            }
            BlockValue::TableRow(_) => self.format_table_row(scope, token, false, output),
            BlockValue::TableCell(_) => self.format_inner(scope, token, output),
            BlockValue::Separator => output.write_str("----\n\n"),
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
                output.write_str("*")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("*")
            }
            SpanValue::Emphasis => {
                output.write_str("_")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("_")
            }
            SpanValue::InlineCode => {
                output.write_str("{{")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("}}")
            }
            SpanValue::Strikethrough => {
                output.write_str("-")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("-")
            }
            SpanValue::Link(target) => {
                let url = match resolve(scope, target) {
                    Some(url) => url,
                    None => return degrade(target, output),
                };
                output.write_str("[")?;
                self.format_span_inner(scope, span, output)?;
                write!(output, "|{}]", url)
            }
            SpanValue::AutoLink(_) => {
                output.write_str("[")?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("]")
            }
            SpanValue::Image(target) => {
                let src = match resolve(scope, target) {
                    Some(src) => src,
                    None => return degrade(target, output),
                };
                write!(output, "!{}!", src)
            }
            SpanValue::EscapeSequence => self.format_span_inner(scope, span, output),
            SpanValue::RawText(content) => output.write_str(content),
            SpanValue::HtmlSpan(content) => output.write_str(content),
            SpanValue::LineBreak { hard } => {
                output.write_str(if *hard { "\\\\\n" } else { "\n" })
            }
            SpanValue::Custom(custom) => panic!(
                "no JIRA handler registered for span token `{}`",
                custom.name
            ),
        }
    }
}

fn resolve(scope: &RenderScope, target: &LinkTarget) -> Option<String> {
    match target {
        LinkTarget::Inline(link) => Some(link.url.clone()),
        LinkTarget::Reference { key, .. } => {
            scope.lookup(key).map(|footnote| footnote.target.clone())
        }
    }
}

// An unresolved reference degrades to its raw source text.
fn degrade(target: &LinkTarget, output: &mut dyn Write) -> fmt::Result {
    match target {
        LinkTarget::Reference { raw, .. } => output.write_str(raw),
        LinkTarget::Inline(_) => Ok(()),
    }
}
