use std::fmt::{self, Write};

use crate::html::HtmlRenderer;
use crate::inlines::{
    custom_pattern, custom_span, dash_strikethrough, InnerSpans, SpanMatch, SpanPattern,
    SpanRegistry,
};
use crate::nodes::{BlockToken, SpanToken, SpanValue};
use crate::renderer::{RenderScope, Renderer};
use crate::tokenize_inner;

#[test]
fn registry_remove_and_insert() {
    let mut registry = SpanRegistry::standard();
    assert!(registry.remove("Strikethrough"));
    assert!(!registry.remove("Strikethrough"));

    let spans = registry.tokenize("~~gone~~");
    assert!(matches!(spans[0].value, SpanValue::RawText(_)));

    registry.insert(dash_strikethrough());
    let spans = registry.tokenize("-gone-");
    assert!(matches!(spans[0].value, SpanValue::Strikethrough));
}

#[test]
fn standard_registry_is_unaffected_by_scopes() {
    // A scope's extra registrations live and die with the scope value.
    let spans = tokenize_inner("-gone-");
    assert!(matches!(spans[0].value, SpanValue::RawText(_)));
}

// An HTML renderer family that reads -text- as strikethrough, the way the
// JIRA-flavored sources do.
struct DashHtmlRenderer {
    inner: HtmlRenderer,
}

impl Renderer for DashHtmlRenderer {
    fn extra_patterns(&self) -> Vec<SpanPattern> {
        vec![dash_strikethrough()]
    }

    fn format_block(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        self.inner.format_block(scope, token, output)
    }

    fn format_span(
        &mut self,
        scope: &RenderScope,
        span: &SpanToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        self.inner.format_span(scope, span, output)
    }
}

#[test]
fn renderer_extra_pattern_is_active_inside_its_scope() {
    let doc = crate::parse_document("struck: -gone-\n");
    let mut renderer = DashHtmlRenderer {
        inner: HtmlRenderer::new(),
    };
    assert_eq!(
        renderer.render(&doc),
        "<p>struck: <del>gone</del>\n</p>\n"
    );
}

#[test]
fn dash_stays_a_list_marker_at_block_position() {
    let doc = crate::parse_document("- item\n");
    let mut renderer = DashHtmlRenderer {
        inner: HtmlRenderer::new(),
    };
    assert_eq!(renderer.render(&doc), "<ul>\n<li>item\n</li>\n</ul>\n");
}

fn wiki_matcher(text: &str, from: usize) -> Option<SpanMatch> {
    let off = text[from..].find("[[")?;
    let start = from + off;
    let close = start + text[start..].find("]]")?;
    let inner = &text[start + 2..close];
    let (label, target) = match inner.split_once('|') {
        Some((label, target)) => (label.trim(), target.trim()),
        None => (inner, inner),
    };
    let label_start = start + 2 + (label.as_ptr() as usize - inner.as_ptr() as usize);
    Some(SpanMatch {
        start,
        end: close + 2,
        value: custom_span("GithubWiki", target.to_owned()),
        inner: InnerSpans::Tokenize(label_start..label_start + label.len()),
    })
}

struct WikiRenderer {
    inner: HtmlRenderer,
}

impl Renderer for WikiRenderer {
    fn extra_patterns(&self) -> Vec<SpanPattern> {
        vec![custom_pattern("GithubWiki", 55, wiki_matcher)]
    }

    fn format_block(
        &mut self,
        scope: &RenderScope,
        token: &BlockToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        self.inner.format_block(scope, token, output)
    }

    fn format_span(
        &mut self,
        scope: &RenderScope,
        span: &SpanToken,
        output: &mut dyn Write,
    ) -> fmt::Result {
        match &span.value {
            SpanValue::Custom(custom) if custom.name == "GithubWiki" => {
                write!(output, "<a href=\"{}\">", custom.target)?;
                self.format_span_inner(scope, span, output)?;
                output.write_str("</a>")
            }
            _ => self.inner.format_span(scope, span, output),
        }
    }
}

#[test]
fn custom_span_pattern_dispatches_by_name() {
    let doc = crate::parse_document("see [[wiki | target]]\n");
    let mut renderer = WikiRenderer {
        inner: HtmlRenderer::new(),
    };
    assert_eq!(
        renderer.render(&doc),
        "<p>see <a href=\"target\">wiki</a>\n</p>\n"
    );
}

#[test]
#[should_panic(expected = "no HTML handler registered for span token `GithubWiki`")]
fn missing_custom_handler_is_fatal() {
    let span = SpanToken::new(custom_span("GithubWiki", "target".to_owned()), Vec::new());
    HtmlRenderer::new().render_span(&span);
}

#[test]
fn render_span_without_document_context() {
    let spans = tokenize_inner("[name] [nope]");
    assert_eq!(
        HtmlRenderer::new().render_span(&spans[0]),
        "[name] [nope]"
    );
}
