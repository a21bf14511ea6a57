//! The span tokenizer.
//!
//! A string is split into span tokens by a precedence-ordered set of
//! patterns. The engine scans left to right: at each position the
//! earliest-starting match wins, with ties broken by pattern precedence.
//! Text between matches becomes [`RawText`](SpanValue::RawText). Container
//! spans recursively tokenize their inner region with the same registry.

use std::ops::Range;

use unicode_categories::UnicodeCategories;

use crate::nodes::{LinkTarget, NodeCustomSpan, NodeLink, SpanToken, SpanValue};

/// A single span pattern: a recognizer plus its precedence.
///
/// The matcher receives the full text and the position to scan from, and
/// returns the earliest match at or after that position.
#[derive(Clone, Copy)]
pub struct SpanPattern {
    /// Used for [`SpanRegistry::remove`] and for dispatching
    /// [`SpanValue::Custom`] tokens.
    pub name: &'static str,

    /// Higher wins when two patterns match at the same position.
    pub precedence: u8,

    pub matcher: fn(&str, usize) -> Option<SpanMatch>,
}

impl std::fmt::Debug for SpanPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SpanPattern")
            .field("name", &self.name)
            .field("precedence", &self.precedence)
            .finish()
    }
}

/// A successful pattern match over `text[start..end]`.
pub struct SpanMatch {
    pub start: usize,
    pub end: usize,
    pub value: SpanValue,
    pub inner: InnerSpans,
}

/// How the children of a matched span are produced.
pub enum InnerSpans {
    /// Recursively tokenize this region of the scanned text.
    Tokenize(Range<usize>),

    /// A single verbatim `RawText` child.
    Raw(String),

    /// A leaf.
    None,
}

/// The ordered set of active span patterns.
#[derive(Debug, Clone)]
pub struct SpanRegistry {
    patterns: Vec<SpanPattern>,
    // The jetscii fast path is only sound while every pattern's trigger
    // byte is in STANDARD_TRIGGERS; inserting a pattern clears it.
    standard_triggers: bool,
}

impl Default for SpanRegistry {
    fn default() -> SpanRegistry {
        SpanRegistry::standard()
    }
}

impl SpanRegistry {
    /// The standard Markdown pattern set, highest precedence first.
    pub fn standard() -> SpanRegistry {
        SpanRegistry {
            patterns: vec![
                SpanPattern {
                    name: "EscapeSequence",
                    precedence: 100,
                    matcher: escape_sequence,
                },
                SpanPattern {
                    name: "InlineCode",
                    precedence: 90,
                    matcher: inline_code,
                },
                SpanPattern {
                    name: "HTMLSpan",
                    precedence: 80,
                    matcher: html_span,
                },
                SpanPattern {
                    name: "AutoLink",
                    precedence: 70,
                    matcher: auto_link,
                },
                SpanPattern {
                    name: "Image",
                    precedence: 60,
                    matcher: image,
                },
                SpanPattern {
                    name: "Link",
                    precedence: 50,
                    matcher: link,
                },
                SpanPattern {
                    name: "Strong",
                    precedence: 40,
                    matcher: strong,
                },
                SpanPattern {
                    name: "Emphasis",
                    precedence: 30,
                    matcher: emphasis,
                },
                SpanPattern {
                    name: "Strikethrough",
                    precedence: 20,
                    matcher: strikethrough,
                },
                SpanPattern {
                    name: "LineBreak",
                    precedence: 10,
                    matcher: line_break,
                },
            ],
            standard_triggers: true,
        }
    }

    /// Inserts a pattern by precedence, after existing patterns of the same
    /// precedence.
    pub fn insert(&mut self, pattern: SpanPattern) {
        let at = self
            .patterns
            .iter()
            .position(|p| p.precedence < pattern.precedence)
            .unwrap_or(self.patterns.len());
        self.patterns.insert(at, pattern);
        self.standard_triggers = false;
    }

    /// Removes every pattern with the given name. Returns whether any was
    /// present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.patterns.len();
        self.patterns.retain(|p| p.name != name);
        self.patterns.len() != before
    }

    pub fn patterns(&self) -> &[SpanPattern] {
        &self.patterns
    }

    /// Splits `text` into span tokens.
    pub fn tokenize(&self, text: &str) -> Vec<SpanToken> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let hint = match self.scan_hint(text, pos) {
                Some(hint) => hint,
                None => {
                    tokens.push(SpanToken::raw_text(&text[pos..]));
                    break;
                }
            };

            let mut best: Option<SpanMatch> = None;
            for pattern in &self.patterns {
                if let Some(m) = (pattern.matcher)(text, hint) {
                    debug_assert!(m.end > m.start);
                    let better = match &best {
                        Some(b) => m.start < b.start,
                        None => true,
                    };
                    if better {
                        best = Some(m);
                    }
                }
            }

            match best {
                None => {
                    tokens.push(SpanToken::raw_text(&text[pos..]));
                    break;
                }
                Some(m) => {
                    if m.start > pos {
                        tokens.push(SpanToken::raw_text(&text[pos..m.start]));
                    }
                    let children = match m.inner {
                        InnerSpans::Tokenize(range) => self.tokenize(&text[range]),
                        InnerSpans::Raw(content) => vec![SpanToken::raw_text(content)],
                        InnerSpans::None => Vec::new(),
                    };
                    tokens.push(SpanToken::new(m.value, children));
                    pos = m.end;
                }
            }
        }
        tokens
    }

    // With the standard pattern set, no match can begin before the first
    // trigger byte (a line break backs up over the spaces preceding its
    // newline, which stay inside the pending raw gap either way).
    fn scan_hint(&self, text: &str, pos: usize) -> Option<usize> {
        if !self.standard_triggers {
            return Some(pos);
        }
        let matcher = jetscii::bytes!(
            b'\\', b'`', b'<', b'!', b'[', b'*', b'_', b'~', b'\n'
        );
        matcher.find(text[pos..].as_bytes()).map(|i| pos + i)
    }
}

/// Splits `text` into span tokens with the standard pattern set.
pub fn tokenize_inner(text: &str) -> Vec<SpanToken> {
    SpanRegistry::standard().tokenize(text)
}

/// A `-text-` strikethrough pattern for renderer families that use dash
/// markup. Not part of the standard set: at block position `-` stays a
/// list or thematic-break marker, so this must be registered explicitly via
/// [`Renderer::extra_patterns`](crate::renderer::Renderer::extra_patterns).
pub fn dash_strikethrough() -> SpanPattern {
    SpanPattern {
        name: "Strikethrough",
        precedence: 20,
        matcher: dash_strikethrough_matcher,
    }
}

fn is_punct_char(c: char) -> bool {
    c.is_ascii_punctuation() || c.is_punctuation() || c.is_symbol()
}

fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

fn char_at(text: &str, at: usize) -> Option<char> {
    text[at..].chars().next()
}

fn escape_sequence(text: &str, from: usize) -> Option<SpanMatch> {
    let mut i = from;
    while let Some(off) = text[i..].find('\\') {
        let start = i + off;
        if let Some(c) = char_at(text, start + 1) {
            if c.is_ascii_punctuation() {
                return Some(SpanMatch {
                    start,
                    end: start + 1 + c.len_utf8(),
                    value: SpanValue::EscapeSequence,
                    inner: InnerSpans::Raw(c.to_string()),
                });
            }
        }
        i = start + 1;
    }
    None
}

fn backtick_run(bytes: &[u8], at: usize) -> usize {
    let mut n = 0;
    while bytes.get(at + n) == Some(&b'`') {
        n += 1;
    }
    n
}

fn inline_code(text: &str, from: usize) -> Option<SpanMatch> {
    let bytes = text.as_bytes();
    let mut i = from;
    while let Some(off) = text[i..].find('`') {
        let open = i + off;
        let n = backtick_run(bytes, open);

        // The closing run must have exactly the opening run's length.
        let mut j = open + n;
        while let Some(off) = text[j..].find('`') {
            let close = j + off;
            let m = backtick_run(bytes, close);
            if m == n {
                return Some(SpanMatch {
                    start: open,
                    end: close + m,
                    value: SpanValue::InlineCode,
                    inner: InnerSpans::Raw(text[open + n..close].to_owned()),
                });
            }
            j = close + m;
        }
        i = open + n;
    }
    None
}

fn html_span(text: &str, from: usize) -> Option<SpanMatch> {
    let mut i = from;
    while let Some(off) = text[i..].find('<') {
        let start = i + off;
        if let Some(end) = scan_html_tag(text, start) {
            return Some(SpanMatch {
                start,
                end,
                value: SpanValue::HtmlSpan(text[start..end].to_owned()),
                inner: InnerSpans::None,
            });
        }
        i = start + 1;
    }
    None
}

fn scan_html_tag(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    if let Some(tail) = rest.strip_prefix("<!--") {
        return tail.find("-->").map(|i| start + 4 + i + 3);
    }

    let bytes = rest.as_bytes();
    let mut p = 1;
    let closing = bytes.get(p) == Some(&b'/');
    if closing {
        p += 1;
    }
    if !bytes.get(p)?.is_ascii_alphabetic() {
        return None;
    }
    p += 1;
    while matches!(bytes.get(p), Some(c) if c.is_ascii_alphanumeric() || *c == b'-') {
        p += 1;
    }

    if closing {
        while matches!(bytes.get(p), Some(&b' ') | Some(&b'\t')) {
            p += 1;
        }
        return match bytes.get(p) {
            Some(&b'>') => Some(start + p + 1),
            _ => None,
        };
    }

    // After the tag name: whitespace, '/', or the closing angle bracket.
    match bytes.get(p) {
        Some(&b' ') | Some(&b'\t') | Some(&b'/') | Some(&b'>') => (),
        _ => return None,
    }

    let mut quote: Option<u8> = None;
    while let Some(&c) = bytes.get(p) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                b'>' => return Some(start + p + 1),
                b'<' | b'\n' => return None,
                b'"' | b'\'' => quote = Some(c),
                _ => (),
            },
        }
        p += 1;
    }
    None
}

fn auto_link(text: &str, from: usize) -> Option<SpanMatch> {
    let mut i = from;
    while let Some(off) = text[i..].find('<') {
        let start = i + off;
        if let Some((len, target)) = scan_autolink(&text[start..]) {
            return Some(SpanMatch {
                start,
                end: start + len,
                value: SpanValue::AutoLink(target.clone()),
                inner: InnerSpans::Raw(target),
            });
        }
        i = start + 1;
    }
    None
}

fn scan_autolink(rest: &str) -> Option<(usize, String)> {
    let bytes = rest.as_bytes();
    let mut p = 1;
    if !bytes.get(p)?.is_ascii_alphabetic() {
        return None;
    }
    p += 1;
    while matches!(bytes.get(p), Some(c) if c.is_ascii_alphanumeric() || matches!(*c, b'+' | b'.' | b'-'))
    {
        p += 1;
    }
    if bytes.get(p) != Some(&b':') {
        return None;
    }
    p += 1;
    let content_start = p;
    while let Some(&c) = bytes.get(p) {
        match c {
            b'>' if p > content_start => return Some((p + 1, rest[1..p].to_owned())),
            b'>' | b'<' | b' ' | b'\t' | b'\n' | b'\r' => return None,
            _ => p += 1,
        }
    }
    None
}

/// Finds the `]` matching the `[` at `open`, honoring nesting and backslash
/// escapes.
fn scan_brackets(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut p = open;
    while let Some(&c) = bytes.get(p) {
        match c {
            b'\\' => p += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(p);
                }
            }
            _ => (),
        }
        p += 1;
    }
    None
}

fn scan_parens(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut p = open;
    while let Some(&c) = bytes.get(p) {
        match c {
            b'\\' => p += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(p);
                }
            }
            b'\n' => return None,
            _ => (),
        }
        p += 1;
    }
    None
}

enum LinkTail {
    Inline { url: String, title: String },
    Reference { key: String },
    Shortcut,
}

/// Parses what follows a link or image label: an inline destination, a
/// reference key (optionally separated by one space), or nothing.
fn scan_link_tail(text: &str, after_label: usize) -> (usize, LinkTail) {
    let bytes = text.as_bytes();
    match bytes.get(after_label) {
        Some(&b'(') => {
            if let Some(close) = scan_parens(text, after_label) {
                let (url, title) = split_destination(&text[after_label + 1..close]);
                return (close + 1, LinkTail::Inline { url, title });
            }
        }
        _ => {
            let mut p = after_label;
            if bytes.get(p) == Some(&b' ') {
                p += 1;
            }
            if bytes.get(p) == Some(&b'[') {
                if let Some(close) = scan_brackets(text, p) {
                    return (
                        close + 1,
                        LinkTail::Reference {
                            key: text[p + 1..close].to_owned(),
                        },
                    );
                }
            }
        }
    }
    (after_label, LinkTail::Shortcut)
}

/// Splits an inline destination into URL and optional double-quoted title.
fn split_destination(content: &str) -> (String, String) {
    let (url, title) = crate::strings::split_quoted_title(content);
    (url.to_owned(), title.to_owned())
}

fn image(text: &str, from: usize) -> Option<SpanMatch> {
    let mut i = from;
    while let Some(off) = text[i..].find("![") {
        let bang = i + off;
        if let Some(close) = scan_brackets(text, bang + 1) {
            let label = bang + 2..close;
            let (end, tail) = scan_link_tail(text, close + 1);
            let target = match tail {
                LinkTail::Inline { url, title } => LinkTarget::Inline(NodeLink { url, title }),
                LinkTail::Reference { key } => {
                    let key = if key.is_empty() {
                        text[label.clone()].to_owned()
                    } else {
                        key
                    };
                    LinkTarget::Reference {
                        key,
                        raw: text[bang..end].to_owned(),
                    }
                }
                LinkTail::Shortcut => LinkTarget::Reference {
                    key: text[label.clone()].to_owned(),
                    raw: text[bang..end].to_owned(),
                },
            };
            return Some(SpanMatch {
                start: bang,
                end,
                value: SpanValue::Image(target),
                inner: InnerSpans::Tokenize(label),
            });
        }
        i = bang + 2;
    }
    None
}

fn link(text: &str, from: usize) -> Option<SpanMatch> {
    let mut i = from;
    while let Some(off) = text[i..].find('[') {
        let open = i + off;
        if let Some(close) = scan_brackets(text, open) {
            let label = open + 1..close;
            let (end, tail) = scan_link_tail(text, close + 1);
            let target = match tail {
                LinkTail::Inline { url, title } => LinkTarget::Inline(NodeLink { url, title }),
                LinkTail::Reference { key } => {
                    let key = if key.is_empty() {
                        text[label.clone()].to_owned()
                    } else {
                        key
                    };
                    LinkTarget::Reference {
                        key,
                        raw: text[open..end].to_owned(),
                    }
                }
                LinkTail::Shortcut => LinkTarget::Reference {
                    key: text[label.clone()].to_owned(),
                    raw: text[open..end].to_owned(),
                },
            };
            return Some(SpanMatch {
                start: open,
                end,
                value: SpanValue::Link(target),
                inner: InnerSpans::Tokenize(label),
            });
        }
        i = open + 1;
    }
    None
}

fn find_pair(bytes: &[u8], mut i: usize, d: u8) -> Option<usize> {
    while i + 1 < bytes.len() {
        if bytes[i] == d && bytes[i + 1] == d {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Matches `d d ... d d` with non-whitespace flanks and a non-empty inner
/// region. Escaped delimiters do not close.
fn scan_double_delimited(text: &str, from: usize, d: u8) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;
    while let Some(open) = find_pair(bytes, i, d) {
        let inner_start = open + 2;
        match char_at(text, inner_start) {
            Some(c) if !c.is_whitespace() => (),
            _ => {
                i = open + 1;
                continue;
            }
        }

        let mut j = inner_start;
        while let Some(close) = find_pair(bytes, j, d) {
            if close == inner_start || bytes[close - 1] == b'\\' {
                j = close + 1;
                continue;
            }
            match char_before(text, close) {
                Some(c) if !c.is_whitespace() => {
                    return Some((open, close + 2));
                }
                _ => j = close + 1,
            }
        }
        i = open + 1;
    }
    None
}

fn strong(text: &str, from: usize) -> Option<SpanMatch> {
    let star = scan_double_delimited(text, from, b'*');
    let underscore = scan_double_delimited(text, from, b'_');
    let (open, end) = match (star, underscore) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(SpanMatch {
        start: open,
        end,
        value: SpanValue::Strong,
        inner: InnerSpans::Tokenize(open + 2..end - 2),
    })
}

fn strikethrough(text: &str, from: usize) -> Option<SpanMatch> {
    let (open, end) = scan_double_delimited(text, from, b'~')?;
    Some(SpanMatch {
        start: open,
        end,
        value: SpanValue::Strikethrough,
        inner: InnerSpans::Tokenize(open + 2..end - 2),
    })
}

/// Matches `d ... d` for a single-byte delimiter, skipping doubled runs.
/// With `intraword` false, the delimiter cannot open after or close before
/// an alphanumeric character (the underscore rule).
fn scan_single_delimited(
    text: &str,
    from: usize,
    d: u8,
    intraword: bool,
) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;
    while let Some(off) = text[i..].find(d as char) {
        let open = i + off;
        i = open + 1;
        // Part of a doubled run: leave it to the double-delimiter pattern.
        if bytes.get(open + 1) == Some(&d) || (open > 0 && bytes[open - 1] == d) {
            continue;
        }
        match char_at(text, open + 1) {
            Some(c) if !c.is_whitespace() => (),
            _ => continue,
        }
        if !intraword {
            if let Some(c) = char_before(text, open) {
                if !c.is_whitespace() && !is_punct_char(c) {
                    continue;
                }
            }
        }

        let mut j = open + 1;
        while let Some(off) = text[j..].find(d as char) {
            let close = j + off;
            j = close + 1;
            if bytes.get(close + 1) == Some(&d) {
                j = close + 2;
                continue;
            }
            if bytes[close - 1] == d || bytes[close - 1] == b'\\' || close == open + 1 {
                continue;
            }
            match char_before(text, close) {
                Some(c) if !c.is_whitespace() => (),
                _ => continue,
            }
            if !intraword {
                match char_at(text, close + 1) {
                    Some(c) if !c.is_whitespace() && !is_punct_char(c) => continue,
                    _ => (),
                }
            }
            return Some((open, close + 1));
        }
    }
    None
}

fn emphasis(text: &str, from: usize) -> Option<SpanMatch> {
    let star = scan_single_delimited(text, from, b'*', true);
    let underscore = scan_single_delimited(text, from, b'_', false);
    let (open, end) = match (star, underscore) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(SpanMatch {
        start: open,
        end,
        value: SpanValue::Emphasis,
        inner: InnerSpans::Tokenize(open + 1..end - 1),
    })
}

fn dash_strikethrough_matcher(text: &str, from: usize) -> Option<SpanMatch> {
    let (open, end) = scan_single_delimited(text, from, b'-', true)?;
    Some(SpanMatch {
        start: open,
        end,
        value: SpanValue::Strikethrough,
        inner: InnerSpans::Tokenize(open + 1..end - 1),
    })
}

fn line_break(text: &str, from: usize) -> Option<SpanMatch> {
    let off = text[from..].find('\n')?;
    let nl = from + off;
    let bytes = text.as_bytes();
    // Back over the terminator and any trailing spaces; `from` is only a
    // scan hint, and the spaces decide hard vs soft, so the backstop is the
    // start of text. The engine clamps the raw gap to its own position.
    let mut start = nl;
    if start > 0 && bytes[start - 1] == b'\r' {
        start -= 1;
    }
    let mut spaces = 0;
    while start > 0 && bytes[start - 1] == b' ' {
        start -= 1;
        spaces += 1;
    }
    // Trailing spaces force a hard break only mid-text; a block's final
    // newline is always soft.
    let hard = spaces >= 2 && nl + 1 < text.len();
    Some(SpanMatch {
        start,
        end: nl + 1,
        value: SpanValue::LineBreak { hard },
        inner: InnerSpans::None,
    })
}

/// A pattern constructor for extension spans, used by renderers that add
/// their own inline syntax. The matcher should produce
/// [`SpanValue::Custom`] tokens carrying `name`.
pub fn custom_pattern(
    name: &'static str,
    precedence: u8,
    matcher: fn(&str, usize) -> Option<SpanMatch>,
) -> SpanPattern {
    SpanPattern {
        name,
        precedence,
        matcher,
    }
}

/// Helper for extension matchers: builds a `Custom` span value.
pub fn custom_span(name: &'static str, target: String) -> SpanValue {
    SpanValue::Custom(NodeCustomSpan { name, target })
}
