//! The block-level tokenizer.
//!
//! A matcher-dispatch loop: at each line, the block matchers are asked in
//! precedence order whether they start there; the first that accepts
//! consumes a contiguous run of lines and produces one token. The paragraph
//! matcher is the total fallback, so parsing never fails.

pub mod table;

use crate::lines::Lines;
use crate::nodes::{
    BlockToken, BlockValue, Footnote, FootnoteMap, NodeCodeBlock, NodeDocument, NodeFootnoteEntry,
    NodeHeading, NodeList,
};
use crate::strings;

pub(crate) const TAB_STOP: usize = 4;
pub(crate) const CODE_INDENT: usize = 4;

/// Parses a whole buffer into a `Document` token.
///
/// The document tree is built first; every footnote entry in it is then
/// registered into the document's footnote table (later definitions of a
/// key win) before any span tokenization can happen.
pub fn parse_document(buffer: &str) -> BlockToken {
    document_from(Lines::from_buffer(buffer))
}

/// [`parse_document`] over an already-split sequence of lines, terminators
/// included.
pub fn parse_document_from_lines<I, S>(lines: I) -> BlockToken
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    document_from(Lines::from_iter(lines))
}

fn document_from(lines: Lines) -> BlockToken {
    let children: Vec<BlockToken> = BlockTokenizer { lines }.collect();
    let mut footnotes = FootnoteMap::default();
    for child in &children {
        harvest_footnotes(child, &mut footnotes);
    }
    BlockToken::with_blocks(
        BlockValue::Document(Box::new(NodeDocument { footnotes })),
        children,
    )
}

fn harvest_footnotes(token: &BlockToken, footnotes: &mut FootnoteMap) {
    if let BlockValue::FootnoteEntry(entry) = &token.value {
        footnotes.insert(
            strings::normalize_reference_label(&entry.key),
            Footnote {
                target: entry.target.clone(),
                title: entry.title.clone(),
            },
        );
    }
    for child in token.block_children() {
        harvest_footnotes(child, footnotes);
    }
}

/// Yields block tokens from a sequence of lines, one block at a time.
pub fn tokenize<I, S>(lines: I) -> BlockTokenizer
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BlockTokenizer {
        lines: Lines::from_iter(lines),
    }
}

pub(crate) fn tokenize_lines(lines: Lines) -> BlockTokenizer {
    BlockTokenizer { lines }
}

/// A lazy, finite, non-restartable sequence of block tokens.
pub struct BlockTokenizer {
    lines: Lines,
}

impl Iterator for BlockTokenizer {
    type Item = BlockToken;

    fn next(&mut self) -> Option<BlockToken> {
        loop {
            let blank = strings::is_blank(self.lines.peek()?);
            if blank {
                self.lines.advance();
                continue;
            }
            return Some(open_block(&mut self.lines));
        }
    }
}

fn open_block(lines: &mut Lines) -> BlockToken {
    if let Some(token) = try_atx_heading(lines) {
        return token;
    }
    if let Some(token) = try_code_fence(lines) {
        return token;
    }
    if let Some(token) = try_indented_code(lines) {
        return token;
    }
    if let Some(token) = try_separator(lines) {
        return token;
    }
    if let Some(token) = try_quote(lines) {
        return token;
    }
    if let Some(token) = try_list(lines) {
        return token;
    }
    if let Some(token) = table::try_table(lines) {
        return token;
    }
    if let Some(token) = try_footnote_block(lines) {
        return token;
    }
    if let Some(token) = try_html_block(lines) {
        return token;
    }
    read_paragraph(lines)
}

/// True when `line` would open a new block inside a paragraph, ending it.
/// Setext underlines are checked separately by the paragraph matcher, and
/// indented code never interrupts.
pub(crate) fn interrupts_paragraph(line: &str) -> bool {
    scan_atx_heading(line).is_some()
        || scan_open_fence(line).is_some()
        || scan_separator(line)
        || scan_quote_marker(line)
        || scan_list_marker(line).is_some()
}

// ATX headings.

fn scan_atx_heading(line: &str) -> Option<(u8, &str)> {
    if strings::indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start_matches(|c| c == ' ' || c == '\t');
    let level = rest.bytes().take_while(|&c| c == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let after = &rest[level..];
    match after.bytes().next() {
        None | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
            Some((level as u8, after))
        }
        _ => None,
    }
}

fn try_atx_heading(lines: &mut Lines) -> Option<BlockToken> {
    let (level, text) = {
        let (level, content) = scan_atx_heading(lines.peek()?)?;
        (level, strings::chop_atx_trailer(content).to_owned())
    };
    lines.advance();
    Some(BlockToken::with_inline(
        BlockValue::Heading(NodeHeading { level }),
        text,
    ))
}

// Fenced code.

struct FenceOpen {
    ch: u8,
    len: usize,
    language: String,
}

fn scan_open_fence(line: &str) -> Option<FenceOpen> {
    if strings::indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start_matches(' ');
    let ch = *rest.as_bytes().first()?;
    if ch != b'`' && ch != b'~' {
        return None;
    }
    let len = rest.bytes().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    let info = strings::trim_slice(&rest[len..]);
    if ch == b'`' && info.contains('`') {
        return None;
    }
    Some(FenceOpen {
        ch,
        len,
        language: info.to_owned(),
    })
}

fn scan_close_fence(line: &str, open: &FenceOpen) -> bool {
    if strings::indent_width(line) >= CODE_INDENT {
        return false;
    }
    let rest = strings::trim_slice(line);
    rest.len() >= open.len && rest.bytes().all(|c| c == open.ch)
}

fn try_code_fence(lines: &mut Lines) -> Option<BlockToken> {
    let open = lines.peek().and_then(scan_open_fence)?;
    lines.advance();

    // Inner lines are kept verbatim, blank lines included; an unclosed
    // fence runs to the end of input.
    let mut literal = String::new();
    while let Some(line) = lines.next() {
        if scan_close_fence(line, &open) {
            break;
        }
        literal.push_str(line);
    }

    Some(BlockToken::with_verbatim(
        BlockValue::CodeFence(NodeCodeBlock {
            language: open.language,
        }),
        literal,
    ))
}

// Indented code.

fn try_indented_code(lines: &mut Lines) -> Option<BlockToken> {
    {
        let first = lines.peek()?;
        if strings::is_blank(first) || strings::indent_width(first) < CODE_INDENT {
            return None;
        }
    }

    let mut literal = String::new();
    loop {
        let anchor = lines.anchor();
        let mut blanks = 0;
        while lines.peek().map_or(false, strings::is_blank) {
            lines.advance();
            blanks += 1;
        }
        let content = match lines.peek() {
            Some(line) if strings::indent_width(line) >= CODE_INDENT => {
                Some(strings::strip_columns(line, CODE_INDENT).to_owned())
            }
            _ => None,
        };
        match content {
            Some(content) => {
                for _ in 0..blanks {
                    literal.push('\n');
                }
                literal.push_str(&content);
                lines.advance();
            }
            None => {
                lines.reset(anchor);
                break;
            }
        }
    }

    Some(BlockToken::with_verbatim(
        BlockValue::BlockCode(NodeCodeBlock::default()),
        literal,
    ))
}

// Thematic breaks.

fn scan_separator(line: &str) -> bool {
    if strings::indent_width(line) >= CODE_INDENT {
        return false;
    }
    let trimmed = strings::trim_slice(line);
    let marker = match trimmed.as_bytes().first() {
        Some(&c) if c == b'-' || c == b'*' || c == b'_' => c,
        _ => return false,
    };
    let mut count = 0;
    for &c in trimmed.as_bytes() {
        if c == marker {
            count += 1;
        } else if c != b' ' && c != b'\t' {
            return false;
        }
    }
    count >= 3
}

fn try_separator(lines: &mut Lines) -> Option<BlockToken> {
    if !lines.peek().map_or(false, scan_separator) {
        return None;
    }
    lines.advance();
    Some(BlockToken::leaf(BlockValue::Separator))
}

// Block quotes.

fn scan_quote_marker(line: &str) -> bool {
    strings::indent_width(line) < CODE_INDENT && line.trim_start_matches(' ').starts_with('>')
}

fn strip_quote_marker(line: &str) -> &str {
    let rest = &line.trim_start_matches(' ')[1..];
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn try_quote(lines: &mut Lines) -> Option<BlockToken> {
    if !lines.peek().map_or(false, scan_quote_marker) {
        return None;
    }

    let mut content: Vec<String> = Vec::new();
    loop {
        let stripped = match lines.peek() {
            Some(line) if scan_quote_marker(line) => Some(strip_quote_marker(line).to_owned()),
            // Lazy continuation: a bare line extends the quote's open
            // paragraph when neither it nor the previous line starts a
            // block of its own.
            Some(line)
                if !strings::is_blank(line)
                    && !interrupts_paragraph(line)
                    && content
                        .last()
                        .map_or(false, |l| !strings::is_blank(l) && !interrupts_paragraph(l)) =>
            {
                Some(line.to_owned())
            }
            _ => None,
        };
        match stripped {
            Some(s) => {
                content.push(s);
                lines.advance();
            }
            None => break,
        }
    }

    let children = tokenize_lines(Lines::new(content)).collect();
    Some(BlockToken::with_blocks(BlockValue::Quote, children))
}

// Lists.

struct ListMarker {
    ordered: bool,
    number: u32,
    /// Byte offset of the first line's content.
    content_start: usize,
    /// Columns a continuation line must be indented to belong to the item.
    content_indent: usize,
}

fn scan_list_marker(line: &str) -> Option<ListMarker> {
    let bytes = line.as_bytes();
    let mut p = 0;
    while p < bytes.len() && bytes[p] == b' ' {
        p += 1;
    }
    let indent = p;
    if indent >= CODE_INDENT {
        return None;
    }

    let (ordered, number, after) = match *bytes.get(p)? {
        b'-' | b'+' | b'*' => (false, 0, p + 1),
        c if c.is_ascii_digit() => {
            let mut q = p;
            while q < bytes.len() && bytes[q].is_ascii_digit() {
                q += 1;
            }
            if q - p > 9 {
                return None;
            }
            match bytes.get(q) {
                Some(&b'.') | Some(&b')') => (),
                _ => return None,
            }
            let number = line[p..q].parse().ok()?;
            (true, number, q + 1)
        }
        _ => return None,
    };

    let mut q = after;
    let mut spaces = 0;
    while q < bytes.len() && bytes[q] == b' ' {
        q += 1;
        spaces += 1;
    }
    let at_eol = q >= bytes.len() || bytes[q] == b'\n' || bytes[q] == b'\r';
    if spaces == 0 && !at_eol {
        return None;
    }

    let marker_width = after - indent;
    let content_indent = if at_eol || spaces > CODE_INDENT {
        indent + marker_width + 1
    } else {
        indent + marker_width + spaces
    };
    Some(ListMarker {
        ordered,
        number,
        content_start: q,
        content_indent,
    })
}

fn try_list(lines: &mut Lines) -> Option<BlockToken> {
    let first = lines.peek().and_then(scan_list_marker)?;
    let ordered = first.ordered;
    let start = if ordered { Some(first.number) } else { None };

    let mut items = Vec::new();
    let mut marker = Some(first);
    while let Some(m) = marker.take() {
        items.push(read_item(lines, &m));

        // Blank lines between items belong to the list only when another
        // item follows.
        let anchor = lines.anchor();
        while lines.peek().map_or(false, strings::is_blank) {
            lines.advance();
        }
        // A thematic break outranks a would-be sibling marker.
        let next = lines
            .peek()
            .and_then(|l| if scan_separator(l) { None } else { scan_list_marker(l) });
        match next {
            Some(next) if next.ordered == ordered => marker = Some(next),
            _ => lines.reset(anchor),
        }
    }

    Some(BlockToken::with_blocks(
        BlockValue::List(NodeList { start }),
        items,
    ))
}

fn read_item(lines: &mut Lines, marker: &ListMarker) -> BlockToken {
    let mut content: Vec<String> = Vec::new();
    if let Some(line) = lines.next() {
        content.push(line[marker.content_start..].to_owned());
    }

    loop {
        let anchor = lines.anchor();
        let mut blanks = 0;
        while lines.peek().map_or(false, strings::is_blank) {
            lines.advance();
            blanks += 1;
        }
        if blanks > 0 {
            let continues = lines.peek().map_or(false, |l| {
                strings::indent_width(l) >= marker.content_indent
            });
            if !continues {
                lines.reset(anchor);
                break;
            }
            for _ in 0..blanks {
                content.push("\n".to_owned());
            }
        }

        let next = match lines.peek() {
            None => None,
            Some(line) => {
                if strings::indent_width(line) >= marker.content_indent {
                    Some(strings::strip_columns(line, marker.content_indent).to_owned())
                } else if scan_list_marker(line).is_some() {
                    None
                } else if blanks == 0
                    && !interrupts_paragraph(line)
                    && content
                        .last()
                        .map_or(false, |l| !strings::is_blank(l) && !interrupts_paragraph(l))
                {
                    // Lazy continuation of the item's open paragraph.
                    Some(line.to_owned())
                } else {
                    None
                }
            }
        };
        match next {
            Some(s) => {
                content.push(s);
                lines.advance();
            }
            None => {
                lines.reset(anchor);
                break;
            }
        }
    }

    let children = tokenize_lines(Lines::new(content)).collect();
    BlockToken::with_blocks(BlockValue::ListItem, children)
}

// Link-reference definitions.

fn scan_footnote_entry(line: &str) -> Option<NodeFootnoteEntry> {
    let trimmed = strings::trim_slice(line);
    let rest = trimmed.strip_prefix('[')?;
    let close = rest.find(']')?;
    let key = &rest[..close];
    if key.is_empty() || key.contains('[') {
        return None;
    }
    let value = rest[close + 1..].strip_prefix(':')?;
    let value = strings::trim_slice(value);
    if value.is_empty() {
        return None;
    }
    let (target, title) = strings::split_quoted_title(value);
    Some(NodeFootnoteEntry {
        key: key.to_owned(),
        target: target.to_owned(),
        title: title.to_owned(),
    })
}

fn try_footnote_block(lines: &mut Lines) -> Option<BlockToken> {
    let mut entries = Vec::new();
    loop {
        let entry = lines.peek().and_then(scan_footnote_entry);
        match entry {
            Some(entry) => {
                entries.push(BlockToken::leaf(BlockValue::FootnoteEntry(entry)));
                lines.advance();
            }
            None => break,
        }
    }
    if entries.is_empty() {
        None
    } else {
        Some(BlockToken::with_blocks(BlockValue::FootnoteBlock, entries))
    }
}

// HTML blocks.

static HTML_BLOCK_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "address", "article", "aside", "base", "basefont", "blockquote", "body",
    "caption", "center", "col", "colgroup", "dd", "details", "dialog",
    "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer",
    "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "iframe", "legend", "li", "link",
    "main", "menu", "menuitem", "nav", "noframes", "ol", "optgroup",
    "option", "p", "param", "section", "source", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
};

enum HtmlBlockKind {
    Comment,
    Tag,
}

fn scan_html_block_start(line: &str) -> Option<HtmlBlockKind> {
    if strings::indent_width(line) >= CODE_INDENT {
        return None;
    }
    let rest = line.trim_start_matches(' ').strip_prefix('<')?;
    if rest.starts_with("!--") {
        return Some(HtmlBlockKind::Comment);
    }
    let name_part = rest.strip_prefix('/').unwrap_or(rest);
    let name_len = name_part
        .bytes()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if name_len == 0 {
        return None;
    }
    let name = name_part[..name_len].to_ascii_lowercase();
    if !HTML_BLOCK_TAGS.contains(name.as_str()) {
        return None;
    }
    match name_part.as_bytes().get(name_len) {
        None | Some(&b' ') | Some(&b'\t') | Some(&b'>') | Some(&b'/') | Some(&b'\n')
        | Some(&b'\r') => Some(HtmlBlockKind::Tag),
        _ => None,
    }
}

fn try_html_block(lines: &mut Lines) -> Option<BlockToken> {
    let kind = lines.peek().and_then(scan_html_block_start)?;
    let mut content = String::new();
    match kind {
        HtmlBlockKind::Comment => {
            while let Some(line) = lines.next() {
                content.push_str(line);
                if line.contains("-->") {
                    break;
                }
            }
        }
        HtmlBlockKind::Tag => loop {
            let done = match lines.peek() {
                None => true,
                Some(line) => strings::is_blank(line),
            };
            if done {
                break;
            }
            if let Some(line) = lines.next() {
                content.push_str(line);
            }
        },
    }
    Some(BlockToken::leaf(BlockValue::HtmlBlock(content)))
}

// Paragraphs and setext headings.

fn scan_setext_underline(line: &str) -> Option<u8> {
    if strings::indent_width(line) >= CODE_INDENT {
        return None;
    }
    let trimmed = strings::trim_slice(line);
    if trimmed.is_empty() {
        None
    } else if trimmed.bytes().all(|c| c == b'=') {
        Some(1)
    } else if trimmed.bytes().all(|c| c == b'-') {
        Some(2)
    } else {
        None
    }
}

fn read_paragraph(lines: &mut Lines) -> BlockToken {
    enum Step {
        Stop,
        Push(String),
        Setext(u8),
    }

    let mut buf = String::new();
    if let Some(line) = lines.next() {
        buf.push_str(line);
    }

    loop {
        let step = match lines.peek() {
            None => Step::Stop,
            Some(line) => {
                if strings::is_blank(line) {
                    Step::Stop
                } else if let Some(level) = scan_setext_underline(line) {
                    Step::Setext(level)
                } else if table::is_pipe_framed(line)
                    && lines.peek_at(1).map_or(false, table::is_delimiter_row)
                {
                    Step::Stop
                } else if interrupts_paragraph(line) {
                    Step::Stop
                } else {
                    Step::Push(line.to_owned())
                }
            }
        };
        match step {
            Step::Stop => break,
            Step::Push(line) => {
                buf.push_str(&line);
                lines.advance();
            }
            Step::Setext(level) => {
                lines.advance();
                return BlockToken::with_inline(
                    BlockValue::SetextHeading(NodeHeading { level }),
                    buf,
                );
            }
        }
    }

    BlockToken::with_inline(BlockValue::Paragraph, buf)
}
