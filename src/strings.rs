//! String utilities shared by the block and span tokenizers.

/// True if the line holds nothing but spaces, tabs and a terminator.
pub fn is_blank(s: &str) -> bool {
    for &c in s.as_bytes() {
        match c {
            b'\n' | b'\r' | b' ' | b'\t' => (),
            _ => return false,
        }
    }
    true
}

/// Trims ASCII whitespace (including line terminators) from both ends.
pub fn trim_slice(mut i: &str) -> &str {
    while !i.is_empty() && i.as_bytes()[0].is_ascii_whitespace() {
        i = &i[1..];
    }
    while !i.is_empty() && i.as_bytes()[i.len() - 1].is_ascii_whitespace() {
        i = &i[..i.len() - 1];
    }
    i
}

/// Removes the closing hash run of an ATX heading.
///
/// `heading 3 #####` becomes `heading 3`; a run not preceded by a space or
/// tab is content and stays (`heading#` is unchanged).
pub fn chop_atx_trailer(line: &str) -> &str {
    let trimmed = trim_slice(line);
    let bytes = trimmed.as_bytes();
    let mut n = trimmed.len();
    while n > 0 && bytes[n - 1] == b'#' {
        n -= 1;
    }
    if n == trimmed.len() {
        return trimmed;
    }
    if n == 0 {
        return "";
    }
    if bytes[n - 1] == b' ' || bytes[n - 1] == b'\t' {
        trim_slice(&trimmed[..n])
    } else {
        trimmed
    }
}

/// Normalizes a reference label: trim, collapse internal whitespace, default
/// Unicode case fold. Lookups and insertions into the footnote table both go
/// through this.
pub fn normalize_reference_label(i: &str) -> String {
    let mut collapsed = String::with_capacity(i.len());
    let mut last_was_whitespace = false;
    for c in trim_slice(i).chars() {
        if c.is_whitespace() {
            if !last_was_whitespace {
                collapsed.push(' ');
                last_was_whitespace = true;
            }
        } else {
            collapsed.push(c);
            last_was_whitespace = false;
        }
    }
    caseless::default_case_fold_str(&collapsed)
}

/// Splits `target "title"` into target and title. The title must be
/// double-quoted and separated from the target by whitespace; the title is
/// empty when absent.
pub fn split_quoted_title(value: &str) -> (&str, &str) {
    let trimmed = trim_slice(value);
    if trimmed.len() >= 2 && trimmed.ends_with('"') {
        if let Some(at) = trimmed[..trimmed.len() - 1].rfind('"') {
            let before = &trimmed[..at];
            if before.ends_with(' ') || before.ends_with('\t') {
                return (trim_slice(before), &trimmed[at + 1..trimmed.len() - 1]);
            }
        }
    }
    (trimmed, "")
}

/// The indentation width of a line in columns, with tabs advancing to the
/// next multiple of the tab stop.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for &c in line.as_bytes() {
        match c {
            b' ' => width += 1,
            b'\t' => width += crate::parser::TAB_STOP - width % crate::parser::TAB_STOP,
            _ => break,
        }
    }
    width
}

/// Strips up to `columns` columns of leading whitespace. A tab that
/// straddles the boundary is consumed whole.
pub fn strip_columns(line: &str, columns: usize) -> &str {
    let mut width = 0;
    let mut offset = 0;
    for &c in line.as_bytes() {
        if width >= columns {
            break;
        }
        match c {
            b' ' => width += 1,
            b'\t' => width += crate::parser::TAB_STOP - width % crate::parser::TAB_STOP,
            _ => break,
        }
        offset += 1;
    }
    &line[offset..]
}
