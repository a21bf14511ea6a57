//! The table matcher.
//!
//! A table opens either with a header line followed by a delimiter row, or
//! with a bare delimiter row (headerless). A delimiter row that does not
//! parse, or a header whose cell count disagrees with it, simply fails to
//! match and falls through to the paragraph matcher.

use crate::lines::Lines;
use crate::nodes::{
    BlockToken, BlockValue, ColumnAlignments, NodeTable, NodeTableCell, NodeTableRow,
    TableAlignment,
};
use crate::strings;

pub(crate) fn try_table(lines: &mut Lines) -> Option<BlockToken> {
    let anchor = lines.anchor();
    let first = lines.peek()?.to_owned();
    if !is_pipe_framed(&first) {
        return None;
    }

    let (has_header, column_align) = if is_delimiter_row(&first) {
        (false, alignments_of(&first))
    } else {
        let second = lines.peek_at(1)?.to_owned();
        if !is_delimiter_row(&second) {
            return None;
        }
        let column_align = alignments_of(&second);
        if split_row(&first).len() != column_align.len() {
            return None;
        }
        (true, column_align)
    };

    let mut rows = Vec::new();
    if has_header {
        lines.advance();
        lines.advance();
        rows.push(make_row(&first, &column_align));
    } else {
        lines.advance();
    }

    loop {
        let row = match lines.peek() {
            Some(line)
                if is_pipe_framed(line)
                    && !is_delimiter_row(line)
                    && !strings::is_blank(line) =>
            {
                Some(line.to_owned())
            }
            _ => None,
        };
        match row {
            Some(line) => {
                rows.push(make_row(&line, &column_align));
                lines.advance();
            }
            None => break,
        }
    }

    if !has_header && rows.is_empty() {
        // A lone delimiter row is not a table.
        lines.reset(anchor);
        return None;
    }

    Some(BlockToken::with_blocks(
        BlockValue::Table(NodeTable {
            has_header,
            column_align,
        }),
        rows,
    ))
}

/// Every row constructed by a table receives the table's column alignments;
/// extra cells are dropped and missing cells are empty.
fn make_row(line: &str, aligns: &ColumnAlignments) -> BlockToken {
    let mut cells = split_row(line);
    cells.truncate(aligns.len());
    while cells.len() < aligns.len() {
        cells.push(String::new());
    }
    let children = cells
        .into_iter()
        .zip(aligns.iter())
        .map(|(text, &align)| {
            BlockToken::with_inline(BlockValue::TableCell(NodeTableCell { align }), text)
        })
        .collect();
    BlockToken::with_blocks(
        BlockValue::TableRow(NodeTableRow {
            row_align: aligns.clone(),
        }),
        children,
    )
}

pub(crate) fn is_pipe_framed(line: &str) -> bool {
    strings::trim_slice(line).starts_with('|')
}

pub(crate) fn is_delimiter_row(line: &str) -> bool {
    if !is_pipe_framed(line) {
        return false;
    }
    let cells = split_delimiter(line);
    !cells.is_empty() && cells.iter().all(|c| is_delimiter_cell(c))
}

fn is_delimiter_cell(cell: &str) -> bool {
    let c = cell.strip_prefix(':').unwrap_or(cell);
    let c = c.strip_suffix(':').unwrap_or(c);
    !c.is_empty() && c.bytes().all(|b| b == b'-')
}

/// The alignment encoded by one delimiter cell: `:---:` centers, `---:`
/// aligns right, and anything else (including a lone leading colon) is the
/// default.
pub fn parse_align(cell: &str) -> TableAlignment {
    let left = cell.starts_with(':');
    let right = cell.ends_with(':');
    if left && right {
        TableAlignment::Center
    } else if right {
        TableAlignment::Right
    } else {
        TableAlignment::None
    }
}

/// The delimiter row's cells, stripped of the border pipes and outer
/// whitespace.
pub fn split_delimiter(line: &str) -> Vec<String> {
    let trimmed = strings::trim_slice(line);
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed
        .split('|')
        .map(|cell| strings::trim_slice(cell).to_owned())
        .collect()
}

fn alignments_of(line: &str) -> ColumnAlignments {
    split_delimiter(line)
        .iter()
        .map(|cell| parse_align(cell))
        .collect()
}

/// Splits a data row into trimmed cells. A backslash-escaped pipe belongs
/// to its cell's content.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let trimmed = strings::trim_slice(line);
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut escaping = false;
    for c in trimmed.chars() {
        if escaping {
            if c != '|' {
                cell.push('\\');
            }
            cell.push(c);
            escaping = false;
        } else if c == '\\' {
            escaping = true;
        } else if c == '|' {
            cells.push(strings::trim_slice(&cell).to_owned());
            cell.clear();
        } else {
            cell.push(c);
        }
    }
    if escaping {
        cell.push('\\');
    }
    cells.push(strings::trim_slice(&cell).to_owned());
    cells
}
