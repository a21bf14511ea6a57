use crate::nodes::{BlockValue, TableAlignment};
use crate::parser::table::{parse_align, split_delimiter};
use crate::tokenize;

#[test]
fn align_codes() {
    assert_eq!(parse_align(":------"), TableAlignment::None);
    assert_eq!(parse_align(":-----:"), TableAlignment::Center);
    assert_eq!(parse_align("------:"), TableAlignment::Right);
}

#[test]
fn delimiter_splitting() {
    assert_eq!(
        split_delimiter("| :--- | :---: | ---:|\n"),
        vec![":---", ":---:", "---:"]
    );
}

#[test]
fn table_shape() {
    let token = tokenize([
        "| header 1 | header 2 | header 3 |\n",
        "| --- | --- | --- |\n",
        "| cell 1 | cell 2 | cell 3 |\n",
        "| more 1 | more 2 | more 3 |\n",
    ])
    .next()
    .unwrap();

    let table = match &token.value {
        BlockValue::Table(table) => table,
        other => panic!("expected table, got {:?}", other),
    };
    assert!(table.has_header);
    assert_eq!(
        table.column_align.as_slice(),
        [
            TableAlignment::None,
            TableAlignment::None,
            TableAlignment::None
        ]
    );

    let rows = token.block_children();
    assert_eq!(rows.len(), 3);
    for row in rows {
        match &row.value {
            BlockValue::TableRow(r) => {
                assert_eq!(r.row_align.as_slice(), table.column_align.as_slice())
            }
            other => panic!("expected table row, got {:?}", other),
        }
        assert_eq!(row.block_children().len(), 3);
    }
    assert_eq!(rows[0].block_children()[0].inline_raw(), Some("header 1"));
    assert_eq!(rows[2].block_children()[2].inline_raw(), Some("more 3"));
}

#[test]
fn cell_alignment_from_delimiter() {
    let token = tokenize(["| a | b | c |\n", "| :--- | :---: | ---: |\n"])
        .next()
        .unwrap();
    match &token.value {
        BlockValue::Table(table) => assert_eq!(
            table.column_align.as_slice(),
            [
                TableAlignment::None,
                TableAlignment::Center,
                TableAlignment::Right
            ]
        ),
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn row_cell_count_mismatches() {
    let token = tokenize([
        "| a | b |\n",
        "| --- | --- |\n",
        "| 1 | 2 | 3 |\n",
        "| only |\n",
    ])
    .next()
    .unwrap();
    let rows = token.block_children();

    // Extra cells are dropped.
    let wide = rows[1].block_children();
    assert_eq!(wide.len(), 2);
    assert_eq!(wide[1].inline_raw(), Some("2"));

    // Missing cells are empty.
    let narrow = rows[2].block_children();
    assert_eq!(narrow.len(), 2);
    assert_eq!(narrow[1].inline_raw(), Some(""));
}

#[test]
fn escaped_pipes_stay_in_cells() {
    let token = tokenize(["| a | b |\n", "| --- | --- |\n", "| x \\| y | z |\n"])
        .next()
        .unwrap();
    let cells = token.block_children()[1].block_children();
    assert_eq!(cells[0].inline_raw(), Some("x | y"));
}

#[test]
fn header_delimiter_mismatch_is_not_a_table() {
    let token = tokenize(["| a | b | c |\n", "| --- | --- |\n"])
        .next()
        .unwrap();
    assert!(matches!(token.value, BlockValue::Paragraph));
}

#[test]
fn lone_delimiter_row_is_not_a_table() {
    let token = tokenize(["| --- | --- |\n"]).next().unwrap();
    assert!(matches!(token.value, BlockValue::Paragraph));
}
