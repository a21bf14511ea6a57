use super::html;
use crate::markdown_to_html;
use crate::renderer::Renderer;

#[test]
fn heading() {
    html("### heading 3\n", "<h3>heading 3</h3>\n");
}

#[test]
fn setext_heading() {
    html("some\nheading\n---\n", "<h2>some\nheading\n</h2>\n");
}

#[test]
fn paragraph_with_strong() {
    html(
        "My **document**.\n",
        "<p>My <strong>document</strong>.\n</p>\n",
    );
}

#[test]
fn emphasis_and_strikethrough() {
    html(
        "both *em* and ~~del~~\n",
        "<p>both <em>em</em> and <del>del</del>\n</p>\n",
    );
}

#[test]
fn inline_code_is_escaped() {
    html("`a < b`\n", "<p><code>a &lt; b</code>\n</p>\n");
}

#[test]
fn raw_text_is_escaped() {
    html(
        "john & jane say \"hi\"\n",
        "<p>john &amp; jane say &quot;hi&quot;\n</p>\n",
    );
}

#[test]
fn escape_sequence_renders_inner() {
    html("\\*literal\\*\n", "<p>*literal*\n</p>\n");
}

#[test]
fn quote() {
    html("> Yes.\n", "<blockquote>\n<p>Yes.\n</p>\n</blockquote>\n");
}

#[test]
fn quote_lazy_continuation() {
    html(
        "> line 1\nline 2\n",
        "<blockquote>\n<p>line 1\nline 2\n</p>\n</blockquote>\n",
    );
}

#[test]
fn code_fence_with_language() {
    html(
        "```sh\nrm dir\nmkdir test\n```\n",
        "<pre>\n<code class=\"lang-sh\">\nrm dir\nmkdir test\n</code>\n</pre>\n",
    );
}

#[test]
fn indented_code_without_language() {
    html(
        "    a < b\n",
        "<pre>\n<code>\na &lt; b\n</code>\n</pre>\n",
    );
}

#[test]
fn unclosed_fence_runs_to_end_of_input() {
    html("```\nhey", "<pre>\n<code>\nhey</code>\n</pre>\n");
}

#[test]
fn bullet_list() {
    html(
        "- item 1\n- item 2\n",
        "<ul>\n<li>item 1\n</li>\n<li>item 2\n</li>\n</ul>\n",
    );
}

#[test]
fn ordered_list_with_start() {
    html(
        "3. a\n4. b\n",
        "<ol start=\"3\">\n<li>a\n</li>\n<li>b\n</li>\n</ol>\n",
    );
}

#[test]
fn ordered_list_starting_at_one() {
    html("1. a\n", "<ol>\n<li>a\n</li>\n</ol>\n");
}

#[test]
fn nested_list() {
    html(
        concat!(
            "- item 1\n",
            "- item 2\n",
            "    * nested item 1\n",
            "    * nested item 2\n",
            "- item 3\n",
        ),
        concat!(
            "<ul>\n",
            "<li>item 1\n</li>\n",
            "<li>item 2\n",
            "<ul>\n",
            "<li>nested item 1\n</li>\n",
            "<li>nested item 2\n</li>\n",
            "</ul>\n",
            "</li>\n",
            "<li>item 3\n</li>\n",
            "</ul>\n",
        ),
    );
}

#[test]
fn separator() {
    html("---\n", "<hr>\n");
}

#[test]
fn table_with_header_and_alignment() {
    html(
        concat!("| a | b |\n", "|---|:-:|\n", "| c | d |\n"),
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n",
            "<td align=\"left\">a</td>\n",
            "<td align=\"center\">b</td>\n",
            "</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n",
            "<td align=\"left\">c</td>\n",
            "<td align=\"center\">d</td>\n",
            "</tr>\n",
            "</tbody>\n",
            "</table>\n",
        ),
    );
}

#[test]
fn headerless_table() {
    html(
        concat!("|---|---:|\n", "| c | d |\n"),
        concat!(
            "<table>\n",
            "<tbody>\n",
            "<tr>\n",
            "<td align=\"left\">c</td>\n",
            "<td align=\"right\">d</td>\n",
            "</tr>\n",
            "</tbody>\n",
            "</table>\n",
        ),
    );
}

#[test]
fn malformed_table_falls_through_to_paragraph() {
    html(
        "| a | b |\n| -x- | --- |\n",
        "<p>| a | b |\n| -x- | --- |\n</p>\n",
    );
}

#[test]
fn table_after_paragraph() {
    html(
        concat!("123\n", "| a | b |\n", "|---|---|\n", "| c | d |\n"),
        concat!(
            "<p>123\n</p>\n",
            "<table>\n",
            "<thead>\n",
            "<tr>\n",
            "<td align=\"left\">a</td>\n",
            "<td align=\"left\">b</td>\n",
            "</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n",
            "<td align=\"left\">c</td>\n",
            "<td align=\"left\">d</td>\n",
            "</tr>\n",
            "</tbody>\n",
            "</table>\n",
        ),
    );
}

#[test]
fn footnote_image() {
    let doc = crate::parse_document_from_lines(["![alt] [foo]\n", "\n", "[foo]: bar \"title\"\n"]);
    let output = crate::html::HtmlRenderer::new().render(&doc);
    assert_eq!(
        output,
        "<p><img src=\"bar\" title=\"title\" alt=\"alt\">\n</p>\n"
    );
}

#[test]
fn footnote_link() {
    let doc = crate::parse_document_from_lines(["[name] [foo]\n", "\n", "[foo]: target\n"]);
    let output = crate::html::HtmlRenderer::new().render(&doc);
    assert_eq!(output, "<p><a href=\"target\">name</a>\n</p>\n");
}

#[test]
fn unresolved_reference_degrades_to_raw_text() {
    html("[name] [nope]\n", "<p>[name] [nope]\n</p>\n");
}

#[test]
fn reference_keys_are_case_folded() {
    html(
        "[name] [Foo]\n\n[foo]: target\n",
        "<p><a href=\"target\">name</a>\n</p>\n",
    );
}

#[test]
fn inline_image_with_empty_title() {
    html(
        "![image](foo.jpg)\n",
        "<p><img src=\"foo.jpg\" title=\"\" alt=\"image\">\n</p>\n",
    );
}

#[test]
fn inline_link() {
    html(
        "[text](target)\n",
        "<p><a href=\"target\">text</a>\n</p>\n",
    );
}

#[test]
fn auto_link() {
    html(
        "<https://x.dev>\n",
        "<p><a href=\"https://x.dev\">https://x.dev</a>\n</p>\n",
    );
}

#[test]
fn html_span_passes_through() {
    html(
        "a <b class=\"x\">bold</b>\n",
        "<p>a <b class=\"x\">bold</b>\n</p>\n",
    );
}

#[test]
fn html_block_passes_through() {
    html("<div>\nhi & bye\n</div>\n", "<div>\nhi & bye\n</div>\n");
}

#[test]
fn hard_break() {
    html("a  \nb\n", "<p>a<br />\nb\n</p>\n");
}

#[test]
fn footnote_definitions_render_nothing() {
    html("[key 1]: value 1\n[key 2]: value 2\n", "");
}

#[test]
fn whole_document() {
    assert_eq!(
        markdown_to_html(concat!(
            "My **document**.\n",
            "\n",
            "It's mine.\n",
            "\n",
            "> Yes.\n",
            "\n",
            "## Hi!\n",
            "\n",
            "Okay.\n",
        )),
        concat!(
            "<p>My <strong>document</strong>.\n</p>\n",
            "<p>It's mine.\n</p>\n",
            "<blockquote>\n<p>Yes.\n</p>\n</blockquote>\n",
            "<h2>Hi!</h2>\n",
            "<p>Okay.\n</p>\n",
        ),
    );
}
