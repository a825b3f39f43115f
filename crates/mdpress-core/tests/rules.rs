use mdpress_core::{ConvertOptions, apply_rules, convert_to_html};

fn apply(text: &str) -> String {
    apply_rules(text, &ConvertOptions::default())
}

#[test]
fn image_renders_before_link_can_touch_it() {
    // Regression for the image/link ordering rule: the image pattern is a
    // prefixed variant of the link pattern, so it must win.
    let html = apply("![alt](http://x/img.png)");
    assert_eq!(
        html,
        "<img src=\"http://x/img.png\" alt=\"alt\" style=\"max-width:100%;\">"
    );
    assert!(!html.contains("<a "));
}

#[test]
fn image_and_link_coexist_on_one_line() {
    let html = apply("see ![d](i.png) and [docs](https://x)");
    assert_eq!(
        html,
        "see <img src=\"i.png\" alt=\"d\" style=\"max-width:100%;\"> \
         and <a href=\"https://x\">docs</a>"
    );
}

#[test]
fn unclosed_references_pass_through_as_literal_text() {
    assert_eq!(apply("![x](u end"), "![x](u end");
    assert_eq!(apply("[x] (u)"), "[x] (u)");
    assert_eq!(apply("!not an image"), "!not an image");
}

#[test]
fn emphasis_nests_inside_link_text() {
    // Rules compose sequentially: strong runs before link, so the link
    // children carry the already-substituted markup.
    assert_eq!(
        apply("[**bold** docs](https://x)"),
        "<a href=\"https://x\"><strong>bold</strong> docs</a>"
    );
}

#[test]
fn inline_code_keeps_raw_text_by_default() {
    assert_eq!(apply("`<raw>`"), "<code><raw></code>");
}

#[test]
fn image_inside_list_item() {
    let html = convert_to_html("- ![icon](icon.png)", &ConvertOptions::default());
    assert_eq!(
        html,
        "<ul>\n<li><img src=\"icon.png\" alt=\"icon\" style=\"max-width:100%;\"></li>\n</ul>"
    );
}

#[test]
fn underscores_are_not_emphasis() {
    // Only asterisk emphasis is recognized; underscores pass through.
    assert_eq!(
        apply("[x](https://x/a_b)"),
        "<a href=\"https://x/a_b\">x</a>"
    );
    assert_eq!(apply("_plain_"), "_plain_");
}
