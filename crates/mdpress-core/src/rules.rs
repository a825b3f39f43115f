//! Inline substitution rules.
//!
//! Each rule is a (matcher, transform) pair over a single line of text.
//! Rules compose sequentially: every rule runs on the output of the one
//! before it, and the table order is a load-bearing invariant. Headers and
//! list markers are handled structurally before any rule runs, and the image
//! rule must precede the link rule because `![..](..)` is a prefixed variant
//! of `[..](..)` -- with the opposite order the link rule consumes the link
//! portion of an image reference and leaves a dangling `!`.

use crate::convert::ConvertOptions;
use crate::html::escape_html;

pub struct InlineRule {
    pub name: &'static str,
    apply: fn(&str, &ConvertOptions) -> String,
}

/// The fixed rule table, in application order.
pub const RULES: &[InlineRule] = &[
    InlineRule {
        name: "strong",
        apply: strong,
    },
    InlineRule {
        name: "emphasis",
        apply: emphasis,
    },
    InlineRule {
        name: "code-span",
        apply: code_span,
    },
    InlineRule {
        name: "image",
        apply: image,
    },
    InlineRule {
        name: "link",
        apply: link,
    },
];

/// Runs every rule over `text` in table order.
pub fn apply_rules(text: &str, options: &ConvertOptions) -> String {
    let mut current = text.to_string();
    for rule in RULES {
        current = (rule.apply)(&current, options);
    }
    current
}

fn strong(text: &str, _options: &ConvertOptions) -> String {
    replace_delimited(text, "**", "**", |inner| {
        format!("<strong>{}</strong>", inner)
    })
}

fn emphasis(text: &str, _options: &ConvertOptions) -> String {
    replace_delimited(text, "*", "*", |inner| format!("<em>{}</em>", inner))
}

fn code_span(text: &str, options: &ConvertOptions) -> String {
    let escape = options.escape_inline_code;
    replace_delimited(text, "`", "`", |inner| {
        if escape {
            format!("<code>{}</code>", escape_html(inner))
        } else {
            format!("<code>{}</code>", inner)
        }
    })
}

fn image(text: &str, _options: &ConvertOptions) -> String {
    replace_reference(text, "![", |alt, url| {
        format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width:100%;\">",
            url, alt
        )
    })
}

fn link(text: &str, _options: &ConvertOptions) -> String {
    replace_reference(text, "[", |label, url| {
        format!("<a href=\"{}\">{}</a>", url, label)
    })
}

/// Replaces every shortest `open .. close` pair whose interior is at least
/// one character. An unmatched opener is emitted literally and scanning
/// resumes one character later, the way a backtracking matcher would.
fn replace_delimited(
    text: &str,
    open: &str,
    close: &str,
    render: impl Fn(&str) -> String,
) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len()..];
        let inner_min = match after.chars().next() {
            Some(first) => first.len_utf8(),
            None => break,
        };
        match after[inner_min..].find(close) {
            Some(relative) => {
                out.push_str(&rest[..start]);
                out.push_str(&render(&after[..inner_min + relative]));
                rest = &after[inner_min + relative + close.len()..];
            }
            None => {
                let step = step_len(&rest[start..]);
                out.push_str(&rest[..start + step]);
                rest = &rest[start + step..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replaces every `prefix label ]( url )` reference, label and url each
/// non-empty and shortest-match.
fn replace_reference(text: &str, prefix: &str, render: impl Fn(&str, &str) -> String) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(prefix) {
        let after = &rest[start + prefix.len()..];
        match reference_tail(after) {
            Some((label, url, consumed)) => {
                out.push_str(&rest[..start]);
                out.push_str(&render(label, url));
                rest = &after[consumed..];
            }
            None => {
                let step = step_len(&rest[start..]);
                out.push_str(&rest[..start + step]);
                rest = &rest[start + step..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Matches `label](url)` at the start of `text`. Returns the label, the url,
/// and how many bytes the whole tail consumed.
fn reference_tail(text: &str) -> Option<(&str, &str, usize)> {
    let label_min = text.chars().next()?.len_utf8();
    let label_end = label_min + text[label_min..].find("](")?;
    let label = &text[..label_end];

    let url_part = &text[label_end + 2..];
    let url_min = url_part.chars().next().filter(|ch| *ch != ')')?.len_utf8();
    let url_end = url_min + url_part[url_min..].find(')')?;
    let url = &url_part[..url_end];

    Some((label, url, label_end + 2 + url_end + 1))
}

fn step_len(text: &str) -> usize {
    text.chars().next().map(|ch| ch.len_utf8()).unwrap_or(1)
}
