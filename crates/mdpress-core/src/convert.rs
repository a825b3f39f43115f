use crate::html::escape_html;
use crate::rules::apply_rules;

const FENCE: &str = "```";

/// Ordered sequence of raw source lines, terminators stripped.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn new(source: &str) -> Self {
        Self {
            lines: split_lines(source),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConvertOptions {
    /// Escape `&`, `<`, `>` inside inline code spans. Off by default: the
    /// historical behavior passes span contents through verbatim, so untrusted
    /// input needs either this flag or a sanitizing pass over the output.
    pub escape_inline_code: bool,
}

/// Cross-line conversion state. All of it is scoped to one `convert` call;
/// nothing survives across documents.
#[derive(Clone, Debug, Default)]
pub struct ConvertState {
    pub in_code_block: bool,
    pub in_list: bool,
    code_buffer: Vec<String>,
}

impl ConvertState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Converts a document into an ordered sequence of HTML fragments, one
/// fragment per emitted output line. The caller joins them with `\n`.
///
/// Total over any input: malformed constructs degrade to literal text and an
/// unterminated fence is flushed at end of document rather than dropped.
pub fn convert(document: &Document, options: &ConvertOptions) -> Vec<String> {
    let mut state = ConvertState::new();
    let mut fragments = Vec::new();
    for line in document.lines() {
        process_line(line, options, &mut state, &mut fragments);
    }
    finish(&mut state, &mut fragments);
    fragments
}

/// Convenience wrapper: split, convert, and join the body in one step.
pub fn convert_to_html(source: &str, options: &ConvertOptions) -> String {
    convert(&Document::new(source), options).join("\n")
}

/// Like [`convert_to_html`], followed by the allow-list sanitizer.
pub fn convert_to_html_sanitized(source: &str, options: &ConvertOptions) -> String {
    crate::sanitize::sanitize(&convert_to_html(source, options))
}

/// Classifies one line and appends its fragments to `out`. Exposed so the
/// two state flags can be driven and observed line by line; [`convert`] is
/// this in a loop followed by [`finish`].
pub fn process_line(
    line: &str,
    options: &ConvertOptions,
    state: &mut ConvertState,
    out: &mut Vec<String>,
) {
    // Fence lines toggle the code block and are swallowed, language tag and
    // all. They never reach the inline rules.
    if line.trim().starts_with(FENCE) {
        if state.in_code_block {
            flush_code_block(state, out);
        } else {
            state.in_code_block = true;
        }
        return;
    }

    if state.in_code_block {
        state.code_buffer.push(line.to_string());
        return;
    }

    if let Some(rest) = list_item_text(line) {
        if !state.in_list {
            out.push("<ul>".to_string());
            state.in_list = true;
        }
        out.push(format!("<li>{}</li>", apply_rules(rest, options)));
        return;
    }

    // Any non-list line terminates an open run, then classifies normally.
    if state.in_list {
        out.push("</ul>".to_string());
        state.in_list = false;
    }

    if let Some((level, rest)) = heading_text(line) {
        out.push(format!(
            "<h{}>{}</h{}>",
            level,
            apply_rules(rest, options),
            level
        ));
        return;
    }

    let processed = apply_rules(line, options);
    let trimmed = processed.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        out.push(format!("<p>{}</p>", processed));
    } else {
        // Already-tagged output and blank lines pass through unwrapped; the
        // empty fragment preserves vertical spacing in the joined body.
        out.push(processed);
    }
}

/// Closes whatever the document left open: an unfinished list run gets its
/// closing fragment, an unterminated fence is flushed as a code block so no
/// buffered content is lost.
pub fn finish(state: &mut ConvertState, out: &mut Vec<String>) {
    if state.in_list {
        out.push("</ul>".to_string());
        state.in_list = false;
    }
    if state.in_code_block {
        flush_code_block(state, out);
    }
}

fn flush_code_block(state: &mut ConvertState, out: &mut Vec<String>) {
    out.push("<pre><code>".to_string());
    for line in state.code_buffer.drain(..) {
        out.push(escape_html(&line));
    }
    out.push("</code></pre>".to_string());
    state.in_code_block = false;
}

fn list_item_text(line: &str) -> Option<&str> {
    let rest = line.trim_start();
    rest.strip_prefix("- ").or_else(|| rest.strip_prefix("* "))
}

fn heading_text(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim();
    let level = trimmed.bytes().take_while(|byte| *byte == b'#').count();
    if !(1..=4).contains(&level) {
        return None;
    }
    trimmed[level..].strip_prefix(' ').map(|rest| (level, rest))
}

fn split_lines(source: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(strip_cr(&source[start..idx]));
            start = idx + 1;
        }
    }
    lines.push(strip_cr(&source[start..]));
    lines
}

fn strip_cr(line: &str) -> String {
    line.strip_suffix('\r').unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::{Document, split_lines};

    #[test]
    fn split_strips_terminators() {
        assert_eq!(split_lines("a\r\nb\nc"), ["a", "b", "c"]);
    }

    #[test]
    fn trailing_newline_yields_empty_final_line() {
        assert_eq!(split_lines("a\n"), ["a", ""]);
        assert_eq!(Document::new("").lines(), [""]);
    }
}
