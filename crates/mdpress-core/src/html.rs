/// Escapes the HTML-sensitive characters `&`, `<`, `>`.
///
/// This is the escaping applied to fenced code block content. Inline text is
/// deliberately left alone by the converter; see `ConvertOptions`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<script>1 && 2</script>"),
            "&lt;script&gt;1 &amp;&amp; 2&lt;/script&gt;"
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape_html("plain text"), "plain text");
    }
}
