use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Cleans converted output against an allow-list covering exactly the tags
/// the converter can emit. Anything else -- script elements, event handler
/// attributes, unexpected markup smuggled in through inline text -- is
/// stripped.
pub fn sanitize(html: &str) -> String {
    let tags: HashSet<&'static str> = [
        "a", "code", "em", "h1", "h2", "h3", "h4", "img", "li", "p", "pre", "strong", "ul",
    ]
    .iter()
    .copied()
    .collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href"].iter().copied().collect());
    tag_attributes.insert("img", ["src", "alt", "style"].iter().copied().collect());

    Builder::new()
        .tags(tags)
        .tag_attributes(tag_attributes)
        .clean(html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn strips_script_elements() {
        let clean = sanitize("<p>ok</p><script>alert(1)</script>");
        assert!(clean.contains("<p>ok</p>"));
        assert!(!clean.contains("script"));
    }

    #[test]
    fn keeps_emitted_tags() {
        let clean = sanitize("<ul><li><a href=\"https://x\">x</a></li></ul>");
        assert!(clean.contains("<a href=\"https://x\""));
        assert!(clean.contains("<li>"));
    }

    #[test]
    fn drops_event_handler_attributes() {
        let clean = sanitize("<img src=\"u\" onerror=\"alert(1)\">");
        assert!(!clean.contains("onerror"));
    }
}
