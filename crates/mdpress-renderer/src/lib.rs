mod pdf;

pub use pdf::{PdfBackend, PdfMargin, PdfOptions, export_pdf};

use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

const BASE_CSS: &str = include_str!("../assets/mdpress.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
}

/// Wraps a converted HTML body in a styled page. The converter itself is
/// deterministic; the generation timestamp lives here, in the template.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, true));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&indent_root_block(&dark_vars));
                out.push_str("}\n");
            }
            Theme::Light => {
                out.push_str(&root_block(&light_vars, true));
            }
            Theme::Dark => {
                out.push_str(&root_block(&dark_vars, true));
            }
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, false));
        }

        out.push_str(BASE_CSS);
        out
    }

    /// Full document page: head with inline stylesheet, header card with the
    /// title and generation stamp, the body, and a footer card.
    pub fn page(&self, title: &str, body: &str) -> String {
        self.page_with(title, body, None, None)
    }

    /// Bare wrapper without the header/footer chrome, for embedding.
    pub fn embed(&self, body: &str) -> String {
        let mut out = String::new();
        push_head(&mut out, None, None, &self.stylesheet());
        out.push_str("<body>\n");
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    pub(crate) fn page_with(
        &self,
        title: &str,
        body: &str,
        base_url: Option<&str>,
        extra_css: Option<&str>,
    ) -> String {
        let mut css = self.stylesheet();
        if let Some(extra) = extra_css {
            css.push_str(extra);
        }

        let mut out = String::new();
        push_head(&mut out, Some(title), base_url, &css);
        out.push_str("<body>\n");
        out.push_str("  <div class=\"document-header\">\n");
        out.push_str(&format!("    <h1>{}</h1>\n", escape_text(title)));
        out.push_str(&format!(
            "    <p><strong>Generated:</strong> {}</p>\n",
            generated_stamp()
        ));
        out.push_str("  </div>\n");
        out.push_str("  <div class=\"content\">\n");
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("  </div>\n");
        out.push_str("  <div class=\"document-footer\">\n");
        out.push_str("    <p><em>Generated by mdpress</em></p>\n");
        out.push_str("  </div>\n");
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    /// Writes the stylesheet next to emitted HTML for external-stylesheet use.
    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("mdpress.css"), self.stylesheet())?;
        Ok(())
    }
}

fn push_head(out: &mut String, title: Option<&str>, base_url: Option<&str>, css: &str) {
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html lang=\"en\">\n");
    out.push_str("<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    if let Some(base) = base_url {
        out.push_str(&format!("  <base href=\"{}\" />\n", escape_text(base)));
    }
    if let Some(title) = title {
        out.push_str(&format!("  <title>{}</title>\n", escape_text(title)));
    }
    out.push_str("  <style>\n");
    out.push_str(css);
    out.push_str("\n  </style>\n");
    out.push_str("</head>\n");
}

fn generated_stamp() -> String {
    Local::now().format("%B %d, %Y at %H:%M:%S").to_string()
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--mdpress-bg".to_string(), "#ffffff".to_string()),
        ("--mdpress-fg".to_string(), "#333333".to_string()),
        ("--mdpress-muted".to_string(), "#666666".to_string()),
        ("--mdpress-border".to_string(), "#dddddd".to_string()),
        ("--mdpress-accent".to_string(), "#3498db".to_string()),
        ("--mdpress-heading".to_string(), "#2c3e50".to_string()),
        ("--mdpress-code-bg".to_string(), "#f1f3f4".to_string()),
        ("--mdpress-code-fg".to_string(), "#333333".to_string()),
        ("--mdpress-pre-bg".to_string(), "#f8f9fa".to_string()),
        ("--mdpress-card-bg".to_string(), "#f8f9fa".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--mdpress-bg".to_string(), "#0e1116".to_string()),
        ("--mdpress-fg".to_string(), "#e6edf3".to_string()),
        ("--mdpress-muted".to_string(), "#9aa4af".to_string()),
        ("--mdpress-border".to_string(), "#2a313b".to_string()),
        ("--mdpress-accent".to_string(), "#63b3ed".to_string()),
        ("--mdpress-heading".to_string(), "#e6edf3".to_string()),
        ("--mdpress-code-bg".to_string(), "#202634".to_string()),
        ("--mdpress-code-fg".to_string(), "#f0f6fc".to_string()),
        ("--mdpress-pre-bg".to_string(), "#161b24".to_string()),
        ("--mdpress-card-bg".to_string(), "#1b212b".to_string()),
    ]);

    (light, dark)
}

fn format_vars(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in vars {
        out.push_str("  ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out
}

fn root_block(vars: &BTreeMap<String, String>, include_color_scheme: bool) -> String {
    let mut out = String::new();
    out.push_str(":root {\n");
    if include_color_scheme {
        out.push_str("  color-scheme: light dark;\n");
    }
    out.push_str(&format_vars(vars));
    out.push_str("}\n");
    out
}

fn indent_root_block(vars: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("  :root {\n");
    out.push_str("    color-scheme: light dark;\n");
    for (key, value) in vars {
        out.push_str("    ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str("  }\n");
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Renderer, Theme};

    #[test]
    fn page_wraps_body_with_title_and_chrome() {
        let renderer = Renderer::new(Theme::Light);
        let html = renderer.page("My Doc", "<p>Hi</p>");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>My Doc</title>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("document-header"));
        assert!(html.contains("Generated:"));
        assert!(html.contains("<p>Hi</p>"));
    }

    #[test]
    fn page_escapes_title_markup() {
        let renderer = Renderer::new(Theme::Light);
        let html = renderer.page("<Fancy> & Co", "<p>x</p>");
        assert!(html.contains("<title>&lt;Fancy&gt; &amp; Co</title>"));
    }

    #[test]
    fn embed_skips_header_and_footer() {
        let renderer = Renderer::new(Theme::Light);
        let html = renderer.embed("<p>Hi</p>");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(!html.contains("document-header"));
        assert!(!html.contains("Generated:"));
    }

    #[test]
    fn auto_theme_carries_dark_media_query() {
        let auto = Renderer::new(Theme::Auto).stylesheet();
        assert!(auto.contains("prefers-color-scheme: dark"));
        let light = Renderer::new(Theme::Light).stylesheet();
        assert!(!light.contains("prefers-color-scheme"));
    }

    #[test]
    fn generate_files_writes_the_stylesheet() {
        let out_dir = std::env::temp_dir().join(format!(
            "mdpress_assets_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ));
        let renderer = Renderer::new(Theme::Auto);
        renderer.generate_files(&out_dir).expect("generate files");
        let css = std::fs::read_to_string(out_dir.join("mdpress.css")).expect("stylesheet");
        assert!(css.contains("--mdpress-bg"));
        let _ = std::fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn custom_vars_append_a_root_block() {
        let css = Renderer::new(Theme::Light)
            .with_var("--mdpress-accent", "#ff0000")
            .stylesheet();
        assert!(css.contains("--mdpress-accent: #ff0000;"));
    }
}
