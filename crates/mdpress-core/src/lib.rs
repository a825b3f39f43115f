mod convert;
mod html;
mod rules;
mod sanitize;

pub use convert::{
    ConvertOptions, ConvertState, Document, convert, convert_to_html, convert_to_html_sanitized,
    finish, process_line,
};
pub use html::escape_html;
pub use rules::{InlineRule, RULES, apply_rules};
pub use sanitize::sanitize;
