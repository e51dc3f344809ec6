//! YAML frontmatter parsing and Markdown-to-HTML rendering.

use pulldown_cmark::Parser;
use serde::Deserialize;

/// Note fields recognized in a YAML frontmatter block. Unknown keys are
/// ignored; values are trimmed and empty strings collapse to `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FrontmatterMeta {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Split a leading YAML frontmatter block off a Markdown document.
///
/// The block must open the document with a `---` line and close with another
/// `---` line. Absent or malformed frontmatter is not an error: the whole
/// input is returned as the body with no metadata.
///
/// # Returns
/// Parsed frontmatter (if any) and the body with the block removed.
pub fn split_frontmatter(content: &str) -> (Option<FrontmatterMeta>, &str) {
    let Some(after_open) = content.strip_prefix("---") else {
        return (None, content);
    };
    if !after_open.is_empty() && !after_open.starts_with('\n') && !after_open.starts_with("\r\n") {
        return (None, content);
    }
    let Some(close_pos) = after_open.find("\n---") else {
        return (None, content);
    };

    let yaml_str = &after_open[..close_pos];
    let body = after_open[close_pos + 4..].trim_start_matches(['\r', '\n']);

    let meta = if yaml_str.trim().is_empty() {
        Some(FrontmatterMeta::default())
    } else {
        serde_yaml::from_str::<FrontmatterMeta>(yaml_str).ok()
    };
    match meta {
        Some(meta) => (Some(meta.normalized()), body),
        None => (None, content),
    }
}

impl FrontmatterMeta {
    fn normalized(self) -> Self {
        Self {
            title: normalize_field(self.title),
            category: normalize_field(self.category),
            description: normalize_field(self.description),
        }
    }
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Render a Markdown body to sanitized HTML.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    // Sanitize HTML to prevent XSS from raw HTML in markdown
    ammonia::clean(&html_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frontmatter_and_body() {
        let content = "---\ntitle: My Note\ncategory: Ideas\n---\n\n# Body\n\nText.";
        let (meta, body) = split_frontmatter(content);
        let meta = meta.expect("frontmatter should parse");
        assert_eq!(meta.title.as_deref(), Some("My Note"));
        assert_eq!(meta.category.as_deref(), Some("Ideas"));
        assert!(meta.description.is_none());
        assert_eq!(body, "# Body\n\nText.");
    }

    #[test]
    fn content_without_frontmatter_is_all_body() {
        let content = "# Just a note\n\nNo frontmatter here.";
        let (meta, body) = split_frontmatter(content);
        assert!(meta.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn malformed_yaml_is_treated_as_body() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        let (meta, body) = split_frontmatter(content);
        assert!(meta.is_none());
        assert_eq!(body, content, "malformed frontmatter must not eat content");
    }

    #[test]
    fn unclosed_block_is_treated_as_body() {
        let content = "---\ntitle: My Note\nno closing fence";
        let (meta, body) = split_frontmatter(content);
        assert!(meta.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn empty_block_parses_to_empty_meta() {
        let (meta, body) = split_frontmatter("---\n---\nbody line");
        assert_eq!(meta, Some(FrontmatterMeta::default()));
        assert_eq!(body, "body line");
    }

    #[test]
    fn unknown_keys_are_ignored_and_values_trimmed() {
        let content = "---\ntitle: '  Padded  '\ndraft: true\ndescription: ''\n---\nbody";
        let (meta, body) = split_frontmatter(content);
        let meta = meta.expect("frontmatter should parse");
        assert_eq!(meta.title.as_deref(), Some("Padded"));
        assert!(meta.description.is_none(), "empty values collapse to None");
        assert_eq!(body, "body");
    }

    #[test]
    fn handles_crlf_documents() {
        let content = "---\r\ntitle: Windows Note\r\n---\r\nbody here";
        let (meta, body) = split_frontmatter(content);
        assert_eq!(
            meta.expect("frontmatter should parse").title.as_deref(),
            Some("Windows Note")
        );
        assert_eq!(body, "body here");
    }

    #[test]
    fn renders_markdown_to_html() {
        let html = render_html("# Hello\n\nSome *emphasis* here.");
        assert!(html.contains("<h1>"), "heading should render: {}", html);
        assert!(html.contains("<em>emphasis</em>"), "emphasis should render: {}", html);
    }

    #[test]
    fn sanitizes_raw_html_in_markdown() {
        let html = render_html("safe text\n\n<script>alert('xss')</script>");
        assert!(!html.contains("<script>"), "script tags must be removed: {}", html);
        assert!(html.contains("safe text"));
    }
}
