//! Letter body rendering: Markdown to sanitised HTML, or plain text.

use std::collections::HashSet;

use ammonia::Builder;
use comrak::{markdown_to_html, Options};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

static MARKDOWN_OPTIONS: Lazy<Options<'static>> = Lazy::new(|| {
    let mut opts = Options::default();
    opts.extension.strikethrough = true;
    // Single newlines inside a paragraph are line breaks in letters.
    opts.render.hardbreaks = true;
    // Raw HTML passes through comrak and is cleaned by the sanitizer below.
    opts.render.r#unsafe = true;
    opts
});

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut b = Builder::default();
    b.url_schemes(
        ["http", "https", "mailto"]
            .into_iter()
            .collect::<HashSet<_>>(),
    );
    b.clean_content_tags(["script", "style"].into_iter().collect::<HashSet<_>>());
    b
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContentFormat {
    /// Body kept as written; the terminal reader uses this.
    #[default]
    Plain,
    /// Body rendered from Markdown into sanitised HTML.
    Html,
}

pub fn render_body(markdown: &str, format: ContentFormat) -> String {
    match format {
        ContentFormat::Plain => markdown.trim().to_string(),
        ContentFormat::Html => render_safe_html(markdown),
    }
}

pub fn render_safe_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }
    let html = markdown_to_html(markdown, &MARKDOWN_OPTIONS);
    SANITIZER.clean(&html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_format_only_trims() {
        assert_eq!(
            render_body("\n  *Dear* you,\nhi  \n\n", ContentFormat::Plain),
            "*Dear* you,\nhi"
        );
    }

    #[test]
    fn single_newlines_become_breaks() {
        let html = render_body("Dear you,\nI missed you.", ContentFormat::Html);
        assert!(html.contains("<br"), "got {html}");
        assert!(html.contains("I missed you."));
    }

    #[test]
    fn emphasis_renders() {
        let html = render_safe_html("**always** yours");
        insta::assert_snapshot!(html.trim_end(), @"<p><strong>always</strong> yours</p>");
    }

    #[test]
    fn script_tags_are_removed() {
        let html = render_safe_html("hello <script>alert('x')</script>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn javascript_links_are_dropped() {
        let html = render_safe_html("[tap](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn empty_body_renders_empty() {
        assert_eq!(render_safe_html("  \n"), "");
    }

    #[test]
    fn format_parses_from_config_strings() {
        assert_eq!("html".parse::<ContentFormat>().unwrap(), ContentFormat::Html);
        assert_eq!(ContentFormat::Plain.to_string(), "plain");
    }
}
