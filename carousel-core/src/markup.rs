//! Inline markup handling for element text.
//!
//! Text fields may carry a small subset of HTML produced by the rich-text
//! toolbar (`<b>`, `<i>`, `<u>`, `<br>`, `<span style=..>`). Imported
//! documents go through [`sanitize`]; exports go through [`to_markdown`].

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tags that survive sanitizing.
pub const ALLOWED_TAGS: [&str; 7] = ["b", "strong", "i", "em", "u", "br", "span"];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<(/?)([a-z][a-z0-9-]*)\b([^>]*)>"));
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?is)([a-z][a-z0-9_:.-]*)\s*=\s*("[^"]*"|'[^']*'|[^\s"'>]+)"#)
});

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?is)<(?:strong|b)>(.*?)</(?:strong|b)>"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<(?:em|i)>(.*?)</(?:em|i)>"));
static UNDERLINE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?is)<u>(.*?)</u>"));
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)<br\s*/?>"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<[^>]+>"));

/// Remove unsafe markup: script and style blocks and every tag outside
/// [`ALLOWED_TAGS`] (its text is kept). Allowed tags are rebuilt from their
/// name; the only attribute carried over is a plain `style` on `<span>`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    if !input.contains('<') {
        return input.to_string();
    }
    let without_blocks = SCRIPT_OR_STYLE.replace_all(input, "");
    TAG.replace_all(&without_blocks, |caps: &Captures<'_>| {
        let name = caps[2].to_ascii_lowercase();
        if !ALLOWED_TAGS.contains(&name.as_str()) {
            return String::new();
        }
        if !caps[1].is_empty() {
            return format!("</{name}>");
        }
        rebuild_open_tag(&name, &caps[3])
    })
    .into_owned()
}

fn rebuild_open_tag(name: &str, attrs: &str) -> String {
    let mut tag = format!("<{name}");
    if name == "span" {
        let style = ATTR
            .captures_iter(attrs)
            .find(|attr| attr[1].eq_ignore_ascii_case("style"))
            .map(|attr| unquote(&attr[2]).to_string());
        if let Some(style) = style.filter(|value| is_safe_style(value)) {
            tag.push_str(&format!(" style=\"{style}\""));
        }
    }
    tag.push_str(if attrs.trim_end().ends_with('/') { "/>" } else { ">" });
    tag
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

fn is_safe_style(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    !["javascript:", "expression(", "url(", "<", ">", "\"", "\\"]
        .iter()
        .any(|needle| compact.contains(needle))
}

/// Convert inline markup to Markdown: bold and italic map to `**`/`*`,
/// underline and other tags are dropped, `<br>` becomes a newline and the
/// common entities are decoded. The result is trimmed.
#[must_use]
pub fn to_markdown(html: &str) -> String {
    let md = BOLD.replace_all(html, "**$1**");
    let md = ITALIC.replace_all(&md, "*$1*");
    let md = UNDERLINE.replace_all(&md, "$1");
    let md = LINE_BREAK.replace_all(&md, "\n");
    let md = ANY_TAG.replace_all(&md, "");
    md.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}
