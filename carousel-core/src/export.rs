//! Text exports: pretty JSON and readable Markdown.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::CarouselDocument;
use crate::element::{Element, ElementKind};
use crate::error::CarouselResult;
use crate::geometry::Frame;
use crate::markup;
use crate::slide::{Slide, SlideBody};

/// Vertical distance within which two freeform elements count as one row.
const ROW_TOLERANCE: f64 = 20.0;

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[^a-z0-9]+").unwrap_or_else(|e| panic!("invalid built-in pattern: {e}"))
});

/// Serialize `doc` as pretty JSON with `updatedAt` set to now.
pub fn to_json(doc: &CarouselDocument) -> CarouselResult<String> {
    let mut output = doc.clone();
    output.touch();
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Render `doc` as Markdown, one section per slide.
#[must_use]
pub fn to_markdown(doc: &CarouselDocument) -> String {
    let mut parts = Vec::new();
    let title = if doc.title.is_empty() {
        "Carrossel sem título"
    } else {
        doc.title.as_str()
    };
    parts.push(format!("# {title}"));
    if let Some(description) = doc.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("> {description}"));
    }
    if let Some(tags) = doc.tags.as_ref().filter(|tags| !tags.is_empty()) {
        parts.push(format!("Tags: {}", tags.join(", ")));
    }
    parts.push("---".to_string());
    for (index, slide) in doc.slides.iter().enumerate() {
        parts.push(slide_to_markdown(slide, index));
    }
    let mut markdown = parts.join("\n\n");
    markdown.push('\n');
    markdown
}

/// File-name slug for `title`: ASCII lowercase words joined by `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let folded: String = title.chars().map(fold_diacritic).collect::<String>().to_lowercase();
    let slug = NON_ALNUM.replace_all(&folded, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "carrossel".to_string()
    } else {
        slug.to_string()
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

fn slide_to_markdown(slide: &Slide, index: usize) -> String {
    let header = format!("## Slide {} — {}", index + 1, slide.layout().label());
    let elements: Vec<&Element> = match slide.body() {
        SlideBody::Flow { elements, .. } => elements.iter().collect(),
        SlideBody::Freeform { elements } => {
            let mut sorted: Vec<_> = elements.iter().collect();
            sorted.sort_by(|a, b| reading_order(&a.frame, &b.frame));
            sorted.into_iter().map(|entry| &entry.element).collect()
        }
    };
    let lines: Vec<String> = elements.into_iter().filter_map(element_to_markdown).collect();
    if lines.is_empty() {
        format!("{header}\n\n*(slide vazio)*")
    } else {
        format!("{header}\n\n{}", lines.join("\n\n"))
    }
}

/// Top to bottom; elements on the same row left to right.
fn reading_order(a: &Frame, b: &Frame) -> Ordering {
    let (ay, by) = (a.y.unwrap_or(0.0), b.y.unwrap_or(0.0));
    if (ay - by).abs() <= ROW_TOLERANCE {
        a.x.unwrap_or(0.0).total_cmp(&b.x.unwrap_or(0.0))
    } else {
        ay.total_cmp(&by)
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn element_to_markdown(element: &Element) -> Option<String> {
    match &element.kind {
        ElementKind::Heading { level, content } => non_empty(markup::to_markdown(content))
            .map(|text| format!("{} {text}", "#".repeat(usize::from(level.get())))),
        ElementKind::Tag { content } => {
            non_empty(markup::to_markdown(content)).map(|text| format!("**{text}**"))
        }
        ElementKind::Subtitle { content } => {
            non_empty(markup::to_markdown(content)).map(|text| format!("*{text}*"))
        }
        ElementKind::Paragraph { content } => non_empty(markup::to_markdown(content)),
        ElementKind::Quote {
            content,
            attribution,
        } => {
            let text = non_empty(markup::to_markdown(content))?;
            let mut out = format!("> \"{text}\"");
            if let Some(attribution) = attribution.as_deref().filter(|a| !a.is_empty()) {
                out.push_str(&format!("\n> — {}", markup::to_markdown(attribution)));
            }
            Some(out)
        }
        ElementKind::ListItem { icon, content } => {
            let text = non_empty(markup::to_markdown(content))?;
            let icon = icon
                .as_deref()
                .filter(|icon| !icon.is_empty())
                .map(|icon| format!("{icon} "))
                .unwrap_or_default();
            Some(format!("- {icon}{text}"))
        }
        ElementKind::Highlight { content } => {
            non_empty(markup::to_markdown(content)).map(|text| format!("> **{text}**"))
        }
        ElementKind::Emoji { content, .. } => non_empty(content.clone()),
        ElementKind::Image { src, alt, .. } => {
            let alt = alt.as_deref().filter(|alt| !alt.is_empty()).unwrap_or("imagem");
            Some(format!("![{alt}]({src})"))
        }
        ElementKind::Stat { items } => {
            let lines: Vec<String> = items
                .iter()
                .map(|item| format!("- **{}** {}", item.value, markup::to_markdown(&item.label)))
                .collect();
            non_empty(lines.join("\n"))
        }
        ElementKind::Divider => Some("---".to_string()),
        ElementKind::Spacer { .. } => Some(String::new()),
        ElementKind::Overlay { .. } => None,
    }
}
