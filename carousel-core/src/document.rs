//! The carousel document: root aggregate of slides, theme and metadata.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::CanvasSize;
use crate::slide::{Slide, SlideLayout};
use crate::theme::Theme;

/// Current persisted schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// JSON schema URL stamped on new documents.
pub const SCHEMA_URL: &str = "https://carousel-editor.app/schema/v1.json";

/// Generator name stamped on new documents.
pub const GENERATOR: &str = "carousel-editor";

/// Generator version stamped on new documents.
pub const GENERATOR_VERSION: &str = "2.0.0";

/// Current time as an RFC 3339 timestamp with millisecond precision.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Publication format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum DocumentFormat {
    #[default]
    Carousel,
    SinglePost,
}

/// Header shown on every slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Social handle, e.g. `@brand`.
    pub handle: String,
    /// Whether to show the `n/total` slide counter.
    pub show_counter: bool,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            handle: "@meuhandle".to_string(),
            show_counter: true,
        }
    }
}

/// Footer text casing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum FooterStyle {
    #[default]
    Uppercase,
    Normal,
}

/// Footer shown on every slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer text.
    pub text: String,
    /// Casing.
    #[serde(default)]
    pub style: FooterStyle,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            text: "MINHA MARCA".to_string(),
            style: FooterStyle::Uppercase,
        }
    }
}

/// A complete carousel.
///
/// This is the persisted interchange format. Fields this version does not
/// know about are kept in [`CarouselDocument::extra`] and written back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselDocument {
    /// JSON schema URL.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Schema version.
    pub version: u32,
    /// Producing tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Producing tool version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_version: Option<String>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last save.
    pub updated_at: String,
    /// Document id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Publication format.
    #[serde(default)]
    pub format: DocumentFormat,
    /// Logical canvas size (always 1080×1440 for carousels).
    pub canvas: CanvasSize,
    /// Header settings.
    pub header: Header,
    /// Footer settings.
    pub footer: Footer,
    /// The one theme.
    pub theme: Theme,
    /// Slides, in order.
    pub slides: Vec<Slide>,
    /// Unknown top-level fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CarouselDocument {
    /// An empty document with default metadata and no slides.
    #[must_use]
    pub fn new_empty(id: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            schema: Some(SCHEMA_URL.to_string()),
            version: SCHEMA_VERSION,
            generator: Some(GENERATOR.to_string()),
            generator_version: Some(GENERATOR_VERSION.to_string()),
            created_at: now.clone(),
            updated_at: now,
            id: id.into(),
            title: "Novo Carrossel".to_string(),
            description: None,
            tags: None,
            format: DocumentFormat::Carousel,
            canvas: CanvasSize::default(),
            header: Header::default(),
            footer: Footer::default(),
            theme: Theme::default(),
            slides: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// An empty document holding one blank `title-body` slide, ready to edit.
    #[must_use]
    pub fn new_editable(id: impl Into<String>) -> Self {
        let mut doc = Self::new_empty(id);
        doc.slides.push(Slide::new(SlideLayout::TitleBody));
        doc
    }

    /// Builder-style title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder-style slide append.
    #[must_use]
    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Slide at `index`.
    #[must_use]
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Mutable slide at `index`.
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    /// Total number of elements across all slides.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.slides.iter().map(Slide::len).sum()
    }

    /// Refresh `updatedAt` to now.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }
}
