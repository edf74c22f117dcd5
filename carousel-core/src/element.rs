//! Slide elements - the building blocks of slides.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;

/// Horizontal text alignment override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Style overrides shared by every element variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementStyle {
    /// Extra space above the element, in logical units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    /// Extra space below the element, in logical units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    /// Font size override, in logical units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Text alignment override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

/// Heading level (1-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[allow(missing_docs)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::H1),
            2 => Ok(Self::H2),
            3 => Ok(Self::H3),
            other => Err(format!("heading level must be 1-3, got {other}")),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.get()
    }
}

/// How an image element is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    /// A sized area within the flow.
    #[default]
    Area,
    /// Fills the slide behind the content.
    Background,
    /// Inline with text.
    Inline,
}

/// A single value/label pair of a `stat` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatItem {
    /// The figure, e.g. `"87%"`.
    pub value: String,
    /// What the figure measures.
    pub label: String,
}

/// The type of content an element contains.
///
/// Serialized with a `type` discriminator, e.g. `{"type": "list-item", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// Small uppercase label above a heading.
    Tag {
        /// Text (may contain inline markup).
        content: String,
    },

    /// A heading.
    Heading {
        /// Heading level.
        level: HeadingLevel,
        /// Text (may contain inline markup).
        content: String,
    },

    /// Body text.
    Paragraph {
        /// Text (may contain inline markup).
        content: String,
    },

    /// Secondary line under a heading.
    Subtitle {
        /// Text (may contain inline markup).
        content: String,
    },

    /// A large emoji glyph.
    Emoji {
        /// The emoji itself.
        content: String,
        /// Glyph size in logical units.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<f64>,
    },

    /// An image resolved through the asset resolver.
    Image {
        /// Opaque asset reference.
        src: String,
        /// Alternative text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        /// CSS `object-position` focal point.
        #[serde(
            rename = "objectPosition",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        object_position: Option<String>,
        /// Display variant.
        #[serde(default)]
        variant: ImageVariant,
        /// Corner radius in logical units.
        #[serde(
            rename = "borderRadius",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        border_radius: Option<f64>,
    },

    /// A backdrop fill. Always stacked below the other elements.
    Overlay {
        /// Solid colour or CSS gradient.
        fill: String,
    },

    /// A pull quote.
    Quote {
        /// Quoted text.
        content: String,
        /// Who said it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },

    /// A row of figures.
    Stat {
        /// Value/label pairs.
        items: Vec<StatItem>,
    },

    /// A bullet with an optional icon.
    ListItem {
        /// Bullet icon (emoji or glyph).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        /// Text (may contain inline markup).
        content: String,
    },

    /// Emphasised callout text.
    Highlight {
        /// Text (may contain inline markup).
        content: String,
    },

    /// A horizontal rule.
    Divider,

    /// Fixed vertical space.
    Spacer {
        /// Height in logical units.
        height: f64,
    },
}

impl ElementKind {
    /// The wire name of this variant (`"list-item"`, `"overlay"`, ...).
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Tag { .. } => "tag",
            Self::Heading { .. } => "heading",
            Self::Paragraph { .. } => "paragraph",
            Self::Subtitle { .. } => "subtitle",
            Self::Emoji { .. } => "emoji",
            Self::Image { .. } => "image",
            Self::Overlay { .. } => "overlay",
            Self::Quote { .. } => "quote",
            Self::Stat { .. } => "stat",
            Self::ListItem { .. } => "list-item",
            Self::Highlight { .. } => "highlight",
            Self::Divider => "divider",
            Self::Spacer { .. } => "spacer",
        }
    }

    /// Every variant name accepted on the wire.
    pub const TYPE_NAMES: [&'static str; 13] = [
        "tag",
        "heading",
        "paragraph",
        "subtitle",
        "emoji",
        "image",
        "overlay",
        "quote",
        "stat",
        "list-item",
        "highlight",
        "divider",
        "spacer",
    ];

    /// Mutable access to the primary text of text-bearing variants.
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Tag { content }
            | Self::Heading { content, .. }
            | Self::Paragraph { content }
            | Self::Subtitle { content }
            | Self::Quote { content, .. }
            | Self::ListItem { content, .. }
            | Self::Highlight { content } => Some(content),
            Self::Emoji { .. }
            | Self::Image { .. }
            | Self::Overlay { .. }
            | Self::Stat { .. }
            | Self::Divider
            | Self::Spacer { .. } => None,
        }
    }

    /// The primary text of text-bearing variants.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Tag { content }
            | Self::Heading { content, .. }
            | Self::Paragraph { content }
            | Self::Subtitle { content }
            | Self::Quote { content, .. }
            | Self::ListItem { content, .. }
            | Self::Highlight { content } => Some(content),
            Self::Emoji { .. }
            | Self::Image { .. }
            | Self::Overlay { .. }
            | Self::Stat { .. }
            | Self::Divider
            | Self::Spacer { .. } => None,
        }
    }
}

/// A slide element: identity, content and style.
///
/// Freeform geometry is not part of the element itself; it lives next to it
/// in [`crate::slide::SlideElement`] and only on freeform slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier, unique within the slide.
    pub id: ElementId,
    /// Element content.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Style overrides.
    #[serde(flatten)]
    pub style: ElementStyle,
}

impl Element {
    /// Create a new element with a random id.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            style: ElementStyle::default(),
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the style overrides.
    #[must_use]
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the text alignment override.
    #[must_use]
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.style.text_align = Some(align);
        self
    }

    /// Whether this is an overlay (backdrop) element.
    #[must_use]
    pub const fn is_overlay(&self) -> bool {
        matches!(self.kind, ElementKind::Overlay { .. })
    }

    /// Shorthand for a heading element.
    #[must_use]
    pub fn heading(level: HeadingLevel, content: impl Into<String>) -> Self {
        Self::new(ElementKind::Heading {
            level,
            content: content.into(),
        })
    }

    /// Shorthand for a paragraph element.
    #[must_use]
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(ElementKind::Paragraph {
            content: content.into(),
        })
    }

    /// Shorthand for an overlay element.
    #[must_use]
    pub fn overlay(fill: impl Into<String>) -> Self {
        Self::new(ElementKind::Overlay { fill: fill.into() })
    }
}
