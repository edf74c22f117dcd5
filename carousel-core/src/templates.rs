//! Preset slides for quick creation.

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementKind, HeadingLevel, ImageVariant, TextAlign};
use crate::geometry::Frame;
use crate::ids::IdAllocator;
use crate::slide::{Slide, SlideElement, SlideLayout};

/// A built-in slide template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum SlideTemplate {
    Blank,
    Cover,
    TitleBody,
    IconList,
    Quote,
    Highlight,
    Cta,
    ImageText,
    Freeform,
}

impl SlideTemplate {
    /// Every template, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Blank,
        Self::Cover,
        Self::TitleBody,
        Self::IconList,
        Self::Quote,
        Self::Highlight,
        Self::Cta,
        Self::ImageText,
        Self::Freeform,
    ];

    /// Menu label.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blank => "Em branco",
            Self::Cover => "Capa",
            Self::TitleBody => "Título + Corpo",
            Self::IconList => "Lista com Ícones",
            Self::Quote => "Citação",
            Self::Highlight => "Destaque",
            Self::Cta => "CTA / Final",
            Self::ImageText => "Imagem + Texto",
            Self::Freeform => "Freeform",
        }
    }

    /// Menu icon.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Blank => "⬜",
            Self::Cover => "🎯",
            Self::TitleBody => "📝",
            Self::IconList => "✅",
            Self::Quote => "❝",
            Self::Highlight => "✨",
            Self::Cta => "📣",
            Self::ImageText => "🖼",
            Self::Freeform => "🎨",
        }
    }

    /// Look a template up by its kebab-case key (`"icon-list"`).
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|template| template.key() == key)
    }

    /// Kebab-case key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Cover => "cover",
            Self::TitleBody => "title-body",
            Self::IconList => "icon-list",
            Self::Quote => "quote",
            Self::Highlight => "highlight",
            Self::Cta => "cta",
            Self::ImageText => "image-text",
            Self::Freeform => "freeform",
        }
    }

    /// Build the slide, drawing every id from `ids`.
    pub fn instantiate(self, ids: &mut IdAllocator) -> Slide {
        let (layout, elements) = self.contents();
        let mut slide = Slide::new(layout);
        slide.id = ids.slide_id();
        for mut record in elements {
            record.element.id = ids.element_id();
            slide = slide.with_element(record);
        }
        slide
    }

    fn contents(self) -> (SlideLayout, Vec<SlideElement>) {
        let centered = |kind| SlideElement::new(Element::new(kind).with_align(TextAlign::Center));
        let heading = |level, text: &str| {
            centered(ElementKind::Heading {
                level,
                content: text.to_string(),
            })
        };
        let paragraph = |text: &str| {
            centered(ElementKind::Paragraph {
                content: text.to_string(),
            })
        };
        let emoji = |glyph: &str, size| {
            SlideElement::new(Element::new(ElementKind::Emoji {
                content: glyph.to_string(),
                size: Some(size),
            }))
        };
        let list_item = |text: &str| {
            SlideElement::new(
                Element::new(ElementKind::ListItem {
                    icon: Some("✓".to_string()),
                    content: text.to_string(),
                })
                .with_align(TextAlign::Left),
            )
        };

        match self {
            Self::Blank => (SlideLayout::TitleBody, Vec::new()),
            Self::Cover => (
                SlideLayout::Cover,
                vec![
                    emoji("🚀", 96.0),
                    heading(HeadingLevel::H1, "Título da Capa"),
                    centered(ElementKind::Subtitle {
                        content: "Subtítulo aqui".to_string(),
                    }),
                ],
            ),
            Self::TitleBody => (
                SlideLayout::TitleBody,
                vec![
                    centered(ElementKind::Tag {
                        content: "TAG".to_string(),
                    }),
                    heading(HeadingLevel::H2, "Título do Slide"),
                    paragraph("Escreva o conteúdo aqui. Você pode editar este texto livremente."),
                ],
            ),
            Self::IconList => (
                SlideLayout::List,
                vec![
                    heading(HeadingLevel::H2, "Lista"),
                    list_item("Primeiro item da lista"),
                    list_item("Segundo item da lista"),
                    list_item("Terceiro item da lista"),
                ],
            ),
            Self::Quote => (
                SlideLayout::Quote,
                vec![
                    centered(ElementKind::Quote {
                        content: "Insira aqui uma citação inspiradora ou relevante para o seu conteúdo."
                            .to_string(),
                        attribution: None,
                    }),
                    emoji("💬", 64.0),
                ],
            ),
            Self::Highlight => (
                SlideLayout::Highlight,
                vec![
                    heading(HeadingLevel::H2, "Destaque"),
                    centered(ElementKind::Highlight {
                        content: "Este é um texto em destaque que chama atenção do leitor."
                            .to_string(),
                    }),
                ],
            ),
            Self::Cta => (
                SlideLayout::Cta,
                vec![
                    heading(HeadingLevel::H1, "Gostou?"),
                    paragraph("Salve este post e compartilhe com quem precisa ver isso!"),
                    emoji("👉", 96.0),
                ],
            ),
            Self::ImageText => (
                SlideLayout::ImageTop,
                vec![
                    SlideElement::new(Element::new(ElementKind::Image {
                        src: String::new(),
                        alt: Some(String::new()),
                        object_position: None,
                        variant: ImageVariant::Area,
                        border_radius: None,
                    })),
                    heading(HeadingLevel::H2, "Título"),
                    paragraph("Descrição da imagem ou conteúdo complementar."),
                ],
            ),
            Self::Freeform => (
                SlideLayout::Freeform,
                vec![heading(HeadingLevel::H1, "Texto Livre").with_frame(Frame {
                    x: Some(80.0),
                    y: Some(200.0),
                    w: Some(920.0),
                    ..Frame::default()
                })],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_instantiate_uses_fresh_ids() {
        let mut ids = IdAllocator::new();
        let a = SlideTemplate::Cta.instantiate(&mut ids);
        let b = SlideTemplate::Cta.instantiate(&mut ids);
        let all: HashSet<_> = a.element_ids().chain(b.element_ids()).collect();
        assert_eq!(all.len(), 6);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_freeform_template_keeps_frame() {
        let slide = SlideTemplate::Freeform.instantiate(&mut IdAllocator::new());
        assert!(slide.is_freeform());
        let id = slide.element_ids().next().expect("heading").clone();
        let frame = slide.frame(&id).expect("frame");
        assert_eq!(frame.w, Some(920.0));
        assert_eq!(frame.h, None);
    }

    #[test]
    fn test_every_template_parses_by_key() {
        for template in SlideTemplate::ALL {
            assert_eq!(SlideTemplate::parse(template.key()), Some(template));
            assert!(!template.name().is_empty());
        }
        assert!(SlideTemplate::Blank.instantiate(&mut IdAllocator::new()).is_empty());
    }
}
