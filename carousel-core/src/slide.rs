//! Slides and their element stacks.
//!
//! A slide body is either a flow layout (elements positioned by a named
//! template, no coordinates) or freeform (every element carries a [`Frame`]).
//! Keeping the two apart in [`SlideBody`] means a flow element simply has
//! nowhere to put stale freeform geometry.
//!
//! On the wire both shapes look the same: a `layout` string plus an array of
//! [`SlideElement`] objects whose freeform fields are optional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::geometry::{CanvasSize, Frame, Rect};
use crate::ids::{ElementId, IdAllocator, SlideId};

/// Slide layout mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum SlideLayout {
    Cover,
    #[default]
    TitleBody,
    FullText,
    ImageTop,
    ImageBottom,
    ImageFull,
    Stats,
    Quote,
    List,
    Highlight,
    Cta,
    Freeform,
}

impl SlideLayout {
    /// Every layout, in menu order.
    pub const ALL: [Self; 12] = [
        Self::Cover,
        Self::TitleBody,
        Self::FullText,
        Self::ImageTop,
        Self::ImageBottom,
        Self::ImageFull,
        Self::Stats,
        Self::Quote,
        Self::List,
        Self::Highlight,
        Self::Cta,
        Self::Freeform,
    ];

    /// Whether this is the absolute-positioning layout.
    #[must_use]
    pub const fn is_freeform(self) -> bool {
        matches!(self, Self::Freeform)
    }

    /// The wire name (`"title-body"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::TitleBody => "title-body",
            Self::FullText => "full-text",
            Self::ImageTop => "image-top",
            Self::ImageBottom => "image-bottom",
            Self::ImageFull => "image-full",
            Self::Stats => "stats",
            Self::Quote => "quote",
            Self::List => "list",
            Self::Highlight => "highlight",
            Self::Cta => "cta",
            Self::Freeform => "freeform",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.as_str() == name)
    }

    /// Human-readable label, e.g. `"Title Body"`.
    #[must_use]
    pub fn label(self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An element as exchanged with callers: content plus optional freeform frame.
///
/// This is the JSON shape of an entry in a slide's `elements` array and the
/// payload of element edits. On a flow slide the frame is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideElement {
    /// Element content.
    #[serde(flatten)]
    pub element: Element,
    /// Freeform geometry.
    #[serde(flatten)]
    pub frame: Frame,
}

impl SlideElement {
    /// Wrap an element with no geometry.
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self {
            element,
            frame: Frame::default(),
        }
    }

    /// Set the frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Element id.
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.element.id
    }
}

impl From<Element> for SlideElement {
    fn from(element: Element) -> Self {
        Self::new(element)
    }
}

/// Direction for a one-step element move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards index 0.
    Up,
    /// Towards the end of the array.
    Down,
}

/// Layout-conditioned element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideBody {
    /// Template-driven layout; order is flow order.
    Flow {
        /// The layout template. Never [`SlideLayout::Freeform`].
        layout: SlideLayout,
        /// Elements in flow order.
        elements: Vec<Element>,
    },
    /// Absolute positioning; array index is stacking order (last on top).
    Freeform {
        /// Elements bottom to top.
        elements: Vec<SlideElement>,
    },
}

/// Storage-agnostic access to one entry of a slide body.
trait Layer: Sized {
    fn element(&self) -> &Element;
    fn element_mut(&mut self) -> &mut Element;
    fn from_record(record: SlideElement) -> Self;
    fn into_record(self) -> SlideElement;
}

impl Layer for Element {
    fn element(&self) -> &Element {
        self
    }

    fn element_mut(&mut self) -> &mut Element {
        self
    }

    fn from_record(record: SlideElement) -> Self {
        record.element
    }

    fn into_record(self) -> SlideElement {
        SlideElement::new(self)
    }
}

impl Layer for SlideElement {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn from_record(record: SlideElement) -> Self {
        record
    }

    fn into_record(self) -> SlideElement {
        self
    }
}

macro_rules! with_layers {
    ($body:expr, $layers:ident => $e:expr) => {
        match $body {
            SlideBody::Flow {
                elements: $layers, ..
            } => $e,
            SlideBody::Freeform { elements: $layers } => $e,
        }
    };
}

fn position<T: Layer>(layers: &[T], id: &ElementId) -> Option<usize> {
    layers.iter().position(|layer| &layer.element().id == id)
}

fn overlays_first<T: Layer>(layers: &mut Vec<T>) {
    let (overlays, rest): (Vec<T>, Vec<T>) = std::mem::take(layers)
        .into_iter()
        .partition(|layer| layer.element().is_overlay());
    layers.extend(overlays);
    layers.extend(rest);
}

/// One page of the carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SlideRecord", into = "SlideRecord")]
pub struct Slide {
    /// Identifier, unique within the document.
    pub id: SlideId,
    body: SlideBody,
    /// Background colour or gradient.
    pub background: Option<String>,
    /// Opaque background image reference.
    pub background_image: Option<String>,
    /// Background focal point (CSS `background-position`).
    pub background_position: Option<String>,
}

impl Slide {
    /// Create an empty slide with a random id.
    #[must_use]
    pub fn new(layout: SlideLayout) -> Self {
        Self::from_parts(SlideId::generate(), layout, Vec::new())
    }

    /// Build a slide from wire-shaped parts. Frames are dropped on flow layouts.
    #[must_use]
    pub fn from_parts(id: SlideId, layout: SlideLayout, elements: Vec<SlideElement>) -> Self {
        let body = if layout.is_freeform() {
            SlideBody::Freeform { elements }
        } else {
            SlideBody::Flow {
                layout,
                elements: elements.into_iter().map(|record| record.element).collect(),
            }
        };
        Self {
            id,
            body,
            background: None,
            background_image: None,
            background_position: None,
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<SlideId>) -> Self {
        self.id = id.into();
        self
    }

    /// Append an element (builder style).
    #[must_use]
    pub fn with_element(mut self, element: impl Into<SlideElement>) -> Self {
        let len = self.len();
        self.insert(len, element.into());
        self
    }

    /// Current layout.
    #[must_use]
    pub fn layout(&self) -> SlideLayout {
        match &self.body {
            SlideBody::Flow { layout, .. } => *layout,
            SlideBody::Freeform { .. } => SlideLayout::Freeform,
        }
    }

    /// Whether the slide is in freeform mode.
    #[must_use]
    pub fn is_freeform(&self) -> bool {
        matches!(self.body, SlideBody::Freeform { .. })
    }

    /// The layout-conditioned body.
    #[must_use]
    pub fn body(&self) -> &SlideBody {
        &self.body
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        with_layers!(&self.body, layers => layers.len())
    }

    /// Whether the slide has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in array order.
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        match &self.body {
            SlideBody::Flow { elements, .. } => Box::new(elements.iter()),
            SlideBody::Freeform { elements } => Box::new(elements.iter().map(|e| &e.element)),
        }
    }

    /// Mutable elements in array order.
    pub fn elements_mut(&mut self) -> Box<dyn Iterator<Item = &mut Element> + '_> {
        match &mut self.body {
            SlideBody::Flow { elements, .. } => Box::new(elements.iter_mut()),
            SlideBody::Freeform { elements } => {
                Box::new(elements.iter_mut().map(|e| &mut e.element))
            }
        }
    }

    /// Element ids in array order.
    pub fn element_ids(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.elements().map(|element| &element.id)
    }

    /// Index of an element.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        with_layers!(&self.body, layers => position(layers, id))
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements().find(|element| &element.id == id)
    }

    /// Freeform geometry of an element. Always `None` on flow slides.
    #[must_use]
    pub fn frame(&self, id: &ElementId) -> Option<&Frame> {
        match &self.body {
            SlideBody::Flow { .. } => None,
            SlideBody::Freeform { elements } => elements
                .iter()
                .find(|entry| entry.id() == id)
                .map(|entry| &entry.frame),
        }
    }

    /// Wire view of one element.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<SlideElement> {
        with_layers!(&self.body, layers => layers
            .iter()
            .find(|layer| &layer.element().id == id)
            .map(|layer| layer.clone().into_record()))
    }

    /// Wire view of every element, in array order.
    #[must_use]
    pub fn records(&self) -> Vec<SlideElement> {
        with_layers!(&self.body, layers => layers
            .iter()
            .map(|layer| layer.clone().into_record())
            .collect())
    }

    /// Resolved rectangles of every element except `except`, for snapping.
    #[must_use]
    pub fn sibling_rects(&self, except: &ElementId) -> Vec<Rect> {
        match &self.body {
            SlideBody::Flow { .. } => Vec::new(),
            SlideBody::Freeform { elements } => elements
                .iter()
                .filter(|entry| entry.id() != except)
                .map(|entry| entry.frame.rect())
                .collect(),
        }
    }

    /// Replace the element `id` wholesale. Returns `false` if it is missing.
    pub fn replace(&mut self, id: &ElementId, record: SlideElement) -> bool {
        with_layers!(&mut self.body, layers => match position(layers, id) {
            Some(index) => {
                layers[index] = Layer::from_record(record);
                true
            }
            None => false,
        })
    }

    /// Insert at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, record: SlideElement) {
        with_layers!(&mut self.body, layers => {
            let index = index.min(layers.len());
            layers.insert(index, Layer::from_record(record));
        });
    }

    /// Remove an element.
    pub fn remove(&mut self, id: &ElementId) -> Option<SlideElement> {
        with_layers!(&mut self.body, layers => position(layers, id)
            .map(|index| layers.remove(index).into_record()))
    }

    /// Insert a copy of `id` right after it under `new_id`.
    pub fn duplicate(&mut self, id: &ElementId, new_id: ElementId) -> bool {
        with_layers!(&mut self.body, layers => match position(layers, id) {
            Some(index) => {
                let mut copy = layers[index].clone();
                copy.element_mut().id = new_id;
                layers.insert(index + 1, copy);
                true
            }
            None => false,
        })
    }

    /// Swap an element with its neighbour. `false` at the array boundary.
    pub fn shift(&mut self, id: &ElementId, direction: Direction) -> bool {
        with_layers!(&mut self.body, layers => {
            let Some(index) = position(layers, id) else {
                return false;
            };
            let target = match direction {
                Direction::Up => index.checked_sub(1),
                Direction::Down => Some(index + 1).filter(|&i| i < layers.len()),
            };
            match target {
                Some(target) => {
                    layers.swap(index, target);
                    true
                }
                None => false,
            }
        })
    }

    /// Move an element to `new_index`. `false` if out of range or unchanged.
    pub fn reorder(&mut self, id: &ElementId, new_index: usize) -> bool {
        with_layers!(&mut self.body, layers => {
            let Some(from) = position(layers, id) else {
                return false;
            };
            if new_index >= layers.len() || new_index == from {
                return false;
            }
            let moved = layers.remove(from);
            layers.insert(new_index, moved);
            true
        })
    }

    /// Move every overlay to the front of the array, keeping relative order.
    pub fn overlays_to_front(&mut self) {
        with_layers!(&mut self.body, layers => overlays_first(layers));
    }

    /// Whether every overlay sits in a contiguous prefix of the array.
    #[must_use]
    pub fn overlays_are_prefix(&self) -> bool {
        let mut seen_content = false;
        for element in self.elements() {
            if element.is_overlay() {
                if seen_content {
                    return false;
                }
            } else {
                seen_content = true;
            }
        }
        true
    }

    /// Switch layout mode.
    ///
    /// Into freeform, each element gets the matching rectangle from
    /// `geometry` merged onto its frame; overlays always get the whole
    /// canvas; unmatched elements keep what they had. Out of freeform, all
    /// frames are dropped. Either way overlays end up first.
    pub fn convert(
        &mut self,
        layout: SlideLayout,
        geometry: &HashMap<ElementId, Rect>,
        canvas: CanvasSize,
    ) {
        let records = with_layers!(std::mem::replace(
            &mut self.body,
            SlideBody::Freeform { elements: Vec::new() },
        ), layers => layers.into_iter().map(Layer::into_record).collect::<Vec<_>>());

        self.body = if layout.is_freeform() {
            let elements = records
                .into_iter()
                .map(|mut record| {
                    if record.element.is_overlay() {
                        record.frame.set_rect(canvas.bounds());
                    } else if let Some(rect) = geometry.get(record.id()) {
                        record.frame.set_rect(*rect);
                    }
                    record
                })
                .collect();
            SlideBody::Freeform { elements }
        } else {
            SlideBody::Flow {
                layout,
                elements: records.into_iter().map(|record| record.element).collect(),
            }
        };
        self.overlays_to_front();
    }

    /// Give the slide and all its elements fresh ids.
    pub fn reassign_ids(&mut self, ids: &mut IdAllocator) {
        self.id = ids.slide_id();
        for element in self.elements_mut() {
            element.id = ids.element_id();
        }
    }
}

/// Wire representation of a slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlideRecord {
    id: SlideId,
    #[serde(default)]
    layout: SlideLayout,
    #[serde(default)]
    elements: Vec<SlideElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_position: Option<String>,
}

impl From<SlideRecord> for Slide {
    fn from(record: SlideRecord) -> Self {
        let mut slide = Self::from_parts(record.id, record.layout, record.elements);
        slide.background = record.background;
        slide.background_image = record.background_image;
        slide.background_position = record.background_position;
        slide
    }
}

impl From<Slide> for SlideRecord {
    fn from(slide: Slide) -> Self {
        let layout = slide.layout();
        let elements = with_layers!(slide.body, layers => layers
            .into_iter()
            .map(Layer::into_record)
            .collect());
        Self {
            id: slide.id,
            layout,
            elements,
            background: slide.background,
            background_image: slide.background_image,
            background_position: slide.background_position,
        }
    }
}
