//! Editor session state and the reducer that applies [`Action`]s to it.
//!
//! The document is held behind an [`Arc`]. An edit clones it only if a
//! history snapshot still shares it (`Arc::make_mut`), so the undo stack
//! holds prior versions without any deep copies on the hot path.
//!
//! Requests that cannot apply (unknown ids, out-of-range indexes, deleting
//! the last slide) leave the state untouched and are logged at `debug`;
//! [`EditorState::try_dispatch`] returns the reason instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::config::EditorConfig;
use crate::document::CarouselDocument;
use crate::element::Element;
use crate::error::{CarouselError, CarouselResult};
use crate::geometry::{freeform_geometry, SlideMeasurer};
use crate::history::History;
use crate::ids::{ElementId, IdAllocator};
use crate::slide::{Slide, SlideElement, SlideLayout};

/// What is selected on the current slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    /// Nothing.
    #[default]
    None,
    /// The slide background.
    Background,
    /// One element.
    Element(ElementId),
}

impl Selection {
    /// The selected element id, if an element is selected.
    #[must_use]
    pub fn element_id(&self) -> Option<&ElementId> {
        match self {
            Self::Element(id) => Some(id),
            Self::None | Self::Background => None,
        }
    }
}

/// How slides are laid out in the workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One horizontal strip.
    #[default]
    #[serde(rename = "horizontal")]
    Strip,
    /// A grid of thumbnails.
    Grid,
}

/// One editing session.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Arc<CarouselDocument>,
    selected_slide: usize,
    selection: Selection,
    preview: bool,
    dirty: bool,
    view_mode: ViewMode,
    zoom: f64,
    revision: u64,
    history: History,
    config: EditorConfig,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(CarouselDocument::new_editable(uuid::Uuid::new_v4().simple().to_string()))
    }
}

impl EditorState {
    /// Start a session on `document` with the default configuration.
    #[must_use]
    pub fn new(document: CarouselDocument) -> Self {
        Self::with_config(document, EditorConfig::default())
    }

    /// Start a session with a custom configuration.
    ///
    /// A document without slides gets one blank slide.
    #[must_use]
    pub fn with_config(document: CarouselDocument, config: EditorConfig) -> Self {
        Self {
            document: Arc::new(editable(document)),
            selected_slide: 0,
            selection: Selection::None,
            preview: false,
            dirty: false,
            view_mode: ViewMode::default(),
            zoom: 1.0,
            revision: 0,
            history: History::new(config.history_limit),
            config,
        }
    }

    /// The current document.
    #[must_use]
    pub fn document(&self) -> &CarouselDocument {
        &self.document
    }

    /// A shared handle to the current document (cheap; for persistence).
    #[must_use]
    pub fn snapshot(&self) -> Arc<CarouselDocument> {
        Arc::clone(&self.document)
    }

    /// Index of the selected slide.
    #[must_use]
    pub const fn selected_slide(&self) -> usize {
        self.selected_slide
    }

    /// The selected slide.
    #[must_use]
    pub fn current_slide(&self) -> Option<&Slide> {
        self.document.slide(self.selected_slide)
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selection.element_id()?;
        self.current_slide()?.element(id)
    }

    /// Whether preview mode is on.
    #[must_use]
    pub const fn is_preview(&self) -> bool {
        self.preview
    }

    /// Whether the document changed since the last `MarkSaved`.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Workspace view mode.
    #[must_use]
    pub const fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Display zoom.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Counter bumped on every document change, including undo and redo.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `Undo` would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0
    }

    /// Whether `Redo` would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    /// The undo/redo history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Apply every action in order.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        let name = action.name();
        let applied = match action {
            Action::SetCarousel(document) => {
                self.reset(*document);
                true
            }
            Action::SelectSlide(index) => self.select_slide(index),
            Action::SelectElement(selection) => self.select(selection),
            Action::UpdateSlide { index, slide } => self.update_slide(index, slide),
            Action::AddSlide { after_index, slide } => self.add_slide(after_index, slide),
            Action::DeleteSlide(index) => self.delete_slide(index),
            Action::MoveSlide { from, to } => self.move_slide(from, to),
            Action::DuplicateSlide(index) => self.duplicate_slide(index),
            Action::UpdateElement {
                slide_index,
                element_id,
                element,
            } => self.update_element(slide_index, &element_id, element),
            Action::AddElement {
                slide_index,
                after_element_id,
                element,
            } => self.add_element(slide_index, after_element_id.as_ref(), element),
            Action::DeleteElement {
                slide_index,
                element_id,
            } => {
                let deleted = self.edit_slide(slide_index, |slide| slide.remove(&element_id).is_some());
                if deleted {
                    self.selection = Selection::None;
                }
                deleted
            }
            Action::DuplicateElement {
                slide_index,
                element_id,
            } => self.duplicate_element(slide_index, &element_id),
            Action::MoveElement {
                slide_index,
                element_id,
                direction,
            } => self.edit_slide(slide_index, |slide| {
                slide.shift(&element_id, direction) && slide.overlays_are_prefix()
            }),
            Action::ReorderElement {
                slide_index,
                element_id,
                new_index,
            } => self.edit_slide(slide_index, |slide| {
                slide.reorder(&element_id, new_index) && slide.overlays_are_prefix()
            }),
            Action::SetTheme(theme) => self.edit(|doc| {
                doc.theme = *theme;
                true
            }),
            Action::SetFooter(text) => self.edit(|doc| {
                doc.footer.text = text;
                true
            }),
            Action::SetHandle(handle) => self.edit(|doc| {
                doc.header.handle = handle;
                true
            }),
            Action::SetShowCounter(show) => self.edit(|doc| {
                doc.header.show_counter = show;
                true
            }),
            Action::SetSlideBackground { slide_index, color } => {
                self.edit_slide(slide_index, |slide| {
                    slide.background = color;
                    true
                })
            }
            Action::SetSlideBackgroundImage { slide_index, image } => {
                self.edit_slide(slide_index, |slide| {
                    slide.background_image = image;
                    true
                })
            }
            Action::SetSlideBackgroundPosition {
                slide_index,
                position,
            } => self.edit_slide(slide_index, |slide| {
                slide.background_position = position;
                true
            }),
            Action::SetSlideLayout {
                slide_index,
                layout,
                geometry,
            } => {
                let canvas = self.document.canvas;
                let converted = self.edit_slide(slide_index, |slide| {
                    slide.convert(layout, &geometry, canvas);
                    true
                });
                if converted {
                    self.selection = Selection::None;
                }
                converted
            }
            Action::TogglePreview => {
                self.preview = !self.preview;
                true
            }
            Action::SetViewMode(mode) => {
                self.view_mode = mode;
                true
            }
            Action::SetZoom(zoom) => {
                let valid = zoom.is_finite() && zoom > 0.0;
                if valid {
                    self.zoom = zoom;
                }
                valid
            }
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::MarkSaved => {
                self.dirty = false;
                true
            }
            Action::BeginGesture => {
                if self.config.coalesce_gestures {
                    self.history.begin_gesture();
                }
                true
            }
            Action::EndGesture => {
                let open = self.history.in_gesture();
                self.history.end_gesture();
                open
            }
        };

        if applied {
            self.clamp_selection();
        } else {
            tracing::debug!(action = name, "Action did not apply; state unchanged");
        }
    }

    /// Apply one action, reporting why it could not apply.
    ///
    /// The effect on the state is the same as [`dispatch`](Self::dispatch).
    /// A missing slide or element is reported by name; an edit that leaves
    /// the document unchanged is an [`CarouselError::InvalidOperation`].
    pub fn try_dispatch(&mut self, action: Action) -> CarouselResult<()> {
        self.check(&action)?;
        let name = action.name();
        let is_edit = action.is_edit();
        let revision = self.revision;
        self.dispatch(action);
        if is_edit && self.revision == revision {
            return Err(CarouselError::InvalidOperation(format!(
                "{name} made no change"
            )));
        }
        Ok(())
    }

    fn check(&self, action: &Action) -> CarouselResult<()> {
        let slide_count = self.document.slides.len();
        let (slide_index, element_id) = match action {
            Action::SelectSlide(index)
            | Action::UpdateSlide { index, .. }
            | Action::DuplicateSlide(index) => (*index, None),
            Action::DeleteSlide(index) => {
                if slide_count <= 1 && *index < slide_count {
                    return Err(CarouselError::InvalidOperation(
                        "cannot delete the last slide".into(),
                    ));
                }
                (*index, None)
            }
            Action::MoveSlide { from, to } => ((*from).max(*to), None),
            Action::AddElement { slide_index, .. }
            | Action::SetSlideBackground { slide_index, .. }
            | Action::SetSlideBackgroundImage { slide_index, .. }
            | Action::SetSlideBackgroundPosition { slide_index, .. }
            | Action::SetSlideLayout { slide_index, .. } => (*slide_index, None),
            Action::UpdateElement {
                slide_index,
                element_id,
                ..
            }
            | Action::DeleteElement {
                slide_index,
                element_id,
            }
            | Action::DuplicateElement {
                slide_index,
                element_id,
            }
            | Action::MoveElement {
                slide_index,
                element_id,
                ..
            }
            | Action::ReorderElement {
                slide_index,
                element_id,
                ..
            } => (*slide_index, Some(element_id)),
            Action::SelectElement(Selection::Element(id)) => (self.selected_slide, Some(id)),
            _ => return Ok(()),
        };
        let slide = self
            .document
            .slide(slide_index)
            .ok_or_else(|| CarouselError::SlideNotFound(format!("index {slide_index} of {slide_count}")))?;
        match element_id {
            Some(id) if !slide.contains(id) => Err(CarouselError::ElementNotFound(format!(
                "{id} on slide {slide_index}"
            ))),
            _ => Ok(()),
        }
    }

    /// Build the action that switches `slide_index` to freeform, measuring
    /// the slide with `measurer` so every element keeps its visual position.
    ///
    /// Returns `None` for an unknown slide. If the slide is not on screen the
    /// conversion still happens; only overlays get geometry.
    pub fn convert_to_freeform(&self, slide_index: usize, measurer: &impl SlideMeasurer) -> Option<Action> {
        let slide = self.document.slide(slide_index)?;
        let canvas = self.document.canvas;
        let geometry = match measurer.measure(slide) {
            Some(measurement) => freeform_geometry(slide, &measurement, canvas),
            None => {
                tracing::debug!(slide_index, "Slide not measured; converting without geometry");
                slide
                    .elements()
                    .filter(|element| element.is_overlay())
                    .map(|element| (element.id.clone(), canvas.bounds()))
                    .collect()
            }
        };
        Some(Action::SetSlideLayout {
            slide_index,
            layout: SlideLayout::Freeform,
            geometry,
        })
    }

    /// Build the action that switches `slide_index` to a flow layout.
    ///
    /// Returns `None` for an unknown slide or when `layout` is freeform.
    #[must_use]
    pub fn convert_to_flow(&self, slide_index: usize, layout: SlideLayout) -> Option<Action> {
        if layout.is_freeform() || self.document.slide(slide_index).is_none() {
            return None;
        }
        Some(Action::SetSlideLayout {
            slide_index,
            layout,
            geometry: Default::default(),
        })
    }

    fn reset(&mut self, document: CarouselDocument) {
        self.document = Arc::new(editable(document));
        self.history.clear();
        self.selected_slide = 0;
        self.selection = Selection::None;
        self.preview = false;
        self.dirty = false;
        self.revision += 1;
        tracing::debug!(
            id = %self.document.id,
            slides = self.document.slides.len(),
            "Document loaded into editor"
        );
    }

    /// Run `f` against a private copy of the document. If it reports a
    /// change, the copy becomes current and the old version goes to history;
    /// otherwise the copy is discarded.
    fn edit(&mut self, f: impl FnOnce(&mut CarouselDocument) -> bool) -> bool {
        let previous = Arc::clone(&self.document);
        if !f(Arc::make_mut(&mut self.document)) {
            self.document = previous;
            return false;
        }
        self.history.record(previous);
        self.dirty = true;
        self.revision += 1;
        true
    }

    fn edit_slide(&mut self, index: usize, f: impl FnOnce(&mut Slide) -> bool) -> bool {
        if index >= self.document.slides.len() {
            return false;
        }
        self.edit(|doc| doc.slide_mut(index).is_some_and(f))
    }

    fn select_slide(&mut self, index: usize) -> bool {
        if index >= self.document.slides.len() {
            return false;
        }
        self.selected_slide = index;
        self.selection = Selection::None;
        true
    }

    fn select(&mut self, selection: Selection) -> bool {
        if let Selection::Element(id) = &selection {
            if !self.current_slide().is_some_and(|slide| slide.contains(id)) {
                return false;
            }
        }
        self.selection = selection;
        true
    }

    fn update_slide(&mut self, index: usize, mut slide: Slide) -> bool {
        slide.overlays_to_front();
        self.edit_slide(index, |current| {
            *current = slide;
            true
        })
    }

    fn add_slide(&mut self, after_index: usize, mut slide: Slide) -> bool {
        let at = after_index.saturating_add(1).min(self.document.slides.len());
        slide.overlays_to_front();
        let replaced = IdAllocator::for_document(&self.document).adopt(&mut slide);
        if replaced > 0 {
            tracing::debug!(replaced, "Regenerated colliding ids on added slide");
        }
        let added = self.edit(|doc| {
            doc.slides.insert(at, slide);
            true
        });
        if added {
            self.selected_slide = at;
            self.selection = Selection::None;
        }
        added
    }

    fn delete_slide(&mut self, index: usize) -> bool {
        if self.document.slides.len() <= 1 {
            tracing::debug!(index, "Refusing to delete the last slide");
            return false;
        }
        if index >= self.document.slides.len() {
            return false;
        }
        self.edit(|doc| {
            doc.slides.remove(index);
            true
        })
    }

    fn move_slide(&mut self, from: usize, to: usize) -> bool {
        let len = self.document.slides.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let moved = self.edit(|doc| {
            let slide = doc.slides.remove(from);
            doc.slides.insert(to, slide);
            true
        });
        if moved {
            self.selected_slide = to;
            self.selection = Selection::None;
        }
        moved
    }

    fn duplicate_slide(&mut self, index: usize) -> bool {
        let Some(original) = self.document.slide(index) else {
            return false;
        };
        let mut copy = original.clone();
        copy.reassign_ids(&mut IdAllocator::for_document(&self.document));
        let duplicated = self.edit(|doc| {
            doc.slides.insert(index + 1, copy);
            true
        });
        if duplicated {
            self.selected_slide = index + 1;
            self.selection = Selection::None;
        }
        duplicated
    }

    fn update_element(&mut self, slide_index: usize, id: &ElementId, element: SlideElement) -> bool {
        let Some(slide) = self.document.slide(slide_index) else {
            return false;
        };
        if element.id() != id && slide.contains(element.id()) {
            tracing::debug!(element_id = %id, new_id = %element.id(), "Replacement id already used on slide");
            return false;
        }
        self.edit_slide(slide_index, |slide| {
            let replaced = slide.replace(id, element);
            if replaced {
                slide.overlays_to_front();
            }
            replaced
        })
    }

    fn add_element(
        &mut self,
        slide_index: usize,
        after: Option<&ElementId>,
        mut element: SlideElement,
    ) -> bool {
        let Some(slide) = self.document.slide(slide_index) else {
            return false;
        };
        let mut ids = IdAllocator::for_document(&self.document);
        if element.id().is_empty() || !ids.reserve(element.id().as_str()) {
            element.element.id = ids.element_id();
        }
        let index = if element.element.is_overlay() {
            0
        } else {
            let overlays = slide.elements().take_while(|e| e.is_overlay()).count();
            match after {
                Some(after) => slide.index_of(after).map_or_else(
                    || {
                        tracing::debug!(after = %after, "Reference element missing; appending");
                        slide.len()
                    },
                    |index| index + 1,
                ),
                None => slide.len(),
            }
            .max(overlays)
        };
        let id = element.id().clone();
        let added = self.edit_slide(slide_index, |slide| {
            slide.insert(index, element);
            true
        });
        if added {
            self.selected_slide = slide_index;
            self.selection = Selection::Element(id);
        }
        added
    }

    fn duplicate_element(&mut self, slide_index: usize, id: &ElementId) -> bool {
        let new_id = IdAllocator::for_document(&self.document).element_id();
        let copy_id = new_id.clone();
        let duplicated = self.edit_slide(slide_index, |slide| slide.duplicate(id, new_id));
        if duplicated {
            self.selected_slide = slide_index;
            self.selection = Selection::Element(copy_id);
        }
        duplicated
    }

    fn undo(&mut self) -> bool {
        match self.history.undo(Arc::clone(&self.document)) {
            Some(previous) => {
                self.document = previous;
                self.dirty = true;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo(Arc::clone(&self.document)) {
            Some(next) => {
                self.document = next;
                self.dirty = true;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Keep the slide index in range and drop an element selection that no
    /// longer exists on the selected slide.
    fn clamp_selection(&mut self) {
        let last = self.document.slides.len().saturating_sub(1);
        self.selected_slide = self.selected_slide.min(last);
        if let Selection::Element(id) = &self.selection {
            if !self.current_slide().is_some_and(|slide| slide.contains(id)) {
                self.selection = Selection::None;
            }
        }
    }
}

/// Pure form of [`EditorState::dispatch`].
#[must_use]
pub fn reduce(mut state: EditorState, action: Action) -> EditorState {
    state.dispatch(action);
    state
}

fn editable(mut document: CarouselDocument) -> CarouselDocument {
    if document.slides.is_empty() {
        document.slides.push(Slide::new(SlideLayout::TitleBody));
    }
    document
}
