//! Pointer-driven move/resize sessions for freeform elements.
//!
//! A [`DragController`] turns press / motion / release events into the
//! actions to dispatch. A press only arms the session; nothing changes until
//! the pointer has travelled past the activation threshold, so a plain click
//! never edits the document. The first real movement emits
//! [`Action::BeginGesture`], every movement after that one
//! [`Action::UpdateElement`], and the release [`Action::EndGesture`], which
//! lets the reducer fold the whole drag into one undo step.
//!
//! Both `press` and `motion` read the slide and its canvas size from the
//! document being edited, so clamping and guides always match the reducer.

use crate::action::Action;
use crate::config::DragConfig;
use crate::document::CarouselDocument;
use crate::geometry::{CanvasSize, Point, Rect};
use crate::guides::{smart_guides, Guide};
use crate::ids::ElementId;

/// What a session changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Translate x/y.
    Move,
    /// Change w/h from the fixed top-left corner.
    Resize,
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No session.
    Idle,
    /// Pressed, below the activation threshold.
    Armed,
    /// Emitting updates.
    Active,
}

#[derive(Debug, Clone)]
struct Session {
    slide_index: usize,
    element_id: ElementId,
    mode: DragMode,
    press: Point,
    start: Rect,
    canvas: CanvasSize,
    active: bool,
}

/// Drives one drag/resize gesture at a time.
#[derive(Debug, Clone)]
pub struct DragController {
    config: DragConfig,
    session: Option<Session>,
    guides: Vec<Guide>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    /// Create a controller with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DragConfig::default())
    }

    /// Create a controller with a custom configuration.
    #[must_use]
    pub fn with_config(config: DragConfig) -> Self {
        Self {
            config,
            session: None,
            guides: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        match &self.session {
            None => DragPhase::Idle,
            Some(session) if session.active => DragPhase::Active,
            Some(_) => DragPhase::Armed,
        }
    }

    /// Mode of the current session.
    #[must_use]
    pub fn mode(&self) -> Option<DragMode> {
        self.session.as_ref().map(|session| session.mode)
    }

    /// Guides to draw for the latest movement. Empty unless moving.
    #[must_use]
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Start a gesture on `element_id` of slide `slide_index` in `doc`.
    ///
    /// Any session still open from an aborted gesture is closed first, which
    /// may produce an [`Action::EndGesture`]. Pressing an element that does
    /// not exist or is not on a freeform slide leaves the controller idle.
    pub fn press(
        &mut self,
        doc: &CarouselDocument,
        slide_index: usize,
        element_id: &ElementId,
        mode: DragMode,
        pointer: Point,
    ) -> Vec<Action> {
        let actions = self.finish();
        let Some(slide) = doc.slide(slide_index) else {
            tracing::debug!(slide_index, "Drag ignored on missing slide");
            return actions;
        };
        if !slide.is_freeform() {
            tracing::debug!(slide_index, "Drag ignored on flow slide");
            return actions;
        }
        let Some(frame) = slide.frame(element_id) else {
            tracing::debug!(slide_index, element_id = %element_id, "Drag target not found");
            return actions;
        };
        self.session = Some(Session {
            slide_index,
            element_id: element_id.clone(),
            mode,
            press: pointer,
            start: self.resolve(frame.x, frame.y, frame.w, frame.h),
            canvas: doc.canvas,
            active: false,
        });
        actions
    }

    /// Feed a pointer movement.
    ///
    /// `scale` is screen pixels per slide unit; `doc` is the current state of
    /// the document, from which the dragged element and its siblings are read.
    pub fn motion(&mut self, pointer: Point, scale: f64, doc: &CarouselDocument) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return actions;
        };
        let dx = pointer.x - session.press.x;
        let dy = pointer.y - session.press.y;

        if !session.active {
            let threshold = self.config.activation_threshold;
            if dx.abs() < threshold && dy.abs() < threshold {
                return actions;
            }
            session.active = true;
            tracing::debug!(element_id = %session.element_id, mode = ?session.mode, "Drag activated");
            actions.push(Action::BeginGesture);
        }

        if !scale.is_finite() || scale <= 0.0 {
            tracing::debug!(scale, "Ignoring motion with invalid display scale");
            return actions;
        }
        let Some(slide) = doc.slide(session.slide_index) else {
            return actions;
        };
        let Some(mut current) = slide.get(&session.element_id) else {
            return actions;
        };
        let dx = dx / scale;
        let dy = dy / scale;

        match session.mode {
            DragMode::Move => {
                let width = current.frame.w.unwrap_or(self.config.default_width);
                let height = current.frame.h.unwrap_or(self.config.default_height);
                let raw = Rect::new(session.start.x + dx, session.start.y + dy, width, height);
                let others = slide.sibling_rects(&session.element_id);
                let canvas = session.canvas;
                let snapped = smart_guides(raw, &others, canvas, &self.config.snap);
                let x = snapped.x.min(canvas.width - width).max(0.0);
                let y = snapped.y.min(canvas.height - height).max(0.0);
                current.frame.x = Some(x.round());
                current.frame.y = Some(y.round());
                self.guides = snapped.guides;
            }
            DragMode::Resize => {
                let width = (session.start.width + dx).max(self.config.min_width);
                let height = (session.start.height + dy).max(self.config.min_height);
                current.frame.w = Some(width.round());
                current.frame.h = Some(height.round());
            }
        }

        actions.push(Action::UpdateElement {
            slide_index: session.slide_index,
            element_id: session.element_id.clone(),
            element: current,
        });
        actions
    }

    /// End the gesture. Emits [`Action::EndGesture`] only if it was active.
    pub fn release(&mut self) -> Vec<Action> {
        self.finish()
    }

    fn finish(&mut self) -> Vec<Action> {
        self.guides.clear();
        match self.session.take() {
            Some(session) if session.active => {
                tracing::debug!(element_id = %session.element_id, "Drag finished");
                vec![Action::EndGesture]
            }
            _ => Vec::new(),
        }
    }

    fn resolve(&self, x: Option<f64>, y: Option<f64>, w: Option<f64>, h: Option<f64>) -> Rect {
        Rect::new(
            x.unwrap_or(0.0),
            y.unwrap_or(0.0),
            w.unwrap_or(self.config.default_width),
            h.unwrap_or(self.config.default_height),
        )
    }
}
