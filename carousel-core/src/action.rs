//! Editor actions: every change to an [`crate::EditorState`] is one of these.
//!
//! Actions serialize as `{"type": "ADD_SLIDE", "payload": {...}}` so that a
//! recorded edit script can be replayed from JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::CarouselDocument;
use crate::geometry::Rect;
use crate::ids::ElementId;
use crate::slide::{Direction, Slide, SlideElement, SlideLayout};
use crate::state::{Selection, ViewMode};
use crate::theme::Theme;

/// A request to change editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    /// Replace the whole document and reset history, selection and dirty flag.
    SetCarousel(Box<CarouselDocument>),
    /// Select a slide (clears element selection).
    SelectSlide(usize),
    /// Select an element, the background, or nothing.
    SelectElement(Selection),
    /// Replace a slide wholesale.
    UpdateSlide {
        /// Slide index.
        index: usize,
        /// New contents.
        slide: Slide,
    },
    /// Insert a slide after `after_index` and select it.
    AddSlide {
        /// Index the new slide follows.
        after_index: usize,
        /// The slide.
        slide: Slide,
    },
    /// Delete a slide. Rejected for the last remaining one.
    DeleteSlide(usize),
    /// Move a slide and select it at its destination.
    MoveSlide {
        /// Current index.
        from: usize,
        /// Destination index.
        to: usize,
    },
    /// Deep-copy a slide with fresh ids, insert it after the original and select it.
    DuplicateSlide(usize),
    /// Replace an element wholesale.
    UpdateElement {
        /// Owning slide.
        slide_index: usize,
        /// Element to replace.
        element_id: ElementId,
        /// New contents.
        element: SlideElement,
    },
    /// Insert an element. Overlays always go to index 0.
    AddElement {
        /// Owning slide.
        slide_index: usize,
        /// Insert after this element; append when absent.
        #[serde(default)]
        after_element_id: Option<ElementId>,
        /// The element.
        element: SlideElement,
    },
    /// Delete an element (clears selection).
    DeleteElement {
        /// Owning slide.
        slide_index: usize,
        /// Element to delete.
        element_id: ElementId,
    },
    /// Copy an element under a fresh id right after the original and select the copy.
    DuplicateElement {
        /// Owning slide.
        slide_index: usize,
        /// Element to copy.
        element_id: ElementId,
    },
    /// Swap an element with its neighbour.
    MoveElement {
        /// Owning slide.
        slide_index: usize,
        /// Element to move.
        element_id: ElementId,
        /// Which neighbour.
        direction: Direction,
    },
    /// Move an element to an arbitrary index.
    ReorderElement {
        /// Owning slide.
        slide_index: usize,
        /// Element to move.
        element_id: ElementId,
        /// Destination index.
        new_index: usize,
    },
    /// Replace the theme.
    SetTheme(Box<Theme>),
    /// Set the footer text.
    SetFooter(String),
    /// Set the header handle.
    SetHandle(String),
    /// Show or hide the slide counter.
    SetShowCounter(bool),
    /// Set or clear a slide's background colour.
    SetSlideBackground {
        /// Target slide.
        slide_index: usize,
        /// Colour or gradient.
        #[serde(default)]
        color: Option<String>,
    },
    /// Set or clear a slide's background image reference.
    SetSlideBackgroundImage {
        /// Target slide.
        slide_index: usize,
        /// Asset reference.
        #[serde(default)]
        image: Option<String>,
    },
    /// Set or clear a slide's background focal point.
    SetSlideBackgroundPosition {
        /// Target slide.
        slide_index: usize,
        /// CSS position.
        #[serde(default)]
        position: Option<String>,
    },
    /// Switch a slide's layout mode.
    SetSlideLayout {
        /// Target slide.
        slide_index: usize,
        /// New layout.
        layout: SlideLayout,
        /// Measured geometry per element, used when entering freeform.
        #[serde(default)]
        geometry: HashMap<ElementId, Rect>,
    },
    /// Toggle preview mode.
    TogglePreview,
    /// Switch between strip and grid view.
    SetViewMode(ViewMode),
    /// Set the display zoom.
    SetZoom(f64),
    /// Step back one snapshot.
    Undo,
    /// Step forward one snapshot.
    Redo,
    /// Clear the dirty flag after a successful save.
    MarkSaved,
    /// Open a gesture: following edits collapse into one undo step.
    BeginGesture,
    /// Close the open gesture.
    EndGesture,
}

impl Action {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetCarousel(_) => "SET_CAROUSEL",
            Self::SelectSlide(_) => "SELECT_SLIDE",
            Self::SelectElement(_) => "SELECT_ELEMENT",
            Self::UpdateSlide { .. } => "UPDATE_SLIDE",
            Self::AddSlide { .. } => "ADD_SLIDE",
            Self::DeleteSlide(_) => "DELETE_SLIDE",
            Self::MoveSlide { .. } => "MOVE_SLIDE",
            Self::DuplicateSlide(_) => "DUPLICATE_SLIDE",
            Self::UpdateElement { .. } => "UPDATE_ELEMENT",
            Self::AddElement { .. } => "ADD_ELEMENT",
            Self::DeleteElement { .. } => "DELETE_ELEMENT",
            Self::DuplicateElement { .. } => "DUPLICATE_ELEMENT",
            Self::MoveElement { .. } => "MOVE_ELEMENT",
            Self::ReorderElement { .. } => "REORDER_ELEMENT",
            Self::SetTheme(_) => "SET_THEME",
            Self::SetFooter(_) => "SET_FOOTER",
            Self::SetHandle(_) => "SET_HANDLE",
            Self::SetShowCounter(_) => "SET_SHOW_COUNTER",
            Self::SetSlideBackground { .. } => "SET_SLIDE_BACKGROUND",
            Self::SetSlideBackgroundImage { .. } => "SET_SLIDE_BACKGROUND_IMAGE",
            Self::SetSlideBackgroundPosition { .. } => "SET_SLIDE_BACKGROUND_POSITION",
            Self::SetSlideLayout { .. } => "SET_SLIDE_LAYOUT",
            Self::TogglePreview => "TOGGLE_PREVIEW",
            Self::SetViewMode(_) => "SET_VIEW_MODE",
            Self::SetZoom(_) => "SET_ZOOM",
            Self::Undo => "UNDO",
            Self::Redo => "REDO",
            Self::MarkSaved => "MARK_SAVED",
            Self::BeginGesture => "BEGIN_GESTURE",
            Self::EndGesture => "END_GESTURE",
        }
    }

    /// Whether this action edits the document body and is therefore undoable.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::UpdateSlide { .. }
                | Self::AddSlide { .. }
                | Self::DeleteSlide(_)
                | Self::MoveSlide { .. }
                | Self::DuplicateSlide(_)
                | Self::UpdateElement { .. }
                | Self::AddElement { .. }
                | Self::DeleteElement { .. }
                | Self::DuplicateElement { .. }
                | Self::MoveElement { .. }
                | Self::ReorderElement { .. }
                | Self::SetTheme(_)
                | Self::SetFooter(_)
                | Self::SetHandle(_)
                | Self::SetShowCounter(_)
                | Self::SetSlideBackground { .. }
                | Self::SetSlideBackgroundImage { .. }
                | Self::SetSlideBackgroundPosition { .. }
                | Self::SetSlideLayout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let action = Action::MoveSlide { from: 2, to: 0 };
        let value = serde_json::to_value(&action).expect("serialize");
        assert_eq!(value, json!({"type": "MOVE_SLIDE", "payload": {"from": 2, "to": 0}}));

        let value = serde_json::to_value(Action::Undo).expect("serialize");
        assert_eq!(value, json!({"type": "UNDO"}));
    }

    #[test]
    fn test_parse_element_action() {
        let action: Action = serde_json::from_value(json!({
            "type": "MOVE_ELEMENT",
            "payload": {"slideIndex": 0, "elementId": "h1", "direction": "up"}
        }))
        .expect("parse");
        assert_eq!(
            action,
            Action::MoveElement {
                slide_index: 0,
                element_id: "h1".into(),
                direction: Direction::Up,
            }
        );
        assert!(action.is_edit());
    }

    #[test]
    fn test_view_actions_are_not_edits() {
        assert!(!Action::SetZoom(1.5).is_edit());
        assert!(!Action::SelectSlide(0).is_edit());
        assert!(!Action::Undo.is_edit());
        assert!(!Action::BeginGesture.is_edit());
    }
}
