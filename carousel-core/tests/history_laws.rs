//! Undo/redo laws of the editor reducer.
//!
//! - Undo after an edit restores the previous document exactly
//! - Undoing every step of a long edit sequence restores the original
//! - Overlays stay in front of content after every edit
//! - Redo after undo restores the edited document
//! - A new edit after undo empties the redo stack
//! - History is capped at the configured limit
//! - The dirty flag follows edits, saves and undo

use std::collections::HashMap;

use carousel_core::{
    Action, CarouselDocument, Direction, EditorConfig, EditorState, Element, ElementId, Rect,
    Slide, SlideElement, SlideLayout,
};
use proptest::prelude::*;

/// Ids the element edits draw from; most exist at some point in a run.
const ELEMENT_IDS: [&str; 6] = ["p0", "e1", "e2", "e3", "o1", "o2"];

fn session() -> EditorState {
    let doc = CarouselDocument::new_empty("laws")
        .with_slide(
            Slide::new(SlideLayout::Cover)
                .with_id("s0")
                .with_element(Element::paragraph("hello").with_id("p0")),
        )
        .with_slide(Slide::new(SlideLayout::Quote).with_id("s1"));
    EditorState::new(doc)
}

/// Edits that apply to any state reachable from [`session`].
fn arb_edit() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[a-z ]{0,12}".prop_map(Action::SetFooter),
        "@[a-z]{1,8}".prop_map(Action::SetHandle),
        any::<bool>().prop_map(Action::SetShowCounter),
        (0usize..2, proptest::option::of("#[0-9a-f]{6}")).prop_map(|(slide_index, color)| {
            Action::SetSlideBackground { slide_index, color }
        }),
        (0usize..4).prop_map(|after_index| Action::AddSlide {
            after_index,
            slide: Slide::new(SlideLayout::TitleBody),
        }),
        Just(Action::DuplicateSlide(0)),
        Just(Action::DuplicateElement {
            slide_index: 0,
            element_id: "p0".into(),
        }),
    ]
}

fn arb_element_id() -> impl Strategy<Value = ElementId> {
    prop::sample::select(ELEMENT_IDS.to_vec()).prop_map(ElementId::from)
}

/// A paragraph, or an overlay when the id starts with `o`.
fn element_for(id: &ElementId, text: &str) -> SlideElement {
    let element = if id.as_str().starts_with('o') {
        Element::overlay(format!("#{:0>6}", text.len()))
    } else {
        Element::paragraph(text)
    };
    element.with_id(id.as_str()).into()
}

fn arb_rect() -> impl Strategy<Value = Rect> {
    (0.0..900.0f64, 0.0..1300.0f64, 50.0..400.0f64, 20.0..200.0f64)
        .prop_map(|(x, y, w, h)| Rect::new(x.round(), y.round(), w.round(), h.round()))
}

fn arb_slide_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..4).prop_map(|after_index| Action::AddSlide {
            after_index,
            slide: Slide::new(SlideLayout::TitleBody),
        }),
        (0usize..4).prop_map(Action::DeleteSlide),
        (0usize..4).prop_map(Action::DuplicateSlide),
        (0usize..4, 0usize..4).prop_map(|(from, to)| Action::MoveSlide { from, to }),
        (
            0usize..3,
            prop::sample::select(vec![SlideLayout::Freeform, SlideLayout::TitleBody, SlideLayout::Cta]),
            prop::collection::hash_map(arb_element_id(), arb_rect(), 0..4),
        )
            .prop_map(|(slide_index, layout, geometry): (usize, SlideLayout, HashMap<ElementId, Rect>)| {
                Action::SetSlideLayout {
                    slide_index,
                    layout,
                    geometry,
                }
            }),
    ]
}

fn arb_element_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..3, proptest::option::of(arb_element_id()), arb_element_id(), "[a-z]{1,8}").prop_map(
            |(slide_index, after_element_id, id, text)| Action::AddElement {
                slide_index,
                after_element_id,
                element: element_for(&id, &text),
            }
        ),
        (0usize..3, arb_element_id(), "[a-z]{1,8}").prop_map(|(slide_index, element_id, text)| {
            Action::UpdateElement {
                slide_index,
                element: element_for(&element_id, &text),
                element_id,
            }
        }),
        (0usize..3, arb_element_id()).prop_map(|(slide_index, element_id)| Action::DeleteElement {
            slide_index,
            element_id,
        }),
        (0usize..3, arb_element_id()).prop_map(|(slide_index, element_id)| {
            Action::DuplicateElement {
                slide_index,
                element_id,
            }
        }),
        (0usize..3, arb_element_id(), any::<bool>()).prop_map(|(slide_index, element_id, up)| {
            Action::MoveElement {
                slide_index,
                element_id,
                direction: if up { Direction::Up } else { Direction::Down },
            }
        }),
        (0usize..3, arb_element_id(), 0usize..6).prop_map(|(slide_index, element_id, new_index)| {
            Action::ReorderElement {
                slide_index,
                element_id,
                new_index,
            }
        }),
    ]
}

/// Any mutating action, valid or not.
fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![arb_edit(), arb_slide_action(), arb_element_action()]
}

proptest! {
    #[test]
    fn undoing_every_step_restores_original(actions in prop::collection::vec(arb_action(), 0..=50)) {
        let mut state = session();
        let original = state.document().clone();

        for action in actions {
            let name = action.name();
            state.dispatch(action);
            for slide in &state.document().slides {
                prop_assert!(slide.overlays_are_prefix(), "{} left an overlay behind content", name);
            }
        }

        let steps = state.history().undo_len();
        prop_assert!(steps <= 50);
        for _ in 0..steps {
            state.dispatch(Action::Undo);
        }
        prop_assert_eq!(state.document(), &original);
        prop_assert!(!state.can_undo());
    }

    #[test]
    fn undo_restores_previous_document(
        setup in prop::collection::vec(arb_edit(), 0..6),
        edit in arb_edit(),
    ) {
        let mut state = session();
        state.dispatch_all(setup);
        let before = state.document().clone();

        state.dispatch(edit);
        state.dispatch(Action::Undo);
        prop_assert_eq!(state.document(), &before);
    }

    #[test]
    fn redo_after_undo_restores_edit(
        setup in prop::collection::vec(arb_edit(), 0..6),
        edit in arb_edit(),
    ) {
        let mut state = session();
        state.dispatch_all(setup);
        state.dispatch(edit);
        let after = state.document().clone();

        state.dispatch(Action::Undo);
        prop_assert!(state.can_redo());
        state.dispatch(Action::Redo);
        prop_assert_eq!(state.document(), &after);
    }

    #[test]
    fn new_edit_clears_redo(
        edits in prop::collection::vec(arb_edit(), 1..6),
        undos in 1usize..6,
        edit in arb_edit(),
    ) {
        let mut state = session();
        state.dispatch_all(edits);
        for _ in 0..undos {
            state.dispatch(Action::Undo);
        }
        prop_assert!(state.can_redo());
        state.dispatch(edit);
        prop_assert!(!state.can_redo());
    }

    #[test]
    fn rejected_actions_keep_revision(index in 5usize..100) {
        let mut state = session();
        let revision = state.revision();
        state.dispatch(Action::DeleteSlide(index));
        state.dispatch(Action::SelectSlide(index));
        state.dispatch(Action::SetSlideBackground { slide_index: index, color: None });
        prop_assert_eq!(state.revision(), revision);
        prop_assert!(!state.is_dirty());
        prop_assert!(!state.can_undo());
    }
}

#[test]
fn test_history_is_capped() {
    let mut state = session();
    let mut documents = vec![state.document().clone()];
    for i in 0..60 {
        state.dispatch(Action::SetFooter(format!("footer {i}")));
        documents.push(state.document().clone());
    }
    assert_eq!(state.history().undo_len(), 50);

    let mut undone = 0;
    while state.can_undo() {
        state.dispatch(Action::Undo);
        undone += 1;
    }
    assert_eq!(undone, 50);
    assert_eq!(state.document(), &documents[10]);
}

#[test]
fn test_custom_history_limit() {
    let doc = CarouselDocument::new_editable("d");
    let mut state = EditorState::with_config(doc, EditorConfig::default().with_history_limit(3));
    for i in 0..10 {
        state.dispatch(Action::SetHandle(format!("@h{i}")));
    }
    assert_eq!(state.history().undo_len(), 3);
}

#[test]
fn test_dirty_lifecycle() {
    let mut state = session();
    assert!(!state.is_dirty());

    state.dispatch(Action::SetFooter("x".into()));
    assert!(state.is_dirty());

    state.dispatch(Action::MarkSaved);
    assert!(!state.is_dirty());
    assert!(state.can_undo());

    state.dispatch(Action::Undo);
    assert!(state.is_dirty());

    state.dispatch(Action::MarkSaved);
    state.dispatch(Action::TogglePreview);
    state.dispatch(Action::SelectSlide(1));
    assert!(!state.is_dirty());
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut state = session();
    let revision = state.revision();
    state.dispatch(Action::Undo);
    state.dispatch(Action::Redo);
    assert_eq!(state.revision(), revision);
    assert!(!state.is_dirty());
}
