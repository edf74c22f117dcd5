//! Switching slides between flow layouts and freeform.

use std::collections::HashMap;

use carousel_core::{
    Action, CarouselDocument, EditorState, Element, ElementId, HeadingLevel, Rect, ScreenRect,
    Slide, SlideLayout, SlideMeasurement, SlideMeasurer, CANVAS,
};
use pretty_assertions::assert_eq;

/// Reports every element stacked in a column, scaled to a display of
/// `scale` screen pixels per slide unit.
struct ColumnMeasurer {
    scale: f64,
}

impl SlideMeasurer for ColumnMeasurer {
    fn measure(&self, slide: &Slide) -> Option<SlideMeasurement> {
        let s = self.scale;
        let container = ScreenRect::new(10.0, 30.0, CANVAS.width * s, CANVAS.height * s);
        let elements = slide
            .element_ids()
            .enumerate()
            .map(|(i, id)| {
                let top = 30.0 + (120.0 + 200.0 * i as f64) * s;
                (id.clone(), ScreenRect::new(10.0 + 80.0 * s, top, 920.0 * s, 160.0 * s))
            })
            .collect();
        Some(SlideMeasurement {
            container,
            elements,
        })
    }
}

struct Offscreen;

impl SlideMeasurer for Offscreen {
    fn measure(&self, _slide: &Slide) -> Option<SlideMeasurement> {
        None
    }
}

fn session() -> EditorState {
    let slide = Slide::new(SlideLayout::TitleBody)
        .with_id("s")
        .with_element(Element::heading(HeadingLevel::H1, "Title").with_id("h"))
        .with_element(Element::overlay("rgba(0,0,0,0.4)").with_id("o"))
        .with_element(Element::paragraph("Body").with_id("p"));
    EditorState::new(CarouselDocument::new_empty("d").with_slide(slide))
}

fn element_ids(state: &EditorState) -> Vec<String> {
    state.document().slides[0]
        .element_ids()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_freeform_keeps_visual_positions() {
    let mut state = session();
    let action = state
        .convert_to_freeform(0, &ColumnMeasurer { scale: 0.5 })
        .expect("slide exists");
    state.dispatch(action);

    let slide = &state.document().slides[0];
    assert!(slide.is_freeform());
    assert_eq!(element_ids(&state), vec!["o", "h", "p"]);
    assert_eq!(slide.frame(&"o".into()).map(|f| f.rect()), Some(CANVAS.bounds()));
    // The heading was first in the measured column, the paragraph third.
    assert_eq!(
        slide.frame(&"h".into()).map(|f| f.rect()),
        Some(Rect::new(80.0, 120.0, 920.0, 160.0))
    );
    assert_eq!(
        slide.frame(&"p".into()).map(|f| f.rect()),
        Some(Rect::new(80.0, 520.0, 920.0, 160.0))
    );
}

#[test]
fn test_geometry_independent_of_display_zoom() {
    let convert = |scale| {
        let mut state = session();
        let action = state
            .convert_to_freeform(0, &ColumnMeasurer { scale })
            .expect("slide exists");
        state.dispatch(action);
        state.document().slides[0].records()
    };
    assert_eq!(convert(0.5), convert(0.25));
    assert_eq!(convert(0.5), convert(1.0));
}

#[test]
fn test_offscreen_conversion_positions_only_overlays() {
    let mut state = session();
    let action = state.convert_to_freeform(0, &Offscreen).expect("slide exists");
    state.dispatch(action);

    let slide = &state.document().slides[0];
    assert!(slide.is_freeform());
    assert_eq!(slide.frame(&"o".into()).map(|f| f.rect()), Some(CANVAS.bounds()));
    assert!(slide.frame(&"h".into()).is_some_and(|f| f.is_empty()));
}

#[test]
fn test_round_trip_preserves_content_and_drops_frames() {
    let mut state = session();
    let before: Vec<Element> = state.document().slides[0].elements().cloned().collect();

    let to_freeform = state
        .convert_to_freeform(0, &ColumnMeasurer { scale: 0.5 })
        .expect("slide exists");
    state.dispatch(to_freeform);
    let back = state
        .convert_to_flow(0, SlideLayout::Cover)
        .expect("slide exists");
    state.dispatch(back);

    let slide = &state.document().slides[0];
    assert_eq!(slide.layout(), SlideLayout::Cover);
    assert!(slide.overlays_are_prefix());
    for id in ["o", "h", "p"] {
        assert_eq!(slide.frame(&ElementId::from(id)), None);
    }
    let mut after: Vec<Element> = slide.elements().cloned().collect();
    let mut expected = before;
    expected.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    after.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    assert_eq!(after, expected);
}

#[test]
fn test_overlay_gets_full_canvas_despite_supplied_geometry() {
    let mut state = session();
    let mut geometry = HashMap::new();
    geometry.insert(ElementId::from("o"), Rect::new(5.0, 5.0, 10.0, 10.0));
    state.dispatch(Action::SetSlideLayout {
        slide_index: 0,
        layout: SlideLayout::Freeform,
        geometry,
    });
    let slide = &state.document().slides[0];
    assert_eq!(slide.frame(&"o".into()).map(|f| f.rect()), Some(CANVAS.bounds()));
}

#[test]
fn test_conversion_is_one_undo_step() {
    let mut state = session();
    let original = state.document().clone();
    let action = state
        .convert_to_freeform(0, &ColumnMeasurer { scale: 0.5 })
        .expect("slide exists");
    state.dispatch(action);
    state.dispatch(Action::Undo);
    assert_eq!(state.document(), &original);
}

#[test]
fn test_freeform_frame_serializes_flat() {
    let mut state = session();
    let action = state
        .convert_to_freeform(0, &ColumnMeasurer { scale: 0.5 })
        .expect("slide exists");
    state.dispatch(action);

    let json = serde_json::to_value(&state.document().slides[0]).expect("serialize");
    assert_eq!(json["layout"], "freeform");
    let heading = &json["elements"][1];
    assert_eq!(heading["id"], "h");
    assert_eq!(heading["type"], "heading");
    assert_eq!(heading["x"], 80.0);
    assert_eq!(heading["w"], 920.0);

    let back = state
        .convert_to_flow(0, SlideLayout::TitleBody)
        .expect("slide exists");
    state.dispatch(back);
    let json = serde_json::to_value(&state.document().slides[0]).expect("serialize");
    assert!(json["elements"][1].get("x").is_none());
}
