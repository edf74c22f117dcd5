//! Slide-space geometry and the flow → freeform coordinate mapping.
//!
//! Slides live in a fixed 1080×1440 logical coordinate space. Freeform
//! elements carry a [`Frame`] in that space; everything the renderer measures
//! on screen is converted through [`map_to_canvas`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::slide::Slide;

/// Width used for a freeform element whose frame has no `w`.
pub const DEFAULT_ELEMENT_WIDTH: f64 = 200.0;

/// Height used for a freeform element whose frame has no `h`.
pub const DEFAULT_ELEMENT_HEIGHT: f64 = 50.0;

/// Logical canvas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
}

/// The fixed carousel canvas, 1080×1440.
pub const CANVAS: CanvasSize = CanvasSize {
    width: 1080.0,
    height: 1440.0,
};

impl CanvasSize {
    /// The rectangle covering the whole canvas.
    #[must_use]
    pub const fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CANVAS
    }
}

/// A point (pointer position, usually in screen pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in slide space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    #[serde(rename = "w")]
    pub width: f64,
    /// Height.
    #[serde(rename = "h")]
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal centre.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical centre.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Round every component to the nearest whole unit.
    #[must_use]
    pub fn round(self) -> Self {
        Self::new(
            self.x.round(),
            self.y.round(),
            self.width.round(),
            self.height.round(),
        )
    }
}

/// Freeform geometry of one element.
///
/// Every field is optional: a freeform slide may hold elements that were
/// never measured (they fall back to `0,0` and the default size) and a
/// rotation or stacking override is rarely set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    /// Left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Explicit stacking override.
    #[serde(rename = "zIndex", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl Frame {
    /// A frame with position and size set.
    #[must_use]
    pub const fn from_rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            w: Some(rect.width),
            h: Some(rect.height),
            rotation: None,
            z_index: None,
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resolve to a concrete rectangle, substituting `0,0` and the default size.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x.unwrap_or(0.0),
            self.y.unwrap_or(0.0),
            self.w.unwrap_or(DEFAULT_ELEMENT_WIDTH),
            self.h.unwrap_or(DEFAULT_ELEMENT_HEIGHT),
        )
    }

    /// Overwrite position and size, keeping rotation and stacking.
    pub fn set_rect(&mut self, rect: Rect) {
        self.x = Some(rect.x);
        self.y = Some(rect.y);
        self.w = Some(rect.width);
        self.h = Some(rect.height);
    }
}

/// A bounding box as measured on screen, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// Create a screen rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Map an element's on-screen box into slide space.
///
/// The scale factor is `canvas / container` per axis, so the result
/// reproduces the element's visual position at any display zoom (to
/// rounding). Returns `None` for a degenerate container.
#[must_use]
pub fn map_to_canvas(container: ScreenRect, element: ScreenRect, canvas: CanvasSize) -> Option<Rect> {
    if container.width <= 0.0 || container.height <= 0.0 {
        return None;
    }
    let scale_x = canvas.width / container.width;
    let scale_y = canvas.height / container.height;
    Some(
        Rect::new(
            (element.left - container.left) * scale_x,
            (element.top - container.top) * scale_y,
            element.width * scale_x,
            element.height * scale_y,
        )
        .round(),
    )
}

/// What the renderer measured for one slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideMeasurement {
    /// The slide container's box.
    pub container: ScreenRect,
    /// Each rendered element's box. Elements that are not rendered are absent.
    pub elements: HashMap<ElementId, ScreenRect>,
}

/// The rendering/measurement collaborator.
///
/// Implemented by whatever draws slides; it reports where each element of a
/// slide currently sits on screen.
pub trait SlideMeasurer {
    /// Measure `slide`, or `None` if it is not on screen.
    fn measure(&self, slide: &Slide) -> Option<SlideMeasurement>;
}

/// Build the per-element geometry map consumed by a freeform conversion.
///
/// Overlays always cover the full canvas. Elements with no measurement are
/// left out, so the conversion keeps whatever frame they had.
#[must_use]
pub fn freeform_geometry(
    slide: &Slide,
    measurement: &SlideMeasurement,
    canvas: CanvasSize,
) -> HashMap<ElementId, Rect> {
    let mut geometry = HashMap::new();
    for element in slide.elements() {
        if element.is_overlay() {
            geometry.insert(element.id.clone(), canvas.bounds());
            continue;
        }
        let Some(measured) = measurement.elements.get(&element.id) else {
            continue;
        };
        if let Some(rect) = map_to_canvas(measurement.container, *measured, canvas) {
            geometry.insert(element.id.clone(), rect);
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_defaults_missing_size() {
        let frame = Frame {
            x: Some(80.0),
            y: Some(200.0),
            w: Some(920.0),
            ..Frame::default()
        };
        assert_eq!(frame.rect(), Rect::new(80.0, 200.0, 920.0, 50.0));
        assert_eq!(Frame::default().rect(), Rect::new(0.0, 0.0, 200.0, 50.0));
    }

    #[test]
    fn test_frame_wire_names() {
        let frame = Frame {
            z_index: Some(3),
            ..Frame::from_rect(Rect::new(1.0, 2.0, 3.0, 4.0))
        };
        let json = serde_json::to_value(frame).expect("serialize");
        assert_eq!(json["w"], 3.0);
        assert_eq!(json["zIndex"], 3);
        assert!(json.get("rotation").is_none());
    }

    #[test]
    fn test_map_to_canvas_scales_per_axis() {
        // Slide shown at 0.5 scale: 540×720 on screen.
        let container = ScreenRect::new(100.0, 50.0, 540.0, 720.0);
        let element = ScreenRect::new(140.0, 150.0, 200.0, 25.0);
        let rect = map_to_canvas(container, element, CANVAS).expect("mapped");
        assert_eq!(rect, Rect::new(80.0, 200.0, 400.0, 50.0));
    }

    #[test]
    fn test_map_to_canvas_rounds() {
        let container = ScreenRect::new(0.0, 0.0, 405.0, 540.0);
        let element = ScreenRect::new(10.1, 10.1, 100.0, 33.3);
        let rect = map_to_canvas(container, element, CANVAS).expect("mapped");
        assert_eq!(rect, Rect::new(27.0, 27.0, 267.0, 89.0));
    }

    #[test]
    fn test_map_to_canvas_rejects_degenerate_container() {
        let container = ScreenRect::new(0.0, 0.0, 0.0, 720.0);
        assert!(map_to_canvas(container, ScreenRect::default(), CANVAS).is_none());
    }
}
