//! Smart guides: snapping a dragged rectangle to slide and sibling lines.
//!
//! Each axis is an independent 1-D problem. The dragged rectangle's near
//! edge, centre and far edge are compared against every candidate line; the
//! closest pair within the threshold wins and produces one guide.

use serde::{Deserialize, Serialize};

use crate::config::SnapConfig;
use crate::geometry::{CanvasSize, Rect};

/// Which way a guide line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideOrientation {
    /// A vertical line at some x.
    Vertical,
    /// A horizontal line at some y.
    Horizontal,
}

/// A guide line to draw while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    /// Orientation.
    pub orientation: GuideOrientation,
    /// x for vertical guides, y for horizontal ones.
    pub position: f64,
}

/// Result of one snapping pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuideResult {
    /// Left edge after snapping (unchanged if nothing snapped on x).
    pub x: f64,
    /// Top edge after snapping (unchanged if nothing snapped on y).
    pub y: f64,
    /// At most one vertical and one horizontal guide.
    pub guides: Vec<Guide>,
}

impl GuideResult {
    /// The vertical guide, if x snapped.
    #[must_use]
    pub fn vertical(&self) -> Option<f64> {
        self.position_of(GuideOrientation::Vertical)
    }

    /// The horizontal guide, if y snapped.
    #[must_use]
    pub fn horizontal(&self) -> Option<f64> {
        self.position_of(GuideOrientation::Horizontal)
    }

    fn position_of(&self, orientation: GuideOrientation) -> Option<f64> {
        self.guides
            .iter()
            .find(|guide| guide.orientation == orientation)
            .map(|guide| guide.position)
    }
}

#[derive(Debug, Clone, Copy)]
struct Snap {
    target: f64,
    offset: f64,
    distance: f64,
}

/// Snap one axis. `start` and `extent` describe the dragged span; `targets`
/// are candidate lines in priority order.
fn snap_axis(start: f64, extent: f64, targets: &[f64], threshold: f64) -> Option<Snap> {
    let checks = [0.0, extent / 2.0, extent];
    let mut best: Option<Snap> = None;
    for &target in targets {
        for &offset in &checks {
            let distance = (start + offset - target).abs();
            if distance > threshold {
                continue;
            }
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(Snap {
                    target,
                    offset,
                    distance,
                });
            }
        }
    }
    best
}

/// Compute snapped position and guide lines for `dragging`.
///
/// `others` are the sibling rectangles on the same slide. Ties go to the
/// first candidate found: slide lines before siblings, near edge before
/// centre before far edge.
#[must_use]
pub fn smart_guides(
    dragging: Rect,
    others: &[Rect],
    canvas: CanvasSize,
    config: &SnapConfig,
) -> GuideResult {
    let mut vertical = vec![0.0, canvas.width / 2.0, canvas.width];
    let mut horizontal = vec![0.0, canvas.height / 2.0, canvas.height];
    for other in others {
        vertical.extend([other.x, other.center_x(), other.right()]);
        horizontal.extend([other.y, other.center_y(), other.bottom()]);
    }

    let mut result = GuideResult {
        x: dragging.x,
        y: dragging.y,
        guides: Vec::new(),
    };

    if let Some(snap) = snap_axis(dragging.x, dragging.width, &vertical, config.threshold) {
        result.x = snap.target - snap.offset;
        result.guides.push(Guide {
            orientation: GuideOrientation::Vertical,
            position: snap.target,
        });
    }
    if let Some(snap) = snap_axis(dragging.y, dragging.height, &horizontal, config.threshold) {
        result.y = snap.target - snap.offset;
        result.guides.push(Guide {
            orientation: GuideOrientation::Horizontal,
            position: snap.target,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CANVAS;

    fn snap(dragging: Rect, others: &[Rect]) -> GuideResult {
        smart_guides(dragging, others, CANVAS, &SnapConfig::default())
    }

    #[test]
    fn test_left_edge_snaps_to_center_line() {
        let result = snap(Rect::new(538.0, 300.0, 200.0, 50.0), &[]);
        assert_eq!(result.x, 540.0);
        assert_eq!(result.vertical(), Some(540.0));
        assert_eq!(result.horizontal(), None);
    }

    #[test]
    fn test_element_center_snaps_to_center_line() {
        let result = snap(Rect::new(438.0, 300.0, 200.0, 50.0), &[]);
        assert_eq!(result.x, 440.0);
        assert_eq!(result.vertical(), Some(540.0));
    }

    #[test]
    fn test_out_of_threshold_keeps_raw_position() {
        let result = snap(Rect::new(520.0, 300.0, 200.0, 50.0), &[]);
        assert_eq!(result.x, 520.0);
        assert!(result.guides.is_empty());
    }

    #[test]
    fn test_snaps_to_sibling_edge() {
        let a = Rect::new(100.0, 900.0, 200.0, 100.0);
        let result = snap(Rect::new(295.0, 300.0, 150.0, 50.0), &[a]);
        assert_eq!(result.x, 300.0);
        assert_eq!(result.vertical(), Some(300.0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let result = snap(Rect::new(5.0, 5.0, 200.0, 50.0), &[]);
        assert_eq!((result.x, result.y), (0.0, 0.0));
        assert_eq!(result.guides.len(), 2);
    }

    #[test]
    fn test_axes_are_independent() {
        let result = snap(Rect::new(300.0, 1388.0, 100.0, 50.0), &[]);
        assert_eq!(result.x, 300.0);
        assert_eq!(result.y, 1390.0);
        assert_eq!(result.horizontal(), Some(1440.0));
        assert_eq!(result.vertical(), None);
    }

    #[test]
    fn test_zero_size_sibling_is_a_valid_target() {
        let point = Rect::new(700.0, 700.0, 0.0, 0.0);
        let result = snap(Rect::new(700.0, 100.0, 120.0, 40.0), &[point]);
        assert_eq!(result.x, 700.0);
        assert_eq!(result.vertical(), Some(700.0));
    }
}
