//! Coordinate transform between document space and view space, and zoom.
//!
//! Document space is the unscaled unit system persisted in scene documents.
//! View space is document space multiplied by the current zoom `scale`.
//! Geometry that the user manipulated on the canvas arrives in view space
//! and is divided by the scale on its way into the document; values typed
//! into the property panel are already authoritative and pass through.
//!
//! Zooming never touches the document: [`Zoom`] scales the live visual
//! objects in place, so selection and interaction state survive.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use tracing::debug;

use crate::canvas::Canvas;
use crate::consts::ZOOM_STEP;
use crate::doc::BlockLayout;
use crate::visual::VisualNode;

/// Position, size, and rotation as reported by the canvas (view space) or
/// the property panel (document space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees; never scaled.
    pub angle: f64,
}

/// Convert geometry to document-space layout.
///
/// When `calc_scale` is true the position and size are divided by `scale`;
/// otherwise they are taken as already authoritative. All values are rounded
/// to whole document units.
#[must_use]
pub fn to_document_space(scale: f64, geometry: ViewGeometry, calc_scale: bool) -> BlockLayout {
    let factor = if calc_scale { 1.0 / scale } else { 1.0 };
    BlockLayout {
        x: round_unit(geometry.x * factor),
        y: round_unit(geometry.y * factor),
        width: round_unit(geometry.width * factor),
        height: round_unit(geometry.height * factor),
        rotation: round_unit(geometry.angle),
    }
}

/// Convert a document-space layout to view space at `scale`.
#[must_use]
pub fn to_view_space(layout: BlockLayout, scale: f64) -> ViewGeometry {
    #[allow(clippy::cast_precision_loss)]
    ViewGeometry {
        x: layout.x as f64 * scale,
        y: layout.y as f64 * scale,
        width: layout.width as f64 * scale,
        height: layout.height as f64 * scale,
        angle: layout.rotation as f64,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_unit(value: f64) -> i64 {
    value.round() as i64
}

/// Current zoom state of the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    /// Accumulated scale; 1.0 means unzoomed.
    pub scale: f64,
    /// Factor applied per zoom step.
    pub step: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { scale: 1.0, step: ZOOM_STEP }
    }
}

impl Zoom {
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self { scale: 1.0, step }
    }

    /// Zoom in one step. No-op without a canvas.
    pub fn zoom_in(&mut self, canvas: Option<&mut Canvas>) {
        let Some(canvas) = canvas else {
            return;
        };
        self.scale *= self.step;
        apply_factor(canvas, self.step, self.scale);
        debug!(scale = self.scale, "zoom in");
    }

    /// Zoom out one step. No-op without a canvas.
    pub fn zoom_out(&mut self, canvas: Option<&mut Canvas>) {
        let Some(canvas) = canvas else {
            return;
        };
        self.scale /= self.step;
        apply_factor(canvas, 1.0 / self.step, self.scale);
        debug!(scale = self.scale, "zoom out");
    }

    /// Return to scale 1 by applying the inverse of the accumulated scale in
    /// a single pass. The scale field is reset even without a canvas.
    pub fn zoom_reset(&mut self, canvas: Option<&mut Canvas>) {
        if let Some(canvas) = canvas {
            apply_factor(canvas, 1.0 / self.scale, 1.0);
        }
        self.scale = 1.0;
        debug!("zoom reset");
    }

    /// Scale a freshly built object set from document space (scale 1) to the
    /// current zoom.
    pub fn apply_to(&self, node: &mut VisualNode) {
        #[allow(clippy::float_cmp)]
        let unzoomed = self.scale == 1.0;
        if !unzoomed {
            node.scale_by(self.scale);
        }
        node.tag_scale(self.scale);
    }
}

fn apply_factor(canvas: &mut Canvas, factor: f64, scale: f64) {
    canvas.discard_group();
    canvas.scale_viewport(factor);
    for obj in canvas.objects_mut() {
        obj.node.scale_by(factor);
        obj.node.tag_scale(scale);
    }
}

/// Bake each top-level object's scale into its size after a zoom, so drag
/// handles report unscaled deltas.
pub fn normalize_all(canvas: &mut Canvas) {
    for obj in canvas.objects_mut() {
        obj.node.normalize_scale();
    }
}
