//! Visual objects: the rebuildable canvas-side projection of block records.
//!
//! A `VisualNode` is a composite value: its own transform, intrinsic size, a
//! cached bounding box, and nested member nodes. Scaling a node applies the
//! same factor to every member recursively, so grouped artwork (a frame plus
//! its label, an imported vector drawing) zooms as one unit.
//!
//! A `VisualObject` pairs a root node with the block id it projects and the
//! disposable `BlockHandle` returned by the block factory. It never owns the
//! block record; it can be thrown away and rebuilt from the document at any
//! time.

#[cfg(test)]
#[path = "visual_test.rs"]
mod visual_test;

use crate::doc::BlockId;

/// Position, scale, and rotation of a visual node in view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Left edge in view pixels (relative to the parent for members).
    pub left: f64,
    /// Top edge in view pixels (relative to the parent for members).
    pub top: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Clockwise rotation in degrees around the top-left corner.
    pub angle: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, scale_x: 1.0, scale_y: 1.0, angle: 0.0 }
    }
}

/// Axis-aligned bounding box in view space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Composite visual node with a recursive transform.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub transform: Transform,
    /// Intrinsic width before scaling.
    pub width: f64,
    /// Intrinsic height before scaling.
    pub height: f64,
    /// Zoom scale this node was last scaled to.
    pub canvas_scale: f64,
    /// Nested members, positioned relative to this node.
    pub members: Vec<VisualNode>,
    bounds: Bounds,
}

impl VisualNode {
    /// Create an unscaled node and compute its bounds.
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64, angle: f64) -> Self {
        let mut node = Self {
            transform: Transform { left, top, angle, ..Transform::default() },
            width,
            height,
            canvas_scale: 1.0,
            members: Vec::new(),
            bounds: Bounds::default(),
        };
        node.set_coords();
        node
    }

    /// Builder-style helper to attach nested members.
    #[must_use]
    pub fn with_members(mut self, members: Vec<VisualNode>) -> Self {
        self.members = members;
        self
    }

    /// Rendered width (intrinsic width times horizontal scale).
    #[must_use]
    pub fn current_width(&self) -> f64 {
        self.width * self.transform.scale_x
    }

    /// Rendered height (intrinsic height times vertical scale).
    #[must_use]
    pub fn current_height(&self) -> f64 {
        self.height * self.transform.scale_y
    }

    /// Cached bounding box as of the last [`VisualNode::set_coords`].
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Multiply position and scale by `factor`, recursing into members, and
    /// re-validate every cached bounding box.
    pub fn scale_by(&mut self, factor: f64) {
        let t = &mut self.transform;
        t.left *= factor;
        t.top *= factor;
        t.scale_x *= factor;
        t.scale_y *= factor;
        for member in &mut self.members {
            member.scale_by(factor);
        }
        self.set_coords();
    }

    /// Record the zoom scale on this node and all members.
    pub fn tag_scale(&mut self, scale: f64) {
        self.canvas_scale = scale;
        for member in &mut self.members {
            member.tag_scale(scale);
        }
    }

    /// Bake the current scale into the intrinsic size so that scale returns
    /// to 1 without changing the apparent size. Only this node is affected;
    /// members keep their own scale.
    #[allow(clippy::float_cmp)]
    pub fn normalize_scale(&mut self) {
        let w = self.current_width();
        let h = self.current_height();
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.transform.scale_x = 1.0;
            self.transform.scale_y = 1.0;
            self.set_coords();
        }
    }

    /// Recompute the cached axis-aligned bounding box from the transform.
    pub fn set_coords(&mut self) {
        let t = self.transform;
        let w = self.current_width();
        let h = self.current_height();
        let (sin, cos) = t.angle.to_radians().sin_cos();
        let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];

        let mut bounds = Bounds { min_x: f64::MAX, min_y: f64::MAX, max_x: f64::MIN, max_y: f64::MIN };
        for (cx, cy) in corners {
            let x = t.left + cx * cos - cy * sin;
            let y = t.top + cx * sin + cy * cos;
            bounds.min_x = bounds.min_x.min(x);
            bounds.min_y = bounds.min_y.min(y);
            bounds.max_x = bounds.max_x.max(x);
            bounds.max_y = bounds.max_y.max(y);
        }
        self.bounds = bounds;
    }
}

/// Identity reported by a constructed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockData {
    pub block_id: BlockId,
    pub block_type: String,
    /// Display name shown in block lists.
    pub block_name: String,
}

/// Disposable block instance returned by the block factory.
pub trait BlockHandle: Send {
    /// Identity of the block this handle was built for.
    fn block_data(&self) -> BlockData;

    /// Release any resources held by the block. Called exactly once when the
    /// visual object is torn down.
    fn delete_block(&mut self);

    /// Nested artwork drawn inside the block's frame, positioned relative to
    /// the block's top-left corner.
    fn artwork(&self) -> Vec<VisualNode> {
        Vec::new()
    }
}

/// Canvas-side projection of exactly one block record.
pub struct VisualObject {
    pub block_id: BlockId,
    pub block_type: String,
    /// Display name reported by the block handle.
    pub name: String,
    pub node: VisualNode,
    handle: Box<dyn BlockHandle>,
}

impl VisualObject {
    /// Wrap a factory handle and its root geometry.
    #[must_use]
    pub fn new(handle: Box<dyn BlockHandle>, mut node: VisualNode) -> Self {
        let data = handle.block_data();
        if node.members.is_empty() {
            node.members = handle.artwork();
        }
        Self { block_id: data.block_id, block_type: data.block_type, name: data.block_name, node, handle }
    }

    /// Identity reported by the underlying handle.
    #[must_use]
    pub fn block_data(&self) -> BlockData {
        self.handle.block_data()
    }

    /// Tear down the block through its handle.
    pub fn dispose(mut self) {
        self.handle.delete_block();
    }
}

impl std::fmt::Debug for VisualObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualObject")
            .field("block_id", &self.block_id)
            .field("block_type", &self.block_type)
            .field("name", &self.name)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
