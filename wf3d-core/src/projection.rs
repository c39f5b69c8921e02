/// Orthogonal projection and the view-to-surface mapping
use nalgebra::Point2;

use crate::geometry::Point3D;

/// Orthogonal projection into view space: drops z and flips y.
///
/// Wire-frame space has +y up; view space rows grow downwards.
pub fn project(point: &Point3D) -> Point2<f64> {
    Point2::new(point.x(), -point.y())
}

/// Maps view coordinates onto a `width` x `height` surface.
///
/// The scale is uniform so that `y` in `[-1, 1]` spans the height and `x` in
/// `[-width/height, width/height]` spans the width, origin at the centre.
/// `cell_aspect` stretches x for surfaces whose cells are taller than wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub cell_aspect: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cell_aspect: 1.0,
        }
    }

    pub fn with_cell_aspect(mut self, cell_aspect: f64) -> Self {
        self.cell_aspect = cell_aspect;
        self
    }

    /// Pixels per view unit.
    pub fn scale(&self) -> f64 {
        self.height as f64 / 2.0
    }

    pub fn to_surface(&self, point: Point2<f64>) -> Point2<f64> {
        let scale = self.scale();
        Point2::new(
            self.width as f64 / 2.0 + point.x * scale * self.cell_aspect,
            self.height as f64 / 2.0 + point.y * scale,
        )
    }

    /// One surface pixel expressed in view units.
    pub fn line_width(&self) -> f64 {
        2.0 / self.height as f64
    }
}
