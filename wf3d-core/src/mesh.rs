/// Wire-frame mesh model: vertices, unit normals and polygon faces
use std::fmt;

use tracing::warn;

use crate::error::MeshValidationError;
use crate::geometry::Point3D;

/// Allowed deviation of a normal's magnitude from 1
pub const NORMAL_TOLERANCE: f64 = 1e-4;

/// Largest absolute coordinate of a normalized model
pub const MAX_MEASURE: f64 = 0.75;

/// A polygon face indexing into the owning wire-frame's arrays.
///
/// Every vertex of the face shares the single optional normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    vertices: Vec<usize>,
    normal: Option<usize>,
}

impl Face {
    pub fn new(vertices: Vec<usize>, normal: Option<usize>) -> Self {
        Self { vertices, normal }
    }

    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Option<usize> {
        self.vertices.get(index).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn normal(&self) -> Option<usize> {
        self.normal
    }

    pub fn set_normal(&mut self, normal: Option<usize>) {
        self.normal = normal;
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.normal {
            Some(n) => write!(f, "Face: [Normal = {n}, Vertices = {:?}]", self.vertices),
            None => write!(f, "Face: [Normal = none, Vertices = {:?}]", self.vertices),
        }
    }
}

/// The full mesh drawn by a [`crate::WireFrameView`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjWireFrame {
    pub vertices: Vec<Point3D>,
    pub normals: Vec<Point3D>,
    pub faces: Vec<Face>,
}

impl ObjWireFrame {
    pub fn new(vertices: Vec<Point3D>, normals: Vec<Point3D>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            normals,
            faces,
        }
    }

    /// Checks that every normal is unit length and every face index resolves.
    pub fn validate(&self) -> Result<(), MeshValidationError> {
        for (index, normal) in self.normals.iter().enumerate() {
            let magnitude = normal.magnitude();
            // written so that NaN magnitudes fail too
            if !((magnitude - 1.0).abs() <= NORMAL_TOLERANCE) {
                warn!("Invalid normal: {normal}, magnitude: {magnitude}");
                return Err(MeshValidationError::NonUnitNormal { index, magnitude });
            }
        }

        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(normal) = face.normal() {
                if normal >= self.normals.len() {
                    warn!(
                        "Invalid normal index: {normal} not in [0,{})",
                        self.normals.len()
                    );
                    return Err(MeshValidationError::NormalIndexOutOfRange {
                        face: face_index,
                        normal,
                        count: self.normals.len(),
                    });
                }
            }

            for &vertex in face.vertices() {
                if vertex >= self.vertices.len() {
                    warn!(
                        "Invalid vertex index: {vertex} not in [0,{})",
                        self.vertices.len()
                    );
                    return Err(MeshValidationError::VertexIndexOutOfRange {
                        face: face_index,
                        vertex,
                        count: self.vertices.len(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Average of all vertices.
    pub fn mean_point(&self) -> Point3D {
        let sum = self
            .vertices
            .iter()
            .fold(Point3D::origin(), |acc, v| acc + *v);
        sum.scale(1.0 / self.vertices.len() as f64)
    }

    /// Largest absolute vertex coordinate, never less than 1.
    pub fn max_measure(&self) -> f64 {
        self.vertices.iter().fold(1.0_f64, |max, v| {
            max.max(v.x().abs()).max(v.y().abs()).max(v.z().abs())
        })
    }

    /// Moves the mean vertex to the origin, then scales the model so its
    /// largest coordinate is at most `max_measure`.
    pub fn normalize_to_view(&mut self, max_measure: f64) {
        if self.vertices.is_empty() {
            return;
        }

        let mean = self.mean_point();
        for vertex in &mut self.vertices {
            *vertex = *vertex - mean;
        }

        let scale = max_measure / self.max_measure();
        for vertex in &mut self.vertices {
            *vertex = vertex.scale(scale);
        }
    }

    /// Axis-aligned cube centred on the origin with outward normals.
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;

        let vertices = vec![
            Point3D::new(-h, -h, -h),
            Point3D::new(h, -h, -h),
            Point3D::new(h, h, -h),
            Point3D::new(-h, h, -h),
            Point3D::new(-h, -h, h),
            Point3D::new(h, -h, h),
            Point3D::new(h, h, h),
            Point3D::new(-h, h, h),
        ];

        let normals = vec![
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(0.0, 0.0, -1.0),
            Point3D::new(0.0, 1.0, 0.0),
            Point3D::new(0.0, -1.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(-1.0, 0.0, 0.0),
        ];

        let faces = vec![
            // Front (+z)
            Face::new(vec![4, 5, 6, 7], Some(0)),
            // Back (-z)
            Face::new(vec![0, 3, 2, 1], Some(1)),
            // Top (+y)
            Face::new(vec![3, 7, 6, 2], Some(2)),
            // Bottom (-y)
            Face::new(vec![0, 1, 5, 4], Some(3)),
            // Right (+x)
            Face::new(vec![1, 2, 6, 5], Some(4)),
            // Left (-x)
            Face::new(vec![0, 4, 7, 3], Some(5)),
        ];

        Self::new(vertices, normals, faces)
    }
}

impl fmt::Display for ObjWireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ObjWireFrame: [{} vertices, {} normals, {} faces]",
            self.vertices.len(),
            self.normals.len(),
            self.faces.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_is_valid() {
        let cube = ObjWireFrame::cube(1.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.is_valid());
    }

    #[test]
    fn test_empty_mesh_is_valid() {
        assert!(ObjWireFrame::default().is_valid());
    }

    #[test]
    fn test_vertex_index_equal_to_count_fails() {
        let mut cube = ObjWireFrame::cube(1.0);
        cube.faces.push(Face::new(vec![0, 1, 8], None));

        assert_eq!(
            cube.validate(),
            Err(MeshValidationError::VertexIndexOutOfRange {
                face: 6,
                vertex: 8,
                count: 8
            })
        );
    }

    #[test]
    fn test_normal_index_out_of_range_fails() {
        let mut cube = ObjWireFrame::cube(1.0);
        cube.faces[2].set_normal(Some(6));
        assert!(matches!(
            cube.validate(),
            Err(MeshValidationError::NormalIndexOutOfRange { face: 2, normal: 6, .. })
        ));
    }

    #[test]
    fn test_normal_tolerance() {
        let mut cube = ObjWireFrame::cube(1.0);
        cube.normals[0] = Point3D::new(0.0, 0.0, 1.00009);
        assert!(cube.is_valid());

        cube.normals[0] = Point3D::new(0.0, 0.0, 1.0002);
        assert!(matches!(
            cube.validate(),
            Err(MeshValidationError::NonUnitNormal { index: 0, .. })
        ));

        cube.normals[0] = Point3D::new(f64::NAN, 0.0, 0.0);
        assert!(!cube.is_valid());
    }

    #[test]
    fn test_normalize_to_view_centres_and_scales() {
        let mut mesh = ObjWireFrame::new(
            vec![
                Point3D::new(10.0, 0.0, 0.0),
                Point3D::new(14.0, 2.0, 0.0),
                Point3D::new(12.0, -2.0, 0.0),
            ],
            Vec::new(),
            Vec::new(),
        );

        mesh.normalize_to_view(MAX_MEASURE);

        let mean = mesh.mean_point();
        assert!(mean.magnitude() < 1e-12);
        // centred extents are 2, so everything scales by 0.75 / 2
        assert!((mesh.vertices[1].x() - 0.75).abs() < 1e-12);
        assert!((mesh.vertices[2].y() + 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_small_models_are_not_enlarged_past_measure_one() {
        let mut mesh = ObjWireFrame::cube(0.5);
        mesh.normalize_to_view(MAX_MEASURE);
        // max_measure() floors at 1, so the cube only shrinks
        assert!((mesh.vertices[6].x() - 0.1875).abs() < 1e-12);
    }
}
