/// Visibility, depth ordering and path emission.
///
/// Faces are culled against their transformed normal, ordered far-to-near by
/// the largest transformed z of their vertices, and emitted as closed paths
/// for a painter's-algorithm draw: each path is filled (hiding whatever was
/// drawn behind it) and then stroked.
use nalgebra::Point2;
use serde::Deserialize;

use crate::geometry::Point3D;
use crate::mesh::Face;

/// Direction the viewer looks in.
pub fn view_vector() -> Point3D {
    Point3D::new(0.0, 0.0, -1.0)
}

/// An RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Vec<u8>")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            self.a as f64 / 255.0
        )
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    fn try_from(channels: Vec<u8>) -> Result<Self, Self::Error> {
        match channels.as_slice() {
            &[r, g, b] => Ok(Color::rgb(r, g, b)),
            &[r, g, b, a] => Ok(Color::rgba(r, g, b, a)),
            other => Err(format!("expected 3 or 4 colour channels, got {}", other.len())),
        }
    }
}

/// A host that accepts path drawing commands in view coordinates.
pub trait Surface {
    fn clear(&mut self);
    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point2<f64>);
    fn line_to(&mut self, point: Point2<f64>);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn save(&mut self) {}
    fn restore(&mut self) {}
    /// Restricts drawing to the current path until the next `restore`.
    fn clip(&mut self) {}
}

/// One recorded [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    StrokeColor(Color),
    FillColor(Color),
    BeginPath,
    MoveTo(Point2<f64>),
    LineTo(Point2<f64>),
    ClosePath,
    Fill,
    Stroke,
    Save,
    Restore,
    Clip,
}

/// A surface that remembers every command it receives.
#[derive(Debug, Default)]
pub struct PathRecorder {
    pub commands: Vec<DrawCommand>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The closed polygons drawn so far, one per `BeginPath`.
    pub fn paths(&self) -> Vec<Vec<Point2<f64>>> {
        let mut paths = Vec::new();
        let mut current: Option<Vec<Point2<f64>>> = None;

        for command in &self.commands {
            match command {
                DrawCommand::BeginPath => {
                    if let Some(path) = current.take() {
                        paths.push(path);
                    }
                    current = Some(Vec::new());
                }
                DrawCommand::MoveTo(p) | DrawCommand::LineTo(p) => {
                    if let Some(path) = current.as_mut() {
                        path.push(*p);
                    }
                }
                _ => {}
            }
        }

        paths.extend(current);
        paths
    }
}

impl Surface for PathRecorder {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::StrokeColor(color));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillColor(color));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, point: Point2<f64>) {
        self.commands.push(DrawCommand::MoveTo(point));
    }

    fn line_to(&mut self, point: Point2<f64>) {
        self.commands.push(DrawCommand::LineTo(point));
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn clip(&mut self) {
        self.commands.push(DrawCommand::Clip);
    }
}

/// Faces without a normal are always drawn; others only when their
/// transformed normal faces the viewer or is exactly side-on.
pub fn is_front_facing(face: &Face, transformed_normals: &[Point3D]) -> bool {
    match face.normal() {
        None => true,
        Some(normal) => transformed_normals[normal].dot(&view_vector()) >= 0.0,
    }
}

/// Largest transformed z over the face's vertices; `-∞` for an empty face.
pub fn max_z(face: &Face, transformed_vertices: &[Point3D]) -> f64 {
    face.vertices()
        .iter()
        .fold(f64::NEG_INFINITY, |max, &v| max.max(transformed_vertices[v].z()))
}

/// Sorts `order` ascending by `keys`, keeping equal keys in their current
/// relative order.
///
/// Insertion sort: frame-to-frame the order barely changes.
pub fn insertion_sort_by_key(order: &mut [usize], keys: &mut [f64]) {
    debug_assert_eq!(order.len(), keys.len());

    for i in 1..order.len() {
        let item = order[i];
        let key = keys[i];

        let mut j = i;
        while j > 0 && keys[j - 1] > key {
            order[j] = order[j - 1];
            keys[j] = keys[j - 1];
            j -= 1;
        }

        order[j] = item;
        keys[j] = key;
    }
}

/// Face indices in painter's order (farthest first), culled faces removed.
pub fn depth_sorted_visible_faces(
    faces: &[Face],
    transformed_vertices: &[Point3D],
    transformed_normals: &[Point3D],
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..faces.len()).collect();
    let mut keys: Vec<f64> = faces
        .iter()
        .map(|face| max_z(face, transformed_vertices))
        .collect();

    insertion_sort_by_key(&mut order, &mut keys);

    order.retain(|&i| is_front_facing(&faces[i], transformed_normals));
    order
}

/// The closed outline of a face: its projected vertices with the first
/// repeated at the end.
pub fn face_path(face: &Face, projected: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut path: Vec<Point2<f64>> = face.vertices().iter().map(|&v| projected[v]).collect();
    if let Some(&first) = path.first() {
        path.push(first);
    }
    path
}

/// Emits one face: fill to occlude what lies behind, then stroke the edges.
pub fn emit_face<S: Surface + ?Sized>(surface: &mut S, path: &[Point2<f64>]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    surface.begin_path();
    surface.move_to(*first);
    for point in rest {
        surface.line_to(*point);
    }
    surface.close_path();

    surface.save();
    surface.clip();
    surface.fill();
    surface.stroke();
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(normal: Option<usize>) -> Face {
        Face::new(vec![0, 1, 2], normal)
    }

    #[test]
    fn test_backface_cull() {
        let toward_plus_z = [Point3D::new(0.0, 0.0, 1.0)];
        let toward_minus_z = [Point3D::new(0.0, 0.0, -1.0)];
        let side_on = [Point3D::new(1.0, 0.0, 0.0)];

        assert!(!is_front_facing(&triangle(Some(0)), &toward_plus_z));
        assert!(is_front_facing(&triangle(Some(0)), &toward_minus_z));
        assert!(is_front_facing(&triangle(Some(0)), &side_on));
        assert!(is_front_facing(&triangle(None), &toward_plus_z));
        assert!(is_front_facing(&triangle(None), &[]));
    }

    #[test]
    fn test_max_z_uses_the_nearest_vertex() {
        let vertices = [
            Point3D::new(0.0, 0.0, -4.0),
            Point3D::new(0.0, 0.0, 1.5),
            Point3D::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(max_z(&triangle(None), &vertices), 1.5);
        assert_eq!(max_z(&Face::new(Vec::new(), None), &vertices), f64::NEG_INFINITY);
    }

    #[test]
    fn test_depth_sort_is_stable() {
        let mut order = vec![0, 1, 2];
        let mut keys = vec![2.0, -1.0, 2.0];
        insertion_sort_by_key(&mut order, &mut keys);
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(keys, vec![-1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_depth_sort_reverse_input() {
        let mut order = vec![0, 1, 2, 3];
        let mut keys = vec![3.0, 2.0, 1.0, 0.0];
        insertion_sort_by_key(&mut order, &mut keys);
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_culled_faces_are_dropped_after_sorting() {
        let vertices = [
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(0.0, 0.0, -1.0),
            Point3D::new(0.0, 0.0, 0.0),
        ];
        let normals = [Point3D::new(0.0, 0.0, -1.0), Point3D::new(0.0, 0.0, 1.0)];
        let faces = [
            Face::new(vec![0], Some(0)),
            Face::new(vec![1], Some(1)),
            Face::new(vec![2], None),
        ];

        let order = depth_sorted_visible_faces(&faces, &vertices, &normals);
        assert_eq!(order, vec![2, 0]);
    }

    #[test]
    fn test_emit_face_closes_the_path() {
        let projected = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        let mut recorder = PathRecorder::new();

        emit_face(&mut recorder, &face_path(&triangle(None), &projected));

        assert_eq!(
            recorder.commands,
            vec![
                DrawCommand::BeginPath,
                DrawCommand::MoveTo(projected[0]),
                DrawCommand::LineTo(projected[1]),
                DrawCommand::LineTo(projected[2]),
                DrawCommand::LineTo(projected[0]),
                DrawCommand::ClosePath,
                DrawCommand::Save,
                DrawCommand::Clip,
                DrawCommand::Fill,
                DrawCommand::Stroke,
                DrawCommand::Restore,
            ]
        );
        assert_eq!(recorder.paths().len(), 1);
    }

    #[test]
    fn test_color_from_channels() {
        assert_eq!(Color::try_from(vec![1, 2, 3]), Ok(Color::rgb(1, 2, 3)));
        assert_eq!(Color::try_from(vec![1, 2, 3, 4]), Ok(Color::rgba(1, 2, 3, 4)));
        assert!(Color::try_from(vec![1, 2]).is_err());
        assert_eq!(Color::TRANSPARENT.to_css(), "rgba(0, 0, 0, 0)");
    }
}
