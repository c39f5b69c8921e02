/// Rotating orthogonal view of a wire-frame.
///
/// The view owns its rotation and every derived buffer. Anything that
/// changes what would be drawn marks it dirty; the next [`WireFrameView::draw`]
/// recomputes the buffers, emits the faces and marks it clean again.
use std::sync::Arc;

use nalgebra::Point2;
use tracing::debug;

use crate::config::ViewSettings;
use crate::geometry::{Matrix3D, Point3D};
use crate::mesh::{Face, ObjWireFrame};
use crate::projection::project;
use crate::render::{self, Color, Surface};
use crate::transform::RotationState;

/// Whether the derived buffers match the current rotation and mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Clean,
    Dirty,
}

pub struct WireFrameView {
    wire_frame: Arc<ObjWireFrame>,
    settings: ViewSettings,
    rotation: RotationState,
    rot_matrix: Matrix3D,
    line_color: Color,

    transformed_vertices: Vec<Point3D>,
    transformed_normals: Vec<Point3D>,
    projected: Vec<Point2<f64>>,
    draw_order: Vec<usize>,

    state: RenderState,
    rotated: bool,
}

impl WireFrameView {
    /// A view with default settings. The mesh must be valid, see
    /// [`Self::with_settings`].
    pub fn new(wire_frame: Arc<ObjWireFrame>) -> Self {
        Self::with_settings(wire_frame, ViewSettings::default())
    }

    /// # Panics
    ///
    /// Drawing panics unless `wire_frame` passes [`ObjWireFrame::validate`];
    /// debug builds check this here.
    pub fn with_settings(wire_frame: Arc<ObjWireFrame>, settings: ViewSettings) -> Self {
        debug_assert!(wire_frame.is_valid(), "wire-frame must be validated");
        let mut view = Self {
            wire_frame,
            rotation: settings.default_rotation(),
            line_color: settings.line_color,
            settings,
            rot_matrix: Matrix3D::identity(),
            transformed_vertices: Vec::new(),
            transformed_normals: Vec::new(),
            projected: Vec::new(),
            draw_order: Vec::new(),
            state: RenderState::Dirty,
            rotated: false,
        };
        view.reconstruct_buffers();
        view
    }

    pub fn wire_frame(&self) -> &Arc<ObjWireFrame> {
        &self.wire_frame
    }

    /// Swaps the mesh, keeping the current rotation.
    ///
    /// # Panics
    ///
    /// As for [`Self::with_settings`], the mesh must be valid.
    pub fn set_wire_frame(&mut self, wire_frame: Arc<ObjWireFrame>) {
        debug_assert!(wire_frame.is_valid(), "wire-frame must be validated");
        self.wire_frame = wire_frame;
        self.reconstruct_buffers();
        self.rotated = true;
        self.invalidate();
    }

    /// Back to the default rotation; clears [`Self::has_been_rotated`].
    pub fn reset(&mut self) {
        self.rotation = self.settings.default_rotation();
        self.invalidate();
        self.rotated = false;
    }

    /// Whether the rotation or mesh changed since construction or the last
    /// reset.
    pub fn has_been_rotated(&self) -> bool {
        self.rotated
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn line_color(&self) -> Color {
        self.line_color
    }

    pub fn set_line_color(&mut self, color: Color) {
        self.line_color = color;
        self.invalidate();
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn rotation_x(&self) -> f64 {
        self.rotation.x()
    }

    pub fn rotation_y(&self) -> f64 {
        self.rotation.y()
    }

    pub fn rotation_z(&self) -> f64 {
        self.rotation.z()
    }

    pub fn rotate_x(&mut self, dx: f64) {
        self.rotation.rotate_x(dx);
        self.rotation_changed();
    }

    pub fn rotate_y(&mut self, dy: f64) {
        self.rotation.rotate_y(dy);
        self.rotation_changed();
    }

    pub fn rotate_z(&mut self, dz: f64) {
        self.rotation.rotate_z(dz);
        self.rotation_changed();
    }

    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.rotate_x(dx);
        self.rotate_y(dy);
    }

    pub fn rotate_xyz(&mut self, dx: f64, dy: f64, dz: f64) {
        self.rotate(dx, dy);
        self.rotate_z(dz);
    }

    pub fn set_rotation_x(&mut self, x: f64) {
        self.rotation = RotationState::new(x, self.rotation.y(), self.rotation.z());
        self.rotation_changed();
    }

    pub fn set_rotation_y(&mut self, y: f64) {
        self.rotation = RotationState::new(self.rotation.x(), y, self.rotation.z());
        self.rotation_changed();
    }

    pub fn set_rotation_z(&mut self, z: f64) {
        self.rotation = RotationState::new(self.rotation.x(), self.rotation.y(), z);
        self.rotation_changed();
    }

    pub fn set_rotation(&mut self, x: f64, y: f64) {
        self.set_rotation_x(x);
        self.set_rotation_y(y);
    }

    pub fn set_rotation_xyz(&mut self, x: f64, y: f64, z: f64) {
        self.set_rotation(x, y);
        self.set_rotation_z(z);
    }

    fn rotation_changed(&mut self) {
        self.invalidate();
        self.rotated = true;
    }

    /// Forces the next [`Self::draw`] to recompute and redraw.
    pub fn invalidate(&mut self) {
        self.state = RenderState::Dirty;
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == RenderState::Dirty
    }

    /// Draws onto `surface` if dirty. Returns whether anything was drawn.
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if self.state == RenderState::Clean {
            return false;
        }

        surface.clear();
        self.refresh_buffers();
        self.draw_buffers(surface);
        self.state = RenderState::Clean;

        true
    }

    pub fn redraw<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.invalidate();
        self.draw(surface);
    }

    /// Rotates, projects and orders the faces without drawing them.
    ///
    /// Leaves the render state alone: only [`Self::draw`] marks the view
    /// clean, after the faces reach a surface.
    pub fn refresh_buffers(&mut self) {
        self.rot_matrix = self.rotation.matrix();

        for (i, vertex) in self.wire_frame.vertices.iter().enumerate() {
            let rotated = vertex.multiply(&self.rot_matrix);
            self.transformed_vertices[i] = rotated;
            self.projected[i] = project(&rotated);
        }

        for (i, normal) in self.wire_frame.normals.iter().enumerate() {
            self.transformed_normals[i] = normal.multiply(&self.rot_matrix);
        }

        self.draw_order = render::depth_sorted_visible_faces(
            &self.wire_frame.faces,
            &self.transformed_vertices,
            &self.transformed_normals,
        );

        debug!(
            rot_x = self.rotation.x(),
            rot_y = self.rotation.y(),
            rot_z = self.rotation.z(),
            visible = self.draw_order.len(),
            "recomputed wire-frame buffers"
        );
    }

    fn draw_buffers<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_stroke_color(self.line_color);
        surface.set_fill_color(Color::TRANSPARENT);

        for &face in &self.draw_order {
            let path = render::face_path(&self.wire_frame.faces[face], &self.projected);
            render::emit_face(surface, &path);
        }
    }

    /// Resizes the scratch buffers to the current mesh.
    fn reconstruct_buffers(&mut self) {
        let vertex_count = self.wire_frame.vertices.len();
        let normal_count = self.wire_frame.normals.len();

        self.transformed_vertices = vec![Point3D::origin(); vertex_count];
        self.projected = vec![Point2::origin(); vertex_count];
        self.transformed_normals = vec![Point3D::origin(); normal_count];
        self.draw_order = Vec::with_capacity(self.wire_frame.faces.len());
    }

    pub fn rotation_matrix(&self) -> &Matrix3D {
        &self.rot_matrix
    }

    pub fn transformed_vertices(&self) -> &[Point3D] {
        &self.transformed_vertices
    }

    pub fn transformed_normals(&self) -> &[Point3D] {
        &self.transformed_normals
    }

    pub fn projected_points(&self) -> &[Point2<f64>] {
        &self.projected
    }

    /// Visible faces from the last buffer refresh, farthest first.
    pub fn draw_order(&self) -> &[usize] {
        &self.draw_order
    }

    /// Closed outlines of the visible faces in draw order.
    pub fn face_paths(&self) -> Vec<Vec<Point2<f64>>> {
        self.draw_order
            .iter()
            .map(|&face| render::face_path(&self.wire_frame.faces[face], &self.projected))
            .collect()
    }

    /// Largest transformed z of `face` as of the last buffer refresh.
    pub fn find_max_z(&self, face: &Face) -> f64 {
        render::max_z(face, &self.transformed_vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, PathRecorder};
    use std::f64::consts::FRAC_PI_2;

    fn cube_view() -> WireFrameView {
        WireFrameView::new(Arc::new(ObjWireFrame::cube(1.0)))
    }

    #[test]
    fn test_new_view_is_dirty_and_unrotated() {
        let view = cube_view();
        assert!(view.is_dirty());
        assert!(!view.has_been_rotated());
    }

    #[test]
    fn test_draw_only_when_dirty() {
        let mut view = cube_view();
        let mut surface = PathRecorder::new();

        assert!(view.draw(&mut surface));
        assert_eq!(view.state(), RenderState::Clean);
        let first = surface.commands.len();
        assert_eq!(surface.commands[0], DrawCommand::Clear);

        assert!(!view.draw(&mut surface));
        assert_eq!(surface.commands.len(), first);

        view.rotate_z(0.1);
        assert!(view.is_dirty());
        assert!(view.draw(&mut surface));
        assert!(surface.commands.len() > first);
    }

    #[test]
    fn test_redraw_forces_a_draw() {
        let mut view = cube_view();
        let mut surface = PathRecorder::new();
        view.draw(&mut surface);

        surface.commands.clear();
        view.redraw(&mut surface);
        assert_eq!(surface.commands[0], DrawCommand::Clear);
    }

    #[test]
    fn test_rotation_marks_rotated_and_reset_clears_it() {
        let mut view = cube_view();
        view.rotate(0.2, -0.3);
        assert!(view.has_been_rotated());

        view.reset();
        assert!(!view.has_been_rotated());
        assert!(view.is_dirty());
        assert_eq!(view.rotation(), RotationState::default());
    }

    #[test]
    fn test_set_rotation_wraps() {
        let mut view = cube_view();
        view.set_rotation_xyz(-FRAC_PI_2, 5.0 * FRAC_PI_2, 0.0);
        assert!((view.rotation_x() - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((view.rotation_y() - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(view.rotation_z(), 0.0);
    }

    #[test]
    fn test_refreshed_buffers_still_draw() {
        let mut view = cube_view();
        let mut surface = PathRecorder::new();
        view.draw(&mut surface);

        surface.commands.clear();
        view.rotate_x(1.0);
        view.refresh_buffers();
        assert!(view.is_dirty());

        assert!(view.draw(&mut surface));
        assert_eq!(surface.commands[0], DrawCommand::Clear);
        assert!(surface.commands.contains(&DrawCommand::Stroke));
        assert!(!view.is_dirty());
    }

    #[test]
    fn test_projection_flips_y() {
        let mut view = cube_view();
        view.set_rotation_xyz(0.0, 0.0, 0.0);
        view.refresh_buffers();

        // vertex 6 is (0.5, 0.5, 0.5)
        assert_eq!(view.projected_points()[6], Point2::new(0.5, -0.5));
    }

    #[test]
    fn test_swapping_mesh_resizes_buffers() {
        let mut view = cube_view();
        view.refresh_buffers();
        assert_eq!(view.transformed_vertices().len(), 8);

        let triangle = ObjWireFrame::new(
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(1.0, 0.0, 0.0),
                Point3D::new(0.0, 1.0, 0.0),
            ],
            Vec::new(),
            vec![Face::new(vec![0, 1, 2], None)],
        );
        view.set_wire_frame(Arc::new(triangle));

        assert!(view.is_dirty());
        assert_eq!(view.transformed_vertices().len(), 3);
        assert_eq!(view.projected_points().len(), 3);
        assert!(view.transformed_normals().is_empty());

        view.refresh_buffers();
        assert_eq!(view.draw_order(), &[0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "wire-frame must be validated")]
    fn test_unvalidated_mesh_is_rejected() {
        let dangling = ObjWireFrame::new(
            vec![Point3D::new(0.0, 0.0, 0.0)],
            Vec::new(),
            vec![Face::new(vec![0, 5, 9], None)],
        );
        WireFrameView::new(Arc::new(dangling));
    }

    #[test]
    fn test_line_color_is_stroked() {
        let mut view = cube_view();
        view.set_line_color(Color::rgb(10, 20, 30));

        let mut surface = PathRecorder::new();
        view.draw(&mut surface);

        assert!(surface
            .commands
            .contains(&DrawCommand::StrokeColor(Color::rgb(10, 20, 30))));
        assert!(surface
            .commands
            .contains(&DrawCommand::FillColor(Color::TRANSPARENT)));
    }
}
