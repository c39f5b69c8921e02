/// WF3D Web - wire-frame view drawn onto an HTML canvas
///
/// The canvas is put into `copy` compositing with a base transform that maps
/// view coordinates onto it, so each face's transparent fill erases the
/// faces drawn behind it.
use std::fmt::Display;
use std::sync::Arc;

use nalgebra::Point2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wf3d_core::obj::parse_obj;
use wf3d_core::{Color, DragRotator, ObjWireFrame, Surface, Viewport, WireFrameView};

fn to_js(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Canvas transform `[a, b, c, d, e, f]` taking view coordinates to pixels.
pub fn base_transform(viewport: &Viewport) -> [f64; 6] {
    let scale = viewport.scale();
    [
        scale,
        0.0,
        0.0,
        scale,
        viewport.width as f64 / 2.0,
        viewport.height as f64 / 2.0,
    ]
}

/// A [`Surface`] backed by a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn from_canvas_id(canvas_id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {canvas_id:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("{canvas_id:?} is not a canvas")))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mut surface = Self {
            viewport: Viewport::new(canvas.width(), canvas.height()),
            canvas,
            context,
        };
        surface.configure()?;
        Ok(surface)
    }

    /// Re-reads the canvas size and reapplies compositing, transform and
    /// line width.
    pub fn configure(&mut self) -> Result<(), JsValue> {
        self.viewport = Viewport::new(self.canvas.width(), self.canvas.height());

        let [a, b, c, d, e, f] = base_transform(&self.viewport);
        self.context.set_transform(a, b, c, d, e, f)?;
        self.context.set_global_composite_operation("copy")?;
        self.context.set_line_width(self.viewport.line_width());
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        let (width, height) = (self.viewport.width as f64, self.viewport.height as f64);

        if !clear_pixels(&self.context, width, height) {
            web_sys::console::warn_1(&JsValue::from_str(
                "canvas clear skipped: set_transform failed",
            ));
        }
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.context.set_stroke_style(&JsValue::from_str(&color.to_css()));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.context.set_fill_style(&JsValue::from_str(&color.to_css()));
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, point: Point2<f64>) {
        self.context.move_to(point.x, point.y);
    }

    fn line_to(&mut self, point: Point2<f64>) {
        self.context.line_to(point.x, point.y);
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn clip(&mut self) {
        self.context.clip();
    }
}

/// The context calls a clear is made of.
trait ClearTarget {
    fn save(&self);
    fn restore(&self);
    fn reset_transform(&self) -> Result<(), JsValue>;
    fn clear_rect(&self, width: f64, height: f64);
}

impl ClearTarget for CanvasRenderingContext2d {
    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn reset_transform(&self) -> Result<(), JsValue> {
        self.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    fn clear_rect(&self, width: f64, height: f64) {
        CanvasRenderingContext2d::clear_rect(self, 0.0, 0.0, width, height);
    }
}

/// Clears `width` x `height` device pixels. Under the view transform the
/// rectangle would miss the canvas, so nothing is cleared if the transform
/// cannot be reset. Returns whether the clear happened.
fn clear_pixels<T: ClearTarget + ?Sized>(target: &T, width: f64, height: f64) -> bool {
    target.save();
    let cleared = match target.reset_transform() {
        Ok(()) => {
            target.clear_rect(width, height);
            true
        }
        Err(_) => false,
    };
    target.restore();
    cleared
}

/// A rotating wire-frame bound to a canvas element.
#[wasm_bindgen]
pub struct WebWireFrameView {
    view: WireFrameView,
    surface: CanvasSurface,
    drag: DragRotator,
}

#[wasm_bindgen]
impl WebWireFrameView {
    /// Binds to the canvas with id `canvas_id` and shows the `.obj` text.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, obj_text: &str) -> Result<WebWireFrameView, JsValue> {
        let model = parse_valid(obj_text)?;
        Self::with_model(canvas_id, model)
    }

    /// Binds to the canvas and shows the bundled model.
    pub fn fallback(canvas_id: &str) -> Result<WebWireFrameView, JsValue> {
        let model = wf3d_core::catalog::fallback_model().map_err(to_js)?;
        Self::with_model(canvas_id, model)
    }

    /// Replaces the model, keeping the rotation.
    pub fn load(&mut self, obj_text: &str) -> Result<(), JsValue> {
        let model = parse_valid(obj_text)?;
        self.view.set_wire_frame(Arc::new(model));
        Ok(())
    }

    /// Draws if anything changed since the last draw.
    pub fn draw(&mut self) -> bool {
        self.view.draw(&mut self.surface)
    }

    pub fn redraw(&mut self) {
        self.view.redraw(&mut self.surface);
    }

    /// Call after the canvas element changes size.
    pub fn resize(&mut self) -> Result<(), JsValue> {
        self.surface.configure()?;
        self.view.invalidate();
        Ok(())
    }

    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.view.rotate(dx, dy);
    }

    pub fn rotate_z(&mut self, dz: f64) {
        self.view.rotate_z(dz);
    }

    pub fn set_rotation(&mut self, x: f64, y: f64, z: f64) {
        self.view.set_rotation_xyz(x, y, z);
    }

    pub fn rotation_x(&self) -> f64 {
        self.view.rotation_x()
    }

    pub fn rotation_y(&self) -> f64 {
        self.view.rotation_y()
    }

    pub fn rotation_z(&self) -> f64 {
        self.view.rotation_z()
    }

    pub fn reset(&mut self) {
        self.view.reset();
    }

    pub fn has_been_rotated(&self) -> bool {
        self.view.has_been_rotated()
    }

    pub fn set_line_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.view.set_line_color(Color::rgba(r, g, b, a));
    }

    pub fn mouse_down(&mut self, x: f64, y: f64) {
        self.drag.press(x, y);
    }

    /// Returns whether a drag rotated the view.
    pub fn mouse_move(&mut self, x: f64, y: f64) -> bool {
        self.drag.drag_to(x, y, &mut self.view)
    }

    pub fn mouse_up(&mut self) {
        self.drag.release();
    }
}

impl WebWireFrameView {
    fn with_model(canvas_id: &str, model: ObjWireFrame) -> Result<WebWireFrameView, JsValue> {
        let surface = CanvasSurface::from_canvas_id(canvas_id)?;
        let view = WireFrameView::new(Arc::new(model));
        Ok(WebWireFrameView {
            drag: DragRotator::new(view.settings().drag_speed),
            view,
            surface,
        })
    }
}

fn parse_valid(obj_text: &str) -> Result<ObjWireFrame, JsValue> {
    let model = parse_obj(obj_text).map_err(to_js)?;
    model.validate().map_err(to_js)?;
    Ok(model)
}
