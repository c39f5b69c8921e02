/// Pointer-drag rotation of a [`WireFrameView`]
use crate::config::DEFAULT_DRAG_SPEED;
use crate::view::WireFrameView;

/// Turns pointer drags into rotations.
///
/// Dragging vertically rotates around the x-axis and dragging horizontally
/// rotates around the y-axis, `speed` radians per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DragRotator {
    speed: f64,
    last: Option<(f64, f64)>,
}

impl DragRotator {
    pub fn new(speed: f64) -> Self {
        Self { speed, last: None }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.last = Some((x, y));
    }

    pub fn release(&mut self) {
        self.last = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }

    /// Rotates `view` by the motion since the last position. Returns whether
    /// a drag was in progress.
    pub fn drag_to(&mut self, x: f64, y: f64, view: &mut WireFrameView) -> bool {
        let Some((old_x, old_y)) = self.last else {
            return false;
        };

        view.rotate((y - old_y) * self.speed, (x - old_x) * self.speed);
        self.last = Some((x, y));
        true
    }
}

impl Default for DragRotator {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_SPEED)
    }
}
