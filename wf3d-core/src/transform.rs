/// Rotation state around the three axes and its rotation matrix
use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, TAU};

use crate::geometry::Matrix3D;

/// Default x-axis rotation of a new or reset view
pub const DEFAULT_X_ROTATION: f64 = FRAC_PI_8;

/// Default y-axis rotation of a new or reset view
pub const DEFAULT_Y_ROTATION: f64 = FRAC_PI_4;

/// Default z-axis rotation of a new or reset view
pub const DEFAULT_Z_ROTATION: f64 = 0.0;

/// Past this many turns the add/subtract loop gives way to a remainder.
const MAX_WRAP_STEPS: f64 = 64.0;

/// Rotation around three axes (in radians), each kept in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    x: f64,
    y: f64,
    z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: wrap_angle(x),
            y: wrap_angle(y),
            z: wrap_angle(z),
        }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// Positive values turn the y-axis towards the z-axis.
    pub fn rotate_x(&mut self, dx: f64) {
        self.x = wrap_angle(self.x + dx);
    }

    /// Positive values turn the z-axis towards the x-axis.
    pub fn rotate_y(&mut self, dy: f64) {
        self.y = wrap_angle(self.y + dy);
    }

    /// Positive values turn the x-axis towards the y-axis.
    pub fn rotate_z(&mut self, dz: f64) {
        self.z = wrap_angle(self.z + dz);
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.rotate_x(dx);
        self.rotate_y(dy);
        self.rotate_z(dz);
    }

    pub fn matrix(&self) -> Matrix3D {
        Matrix3D::rotation(self.x, self.y, self.z)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(DEFAULT_X_ROTATION, DEFAULT_Y_ROTATION, DEFAULT_Z_ROTATION)
    }
}

/// Wraps an angle into `[0, 2π)` by adding or subtracting whole turns.
///
/// Angles within a few turns of the range are stepped one turn at a time;
/// anything further out is reduced with a Euclidean remainder so the loop
/// always terminates. Non-finite input comes back as NaN.
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return f64::NAN;
    }

    let mut angle = if angle.abs() > MAX_WRAP_STEPS * TAU {
        angle.rem_euclid(TAU)
    } else {
        angle
    };

    while angle < 0.0 {
        angle += TAU;
    }
    while angle >= TAU {
        angle -= TAU;
    }

    angle
}
