/// Geometry primitives: points and 3x3 matrices
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::{Matrix3, Vector3};

use crate::error::NotInvertibleError;

/// A point (or direction) in wire-frame space.
///
/// Arithmetic returns new points; the receiver is never changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    coords: Vector3<f64>,
}

impl Point3D {
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            coords: Vector3::new(x, y, z),
        }
    }

    pub fn x(&self) -> f64 {
        self.coords.x
    }

    pub fn y(&self) -> f64 {
        self.coords.y
    }

    pub fn z(&self) -> f64 {
        self.coords.z
    }

    pub fn coords(&self) -> &Vector3<f64> {
        &self.coords
    }

    pub fn scale(&self, by: f64) -> Self {
        Self {
            coords: self.coords * by,
        }
    }

    pub fn dot(&self, other: &Point3D) -> f64 {
        self.coords.dot(&other.coords)
    }

    pub fn magnitude(&self) -> f64 {
        self.x().hypot(self.y()).hypot(self.z())
    }

    /// Same direction, magnitude 1.
    ///
    /// A zero vector produces non-finite components.
    pub fn normalize(&self) -> Self {
        self.scale(1.0 / self.magnitude())
    }

    /// Row-convention product: `x' = x*m11 + y*m12 + z*m13` and so on.
    pub fn multiply(&self, matrix: &Matrix3D) -> Self {
        Self {
            coords: matrix.inner * self.coords,
        }
    }
}

impl Default for Point3D {
    fn default() -> Self {
        Self::origin()
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(coords: Vector3<f64>) -> Self {
        Self { coords }
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::from(self.coords + rhs.coords)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::from(self.coords - rhs.coords)
    }
}

impl Neg for Point3D {
    type Output = Point3D;

    fn neg(self) -> Point3D {
        Point3D::from(-self.coords)
    }
}

impl Mul<f64> for Point3D {
    type Output = Point3D;

    fn mul(self, rhs: f64) -> Point3D {
        self.scale(rhs)
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}

/// A 3x3 matrix addressed row-major as `m11..m33`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3D {
    inner: Matrix3<f64>,
}

impl Matrix3D {
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub fn new(
        m11: f64, m12: f64, m13: f64,
        m21: f64, m22: f64, m23: f64,
        m31: f64, m32: f64, m33: f64,
    ) -> Self {
        Self {
            inner: Matrix3::new(m11, m12, m13, m21, m22, m23, m31, m32, m33),
        }
    }

    pub fn identity() -> Self {
        Self {
            inner: Matrix3::identity(),
        }
    }

    /// Rotation applying z first, then y, then x (column vectors, so
    /// `M = Rx * Ry * Rz`).
    pub fn rotation(rot_x: f64, rot_y: f64, rot_z: f64) -> Self {
        let (sin_x, cos_x) = rot_x.sin_cos();
        let (sin_y, cos_y) = rot_y.sin_cos();
        let (sin_z, cos_z) = rot_z.sin_cos();

        Self::new(
            cos_y * cos_z,
            -cos_y * sin_z,
            sin_y,
            sin_x * sin_y * cos_z + cos_x * sin_z,
            -sin_x * sin_y * sin_z + cos_x * cos_z,
            -sin_x * cos_y,
            -cos_x * sin_y * cos_z + sin_x * sin_z,
            cos_x * sin_y * sin_z + sin_x * cos_z,
            cos_x * cos_y,
        )
    }

    /// Component at 1-based `(row, col)`, matching the `mRC` naming.
    pub fn m(&self, row: usize, col: usize) -> f64 {
        self.inner[(row - 1, col - 1)]
    }

    pub fn inner(&self) -> &Matrix3<f64> {
        &self.inner
    }

    pub fn scale(&mut self, by: f64) {
        self.inner *= by;
    }

    /// Multiplies this matrix on the left: `self = by * self`.
    pub fn multiply(&mut self, by: &Matrix3D) {
        self.inner = by.inner * self.inner;
    }

    /// `by * what`, leaving both untouched.
    pub fn product(what: &Matrix3D, by: &Matrix3D) -> Matrix3D {
        let mut ret = *what;
        ret.multiply(by);
        ret
    }

    pub fn determinant(&self) -> f64 {
        let m = |r, c| self.m(r, c);

        m(1, 1) * (m(3, 3) * m(2, 2) - m(3, 2) * m(2, 3))
            - m(2, 1) * (m(3, 3) * m(1, 2) - m(3, 2) * m(1, 3))
            + m(3, 1) * (m(2, 3) * m(1, 2) - m(2, 2) * m(1, 3))
    }

    /// Inverts in place via the adjugate.
    ///
    /// Only an exactly zero determinant is rejected; near-singular matrices
    /// invert to whatever the arithmetic produces.
    pub fn invert(&mut self) -> Result<(), NotInvertibleError> {
        let det = self.determinant();
        if det == 0.0 {
            return Err(NotInvertibleError);
        }

        let m = |r, c| self.m(r, c);
        let adjugate = Matrix3D::new(
            m(3, 3) * m(2, 2) - m(3, 2) * m(2, 3),
            m(3, 2) * m(1, 3) - m(3, 3) * m(1, 2),
            m(2, 3) * m(1, 2) - m(2, 2) * m(1, 3),
            m(3, 1) * m(2, 3) - m(3, 3) * m(2, 1),
            m(3, 3) * m(1, 1) - m(3, 1) * m(1, 3),
            m(2, 1) * m(1, 3) - m(2, 3) * m(1, 1),
            m(3, 2) * m(2, 1) - m(3, 1) * m(2, 2),
            m(3, 1) * m(1, 2) - m(3, 2) * m(1, 1),
            m(2, 2) * m(1, 1) - m(2, 1) * m(1, 2),
        );

        *self = adjugate;
        self.scale(1.0 / det);
        Ok(())
    }

    pub fn inverse(&self) -> Result<Matrix3D, NotInvertibleError> {
        let mut ret = *self;
        ret.invert()?;
        Ok(ret)
    }
}

impl Default for Matrix3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix3D {
    type Output = Matrix3D;

    /// Ordinary matrix product `self * rhs`.
    fn mul(self, rhs: Matrix3D) -> Matrix3D {
        Matrix3D {
            inner: self.inner * rhs.inner,
        }
    }
}

impl fmt::Display for Matrix3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = |r, c| self.m(r, c);
        writeln!(f, "[[{}, {}, {}]", m(1, 1), m(1, 2), m(1, 3))?;
        writeln!(f, " [{}, {}, {}]", m(2, 1), m(2, 2), m(2, 3))?;
        write!(f, " [{}, {}, {}]]", m(3, 1), m(3, 2), m(3, 3))
    }
}
