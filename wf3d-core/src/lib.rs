/// WF3D Core Library - Shared wire-frame geometry and rendering logic
///
/// This library provides the surface-independent core of the wire-frame
/// viewer: `.obj` parsing, rotation matrices, orthogonal projection, and
/// back-face culling with painter's-algorithm depth ordering.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod mesh;
pub mod obj;
pub mod projection;
pub mod render;
pub mod transform;
pub mod view;

// Re-export commonly used types
pub use catalog::WireFrameCatalog;
pub use config::{ViewSettings, WireFrameConfig};
pub use error::{MeshValidationError, NotInvertibleError, ParseError, Result, WireFrameError};
pub use geometry::{Matrix3D, Point3D};
pub use input::DragRotator;
pub use mesh::{Face, ObjWireFrame};
pub use projection::{project, Viewport};
pub use render::{Color, DrawCommand, PathRecorder, Surface};
pub use transform::RotationState;
pub use view::{RenderState, WireFrameView};

pub use nalgebra::Point2;
