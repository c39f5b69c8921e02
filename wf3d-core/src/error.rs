/// Error types for the wire-frame core
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed `.obj` text. No partial mesh is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number in the source text
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A mesh whose faces or normals break the model invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshValidationError {
    #[error("normal {index} has magnitude {magnitude}, expected 1")]
    NonUnitNormal { index: usize, magnitude: f64 },

    #[error("face {face} references normal {normal}, not in [0, {count})")]
    NormalIndexOutOfRange {
        face: usize,
        normal: usize,
        count: usize,
    },

    #[error("face {face} references vertex {vertex}, not in [0, {count})")]
    VertexIndexOutOfRange {
        face: usize,
        vertex: usize,
        count: usize,
    },
}

/// Raised when inverting a matrix whose determinant is exactly zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("matrix is not invertible: determinant is zero")]
pub struct NotInvertibleError;

/// Main error type for wf3d operations
#[derive(Debug, Error)]
pub enum WireFrameError {
    /// IO error occurred while reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshValidationError),

    #[error(transparent)]
    NotInvertible(#[from] NotInvertibleError),

    /// Configuration file could not be deserialized
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A catalog model failed to load
    #[error("wire-frame {path:?}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: Box<WireFrameError>,
    },

    #[error("no wire-frame named {0:?}")]
    UnknownName(String),

    #[error("no wire-frame with id {0}")]
    UnknownId(u32),
}

/// Result type alias for wf3d operations
pub type Result<T> = std::result::Result<T, WireFrameError>;
