use thiserror::Error;

use super::Precision;

/// Raised while turning a formula and a [`KernelConfig`](super::KernelConfig) into a
/// compiled kernel. These are deterministic programmer errors and are never retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported floating precision `{0}`")]
    UnsupportedPrecision(String),
    #[error("unsupported grid dimensionality {0}, expected 2 or 3")]
    UnsupportedDimension(usize),
    #[error("configuration requests {expected:?} precision, but kernel was instantiated with {found:?}")]
    PrecisionMismatch {
        expected: Precision,
        found: Precision,
    },
    #[error("kernel `{kernel}` operates on {expected}D grids, configuration is {found}D")]
    DimensionMismatch {
        kernel: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("fixed extents {extents:?} do not describe a {dimension}D grid")]
    MalformedExtents {
        extents: Vec<usize>,
        dimension: usize,
    },
    #[error("fixed extent {extent} along axis {axis} leaves no interior for ghost width {ghost}")]
    ExtentTooSmall {
        axis: usize,
        extent: usize,
        ghost: usize,
    },
    #[error("thread count must be positive")]
    InvalidThreadCount,
    #[error("blend width must be finite and positive, got {0}")]
    InvalidBlendWidth(String),
    #[error("failed to build sweep thread pool: {0}")]
    ThreadPool(String),
}

/// Raised when a compiled kernel is invoked with bindings inconsistent with its
/// formula or configuration. Arrays are left untouched when this is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("field `{role}` has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        role: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("storage of length {len} cannot hold a field of shape {shape:?}")]
    StorageMismatch { len: usize, shape: Vec<usize> },
    #[error("shape {shape:?} has no interior cells for ghost width {ghost}")]
    EmptyInterior { shape: Vec<usize>, ghost: usize },
    #[error("kernel `{kernel}` has no role or parameter named `{name}`")]
    UnknownRole { kernel: &'static str, name: String },
    #[error("kernel `{kernel}` requires `{name}` to be bound")]
    UnboundRole {
        kernel: &'static str,
        name: &'static str,
    },
    #[error("`{name}` is bound more than once")]
    DuplicateRole { name: String },
    #[error("kernel `{kernel}` takes {expected} {kind}, got {found}")]
    ArityMismatch {
        kernel: &'static str,
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}
