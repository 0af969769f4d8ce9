//! # CamKit Core
//!
//! Core types and utilities for the CamKit toolpath engine.
//! Provides the fundamental abstractions for machining geometry, units,
//! progress/cancellation, and the toolpath data model.

pub mod error;
pub mod geom;
pub mod machining;
pub mod progress;
pub mod toolpath;
pub mod types;
pub mod units;

pub use error::{DocumentError, EngineError, Error, JobError, Result};

pub use geom::{Bounds3, Point3};

pub use machining::{
    Axis, BoundaryMode, CutterShape, GeneratorFamily, PathDirection, Postprocessor, StepDepth,
};

pub use progress::{
    CancelToken, NullProgress, ProgressMonitor, ProgressSignal, ProgressSink, DEFAULT_REFRESH_HZ,
};

pub use toolpath::{PathSegment, ToolpathCollection, ToolpathResult};

// Re-export type aliases for convenience
pub use types::{shared, shared_none, shared_some, Shared, SharedOption, SharedVec};

pub use units::{format_length, Units, MM_PER_INCH};
