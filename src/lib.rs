//! # CamKit
//!
//! A toolpath generation core for CNC machining: layered machining
//! configuration, tool/process/task resolution, and cancellable toolpath
//! jobs behind a pluggable engine seam.
//!
//! ## Architecture
//!
//! CamKit is organized as a workspace with multiple crates:
//!
//! 1. **camkit-core** - Geometry, units, machining enums, progress and
//!    cancellation, the toolpath data model, error types
//! 2. **camkit-settings** - Settings documents, category resolution with
//!    default inheritance, the typed settings bridge, preferences
//! 3. **camkit-toolpath** - The engine seam, job orchestration, the
//!    project session, and the flat sweep reference backend
//! 4. **camkit** - Headless batch binary that integrates all crates
//!
//! ## Features
//!
//! - **Layered configuration**: indexed Tool/Process/Task sections with
//!   per-field fallback to their Default sections
//! - **Handle-based task references**: tasks alias tool and process
//!   records; stale references are pruned, never dereferenced
//! - **Cancellable jobs**: cooperative cancellation with rate-limited
//!   progress reporting; a cancelled run stores nothing
//! - **Engine seam**: cutter construction, collision geometry reuse, and
//!   sweep generation behind one object-safe trait

// Re-export the layers for main.rs and embedders.
pub use camkit_core::{
    Bounds3, BoundaryMode, CancelToken, CutterShape, DocumentError, EngineError, Error,
    GeneratorFamily, JobError, NullProgress, PathDirection, PathSegment, Point3, Postprocessor,
    ProgressMonitor, ProgressSignal, ProgressSink, Result, Shared, StepDepth, ToolpathCollection,
    ToolpathResult, Units,
};

pub use camkit_settings::{
    document_from_records, Category, CategoryResolver, FlagKey, Preferences, ProcessRecord,
    ScalarKey, SettingsBridge, SettingsDocument, SettingsError, TaskRecord, ToolRecord,
};

pub use camkit_toolpath::{
    BasicCutter, CollisionModel, Cutter, CutterSpec, FlatSweepEngine, GenerationKind, JobRunner,
    Project, RunOutcome, SweepArgs, ToolpathEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
