//! # CamKit Toolpath
//!
//! Job orchestration and path generation for CamKit. Resolved tool and
//! process records from the settings layer drive a generation backend
//! behind the [`ToolpathEngine`] seam; a [`Project`] session ties
//! settings, job running, and generated results together.

pub mod cutter;
pub mod engine;
pub mod job;
pub mod project;
pub mod sweep;

pub use cutter::{BasicCutter, Cutter, CutterSpec};

pub use engine::{CollisionModel, GenerationKind, SweepArgs, ToolpathEngine};

pub use job::{JobRunner, RunOutcome};

pub use project::Project;

pub use sweep::FlatSweepEngine;
