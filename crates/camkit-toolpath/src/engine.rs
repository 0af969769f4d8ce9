//! The seam between job running and path generation backends.
//!
//! A backend builds cutters, optionally builds collision models, and
//! sweeps a bounded volume into path segments. The job runner owns
//! everything else: record lookup, boundary adjustment, step sizing,
//! progress and cancellation, and result bookkeeping.

use crate::cutter::{Cutter, CutterSpec};
use camkit_core::{
    Axis, Bounds3, EngineError, GeneratorFamily, JobError, PathDirection, PathSegment,
    Postprocessor, ProgressMonitor, StepDepth,
};
use std::fmt;

/// What kind of generation a run performs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationKind {
    /// Vertical probing over a horizontal grid
    Drop {
        /// Join probe rows into a serpentine path
        zigzag: bool,
        /// Retract height between probe rows
        safety_height: f64,
    },
    /// Layered horizontal sweeps
    Push {
        /// Segment ordering strategy
        postprocessor: Postprocessor,
    },
}

/// Step placement for a sweep
///
/// The placement encodes the machining direction: swapping two steps
/// silently transposes it, so construction goes through
/// [`SweepArgs::for_direction`] instead of struct literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepArgs {
    /// Drop-family grid steps
    Drop {
        /// Step along the row axis
        step_major: f64,
        /// Step between rows
        step_minor: f64,
        /// The axis rows run along
        axis: Axis,
    },
    /// Push-family layer steps
    Push {
        /// Step along X between sweep lines; zero means X-parallel lines
        dx: f64,
        /// Step along Y between sweep lines; zero means Y-parallel lines
        dy: f64,
        /// Vertical step between layers
        dz: StepDepth,
    },
}

impl SweepArgs {
    /// Places the step sizes for a generator family and direction.
    ///
    /// `dx` and `dy` are the horizontal steps, `dz` the vertical one.
    /// The drop family probes from above and never runs crossed rows.
    pub fn for_direction(
        family: GeneratorFamily,
        direction: PathDirection,
        dx: f64,
        dy: f64,
        dz: StepDepth,
    ) -> Result<Self, JobError> {
        match (family, direction) {
            (GeneratorFamily::Drop, PathDirection::X) => Ok(Self::Drop {
                step_major: dx,
                step_minor: dy,
                axis: Axis::X,
            }),
            (GeneratorFamily::Drop, PathDirection::Y) => Ok(Self::Drop {
                step_major: dy,
                step_minor: dx,
                axis: Axis::Y,
            }),
            (GeneratorFamily::Drop, PathDirection::Xy) => Err(JobError::UnsupportedDirection {
                family: family.token().to_string(),
                direction: direction.token().to_string(),
            }),
            (GeneratorFamily::Push, PathDirection::X) => Ok(Self::Push { dx: 0.0, dy, dz }),
            (GeneratorFamily::Push, PathDirection::Y) => Ok(Self::Push { dx: dy, dy: 0.0, dz }),
            (GeneratorFamily::Push, PathDirection::Xy) => Ok(Self::Push { dx: dy, dy, dz }),
        }
    }
}

/// Opaque collision geometry built by an engine
///
/// Handles are owned by the job runner and passed back to the engine on
/// rebuilds so internal state can be reused.
pub trait CollisionModel: fmt::Debug {}

/// A path generation backend
pub trait ToolpathEngine {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Builds a cutter from its geometry.
    fn make_cutter(&self, spec: &CutterSpec) -> Result<Box<dyn Cutter>, EngineError>;

    /// Builds (or refreshes) collision geometry for a cutter.
    ///
    /// The previous handle, when given, may be consumed for reuse.
    fn collision_model(
        &self,
        cutter: &dyn Cutter,
        previous: Option<Box<dyn CollisionModel>>,
    ) -> Result<Box<dyn CollisionModel>, EngineError>;

    /// Sweeps the bounded volume into path segments.
    ///
    /// The monitor must be fed at the engine's own cadence; a `Stop`
    /// signal means the run was cancelled and the engine returns promptly
    /// with whatever it has (the job runner discards it).
    fn generate(
        &self,
        cutter: &dyn Cutter,
        kind: &GenerationKind,
        bounds: &Bounds3,
        args: &SweepArgs,
        physics: Option<&dyn CollisionModel>,
        monitor: &mut ProgressMonitor<'_>,
    ) -> Result<Vec<PathSegment>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_placement_swaps_steps() {
        let args =
            SweepArgs::for_direction(GeneratorFamily::Drop, PathDirection::X, 1.5, 2.5, StepDepth::Unbounded)
                .unwrap();
        assert_eq!(
            args,
            SweepArgs::Drop {
                step_major: 1.5,
                step_minor: 2.5,
                axis: Axis::X,
            }
        );

        let swapped =
            SweepArgs::for_direction(GeneratorFamily::Drop, PathDirection::Y, 1.5, 2.5, StepDepth::Unbounded)
                .unwrap();
        assert_eq!(
            swapped,
            SweepArgs::Drop {
                step_major: 2.5,
                step_minor: 1.5,
                axis: Axis::Y,
            }
        );
    }

    #[test]
    fn test_drop_rejects_crossed_rows() {
        let err =
            SweepArgs::for_direction(GeneratorFamily::Drop, PathDirection::Xy, 1.0, 1.0, StepDepth::Unbounded)
                .unwrap_err();
        assert!(matches!(
            err,
            JobError::UnsupportedDirection { ref family, ref direction }
                if family == "DropCutter" && direction == "xy"
        ));
    }

    #[test]
    fn test_push_placement() {
        let dz = StepDepth::Step(0.8);
        let x = SweepArgs::for_direction(GeneratorFamily::Push, PathDirection::X, 9.0, 2.0, dz).unwrap();
        assert_eq!(x, SweepArgs::Push { dx: 0.0, dy: 2.0, dz });

        let y = SweepArgs::for_direction(GeneratorFamily::Push, PathDirection::Y, 9.0, 2.0, dz).unwrap();
        assert_eq!(y, SweepArgs::Push { dx: 2.0, dy: 0.0, dz });

        // The crossed direction reuses the Y step on both axes.
        let xy = SweepArgs::for_direction(GeneratorFamily::Push, PathDirection::Xy, 9.0, 2.0, dz).unwrap();
        assert_eq!(xy, SweepArgs::Push { dx: 2.0, dy: 2.0, dz });
    }
}
