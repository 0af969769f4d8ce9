//! Reference generation backend: sweeps over a flat floor.
//!
//! Machines the bottom plane of the bounded volume, treating the stand-off
//! distance as stock left on the floor. There is no model geometry and no
//! collision state, which makes this backend a faithful executable
//! description of the sweep semantics: serpentine drop grids, layered push
//! passes, and the postprocessor variants differ only in how segments are
//! cut up and ordered.

use crate::cutter::{BasicCutter, Cutter, CutterSpec};
use crate::engine::{CollisionModel, GenerationKind, SweepArgs, ToolpathEngine};
use camkit_core::{
    Axis, Bounds3, EngineError, PathSegment, Point3, Postprocessor, ProgressMonitor, StepDepth,
};
use tracing::debug;

/// Collision stand-in for the flat floor: nothing can collide
#[derive(Debug, Clone, Copy)]
struct FlatCollisionModel {
    #[allow(dead_code)]
    cutter_radius: f64,
}

impl CollisionModel for FlatCollisionModel {}

/// Generation backend machining the flat bottom of the bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSweepEngine;

impl FlatSweepEngine {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }

    /// The machined floor height: bounds bottom plus stock to leave.
    fn floor(bounds: &Bounds3, cutter: &dyn Cutter) -> f64 {
        (bounds.minz + cutter.required_distance()).min(bounds.maxz)
    }
}

fn check_step(step: f64, what: &str) -> Result<(), EngineError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(EngineError::GenerationFailed {
            reason: format!("{} must be a positive finite step, got {}", what, step),
        });
    }
    Ok(())
}

/// Positions from `min` to `max` inclusive in increments of `step`.
///
/// The final position is clamped to `max` so the sweep always reaches the
/// boundary edge.
fn stepped(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut positions = vec![min];
    let mut current = min;
    while current < max {
        current += step;
        if current > max {
            current = max;
        }
        positions.push(current);
    }
    positions
}

/// Descending layer heights from just below the top down to `floor`.
fn layers(floor: f64, top: f64, dz: StepDepth) -> Vec<f64> {
    match dz.step() {
        Some(step) => {
            let mut heights = Vec::new();
            let mut z = top - step;
            while z > floor {
                heights.push(z);
                z -= step;
            }
            heights.push(floor);
            heights
        }
        None => vec![floor],
    }
}

impl ToolpathEngine for FlatSweepEngine {
    fn name(&self) -> &str {
        "flat-sweep"
    }

    fn make_cutter(&self, spec: &CutterSpec) -> Result<Box<dyn Cutter>, EngineError> {
        // Every shape touches a flat floor with its lowest point, so no
        // shape-specific geometry is needed here.
        Ok(Box::new(BasicCutter::new(spec.clone())))
    }

    fn collision_model(
        &self,
        cutter: &dyn Cutter,
        _previous: Option<Box<dyn CollisionModel>>,
    ) -> Result<Box<dyn CollisionModel>, EngineError> {
        Ok(Box::new(FlatCollisionModel {
            cutter_radius: cutter.spec().radius,
        }))
    }

    fn generate(
        &self,
        cutter: &dyn Cutter,
        kind: &GenerationKind,
        bounds: &Bounds3,
        args: &SweepArgs,
        _physics: Option<&dyn CollisionModel>,
        monitor: &mut ProgressMonitor<'_>,
    ) -> Result<Vec<PathSegment>, EngineError> {
        let floor = Self::floor(bounds, cutter);
        debug!(engine = self.name(), floor, "starting sweep");
        match (kind, args) {
            (
                GenerationKind::Drop {
                    zigzag,
                    safety_height,
                },
                SweepArgs::Drop {
                    step_major,
                    step_minor,
                    axis,
                },
            ) => drop_sweep(
                bounds,
                floor,
                *zigzag,
                *safety_height,
                *step_major,
                *step_minor,
                *axis,
                monitor,
            ),
            (GenerationKind::Push { postprocessor }, SweepArgs::Push { dx, dy, dz }) => {
                push_sweep(bounds, floor, *postprocessor, *dx, *dy, *dz, monitor)
            }
            _ => Err(EngineError::GenerationFailed {
                reason: "generation kind and sweep arguments disagree".to_string(),
            }),
        }
    }
}

fn drop_sweep(
    bounds: &Bounds3,
    floor: f64,
    zigzag: bool,
    safety_height: f64,
    step_major: f64,
    step_minor: f64,
    axis: Axis,
    monitor: &mut ProgressMonitor<'_>,
) -> Result<Vec<PathSegment>, EngineError> {
    check_step(step_major, "row step")?;
    check_step(step_minor, "cross step")?;

    let (along_min, along_max, cross_min, cross_max) = match axis {
        Axis::X => (bounds.minx, bounds.maxx, bounds.miny, bounds.maxy),
        Axis::Y => (bounds.miny, bounds.maxy, bounds.minx, bounds.maxx),
    };
    let row_positions = stepped(cross_min, cross_max, step_minor);
    let probe_positions = stepped(along_min, along_max, step_major);
    let total = row_positions.len();

    let point = |along: f64, cross: f64, z: f64| match axis {
        Axis::X => Point3::new(along, cross, z),
        Axis::Y => Point3::new(cross, along, z),
    };

    let mut segments = Vec::new();
    let mut serpentine: Vec<Point3> = Vec::new();
    for (row, &cross) in row_positions.iter().enumerate() {
        let signal = monitor.update(
            Some(&format!("Probing row {}/{}", row + 1, total)),
            Some(row as f64 / total as f64),
        );
        if signal.is_stop() {
            if !serpentine.is_empty() {
                segments.push(PathSegment::new(serpentine));
            }
            return Ok(segments);
        }

        let reversed = zigzag && row % 2 == 1;
        let probes: Vec<Point3> = if reversed {
            probe_positions
                .iter()
                .rev()
                .map(|&along| point(along, cross, floor))
                .collect()
        } else {
            probe_positions
                .iter()
                .map(|&along| point(along, cross, floor))
                .collect()
        };

        if zigzag {
            serpentine.extend(probes);
        } else {
            // Plain accumulation: one row per segment, bracketed by
            // retract positions at the safety height.
            let mut points = Vec::with_capacity(probes.len() + 2);
            let first = probes[0];
            let last = probes[probes.len() - 1];
            points.push(Point3::new(first.x, first.y, safety_height));
            points.extend(probes);
            points.push(Point3::new(last.x, last.y, safety_height));
            segments.push(PathSegment::new(points));
        }
    }
    if !serpentine.is_empty() {
        segments.push(PathSegment::new(serpentine));
    }
    Ok(segments)
}

fn push_sweep(
    bounds: &Bounds3,
    floor: f64,
    postprocessor: Postprocessor,
    dx: f64,
    dy: f64,
    dz: StepDepth,
    monitor: &mut ProgressMonitor<'_>,
) -> Result<Vec<PathSegment>, EngineError> {
    let heights = layers(floor, bounds.maxz, dz);
    let total = heights.len();

    let mut segments = Vec::new();
    for (layer, &z) in heights.iter().enumerate() {
        let signal = monitor.update(
            Some(&format!("Cutting layer {}/{}", layer + 1, total)),
            Some(layer as f64 / total as f64),
        );
        if signal.is_stop() {
            return Ok(segments);
        }

        match postprocessor {
            Postprocessor::PolygonCutter | Postprocessor::ContourCutter => {
                // On a flat rectangular floor the remaining material
                // outline is the boundary itself: one closed ring per
                // layer.
                segments.push(PathSegment::new(vec![
                    Point3::new(bounds.minx, bounds.miny, z),
                    Point3::new(bounds.maxx, bounds.miny, z),
                    Point3::new(bounds.maxx, bounds.maxy, z),
                    Point3::new(bounds.minx, bounds.maxy, z),
                    Point3::new(bounds.minx, bounds.miny, z),
                ]));
            }
            _ => {
                if dx > 0.0 || dy == 0.0 {
                    check_step(dx, "x step")?;
                    let line_positions = stepped(bounds.minx, bounds.maxx, dx);
                    sweep_lines(
                        &mut segments,
                        &line_positions,
                        postprocessor,
                        |x, zig| line_y(bounds, x, z, zig),
                    );
                }
                if dy > 0.0 || dx == 0.0 {
                    check_step(dy, "y step")?;
                    let line_positions = stepped(bounds.miny, bounds.maxy, dy);
                    sweep_lines(
                        &mut segments,
                        &line_positions,
                        postprocessor,
                        |y, zig| line_x(bounds, y, z, zig),
                    );
                }
            }
        }
    }
    Ok(segments)
}

fn line_x(bounds: &Bounds3, y: f64, z: f64, reversed: bool) -> [Point3; 2] {
    if reversed {
        [
            Point3::new(bounds.maxx, y, z),
            Point3::new(bounds.minx, y, z),
        ]
    } else {
        [
            Point3::new(bounds.minx, y, z),
            Point3::new(bounds.maxx, y, z),
        ]
    }
}

fn line_y(bounds: &Bounds3, x: f64, z: f64, reversed: bool) -> [Point3; 2] {
    if reversed {
        [
            Point3::new(x, bounds.maxy, z),
            Point3::new(x, bounds.miny, z),
        ]
    } else {
        [
            Point3::new(x, bounds.miny, z),
            Point3::new(x, bounds.maxy, z),
        ]
    }
}

/// Emit one pass of parallel sweep lines in the postprocessor's shape.
fn sweep_lines(
    segments: &mut Vec<PathSegment>,
    positions: &[f64],
    postprocessor: Postprocessor,
    line: impl Fn(f64, bool) -> [Point3; 2],
) {
    match postprocessor {
        Postprocessor::ZigZagCutter => {
            // One serpentine segment per pass.
            let mut points = Vec::with_capacity(positions.len() * 2);
            for (i, &position) in positions.iter().enumerate() {
                points.extend(line(position, i % 2 == 1));
            }
            segments.push(PathSegment::new(points));
        }
        Postprocessor::SimpleCutter => {
            // Independent cuts, direction alternating.
            for (i, &position) in positions.iter().enumerate() {
                segments.push(PathSegment::new(line(position, i % 2 == 1).to_vec()));
            }
        }
        _ => {
            // Plain accumulation: every line in the same direction.
            for &position in positions {
                segments.push(PathSegment::new(line(position, false).to_vec()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camkit_core::{CancelToken, CutterShape, NullProgress};

    fn cutter(radius: f64) -> Box<dyn Cutter> {
        FlatSweepEngine::new()
            .make_cutter(&CutterSpec {
                shape: CutterShape::Cylindrical,
                radius,
                torus_radius: None,
                height: 40.0,
            })
            .unwrap()
    }

    fn run(
        kind: GenerationKind,
        bounds: Bounds3,
        args: SweepArgs,
    ) -> Result<Vec<PathSegment>, EngineError> {
        let engine = FlatSweepEngine::new();
        let cutter = cutter(2.0);
        let cancel = CancelToken::new();
        let mut sink = NullProgress;
        let mut monitor = ProgressMonitor::without_refresh(&mut sink, &cancel);
        engine.generate(cutter.as_ref(), &kind, &bounds, &args, None, &mut monitor)
    }

    #[test]
    fn test_drop_zigzag_is_one_serpentine() {
        let bounds = Bounds3::new(0.0, 10.0, 0.0, 4.0, -1.0, 3.0);
        let segments = run(
            GenerationKind::Drop {
                zigzag: true,
                safety_height: 25.0,
            },
            bounds,
            SweepArgs::Drop {
                step_major: 5.0,
                step_minor: 2.0,
                axis: Axis::X,
            },
        )
        .unwrap();

        assert_eq!(segments.len(), 1);
        let points = &segments[0].points;
        // 3 rows (y = 0, 2, 4) of 3 probes each (x = 0, 5, 10).
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], Point3::new(0.0, 0.0, -1.0));
        assert_eq!(points[2], Point3::new(10.0, 0.0, -1.0));
        // Second row runs backwards.
        assert_eq!(points[3], Point3::new(10.0, 2.0, -1.0));
        assert_eq!(points[5], Point3::new(0.0, 2.0, -1.0));
        // All cutting happens on the floor.
        assert!(points.iter().all(|p| p.z == -1.0));
    }

    #[test]
    fn test_drop_plain_rows_with_retracts() {
        let bounds = Bounds3::new(0.0, 6.0, 0.0, 2.0, 0.0, 3.0);
        let segments = run(
            GenerationKind::Drop {
                zigzag: false,
                safety_height: 9.0,
            },
            bounds,
            SweepArgs::Drop {
                step_major: 3.0,
                step_minor: 2.0,
                axis: Axis::X,
            },
        )
        .unwrap();

        // Rows at y = 0 and y = 2, one segment each.
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            let points = &segment.points;
            assert_eq!(points.first().unwrap().z, 9.0);
            assert_eq!(points.last().unwrap().z, 9.0);
            // Rows all run in the same direction.
            assert_eq!(points[1].x, 0.0);
        }
    }

    #[test]
    fn test_drop_axis_y_swaps_coordinates() {
        let bounds = Bounds3::new(0.0, 4.0, 0.0, 10.0, 0.0, 1.0);
        let segments = run(
            GenerationKind::Drop {
                zigzag: true,
                safety_height: 5.0,
            },
            bounds,
            SweepArgs::Drop {
                step_major: 5.0,
                step_minor: 2.0,
                axis: Axis::Y,
            },
        )
        .unwrap();

        let points = &segments[0].points;
        // Rows run along Y; the cross positions walk X.
        assert_eq!(points[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(points[1], Point3::new(0.0, 5.0, 0.0));
        assert_eq!(points[2], Point3::new(0.0, 10.0, 0.0));
        assert_eq!(points[3].x, 2.0);
    }

    #[test]
    fn test_push_layers_step_down() {
        let bounds = Bounds3::new(0.0, 10.0, 0.0, 4.0, 0.0, 2.5);
        let segments = run(
            GenerationKind::Push {
                postprocessor: Postprocessor::ZigZagCutter,
            },
            bounds,
            SweepArgs::Push {
                dx: 0.0,
                dy: 2.0,
                dz: StepDepth::Step(1.0),
            },
        )
        .unwrap();

        // Layers at z = 1.5, 0.5, 0.0; one serpentine per layer.
        assert_eq!(segments.len(), 3);
        assert!(segments[0].points.iter().all(|p| p.z == 1.5));
        assert!(segments[1].points.iter().all(|p| p.z == 0.5));
        assert!(segments[2].points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_push_unbounded_is_single_layer() {
        let bounds = Bounds3::new(0.0, 10.0, 0.0, 4.0, -2.0, 5.0);
        let segments = run(
            GenerationKind::Push {
                postprocessor: Postprocessor::PathAccumulator,
            },
            bounds,
            SweepArgs::Push {
                dx: 0.0,
                dy: 2.0,
                dz: StepDepth::Unbounded,
            },
        )
        .unwrap();

        assert!(!segments.is_empty());
        assert!(segments.iter().all(|s| s.points.iter().all(|p| p.z == -2.0)));
        // Plain accumulation: two points per line, all in the same direction.
        assert!(segments.iter().all(|s| s.points.len() == 2));
        assert!(segments.iter().all(|s| s.points[0].x == 0.0));
    }

    #[test]
    fn test_push_crossed_passes() {
        let bounds = Bounds3::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0);
        let segments = run(
            GenerationKind::Push {
                postprocessor: Postprocessor::SimpleCutter,
            },
            bounds,
            SweepArgs::Push {
                dx: 2.0,
                dy: 2.0,
                dz: StepDepth::Unbounded,
            },
        )
        .unwrap();

        // 3 Y-parallel lines plus 3 X-parallel lines.
        assert_eq!(segments.len(), 6);
        let vertical = segments
            .iter()
            .filter(|s| s.points[0].x == s.points[1].x)
            .count();
        assert_eq!(vertical, 3);
    }

    #[test]
    fn test_contour_rings_are_closed() {
        let bounds = Bounds3::new(1.0, 5.0, 2.0, 6.0, 0.0, 1.0);
        let segments = run(
            GenerationKind::Push {
                postprocessor: Postprocessor::ContourCutter,
            },
            bounds,
            SweepArgs::Push {
                dx: 0.0,
                dy: 2.0,
                dz: StepDepth::Step(0.5),
            },
        )
        .unwrap();

        assert_eq!(segments.len(), 2);
        for ring in &segments {
            assert_eq!(ring.points.len(), 5);
            assert_eq!(ring.points.first(), ring.points.last());
        }
    }

    #[test]
    fn test_allowance_raises_floor() {
        let engine = FlatSweepEngine::new();
        let mut cutter = cutter(2.0);
        cutter.set_required_distance(0.5);
        let bounds = Bounds3::new(0.0, 4.0, 0.0, 4.0, -1.0, 3.0);
        let cancel = CancelToken::new();
        let mut sink = NullProgress;
        let mut monitor = ProgressMonitor::without_refresh(&mut sink, &cancel);
        let segments = engine
            .generate(
                cutter.as_ref(),
                &GenerationKind::Drop {
                    zigzag: true,
                    safety_height: 5.0,
                },
                &bounds,
                &SweepArgs::Drop {
                    step_major: 2.0,
                    step_minor: 2.0,
                    axis: Axis::X,
                },
                None,
                &mut monitor,
            )
            .unwrap();
        assert!(segments[0].points.iter().all(|p| p.z == -0.5));
    }

    #[test]
    fn test_zero_step_rejected() {
        let bounds = Bounds3::new(0.0, 4.0, 0.0, 4.0, 0.0, 1.0);
        let err = run(
            GenerationKind::Drop {
                zigzag: true,
                safety_height: 5.0,
            },
            bounds,
            SweepArgs::Drop {
                step_major: 0.0,
                step_minor: 2.0,
                axis: Axis::X,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::GenerationFailed { .. }));
    }

    #[test]
    fn test_pending_cancel_stops_immediately() {
        let engine = FlatSweepEngine::new();
        let cutter = cutter(2.0);
        let bounds = Bounds3::new(0.0, 100.0, 0.0, 100.0, 0.0, 1.0);
        let cancel = CancelToken::new();
        cancel.request();
        let mut sink = NullProgress;
        let mut monitor = ProgressMonitor::without_refresh(&mut sink, &cancel);
        let segments = engine
            .generate(
                cutter.as_ref(),
                &GenerationKind::Push {
                    postprocessor: Postprocessor::ZigZagCutter,
                },
                &bounds,
                &SweepArgs::Push {
                    dx: 0.0,
                    dy: 1.0,
                    dz: StepDepth::Unbounded,
                },
                None,
                &mut monitor,
            )
            .unwrap();
        // The first callback already reported the stop.
        assert!(segments.is_empty());
    }
}
