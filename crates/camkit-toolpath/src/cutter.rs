//! Cutter construction from resolved tool records.

use camkit_core::{Bounds3, CutterShape, JobError};
use camkit_settings::ToolRecord;
use std::fmt;

/// Geometry needed to build a cutter
#[derive(Debug, Clone, PartialEq)]
pub struct CutterSpec {
    /// Cutter shape
    pub shape: CutterShape,
    /// Primary radius
    pub radius: f64,
    /// Torus radius, present for toroidal cutters only
    pub torus_radius: Option<f64>,
    /// Shaft height above the tip
    pub height: f64,
}

impl CutterSpec {
    /// Builds a cutter spec from a resolved tool record and the machining
    /// bounds.
    ///
    /// The height is four times the Z span of the bounds; collision checks
    /// miss contacts when the shaft is shorter than the machined volume.
    pub fn from_record(tool: &ToolRecord, bounds: &Bounds3) -> Result<Self, JobError> {
        let incomplete = |field: &str| JobError::IncompleteRecord {
            category: "Tool".to_string(),
            field: field.to_string(),
        };
        let shape = tool.shape.ok_or_else(|| incomplete("shape"))?;
        let radius = tool.tool_radius.ok_or_else(|| incomplete("tool_radius"))?;
        let torus_radius = match shape {
            CutterShape::Toroidal => {
                Some(tool.torus_radius.ok_or_else(|| incomplete("torus_radius"))?)
            }
            _ => None,
        };
        Ok(Self {
            shape,
            radius,
            torus_radius,
            height: 4.0 * bounds.z_span(),
        })
    }
}

impl fmt::Display for CutterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.torus_radius {
            Some(torus) => write!(f, "{} r={:.3} r2={:.3}", self.shape, self.radius, torus),
            None => write!(f, "{} r={:.3}", self.shape, self.radius),
        }
    }
}

/// An opaque cutter handle produced by an engine's cutter factory
///
/// The required distance is the material allowance: probing keeps the
/// cutter this far away from the ideal surface.
pub trait Cutter: fmt::Debug {
    /// The geometry this cutter was built from.
    fn spec(&self) -> &CutterSpec;

    /// Current stand-off distance from the ideal surface.
    fn required_distance(&self) -> f64;

    /// Sets the stand-off distance from the ideal surface.
    fn set_required_distance(&mut self, distance: f64);
}

/// Plain cutter handle with no engine-specific state
#[derive(Debug, Clone)]
pub struct BasicCutter {
    spec: CutterSpec,
    required_distance: f64,
}

impl BasicCutter {
    /// Creates a cutter with zero stand-off.
    pub fn new(spec: CutterSpec) -> Self {
        Self {
            spec,
            required_distance: 0.0,
        }
    }
}

impl Cutter for BasicCutter {
    fn spec(&self) -> &CutterSpec {
        &self.spec
    }

    fn required_distance(&self) -> f64 {
        self.required_distance
    }

    fn set_required_distance(&mut self, distance: f64) {
        self.required_distance = distance;
    }
}
