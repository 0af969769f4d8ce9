//! Machining domain enums.
//!
//! These types mirror the tokens used in settings documents (for example
//! `shape: SphericalCutter` or `path_direction: x`). `FromStr` accepts
//! exactly the document tokens and `Display` writes them back, so records
//! survive a load/save round trip unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cutter shape selection for a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutterShape {
    /// Ball-nose cutter
    Spherical,
    /// Flat end mill
    Cylindrical,
    /// Torus (bull-nose) cutter with a secondary radius
    Toroidal,
}

impl CutterShape {
    /// All shapes, in document order.
    pub fn all() -> &'static [CutterShape] {
        &[Self::Spherical, Self::Cylindrical, Self::Toroidal]
    }

    /// The token used in settings documents.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Spherical => "SphericalCutter",
            Self::Cylindrical => "CylindricalCutter",
            Self::Toroidal => "ToroidalCutter",
        }
    }
}

impl fmt::Display for CutterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for CutterShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SphericalCutter" => Ok(Self::Spherical),
            "CylindricalCutter" => Ok(Self::Cylindrical),
            "ToroidalCutter" => Ok(Self::Toroidal),
            other => Err(format!("Unknown cutter shape: {}", other)),
        }
    }
}

/// Path generator family selection for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorFamily {
    /// Vertical probing along a horizontal grid
    Drop,
    /// Horizontal sweeps through depth layers
    Push,
}

impl GeneratorFamily {
    /// The token used in settings documents.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Drop => "DropCutter",
            Self::Push => "PushCutter",
        }
    }
}

impl fmt::Display for GeneratorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for GeneratorFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "DropCutter" => Ok(Self::Drop),
            "PushCutter" => Ok(Self::Push),
            other => Err(format!("Unknown path generator: {}", other)),
        }
    }
}

/// Path post-processing selection for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Postprocessor {
    /// Plain accumulation of probe rows
    PathAccumulator,
    /// Independent straight cuts
    SimpleCutter,
    /// Rows joined into a serpentine path
    ZigZagCutter,
    /// Closed polygon outlines
    PolygonCutter,
    /// Contour-following outlines
    ContourCutter,
}

impl Postprocessor {
    /// All postprocessors, in document order.
    pub fn all() -> &'static [Postprocessor] {
        &[
            Self::PathAccumulator,
            Self::SimpleCutter,
            Self::ZigZagCutter,
            Self::PolygonCutter,
            Self::ContourCutter,
        ]
    }

    /// The token used in settings documents.
    pub fn token(&self) -> &'static str {
        match self {
            Self::PathAccumulator => "PathAccumulator",
            Self::SimpleCutter => "SimpleCutter",
            Self::ZigZagCutter => "ZigZagCutter",
            Self::PolygonCutter => "PolygonCutter",
            Self::ContourCutter => "ContourCutter",
        }
    }
}

impl fmt::Display for Postprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Postprocessor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PathAccumulator" => Ok(Self::PathAccumulator),
            "SimpleCutter" => Ok(Self::SimpleCutter),
            "ZigZagCutter" => Ok(Self::ZigZagCutter),
            "PolygonCutter" => Ok(Self::PolygonCutter),
            "ContourCutter" => Ok(Self::ContourCutter),
            other => Err(format!("Unknown postprocessor: {}", other)),
        }
    }
}

/// Sweep direction selection for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathDirection {
    /// Rows along the X axis
    X,
    /// Rows along the Y axis
    Y,
    /// Crossed rows along both axes (push family only)
    Xy,
}

impl PathDirection {
    /// The token used in settings documents.
    pub fn token(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Xy => "xy",
        }
    }
}

impl fmt::Display for PathDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for PathDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "xy" => Ok(Self::Xy),
            other => Err(format!("Unknown path direction: {}", other)),
        }
    }
}

/// Horizontal axis selector for drop-family sweeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Major direction along X
    X,
    /// Major direction along Y
    Y,
}

/// How the cutter radius adjusts the machining boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Keep the cutter inside the box: shrink the XY contour
    Inside,
    /// Move the cutter centre along the box edge: no adjustment
    Along,
    /// Keep the cutter outside the contour: grow the XY box
    Around,
}

impl BoundaryMode {
    /// Sign applied to the half-radius boundary offset.
    pub fn offset_sign(&self) -> f64 {
        match self {
            Self::Inside => -1.0,
            Self::Along => 0.0,
            Self::Around => 1.0,
        }
    }
}

impl Default for BoundaryMode {
    fn default() -> Self {
        Self::Inside
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inside => write!(f, "inside"),
            Self::Along => write!(f, "along"),
            Self::Around => write!(f, "around"),
        }
    }
}

impl FromStr for BoundaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inside" => Ok(Self::Inside),
            "along" => Ok(Self::Along),
            "around" => Ok(Self::Around),
            other => Err(format!("Unknown boundary mode: {}", other)),
        }
    }
}

/// A vertical step size that is either bounded or a single full-depth pass
///
/// A step_down of zero in a process record means "no layering": the value
/// carried into generation is `Unbounded`, never a zero step that would
/// loop forever.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StepDepth {
    /// One pass over the full depth
    Unbounded,
    /// Layered passes of the given positive depth
    Step(f64),
}

impl StepDepth {
    /// Builds a step depth from a raw step_down value.
    ///
    /// Values of zero or below (and non-finite values) collapse to
    /// `Unbounded`.
    pub fn from_step_down(step_down: f64) -> Self {
        if step_down > 0.0 && step_down.is_finite() {
            Self::Step(step_down)
        } else {
            Self::Unbounded
        }
    }

    /// True for the single full-depth pass.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// The layer depth, if bounded.
    pub fn step(&self) -> Option<f64> {
        match self {
            Self::Unbounded => None,
            Self::Step(value) => Some(*value),
        }
    }
}

impl fmt::Display for StepDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Step(value) => write!(f, "{:.3}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_tokens_round_trip() {
        for shape in CutterShape::all() {
            assert_eq!(shape.token().parse::<CutterShape>().unwrap(), *shape);
        }
        for post in Postprocessor::all() {
            assert_eq!(post.token().parse::<Postprocessor>().unwrap(), *post);
        }
        assert_eq!("DropCutter".parse::<GeneratorFamily>().unwrap(), GeneratorFamily::Drop);
        assert_eq!("xy".parse::<PathDirection>().unwrap(), PathDirection::Xy);
    }

    #[test]
    fn test_unknown_tokens_rejected() {
        assert!("BallCutter".parse::<CutterShape>().is_err());
        assert!("diagonal".parse::<PathDirection>().is_err());
        assert!("LaserCutter".parse::<GeneratorFamily>().is_err());
    }

    #[test]
    fn test_boundary_mode_signs() {
        assert_eq!(BoundaryMode::Inside.offset_sign(), -1.0);
        assert_eq!(BoundaryMode::Along.offset_sign(), 0.0);
        assert_eq!(BoundaryMode::Around.offset_sign(), 1.0);
        assert_eq!(BoundaryMode::default(), BoundaryMode::Inside);
    }

    #[test]
    fn test_step_depth_never_zero() {
        assert!(StepDepth::from_step_down(0.0).is_unbounded());
        assert!(StepDepth::from_step_down(-1.5).is_unbounded());
        assert!(StepDepth::from_step_down(f64::NAN).is_unbounded());
        assert_eq!(StepDepth::from_step_down(0.8).step(), Some(0.8));
    }
}
