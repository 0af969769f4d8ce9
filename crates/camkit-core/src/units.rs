//! Unit handling for machining dimensions.
//!
//! Settings documents and toolpath metadata carry an explicit unit system
//! ("mm" or "inch"). All geometry stays in the document's unit; conversion
//! is only applied at display or export boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Unit system for machining dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Millimeters
    Mm,
    /// Inches
    Inch,
}

impl Default for Units {
    fn default() -> Self {
        Self::Mm
    }
}

impl Units {
    /// The label used in documents and display ("mm" or "inch")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "inch",
        }
    }

    /// Convert a value expressed in `self` into `target` units
    pub fn convert(&self, value: f64, target: Units) -> f64 {
        match (self, target) {
            (Self::Mm, Self::Inch) => value / MM_PER_INCH,
            (Self::Inch, Self::Mm) => value * MM_PER_INCH,
            _ => value,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "metric" => Ok(Self::Mm),
            "inch" | "in" | "imperial" => Ok(Self::Inch),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

/// Format a length for display in the given unit system
pub fn format_length(value: f64, units: Units) -> String {
    match units {
        Units::Mm => format!("{:.3} mm", value),
        Units::Inch => format!("{:.4} inch", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("mm".parse::<Units>().unwrap(), Units::Mm);
        assert_eq!("Inch".parse::<Units>().unwrap(), Units::Inch);
        assert_eq!("in".parse::<Units>().unwrap(), Units::Inch);
        assert!("furlong".parse::<Units>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Units::Mm.to_string(), "mm");
        assert_eq!(Units::Inch.label(), "inch");
        assert_eq!(Units::default(), Units::Mm);
    }

    #[test]
    fn test_convert() {
        assert!((Units::Inch.convert(1.0, Units::Mm) - 25.4).abs() < 1e-9);
        assert!((Units::Mm.convert(25.4, Units::Inch) - 1.0).abs() < 1e-9);
        assert_eq!(Units::Mm.convert(3.5, Units::Mm), 3.5);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(10.5, Units::Mm), "10.500 mm");
        assert_eq!(format_length(0.25, Units::Inch), "0.2500 inch");
    }
}
