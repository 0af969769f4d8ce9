//! Toolpath data model.
//!
//! A generated toolpath is a list of cutting polylines plus the machining
//! metadata needed to post-process it later (feeds, speeds, safety height,
//! start point). Results live in a [`ToolpathCollection`] that supports the
//! visibility bookkeeping and list editing a result browser needs.

use crate::geom::Point3;
use crate::units::Units;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One continuous cutting polyline
///
/// Motion between segments is a travel move at safety height; within a
/// segment the cutter stays engaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PathSegment {
    /// The ordered cutting positions
    pub points: Vec<Point3>,
}

impl PathSegment {
    /// Creates a segment from points.
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Total cutting length of this segment.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

/// A finished toolpath with its machining metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolpathResult {
    /// Human-readable description, "tool name / process name"
    pub description: String,
    /// The generated cutting segments
    pub segments: Vec<PathSegment>,
    /// 1-based position of the tool in the resolved tool table
    pub tool_id: usize,
    /// Spindle speed
    pub speed: f64,
    /// Feed rate
    pub feedrate: f64,
    /// Material allowance kept by the engine
    pub material_allowance: f64,
    /// Safety height for travel moves
    pub safety_height: f64,
    /// Unit system of all dimensions in this result
    pub unit: Units,
    /// Suggested start position above the stock
    pub start: Point3,
    /// Whether a viewer should currently draw this result
    pub visible: bool,
    /// When generation finished
    pub created_at: DateTime<Utc>,
}

impl ToolpathResult {
    /// Total cutting length over all segments.
    pub fn cut_length(&self) -> f64 {
        self.segments.iter().map(PathSegment::length).sum()
    }

    /// Number of individual cutting positions.
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// Ordered store of generated toolpath results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolpathCollection {
    entries: Vec<ToolpathResult>,
}

impl ToolpathCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no results are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The result at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&ToolpathResult> {
        self.entries.get(index)
    }

    /// Iterate over stored results in order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolpathResult> {
        self.entries.iter()
    }

    /// Number of currently visible results.
    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.visible).count()
    }

    /// Append a freshly generated result.
    pub fn push(&mut self, result: ToolpathResult) {
        self.entries.push(result);
    }

    /// Hide the newest result if it is the only visible one.
    ///
    /// Called before appending a fresh result: when the user is looking at
    /// exactly the previous run's output, the fresh output replaces it on
    /// screen instead of stacking on top. Any other visibility arrangement
    /// is user-chosen and left alone.
    pub fn hide_sole_visible_latest(&mut self) {
        if self.visible_count() != 1 {
            return;
        }
        if let Some(last) = self.entries.last_mut() {
            if last.visible {
                last.visible = false;
            }
        }
    }

    /// Set the visibility flag of the result at `index`.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Flip the visibility flag of the result at `index`.
    pub fn toggle_visible(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.visible = !entry.visible;
                true
            }
            None => false,
        }
    }

    /// Move the result at `index` one position towards the front.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.entries.swap(index - 1, index);
        true
    }

    /// Move the result at `index` one position towards the back.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index + 1);
        true
    }

    /// Remove and return the result at `index`.
    pub fn remove(&mut self, index: usize) -> Option<ToolpathResult> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Remove all results.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
