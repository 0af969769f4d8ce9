//! Resolved record types for tools, processes, and tasks.
//!
//! Every field is optional: a field is `None` when neither the specific
//! section nor the category default provided a usable value. Omission is
//! observable state, never a silent zero. Consumers check completeness
//! before using a record and skip incomplete ones.
//!
//! Task records alias the tool and process records they reference through
//! `Shared` handles, so they are serialized positionally by the document
//! writer rather than with serde.

use crate::document::SettingsDocument;
use camkit_core::{
    CutterShape, GeneratorFamily, PathDirection, Postprocessor, Shared, StepDepth,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// The three record categories of a settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Cutting tools
    Tool,
    /// Machining processes
    Process,
    /// Tool/process pairings to run
    Task,
}

impl Category {
    /// Section name prefix ("Tool", "Process", "Task").
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Tool => "Tool",
            Self::Process => "Process",
            Self::Task => "Task",
        }
    }

    /// Name of the category's default section.
    pub fn default_section(&self) -> String {
        format!("{}Default", self.prefix())
    }

    /// Name of the indexed section for `index`.
    pub fn section_name(&self, index: usize) -> String {
        format!("{}{}", self.prefix(), index)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// One resolved cutting tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Display name
    pub name: Option<String>,
    /// Cutter geometry
    pub shape: Option<CutterShape>,
    /// Primary cutter radius
    pub tool_radius: Option<f64>,
    /// Secondary (torus) radius, meaningful for toroidal cutters
    pub torus_radius: Option<f64>,
    /// Feed rate
    pub feedrate: Option<f64>,
    /// Spindle speed
    pub speed: Option<f64>,
}

impl ToolRecord {
    /// The first missing field a toolpath run would need, if any.
    ///
    /// The torus radius only counts as required for toroidal cutters.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_none() {
            return Some("name");
        }
        if self.shape.is_none() {
            return Some("shape");
        }
        if self.tool_radius.is_none() {
            return Some("tool_radius");
        }
        if self.shape == Some(CutterShape::Toroidal) && self.torus_radius.is_none() {
            return Some("torus_radius");
        }
        if self.feedrate.is_none() {
            return Some("feedrate");
        }
        if self.speed.is_none() {
            return Some("speed");
        }
        None
    }

    /// True when every field a run needs is present.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }
}

/// One resolved machining process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Display name
    pub name: Option<String>,
    /// Generator family selection
    pub path_generator: Option<GeneratorFamily>,
    /// Post-processing selection
    pub path_postprocessor: Option<Postprocessor>,
    /// Sweep direction selection
    pub path_direction: Option<PathDirection>,
    /// Safety height for travel moves
    pub safety_height: Option<f64>,
    /// Material left for a later finishing pass
    pub material_allowance: Option<f64>,
    /// Stepover overlap in percent of the tool radius
    pub overlap: Option<f64>,
    /// Vertical layer depth; zero means a single full-depth pass
    pub step_down: Option<f64>,
}

impl ProcessRecord {
    /// The first missing field a toolpath run would need, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_none() {
            return Some("name");
        }
        if self.path_generator.is_none() {
            return Some("path_generator");
        }
        if self.path_postprocessor.is_none() {
            return Some("path_postprocessor");
        }
        if self.path_direction.is_none() {
            return Some("path_direction");
        }
        if self.safety_height.is_none() {
            return Some("safety_height");
        }
        if self.material_allowance.is_none() {
            return Some("material_allowance");
        }
        if self.overlap.is_none() {
            return Some("overlap");
        }
        if self.step_down.is_none() {
            return Some("step_down");
        }
        None
    }

    /// True when every field a run needs is present.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// The vertical step carried into generation.
    ///
    /// Only meaningful for complete records; a zero or negative step_down
    /// collapses to a single unbounded pass.
    pub fn step_depth(&self) -> Option<StepDepth> {
        self.step_down.map(StepDepth::from_step_down)
    }
}

/// One resolved task: a tool/process pairing with an enable switch
///
/// The `tool` and `process` handles alias records in the resolved tool and
/// process tables. A task whose handle no longer appears in its table is
/// stale and gets pruned on the next table refresh.
#[derive(Debug, Clone, Default)]
pub struct TaskRecord {
    /// The referenced tool record
    pub tool: Option<Shared<ToolRecord>>,
    /// The referenced process record
    pub process: Option<Shared<ProcessRecord>>,
    /// Whether batch execution should run this task
    pub enabled: Option<bool>,
}

impl TaskRecord {
    /// The first missing field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.tool.is_none() {
            return Some("tool");
        }
        if self.process.is_none() {
            return Some("process");
        }
        if self.enabled.is_none() {
            return Some("enabled");
        }
        None
    }

    /// True when both references resolved and the enable switch is present.
    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// True when the task is complete and switched on.
    pub fn is_enabled(&self) -> bool {
        self.is_complete() && self.enabled == Some(true)
    }
}

fn record_position<T>(pool: &[Shared<T>], record: &Shared<T>) -> Option<usize> {
    pool.iter().position(|candidate| Rc::ptr_eq(candidate, record))
}

/// Builds a settings document from resolved record tables.
///
/// Every record writes its present fields into its indexed section; `None`
/// fields are omitted. Task references are stored as the position of the
/// referenced record within the given tables. A reference whose record is
/// no longer in its table is dropped rather than written with a bogus
/// index.
pub fn document_from_records(
    tools: &[Shared<ToolRecord>],
    processes: &[Shared<ProcessRecord>],
    tasks: &[Shared<TaskRecord>],
) -> SettingsDocument {
    let mut document = SettingsDocument::new();

    for (index, tool) in tools.iter().enumerate() {
        let section = Category::Tool.section_name(index);
        document.ensure_section(&section);
        let tool = tool.borrow();
        if let Some(name) = &tool.name {
            document.set(&section, "name", name);
        }
        if let Some(shape) = tool.shape {
            document.set(&section, "shape", shape.token());
        }
        if let Some(radius) = tool.tool_radius {
            document.set(&section, "tool_radius", radius.to_string());
        }
        if let Some(radius) = tool.torus_radius {
            document.set(&section, "torus_radius", radius.to_string());
        }
        if let Some(feedrate) = tool.feedrate {
            document.set(&section, "feedrate", feedrate.to_string());
        }
        if let Some(speed) = tool.speed {
            document.set(&section, "speed", speed.to_string());
        }
    }

    for (index, process) in processes.iter().enumerate() {
        let section = Category::Process.section_name(index);
        document.ensure_section(&section);
        let process = process.borrow();
        if let Some(name) = &process.name {
            document.set(&section, "name", name);
        }
        if let Some(generator) = process.path_generator {
            document.set(&section, "path_generator", generator.token());
        }
        if let Some(postprocessor) = process.path_postprocessor {
            document.set(&section, "path_postprocessor", postprocessor.token());
        }
        if let Some(direction) = process.path_direction {
            document.set(&section, "path_direction", direction.token());
        }
        if let Some(height) = process.safety_height {
            document.set(&section, "safety_height", height.to_string());
        }
        if let Some(allowance) = process.material_allowance {
            document.set(&section, "material_allowance", allowance.to_string());
        }
        if let Some(overlap) = process.overlap {
            document.set(&section, "overlap", overlap.to_string());
        }
        if let Some(step) = process.step_down {
            document.set(&section, "step_down", step.to_string());
        }
    }

    for (index, task) in tasks.iter().enumerate() {
        let section = Category::Task.section_name(index);
        document.ensure_section(&section);
        let task = task.borrow();
        if let Some(position) = task
            .tool
            .as_ref()
            .and_then(|tool| record_position(tools, tool))
        {
            document.set(&section, "tool", position.to_string());
        }
        if let Some(position) = task
            .process
            .as_ref()
            .and_then(|process| record_position(processes, process))
        {
            document.set(&section, "process", position.to_string());
        }
        if let Some(enabled) = task.enabled {
            document.set(&section, "enabled", if enabled { "1" } else { "0" });
        }
    }

    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use camkit_core::shared;

    #[test]
    fn test_category_section_names() {
        assert_eq!(Category::Tool.section_name(0), "Tool0");
        assert_eq!(Category::Process.section_name(12), "Process12");
        assert_eq!(Category::Task.default_section(), "TaskDefault");
    }

    #[test]
    fn test_tool_completeness() {
        let mut tool = ToolRecord {
            name: Some("Flat 6mm".to_string()),
            shape: Some(CutterShape::Cylindrical),
            tool_radius: Some(3.0),
            torus_radius: None,
            feedrate: Some(1000.0),
            speed: Some(200.0),
        };
        assert!(tool.is_complete());

        // The torus radius only becomes required for toroidal shapes.
        tool.shape = Some(CutterShape::Toroidal);
        assert_eq!(tool.missing_field(), Some("torus_radius"));
        tool.torus_radius = Some(0.25);
        assert!(tool.is_complete());

        tool.tool_radius = None;
        assert_eq!(tool.missing_field(), Some("tool_radius"));
    }

    #[test]
    fn test_process_step_depth() {
        let process = ProcessRecord {
            step_down: Some(0.0),
            ..ProcessRecord::default()
        };
        assert_eq!(process.step_depth(), Some(StepDepth::Unbounded));

        let layered = ProcessRecord {
            step_down: Some(0.5),
            ..ProcessRecord::default()
        };
        assert_eq!(layered.step_depth(), Some(StepDepth::Step(0.5)));

        assert_eq!(ProcessRecord::default().step_depth(), None);
    }

    #[test]
    fn test_task_enabled() {
        let task = TaskRecord {
            tool: Some(shared(ToolRecord::default())),
            process: Some(shared(ProcessRecord::default())),
            enabled: Some(true),
        };
        assert!(task.is_complete());
        assert!(task.is_enabled());

        let disabled = TaskRecord {
            enabled: Some(false),
            ..task.clone()
        };
        assert!(!disabled.is_enabled());

        let dangling = TaskRecord {
            tool: None,
            ..task
        };
        assert_eq!(dangling.missing_field(), Some("tool"));
        assert!(!dangling.is_enabled());
    }

    #[test]
    fn test_document_from_records() {
        let tools = vec![
            shared(ToolRecord {
                name: Some("Flat".to_string()),
                shape: Some(CutterShape::Cylindrical),
                tool_radius: Some(3.0),
                torus_radius: None,
                feedrate: Some(1000.0),
                speed: Some(200.0),
            }),
            shared(ToolRecord {
                name: Some("Ball".to_string()),
                shape: Some(CutterShape::Spherical),
                tool_radius: Some(1.5),
                ..ToolRecord::default()
            }),
        ];
        let processes = vec![shared(ProcessRecord {
            name: Some("Finish".to_string()),
            path_generator: Some(GeneratorFamily::Drop),
            path_postprocessor: Some(Postprocessor::ZigZagCutter),
            path_direction: Some(PathDirection::X),
            safety_height: Some(5.0),
            material_allowance: Some(0.0),
            overlap: Some(60.0),
            step_down: Some(1.0),
        })];
        let tasks = vec![shared(TaskRecord {
            tool: Some(tools[1].clone()),
            process: Some(processes[0].clone()),
            enabled: Some(true),
        })];

        let document = document_from_records(&tools, &processes, &tasks);
        assert_eq!(document.get("Tool0", "shape"), Some("CylindricalCutter"));
        assert_eq!(document.get("Tool0", "tool_radius"), Some("3"));
        assert_eq!(document.get("Tool1", "name"), Some("Ball"));
        // Omitted fields are not written.
        assert_eq!(document.get("Tool1", "feedrate"), None);
        assert_eq!(document.get("Process0", "path_generator"), Some("DropCutter"));
        // References are written as positions in the given tables.
        assert_eq!(document.get("Task0", "tool"), Some("1"));
        assert_eq!(document.get("Task0", "process"), Some("0"));
        assert_eq!(document.get("Task0", "enabled"), Some("1"));
    }

    #[test]
    fn test_document_from_records_drops_detached_reference() {
        let tools = vec![shared(ToolRecord::default())];
        let detached = shared(ToolRecord::default());
        let processes = vec![shared(ProcessRecord::default())];
        let tasks = vec![shared(TaskRecord {
            tool: Some(detached),
            process: Some(processes[0].clone()),
            enabled: Some(false),
        })];

        let document = document_from_records(&tools, &processes, &tasks);
        assert_eq!(document.get("Task0", "tool"), None);
        assert_eq!(document.get("Task0", "process"), Some("0"));
        assert_eq!(document.get("Task0", "enabled"), Some("0"));
        // Sections exist even for records with nothing to write.
        assert!(document.has_section("Tool0"));
    }
}
