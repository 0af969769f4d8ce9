//! Job orchestration: one tool/process pairing run end to end.
//!
//! A run snapshots its records, adjusts the machining boundary for the
//! tool, sizes the sweep steps, and drives the engine under a progress
//! monitor. Finished paths land in the shared [`ToolpathCollection`];
//! a cancelled run lands nothing.

use crate::cutter::CutterSpec;
use crate::engine::{CollisionModel, GenerationKind, SweepArgs, ToolpathEngine};
use camkit_core::{
    CancelToken, GeneratorFamily, JobError, Point3, Postprocessor, ProgressMonitor, ProgressSink,
    Shared, ToolpathCollection, ToolpathResult, Units,
};
use camkit_settings::{
    FlagKey, ProcessRecord, ScalarKey, SettingsBridge, TaskRecord, ToolRecord,
};
use chrono::Utc;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Start position clearance above the boundary top, metric documents.
const START_OFFSET_MM: f64 = 7.0;
/// Start position clearance above the boundary top, imperial documents.
const START_OFFSET_INCH: f64 = 0.25;

/// How a run request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run finished without a pending cancel request
    Completed,
    /// A cancel request stopped the run; nothing was stored
    Cancelled,
    /// Another run was already in flight; the request was ignored
    AlreadyRunning,
}

impl RunOutcome {
    /// True when a cancel request ended the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Clears the shared running flag when the run leaves scope.
struct RunningGuard {
    flag: Rc<Cell<bool>>,
}

impl RunningGuard {
    /// Takes the flag, or returns `None` when a run already holds it.
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self {
            flag: Rc::clone(flag),
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Runs toolpath generation jobs against an engine
///
/// The runner is single-flight: a start request while a run is in flight
/// is ignored and reported as [`RunOutcome::AlreadyRunning`]. The running
/// flag is shared so an embedder can check it before borrowing the runner
/// at all. Collision geometry is cached across runs and handed back to
/// the engine for reuse.
pub struct JobRunner {
    cancel: CancelToken,
    running: Rc<Cell<bool>>,
    physics_cache: Option<Box<dyn CollisionModel>>,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRunner {
    /// Creates an idle runner.
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
            running: Rc::new(Cell::new(false)),
            physics_cache: None,
        }
    }

    /// The cancel token for the current and future runs.
    ///
    /// Requesting cancellation takes effect at the engine's next progress
    /// callback. Starting a new run clears any pending request.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// True while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Shared view of the single-flight flag.
    ///
    /// Embedders that keep the runner behind a `RefCell` check this before
    /// borrowing, so a start request arriving from inside a progress
    /// callback backs off instead of double-borrowing.
    pub fn running_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.running)
    }

    /// Runs one tool/process pairing.
    ///
    /// `tools` is the resolved tool table; the tool's position in it
    /// becomes the stored tool id. The boundary, unit, boundary mode and
    /// global scalars are read from `bridge`. On success the result is
    /// appended to `collection` as the visible latest entry.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        tool: &Shared<ToolRecord>,
        process: &Shared<ProcessRecord>,
        tools: &[Shared<ToolRecord>],
        bridge: &SettingsBridge,
        collection: &mut ToolpathCollection,
        engine: &dyn ToolpathEngine,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        let Some(_guard) = RunningGuard::acquire(&self.running) else {
            debug!("start request ignored, a run is already in flight");
            return Ok(RunOutcome::AlreadyRunning);
        };
        self.cancel.clear();
        sink.begin();
        let outcome = self.execute(tool, process, tools, bridge, collection, engine, sink);
        sink.end();
        outcome
    }

    /// Runs the pairing referenced by a task.
    #[allow(clippy::too_many_arguments)]
    pub fn run_task(
        &mut self,
        task: &Shared<TaskRecord>,
        tools: &[Shared<ToolRecord>],
        bridge: &SettingsBridge,
        collection: &mut ToolpathCollection,
        engine: &dyn ToolpathEngine,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        let (tool, process) = {
            let task = task.borrow();
            let tool = task.tool.clone().ok_or(JobError::DanglingReference {
                category: "Tool".to_string(),
            })?;
            let process = task.process.clone().ok_or(JobError::DanglingReference {
                category: "Process".to_string(),
            })?;
            (tool, process)
        };
        self.run(&tool, &process, tools, bridge, collection, engine, sink)
    }

    /// Runs every enabled, complete task in order.
    ///
    /// The batch stops at the first cancelled run and reports `Cancelled`.
    /// Tasks that are disabled or incomplete are skipped without comment;
    /// they are a normal state for a half-edited document.
    #[allow(clippy::too_many_arguments)]
    pub fn run_all(
        &mut self,
        tasks: &[Shared<TaskRecord>],
        tools: &[Shared<ToolRecord>],
        bridge: &SettingsBridge,
        collection: &mut ToolpathCollection,
        engine: &dyn ToolpathEngine,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        let enabled: Vec<Shared<TaskRecord>> = tasks
            .iter()
            .filter(|task| task.borrow().is_enabled())
            .cloned()
            .collect();
        let total = enabled.len();
        for (index, task) in enabled.iter().enumerate() {
            sink.progress(
                Some(&format!("Processing task {}/{}", index + 1, total)),
                None,
            );
            let outcome = self.run_task(task, tools, bridge, collection, engine, sink)?;
            if outcome != RunOutcome::Completed {
                return Ok(outcome);
            }
        }
        Ok(RunOutcome::Completed)
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        &mut self,
        tool_handle: &Shared<ToolRecord>,
        process_handle: &Shared<ProcessRecord>,
        tools: &[Shared<ToolRecord>],
        bridge: &SettingsBridge,
        collection: &mut ToolpathCollection,
        engine: &dyn ToolpathEngine,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        // Snapshots: edits queued behind the run must not change it midway.
        let tool = tool_handle.borrow().clone();
        let process = process_handle.borrow().clone();

        let tool_field = |field: &str| JobError::IncompleteRecord {
            category: "Tool".to_string(),
            field: field.to_string(),
        };
        let process_field = |field: &str| JobError::IncompleteRecord {
            category: "Process".to_string(),
            field: field.to_string(),
        };

        let tool_name = tool.name.clone().ok_or_else(|| tool_field("name"))?;
        let feedrate = tool.feedrate.ok_or_else(|| tool_field("feedrate"))?;
        let speed = tool.speed.ok_or_else(|| tool_field("speed"))?;

        let process_name = process.name.clone().ok_or_else(|| process_field("name"))?;
        let family = process
            .path_generator
            .ok_or_else(|| process_field("path_generator"))?;
        let postprocessor = process
            .path_postprocessor
            .ok_or_else(|| process_field("path_postprocessor"))?;
        let direction = process
            .path_direction
            .ok_or_else(|| process_field("path_direction"))?;
        let safety_height = process
            .safety_height
            .ok_or_else(|| process_field("safety_height"))?;
        let material_allowance = process
            .material_allowance
            .ok_or_else(|| process_field("material_allowance"))?;
        let overlap = process.overlap.ok_or_else(|| process_field("overlap"))?;
        let dz = process
            .step_depth()
            .ok_or_else(|| process_field("step_down"))?;

        let bounds = bridge.bounds();
        let unit = bridge.unit();
        let spec = CutterSpec::from_record(&tool, &bounds)?;

        // Cutter radius compensation on the horizontal contour.
        let offset = spec.radius / 2.0 * bridge.boundary_mode().offset_sign();
        let adjusted = bounds.grown_xy(offset);
        if !adjusted.is_valid() {
            warn!(%adjusted, offset, "boundary collapsed after tool offset");
            sink.progress(
                Some("Processing boundaries are too small for this tool size."),
                None,
            );
            return Ok(RunOutcome::Completed);
        }

        let effective_radius = spec.radius * (1.0 - overlap / 100.0);
        // The along-path step only matters for contour post-processing;
        // every other postprocessor cuts each line in a single move.
        let along_step = match postprocessor {
            Postprocessor::ContourCutter => Some(effective_radius),
            _ => None,
        };
        let args = SweepArgs::for_direction(family, direction, effective_radius, effective_radius, dz)?;
        let kind = match family {
            GeneratorFamily::Drop => GenerationKind::Drop {
                zigzag: postprocessor == Postprocessor::ZigZagCutter,
                safety_height: bridge.scalar(ScalarKey::SafetyHeight),
            },
            GeneratorFamily::Push => GenerationKind::Push { postprocessor },
        };
        debug!(
            engine = engine.name(),
            %spec,
            %family,
            %direction,
            %postprocessor,
            effective_radius,
            ?along_step,
            %adjusted,
            "starting generation"
        );

        let mut cutter = engine.make_cutter(&spec)?;
        cutter.set_required_distance(material_allowance);

        let physics = if bridge.flag(FlagKey::CollisionDetection) {
            let handle = engine.collision_model(cutter.as_ref(), self.physics_cache.take())?;
            self.physics_cache = Some(handle);
            self.physics_cache.as_deref()
        } else {
            self.physics_cache = None;
            None
        };

        let mut monitor = if bridge.flag(FlagKey::ShowProgressPreview) {
            ProgressMonitor::new(sink, &self.cancel, bridge.scalar(ScalarKey::ProgressMaxHz))
        } else {
            ProgressMonitor::without_refresh(sink, &self.cancel)
        };
        let segments = engine.generate(
            cutter.as_ref(),
            &kind,
            &adjusted,
            &args,
            physics,
            &mut monitor,
        )?;

        if self.cancel.is_requested() {
            // Partial output would machine an unpredictable subset of the
            // stock, so a cancelled run keeps nothing.
            info!(segments = segments.len(), "run cancelled, output discarded");
            return Ok(RunOutcome::Cancelled);
        }
        if segments.is_empty() {
            debug!("generation produced no segments");
            return Ok(RunOutcome::Completed);
        }

        let start_offset = match unit {
            Units::Mm => START_OFFSET_MM,
            Units::Inch => START_OFFSET_INCH,
        };
        let tool_id = tools
            .iter()
            .position(|candidate| Rc::ptr_eq(candidate, tool_handle))
            .map(|index| index + 1)
            .unwrap_or(0);

        collection.hide_sole_visible_latest();
        let result = ToolpathResult {
            description: format!("{} / {}", tool_name, process_name),
            segments,
            tool_id,
            speed,
            feedrate,
            material_allowance,
            safety_height,
            unit,
            start: Point3::new(adjusted.minx, adjusted.miny, bounds.maxz + start_offset),
            visible: true,
            created_at: Utc::now(),
        };
        info!(
            description = %result.description,
            segments = result.segments.len(),
            cut_length = result.cut_length(),
            "toolpath stored"
        );
        collection.push(result);
        Ok(RunOutcome::Completed)
    }
}
