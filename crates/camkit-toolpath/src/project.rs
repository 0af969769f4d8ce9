//! Project session: settings, working lists, and generated toolpaths.
//!
//! A [`Project`] ties the settings layer to the job runner. It keeps its
//! own working copies of the resolved tool/process/task tables so edits
//! stay local until they are saved back through the document, and it
//! serializes update cascades through a pending-operation queue so a
//! cascade triggered from inside another one never interleaves with it.

use crate::engine::ToolpathEngine;
use crate::job::{JobRunner, RunOutcome};
use camkit_core::{
    CancelToken, DocumentError, JobError, ProgressSink, Shared, ToolpathCollection,
};
use camkit_settings::{
    document_from_records, CategoryResolver, Preferences, ProcessRecord, SettingsBridge,
    SettingsResult, TaskRecord, ToolRecord,
};
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

type PendingOp = Box<dyn FnOnce(&mut Project)>;

/// One modelling session: settings, record lists, results
///
/// The session lists alias the records resolved from the document. Tasks
/// reference tools and processes by handle; removing a referenced record
/// prunes the task on the same update.
pub struct Project {
    resolver: CategoryResolver,
    bridge: SettingsBridge,
    collection: ToolpathCollection,
    runner: JobRunner,
    engine: Box<dyn ToolpathEngine>,
    tools: Vec<Shared<ToolRecord>>,
    processes: Vec<Shared<ProcessRecord>>,
    tasks: Vec<Shared<TaskRecord>>,
    update_active: bool,
    pending: VecDeque<PendingOp>,
}

impl Project {
    /// Creates a session from the builtin default settings.
    pub fn new(engine: Box<dyn ToolpathEngine>) -> Self {
        let mut resolver = CategoryResolver::with_defaults();
        let tools = resolver.tools();
        let processes = resolver.processes();
        let tasks = resolver.tasks();
        Self {
            resolver,
            bridge: SettingsBridge::new(),
            collection: ToolpathCollection::new(),
            runner: JobRunner::new(),
            engine,
            tools,
            processes,
            tasks,
            update_active: false,
            pending: VecDeque::new(),
        }
    }

    /// The session tool table.
    pub fn tools(&self) -> &[Shared<ToolRecord>] {
        &self.tools
    }

    /// The session process table.
    pub fn processes(&self) -> &[Shared<ProcessRecord>] {
        &self.processes
    }

    /// The session task table.
    pub fn tasks(&self) -> &[Shared<TaskRecord>] {
        &self.tasks
    }

    /// The typed settings registry.
    pub fn bridge(&self) -> &SettingsBridge {
        &self.bridge
    }

    /// The typed settings registry, for writes.
    pub fn bridge_mut(&mut self) -> &mut SettingsBridge {
        &mut self.bridge
    }

    /// The generated toolpath store.
    pub fn toolpaths(&self) -> &ToolpathCollection {
        &self.collection
    }

    /// The generated toolpath store, for visibility and list edits.
    pub fn toolpaths_mut(&mut self) -> &mut ToolpathCollection {
        &mut self.collection
    }

    /// True while a generation run is in flight.
    pub fn is_generating(&self) -> bool {
        self.runner.is_running()
    }

    /// The cancel token for generation runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.runner.cancel_token()
    }

    /// Runs `operation` now, or queues it while an update is active.
    ///
    /// Queued operations run in request order, strictly after the active
    /// operation and everything queued before them; they never interleave.
    pub fn enqueue<F>(&mut self, operation: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        if self.update_active {
            debug!(pending = self.pending.len() + 1, "operation queued behind active update");
            self.pending.push_back(Box::new(operation));
            return;
        }
        self.update_active = true;
        operation(self);
        self.update_active = false;
        while let Some(next) = self.pending.pop_front() {
            self.update_active = true;
            next(self);
            self.update_active = false;
        }
    }

    /// Loads a task settings document, replacing the session lists.
    ///
    /// A load failure leaves the previous document and lists untouched.
    pub fn load_task_settings(&mut self, path: &Path) -> Result<(), DocumentError> {
        self.resolver.load_file(path)?;
        self.enqueue(|project| project.refresh_lists());
        Ok(())
    }

    /// Parses task settings from text, replacing the session lists.
    pub fn apply_task_settings(&mut self, text: &str) -> Result<(), DocumentError> {
        self.resolver.load(text)?;
        self.enqueue(|project| project.refresh_lists());
        Ok(())
    }

    /// Writes the session lists back into the document and saves it.
    ///
    /// Task references are stored positionally against the current lists,
    /// so load order equals session order.
    pub fn save_task_settings(&mut self, path: &Path) -> Result<(), DocumentError> {
        let document = document_from_records(&self.tools, &self.processes, &self.tasks);
        self.resolver.replace_document(document);
        self.resolver.save_file(path)?;
        info!(path = %path.display(), "task settings saved");
        Ok(())
    }

    /// Applies preferences from a file to the settings registry.
    pub fn load_preferences(&mut self, path: &Path) -> SettingsResult<()> {
        let preferences = Preferences::load_from_file(path)?;
        preferences.apply_to(&mut self.bridge);
        Ok(())
    }

    /// Captures the settings registry into a preferences file.
    pub fn save_preferences(&self, path: &Path) -> SettingsResult<()> {
        Preferences::capture_from(&self.bridge).save_to_file(path)
    }

    /// Removes the tool at `index` and prunes tasks that referenced it.
    pub fn remove_tool(&mut self, index: usize) {
        self.enqueue(move |project| {
            if index < project.tools.len() {
                project.tools.remove(index);
                project.prune_tasks();
            }
        });
    }

    /// Removes the process at `index` and prunes tasks that referenced it.
    pub fn remove_process(&mut self, index: usize) {
        self.enqueue(move |project| {
            if index < project.processes.len() {
                project.processes.remove(index);
                project.prune_tasks();
            }
        });
    }

    /// Removes the task at `index`.
    pub fn remove_task(&mut self, index: usize) {
        self.enqueue(move |project| {
            if index < project.tasks.len() {
                project.tasks.remove(index);
            }
        });
    }

    /// Moves the tool at `index` one position towards the front.
    pub fn move_tool_up(&mut self, index: usize) {
        self.enqueue(move |project| swap_up(&mut project.tools, index));
    }

    /// Moves the tool at `index` one position towards the back.
    pub fn move_tool_down(&mut self, index: usize) {
        self.enqueue(move |project| swap_down(&mut project.tools, index));
    }

    /// Moves the process at `index` one position towards the front.
    pub fn move_process_up(&mut self, index: usize) {
        self.enqueue(move |project| swap_up(&mut project.processes, index));
    }

    /// Moves the process at `index` one position towards the back.
    pub fn move_process_down(&mut self, index: usize) {
        self.enqueue(move |project| swap_down(&mut project.processes, index));
    }

    /// Moves the task at `index` one position towards the front.
    pub fn move_task_up(&mut self, index: usize) {
        self.enqueue(move |project| swap_up(&mut project.tasks, index));
    }

    /// Moves the task at `index` one position towards the back.
    pub fn move_task_down(&mut self, index: usize) {
        self.enqueue(move |project| swap_down(&mut project.tasks, index));
    }

    /// Flips the enable switch of the task at `index`.
    pub fn toggle_task_enabled(&mut self, index: usize) {
        self.enqueue(move |project| {
            if let Some(task) = project.tasks.get(index) {
                let mut task = task.borrow_mut();
                let enabled = task.enabled.unwrap_or(false);
                task.enabled = Some(!enabled);
            }
        });
    }

    /// Generates the toolpath for the task at `index`.
    pub fn generate_toolpath(
        &mut self,
        index: usize,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        let Some(task) = self.tasks.get(index).cloned() else {
            return Err(JobError::Other {
                message: format!("no task at index {}", index),
            });
        };
        self.runner.run_task(
            &task,
            &self.tools,
            &self.bridge,
            &mut self.collection,
            self.engine.as_ref(),
            sink,
        )
    }

    /// Runs every enabled task in session order.
    pub fn generate_all_toolpaths(
        &mut self,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome, JobError> {
        self.runner.run_all(
            &self.tasks,
            &self.tools,
            &self.bridge,
            &mut self.collection,
            self.engine.as_ref(),
            sink,
        )
    }

    /// Re-fetches the session lists from the resolver.
    fn refresh_lists(&mut self) {
        self.tools = self.resolver.tools();
        self.processes = self.resolver.processes();
        self.tasks = self.resolver.tasks();
        self.prune_tasks();
    }

    /// Drops tasks whose tool or process handle left the session lists.
    fn prune_tasks(&mut self) {
        let tools = &self.tools;
        let processes = &self.processes;
        let before = self.tasks.len();
        self.tasks.retain(|task| {
            let task = task.borrow();
            let tool_present = task
                .tool
                .as_ref()
                .is_some_and(|tool| tools.iter().any(|candidate| Rc::ptr_eq(candidate, tool)));
            let process_present = task.process.as_ref().is_some_and(|process| {
                processes
                    .iter()
                    .any(|candidate| Rc::ptr_eq(candidate, process))
            });
            tool_present && process_present
        });
        if self.tasks.len() != before {
            debug!(
                removed = before - self.tasks.len(),
                "pruned tasks with dangling references"
            );
        }
    }
}

fn swap_up<T>(list: &mut [Shared<T>], index: usize) {
    if index > 0 && index < list.len() {
        list.swap(index - 1, index);
    }
}

fn swap_down<T>(list: &mut [Shared<T>], index: usize) {
    if index + 1 < list.len() {
        list.swap(index, index + 1);
    }
}
