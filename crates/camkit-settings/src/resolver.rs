//! Category resolution: raw document sections into typed records.
//!
//! Sections are enumerated as `Tool0`, `Tool1`, ... and enumeration stops
//! at the first missing index; later sections are unreachable. Each field
//! is looked up in the specific section first, then in the category's
//! default section. A value that fails coercion (bad float, unknown enum
//! token, unresolvable reference) omits that field only, leaving the rest
//! of the record and the table intact.
//!
//! Tool and process tables resolve first; task records then resolve their
//! `tool`/`process` fields as indexes into those tables and hold shared
//! handles to the records, so record identity carries across tables.
//!
//! Resolved tables are cached per category. Fetches hand out a shallow
//! copy (fresh `Vec`, same handles): callers may reorder or shrink their
//! copy freely without corrupting the cache. The cache is invalidated
//! exactly when the underlying document is replaced.

use crate::document::SettingsDocument;
use crate::records::{Category, ProcessRecord, TaskRecord, ToolRecord};
use camkit_core::{shared, Shared};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Parse the boolean tokens accepted in settings documents.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Field lookup over one indexed section with default-section fallback.
struct SectionView<'a> {
    document: &'a SettingsDocument,
    section: String,
    default_section: String,
}

impl<'a> SectionView<'a> {
    fn new(document: &'a SettingsDocument, category: Category, index: usize) -> Self {
        Self {
            document,
            section: category.section_name(index),
            default_section: category.default_section(),
        }
    }

    fn raw(&self, key: &str) -> Option<&'a str> {
        self.document
            .get(&self.section, key)
            .or_else(|| self.document.get(&self.default_section, key))
    }

    fn text(&self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    fn float(&self, key: &str) -> Option<f64> {
        let raw = self.raw(key)?;
        match raw.trim().parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(section = %self.section, key, raw, "unparsable number, field omitted");
                None
            }
        }
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        let raw = self.raw(key)?;
        let parsed = parse_bool(raw);
        if parsed.is_none() {
            debug!(section = %self.section, key, raw, "unparsable boolean, field omitted");
        }
        parsed
    }

    fn token<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(section = %self.section, key, raw, "unknown token, field omitted");
                None
            }
        }
    }

    /// Resolve an integer index into an already-resolved record table.
    fn reference<T>(&self, key: &str, pool: &[Shared<T>]) -> Option<Shared<T>> {
        let raw = self.raw(key)?;
        let index = match raw.trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                debug!(section = %self.section, key, raw, "non-integer reference, field omitted");
                return None;
            }
        };
        match pool.get(index) {
            Some(record) => Some(record.clone()),
            None => {
                debug!(
                    section = %self.section,
                    key,
                    index,
                    available = pool.len(),
                    "reference out of range, field omitted"
                );
                None
            }
        }
    }
}

/// Resolves and caches typed record tables over a settings document
#[derive(Debug, Default)]
pub struct CategoryResolver {
    document: SettingsDocument,
    tools: Option<Vec<Shared<ToolRecord>>>,
    processes: Option<Vec<Shared<ProcessRecord>>>,
    tasks: Option<Vec<Shared<TaskRecord>>>,
}

impl CategoryResolver {
    /// Creates a resolver over an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver seeded with the built-in baseline document.
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        resolver.load_defaults();
        resolver
    }

    /// Read access to the underlying document.
    pub fn document(&self) -> &SettingsDocument {
        &self.document
    }

    /// Replace the document from text. Caches are invalidated on success.
    pub fn load(&mut self, text: &str) -> Result<(), camkit_core::DocumentError> {
        self.document.load(text)?;
        self.invalidate();
        Ok(())
    }

    /// Replace the document with the built-in baseline.
    pub fn load_defaults(&mut self) {
        self.document.load_defaults();
        self.invalidate();
    }

    /// Replace the document from a file. Caches are invalidated on success.
    pub fn load_file(&mut self, path: &Path) -> Result<(), camkit_core::DocumentError> {
        self.document.load_file(path)?;
        self.invalidate();
        Ok(())
    }

    /// Write the current document to a file.
    pub fn save_file(&self, path: &Path) -> Result<(), camkit_core::DocumentError> {
        self.document.save_file(path)
    }

    /// Replace the document wholesale (used when regenerating from records).
    pub fn replace_document(&mut self, document: SettingsDocument) {
        self.document = document;
        self.invalidate();
    }

    /// Drop all cached tables. The next fetch re-resolves from the document.
    pub fn invalidate(&mut self) {
        self.tools = None;
        self.processes = None;
        self.tasks = None;
    }

    /// The resolved tool table (shallow copy; handles are shared).
    pub fn tools(&mut self) -> Vec<Shared<ToolRecord>> {
        if self.tools.is_none() {
            self.tools = Some(self.build_tools());
        }
        match &self.tools {
            Some(list) => list.clone(),
            None => Vec::new(),
        }
    }

    /// The resolved process table (shallow copy; handles are shared).
    pub fn processes(&mut self) -> Vec<Shared<ProcessRecord>> {
        if self.processes.is_none() {
            self.processes = Some(self.build_processes());
        }
        match &self.processes {
            Some(list) => list.clone(),
            None => Vec::new(),
        }
    }

    /// The resolved task table (shallow copy; handles are shared).
    ///
    /// Tool and process tables resolve first so task references can be
    /// taken against them.
    pub fn tasks(&mut self) -> Vec<Shared<TaskRecord>> {
        let tools = self.tools();
        let processes = self.processes();
        if self.tasks.is_none() {
            self.tasks = Some(self.build_tasks(&tools, &processes));
        }
        match &self.tasks {
            Some(list) => list.clone(),
            None => Vec::new(),
        }
    }

    fn indexed_sections(&self, category: Category) -> usize {
        let mut count = 0;
        while self.document.has_section(&category.section_name(count)) {
            count += 1;
        }
        count
    }

    fn build_tools(&self) -> Vec<Shared<ToolRecord>> {
        let count = self.indexed_sections(Category::Tool);
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            let view = SectionView::new(&self.document, Category::Tool, index);
            records.push(shared(ToolRecord {
                name: view.text("name"),
                shape: view.token("shape"),
                tool_radius: view.float("tool_radius"),
                torus_radius: view.float("torus_radius"),
                feedrate: view.float("feedrate"),
                speed: view.float("speed"),
            }));
        }
        debug!(count = records.len(), "resolved tool table");
        records
    }

    fn build_processes(&self) -> Vec<Shared<ProcessRecord>> {
        let count = self.indexed_sections(Category::Process);
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            let view = SectionView::new(&self.document, Category::Process, index);
            records.push(shared(ProcessRecord {
                name: view.text("name"),
                path_generator: view.token("path_generator"),
                path_postprocessor: view.token("path_postprocessor"),
                path_direction: view.token("path_direction"),
                safety_height: view.float("safety_height"),
                material_allowance: view.float("material_allowance"),
                overlap: view.float("overlap"),
                step_down: view.float("step_down"),
            }));
        }
        debug!(count = records.len(), "resolved process table");
        records
    }

    fn build_tasks(
        &self,
        tools: &[Shared<ToolRecord>],
        processes: &[Shared<ProcessRecord>],
    ) -> Vec<Shared<TaskRecord>> {
        let count = self.indexed_sections(Category::Task);
        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            let view = SectionView::new(&self.document, Category::Task, index);
            records.push(shared(TaskRecord {
                tool: view.reference("tool", tools),
                process: view.reference("process", processes),
                enabled: view.boolean("enabled"),
            }));
        }
        debug!(count = records.len(), "resolved task table");
        records
    }
}
