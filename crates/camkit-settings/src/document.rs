//! Settings document storage.
//!
//! A settings document is a list of named sections, each holding a flat
//! key/value map of strings. The text form is INI-like: `[Section]`
//! headers, `key: value` (or `key = value`) lines, `#`/`;` comments. This
//! layer stores raw strings only; coercion into typed records happens in
//! the resolver.
//!
//! Loading is transactional: a document that fails to parse leaves the
//! previously loaded state untouched.

use camkit_core::DocumentError;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// The built-in baseline: three example tools, processes and tasks plus
/// per-category default sections.
pub const DEFAULT_DOCUMENT: &str = r#"
[ToolDefault]
torus_radius: 0.25
feedrate: 1000
speed: 200

[Tool0]
name: Cylindrical (3 inch)
shape: CylindricalCutter
tool_radius: 3

[Tool1]
name: Spherical (0.1 inch)
shape: SphericalCutter
tool_radius: 1

[Tool2]
name: Toroidal (2 inch)
shape: ToroidalCutter
tool_radius: 2
torus_radius: 0.2

[ProcessDefault]
path_direction: x
safety_height: 5
step_down: 1

[Process0]
name: Rough
path_generator: PushCutter
path_postprocessor: PolygonCutter
material_allowance: 0.5
step_down: 0.8
overlap: 0

[Process1]
name: Semi-finish
path_generator: PushCutter
path_postprocessor: ContourCutter
material_allowance: 0.2
step_down: 0.5
overlap: 20

[Process2]
name: Finish
path_generator: DropCutter
path_postprocessor: ZigZagCutter
material_allowance: 0.0
overlap: 60

[TaskDefault]
enabled: 1

[Task0]
tool: 0
process: 0

[Task1]
tool: 2
process: 1

[Task2]
tool: 1
process: 2
"#;

#[derive(Debug, Clone, Default, PartialEq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

/// A parsed settings document: named sections of raw key/value strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    sections: Vec<Section>,
}

impl SettingsDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document holding the built-in baseline.
    pub fn with_defaults() -> Self {
        let mut document = Self::new();
        document.load_defaults();
        document
    }

    /// True when no sections are loaded.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section names in document order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// True when a section with this name exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    /// The raw string value for `key` in `section`.
    ///
    /// No coercion and no default-section fallback happen here.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .get(key)
    }

    /// Set `key` in `section`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.set(key, value),
            None => {
                let mut fresh = Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                };
                fresh.set(key, value);
                self.sections.push(fresh);
            }
        }
    }

    /// Create an empty section if no section with this name exists.
    ///
    /// Keeps indexed sections contiguous when a record with no present
    /// fields is written out.
    pub fn ensure_section(&mut self, name: &str) {
        if !self.has_section(name) {
            self.sections.push(Section {
                name: name.to_string(),
                entries: Vec::new(),
            });
        }
    }

    /// Remove a section. Returns whether it existed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        self.sections.len() != before
    }

    /// Remove all sections.
    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Parse `text` and replace the current contents with it.
    ///
    /// All sections are replaced on success; on any syntax error the
    /// document keeps its previous contents and the error is returned.
    pub fn load(&mut self, text: &str) -> Result<(), DocumentError> {
        let parsed = Self::parse(text)?;
        self.sections = parsed;
        debug!(sections = self.sections.len(), "settings document loaded");
        Ok(())
    }

    /// Replace the current contents with the built-in baseline.
    pub fn load_defaults(&mut self) {
        self.load(DEFAULT_DOCUMENT)
            .expect("builtin default document must parse");
        info!("settings document reset to builtin defaults");
    }

    fn parse(text: &str) -> Result<Vec<Section>, DocumentError> {
        let mut sections: Vec<Section> = Vec::new();
        let mut current: Option<usize> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .ok_or(DocumentError::UnterminatedHeader { line_number })?
                    .trim();
                if name.is_empty() {
                    return Err(DocumentError::EmptySectionName { line_number });
                }
                // Re-opening a section merges into the earlier one.
                let position = match sections.iter().position(|s| s.name == name) {
                    Some(position) => position,
                    None => {
                        sections.push(Section {
                            name: name.to_string(),
                            entries: Vec::new(),
                        });
                        sections.len() - 1
                    }
                };
                current = Some(position);
                continue;
            }

            let separator = line
                .find([':', '='])
                .ok_or(DocumentError::MissingSeparator { line_number })?;
            let key = line[..separator].trim();
            if key.is_empty() {
                return Err(DocumentError::EmptyKey { line_number });
            }
            let value = line[separator + 1..].trim().to_string();

            match current {
                Some(position) => sections[position].set(key, value),
                None => return Err(DocumentError::KeyOutsideSection { line_number }),
            }
        }

        Ok(sections)
    }

    /// Render the document back to its text form.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (key, value) in &section.entries {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }

    /// Load a document from a file, replacing the current contents.
    ///
    /// I/O and syntax errors both leave the previous contents untouched.
    pub fn load_file(&mut self, path: &Path) -> Result<(), DocumentError> {
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::IoError {
            reason: format!("{}: {}", path.display(), e),
        })?;
        self.load(&text)?;
        info!(path = %path.display(), "settings document loaded from file");
        Ok(())
    }

    /// Write the document to a file.
    pub fn save_file(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_text()).map_err(|e| DocumentError::IoError {
            reason: format!("{}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), "settings document saved");
        Ok(())
    }
}

impl fmt::Display for SettingsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let mut doc = SettingsDocument::new();
        doc.load("[Tool0]\nname: Rough mill\ntool_radius = 3\n# comment\n; other comment\n")
            .unwrap();
        assert!(doc.has_section("Tool0"));
        assert_eq!(doc.get("Tool0", "name"), Some("Rough mill"));
        assert_eq!(doc.get("Tool0", "tool_radius"), Some("3"));
        assert_eq!(doc.get("Tool0", "missing"), None);
        assert_eq!(doc.get("Tool1", "name"), None);
    }

    #[test]
    fn test_load_replaces_everything() {
        let mut doc = SettingsDocument::new();
        doc.load("[A]\nx: 1\n").unwrap();
        doc.load("[B]\ny: 2\n").unwrap();
        assert!(!doc.has_section("A"));
        assert!(doc.has_section("B"));
    }

    #[test]
    fn test_error_keeps_previous_state() {
        let mut doc = SettingsDocument::new();
        doc.load("[A]\nx: 1\n").unwrap();

        let err = doc.load("[A]\nx: 2\nbroken line\n").unwrap_err();
        assert!(matches!(err, DocumentError::MissingSeparator { line_number: 3 }));
        // The failed load must not leak partial state.
        assert_eq!(doc.get("A", "x"), Some("1"));
    }

    #[test]
    fn test_syntax_errors() {
        let mut doc = SettingsDocument::new();
        assert!(matches!(
            doc.load("x: 1\n").unwrap_err(),
            DocumentError::KeyOutsideSection { line_number: 1 }
        ));
        assert!(matches!(
            doc.load("[Broken\n").unwrap_err(),
            DocumentError::UnterminatedHeader { line_number: 1 }
        ));
        assert!(matches!(
            doc.load("[ ]\n").unwrap_err(),
            DocumentError::EmptySectionName { line_number: 1 }
        ));
        assert!(matches!(
            doc.load("[A]\n: value\n").unwrap_err(),
            DocumentError::EmptyKey { line_number: 2 }
        ));
    }

    #[test]
    fn test_duplicate_sections_merge() {
        let mut doc = SettingsDocument::new();
        doc.load("[A]\nx: 1\n[B]\ny: 2\n[A]\nx: 3\nz: 4\n").unwrap();
        assert_eq!(doc.get("A", "x"), Some("3"));
        assert_eq!(doc.get("A", "z"), Some("4"));
        assert_eq!(doc.section_names().count(), 2);
    }

    #[test]
    fn test_defaults_document() {
        let doc = SettingsDocument::with_defaults();
        assert!(doc.has_section("ToolDefault"));
        assert!(doc.has_section("Tool2"));
        assert!(!doc.has_section("Tool3"));
        assert_eq!(doc.get("Tool0", "shape"), Some("CylindricalCutter"));
        assert_eq!(doc.get("ProcessDefault", "safety_height"), Some("5"));
        assert_eq!(doc.get("Task1", "tool"), Some("2"));
        assert_eq!(doc.get("TaskDefault", "enabled"), Some("1"));
    }

    #[test]
    fn test_text_round_trip() {
        let original = SettingsDocument::with_defaults();
        let mut reloaded = SettingsDocument::new();
        reloaded.load(&original.to_text()).unwrap();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_set_creates_section() {
        let mut doc = SettingsDocument::new();
        doc.set("Tool0", "name", "Fresh");
        doc.set("Tool0", "name", "Replaced");
        assert_eq!(doc.get("Tool0", "name"), Some("Replaced"));
        assert!(doc.remove_section("Tool0"));
        assert!(!doc.remove_section("Tool0"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.conf");

        let doc = SettingsDocument::with_defaults();
        doc.save_file(&path).unwrap();

        let mut loaded = SettingsDocument::new();
        loaded.load_file(&path).unwrap();
        assert_eq!(doc, loaded);

        let missing = dir.path().join("absent.conf");
        let err = loaded.load_file(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::IoError { .. }));
        // Contents survive the failed load.
        assert!(loaded.has_section("Tool0"));
    }
}
