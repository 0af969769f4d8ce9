use anyhow::Context;
use camkit::{
    init_logging, Bounds3, FlagKey, FlatSweepEngine, Preferences, Project, ProgressSink,
    RunOutcome, VERSION,
};
use std::path::PathBuf;
use tracing::info;

/// Prints rate-limited progress lines to stdout.
///
/// Status updates arrive on every engine callback and only overwrite the
/// stored line; the printing happens in `refresh`, which the monitor
/// throttles to the configured rate.
#[derive(Default)]
struct ConsoleProgress {
    latest: Option<(String, Option<f64>)>,
}

impl ProgressSink for ConsoleProgress {
    fn begin(&mut self) {
        println!("-- run started");
        self.latest = None;
    }

    fn progress(&mut self, text: Option<&str>, percent: Option<f64>) {
        match (text, self.latest.as_mut()) {
            (Some(text), _) => self.latest = Some((text.to_string(), percent)),
            (None, Some(latest)) => latest.1 = percent.or(latest.1),
            (None, None) => {}
        }
    }

    fn refresh(&mut self) {
        if let Some((text, percent)) = &self.latest {
            match percent {
                Some(fraction) => println!("   {} ({:.0}%)", text, fraction * 100.0),
                None => println!("   {}", text),
            }
        }
    }

    fn end(&mut self) {
        println!("-- run finished");
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!(version = VERSION, "camkit batch run");

    let mut project = Project::new(Box::new(FlatSweepEngine::new()));

    // Preferences are optional; without a file the builtin defaults apply.
    if let Ok(path) = Preferences::default_path() {
        if path.exists() {
            project
                .load_preferences(&path)
                .with_context(|| format!("loading preferences from {}", path.display()))?;
            info!(path = %path.display(), "preferences loaded");
        }
    }

    // An optional argument replaces the builtin task settings.
    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        project
            .load_task_settings(&path)
            .with_context(|| format!("loading task settings from {}", path.display()))?;
        info!(path = %path.display(), "task settings loaded");
    }

    // Demo stock volume; settings documents carry tools and processes,
    // not the part.
    project
        .bridge_mut()
        .set_bounds(Bounds3::new(0.0, 100.0, 0.0, 100.0, -10.0, 0.0));
    project
        .bridge_mut()
        .set_flag(FlagKey::ShowProgressPreview, true);

    let mut sink = ConsoleProgress::default();
    let outcome = project.generate_all_toolpaths(&mut sink)?;

    for (index, result) in project.toolpaths().iter().enumerate() {
        println!(
            "{}. {} | tool #{} | {} segments | cut length {:.1} {}",
            index + 1,
            result.description,
            result.tool_id,
            result.segments.len(),
            result.cut_length(),
            result.unit
        );
    }
    match outcome {
        RunOutcome::Completed => {
            println!("Batch complete: {} toolpath(s).", project.toolpaths().len())
        }
        RunOutcome::Cancelled => println!("Batch cancelled."),
        RunOutcome::AlreadyRunning => {}
    }

    Ok(())
}
