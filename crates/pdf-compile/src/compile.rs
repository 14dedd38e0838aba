//! Compile orchestration
//!
//! settings → geometry → layout plan → canvas → PDF bytes. Any error aborts
//! the run and nothing is written.

use crate::constants::PRODUCT_NAME;
use crate::layout::{Geometry, LayoutPlan, TocEntry};
use crate::project::Project;
use crate::render::{self, DocumentInfo, RenderContext};
use crate::settings::CompileSettings;
use crate::types::*;
use chrono::{DateTime, Local, NaiveDate};
use std::fmt;
use std::path::{Path, PathBuf};

/// Stage of a compile run, as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub enum CompilePhase {
    Initializing,
    /// `index` is 0-based
    ProcessingCapture { index: usize, total: usize },
    BuildingToc,
    GeneratingOutput,
    Done,
    Failed(String),
}

impl CompilePhase {
    pub fn percent(&self) -> f32 {
        match self {
            CompilePhase::Initializing => 0.0,
            CompilePhase::ProcessingCapture { index, total } => {
                if *total == 0 {
                    0.0
                } else {
                    *index as f32 / *total as f32 * 90.0
                }
            }
            CompilePhase::BuildingToc => 95.0,
            CompilePhase::GeneratingOutput | CompilePhase::Done => 100.0,
            CompilePhase::Failed(_) => 0.0,
        }
    }
}

impl fmt::Display for CompilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilePhase::Initializing => write!(f, "Initializing..."),
            CompilePhase::ProcessingCapture { index, total } => {
                write!(f, "Processing page {} of {}...", index + 1, total)
            }
            CompilePhase::BuildingToc => write!(f, "Building table of contents..."),
            CompilePhase::GeneratingOutput => write!(f, "Generating PDF..."),
            CompilePhase::Done => write!(f, "Done!"),
            CompilePhase::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileProgress {
    pub percent: f32,
    pub phase: CompilePhase,
}

impl CompileProgress {
    pub fn new(phase: CompilePhase) -> Self {
        Self {
            percent: phase.percent(),
            phase,
        }
    }
}

/// A finished PDF held in memory
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Entries with final page numbers, whether or not a TOC was drawn
    pub toc_entries: Vec<TocEntry>,
}

/// Compile a project synchronously.
///
/// `generated_at` is the timestamp printed in footers, the TOC and the cover.
pub fn compile_project(
    project: &Project,
    settings: &CompileSettings,
    generated_at: DateTime<Local>,
    progress: &mut dyn FnMut(CompileProgress),
) -> Result<CompiledDocument> {
    progress(CompileProgress::new(CompilePhase::Initializing));
    let result = run_compile(project, settings, generated_at, progress);
    match &result {
        Ok(document) => {
            log::info!(
                "Compiled \"{}\": {} capture(s), {} page(s)",
                project.name,
                project.pages.len(),
                document.page_count
            );
            progress(CompileProgress::new(CompilePhase::Done));
        }
        Err(e) => {
            log::error!("Compile of \"{}\" failed: {}", project.name, e);
            progress(CompileProgress::new(CompilePhase::Failed(e.to_string())));
        }
    }
    result
}

fn run_compile(
    project: &Project,
    settings: &CompileSettings,
    generated_at: DateTime<Local>,
    progress: &mut dyn FnMut(CompileProgress),
) -> Result<CompiledDocument> {
    if project.pages.is_empty() {
        return Err(CompileError::EmptyProject);
    }
    settings.validate()?;
    let geometry = Geometry::from_settings(settings)?;
    log::info!(
        "Compiling \"{}\" ({} capture(s), {})",
        project.name,
        project.pages.len(),
        settings.paper_size.label()
    );

    let plan = LayoutPlan::for_project(project, settings, &geometry)?;
    log::debug!(
        "Layout: {} page(s), {} TOC page(s), cover {}",
        plan.total_pages(),
        plan.toc_page_count,
        plan.has_cover
    );

    let ctx = RenderContext {
        project,
        settings,
        geometry: &geometry,
        plan: &plan,
        generated_at,
    };
    let canvas = render::render_plan(&ctx, progress)?;

    progress(CompileProgress::new(CompilePhase::GeneratingOutput));
    let info = DocumentInfo {
        title: project.name.clone(),
        subject: format!("{} pages", project.pages.len()),
        creator: PRODUCT_NAME.to_string(),
        created: generated_at,
    };
    let document = render::write_document(&canvas, &info)?;
    let bytes = render::document_bytes(document)?;

    Ok(CompiledDocument {
        filename: output_filename(&project.name, generated_at.date_naive()),
        bytes,
        page_count: plan.total_pages(),
        toc_entries: plan.toc_entries,
    })
}

/// Compile on the blocking thread pool
pub async fn compile<F>(project: Project, settings: CompileSettings, mut progress: F) -> Result<CompiledDocument>
where
    F: FnMut(CompileProgress) + Send + 'static,
{
    let generated_at = Local::now();
    tokio::task::spawn_blocking(move || {
        compile_project(&project, &settings, generated_at, &mut progress)
    })
    .await?
}

/// Compile and write the PDF into `dir`; returns the written path
pub async fn compile_to_dir<F>(
    project: Project,
    settings: CompileSettings,
    dir: impl AsRef<Path>,
    progress: F,
) -> Result<(PathBuf, CompiledDocument)>
where
    F: FnMut(CompileProgress) + Send + 'static,
{
    let document = compile(project, settings, progress).await?;
    let path = dir.as_ref().join(&document.filename);
    tokio::fs::write(&path, &document.bytes).await?;
    log::info!("Wrote {}", path.display());
    Ok((path, document))
}

/// Replace everything outside `[A-Za-z0-9_-]` with an underscore
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<sanitized name>_YYYY-MM-DD.pdf`
pub fn output_filename(name: &str, date: NaiveDate) -> String {
    format!("{}_{}.pdf", sanitize_name(name), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(output_filename("My Project: v2", date), "My_Project__v2_2024-03-09.pdf");
        assert_eq!(output_filename("ok_name-1", date), "ok_name-1_2024-03-09.pdf");
    }

    #[test]
    fn test_phase_labels_and_percent() {
        let phase = CompilePhase::ProcessingCapture { index: 1, total: 4 };
        assert_eq!(phase.to_string(), "Processing page 2 of 4...");
        assert!((phase.percent() - 22.5).abs() < 1e-4);
        assert_eq!(CompilePhase::BuildingToc.percent(), 95.0);
        assert_eq!(CompilePhase::Failed("boom".into()).to_string(), "Error: boom");
    }
}
