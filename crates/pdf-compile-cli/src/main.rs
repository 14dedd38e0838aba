mod logger;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_async_runtime::{PdfCommand, PdfUpdate};
use pdf_compile::{CaptureMode, CompileSettings, FileStore, PaperSize, RawCapture, Session};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "wpc", about = "Compile captured web pages into a PDF", version)]
struct Cli {
    /// Directory holding projects and settings
    #[arg(long, global = true, default_value = ".wpc")]
    store: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage the pages of the selected project
    #[command(subcommand)]
    Page(PageCommand),

    /// Show or change compile settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Compile the selected project into a PDF
    Compile {
        /// Directory the PDF is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// One-off setting overrides (not saved)
        #[command(flatten)]
        overrides: SettingsArgs,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Create a project and select it
    New { name: String },
    /// List projects, newest first
    List,
    /// Select a project by id
    Select { id: String },
    /// Rename a project
    Rename { id: String, name: String },
    /// Delete a project
    Delete { id: String },
    /// Copy a project and select the copy
    Clone { id: String },
    /// Export the selected project to a JSON file
    Export {
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Import a project from an export file
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum PageCommand {
    /// Add a captured image to the selected project
    Add {
        /// PNG, JPEG or WebP screenshot
        image: PathBuf,

        /// Page title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,

        /// Source URL of the page
        #[arg(long, default_value = "")]
        url: String,

        #[arg(long, default_value = "visible", value_enum)]
        mode: ModeArg,
    },
    /// List pages in document order
    List,
    /// Set a custom title; omit the title to clear it
    Rename { index: usize, title: Option<String> },
    /// Move a page to a new position
    Move { from: usize, to: usize },
    /// Remove a page
    Remove { index: usize },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the stored settings
    Show,
    /// Change stored settings
    Set(SettingsArgs),
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Page margin in CSS pixels
    #[arg(long)]
    margins: Option<f32>,

    /// Vertical overlap between slices in CSS pixels
    #[arg(long)]
    overlap: Option<f32>,

    /// JPEG quality of page slices (0.5 - 1.0)
    #[arg(long)]
    pdf_quality: Option<f32>,

    /// JPEG quality of stored captures (0.5 - 1.0)
    #[arg(long)]
    image_quality: Option<f32>,

    /// Downscale captures wider than this on ingest
    #[arg(long)]
    max_width: Option<u32>,

    #[arg(long)]
    headers: Option<bool>,

    #[arg(long)]
    page_numbers: Option<bool>,

    #[arg(long)]
    toc: Option<bool>,

    #[arg(long)]
    cover: Option<bool>,

    #[arg(long)]
    author: Option<String>,

    /// Watermark text; an empty string disables it
    #[arg(long)]
    watermark: Option<String>,

    #[arg(long)]
    separators: Option<bool>,
}

impl SettingsArgs {
    fn apply(self, mut settings: CompileSettings) -> CompileSettings {
        if let Some(paper) = self.paper {
            settings.paper_size = paper.into();
        }
        if let Some(margins) = self.margins {
            settings.margin_px = margins;
        }
        if let Some(overlap) = self.overlap {
            settings.overlap_px = overlap;
        }
        if let Some(quality) = self.pdf_quality {
            settings.pdf_image_quality = quality;
        }
        if let Some(quality) = self.image_quality {
            settings.image_quality = quality;
        }
        if let Some(width) = self.max_width {
            settings.compress_max_width = width;
        }
        if let Some(headers) = self.headers {
            settings.include_headers = headers;
        }
        if let Some(numbers) = self.page_numbers {
            settings.include_page_numbers = numbers;
        }
        if let Some(toc) = self.toc {
            settings.include_toc = toc;
        }
        if let Some(cover) = self.cover {
            settings.include_cover_page = cover;
        }
        if let Some(author) = self.author {
            settings.cover_author = author;
        }
        if let Some(watermark) = self.watermark {
            settings.watermark_text = watermark;
        }
        if let Some(separators) = self.separators {
            settings.page_break_separator = separators;
        }
        settings
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
    Legal,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Visible,
    Full,
}

impl From<ModeArg> for CaptureMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Visible => Self::Visible,
            ModeArg::Full => Self::FullPage,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::new(cli.verbose).init()?;

    let mut session = Session::open(FileStore::new(&cli.store))
        .await
        .with_context(|| format!("Failed to open store at {}", cli.store.display()))?;

    match cli.command {
        Commands::Project(cmd) => run_project(&mut session, cmd).await?,
        Commands::Page(cmd) => run_page(&mut session, cmd).await?,
        Commands::Settings(SettingsCommand::Show) => {
            let settings = session.settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::Settings(SettingsCommand::Set(args)) => {
            let settings = args.apply(session.settings().await?);
            settings.validate()?;
            let stored = session.update_settings(settings).await?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Commands::Compile {
            output_dir,
            overrides,
        } => {
            let project = session.active_project().await?;
            let settings = overrides.apply(session.settings().await?).clamped();
            compile(project, settings, output_dir).await?;
        }
    }

    Ok(())
}

async fn run_project(session: &mut Session<FileStore>, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::New { name } => {
            let project = session.create_project(&name).await?;
            println!("Created \"{}\" ({})", project.name, project.id);
        }
        ProjectCommand::List => {
            let active = session.active_project_id().map(str::to_string);
            for project in session.list_projects().await? {
                let marker = if active.as_deref() == Some(project.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {}  ({} pages, created {})",
                    marker,
                    project.id,
                    project.name,
                    project.pages.len(),
                    project.created.format("%Y-%m-%d")
                );
            }
        }
        ProjectCommand::Select { id } => {
            session.select_project(&id).await?;
            println!("Selected {}", id);
        }
        ProjectCommand::Rename { id, name } => {
            session.rename_project(&id, &name).await?;
        }
        ProjectCommand::Delete { id } => {
            let removed = session.delete_project(&id).await?;
            println!("Deleted \"{}\"", removed.name);
        }
        ProjectCommand::Clone { id } => {
            let copy = session.clone_project(&id).await?;
            println!("Created \"{}\" ({})", copy.name, copy.id);
        }
        ProjectCommand::Export { output_dir } => {
            let project = session.active_project().await?;
            let update = run_worker(PdfCommand::ExportProject {
                project,
                output_dir,
            })
            .await?;
            match update {
                PdfUpdate::Exported { path } => println!("Exported → {}", path.display()),
                other => bail!("Unexpected worker response: {:?}", other),
            }
        }
        ProjectCommand::Import { path } => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let project = session.import(&json).await?;
            println!(
                "Imported \"{}\" with {} pages ({})",
                project.name,
                project.pages.len(),
                project.id
            );
        }
    }
    Ok(())
}

async fn run_page(session: &mut Session<FileStore>, cmd: PageCommand) -> Result<()> {
    match cmd {
        PageCommand::Add {
            image,
            title,
            url,
            mode,
        } => {
            let image_bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let raw = RawCapture {
                image_bytes,
                captured_at: Utc::now(),
                title: title.unwrap_or_else(|| file_title(&image)),
                url,
            };
            let page = session.add_capture(raw, mode.into()).await?;
            println!("Added \"{}\" ({}x{})", page.title, page.width, page.height);
        }
        PageCommand::List => {
            let project = session.active_project().await?;
            println!("{}", project.name);
            for (i, page) in project.pages.iter().enumerate() {
                println!(
                    "{:>3}  {}  {}x{}  {}",
                    i,
                    page.display_title(),
                    page.width,
                    page.height,
                    page.url
                );
            }
        }
        PageCommand::Rename { index, title } => {
            session.rename_page(index, title.as_deref()).await?;
        }
        PageCommand::Move { from, to } => {
            session.move_page(from, to).await?;
        }
        PageCommand::Remove { index } => {
            let removed = session.remove_page(index).await?;
            println!("Removed \"{}\"", removed.display_title());
        }
    }
    Ok(())
}

async fn compile(
    project: pdf_compile::Project,
    settings: CompileSettings,
    output_dir: PathBuf,
) -> Result<()> {
    let (command_tx, mut update_rx) = pdf_async_runtime::spawn_worker();
    command_tx.send(PdfCommand::Compile {
        project,
        settings,
        output_dir,
    })?;
    drop(command_tx);

    while let Some(update) = update_rx.recv().await {
        match update {
            PdfUpdate::Progress { progress, .. } => {
                eprintln!("[{:>3.0}%] {}", progress.percent, progress.phase);
            }
            PdfUpdate::CompileComplete {
                path, page_count, ..
            } => {
                println!("Compiled {} pages → {}", page_count, path.display());
                return Ok(());
            }
            PdfUpdate::Error { message } => bail!(message),
            other => log::debug!("Ignoring worker update {:?}", other),
        }
    }
    bail!("Worker stopped before the compile finished")
}

/// Send one command and wait for its non-progress reply
async fn run_worker(command: PdfCommand) -> Result<PdfUpdate> {
    let (command_tx, mut update_rx) = pdf_async_runtime::spawn_worker();
    command_tx.send(command)?;
    drop(command_tx);
    while let Some(update) = update_rx.recv().await {
        match update {
            PdfUpdate::Progress { .. } => continue,
            PdfUpdate::Error { message } => bail!(message),
            other => return Ok(other),
        }
    }
    bail!("Worker stopped without replying")
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}
