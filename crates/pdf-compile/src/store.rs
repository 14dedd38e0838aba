//! Project persistence and the application session
//!
//! A `ProjectStore` is a key-value namespace holding every project, the
//! active project id and the compile settings. `Session` is the explicit
//! session context built on top of a store: it owns the current selection and
//! implements project and page management.

use crate::compile::{self, CompileProgress, CompiledDocument};
use crate::interchange::{export_filename, export_project, import_project};
use crate::project::{PageCapture, Project, RawCapture};
use crate::settings::CompileSettings;
use crate::types::*;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Projects keyed by id
pub type ProjectMap = BTreeMap<String, Project>;

pub const DEFAULT_PROJECT_NAME: &str = "My Project";

#[allow(async_fn_in_trait)]
pub trait ProjectStore {
    async fn load_projects(&self) -> Result<ProjectMap>;
    async fn save_projects(&self, projects: &ProjectMap) -> Result<()>;
    async fn active_project_id(&self) -> Result<Option<String>>;
    async fn set_active_project_id(&self, id: Option<&str>) -> Result<()>;
    async fn load_settings(&self) -> Result<CompileSettings>;
    async fn save_settings(&self, settings: &CompileSettings) -> Result<()>;
}

// =============================================================================
// File store
// =============================================================================

const PROJECTS_FILE: &str = "projects.json";
const ACTIVE_PROJECT_FILE: &str = "active_project";
const SETTINGS_FILE: &str = "settings.json";

/// Store backed by JSON files in one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, bytes: impl AsRef<[u8]>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), bytes).await?;
        Ok(())
    }
}

impl ProjectStore for FileStore {
    async fn load_projects(&self) -> Result<ProjectMap> {
        match self.read_optional(PROJECTS_FILE).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(ProjectMap::new()),
        }
    }

    async fn save_projects(&self, projects: &ProjectMap) -> Result<()> {
        let json = serde_json::to_vec(projects)?;
        self.write(PROJECTS_FILE, json).await
    }

    async fn active_project_id(&self) -> Result<Option<String>> {
        let id = self
            .read_optional(ACTIVE_PROJECT_FILE)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .filter(|id| !id.is_empty());
        Ok(id)
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> Result<()> {
        self.write(ACTIVE_PROJECT_FILE, id.unwrap_or_default()).await
    }

    async fn load_settings(&self) -> Result<CompileSettings> {
        let path = self.dir.join(SETTINGS_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(CompileSettings::default());
        }
        CompileSettings::load(path).await
    }

    async fn save_settings(&self, settings: &CompileSettings) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        settings.save(self.dir.join(SETTINGS_FILE)).await
    }
}

// =============================================================================
// Memory store
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    projects: ProjectMap,
    active: Option<String>,
    settings: CompileSettings,
}

/// Store kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    async fn load_projects(&self) -> Result<ProjectMap> {
        Ok(self.state.lock().await.projects.clone())
    }

    async fn save_projects(&self, projects: &ProjectMap) -> Result<()> {
        self.state.lock().await.projects = projects.clone();
        Ok(())
    }

    async fn active_project_id(&self) -> Result<Option<String>> {
        Ok(self.state.lock().await.active.clone())
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> Result<()> {
        self.state.lock().await.active = id.map(str::to_string);
        Ok(())
    }

    async fn load_settings(&self) -> Result<CompileSettings> {
        Ok(self.state.lock().await.settings.clone())
    }

    async fn save_settings(&self, settings: &CompileSettings) -> Result<()> {
        self.state.lock().await.settings = settings.clone();
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// Application session: a store plus the current project selection
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    active: Option<String>,
}

impl<S: ProjectStore> Session<S> {
    /// Open a session, creating or re-selecting a project as needed
    pub async fn open(store: S) -> Result<Self> {
        let active = store.active_project_id().await?;
        let mut session = Self { store, active };
        session.ensure_default_project().await?;
        Ok(session)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Guarantee that at least one project exists and one is selected.
    ///
    /// An empty store gets a default project. A missing or stale selection
    /// falls back to the most recently created project.
    pub async fn ensure_default_project(&mut self) -> Result<()> {
        let mut projects = self.store.load_projects().await?;
        if projects.is_empty() {
            let project = Project::new(DEFAULT_PROJECT_NAME);
            let id = project.id.clone();
            projects.insert(id.clone(), project);
            self.store.save_projects(&projects).await?;
            log::info!("Created default project {}", id);
            return self.set_active(Some(id)).await;
        }

        let selected = self
            .active
            .as_ref()
            .is_some_and(|id| projects.contains_key(id));
        if !selected {
            let newest = most_recent(&projects).map(|project| project.id.clone());
            self.set_active(newest).await?;
        }
        Ok(())
    }

    async fn set_active(&mut self, id: Option<String>) -> Result<()> {
        self.store.set_active_project_id(id.as_deref()).await?;
        self.active = id;
        Ok(())
    }

    /// All projects, most recently created first
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self.store.load_projects().await?.into_values().collect();
        projects.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(projects)
    }

    pub async fn create_project(&mut self, name: &str) -> Result<Project> {
        let project = Project::new(valid_name(name)?);
        let mut projects = self.store.load_projects().await?;
        projects.insert(project.id.clone(), project.clone());
        self.store.save_projects(&projects).await?;
        self.set_active(Some(project.id.clone())).await?;
        log::info!("Created project \"{}\"", project.name);
        Ok(project)
    }

    pub async fn select_project(&mut self, id: &str) -> Result<()> {
        let projects = self.store.load_projects().await?;
        if !projects.contains_key(id) {
            return Err(CompileError::ProjectNotFound(id.to_string()));
        }
        self.set_active(Some(id.to_string())).await
    }

    pub async fn rename_project(&mut self, id: &str, name: &str) -> Result<()> {
        let name = valid_name(name)?;
        let mut projects = self.store.load_projects().await?;
        let project = projects
            .get_mut(id)
            .ok_or_else(|| CompileError::ProjectNotFound(id.to_string()))?;
        project.name = name;
        self.store.save_projects(&projects).await
    }

    /// Delete a project; a deleted selection moves to another project
    pub async fn delete_project(&mut self, id: &str) -> Result<Project> {
        let mut projects = self.store.load_projects().await?;
        let removed = projects
            .remove(id)
            .ok_or_else(|| CompileError::ProjectNotFound(id.to_string()))?;
        self.store.save_projects(&projects).await?;
        log::info!("Deleted project \"{}\"", removed.name);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.ensure_default_project().await?;
        Ok(removed)
    }

    /// Copy a project with fresh ids and select the copy
    pub async fn clone_project(&mut self, id: &str) -> Result<Project> {
        let mut projects = self.store.load_projects().await?;
        let source = projects
            .get(id)
            .ok_or_else(|| CompileError::ProjectNotFound(id.to_string()))?;
        let mut cloned = source.with_fresh_ids();
        cloned.name = format!("{} (copy)", source.name);
        cloned.created = Utc::now();
        projects.insert(cloned.id.clone(), cloned.clone());
        self.store.save_projects(&projects).await?;
        self.set_active(Some(cloned.id.clone())).await?;
        Ok(cloned)
    }

    pub async fn active_project(&self) -> Result<Project> {
        let id = self.active.as_ref().ok_or(CompileError::NoActiveProject)?;
        self.store
            .load_projects()
            .await?
            .remove(id)
            .ok_or(CompileError::NoActiveProject)
    }

    async fn update_active<T>(&mut self, update: impl FnOnce(&mut Project) -> Result<T>) -> Result<T> {
        let id = self.active.clone().ok_or(CompileError::NoActiveProject)?;
        let mut projects = self.store.load_projects().await?;
        let project = projects.get_mut(&id).ok_or(CompileError::NoActiveProject)?;
        let value = update(project)?;
        self.store.save_projects(&projects).await?;
        Ok(value)
    }

    /// Ingest a capture and append it to the active project
    pub async fn add_capture(&mut self, raw: RawCapture, mode: CaptureMode) -> Result<PageCapture> {
        let settings = self.settings().await?;
        let page = tokio::task::spawn_blocking(move || PageCapture::ingest(raw, mode, &settings)).await??;
        let stored = page.clone();
        self.update_active(move |project| {
            log::info!("Added \"{}\" to \"{}\"", stored.title, project.name);
            project.pages.push(stored);
            Ok(())
        })
        .await?;
        Ok(page)
    }

    /// Set or clear (with `None` or a blank title) the custom title of a page
    pub async fn rename_page(&mut self, index: usize, title: Option<&str>) -> Result<()> {
        let title = title.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        self.update_active(|project| {
            project.page_mut(index)?.custom_title = title;
            Ok(())
        })
        .await
    }

    pub async fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        self.update_active(|project| project.move_page(from, to)).await
    }

    pub async fn remove_page(&mut self, index: usize) -> Result<PageCapture> {
        self.update_active(|project| project.remove_page(index)).await
    }

    /// Export the active project; returns the suggested file name and the JSON
    pub async fn export_active(&self) -> Result<(String, String)> {
        let project = self.active_project().await?;
        let json = export_project(&project)?;
        Ok((export_filename(&project.name), json))
    }

    /// Import an export file as a new project and select it
    pub async fn import(&mut self, json: &str) -> Result<Project> {
        let imported = import_project(json)?;
        let mut projects = self.store.load_projects().await?;
        projects.insert(imported.id.clone(), imported.clone());
        self.store.save_projects(&projects).await?;
        self.set_active(Some(imported.id.clone())).await?;
        log::info!(
            "Imported \"{}\" ({} pages)",
            imported.name,
            imported.pages.len()
        );
        Ok(imported)
    }

    pub async fn settings(&self) -> Result<CompileSettings> {
        self.store.load_settings().await
    }

    /// Clamp and persist new settings; returns what was stored
    pub async fn update_settings(&self, settings: CompileSettings) -> Result<CompileSettings> {
        let settings = settings.clamped();
        self.store.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Compile the active project with the stored settings
    pub async fn compile_active<F>(&self, progress: F) -> Result<CompiledDocument>
    where
        F: FnMut(CompileProgress) + Send + 'static,
    {
        let project = self.active_project().await?;
        let settings = self.settings().await?;
        compile::compile(project, settings, progress).await
    }
}

fn valid_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CompileError::config("name", "name cannot be empty"));
    }
    Ok(name.to_string())
}

fn most_recent(projects: &ProjectMap) -> Option<&Project> {
    projects.values().max_by_key(|project| project.created)
}
