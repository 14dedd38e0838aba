//! Project export/import envelope

use crate::compile::sanitize_name;
use crate::constants::EXPORT_VERSION;
use crate::project::Project;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level JSON document of an exported project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    #[serde(rename = "_wpc_export")]
    pub marker: bool,
    pub version: String,
    /// RFC 3339 timestamp
    pub exported_at: DateTime<Utc>,
    pub project: Project,
}

impl ExportEnvelope {
    pub fn new(project: Project) -> Self {
        Self {
            marker: true,
            version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            project,
        }
    }
}

/// Serialize a project to the export format
pub fn export_project(project: &Project) -> Result<String> {
    let envelope = ExportEnvelope::new(project.clone());
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse an export file into a project with fresh ids.
///
/// The marker and the project are checked before the project is decoded so
/// that foreign JSON gets a clear error.
pub fn import_project(json: &str) -> Result<Project> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| CompileError::InvalidExport(e.to_string()))?;

    if value.get("_wpc_export").and_then(Value::as_bool) != Some(true) {
        return Err(CompileError::InvalidExport(
            "missing export marker".to_string(),
        ));
    }
    let project = value
        .get("project")
        .filter(|project| !project.is_null())
        .ok_or_else(|| CompileError::InvalidExport("missing project".to_string()))?;
    if let Some(version) = value.get("version").and_then(Value::as_str) {
        log::debug!("Importing export format version {}", version);
    }

    let project: Project = serde_json::from_value(project.clone())
        .map_err(|e| CompileError::InvalidExport(format!("invalid project: {}", e)))?;
    let mut imported = project.with_fresh_ids();
    imported.name = format!("{} (imported)", imported.name);
    Ok(imported)
}

/// `<sanitized name>_export.json`
pub fn export_filename(name: &str) -> String {
    format!("{}_export.json", sanitize_name(name))
}
