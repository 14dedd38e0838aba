use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::mpsc;

// Re-export types from library crates
pub use pdf_compile::{CompilePhase, CompileProgress, CompileSettings, Project};

/// Commands sent from the front end to the worker
#[derive(Debug)]
pub enum PdfCommand {
    Compile {
        project: Project,
        settings: CompileSettings,
        output_dir: PathBuf,
    },
    ExportProject {
        project: Project,
        output_dir: PathBuf,
    },
    ImportProject {
        path: PathBuf,
    },
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum PdfUpdate {
    Progress {
        project_id: String,
        progress: CompileProgress,
    },
    CompileComplete {
        project_id: String,
        path: PathBuf,
        page_count: usize,
    },
    Exported {
        path: PathBuf,
    },
    /// Parsed project with fresh ids; persisting it is up to the receiver
    Imported {
        project: Project,
    },
    Error {
        message: String,
    },
}

/// Spawn the worker on the current tokio runtime
pub fn spawn_worker() -> (
    mpsc::UnboundedSender<PdfCommand>,
    mpsc::UnboundedReceiver<PdfUpdate>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx));
    (command_tx, update_rx)
}

/// Run commands one at a time until the command channel closes
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
) {
    let mut pending = VecDeque::new();
    loop {
        let cmd = match pending.pop_front() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };
        process_command(cmd, &mut command_rx, &mut pending, &update_tx).await;
    }
    log::debug!("Worker shutting down");
}

async fn process_command(
    cmd: PdfCommand,
    command_rx: &mut mpsc::UnboundedReceiver<PdfCommand>,
    pending: &mut VecDeque<PdfCommand>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match cmd {
        PdfCommand::Compile {
            mut project,
            mut settings,
            mut output_dir,
        } => {
            while let Ok(next_cmd) = command_rx.try_recv() {
                pending.push_back(next_cmd);
            }
            // Compiles of the same project queued right behind this one supersede it
            while let Some(PdfCommand::Compile { project: next, .. }) = pending.front() {
                if next.id != project.id {
                    break;
                }
                let Some(PdfCommand::Compile {
                    project: next,
                    settings: next_settings,
                    output_dir: next_dir,
                }) = pending.pop_front()
                else {
                    break;
                };
                log::debug!("Discarding queued compile of {}, using newer request", project.id);
                project = next;
                settings = next_settings;
                output_dir = next_dir;
            }
            handle_compile(project, settings, output_dir, update_tx).await;
        }
        PdfCommand::ExportProject {
            project,
            output_dir,
        } => {
            handle_export(project, output_dir, update_tx).await;
        }
        PdfCommand::ImportProject { path } => {
            handle_import(path, update_tx).await;
        }
    }
}

async fn handle_compile(
    project: Project,
    settings: CompileSettings,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let project_id = project.id.clone();
    let progress_tx = update_tx.clone();
    let progress_id = project_id.clone();
    let result = pdf_compile::compile_to_dir(project, settings, output_dir, move |progress| {
        let _ = progress_tx.send(PdfUpdate::Progress {
            project_id: progress_id.clone(),
            progress,
        });
    })
    .await;

    match result {
        Ok((path, document)) => {
            let _ = update_tx.send(PdfUpdate::CompileComplete {
                project_id,
                path,
                page_count: document.page_count,
            });
        }
        Err(e) => {
            let _ = update_tx.send(PdfUpdate::Error {
                message: format!("Compile failed: {}", e),
            });
        }
    }
}

async fn handle_export(
    project: Project,
    output_dir: PathBuf,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    let path = output_dir.join(pdf_compile::export_filename(&project.name));
    let result = match pdf_compile::export_project(&project) {
        Ok(json) => tokio::fs::write(&path, json).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    let update = match result {
        Ok(()) => {
            log::info!("Exported \"{}\" to {}", project.name, path.display());
            PdfUpdate::Exported { path }
        }
        Err(message) => PdfUpdate::Error {
            message: format!("Export failed: {}", message),
        },
    };
    let _ = update_tx.send(update);
}

async fn handle_import(path: PathBuf, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    let update = match tokio::fs::read_to_string(&path).await {
        Ok(json) => match pdf_compile::import_project(&json) {
            Ok(project) => PdfUpdate::Imported { project },
            Err(e) => PdfUpdate::Error {
                message: format!("Import failed: {}", e),
            },
        },
        Err(e) => PdfUpdate::Error {
            message: format!("Failed to read {}: {}", path.display(), e),
        },
    };
    let _ = update_tx.send(update);
}
