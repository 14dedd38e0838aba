use chrono::Utc;
use pdf_async_runtime::*;
use pdf_compile::{CaptureMode, PageCapture};
use std::io::Cursor;
use tokio::sync::mpsc;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 60]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn project(name: &str, pages: usize) -> Project {
    let mut project = Project::new(name);
    for i in 0..pages {
        project.pages.push(PageCapture {
            id: format!("p{}", i),
            title: format!("Page {}", i),
            custom_title: None,
            url: "https://example.com".to_string(),
            captured_at: Utc::now(),
            image_data: png(200, 100),
            thumbnail: None,
            width: 200,
            height: 100,
            capture_mode: CaptureMode::Visible,
        });
    }
    project
}

async fn collect_until_idle(update_rx: &mut mpsc::UnboundedReceiver<PdfUpdate>, finals: usize) -> Vec<PdfUpdate> {
    let mut updates = Vec::new();
    let mut seen = 0;
    while seen < finals {
        let update = update_rx.recv().await.expect("worker stopped");
        if !matches!(update, PdfUpdate::Progress { .. }) {
            seen += 1;
        }
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_compile_writes_pdf_and_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let (command_tx, mut update_rx) = spawn_worker();

    command_tx
        .send(PdfCommand::Compile {
            project: project("Worker", 2),
            settings: CompileSettings::default(),
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();

    let updates = collect_until_idle(&mut update_rx, 1).await;
    assert!(updates.iter().any(|u| matches!(
        u,
        PdfUpdate::Progress { progress, .. } if progress.phase == CompilePhase::BuildingToc
    )));
    match updates.last() {
        Some(PdfUpdate::CompileComplete { path, page_count, .. }) => {
            assert_eq!(*page_count, 3);
            assert!(path.exists());
        }
        other => panic!("Expected CompileComplete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_queued_compiles_of_one_project_collapse() {
    let dir = tempfile::tempdir().unwrap();
    let (command_tx, mut update_rx) = spawn_worker();

    let first = project("Collapse", 1);
    let mut second = first.clone();
    second.pages.push(first.pages[0].clone());

    // Nothing runs until this task yields, so all three are queued together
    for p in [first.clone(), second.clone()] {
        command_tx
            .send(PdfCommand::Compile {
                project: p,
                settings: CompileSettings::default(),
                output_dir: dir.path().to_path_buf(),
            })
            .unwrap();
    }
    command_tx
        .send(PdfCommand::ExportProject {
            project: second,
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();

    let updates = collect_until_idle(&mut update_rx, 2).await;
    let finals: Vec<&PdfUpdate> = updates
        .iter()
        .filter(|u| !matches!(u, PdfUpdate::Progress { .. }))
        .collect();
    match finals.as_slice() {
        [PdfUpdate::CompileComplete { page_count, .. }, PdfUpdate::Exported { path }] => {
            assert_eq!(*page_count, 3);
            assert!(path.ends_with("Collapse_export.json"));
        }
        other => panic!("Unexpected updates {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_compile_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let (command_tx, mut update_rx) = spawn_worker();
    command_tx
        .send(PdfCommand::Compile {
            project: project("Empty", 0),
            settings: CompileSettings::default(),
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();

    let updates = collect_until_idle(&mut update_rx, 1).await;
    match updates.last() {
        Some(PdfUpdate::Error { message }) => assert!(message.contains("No pages")),
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (command_tx, mut update_rx) = spawn_worker();
    let original = project("Shared", 1);

    command_tx
        .send(PdfCommand::ExportProject {
            project: original.clone(),
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();
    let exported = match collect_until_idle(&mut update_rx, 1).await.pop() {
        Some(PdfUpdate::Exported { path }) => path,
        other => panic!("Expected Exported, got {:?}", other),
    };

    command_tx.send(PdfCommand::ImportProject { path: exported }).unwrap();
    match collect_until_idle(&mut update_rx, 1).await.pop() {
        Some(PdfUpdate::Imported { project }) => {
            assert_eq!(project.name, "Shared (imported)");
            assert_ne!(project.id, original.id);
            assert_eq!(project.pages.len(), 1);
        }
        other => panic!("Expected Imported, got {:?}", other),
    }
}
