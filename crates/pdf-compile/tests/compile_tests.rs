use chrono::{Local, TimeZone, Utc};
use lopdf::{Document, Object, ObjectId};
use pdf_compile::render::{RenderContext, render_plan, stamp_page_numbers};
use pdf_compile::*;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 200])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn capture(title: &str, width: u32, height: u32) -> PageCapture {
    PageCapture {
        id: format!("id-{}", title),
        title: title.to_string(),
        custom_title: None,
        url: format!("https://example.com/{}", title),
        captured_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        image_data: png(width, height),
        thumbnail: None,
        width,
        height,
        capture_mode: CaptureMode::Visible,
    }
}

fn three_page_project() -> Project {
    let mut project = Project::new("Research Notes");
    project.pages.push(capture("alpha", 400, 200));
    project.pages.push(capture("beta", 400, 300));
    project.pages.push(capture("gamma", 400, 250));
    project
}

fn generated_at() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 2, 9, 30, 0).unwrap()
}

fn compile_now(project: &Project, settings: &CompileSettings) -> Result<CompiledDocument> {
    compile_project(project, settings, generated_at(), &mut |_| {})
}

fn page_text(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn link_destinations(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let page = doc.get_dictionary(page_id).unwrap();
    let Ok(annots) = page.get(b"Annots").and_then(Object::as_array) else {
        return Vec::new();
    };
    annots
        .iter()
        .filter_map(|annot| {
            let dict = doc.get_dictionary(annot.as_reference().ok()?).ok()?;
            let dest = dict.get(b"Dest").ok()?.as_array().ok()?;
            dest.first()?.as_reference().ok()
        })
        .collect()
}

#[test]
fn test_compile_with_toc_produces_expected_pages() {
    let project = three_page_project();
    let settings = CompileSettings::default();
    let compiled = compile_now(&project, &settings).unwrap();

    assert_eq!(compiled.page_count, 4);
    assert_eq!(compiled.filename, "Research_Notes_2024-06-02.pdf");
    let pages: Vec<usize> = compiled.toc_entries.iter().map(|e| e.pdf_page).collect();
    assert_eq!(pages, vec![2, 3, 4]);

    let doc = Document::load_mem(&compiled.bytes).unwrap();
    let page_ids = doc.get_pages();
    assert_eq!(page_ids.len(), 4);

    // Each TOC row jumps to its capture's page
    assert_eq!(
        link_destinations(&doc, page_ids[&1]),
        vec![page_ids[&2], page_ids[&3], page_ids[&4]]
    );

    let toc = page_text(&doc, page_ids[&1]);
    assert!(toc.contains("(Table of Contents)"), "{}", toc);
    assert!(toc.contains("(p.2)"));
    assert!(!toc.contains("Page 1 of"));

    for n in 2..=4u32 {
        let text = page_text(&doc, page_ids[&n]);
        assert!(text.contains(&format!("(Page {} of 4)", n)), "page {}: {}", n, text);
        assert!(text.contains("(Research Notes)"));
        assert!(text.contains("(2024-06-02)"));
    }
}

#[test]
fn test_compile_metadata() {
    let project = three_page_project();
    let compiled = compile_now(&project, &CompileSettings::default()).unwrap();
    let doc = Document::load_mem(&compiled.bytes).unwrap();

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Research Notes");
    assert_eq!(info.get(b"Subject").unwrap().as_str().unwrap(), b"3 pages");
    assert_eq!(info.get(b"Creator").unwrap().as_str().unwrap(), b"Web PDF Compiler");
    assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"Web PDF Compiler");
}

#[test]
fn test_cover_shifts_numbering_and_has_no_footer() {
    let project = three_page_project();
    let settings = CompileSettings {
        include_cover_page: true,
        cover_author: "A. Reader".to_string(),
        ..CompileSettings::default()
    };
    let compiled = compile_now(&project, &settings).unwrap();
    assert_eq!(compiled.page_count, 5);
    let pages: Vec<usize> = compiled.toc_entries.iter().map(|e| e.pdf_page).collect();
    assert_eq!(pages, vec![3, 4, 5]);

    let doc = Document::load_mem(&compiled.bytes).unwrap();
    let page_ids = doc.get_pages();
    let cover = page_text(&doc, page_ids[&1]);
    assert!(cover.contains("(Research Notes)"));
    assert!(cover.contains("(3 Captured Pages)"));
    assert!(cover.contains("(A. Reader)"));
    assert!(cover.contains("(June 2, 2024)"));
    assert!(cover.contains("(Generated by Web PDF Compiler)"));
    assert!(!cover.contains("Page 1 of"));

    assert_eq!(
        link_destinations(&doc, page_ids[&2]),
        vec![page_ids[&3], page_ids[&4], page_ids[&5]]
    );
    assert!(page_text(&doc, page_ids[&5]).contains("(Page 5 of 5)"));
}

#[test]
fn test_tall_capture_spans_pages_without_repeated_header() {
    let mut project = Project::new("Tall");
    project.pages.push(capture("long", 400, 2000));
    let settings = CompileSettings {
        include_toc: false,
        ..CompileSettings::default()
    };
    let compiled = compile_now(&project, &settings).unwrap();
    assert!(compiled.page_count >= 3);

    let doc = Document::load_mem(&compiled.bytes).unwrap();
    let page_ids = doc.get_pages();
    assert!(page_text(&doc, page_ids[&1]).contains("(1. long)"));
    for n in 2..=compiled.page_count as u32 {
        let text = page_text(&doc, page_ids[&n]);
        assert!(!text.contains("(1. long)"));
        assert!(text.contains(" Do Q"));
    }
}

#[test]
fn test_watermark_skips_cover() {
    let project = three_page_project();
    let settings = CompileSettings {
        include_cover_page: true,
        watermark_text: "DRAFT".to_string(),
        ..CompileSettings::default()
    };
    let compiled = compile_now(&project, &settings).unwrap();
    let doc = Document::load_mem(&compiled.bytes).unwrap();
    let page_ids = doc.get_pages();

    assert!(!page_text(&doc, page_ids[&1]).contains("(DRAFT)"));
    for n in 2..=5u32 {
        let text = page_text(&doc, page_ids[&n]);
        assert!(text.contains("/GS0 gs"), "page {}", n);
        assert!(text.contains("(DRAFT) Tj ET Q"), "page {}", n);
    }
}

#[test]
fn test_without_page_numbers_there_are_no_footers() {
    let project = three_page_project();
    let settings = CompileSettings {
        include_page_numbers: false,
        ..CompileSettings::default()
    };
    let compiled = compile_now(&project, &settings).unwrap();
    let doc = Document::load_mem(&compiled.bytes).unwrap();
    for (_, page_id) in doc.get_pages() {
        let text = page_text(&doc, page_id);
        assert!(!text.contains("Page "));
        assert!(!text.contains("(Table of Contents)"));
    }
}

#[test]
fn test_stamping_is_idempotent() {
    let project = three_page_project();
    let settings = CompileSettings {
        include_cover_page: true,
        ..CompileSettings::default()
    };
    let geometry = Geometry::from_settings(&settings).unwrap();
    let plan = LayoutPlan::for_project(&project, &settings, &geometry).unwrap();
    let ctx = RenderContext {
        project: &project,
        settings: &settings,
        geometry: &geometry,
        plan: &plan,
        generated_at: generated_at(),
    };

    let mut canvas = render_plan(&ctx, &mut |_| {}).unwrap();
    let once = canvas.clone();
    let total = canvas.page_count();
    stamp_page_numbers(&mut canvas, &ctx, 0..total).unwrap();
    stamp_page_numbers(&mut canvas, &ctx, 1..total).unwrap();
    assert_eq!(canvas, once);

    assert!(canvas.pages()[0].footer.is_empty());
    let center = &canvas.pages()[2].footer[1];
    assert_eq!(center.text, format!("Page 3 of {}", total));
}

#[test]
fn test_empty_project_is_rejected() {
    let project = Project::new("Empty");
    let mut phases = Vec::new();
    let result = compile_project(&project, &CompileSettings::default(), generated_at(), &mut |p| {
        phases.push(p.phase)
    });
    match result {
        Err(CompileError::EmptyProject) => {}
        other => panic!("Expected EmptyProject error, got {:?}", other.map(|d| d.page_count)),
    }
    assert!(matches!(phases.last(), Some(CompilePhase::Failed(_))));
}

#[test]
fn test_progress_moves_forward() {
    let project = three_page_project();
    let mut percents = Vec::new();
    compile_project(&project, &CompileSettings::default(), generated_at(), &mut |p| {
        percents.push(p.percent)
    })
    .unwrap();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{:?}", percents);
    assert_eq!(percents.last(), Some(&100.0));
}

#[tokio::test]
async fn test_compile_to_dir_writes_only_on_success() {
    let dir = tempfile::tempdir().unwrap();

    let failed = compile_to_dir(Project::new("Empty"), CompileSettings::default(), dir.path(), |_| {}).await;
    assert!(matches!(failed, Err(CompileError::EmptyProject)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let (path, compiled) = compile_to_dir(three_page_project(), CompileSettings::default(), dir.path(), move |p| {
        sink.lock().unwrap().push(p.phase)
    })
    .await
    .unwrap();

    assert!(path.ends_with(&compiled.filename));
    assert_eq!(std::fs::read(&path).unwrap(), compiled.bytes);
    assert_eq!(updates.lock().unwrap().last(), Some(&CompilePhase::Done));
}
