use pdf_compile::*;

#[test]
fn test_default_settings() {
    let settings = CompileSettings::default();
    assert_eq!(settings.paper_size, PaperSize::A4);
    assert_eq!(settings.margin_px, 20.0);
    assert_eq!(settings.overlap_px, 30.0);
    assert!(settings.include_toc);
    assert!(!settings.include_cover_page);
    assert!(!settings.has_watermark());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_partial_json_uses_defaults() {
    let settings: CompileSettings =
        serde_json::from_str(r#"{"paperSize":"letter","includeTOC":false,"margins":10}"#).unwrap();
    assert_eq!(settings.paper_size, PaperSize::Letter);
    assert!(!settings.include_toc);
    assert_eq!(settings.margin_px, 10.0);
    assert_eq!(settings.compress_max_width, 2400);
    assert!(settings.page_break_separator);
}

#[test]
fn test_unknown_paper_falls_back_to_a4() {
    let settings: CompileSettings = serde_json::from_str(r#"{"paperSize":"tabloid"}"#).unwrap();
    assert_eq!(settings.paper_size, PaperSize::A4);
}

#[test]
fn test_serialized_keys_match_stored_format() {
    let value = serde_json::to_value(CompileSettings::default()).unwrap();
    for key in [
        "paperSize",
        "margins",
        "captureScale",
        "imageQuality",
        "pdfImageQuality",
        "compressMaxWidth",
        "includeHeaders",
        "includePageNumbers",
        "includeTOC",
        "includeCoverPage",
        "coverAuthor",
        "watermarkText",
        "overlapPx",
        "pageBreakSeparator",
    ] {
        assert!(value.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(value["paperSize"], "a4");
}

#[test]
fn test_clamping() {
    let settings = CompileSettings {
        margin_px: 200.0,
        overlap_px: -5.0,
        capture_scale: 9.0,
        image_quality: 0.1,
        pdf_image_quality: 1.5,
        compress_max_width: 100,
        watermark_text: "  DRAFT  ".to_string(),
        ..CompileSettings::default()
    }
    .clamped();
    assert_eq!(settings.margin_px, 80.0);
    assert_eq!(settings.overlap_px, 0.0);
    assert_eq!(settings.capture_scale, 3.0);
    assert_eq!(settings.image_quality, 0.5);
    assert_eq!(settings.pdf_image_quality, 1.0);
    assert_eq!(settings.compress_max_width, 800);
    assert_eq!(settings.watermark_text, "DRAFT");
}

#[test]
fn test_validate_rejects_negative_margin() {
    let settings = CompileSettings {
        margin_px: -1.0,
        ..CompileSettings::default()
    };
    match settings.validate() {
        Err(CompileError::Configuration { setting, .. }) => assert_eq!(setting, "margins"),
        other => panic!("Expected Configuration error, got {:?}", other),
    }
}

#[test]
fn test_paper_dimensions() {
    assert_eq!(PaperSize::A4.dimensions_mm(), (210.0, 297.0));
    assert_eq!(PaperSize::Letter.dimensions_mm(), (215.9, 279.4));
    assert_eq!(PaperSize::Legal.dimensions_mm(), (215.9, 355.6));
}

#[tokio::test]
async fn test_save_and_load_settings() {
    use tempfile::NamedTempFile;

    let settings = CompileSettings {
        paper_size: PaperSize::Legal,
        cover_author: "Someone".to_string(),
        include_cover_page: true,
        ..CompileSettings::default()
    };

    let temp = NamedTempFile::new().unwrap();
    settings.save(temp.path()).await.unwrap();
    let loaded = CompileSettings::load(temp.path()).await.unwrap();
    assert_eq!(loaded, settings);
}
