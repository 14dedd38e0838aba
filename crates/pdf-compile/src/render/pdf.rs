//! PDF serialization of a finished canvas
//!
//! Pages are written in canvas order. Page object ids are reserved up front so
//! that internal links can reference any page regardless of position.

use super::canvas::{Align, Canvas, CanvasPage, DrawOp, LinkRegion, LinkTarget, Rgb, TextRun, Watermark};
use super::text::{FontWeight, encode_literal, text_width_mm};
use crate::constants::mm_to_pt;
use crate::types::*;
use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Document information dictionary contents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    /// Written as both /Creator and /Author
    pub creator: String,
    pub created: DateTime<Local>,
}

// =============================================================================
// Public API
// =============================================================================

/// Build a PDF document from the canvas
pub fn write_document(canvas: &Canvas, info: &DocumentInfo) -> Result<Document> {
    let mut output = Document::with_version("1.7");

    let pages_id = output.new_object_id();
    let page_ids: Vec<ObjectId> = (0..canvas.page_count())
        .map(|_| output.new_object_id())
        .collect();
    let fonts = create_fonts(&mut output);

    for (index, (page, page_id)) in canvas.pages().iter().zip(&page_ids).enumerate() {
        let page_dict = render_page(&mut output, canvas, page, pages_id, &page_ids, &fonts)?;
        output.objects.insert(*page_id, Object::Dictionary(page_dict));
        log::trace!("Wrote page {} ({} ops)", index + 1, page.ops.len());
    }

    let kids = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_ids.len() as i64)),
    ]);
    output
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    let info_id = output.add_object(info_dictionary(info));
    output.trailer.set("Info", info_id);

    output.compress();
    Ok(output)
}

/// Serialize a document to bytes
pub fn document_bytes(mut doc: Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

// =============================================================================
// Pages
// =============================================================================

fn render_page(
    output: &mut Document,
    canvas: &Canvas,
    page: &CanvasPage,
    parent_pages_id: ObjectId,
    page_ids: &[ObjectId],
    fonts: &Dictionary,
) -> Result<Dictionary> {
    let width_pt = mm_to_pt(canvas.width_mm);
    let height_pt = mm_to_pt(canvas.height_mm);
    let mut content = ContentWriter::new(height_pt);
    let mut xobjects = Dictionary::new();
    let mut resources = Dictionary::new();

    for op in &page.ops {
        match op {
            DrawOp::Text(run) => content.text(run),
            DrawOp::Line {
                from,
                to,
                width_mm,
                color,
            } => content.line(*from, *to, *width_mm, *color),
            DrawOp::Image {
                image,
                x_mm,
                y_mm,
                width_mm,
                height_mm,
            } => {
                let name = format!("Im{}", xobjects.len());
                let mut image_dict = Dictionary::new();
                image_dict.set("Type", Object::Name(b"XObject".to_vec()));
                image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
                image_dict.set("Width", Object::Integer(image.width as i64));
                image_dict.set("Height", Object::Integer(image.height as i64));
                image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
                image_dict.set("BitsPerComponent", Object::Integer(8));
                image_dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
                // Already JPEG; Flate on top gains nothing
                let stream = Stream::new(image_dict, image.jpeg.clone()).with_compression(false);
                let image_id = output.add_object(stream);
                xobjects.set(name.as_bytes(), Object::Reference(image_id));
                content.image(&name, *x_mm, *y_mm, *width_mm, *height_mm);
            }
        }
    }

    for run in &page.footer {
        content.text(run);
    }

    if let Some(watermark) = &page.watermark {
        let mut gstate = Dictionary::new();
        gstate.set("Type", Object::Name(b"ExtGState".to_vec()));
        gstate.set("ca", Object::Real(watermark.opacity));
        gstate.set("CA", Object::Real(watermark.opacity));
        let mut gstates = Dictionary::new();
        gstates.set("GS0", Object::Dictionary(gstate));
        resources.set("ExtGState", Object::Dictionary(gstates));
        content.watermark(watermark, "GS0");
    }

    resources.set("Font", Object::Dictionary(fonts.clone()));
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width_pt),
            Object::Real(height_pt),
        ]),
    );
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    let annotations: Vec<Object> = page
        .links
        .iter()
        .filter_map(|link| link_annotation(link, height_pt, page_ids))
        .map(|annotation| Object::Reference(output.add_object(annotation)))
        .collect();
    if !annotations.is_empty() {
        page_dict.set("Annots", Object::Array(annotations));
    }

    Ok(page_dict)
}

fn create_fonts(output: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for weight in [FontWeight::Regular, FontWeight::Bold] {
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(weight.base_font().as_bytes().to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let font_id = output.add_object(font_dict);
        fonts.set(weight.resource_name(), Object::Reference(font_id));
    }
    fonts
}

fn link_annotation(link: &LinkRegion, height_pt: f32, page_ids: &[ObjectId]) -> Option<Dictionary> {
    let left = mm_to_pt(link.x_mm);
    let right = mm_to_pt(link.x_mm + link.width_mm);
    let top = height_pt - mm_to_pt(link.y_mm);
    let bottom = height_pt - mm_to_pt(link.y_mm + link.height_mm);

    let mut annotation = Dictionary::new();
    annotation.set("Type", Object::Name(b"Annot".to_vec()));
    annotation.set("Subtype", Object::Name(b"Link".to_vec()));
    annotation.set(
        "Rect",
        Object::Array(vec![
            Object::Real(left),
            Object::Real(bottom),
            Object::Real(right),
            Object::Real(top),
        ]),
    );
    annotation.set(
        "Border",
        Object::Array(vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)]),
    );

    match &link.target {
        LinkTarget::Uri(uri) => {
            let mut action = Dictionary::new();
            action.set("S", Object::Name(b"URI".to_vec()));
            action.set("URI", Object::string_literal(uri.as_bytes().to_vec()));
            annotation.set("A", Object::Dictionary(action));
        }
        LinkTarget::Page(index) => {
            let Some(target) = page_ids.get(*index) else {
                log::warn!("Dropping link to missing page {}", index + 1);
                return None;
            };
            annotation.set(
                "Dest",
                Object::Array(vec![
                    Object::Reference(*target),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ]),
            );
        }
    }
    Some(annotation)
}

fn info_dictionary(info: &DocumentInfo) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Title", text_string(&info.title));
    dict.set("Subject", text_string(&info.subject));
    dict.set("Creator", text_string(&info.creator));
    dict.set("Author", text_string(&info.creator));
    dict.set("Producer", text_string(&info.creator));
    dict.set(
        "CreationDate",
        Object::string_literal(info.created.format("D:%Y%m%d%H%M%S").to_string()),
    );
    dict
}

/// PDF text string: plain for ASCII, UTF-16BE with byte order mark otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text.as_bytes().to_vec());
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::string_literal(bytes)
}

// =============================================================================
// Content stream
// =============================================================================

/// Content stream builder; converts top-left millimeters to PDF points
struct ContentWriter {
    ops: Vec<u8>,
    height_pt: f32,
}

impl ContentWriter {
    fn new(height_pt: f32) -> Self {
        Self {
            ops: Vec::new(),
            height_pt,
        }
    }

    fn push(&mut self, op: &str) {
        self.ops.extend_from_slice(op.as_bytes());
    }

    fn push_string(&mut self, text: &str) {
        self.ops.push(b'(');
        self.ops.extend_from_slice(&encode_literal(text));
        self.ops.push(b')');
    }

    fn x(&self, mm: f32) -> f32 {
        mm_to_pt(mm)
    }

    fn y(&self, mm: f32) -> f32 {
        self.height_pt - mm_to_pt(mm)
    }

    fn text(&mut self, run: &TextRun) {
        if run.text.is_empty() {
            return;
        }
        let x = self.x(run.left_mm());
        let y = self.y(run.y_mm);
        self.push(&format!(
            "BT /{} {} Tf {} rg {:.2} {:.2} Td ",
            run.weight.resource_name(),
            run.size_pt,
            color(run.color),
            x,
            y
        ));
        self.push_string(&run.text);
        self.push(" Tj ET\n");
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), width_mm: f32, stroke: Rgb) {
        let op = format!(
            "{} RG {:.3} w {:.2} {:.2} m {:.2} {:.2} l S\n",
            color(stroke),
            mm_to_pt(width_mm),
            self.x(from.0),
            self.y(from.1),
            self.x(to.0),
            self.y(to.1)
        );
        self.push(&op);
    }

    fn image(&mut self, name: &str, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) {
        let op = format!(
            "q {:.3} 0 0 {:.3} {:.2} {:.2} cm /{} Do Q\n",
            mm_to_pt(width_mm),
            mm_to_pt(height_mm),
            self.x(x_mm),
            self.y(y_mm + height_mm),
            name
        );
        self.push(&op);
    }

    /// Rotated text centered on the watermark point, inside its own graphics state
    fn watermark(&mut self, watermark: &Watermark, gstate: &str) {
        let (sin, cos) = watermark.angle_deg.to_radians().sin_cos();
        let half_width_pt =
            mm_to_pt(text_width_mm(&watermark.text, watermark.size_pt, FontWeight::Bold)) / 2.0;
        let origin_x = self.x(watermark.center_mm.0) - half_width_pt * cos;
        let origin_y = self.y(watermark.center_mm.1) - half_width_pt * sin;
        let op = format!(
            "q /{} gs {} rg BT /{} {} Tf {:.4} {:.4} {:.4} {:.4} {:.2} {:.2} Tm ",
            gstate,
            color(watermark.color),
            FontWeight::Bold.resource_name(),
            watermark.size_pt,
            cos,
            sin,
            -sin,
            cos,
            origin_x,
            origin_y
        );
        self.push(&op);
        self.push_string(&watermark.text);
        self.push(" Tj ET Q\n");
    }

    fn into_bytes(self) -> Vec<u8> {
        self.ops
    }
}

fn color(rgb: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        rgb.0 as f32 / 255.0,
        rgb.1 as f32 / 255.0,
        rgb.2 as f32 / 255.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_string_encodings() {
        match text_string("Plain") {
            Object::String(bytes, _) => assert_eq!(bytes, b"Plain".to_vec()),
            other => panic!("Expected string, got {:?}", other),
        }
        match text_string("Ünï") {
            Object::String(bytes, _) => assert_eq!(&bytes[..2], &[0xFE, 0xFF]),
            other => panic!("Expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_image_placement_flips_y() {
        let mut content = ContentWriter::new(100.0);
        content.image("Im0", 0.0, 0.0, 10.0, 10.0);
        let ops = String::from_utf8(content.into_bytes()).unwrap();
        // Top-left placement puts the image bottom at page height minus its own height
        let expected_y = 100.0 - mm_to_pt(10.0);
        assert!(ops.contains(&format!("{:.2} cm", expected_y)), "{}", ops);
    }

    #[test]
    fn test_right_aligned_text_ends_at_anchor() {
        let run = TextRun::new("p.3", 100.0, 20.0).align(Align::Right);
        let mut content = ContentWriter::new(500.0);
        content.text(&run);
        let ops = String::from_utf8(content.into_bytes()).unwrap();
        assert!(ops.contains(&format!("{:.2}", mm_to_pt(run.left_mm()))));
    }
}
