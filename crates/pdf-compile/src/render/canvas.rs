//! Recording drawing surface
//!
//! Page builders draw onto a `Canvas` in millimeters measured from the top-left
//! page corner. Nothing is encoded until the finished canvas is exported, so
//! footers and watermarks can live in per-page slots that are replaced rather
//! than drawn over.

use super::text::{FontWeight, text_width_mm};
use crate::capture::EncodedImage;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// A single line of text; `y_mm` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub weight: FontWeight,
    pub color: Rgb,
    pub align: Align,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x_mm: f32, y_mm: f32) -> Self {
        Self {
            text: text.into(),
            x_mm,
            y_mm,
            size_pt: 10.0,
            weight: FontWeight::Regular,
            color: Rgb(0, 0, 0),
            align: Align::Left,
        }
    }

    pub fn size(mut self, size_pt: f32) -> Self {
        self.size_pt = size_pt;
        self
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn width_mm(&self) -> f32 {
        text_width_mm(&self.text, self.size_pt, self.weight)
    }

    /// Left edge after applying the alignment
    pub fn left_mm(&self) -> f32 {
        match self.align {
            Align::Left => self.x_mm,
            Align::Center => self.x_mm - self.width_mm() / 2.0,
            Align::Right => self.x_mm - self.width_mm(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width_mm: f32,
        color: Rgb,
    },
    /// Image placed with its top-left corner at (`x_mm`, `y_mm`)
    Image {
        image: EncodedImage,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    /// 0-based page index within the same document
    Page(usize),
}

/// Clickable rectangle; (`x_mm`, `y_mm`) is the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRegion {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    pub target: LinkTarget,
}

/// Large rotated text drawn at reduced opacity, centered on a point
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    pub text: String,
    pub center_mm: (f32, f32),
    pub size_pt: f32,
    pub angle_deg: f32,
    pub opacity: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasPage {
    pub ops: Vec<DrawOp>,
    pub links: Vec<LinkRegion>,
    /// Footer line, replaced wholesale on every stamp
    pub footer: Vec<TextRun>,
    pub watermark: Option<Watermark>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width_mm: f32,
    pub height_mm: f32,
    pages: Vec<CanvasPage>,
    active: usize,
}

impl Canvas {
    /// An empty canvas with no pages
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
            pages: Vec::new(),
            active: 0,
        }
    }

    /// Append a blank page and make it active; returns its 0-based index
    pub fn add_page(&mut self) -> usize {
        self.pages.push(CanvasPage::default());
        self.active = self.pages.len() - 1;
        self.active
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn active_page(&self) -> usize {
        self.active
    }

    pub fn set_active_page(&mut self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(CompileError::PageNotFound(index));
        }
        self.active = index;
        Ok(())
    }

    pub fn pages(&self) -> &[CanvasPage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&CanvasPage> {
        self.pages.get(index)
    }

    fn current(&mut self) -> Result<&mut CanvasPage> {
        let active = self.active;
        self.pages
            .get_mut(active)
            .ok_or(CompileError::PageNotFound(active))
    }

    pub fn draw_text(&mut self, run: TextRun) -> Result<()> {
        self.current()?.ops.push(DrawOp::Text(run));
        Ok(())
    }

    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width_mm: f32, color: Rgb) -> Result<()> {
        self.current()?.ops.push(DrawOp::Line {
            from,
            to,
            width_mm,
            color,
        });
        Ok(())
    }

    pub fn draw_image(
        &mut self,
        image: EncodedImage,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    ) -> Result<()> {
        self.current()?.ops.push(DrawOp::Image {
            image,
            x_mm,
            y_mm,
            width_mm,
            height_mm,
        });
        Ok(())
    }

    pub fn register_link(&mut self, link: LinkRegion) -> Result<()> {
        self.current()?.links.push(link);
        Ok(())
    }

    /// Replace the footer of the active page
    pub fn set_footer(&mut self, runs: Vec<TextRun>) -> Result<()> {
        self.current()?.footer = runs;
        Ok(())
    }

    /// Replace the watermark of the active page
    pub fn draw_watermark(&mut self, watermark: Watermark) -> Result<()> {
        self.current()?.watermark = Some(watermark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_requires_a_page() {
        let mut canvas = Canvas::new(210.0, 297.0);
        match canvas.draw_text(TextRun::new("x", 0.0, 0.0)) {
            Err(CompileError::PageNotFound(0)) => {}
            other => panic!("Expected PageNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_footer_slot_is_replaced() {
        let mut canvas = Canvas::new(210.0, 297.0);
        canvas.add_page();
        canvas.set_footer(vec![TextRun::new("Page 1 of 1", 105.0, 290.0)]).unwrap();
        canvas.set_footer(vec![TextRun::new("Page 1 of 3", 105.0, 290.0)]).unwrap();
        let footer = &canvas.pages()[0].footer;
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].text, "Page 1 of 3");
    }

    #[test]
    fn test_alignment_offsets() {
        let run = TextRun::new("Hello", 100.0, 10.0).align(Align::Right);
        assert!((run.left_mm() + run.width_mm() - 100.0).abs() < 1e-4);
        let run = run.align(Align::Center);
        assert!((run.left_mm() + run.width_mm() / 2.0 - 100.0).abs() < 1e-4);
    }
}
