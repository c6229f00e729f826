// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise rendered interiors and composed covers using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Layout coordinates are millimetres from the top-left
// corner; PDF space grows upwards from the bottom-left, so every y is flipped
// against the page height here and nowhere else.

use std::collections::BTreeMap;
use std::path::Path;

use image::RgbaImage;
use printpdf::{
    BuiltinFont, Color, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt,
    RawImage, RawImageData, RawImageFormat, Rgb, TextItem, TextMatrix, XObjectId, XObjectTransform,
};
use satzwerk_core::EngineConfig;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::types::{MM_PER_PT, Rect};
use satzwerk_layout::Block;
use satzwerk_layout::text::{estimated_width_mm, heading_line_height_mm};
use tracing::{debug, info, instrument, warn};

use crate::cover::ComposedCover;
use crate::render::RenderedInterior;

/// Images are placed at 72 dpi so one pixel is one point before scaling.
const PLACEMENT_DPI: f32 = 72.0;

/// Writes interiors and covers as print PDFs.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    body_font_pt: f32,
    glyph_width_factor: f32,
}

impl PdfWriter {
    /// Writer using the body typography from `config`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            title: None,
            body_font_pt: config.typography.body_font_pt,
            glyph_width_factor: config.typography.glyph_width_factor,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    fn text_width_mm(&self, text: &str, size_pt: f32) -> f32 {
        estimated_width_mm(text, size_pt, self.glyph_width_factor)
    }

    // -- Interior -------------------------------------------------------------

    /// One PDF page per planned page, at trim size.
    #[instrument(skip_all, fields(pages = interior.pages.len()))]
    pub fn write_interior(&self, interior: &RenderedInterior) -> Result<Vec<u8>> {
        if interior.pages.is_empty() {
            return Err(SatzwerkError::PdfError("interior has no pages".into()));
        }
        let title = self.title.as_deref().unwrap_or("Satzwerk Interior");
        let trim = &interior.spec.trim;
        let (page_w, page_h) = (Mm(trim.width_mm), Mm(trim.height_mm));
        info!(trim = %trim.name, title, "Writing interior PDF");

        let mut doc = PdfDocument::new(title);
        let mut xobjects: BTreeMap<&str, (XObjectId, u32, u32)> = BTreeMap::new();
        for (key, image) in &interior.illustrations {
            let id = doc.add_image(&raw_rgb(image));
            xobjects.insert(key.as_str(), (id, image.width(), image.height()));
        }

        let mut pages = Vec::with_capacity(interior.pages.len());
        for page in &interior.pages {
            let mut ops = Vec::new();
            for block in &page.blocks {
                match block {
                    Block::Heading {
                        rect,
                        lines,
                        size_pt,
                    } => {
                        let line_height = heading_line_height_mm(*size_pt);
                        let used = lines.len() as f32 * line_height;
                        let top = rect.y + (rect.height - used).max(0.0) / 2.0;
                        for (i, line) in lines.iter().enumerate() {
                            let slack = (rect.width - self.text_width_mm(line, *size_pt)).max(0.0);
                            let baseline = top + (i as f32 + 0.8) * line_height;
                            push_text(
                                &mut ops,
                                page_h.0,
                                (rect.x + slack / 2.0, baseline),
                                *size_pt,
                                BuiltinFont::TimesBold,
                                line,
                            );
                        }
                    }
                    Block::Text { rect, lines } => {
                        if lines.is_empty() {
                            continue;
                        }
                        let line_height = rect.height / lines.len() as f32;
                        for (i, line) in lines.iter().enumerate() {
                            let baseline = rect.y + (i as f32 + 0.75) * line_height;
                            push_text(
                                &mut ops,
                                page_h.0,
                                (rect.x, baseline),
                                self.body_font_pt,
                                BuiltinFont::TimesRoman,
                                line,
                            );
                        }
                    }
                    Block::Illustration { rect, image } => {
                        let key = image.cache_key();
                        if let Some((id, width_px, height_px)) = xobjects.get(key.as_str()) {
                            ops.push(place_image(id, *width_px, *height_px, rect, page_h.0));
                        }
                    }
                    Block::ContentsEntry {
                        rect, title, page, ..
                    } => {
                        let baseline = rect.y + rect.height * 0.75;
                        let number = page.to_string();
                        let number_x = rect.right() - self.text_width_mm(&number, self.body_font_pt);
                        let size = self.body_font_pt;
                        let font = BuiltinFont::TimesRoman;
                        push_text(&mut ops, page_h.0, (rect.x, baseline), size, font, title);
                        push_text(&mut ops, page_h.0, (number_x, baseline), size, font, &number);
                    }
                    Block::Footer { rect, number } => {
                        let number = number.to_string();
                        let width = self.text_width_mm(&number, self.body_font_pt);
                        let x = rect.x + (rect.width - width) / 2.0;
                        let baseline = rect.y + rect.height * 0.75;
                        push_text(
                            &mut ops,
                            page_h.0,
                            (x, baseline),
                            self.body_font_pt,
                            BuiltinFont::TimesRoman,
                            &number,
                        );
                    }
                }
            }
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);
        debug!(
            pages = doc.pages.len(),
            images = xobjects.len(),
            "Interior layout complete"
        );

        Ok(save_logged(&doc))
    }

    // -- Cover ----------------------------------------------------------------

    /// A single page the size of the full wrap, bleed included.
    #[instrument(skip_all, fields(title = %cover.title))]
    pub fn write_cover(&self, cover: &ComposedCover) -> Result<Vec<u8>> {
        let layout = &cover.layout;
        let (page_w, page_h) = (Mm(layout.total_width), Mm(layout.total_height));
        let title = self.title.as_deref().unwrap_or(&cover.title);
        info!(
            total_width = layout.total_width,
            total_height = layout.total_height,
            "Writing cover PDF"
        );

        let mut doc = PdfDocument::new(title);
        let canvas_id = doc.add_image(&raw_rgb(&cover.canvas));
        let full_page = Rect::new(0.0, 0.0, layout.total_width, layout.total_height);

        let mut ops = vec![place_image(
            &canvas_id,
            cover.canvas.width(),
            cover.canvas.height(),
            &full_page,
            page_h.0,
        )];
        ops.push(Op::SetFillColor {
            col: Color::Rgb(Rgb {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                icc_profile: None,
            }),
        });

        for block in &cover.text_blocks {
            let line_height = block.size_pt * 1.5 * MM_PER_PT;
            for (i, line) in block.lines.iter().enumerate() {
                let baseline = block.rect.y + (i as f32 + 0.75) * line_height;
                push_text(
                    &mut ops,
                    page_h.0,
                    (block.rect.x, baseline),
                    block.size_pt,
                    BuiltinFont::TimesRoman,
                    line,
                );
            }
        }

        if let Some(spine) = &cover.spine_text {
            // Rotated -90° in PDF space reads top to bottom; the baseline sits
            // left of the spine centre so the cap height is centred.
            let size = spine.effective_size_pt();
            let baseline_x = spine.center_x - size * 0.35 * MM_PER_PT;
            let start_y = spine.center_y - spine.effective_length_mm() / 2.0;
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextMatrix {
                matrix: TextMatrix::TranslateRotate(
                    Mm(baseline_x).into_pt(),
                    Mm(page_h.0 - start_y).into_pt(),
                    -spine.rotation_deg,
                ),
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size),
                font: BuiltinFont::TimesBold,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(spine.text.clone())],
                font: BuiltinFont::TimesBold,
            });
            ops.push(Op::EndTextSection);
        }

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        Ok(save_logged(&doc))
    }

    // -- File output convenience ----------------------------------------------

    /// Write the interior PDF to `path`.
    pub fn write_interior_to_file(
        &self,
        interior: &RenderedInterior,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.write_interior(interior)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote interior PDF to {}", path.as_ref().display());
        Ok(())
    }

    /// Write the cover PDF to `path`.
    pub fn write_cover_to_file(&self, cover: &ComposedCover, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.write_cover(cover)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote cover PDF to {}", path.as_ref().display());
        Ok(())
    }
}

// -- Op helpers ---------------------------------------------------------------

/// Serialise `doc`, logging anything printpdf had to work around.
fn save_logged(doc: &PdfDocument) -> Vec<u8> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    for warning in &warnings {
        warn!(?warning, "printpdf warning while saving");
    }
    debug!(bytes = bytes.len(), warnings = warnings.len(), "PDF serialised");
    bytes
}

/// Set one line of text whose baseline starts at `origin` (top-left page
/// coordinates, millimetres).
fn push_text(
    ops: &mut Vec<Op>,
    page_height_mm: f32,
    origin: (f32, f32),
    size_pt: f32,
    font: BuiltinFont,
    text: &str,
) {
    let (x_mm, baseline_mm) = origin;
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Mm(x_mm).into_pt(),
            y: Mm(page_height_mm - baseline_mm).into_pt(),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size_pt),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

/// Stretch an image XObject over `rect` (top-left page coordinates).
fn place_image(
    id: &XObjectId,
    width_px: u32,
    height_px: u32,
    rect: &Rect,
    page_height_mm: f32,
) -> Op {
    let target_w = Mm(rect.width).into_pt().0;
    let target_h = Mm(rect.height).into_pt().0;
    Op::UseXobject {
        id: id.clone(),
        transform: XObjectTransform {
            translate_x: Some(Mm(rect.x).into_pt()),
            translate_y: Some(Mm(page_height_mm - rect.bottom()).into_pt()),
            scale_x: Some(target_w / width_px.max(1) as f32),
            scale_y: Some(target_h / height_px.max(1) as f32),
            dpi: Some(PLACEMENT_DPI),
            rotate: None,
        },
    }
}

/// printpdf takes RGB8; alpha is dropped.
fn raw_rgb(image: &RgbaImage) -> RawImage {
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    RawImage {
        pixels: RawImageData::U8(rgb.into_raw()),
        width: image.width() as usize,
        height: image.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satzwerk_core::types::{BookSelection, Chapter, ImageRef, Manuscript, Theme};
    use satzwerk_layout::paginate;

    use crate::assets::MemoryAssetResolver;
    use crate::cover::{CoverRequest, CoverWrapComposer};
    use crate::render::render_interior;

    fn manuscript() -> Manuscript {
        Manuscript {
            title: "Harbor Lights".into(),
            author: "A. Writer".into(),
            dedication: Some("For the keepers.".into()),
            copyright: None,
            chapters: (0..3)
                .map(|index| Chapter {
                    index,
                    title: format!("Chapter {}", index + 1),
                    body: vec!["lantern harbor tide"; 300].join(" "),
                    illustration: (index == 0).then_some(ImageRef::Placeholder(Theme::Nature)),
                })
                .collect(),
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        lopdf::Document::load_mem(bytes)
            .expect("valid PDF")
            .get_pages()
            .len()
    }

    #[tokio::test]
    async fn interior_has_one_pdf_page_per_planned_page() {
        let config = EngineConfig::default();
        let selection = BookSelection::parse("5.5x8.5", "cream").expect("selection");
        let planned = paginate(&manuscript(), &selection, &config).expect("paginate");
        let rendered = render_interior(&planned, &MemoryAssetResolver::new(), &config).await;

        let mut writer = PdfWriter::new(&config);
        writer.set_title("Harbor Lights");
        let bytes = writer.write_interior(&rendered).expect("write");
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&bytes), planned.plan.total_pages as usize);
    }

    #[tokio::test]
    async fn cover_is_a_single_page() {
        let mut config = EngineConfig::default();
        config.cover.raster_dpi = 30.0;
        let resolver = MemoryAssetResolver::new();
        let request = CoverRequest {
            selection: BookSelection::parse("6x9", "white").expect("selection"),
            page_count: 320,
            title: "Harbor Lights".into(),
            author: "A. Writer".into(),
            blurb: "The lanterns went dark one winter night.".into(),
            front_art: Some(ImageRef::Placeholder(Theme::Mystery)),
            back_art: None,
            barcode: None,
        };
        let cover = CoverWrapComposer::new(&resolver, &config)
            .compose(&request)
            .await
            .expect("compose");
        assert!(cover.spine_text.is_some());

        let bytes = PdfWriter::new(&config).write_cover(&cover).expect("write");
        assert_eq!(page_count(&bytes), 1);
    }

    #[tokio::test]
    async fn empty_interior_is_a_pdf_error() {
        let config = EngineConfig::default();
        let selection = BookSelection::parse("6x9", "white").expect("selection");
        let planned = paginate(&manuscript(), &selection, &config).expect("paginate");
        let mut rendered = render_interior(&planned, &MemoryAssetResolver::new(), &config).await;
        rendered.pages.clear();

        let result = PdfWriter::new(&config).write_interior(&rendered);
        assert!(matches!(result, Err(SatzwerkError::PdfError(_))));
    }

    #[tokio::test]
    async fn files_are_written() {
        let config = EngineConfig::default();
        let selection = BookSelection::parse("6x9", "white").expect("selection");
        let planned = paginate(&manuscript(), &selection, &config).expect("paginate");
        let rendered = render_interior(&planned, &MemoryAssetResolver::new(), &config).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("interior.pdf");
        PdfWriter::new(&config)
            .write_interior_to_file(&rendered, &path)
            .expect("write");
        let bytes = std::fs::read(&path).expect("read back");
        assert_eq!(page_count(&bytes), planned.pages.len());
    }
}
