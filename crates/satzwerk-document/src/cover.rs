// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cover wrap composer — rasterises back panel, spine and front panel onto
// one bleed-inclusive canvas.
//
// Paint order is fixed: brand colour, spine shade, panel artwork, then the
// barcode zone in flat white, then the barcode itself. Nothing is painted
// after the barcode, and text blocks only ever come from the text zones.

use std::time::Duration;

use image::RgbaImage;
use imageproc::drawing::draw_filled_rect_mut;
use satzwerk_core::EngineConfig;
use satzwerk_core::error::Result;
use satzwerk_core::notice::{CoverPanel, Notice};
use satzwerk_core::types::{BookSelection, ImageRef, MM_PER_PT, Rect};
use satzwerk_layout::text::wrap_text;
use satzwerk_layout::{CoverWrapLayout, SpineTextPlan};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::assets::{AssetResolver, load_image};
use crate::image::processor::{ImageProcessor, encode_png};
use crate::render::mm_to_px;

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Everything needed to compose one cover.
#[derive(Debug, Clone)]
pub struct CoverRequest {
    pub selection: BookSelection,
    /// Final interior page count; drives the spine width.
    pub page_count: u32,
    pub title: String,
    pub author: String,
    pub blurb: String,
    pub front_art: Option<ImageRef>,
    pub back_art: Option<ImageRef>,
    pub barcode: Option<ImageRef>,
}

/// Horizontal text placed on a cover panel, in canvas millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverTextBlock {
    pub panel: CoverPanel,
    pub rect: Rect,
    pub lines: Vec<String>,
    pub size_pt: f32,
}

/// A composed cover wrap.
///
/// The rasters (`canvas` and the cropped panels) carry artwork, the spine
/// shade and the barcode only. Title, author, blurb and spine text are kept
/// as `text_blocks` and `spine_text` and are set as vector text by the PDF
/// writer; callers exporting the rasters alone must draw them themselves.
#[derive(Debug, Clone)]
pub struct ComposedCover {
    pub layout: CoverWrapLayout,
    pub title: String,
    /// The full wrap, bleed included.
    pub canvas: RgbaImage,
    /// Each panel cropped from the canvas together with its bleed.
    pub back: RgbaImage,
    pub spine: RgbaImage,
    pub front: RgbaImage,
    pub spine_text: Option<SpineTextPlan>,
    pub text_blocks: Vec<CoverTextBlock>,
    pub notices: Vec<Notice>,
}

impl ComposedCover {
    /// The full wrap encoded as PNG.
    pub fn canvas_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.canvas)
    }
}

/// Composes cover wraps using one asset resolver.
pub struct CoverWrapComposer<'a, R> {
    resolver: &'a R,
    config: &'a EngineConfig,
}

impl<'a, R: AssetResolver> CoverWrapComposer<'a, R> {
    /// Composer fetching artwork through `resolver`.
    pub fn new(resolver: &'a R, config: &'a EngineConfig) -> Self {
        Self { resolver, config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.assets.timeout_ms)
    }

    fn dpi(&self) -> f32 {
        self.config.cover.raster_dpi
    }

    /// Compose the wrap. Only configuration problems (trim, paper, page
    /// count) are errors; artwork and barcode failures become notices.
    #[instrument(skip_all, fields(trim = %request.selection.trim.name, page_count = request.page_count))]
    pub async fn compose(&self, request: &CoverRequest) -> Result<ComposedCover> {
        let config = self.config;
        let layout = CoverWrapLayout::compute(
            &request.selection.trim,
            request.page_count,
            request.selection.paper,
            config,
        )?;
        let mut notices = Vec::new();

        let brand = config.cover.brand_color;
        let mut canvas = RgbaImage::from_pixel(
            mm_to_px(layout.total_width, self.dpi()),
            mm_to_px(layout.total_height, self.dpi()),
            image::Rgba(brand),
        );
        self.fill(&mut canvas, &layout.spine_with_bleed(), darken(brand, 0.7));

        // -- Panel artwork ----------------------------------------------------

        match &request.front_art {
            Some(art) => {
                if let Err(reason) = self.paint_art(&mut canvas, art, &layout.front_with_bleed()).await {
                    warn!(%reason, "Front artwork unavailable; using brand colour");
                    notices.push(Notice::ArtworkFallback {
                        panel: CoverPanel::Front,
                        reason,
                    });
                }
            }
            None => {
                info!("No front artwork supplied; using brand colour");
                notices.push(Notice::ArtworkFallback {
                    panel: CoverPanel::Front,
                    reason: "no front artwork supplied".into(),
                });
            }
        }
        if let Some(art) = &request.back_art {
            if let Err(reason) = self.paint_art(&mut canvas, art, &layout.back_with_bleed()).await {
                warn!(%reason, "Back artwork unavailable; using brand colour");
                notices.push(Notice::ArtworkFallback {
                    panel: CoverPanel::Back,
                    reason,
                });
            }
        }

        // -- Barcode zone (always last) ---------------------------------------

        self.fill(&mut canvas, &layout.barcode_zone, WHITE);
        let barcode_drawn = match &request.barcode {
            Some(barcode) => match self.paint_barcode(&mut canvas, barcode, &layout.barcode_zone).await {
                Ok(()) => true,
                Err(reason) => {
                    warn!(%reason, "Barcode unavailable; zone left blank");
                    false
                }
            },
            None => false,
        };
        if !barcode_drawn {
            notices.push(Notice::BarcodeLeftBlank);
        }

        // -- Text -------------------------------------------------------------

        let text_blocks = self.text_blocks(&layout, request);
        let (spine_text, spine_notice) =
            SpineTextPlan::for_spine(&layout, &request.title, &request.author, config);
        notices.extend(spine_notice);

        let back = self.crop(&canvas, &layout.back_with_bleed());
        let spine = self.crop(&canvas, &layout.spine_with_bleed());
        let front = self.crop(&canvas, &layout.front_with_bleed());

        info!(
            width_px = canvas.width(),
            height_px = canvas.height(),
            spine_width = layout.spine_width,
            notices = notices.len(),
            "Cover composed"
        );

        Ok(ComposedCover {
            layout,
            title: request.title.clone(),
            canvas,
            back,
            spine,
            front,
            spine_text,
            text_blocks,
            notices,
        })
    }

    // -- Raster helpers -------------------------------------------------------

    /// Pixel rectangle for `rect`, clamped to the canvas.
    fn pixels(&self, canvas: &RgbaImage, rect: &Rect) -> (u32, u32, u32, u32) {
        let dpi = self.dpi();
        let to_px = |mm: f32| ((mm / 25.4 * dpi).round().max(0.0) as u32);
        let x0 = to_px(rect.x).min(canvas.width());
        let y0 = to_px(rect.y).min(canvas.height());
        let x1 = to_px(rect.right()).min(canvas.width());
        let y1 = to_px(rect.bottom()).min(canvas.height());
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    fn fill(&self, canvas: &mut RgbaImage, rect: &Rect, color: [u8; 4]) {
        let (x, y, width, height) = self.pixels(canvas, rect);
        if width == 0 || height == 0 {
            return;
        }
        draw_filled_rect_mut(
            canvas,
            imageproc::rect::Rect::at(x as i32, y as i32).of_size(width, height),
            image::Rgba(color),
        );
    }

    fn crop(&self, canvas: &RgbaImage, rect: &Rect) -> RgbaImage {
        let (x, y, width, height) = self.pixels(canvas, rect);
        image::imageops::crop_imm(canvas, x, y, width, height).to_image()
    }

    /// Load `art` and stretch-crop it over `target`. Returns the failure
    /// reason instead of an error.
    async fn paint_art(
        &self,
        canvas: &mut RgbaImage,
        art: &ImageRef,
        target: &Rect,
    ) -> std::result::Result<(), String> {
        let (x, y, width, height) = self.pixels(canvas, target);
        let loaded = load_image(self.resolver, art, (width, height), self.timeout())
            .await
            .map_err(|err| err.to_string())?;
        let filled = ImageProcessor::from_rgba(loaded).fill(width, height).into_rgba();
        image::imageops::overlay(canvas, &filled, i64::from(x), i64::from(y));
        debug!(x, y, width, height, "Artwork painted");
        Ok(())
    }

    /// Fit the barcode inside the (already white) zone, centred.
    async fn paint_barcode(
        &self,
        canvas: &mut RgbaImage,
        barcode: &ImageRef,
        zone: &Rect,
    ) -> std::result::Result<(), String> {
        let (x, y, width, height) = self.pixels(canvas, zone);
        let loaded = load_image(self.resolver, barcode, (width, height), self.timeout())
            .await
            .map_err(|err| err.to_string())?;
        let fitted = ImageProcessor::from_rgba(loaded).fit(width, height).into_rgba();
        let offset_x = x + (width.saturating_sub(fitted.width())) / 2;
        let offset_y = y + (height.saturating_sub(fitted.height())) / 2;
        image::imageops::overlay(canvas, &fitted, i64::from(offset_x), i64::from(offset_y));
        Ok(())
    }

    // -- Text -----------------------------------------------------------------

    fn text_blocks(&self, layout: &CoverWrapLayout, request: &CoverRequest) -> Vec<CoverTextBlock> {
        let cover = &self.config.cover;
        let mut blocks = Vec::new();

        let front = layout.front_text_zone;
        let author_height = self.line_height_mm(cover.author_font_pt).min(front.height);
        let author_zone = Rect::new(
            front.x,
            front.bottom() - author_height,
            front.width,
            author_height,
        );
        // The title may grow down to the author band, never into it.
        let title_zone = Rect::new(
            front.x,
            front.y,
            front.width,
            (front.height - author_height).max(0.0),
        );
        let title = self.block_at_top(CoverPanel::Front, &title_zone, &request.title, cover.title_font_pt);
        let author = self.block_at_top(CoverPanel::Front, &author_zone, &request.author, cover.author_font_pt);
        blocks.extend(title);
        blocks.extend(author);

        let blurb = self.block_at_top(
            CoverPanel::Back,
            &layout.back_text_zone,
            &request.blurb,
            cover.blurb_font_pt,
        );
        blocks.extend(blurb);
        blocks
    }

    fn line_height_mm(&self, size_pt: f32) -> f32 {
        size_pt * 1.5 * MM_PER_PT
    }

    /// Wrap `text` into `zone` from its top edge; lines that do not fit are
    /// dropped, so the block never leaves the zone.
    fn block_at_top(
        &self,
        panel: CoverPanel,
        zone: &Rect,
        text: &str,
        size_pt: f32,
    ) -> Option<CoverTextBlock> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let glyph_mm = size_pt * self.config.typography.glyph_width_factor * MM_PER_PT;
        let chars_per_line = ((zone.width / glyph_mm).floor() as usize).max(1);
        let line_height = self.line_height_mm(size_pt);
        let max_lines = (zone.height / line_height).floor() as usize;

        let mut lines = wrap_text(text, chars_per_line);
        if lines.len() > max_lines {
            warn!(?panel, dropped = lines.len() - max_lines, "Cover text truncated to its zone");
            lines.truncate(max_lines);
        }
        if lines.is_empty() {
            return None;
        }
        Some(CoverTextBlock {
            panel,
            rect: Rect::new(zone.x, zone.y, zone.width, lines.len() as f32 * line_height),
            lines,
            size_pt,
        })
    }
}

/// Scale RGB towards black, keeping alpha.
fn darken(color: [u8; 4], factor: f32) -> [u8; 4] {
    let scale = |c: u8| (c as f32 * factor).round() as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}
