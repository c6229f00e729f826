// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cover wrap geometry — one flat canvas holding back panel, spine and front
// panel, surrounded by bleed.
//
// The barcode zone sits in the back panel's bottom-right corner. Text zones
// are computed so they can never reach into it; the composer only ever draws
// text inside these zones.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use satzwerk_core::EngineConfig;
use satzwerk_core::error::Result;
use satzwerk_core::notice::Notice;
use satzwerk_core::types::{MM_PER_PT, PaperClass, Rect, TrimSize};

use crate::spine::SpineModel;

/// Panel rectangles of a full cover wrap, in canvas millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverWrapLayout {
    pub total_width: f32,
    pub total_height: f32,
    pub bleed: f32,
    pub spine_width: f32,
    pub back_panel: Rect,
    pub spine_panel: Rect,
    pub front_panel: Rect,
    /// Reserved for the retailer barcode. Nothing else is drawn here.
    pub barcode_zone: Rect,
    pub back_text_zone: Rect,
    pub front_text_zone: Rect,
}

impl CoverWrapLayout {
    /// Lay out the wrap for `page_count` pages of `paper`.
    pub fn compute(
        trim: &TrimSize,
        page_count: u32,
        paper: PaperClass,
        config: &EngineConfig,
    ) -> Result<Self> {
        let spine_width = SpineModel::new(config).spine_width(page_count, paper)?;
        let layout = Self::with_spine_width(trim, spine_width, config);
        debug!(
            trim = %trim.name,
            page_count,
            spine_width,
            total_width = layout.total_width,
            "Cover wrap computed"
        );
        Ok(layout)
    }

    /// Geometry for an explicit spine width.
    pub fn with_spine_width(trim: &TrimSize, spine_width: f32, config: &EngineConfig) -> Self {
        let bleed = config.margins.bleed_mm;
        let cover = &config.cover;
        let safety = cover.safety_margin_mm;

        let back_panel = Rect::new(bleed, bleed, trim.width_mm, trim.height_mm);
        let spine_panel = Rect::new(back_panel.right(), bleed, spine_width, trim.height_mm);
        let front_panel = Rect::new(spine_panel.right(), bleed, trim.width_mm, trim.height_mm);

        let barcode_zone = Rect::new(
            back_panel.right() - cover.barcode_inset_mm - cover.barcode_width_mm,
            back_panel.bottom() - cover.barcode_inset_mm - cover.barcode_height_mm,
            cover.barcode_width_mm,
            cover.barcode_height_mm,
        );

        let back_text_top = back_panel.y + safety;
        let back_text_zone = Rect::new(
            back_panel.x + safety,
            back_text_top,
            (back_panel.width - 2.0 * safety).max(0.0),
            (barcode_zone.y - safety - back_text_top).max(0.0),
        );

        Self {
            total_width: 2.0 * trim.width_mm + spine_width + 2.0 * bleed,
            total_height: trim.height_mm + 2.0 * bleed,
            bleed,
            spine_width,
            back_panel,
            spine_panel,
            front_panel,
            barcode_zone,
            back_text_zone,
            front_text_zone: front_panel.inset(safety),
        }
    }

    /// Back panel extended into the bleed on its three outer edges.
    pub fn back_with_bleed(&self) -> Rect {
        Rect::new(0.0, 0.0, self.back_panel.right(), self.total_height)
    }

    /// Spine extended into the head and foot bleed.
    pub fn spine_with_bleed(&self) -> Rect {
        Rect::new(self.spine_panel.x, 0.0, self.spine_width, self.total_height)
    }

    /// Front panel extended into the bleed on its three outer edges.
    pub fn front_with_bleed(&self) -> Rect {
        Rect::new(
            self.front_panel.x,
            0.0,
            self.total_width - self.front_panel.x,
            self.total_height,
        )
    }
}

/// Rotated title/author line on the spine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpineTextPlan {
    pub text: String,
    pub size_pt: f32,
    /// Clockwise, so the text reads top to bottom.
    pub rotation_deg: f32,
    /// Centre of the text run, in canvas millimetres.
    pub center_x: f32,
    pub center_y: f32,
    /// Estimated run length before scaling.
    pub measured_length_mm: f32,
    /// Uniform scale applied so the run fits; 1.0 when it already does.
    pub scale: f32,
}

impl SpineTextPlan {
    /// Font size after scaling.
    pub fn effective_size_pt(&self) -> f32 {
        self.size_pt * self.scale
    }

    pub fn effective_length_mm(&self) -> f32 {
        self.measured_length_mm * self.scale
    }

    /// Plan the spine line, or explain why there is none.
    pub fn for_spine(
        layout: &CoverWrapLayout,
        title: &str,
        author: &str,
        config: &EngineConfig,
    ) -> (Option<Self>, Option<Notice>) {
        let spine_width = layout.spine_width;
        if !SpineModel::new(config).supports_text(spine_width) {
            info!(spine_width, "Spine too narrow for text");
            return (
                None,
                Some(Notice::SpineTextOmitted {
                    spine_width_mm: spine_width,
                }),
            );
        }

        let steps = &config.spine.font_steps;
        let size_pt = steps
            .iter()
            .filter(|step| step.min_spine_mm <= spine_width)
            .last()
            .or(steps.first())
            .map_or(8.0, |step| step.size_pt);

        let text = format!("{title} · {author}");
        let measured_length_mm = text.chars().count() as f32
            * size_pt
            * config.typography.glyph_width_factor
            * MM_PER_PT;
        let safe_run = layout.total_height - 1.5 * config.spine.vertical_margin_mm;

        let (scale, notice) = if measured_length_mm > safe_run {
            let scale = safe_run / measured_length_mm;
            info!(scale, "Spine text scaled to fit");
            (scale, Some(Notice::SpineTextScaled { scale }))
        } else {
            (1.0, None)
        };

        let plan = Self {
            text,
            size_pt,
            rotation_deg: 90.0,
            center_x: layout.spine_panel.x + spine_width / 2.0,
            center_y: layout.total_height / 2.0,
            measured_length_mm,
            scale,
        };
        (Some(plan), notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satzwerk_core::TrimCatalog;

    fn six_by_nine() -> TrimSize {
        TrimCatalog::lookup("6x9").unwrap()
    }

    #[test]
    fn wrap_dimensions_follow_trim_spine_and_bleed() {
        let config = EngineConfig::default();
        let trim = six_by_nine();
        let layout = CoverWrapLayout::compute(&trim, 200, PaperClass::White, &config).unwrap();
        let spine = SpineModel::new(&config)
            .spine_width(200, PaperClass::White)
            .unwrap();
        let bleed = config.margins.bleed_mm;

        assert!((layout.total_width - (2.0 * 152.4 + spine + 2.0 * bleed)).abs() < 1e-3);
        assert!((layout.total_height - (228.6 + 2.0 * bleed)).abs() < 1e-3);
        assert_eq!(layout.back_panel.x, bleed);
        assert_eq!(layout.spine_panel.x, layout.back_panel.right());
        assert_eq!(layout.front_panel.x, layout.spine_panel.right());
        assert!((layout.front_panel.right() + bleed - layout.total_width).abs() < 1e-3);
    }

    #[test]
    fn barcode_is_anchored_to_back_corner() {
        let config = EngineConfig::default();
        let layout = CoverWrapLayout::compute(&six_by_nine(), 120, PaperClass::Cream, &config).unwrap();
        let inset = config.cover.barcode_inset_mm;
        assert!((layout.back_panel.right() - layout.barcode_zone.right() - inset).abs() < 1e-3);
        assert!((layout.back_panel.bottom() - layout.barcode_zone.bottom() - inset).abs() < 1e-3);
    }

    #[test]
    fn barcode_never_meets_back_text_on_any_trim() {
        let config = EngineConfig::default();
        for trim in TrimCatalog::all() {
            for spine_width in [2.0_f32, 6.0, 12.5, 30.0, 60.0] {
                let layout = CoverWrapLayout::with_spine_width(&trim, spine_width, &config);
                assert!(
                    !layout.barcode_zone.intersects(&layout.back_text_zone),
                    "{} at spine {spine_width}",
                    trim.name
                );
                assert!(layout.back_panel.contains(&layout.barcode_zone));
                assert!(layout.back_text_zone.height > 0.0);
                assert!(!layout.front_text_zone.intersects(&layout.barcode_zone));
            }
        }
    }

    #[test]
    fn panels_with_bleed_tile_the_canvas() {
        let config = EngineConfig::default();
        let layout = CoverWrapLayout::compute(&six_by_nine(), 300, PaperClass::Color, &config).unwrap();
        let widths = layout.back_with_bleed().width
            + layout.spine_with_bleed().width
            + layout.front_with_bleed().width;
        assert!((widths - layout.total_width).abs() < 1e-3);
    }

    #[test]
    fn zero_pages_is_rejected() {
        let config = EngineConfig::default();
        assert!(CoverWrapLayout::compute(&six_by_nine(), 0, PaperClass::White, &config).is_err());
    }

    #[test]
    fn thin_spine_omits_text() {
        let config = EngineConfig::default();
        let layout = CoverWrapLayout::compute(&six_by_nine(), 90, PaperClass::White, &config).unwrap();
        let (plan, notice) = SpineTextPlan::for_spine(&layout, "Harbor", "A. Writer", &config);
        assert!(plan.is_none());
        assert!(matches!(notice, Some(Notice::SpineTextOmitted { .. })));
    }

    #[test]
    fn spine_text_is_centred_and_sized_by_step() {
        let config = EngineConfig::default();
        let layout = CoverWrapLayout::compute(&six_by_nine(), 500, PaperClass::Color, &config).unwrap();
        let (plan, notice) =
            SpineTextPlan::for_spine(&layout, "The Quiet Harbor", "A. Writer", &config);
        let plan = plan.unwrap();
        assert!(notice.is_none());
        assert_eq!(plan.text, "The Quiet Harbor · A. Writer");
        assert_eq!(plan.size_pt, 18.0);
        assert_eq!(plan.scale, 1.0);
        assert_eq!(plan.rotation_deg, 90.0);
        assert!((plan.center_x - (layout.spine_panel.x + layout.spine_width / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn long_spine_text_is_scaled_not_clipped() {
        let config = EngineConfig::default();
        let layout = CoverWrapLayout::compute(&six_by_nine(), 500, PaperClass::Color, &config).unwrap();
        let title = "An Exceedingly Long Title About Lanterns, Harbors and the Night";
        let (plan, notice) = SpineTextPlan::for_spine(&layout, title, "Somebody Quite Verbose", &config);
        let plan = plan.unwrap();
        assert!(plan.scale < 1.0);
        assert!(matches!(notice, Some(Notice::SpineTextScaled { .. })));
        let safe_run = layout.total_height - 1.5 * config.spine.vertical_margin_mm;
        assert!((plan.effective_length_mm() - safe_run).abs() < 1e-2);
    }
}
