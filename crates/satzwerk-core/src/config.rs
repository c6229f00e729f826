// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.
//
// Paper calipers, margin bands, typography heuristics and cover geometry are
// all injected through `EngineConfig`; nothing in the engine reads a global.

use serde::{Deserialize, Serialize};

use crate::catalog::TrimCatalog;
use crate::error::{Result, SatzwerkError};
use crate::types::PaperClass;

/// Immutable settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub paper: PaperConfig,
    pub spine: SpineConfig,
    pub margins: MarginConfig,
    pub typography: Typography,
    pub book: BookConfig,
    pub cover: CoverConfig,
    pub assets: AssetConfig,
}

/// Physical properties of one paper stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperProfile {
    /// Thickness of one page (half a leaf) in millimetres.
    pub caliper_mm: f32,
    /// Bulk factor applied to the caliper when the block is bound.
    pub spine_density: f32,
}

impl PaperProfile {
    /// Spine millimetres contributed by each page.
    pub fn thickness_factor(&self) -> f32 {
        self.caliper_mm * self.spine_density
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperConfig {
    pub cream: PaperProfile,
    pub white: PaperProfile,
    pub color: PaperProfile,
}

impl PaperConfig {
    /// Caliper and bulk for `paper`.
    pub fn profile(&self, paper: PaperClass) -> PaperProfile {
        match paper {
            PaperClass::Cream => self.cream,
            PaperClass::White => self.white,
            PaperClass::Color => self.color,
        }
    }
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            cream: PaperProfile {
                caliper_mm: 0.0635,
                spine_density: 1.0,
            },
            white: PaperProfile {
                caliper_mm: 0.0572,
                spine_density: 1.0,
            },
            // Coated colour stock bulks up more than uncoated mono stock.
            color: PaperProfile {
                caliper_mm: 0.0596,
                spine_density: 1.1,
            },
        }
    }
}

/// Spine text size used once the spine is at least `min_spine_mm` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontStep {
    pub min_spine_mm: f32,
    pub size_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineConfig {
    /// Floor for very thin books.
    pub minimum_mm: f32,
    /// Spine text is only set when the spine is wider than this.
    pub legibility_threshold_mm: f32,
    /// Ascending by `min_spine_mm`.
    pub font_steps: Vec<FontStep>,
    /// Keep-clear distance at the head and foot of the spine.
    pub vertical_margin_mm: f32,
}

impl Default for SpineConfig {
    fn default() -> Self {
        Self {
            minimum_mm: 2.0,
            legibility_threshold_mm: 6.0,
            font_steps: vec![
                FontStep {
                    min_spine_mm: 0.0,
                    size_pt: 8.0,
                },
                FontStep {
                    min_spine_mm: 10.0,
                    size_pt: 10.0,
                },
                FontStep {
                    min_spine_mm: 15.0,
                    size_pt: 12.0,
                },
                FontStep {
                    min_spine_mm: 22.0,
                    size_pt: 14.0,
                },
                FontStep {
                    min_spine_mm: 30.0,
                    size_pt: 18.0,
                },
            ],
            vertical_margin_mm: 12.7,
        }
    }
}

/// Inner margin used once the book has more than `above_pages` pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBand {
    pub above_pages: u32,
    pub inner_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    pub bleed_mm: f32,
    pub outer_mm: f32,
    pub top_mm: f32,
    /// Leaves room for the footer page number.
    pub bottom_mm: f32,
    /// Ascending by `above_pages`; the first band starts at 0.
    pub inner_bands: Vec<MarginBand>,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            bleed_mm: 3.175,
            outer_mm: 15.875,
            top_mm: 19.05,
            bottom_mm: 22.225,
            inner_bands: vec![
                MarginBand {
                    above_pages: 0,
                    inner_mm: 12.7,
                },
                MarginBand {
                    above_pages: 150,
                    inner_mm: 15.875,
                },
                MarginBand {
                    above_pages: 300,
                    inner_mm: 19.05,
                },
                MarginBand {
                    above_pages: 500,
                    inner_mm: 22.225,
                },
            ],
        }
    }
}

/// Text flow heuristics. Not a shaper: glyphs are assumed to be
/// `glyph_width_factor * font size` wide on average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub body_font_pt: f32,
    pub glyph_width_factor: f32,
    pub line_height_pt: f32,
    pub heading_font_pt: f32,
    /// Vertical space reserved for the chapter heading on an opening page.
    pub heading_block_mm: f32,
    /// Illustrations never take more than this share of the text block height.
    pub illustration_max_fraction: f32,
    /// Height / width assumed when an illustration carries no ratio.
    pub default_aspect_ratio: f32,
    pub contents_entries_per_page: usize,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            body_font_pt: 12.0,
            glyph_width_factor: 0.5,
            line_height_pt: 18.0,
            heading_font_pt: 20.0,
            heading_block_mm: 63.5,
            illustration_max_fraction: 0.45,
            default_aspect_ratio: 0.75,
            contents_entries_per_page: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Print vendors refuse interiors shorter than this.
    pub minimum_pages: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self { minimum_pages: 24 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    pub barcode_width_mm: f32,
    pub barcode_height_mm: f32,
    /// Distance from the back panel's bottom and right trim edges.
    pub barcode_inset_mm: f32,
    /// Keep-clear distance between trim edges, the barcode and any text.
    pub safety_margin_mm: f32,
    /// RGBA fallback fill for panels without artwork.
    pub brand_color: [u8; 4],
    pub raster_dpi: f32,
    pub title_font_pt: f32,
    pub author_font_pt: f32,
    pub blurb_font_pt: f32,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            barcode_width_mm: 50.8,
            barcode_height_mm: 30.48,
            barcode_inset_mm: 6.35,
            safety_margin_mm: 6.35,
            brand_color: [38, 70, 83, 255],
            raster_dpi: 300.0,
            title_font_pt: 32.0,
            author_font_pt: 16.0,
            blurb_font_pt: 11.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub timeout_ms: u64,
    /// Resolution placeholder illustrations are drawn at on interior pages.
    pub placeholder_dpi: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            placeholder_dpi: 150.0,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration (missing sections take their defaults) and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot lay out with.
    pub fn validate(&self) -> Result<()> {
        for paper in PaperClass::all() {
            let profile = self.paper.profile(paper);
            require_positive(&format!("{paper:?} caliper"), profile.caliper_mm)?;
            require_positive(&format!("{paper:?} spine density"), profile.spine_density)?;
        }

        require_positive("minimum spine", self.spine.minimum_mm)?;
        require_positive("spine vertical margin", self.spine.vertical_margin_mm)?;
        if self.spine.font_steps.is_empty() {
            return Err(invalid("spine font steps must not be empty"));
        }
        if self
            .spine
            .font_steps
            .windows(2)
            .any(|pair| pair[0].min_spine_mm >= pair[1].min_spine_mm)
        {
            return Err(invalid("spine font steps must be strictly ascending"));
        }

        let margins = &self.margins;
        require_positive("bleed", margins.bleed_mm)?;
        require_positive("outer margin", margins.outer_mm)?;
        require_positive("top margin", margins.top_mm)?;
        require_positive("bottom margin", margins.bottom_mm)?;
        match margins.inner_bands.first() {
            Some(band) if band.above_pages == 0 => {}
            _ => return Err(invalid("the first inner margin band must start at 0 pages")),
        }
        for band in &margins.inner_bands {
            require_positive("inner margin", band.inner_mm)?;
        }
        if margins.inner_bands.windows(2).any(|pair| {
            pair[0].above_pages >= pair[1].above_pages || pair[0].inner_mm > pair[1].inner_mm
        }) {
            return Err(invalid(
                "inner margin bands must ascend in page count without shrinking",
            ));
        }

        let typo = &self.typography;
        require_positive("body font size", typo.body_font_pt)?;
        require_positive("glyph width factor", typo.glyph_width_factor)?;
        require_positive("line height", typo.line_height_pt)?;
        require_positive("heading font size", typo.heading_font_pt)?;
        require_positive("default aspect ratio", typo.default_aspect_ratio)?;
        if typo.heading_block_mm < 0.0 {
            return Err(invalid("heading block must not be negative"));
        }
        if !(typo.illustration_max_fraction > 0.0 && typo.illustration_max_fraction <= 1.0) {
            return Err(invalid("illustration fraction must be in (0, 1]"));
        }
        if typo.contents_entries_per_page == 0 {
            return Err(invalid("contents pages must hold at least one entry"));
        }

        if self.book.minimum_pages == 0 {
            return Err(invalid("minimum page count must be at least 1"));
        }

        let cover = &self.cover;
        require_positive("barcode width", cover.barcode_width_mm)?;
        require_positive("barcode height", cover.barcode_height_mm)?;
        require_positive("raster dpi", cover.raster_dpi)?;
        require_positive("cover title size", cover.title_font_pt)?;
        require_positive("cover author size", cover.author_font_pt)?;
        require_positive("blurb size", cover.blurb_font_pt)?;
        if cover.barcode_inset_mm < 0.0 || cover.safety_margin_mm < 0.0 {
            return Err(invalid("cover insets must not be negative"));
        }
        for trim in TrimCatalog::all() {
            let needed_width = cover.barcode_width_mm + cover.barcode_inset_mm;
            let needed_height =
                cover.barcode_height_mm + cover.barcode_inset_mm + 2.0 * cover.safety_margin_mm;
            if needed_width > trim.width_mm || needed_height > trim.height_mm {
                return Err(invalid(&format!(
                    "barcode zone does not fit the {} back panel",
                    trim.name
                )));
            }
        }

        if self.assets.timeout_ms == 0 {
            return Err(invalid("asset timeout must be positive"));
        }
        require_positive("placeholder dpi", self.assets.placeholder_dpi)?;
        Ok(())
    }
}

fn require_positive(what: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(&format!("{what} must be positive, got {value}")))
    }
}

fn invalid(message: &str) -> SatzwerkError {
    SatzwerkError::InvalidConfig(message.to_string())
}
