// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout spec resolver — bleed and margins for a page count.
//
// The inner (gutter) margin follows the discrete bands print vendors publish:
// a thicker book swallows more of the page into the binding, so the gutter
// steps up at fixed page counts. Outer, top and bottom margins never change.

use satzwerk_core::EngineConfig;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::types::{LayoutSpec, Margins, PaperClass, TrimSize};
use tracing::debug;

/// Derives a [`LayoutSpec`] from a page count, paper class and trim.
pub struct LayoutSpecResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> LayoutSpecResolver<'a> {
    /// Resolver backed by the margin and paper sections of `config`.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve the layout. `None` asks for the ghost-pass placeholder, which
    /// uses the base (thinnest book) gutter.
    pub fn resolve(
        &self,
        page_count_hint: Option<u32>,
        paper: PaperClass,
        trim: &TrimSize,
    ) -> Result<LayoutSpec> {
        if !(trim.width_mm > 0.0 && trim.height_mm > 0.0) {
            return Err(SatzwerkError::InvalidConfig(format!(
                "trim {} has non-positive dimensions",
                trim.name
            )));
        }
        let inner = match page_count_hint {
            Some(0) => return Err(SatzwerkError::InvalidPageCount(0)),
            Some(pages) => self.inner_margin(pages)?,
            None => self.base_inner_margin()?,
        };

        let margins = &self.config.margins;
        let spec = LayoutSpec {
            trim: trim.clone(),
            bleed: margins.bleed_mm,
            margins: Margins {
                inner,
                outer: margins.outer_mm,
                top: margins.top_mm,
                bottom: margins.bottom_mm,
            },
            paper,
            page_count_hint,
        };

        if spec.content_width() <= 0.0 || spec.content_height() <= 0.0 {
            return Err(SatzwerkError::InvalidConfig(format!(
                "margins leave no text block on trim {}",
                trim.name
            )));
        }

        debug!(
            trim = %trim.name,
            ?page_count_hint,
            inner,
            "Layout spec resolved"
        );
        Ok(spec)
    }

    /// Gutter for a book of `page_count` pages: the last band whose
    /// threshold the count exceeds.
    pub fn inner_margin(&self, page_count: u32) -> Result<f32> {
        let base = self.base_inner_margin()?;
        Ok(self
            .config
            .margins
            .inner_bands
            .iter()
            .filter(|band| page_count > band.above_pages)
            .last()
            .map_or(base, |band| band.inner_mm))
    }

    fn base_inner_margin(&self) -> Result<f32> {
        self.config
            .margins
            .inner_bands
            .first()
            .map(|band| band.inner_mm)
            .ok_or_else(|| SatzwerkError::InvalidConfig("no inner margin bands".into()))
    }
}
