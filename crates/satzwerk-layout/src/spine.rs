// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spine model — spine thickness from page count and paper stock.

use satzwerk_core::EngineConfig;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::types::PaperClass;

/// Derives spine width from page count and paper class.
pub struct SpineModel<'a> {
    config: &'a EngineConfig,
}

impl<'a> SpineModel<'a> {
    /// Model backed by the paper and spine sections of `config`.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// `max(page_count * thickness_factor(paper), minimum)` in millimetres.
    ///
    /// Very thin books would otherwise get a near-zero spine that prints as a
    /// hairline, hence the floor.
    pub fn spine_width(&self, page_count: u32, paper: PaperClass) -> Result<f32> {
        if page_count == 0 {
            return Err(SatzwerkError::InvalidPageCount(page_count));
        }
        let factor = self.config.paper.profile(paper).thickness_factor();
        Ok((page_count as f32 * factor).max(self.config.spine.minimum_mm))
    }

    /// Whether a spine this wide can carry legible text.
    pub fn supports_text(&self, spine_width_mm: f32) -> bool {
        spine_width_mm > self.config.spine.legibility_threshold_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_book_gets_minimum_spine_exactly() {
        let config = EngineConfig::default();
        let model = SpineModel::new(&config);
        assert_eq!(
            model.spine_width(24, PaperClass::Cream).unwrap(),
            config.spine.minimum_mm
        );
    }

    #[test]
    fn spine_never_below_minimum_and_never_shrinks() {
        let config = EngineConfig::default();
        let model = SpineModel::new(&config);
        for paper in PaperClass::all() {
            let mut previous = 0.0_f32;
            for pages in 24..=900 {
                let width = model.spine_width(pages, paper).unwrap();
                assert!(width >= config.spine.minimum_mm);
                assert!(width >= previous, "{paper:?} shrank at {pages} pages");
                previous = width;
            }
        }
    }

    #[test]
    fn color_spine_is_thicker() {
        let config = EngineConfig::default();
        let model = SpineModel::new(&config);
        let color = model.spine_width(300, PaperClass::Color).unwrap();
        assert!(color > model.spine_width(300, PaperClass::Cream).unwrap());
        assert!(color > model.spine_width(300, PaperClass::White).unwrap());
    }

    #[test]
    fn zero_pages_is_a_configuration_error() {
        let config = EngineConfig::default();
        let model = SpineModel::new(&config);
        assert!(matches!(
            model.spine_width(0, PaperClass::White),
            Err(SatzwerkError::InvalidPageCount(0))
        ));
    }

    #[test]
    fn thin_spine_does_not_support_text() {
        let config = EngineConfig::default();
        let model = SpineModel::new(&config);
        let thin = model.spine_width(40, PaperClass::White).unwrap();
        let thick = model.spine_width(300, PaperClass::White).unwrap();
        assert!(!model.supports_text(thin));
        assert!(model.supports_text(thick));
    }
}
