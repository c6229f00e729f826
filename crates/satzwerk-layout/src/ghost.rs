// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ghost paginator — pass 1.
//
// Margins depend on the page count and the page count depends on the
// margins. The ghost pass breaks the cycle: it flows every chapter with the
// placeholder (base band) gutter and only counts pages. The final pass then
// re-resolves the margins from this estimate.

use std::collections::BTreeMap;

use satzwerk_core::EngineConfig;
use satzwerk_core::config::Typography;
use satzwerk_core::error::Result;
use satzwerk_core::types::{BookSelection, LayoutSpec, Manuscript};
use tracing::{debug, info, instrument};

use crate::flow::flow_chapter;
use crate::margins::LayoutSpecResolver;
use crate::plan::padded_total;
use crate::text::TextMetrics;

/// Front-matter pages, counted directly rather than flowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter {
    pub has_dedication: bool,
    pub contents_pages: u32,
}

impl FrontMatter {
    /// Front matter pages for `manuscript`.
    pub fn for_manuscript(manuscript: &Manuscript, typography: &Typography) -> Self {
        let per_page = typography.contents_entries_per_page.max(1);
        Self {
            has_dedication: manuscript.dedication.is_some(),
            contents_pages: manuscript.chapters.len().div_ceil(per_page) as u32,
        }
    }

    /// Title, copyright, optional dedication, then the contents pages.
    pub fn page_count(&self) -> u32 {
        2 + u32::from(self.has_dedication) + self.contents_pages
    }
}

/// Output of the ghost pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostEstimate {
    pub estimated_total_pages: u32,
    pub chapter_start_pages: BTreeMap<usize, u32>,
    /// The placeholder spec the estimate was made with.
    pub spec: LayoutSpec,
}

/// Pass 1 as a step machine: one `step` per chapter.
pub struct GhostPaginator<'a> {
    manuscript: &'a Manuscript,
    minimum_pages: u32,
    spec: LayoutSpec,
    metrics: TextMetrics,
    next_page: u32,
    cursor: usize,
    chapter_start_pages: BTreeMap<usize, u32>,
}

impl<'a> GhostPaginator<'a> {
    /// Start pass 1 with the placeholder layout spec.
    pub fn new(
        manuscript: &'a Manuscript,
        selection: &BookSelection,
        config: &'a EngineConfig,
    ) -> Result<Self> {
        manuscript.ensure_paginatable()?;
        let spec =
            LayoutSpecResolver::new(config).resolve(None, selection.paper, &selection.trim)?;
        let metrics = TextMetrics::from_spec(&spec, &config.typography);
        let front = FrontMatter::for_manuscript(manuscript, &config.typography);
        Ok(Self {
            manuscript,
            minimum_pages: config.book.minimum_pages,
            spec,
            metrics,
            next_page: front.page_count() + 1,
            cursor: 0,
            chapter_start_pages: BTreeMap::new(),
        })
    }

    /// Count one chapter. Returns `false` once every chapter is counted.
    pub fn step(&mut self) -> bool {
        let Some(chapter) = self.manuscript.chapters.get(self.cursor) else {
            return false;
        };
        if self.next_page % 2 == 0 {
            self.next_page += 1;
        }
        self.chapter_start_pages
            .insert(chapter.index, self.next_page);

        let pages = flow_chapter(chapter, &self.metrics).page_count();
        debug!(
            chapter = chapter.index,
            start = self.next_page,
            pages,
            "Ghost chapter counted"
        );
        self.next_page += pages;
        self.cursor += 1;
        self.cursor < self.manuscript.chapters.len()
    }

    /// Pad the running total and return the estimate.
    pub fn finish(self) -> GhostEstimate {
        GhostEstimate {
            estimated_total_pages: padded_total(self.next_page - 1, self.minimum_pages),
            chapter_start_pages: self.chapter_start_pages,
            spec: self.spec,
        }
    }

    /// Run the whole pass.
    #[instrument(skip_all, fields(chapters = manuscript.chapters.len(), trim = %selection.trim.name))]
    pub fn estimate(
        manuscript: &'a Manuscript,
        selection: &BookSelection,
        config: &'a EngineConfig,
    ) -> Result<GhostEstimate> {
        let mut ghost = Self::new(manuscript, selection, config)?;
        while ghost.step() {}
        let estimate = ghost.finish();
        info!(
            estimated_total_pages = estimate.estimated_total_pages,
            "Ghost pagination complete"
        );
        Ok(estimate)
    }
}
