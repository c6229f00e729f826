// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Final render planner — pass 2.
//
// Re-resolves the layout spec from the ghost estimate, flows every chapter
// again with the corrected gutter and commits concrete pages. The contents
// pages are filled from this pass's start pages, never the ghost's, and
// cross-checked before the book is handed out.

use std::collections::BTreeMap;

use satzwerk_core::EngineConfig;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::notice::Notice;
use satzwerk_core::types::{BookSelection, Chapter, LayoutSpec, Manuscript, Parity, Rect};
use tracing::{debug, info, instrument, warn};

use crate::flow::{ChapterFlow, IllustrationPlacement, flow_chapter};
use crate::ghost::{FrontMatter, GhostEstimate};
use crate::margins::LayoutSpecResolver;
use crate::page::{Block, Page, PageKind};
use crate::plan::{ChapterBreakdown, PaginationPlan, padded_total};
use crate::text::{TextMetrics, ellipsize, fit_heading, wrap_text};

/// A fully planned interior: the authoritative plan plus the page stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBook {
    pub spec: LayoutSpec,
    pub plan: PaginationPlan,
    pub pages: Vec<Page>,
    pub notices: Vec<Notice>,
    /// Page count the ghost pass estimated (and the margins were resolved from).
    pub ghost_total_pages: u32,
}

impl PlannedBook {
    /// Check that every contents entry names the page its chapter really
    /// starts on, and that every chapter has exactly one entry.
    pub fn verify_contents(&self) -> Result<()> {
        let mut listed: BTreeMap<usize, u32> = BTreeMap::new();
        for page in self.pages.iter().filter(|p| p.kind == PageKind::Contents) {
            for block in &page.blocks {
                if let Block::ContentsEntry { chapter, page, .. } = block {
                    listed.insert(*chapter, *page);
                }
            }
        }

        for (chapter, planned) in &self.plan.chapter_start_pages {
            let contents = listed.get(chapter).copied().unwrap_or(0);
            let opening = self
                .pages
                .iter()
                .find(|p| p.kind == PageKind::ChapterOpening(*chapter))
                .map_or(0, |p| p.number);
            if contents != *planned || opening != *planned {
                return Err(SatzwerkError::InconsistentPlan {
                    chapter: *chapter,
                    planned: *planned,
                    contents,
                });
            }
        }
        if listed.len() != self.plan.chapter_start_pages.len() {
            let stray = listed
                .iter()
                .find(|(chapter, _)| !self.plan.chapter_start_pages.contains_key(chapter));
            if let Some((chapter, contents)) = stray {
                return Err(SatzwerkError::InconsistentPlan {
                    chapter: *chapter,
                    planned: 0,
                    contents: *contents,
                });
            }
        }
        Ok(())
    }
}

/// Pass 2 as a step machine: `new`, one `step` per chapter, then `finish`.
pub struct FinalRenderPlanner<'a> {
    manuscript: &'a Manuscript,
    config: &'a EngineConfig,
    spec: LayoutSpec,
    metrics: TextMetrics,
    ghost_total_pages: u32,
    front: FrontMatter,
    pages: Vec<Page>,
    breakdown: Vec<ChapterBreakdown>,
    chapter_start_pages: BTreeMap<usize, u32>,
    notices: Vec<Notice>,
    cursor: usize,
}

impl<'a> FinalRenderPlanner<'a> {
    /// Resolve the final spec from `ghost` and lay out the front matter.
    pub fn new(
        manuscript: &'a Manuscript,
        ghost: &GhostEstimate,
        selection: &BookSelection,
        config: &'a EngineConfig,
    ) -> Result<Self> {
        manuscript.ensure_paginatable()?;
        let spec = LayoutSpecResolver::new(config).resolve(
            Some(ghost.estimated_total_pages),
            selection.paper,
            &selection.trim,
        )?;
        let metrics = TextMetrics::from_spec(&spec, &config.typography);
        let front = FrontMatter::for_manuscript(manuscript, &config.typography);

        let mut planner = Self {
            manuscript,
            config,
            spec,
            metrics,
            ghost_total_pages: ghost.estimated_total_pages,
            front,
            pages: Vec::new(),
            breakdown: Vec::new(),
            chapter_start_pages: BTreeMap::new(),
            notices: Vec::new(),
            cursor: 0,
        };
        planner.push_front_matter();
        Ok(planner)
    }

    fn next_page(&self) -> u32 {
        self.pages.len() as u32 + 1
    }

    fn blank_page(&self, kind: PageKind) -> Page {
        let number = self.next_page();
        let parity = Parity::of(number);
        Page {
            number,
            parity,
            kind,
            content_box: self.spec.content_box(parity),
            blocks: Vec::new(),
        }
    }

    fn push_front_matter(&mut self) {
        let manuscript = self.manuscript;
        let typography = &self.config.typography;

        let mut title = self.blank_page(PageKind::Title);
        let content = title.content_box;
        let top = content.y + content.height / 3.0;
        let fitted = fit_heading(
            &manuscript.title,
            content.width,
            content.height / 4.0,
            typography.heading_font_pt * 1.5,
            typography,
        );
        let heading_height = fitted.height_mm();
        title.blocks.push(Block::Heading {
            rect: Rect::new(content.x, top, content.width, heading_height),
            lines: fitted.lines,
            size_pt: fitted.size_pt,
        });
        let author = wrap_text(&manuscript.author, self.metrics.chars_per_line);
        title.blocks.push(Block::Text {
            rect: Rect::new(
                content.x,
                top + heading_height + self.metrics.line_height_mm,
                content.width,
                author.len() as f32 * self.metrics.line_height_mm,
            ),
            lines: author,
        });
        self.pages.push(title);

        let mut copyright = self.blank_page(PageKind::Copyright);
        let lines = wrap_text(&manuscript.copyright_text(), self.metrics.chars_per_line);
        let height = lines.len() as f32 * self.metrics.line_height_mm;
        let content = copyright.content_box;
        copyright.blocks.push(Block::Text {
            rect: Rect::new(content.x, content.bottom() - height, content.width, height),
            lines,
        });
        self.pages.push(copyright);

        if let Some(dedication) = &manuscript.dedication {
            let mut page = self.blank_page(PageKind::Dedication);
            let lines = wrap_text(dedication, self.metrics.chars_per_line);
            let height = lines.len() as f32 * self.metrics.line_height_mm;
            let content = page.content_box;
            page.blocks.push(Block::Text {
                rect: Rect::new(content.x, content.y + content.height / 4.0, content.width, height),
                lines,
            });
            self.pages.push(page);
        }

        // Entries are filled in by `finish`, once start pages are final.
        for _ in 0..self.front.contents_pages {
            let page = self.blank_page(PageKind::Contents);
            self.pages.push(page);
        }
    }

    /// Plan one chapter. Returns `false` once every chapter is planned.
    pub fn step(&mut self) -> bool {
        let manuscript = self.manuscript;
        let Some(chapter) = manuscript.chapters.get(self.cursor) else {
            return false;
        };

        let blank_before = self.next_page() % 2 == 0;
        if blank_before {
            let blank = self.blank_page(PageKind::Blank);
            self.pages.push(blank);
        }

        let start_page = self.next_page();
        let flow = flow_chapter(chapter, &self.metrics);
        self.record_flow_notices(chapter, &flow, start_page);
        self.commit_chapter(chapter, &flow);

        debug!(
            chapter = chapter.index,
            start_page,
            pages = flow.page_count(),
            blank_before,
            "Chapter planned"
        );

        self.chapter_start_pages.insert(chapter.index, start_page);
        self.breakdown.push(ChapterBreakdown {
            index: chapter.index,
            start_page,
            page_count: flow.page_count(),
            blank_before,
        });
        self.cursor += 1;
        self.cursor < manuscript.chapters.len()
    }

    fn record_flow_notices(&mut self, chapter: &Chapter, flow: &ChapterFlow, start_page: u32) {
        if flow.is_empty() {
            warn!(chapter = chapter.index, "Chapter has no text; clamped to one page");
            self.notices.push(Notice::EmptyChapter {
                chapter: chapter.index,
            });
        }
        match flow.illustration {
            IllustrationPlacement::Deferred { .. } => {
                info!(chapter = chapter.index, "Illustration deferred to next page");
                self.notices.push(Notice::IllustrationDeferred {
                    chapter: chapter.index,
                    to_page: start_page + 1,
                });
            }
            IllustrationPlacement::Skipped => {
                warn!(chapter = chapter.index, "Illustration does not fit; skipped");
                self.notices.push(Notice::IllustrationSkipped {
                    chapter: chapter.index,
                });
            }
            IllustrationPlacement::None | IllustrationPlacement::Opening { .. } => {}
        }
    }

    fn commit_chapter(&mut self, chapter: &Chapter, flow: &ChapterFlow) {
        let line_height = self.metrics.line_height_mm;
        let typography = &self.config.typography;

        for (slice_index, slice) in flow.pages.iter().enumerate() {
            let kind = if slice_index == 0 {
                PageKind::ChapterOpening(chapter.index)
            } else {
                PageKind::ChapterBody(chapter.index)
            };
            let mut page = self.blank_page(kind);
            let content = page.content_box;
            let mut y = content.y;

            if slice_index == 0 {
                let fitted = fit_heading(
                    &chapter.title,
                    content.width,
                    self.metrics.heading_block_mm,
                    typography.heading_font_pt,
                    typography,
                );
                page.blocks.push(Block::Heading {
                    rect: Rect::new(content.x, y, content.width, self.metrics.heading_block_mm),
                    lines: fitted.lines,
                    size_pt: fitted.size_pt,
                });
                y += self.metrics.heading_block_mm;
            }

            if let (Some((width, height)), Some(image)) = (slice.illustration, &chapter.illustration)
            {
                page.blocks.push(Block::Illustration {
                    rect: Rect::new(content.x + (content.width - width) / 2.0, y, width, height),
                    image: image.clone(),
                });
                y += height + line_height;
            }

            let lines = flow.slice_lines(slice);
            if !lines.is_empty() {
                page.blocks.push(Block::Text {
                    rect: Rect::new(content.x, y, content.width, lines.len() as f32 * line_height),
                    lines: lines.to_vec(),
                });
            }

            page.blocks.push(Block::Footer {
                rect: self.footer_rect(&content),
                number: page.number,
            });
            self.pages.push(page);
        }
    }

    /// Centred in the bottom margin.
    fn footer_rect(&self, content: &Rect) -> Rect {
        let line_height = self.metrics.line_height_mm;
        let y = content.bottom() + (self.spec.margins.bottom - line_height) / 2.0;
        Rect::new(content.x, y, content.width, line_height)
    }

    /// Pad the book, fill the contents pages from this pass and verify them.
    pub fn finish(mut self) -> Result<PlannedBook> {
        let total_pages = padded_total(self.next_page() - 1, self.config.book.minimum_pages);
        while self.next_page() <= total_pages {
            let padding = self.blank_page(PageKind::Padding);
            self.pages.push(padding);
        }

        self.fill_contents();

        let book = PlannedBook {
            spec: self.spec,
            plan: PaginationPlan {
                total_pages,
                chapter_start_pages: self.chapter_start_pages,
                chapters: self.breakdown,
            },
            pages: self.pages,
            notices: self.notices,
            ghost_total_pages: self.ghost_total_pages,
        };
        book.verify_contents()?;
        Ok(book)
    }

    fn fill_contents(&mut self) {
        let config = self.config;
        let typography = &config.typography;
        let per_page = typography.contents_entries_per_page.max(1);
        let line_height = self.metrics.line_height_mm;
        let chars_per_line = self.metrics.chars_per_line;
        let entries: Vec<(usize, String, u32)> = self
            .manuscript
            .chapters
            .iter()
            .filter_map(|chapter| {
                self.chapter_start_pages.get(&chapter.index).map(|page| {
                    // Title, a two-glyph gap, then the right-aligned number.
                    let room = chars_per_line.saturating_sub(page.to_string().len() + 2);
                    (chapter.index, ellipsize(&chapter.title, room.max(1)), *page)
                })
            })
            .collect();

        let contents_pages = self
            .pages
            .iter_mut()
            .filter(|page| page.kind == PageKind::Contents);
        for (page_index, (page, chunk)) in contents_pages.zip(entries.chunks(per_page)).enumerate()
        {
            let content = page.content_box;
            let mut y = content.y;
            if page_index == 0 {
                let height = typography.heading_font_pt * 2.0 * satzwerk_core::MM_PER_PT;
                let fitted = fit_heading(
                    "Contents",
                    content.width,
                    height,
                    typography.heading_font_pt,
                    typography,
                );
                page.blocks.push(Block::Heading {
                    rect: Rect::new(content.x, y, content.width, height),
                    lines: fitted.lines,
                    size_pt: fitted.size_pt,
                });
                y += height + line_height;
            }
            for (chapter, title, start) in chunk {
                page.blocks.push(Block::ContentsEntry {
                    rect: Rect::new(content.x, y, content.width, line_height),
                    chapter: *chapter,
                    title: title.clone(),
                    page: *start,
                });
                y += line_height;
            }
        }
    }

    /// Run the whole pass.
    #[instrument(skip_all, fields(chapters = manuscript.chapters.len(), ghost_total = ghost.estimated_total_pages))]
    pub fn plan(
        manuscript: &'a Manuscript,
        ghost: &GhostEstimate,
        selection: &BookSelection,
        config: &'a EngineConfig,
    ) -> Result<PlannedBook> {
        let mut planner = Self::new(manuscript, ghost, selection, config)?;
        while planner.step() {}
        let book = planner.finish()?;
        info!(
            total_pages = book.plan.total_pages,
            notices = book.notices.len(),
            "Final pagination complete"
        );
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satzwerk_core::types::{ImageRef, Theme};

    use crate::ghost::GhostPaginator;
    use crate::text::{estimated_width_mm, heading_line_height_mm};

    fn manuscript(chapter_words: &[usize]) -> Manuscript {
        Manuscript {
            title: "The Quiet Harbor".into(),
            author: "A. Writer".into(),
            dedication: Some("For the keepers.".into()),
            copyright: None,
            chapters: chapter_words
                .iter()
                .enumerate()
                .map(|(index, words)| Chapter {
                    index,
                    title: format!("Chapter {}", index + 1),
                    body: vec!["tide"; *words].join(" "),
                    illustration: (index % 2 == 0).then_some(ImageRef::Placeholder(Theme::Nature)),
                })
                .collect(),
        }
    }

    fn plan(book: &Manuscript, config: &EngineConfig) -> PlannedBook {
        let selection = BookSelection::parse("6x9", "white").unwrap();
        let ghost = GhostPaginator::estimate(book, &selection, config).unwrap();
        FinalRenderPlanner::plan(book, &ghost, &selection, config).unwrap()
    }

    #[test]
    fn pages_are_numbered_sequentially_with_matching_footers() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[800, 3000, 10, 2200]), &config);
        assert_eq!(book.pages.len() as u32, book.plan.total_pages);
        for (i, page) in book.pages.iter().enumerate() {
            assert_eq!(page.number, i as u32 + 1);
            if let Some(number) = page.footer_number() {
                assert_eq!(number, page.number);
            }
        }
    }

    #[test]
    fn gutter_mirrors_with_parity() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[3000]), &config);
        let recto = book.pages.iter().find(|p| p.parity == Parity::Recto).unwrap();
        let verso = book.pages.iter().find(|p| p.parity == Parity::Verso).unwrap();
        assert_eq!(recto.content_box.x, book.spec.margins.inner);
        assert_eq!(verso.content_box.x, book.spec.margins.outer);
    }

    #[test]
    fn contents_match_final_start_pages() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[400, 5000, 1200, 90, 3000]), &config);
        book.verify_contents().unwrap();
        for breakdown in &book.plan.chapters {
            assert_eq!(breakdown.start_page % 2, 1);
            let opening = &book.pages[(breakdown.start_page - 1) as usize];
            assert_eq!(opening.kind, PageKind::ChapterOpening(breakdown.index));
        }
    }

    #[test]
    fn tampered_contents_are_detected() {
        let config = EngineConfig::default();
        let mut book = plan(&manuscript(&[400, 900]), &config);
        for page in &mut book.pages {
            for block in &mut page.blocks {
                if let Block::ContentsEntry { chapter: 1, page, .. } = block {
                    *page += 2;
                }
            }
        }
        assert!(matches!(
            book.verify_contents(),
            Err(SatzwerkError::InconsistentPlan { chapter: 1, .. })
        ));
    }

    #[test]
    fn only_final_page_of_a_chapter_is_short() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[9000]), &config);
        let chapter_pages: Vec<&Page> = book
            .pages
            .iter()
            .filter(|p| matches!(p.kind, PageKind::ChapterOpening(0) | PageKind::ChapterBody(0)))
            .collect();
        assert!(chapter_pages.len() >= 2);
        let full = TextMetrics::from_spec(&book.spec, &config.typography).lines_per_full_page();
        let (last, middle) = chapter_pages[1..].split_last().unwrap();
        for page in middle {
            assert_eq!(page.text_lines(), full);
        }
        assert!(last.text_lines() <= full);
    }

    #[test]
    fn illustrations_are_placed_inside_the_text_block() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[600, 600]), &config);
        let opening = book
            .pages
            .iter()
            .find(|p| p.kind == PageKind::ChapterOpening(0))
            .unwrap();
        assert!(opening.illustration().is_some());
        let bounds = opening.content_box;
        for block in &opening.blocks {
            if matches!(block, Block::Footer { .. }) {
                assert!(block.rect().y >= bounds.bottom());
                continue;
            }
            let rect = block.rect();
            assert!(rect.x >= bounds.x && rect.right() <= bounds.right() + 1e-3);
            assert!(rect.y >= bounds.y && rect.bottom() <= bounds.bottom() + 1e-3);
        }
        let second = book
            .pages
            .iter()
            .find(|p| p.kind == PageKind::ChapterOpening(1))
            .unwrap();
        assert!(second.illustration().is_none());
    }

    #[test]
    fn empty_chapter_gets_one_page_and_a_notice() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[300, 0, 300]), &config);
        assert_eq!(book.plan.chapters[1].page_count, 1);
        assert!(book
            .notices
            .contains(&Notice::EmptyChapter { chapter: 1 }));
    }

    #[test]
    fn long_titles_stay_inside_the_text_block() {
        let config = EngineConfig::default();
        let factor = config.typography.glyph_width_factor;
        let body_pt = config.typography.body_font_pt;
        let mut book = manuscript(&[600, 600, 600]);
        book.title = "Lanterns, Tides and Other Small Lights: A Harbor Chronicle in Nine Winters"
            .into();
        book.chapters[0].title =
            "The Night the Lanterns Went Dark Over the Harbor of Saint Brendan".into();
        book.chapters[2].title = "Keeper ".repeat(40);
        let planned = plan(&book, &config);

        let mut headings = 0;
        for page in &planned.pages {
            let bounds = page.content_box;
            for block in &page.blocks {
                let rect = block.rect();
                match block {
                    Block::Heading { lines, size_pt, .. } => {
                        headings += 1;
                        assert!(rect.x >= bounds.x && rect.right() <= bounds.right() + 1e-3);
                        let height = lines.len() as f32 * heading_line_height_mm(*size_pt);
                        assert!(height <= rect.height + 1e-3);
                        for line in lines {
                            assert!(estimated_width_mm(line, *size_pt, factor) <= rect.width + 1e-3);
                        }
                    }
                    Block::ContentsEntry { title, page, .. } => {
                        let used = estimated_width_mm(title, body_pt, factor)
                            + estimated_width_mm(&page.to_string(), body_pt, factor);
                        assert!(used < rect.width);
                        assert!(rect.right() <= bounds.right() + 1e-3);
                    }
                    _ => {}
                }
            }
        }
        // Title page, contents, three openings.
        assert_eq!(headings, 5);
        let first = planned
            .pages
            .iter()
            .find(|p| p.kind == PageKind::ChapterOpening(0))
            .unwrap();
        assert!(matches!(&first.blocks[0], Block::Heading { lines, .. } if lines.len() > 1));
    }

    #[test]
    fn deferred_illustration_opens_the_next_page() {
        let mut config = EngineConfig::default();
        config.typography.heading_block_mm = 150.0;
        let book = plan(&manuscript(&[30, 30]), &config);
        let start = book.plan.chapter_start_pages[&0];
        assert!(book.notices.contains(&Notice::IllustrationDeferred {
            chapter: 0,
            to_page: start + 1,
        }));

        let opening = &book.pages[(start - 1) as usize];
        assert_eq!(opening.kind, PageKind::ChapterOpening(0));
        assert!(opening.illustration().is_none());

        let next = &book.pages[start as usize];
        assert_eq!(next.number, start + 1);
        assert_eq!(next.kind, PageKind::ChapterBody(0));
        assert_eq!(next.illustration(), Some(&ImageRef::Placeholder(Theme::Nature)));
        let art = next
            .blocks
            .iter()
            .find(|block| matches!(block, Block::Illustration { .. }))
            .unwrap();
        assert_eq!(art.rect().y, next.content_box.y);
    }

    #[test]
    fn total_is_even_and_at_least_minimum() {
        let config = EngineConfig::default();
        let book = plan(&manuscript(&[100]), &config);
        assert_eq!(book.plan.total_pages, 24);
        assert_eq!(book.pages.last().unwrap().kind, PageKind::Padding);
        let book = plan(&manuscript(&[3000, 3001, 2999, 4000, 5000]), &config);
        assert_eq!(book.plan.total_pages % 2, 0);
    }
}
