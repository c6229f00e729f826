// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chapter flow — splits one chapter's wrapped text into page slices.
//
// Both pagination passes run exactly this function; they differ only in the
// `TextMetrics` (margins) they pass in.

use std::ops::Range;

use satzwerk_core::types::Chapter;

use crate::text::{TextMetrics, wrap_text};

/// Where a chapter's illustration ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IllustrationPlacement {
    /// The chapter has no illustration.
    None,
    /// Under the heading on the opening page.
    Opening { width: f32, height: f32 },
    /// Too tall for the opening page; top of the next page instead.
    Deferred { width: f32, height: f32 },
    /// Does not fit anywhere; not drawn.
    Skipped,
}

/// Lines and reserved illustration space on one page of a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    /// Indices into [`ChapterFlow::lines`].
    pub lines: Range<usize>,
    /// Lines this page could have held.
    pub capacity: usize,
    /// (width, height) of an illustration drawn at the top of the slice.
    pub illustration: Option<(f32, f32)>,
}

/// The result of flowing one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterFlow {
    pub lines: Vec<String>,
    pub pages: Vec<PageSlice>,
    pub illustration: IllustrationPlacement,
}

impl ChapterFlow {
    /// Pages this chapter occupies.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// True when the chapter had no body text at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The wrapped lines that land on `slice`.
    pub fn slice_lines(&self, slice: &PageSlice) -> &[String] {
        &self.lines[slice.lines.clone()]
    }
}

/// Flow a chapter into an opening page plus as many full continuation pages
/// as its text needs. Never returns zero pages.
pub fn flow_chapter(chapter: &Chapter, metrics: &TextMetrics) -> ChapterFlow {
    let body = chapter.body.trim();
    let lines = if body.is_empty() {
        Vec::new()
    } else {
        wrap_text(body, metrics.chars_per_line)
    };

    let content_height = metrics.content_height_mm;
    let after_heading = content_height - metrics.heading_block_mm;

    let illustration = match &chapter.illustration {
        None => IllustrationPlacement::None,
        Some(image) => {
            let (width, height) = metrics.illustration_size(image);
            if height <= after_heading {
                IllustrationPlacement::Opening { width, height }
            } else if height < content_height {
                IllustrationPlacement::Deferred { width, height }
            } else {
                IllustrationPlacement::Skipped
            }
        }
    };

    let gap = metrics.line_height_mm;
    let full_capacity = metrics.lines_per_full_page();
    let mut pages = Vec::new();
    let mut cursor = 0usize;

    // Opening page.
    let (opening_capacity, opening_art) = match illustration {
        IllustrationPlacement::Opening { width, height } => (
            metrics.lines_in(after_heading - height - gap),
            Some((width, height)),
        ),
        _ => (metrics.lines_in(after_heading), None),
    };
    let take = opening_capacity.min(lines.len());
    pages.push(PageSlice {
        lines: 0..take,
        capacity: opening_capacity,
        illustration: opening_art,
    });
    cursor += take;

    // A deferred illustration always gets the next page, even if the text
    // already ended on the opening page.
    if let IllustrationPlacement::Deferred { width, height } = illustration {
        let capacity = metrics.lines_in(content_height - height - gap);
        let take = capacity.min(lines.len() - cursor);
        pages.push(PageSlice {
            lines: cursor..cursor + take,
            capacity,
            illustration: Some((width, height)),
        });
        cursor += take;
    }

    while cursor < lines.len() {
        let take = full_capacity.min(lines.len() - cursor);
        pages.push(PageSlice {
            lines: cursor..cursor + take,
            capacity: full_capacity,
            illustration: None,
        });
        cursor += take;
    }

    ChapterFlow {
        lines,
        pages,
        illustration,
    }
}
