// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interior page stream — one `Page` per physical page, with absolutely
// positioned blocks in trim coordinates (millimetres, top-left origin).

use serde::{Deserialize, Serialize};

use satzwerk_core::types::{ImageRef, Parity, Rect};

/// What a physical page is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Title,
    Copyright,
    Dedication,
    Contents,
    /// Inserted so the next chapter starts on a recto.
    Blank,
    ChapterOpening(usize),
    ChapterBody(usize),
    /// Trailing pages that bring the book to an even, vendor-acceptable count.
    Padding,
}

/// A positioned piece of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// Display lines, already fitted to `rect` at `size_pt`.
    Heading {
        rect: Rect,
        lines: Vec<String>,
        size_pt: f32,
    },
    Illustration {
        rect: Rect,
        image: ImageRef,
    },
    Text {
        rect: Rect,
        lines: Vec<String>,
    },
    ContentsEntry {
        rect: Rect,
        chapter: usize,
        title: String,
        page: u32,
    },
    Footer {
        rect: Rect,
        number: u32,
    },
}

impl Block {
    /// Where the block sits on its page.
    pub fn rect(&self) -> &Rect {
        match self {
            Self::Heading { rect, .. }
            | Self::Illustration { rect, .. }
            | Self::Text { rect, .. }
            | Self::ContentsEntry { rect, .. }
            | Self::Footer { rect, .. } => rect,
        }
    }
}

/// One physical page of the interior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based physical page number.
    pub number: u32,
    pub parity: Parity,
    pub kind: PageKind,
    /// Text block for this page's parity (gutter mirrored).
    pub content_box: Rect,
    pub blocks: Vec<Block>,
}

impl Page {
    /// The footer number stamped on this page, if any.
    pub fn footer_number(&self) -> Option<u32> {
        self.blocks.iter().find_map(|block| match block {
            Block::Footer { number, .. } => Some(*number),
            _ => None,
        })
    }

    /// Body lines set on this page.
    pub fn text_lines(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Text { lines, .. } => lines.len(),
                _ => 0,
            })
            .sum()
    }

    /// The illustration placed on this page, if any.
    pub fn illustration(&self) -> Option<&ImageRef> {
        self.blocks.iter().find_map(|block| match block {
            Block::Illustration { image, .. } => Some(image),
            _ => None,
        })
    }
}
