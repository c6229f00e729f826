// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Satzwerk layout engine.
//
// All lengths are millimetres. Rectangles live in a top-left origin
// coordinate space with y growing downwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::TrimCatalog;
use crate::error::{Result, SatzwerkError};

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Unique identifier for a single export run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportId(pub Uuid);

impl ExportId {
    /// Generate a new random export ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final cut dimensions of a printed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimSize {
    pub name: String,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Paper stock. Each class is bound to a caliper and spine density in
/// [`crate::config::PaperConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperClass {
    Cream,
    White,
    Color,
}

impl PaperClass {
    /// Parse the project configuration spelling of a paper class.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cream" => Ok(Self::Cream),
            "white" => Ok(Self::White),
            "color" | "colour" => Ok(Self::Color),
            _ => Err(SatzwerkError::UnknownPaper(name.to_string())),
        }
    }

    /// Every paper class in catalogue order.
    pub fn all() -> [Self; 3] {
        [Self::Cream, Self::White, Self::Color]
    }
}

/// Decorative theme for procedurally drawn placeholder illustrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Adventure,
    Mystery,
    Romance,
    Fantasy,
    SciFi,
    Nature,
}

/// Keyword table: first theme with a matching keyword wins.
const THEME_KEYWORDS: &[(Theme, &[&str])] = &[
    (
        Theme::SciFi,
        &["space", "robot", "planet", "galaxy", "starship", "future", "alien"],
    ),
    (
        Theme::Mystery,
        &["mystery", "detective", "murder", "secret", "clue", "shadow", "fog"],
    ),
    (
        Theme::Fantasy,
        &["dragon", "wizard", "magic", "castle", "kingdom", "quest", "spell"],
    ),
    (
        Theme::Romance,
        &["love", "heart", "kiss", "wedding", "romance", "sweetheart"],
    ),
    (
        Theme::Adventure,
        &["adventure", "journey", "mountain", "treasure", "explore", "voyage"],
    ),
];

impl Theme {
    /// Pick a theme from free text (a genre label or a chapter title).
    /// Falls back to [`Theme::Nature`].
    pub fn from_keywords(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        for (theme, keywords) in THEME_KEYWORDS {
            if words.iter().any(|w| keywords.contains(w)) {
                return *theme;
            }
        }
        Self::Nature
    }
}

/// Reference to an image used by a chapter or a cover panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageRef {
    /// Fetched through an asset resolver. `aspect_ratio` is height / width.
    Asset {
        source: String,
        aspect_ratio: Option<f32>,
    },
    /// Drawn locally from a theme; never fails to load.
    Placeholder(Theme),
}

impl ImageRef {
    /// Asset reference with no aspect-ratio hint.
    pub fn asset(source: impl Into<String>) -> Self {
        Self::Asset {
            source: source.into(),
            aspect_ratio: None,
        }
    }

    /// Height / width ratio, if known before loading.
    pub fn aspect_ratio(&self) -> Option<f32> {
        match self {
            Self::Asset { aspect_ratio, .. } => *aspect_ratio,
            Self::Placeholder(_) => None,
        }
    }

    /// Stable key used to load each distinct image once.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Asset { source, .. } => source.clone(),
            Self::Placeholder(theme) => format!("placeholder:{theme:?}"),
        }
    }
}

/// One chapter of a manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub body: String,
    pub illustration: Option<ImageRef>,
}

/// An ordered chapter list plus the front-matter fields the layout needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    pub title: String,
    pub author: String,
    pub dedication: Option<String>,
    /// Copyright page text. A default line is generated when absent.
    pub copyright: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl Manuscript {
    /// Fails when there is nothing to paginate or two chapters share an index.
    pub fn ensure_paginatable(&self) -> Result<()> {
        if self.chapters.is_empty() {
            return Err(SatzwerkError::EmptyManuscript);
        }
        let mut seen = std::collections::HashSet::new();
        for chapter in &self.chapters {
            if !seen.insert(chapter.index) {
                return Err(SatzwerkError::DuplicateChapter(chapter.index));
            }
        }
        Ok(())
    }

    /// The copyright notice, or a default one naming the author.
    pub fn copyright_text(&self) -> String {
        self.copyright
            .clone()
            .unwrap_or_else(|| format!("Copyright © {}. All rights reserved.", self.author))
    }
}

/// Trim and paper chosen for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSelection {
    pub trim: TrimSize,
    pub paper: PaperClass,
}

impl BookSelection {
    /// Map the project configuration strings onto catalog entries.
    pub fn parse(trim: &str, paper: &str) -> Result<Self> {
        Ok(Self {
            trim: TrimCatalog::lookup(trim)?,
            paper: PaperClass::parse(paper)?,
        })
    }
}

/// Page margins. `inner` is the binding side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub inner: f32,
    pub outer: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Derived interior layout for one trim/paper/page-count combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    pub trim: TrimSize,
    pub bleed: f32,
    pub margins: Margins,
    pub paper: PaperClass,
    /// `None` for the ghost pass placeholder.
    pub page_count_hint: Option<u32>,
}

impl LayoutSpec {
    /// Width of the text block between inner and outer margins.
    pub fn content_width(&self) -> f32 {
        self.trim.width_mm - self.margins.inner - self.margins.outer
    }

    /// Height of the text block between top and bottom margins.
    pub fn content_height(&self) -> f32 {
        self.trim.height_mm - self.margins.top - self.margins.bottom
    }

    /// Left margin for a page of the given parity. The binding sits on the
    /// left of a recto and on the right of a verso.
    pub fn left_margin(&self, parity: Parity) -> f32 {
        match parity {
            Parity::Recto => self.margins.inner,
            Parity::Verso => self.margins.outer,
        }
    }

    /// Text block rectangle in trim coordinates.
    pub fn content_box(&self, parity: Parity) -> Rect {
        Rect::new(
            self.left_margin(parity),
            self.margins.top,
            self.content_width(),
            self.content_height(),
        )
    }
}

/// Side of the spread a page falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    /// Right-hand, odd-numbered.
    Recto,
    /// Left-hand, even-numbered.
    Verso,
}

impl Parity {
    /// Odd pages are recto, even pages verso.
    pub fn of(page_number: u32) -> Self {
        if page_number % 2 == 1 {
            Self::Recto
        } else {
            Self::Verso
        }
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Rectangle with its top-left corner at (`x`, `y`), in millimetres.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge (y grows downwards).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the interiors overlap (touching edges do not count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when `other` lies entirely inside (shared edges count).
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Shrink by `amount` on every side. Never produces negative sizes.
    pub fn inset(&self, amount: f32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_class_parses_case_insensitively() {
        assert_eq!(PaperClass::parse("Cream").unwrap(), PaperClass::Cream);
        assert_eq!(PaperClass::parse(" colour ").unwrap(), PaperClass::Color);
        assert!(matches!(
            PaperClass::parse("glossy"),
            Err(SatzwerkError::UnknownPaper(_))
        ));
    }

    #[test]
    fn theme_from_keywords() {
        assert_eq!(Theme::from_keywords("The Dragon's Spell"), Theme::Fantasy);
        assert_eq!(Theme::from_keywords("A Murder in Fog"), Theme::Mystery);
        assert_eq!(Theme::from_keywords("Lost on the planet Zed"), Theme::SciFi);
        assert_eq!(Theme::from_keywords("Quiet afternoons"), Theme::Nature);
    }

    #[test]
    fn parity_alternates() {
        assert_eq!(Parity::of(1), Parity::Recto);
        assert_eq!(Parity::of(2), Parity::Verso);
        assert_eq!(Parity::of(201), Parity::Recto);
    }

    #[test]
    fn rect_touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 5.0, 5.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(a.contains(&a.inset(2.0)));
    }

    #[test]
    fn selection_rejects_unknown_trim() {
        assert!(matches!(
            BookSelection::parse("4x4", "white"),
            Err(SatzwerkError::UnknownTrim(_))
        ));
        let selection = BookSelection::parse("6x9", "white").unwrap();
        assert_eq!(selection.paper, PaperClass::White);
    }

    #[test]
    fn empty_manuscript_is_rejected() {
        let manuscript = Manuscript {
            title: "Empty".into(),
            author: "Nobody".into(),
            dedication: None,
            copyright: None,
            chapters: Vec::new(),
        };
        assert!(matches!(
            manuscript.ensure_paginatable(),
            Err(SatzwerkError::EmptyManuscript)
        ));
    }

    #[test]
    fn duplicate_chapter_index_is_rejected() {
        let chapter = |index: usize| Chapter {
            index,
            title: format!("Chapter {}", index + 1),
            body: "The tide came in.".into(),
            illustration: None,
        };
        let manuscript = Manuscript {
            title: "Twice Told".into(),
            author: "A. Writer".into(),
            dedication: None,
            copyright: None,
            chapters: vec![chapter(0), chapter(1), chapter(1), chapter(2)],
        };
        assert!(matches!(
            manuscript.ensure_paginatable(),
            Err(SatzwerkError::DuplicateChapter(1))
        ));
    }
}
