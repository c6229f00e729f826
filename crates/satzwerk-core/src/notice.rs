// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-blocking notices raised while laying out or rendering a book.
//
// A notice never stops an export. Each one maps to a plain-English message
// and suggestion for the export screen.

use serde::{Deserialize, Serialize};

/// Something the engine recovered from on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// The chapter illustration did not fit under the heading and moved to the next page.
    IllustrationDeferred { chapter: usize, to_page: u32 },
    /// The chapter illustration could not be placed at all.
    IllustrationSkipped { chapter: usize },
    /// An image could not be fetched or decoded; its block was dropped.
    AssetUnavailable { source_key: String, reason: String },
    /// Cover artwork could not be used; the panel was filled with the brand colour.
    ArtworkFallback { panel: CoverPanel, reason: String },
    /// No usable barcode image; the protected zone was left blank.
    BarcodeLeftBlank,
    /// The spine is too narrow for legible text.
    SpineTextOmitted { spine_width_mm: f32 },
    /// Spine text was uniformly scaled down to fit the safe run.
    SpineTextScaled { scale: f32 },
    /// A chapter with no body text was given a single page.
    EmptyChapter { chapter: usize },
}

/// Which panel of the cover wrap a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverPanel {
    Back,
    Front,
}

/// How prominently the export screen should show a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected adjustment; shown in the export summary only.
    Info,
    /// Something the author will probably want to fix before publishing.
    Warning,
}

/// A notice in words an author understands.
#[derive(Debug, Clone)]
pub struct HumanNotice {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `Notice` into text for the export summary.
pub fn humanize_notice(notice: &Notice) -> HumanNotice {
    match notice {
        Notice::IllustrationDeferred { chapter, to_page } => HumanNotice {
            message: format!(
                "The picture for chapter {} moved to page {to_page}.",
                chapter + 1
            ),
            suggestion: "Use a wider, shorter image to keep it under the chapter title.".into(),
            severity: Severity::Info,
        },
        Notice::IllustrationSkipped { chapter } => HumanNotice {
            message: format!("The picture for chapter {} was left out.", chapter + 1),
            suggestion: "The image is too tall for this trim size. Try a landscape image."
                .into(),
            severity: Severity::Warning,
        },
        Notice::AssetUnavailable { source_key, reason } => HumanNotice {
            message: format!("We couldn't load the image \"{source_key}\"."),
            suggestion: format!(
                "Your book was still created without it. Re-upload the image and export again. ({reason})"
            ),
            severity: Severity::Warning,
        },
        Notice::ArtworkFallback { panel, reason } => HumanNotice {
            message: format!(
                "The {} cover artwork couldn't be used, so a plain colour was used instead.",
                panel_name(*panel)
            ),
            suggestion: format!("Upload the artwork again before publishing. ({reason})"),
            severity: Severity::Warning,
        },
        Notice::BarcodeLeftBlank => HumanNotice {
            message: "The barcode area on the back cover was left empty.".into(),
            suggestion: "That's fine. The printer adds the barcode for you.".into(),
            severity: Severity::Info,
        },
        Notice::SpineTextOmitted { spine_width_mm } => HumanNotice {
            message: "Your book is too thin for text on the spine.".into(),
            suggestion: format!(
                "The spine is only {spine_width_mm:.1} mm wide. Spine text appears once the book is thicker."
            ),
            severity: Severity::Info,
        },
        Notice::SpineTextScaled { scale } => HumanNotice {
            message: "The spine text was made smaller so it fits.".into(),
            suggestion: format!(
                "It was scaled to {:.0}% of its normal size. A shorter title or author name will print larger.",
                scale * 100.0
            ),
            severity: Severity::Info,
        },
        Notice::EmptyChapter { chapter } => HumanNotice {
            message: format!("Chapter {} has no text.", chapter + 1),
            suggestion: "It still gets its own page. Add text or remove the chapter.".into(),
            severity: Severity::Warning,
        },
    }
}

fn panel_name(panel: CoverPanel) -> &'static str {
    match panel {
        CoverPanel::Back => "back",
        CoverPanel::Front => "front",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_is_a_warning() {
        let human = humanize_notice(&Notice::AssetUnavailable {
            source_key: "ch3.png".into(),
            reason: "404".into(),
        });
        assert_eq!(human.severity, Severity::Warning);
        assert!(human.message.contains("ch3.png"));
    }

    #[test]
    fn blank_barcode_is_info() {
        assert_eq!(
            humanize_notice(&Notice::BarcodeLeftBlank).severity,
            Severity::Info
        );
    }

    #[test]
    fn chapters_are_numbered_from_one() {
        let human = humanize_notice(&Notice::EmptyChapter { chapter: 0 });
        assert!(human.message.starts_with("Chapter 1 "));
    }

    #[test]
    fn fallback_names_the_panel() {
        let human = humanize_notice(&Notice::ArtworkFallback {
            panel: CoverPanel::Front,
            reason: "decode failed".into(),
        });
        assert!(human.message.contains("front"));
    }
}
