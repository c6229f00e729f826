// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text metrics — line-height and average-glyph-width heuristics.
//
// This is deliberately not a shaper. A line holds
// `content_width / (font_size * glyph_width_factor)` characters and a page
// holds `content_height / line_height` lines.

use satzwerk_core::config::Typography;
use satzwerk_core::types::{ImageRef, LayoutSpec, MM_PER_PT};

/// Capacities derived from one [`LayoutSpec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub chars_per_line: usize,
    pub line_height_mm: f32,
    pub content_width_mm: f32,
    pub content_height_mm: f32,
    pub heading_block_mm: f32,
    illustration_max_mm: f32,
    default_aspect_ratio: f32,
}

impl TextMetrics {
    pub fn from_spec(spec: &LayoutSpec, typography: &Typography) -> Self {
        let glyph_width_mm = typography.body_font_pt * typography.glyph_width_factor * MM_PER_PT;
        let content_width_mm = spec.content_width();
        let content_height_mm = spec.content_height();
        let chars_per_line = ((content_width_mm / glyph_width_mm).floor() as usize).max(1);
        Self {
            chars_per_line,
            line_height_mm: typography.line_height_pt * MM_PER_PT,
            content_width_mm,
            content_height_mm,
            heading_block_mm: typography.heading_block_mm.min(content_height_mm),
            illustration_max_mm: typography.illustration_max_fraction * content_height_mm,
            default_aspect_ratio: typography.default_aspect_ratio,
        }
    }

    /// Whole lines that fit in `height_mm`.
    pub fn lines_in(&self, height_mm: f32) -> usize {
        if height_mm <= 0.0 {
            return 0;
        }
        (height_mm / self.line_height_mm).floor() as usize
    }

    /// Lines on a continuation page. Always at least one so flow terminates.
    pub fn lines_per_full_page(&self) -> usize {
        self.lines_in(self.content_height_mm).max(1)
    }

    /// Rendered (width, height) of an illustration: full text-block width at
    /// its aspect ratio, shrunk proportionally to the height cap.
    pub fn illustration_size(&self, image: &ImageRef) -> (f32, f32) {
        let aspect = image
            .aspect_ratio()
            .filter(|ratio| *ratio > 0.0 && ratio.is_finite())
            .unwrap_or(self.default_aspect_ratio);
        let natural_height = self.content_width_mm * aspect;
        if natural_height <= self.illustration_max_mm {
            (self.content_width_mm, natural_height)
        } else {
            (self.illustration_max_mm / aspect, self.illustration_max_mm)
        }
    }
}

/// Wrap a multi-line string so that no line exceeds `max_chars` characters.
///
/// Splits on existing newlines first, then performs greedy word-wrap within
/// each paragraph. An empty source line yields an empty output line. Words
/// longer than `max_chars` are force-broken on character boundaries.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        let mut current_len = 0usize;

        for word in words {
            let word_len = word.chars().count();
            if word_len > max_chars {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(max_chars).peekable();
                while let Some(chunk) = chunks.next() {
                    if chunks.peek().is_some() {
                        result.push(chunk.iter().collect());
                    } else {
                        current_line = chunk.iter().collect();
                        current_len = chunk.len();
                    }
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= max_chars {
                current_line.push(' ');
                current_line.push_str(word);
                current_len += 1 + word_len;
            } else {
                result.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_len = word_len;
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

// -- Display lines ------------------------------------------------------------

const HEADING_LEADING: f32 = 1.2;

/// Height of one heading line set at `size_pt`.
pub fn heading_line_height_mm(size_pt: f32) -> f32 {
    size_pt * HEADING_LEADING * MM_PER_PT
}

/// Estimated run length of `text` set at `size_pt`.
pub fn estimated_width_mm(text: &str, size_pt: f32, glyph_width_factor: f32) -> f32 {
    text.chars().count() as f32 * size_pt * glyph_width_factor * MM_PER_PT
}

fn chars_fitting(width_mm: f32, size_pt: f32, glyph_width_factor: f32) -> usize {
    ((width_mm / (size_pt * glyph_width_factor * MM_PER_PT)).floor() as usize).max(1)
}

/// Shorten `text` to at most `max_chars` characters, ending in an ellipsis
/// when anything was cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// A heading wrapped, and shrunk if necessary, to fit its box.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedHeading {
    pub lines: Vec<String>,
    pub size_pt: f32,
}

impl FittedHeading {
    pub fn height_mm(&self) -> f32 {
        self.lines.len() as f32 * heading_line_height_mm(self.size_pt)
    }
}

/// Fit `text` into a `width_mm` x `height_mm` box, starting at `size_pt`.
///
/// The size steps down by 10% until the wrapped lines fit, never below the
/// body size. At that floor, lines that still overflow are dropped and the
/// last kept line ends in an ellipsis.
pub fn fit_heading(
    text: &str,
    width_mm: f32,
    height_mm: f32,
    size_pt: f32,
    typography: &Typography,
) -> FittedHeading {
    let factor = typography.glyph_width_factor;
    let floor = typography.body_font_pt.min(size_pt);
    let mut size = size_pt;
    loop {
        let max_chars = chars_fitting(width_mm, size, factor);
        let mut lines = wrap_text(text.trim(), max_chars);
        let max_lines = ((height_mm + 1e-3) / heading_line_height_mm(size)).floor() as usize;
        if lines.len() <= max_lines {
            return FittedHeading { lines, size_pt: size };
        }
        if size <= floor {
            lines.truncate(max_lines.max(1));
            if let Some(last) = lines.last_mut() {
                let keep = last.chars().count().min(max_chars.saturating_sub(1));
                *last = last.chars().take(keep).collect::<String>() + "…";
            }
            return FittedHeading { lines, size_pt: size };
        }
        size = (size * 0.9).max(floor);
    }
}
