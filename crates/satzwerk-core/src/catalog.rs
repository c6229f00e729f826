// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trim size catalog — the named trims print-on-demand vendors accept.

use crate::error::{Result, SatzwerkError};
use crate::types::TrimSize;

/// (name, width_mm, height_mm)
const TRIMS: &[(&str, f32, f32)] = &[
    ("5x8", 127.0, 203.2),
    ("5.25x8", 133.35, 203.2),
    ("5.5x8.5", 139.7, 215.9),
    ("6x9", 152.4, 228.6),
    ("6.14x9.21", 155.956, 233.934),
    ("7x10", 177.8, 254.0),
    ("8x10", 203.2, 254.0),
    ("8.5x8.5", 215.9, 215.9),
    ("8.5x11", 215.9, 279.4),
];

/// Static lookup from trim names to physical dimensions.
pub struct TrimCatalog;

impl TrimCatalog {
    /// Look up a trim by name. Accepts `"6x9"`, `"6X9"` and `"6 x 9"`.
    pub fn lookup(name: &str) -> Result<TrimSize> {
        let normalised: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        TRIMS
            .iter()
            .find(|(trim_name, _, _)| *trim_name == normalised)
            .map(|(trim_name, width, height)| TrimSize {
                name: (*trim_name).to_string(),
                width_mm: *width,
                height_mm: *height,
            })
            .ok_or_else(|| SatzwerkError::UnknownTrim(name.to_string()))
    }

    /// Every trim in the catalog, smallest first.
    pub fn all() -> Vec<TrimSize> {
        TRIMS
            .iter()
            .map(|(name, width, height)| TrimSize {
                name: (*name).to_string(),
                width_mm: *width,
                height_mm: *height,
            })
            .collect()
    }
}
