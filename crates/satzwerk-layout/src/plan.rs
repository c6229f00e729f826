// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagination plan — page totals and chapter start pages for one pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use satzwerk_core::error::Result;

/// Pages taken by one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBreakdown {
    pub index: usize,
    pub start_page: u32,
    pub page_count: u32,
    /// Whether a blank verso was inserted to start this chapter on a recto.
    pub blank_before: bool,
}

/// Totals and start pages. The final pass's plan is authoritative for both
/// footers and the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPlan {
    pub total_pages: u32,
    pub chapter_start_pages: BTreeMap<usize, u32>,
    pub chapters: Vec<ChapterBreakdown>,
}

impl PaginationPlan {
    /// SHA-256 (hex) of the plan's JSON form. Equal plans hash equally.
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&json)))
    }
}

/// Round a page count up to an even total of at least `minimum_pages`.
pub(crate) fn padded_total(last_page: u32, minimum_pages: u32) -> u32 {
    let total = last_page.max(minimum_pages);
    total + total % 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(total: u32) -> PaginationPlan {
        PaginationPlan {
            total_pages: total,
            chapter_start_pages: BTreeMap::from([(0, 5), (1, 9)]),
            chapters: vec![
                ChapterBreakdown {
                    index: 0,
                    start_page: 5,
                    page_count: 3,
                    blank_before: false,
                },
                ChapterBreakdown {
                    index: 1,
                    start_page: 9,
                    page_count: 4,
                    blank_before: true,
                },
            ],
        }
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = plan(24).fingerprint().unwrap();
        assert_eq!(a, plan(24).fingerprint().unwrap());
        assert_ne!(a, plan(26).fingerprint().unwrap());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn totals_are_padded_even_and_to_minimum() {
        assert_eq!(padded_total(12, 24), 24);
        assert_eq!(padded_total(203, 24), 204);
        assert_eq!(padded_total(204, 24), 204);
        assert_eq!(padded_total(12, 25), 26);
    }
}
