// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interior rendering — turns a planned book into pages plus the decoded
// illustrations they reference, ready for the PDF writer.

use std::collections::BTreeMap;
use std::time::Duration;

use image::RgbaImage;
use satzwerk_core::EngineConfig;
use satzwerk_core::notice::Notice;
use satzwerk_core::types::{ImageRef, LayoutSpec, Rect};
use satzwerk_layout::{Block, Page, PaginationPlan, PlannedBook};
use tracing::{info, instrument, warn};

use crate::assets::{AssetResolver, load_image};

/// A planned book with every illustration resolved.
#[derive(Debug, Clone)]
pub struct RenderedInterior {
    pub spec: LayoutSpec,
    pub plan: PaginationPlan,
    pub pages: Vec<Page>,
    /// Decoded illustrations keyed by [`ImageRef::cache_key`].
    pub illustrations: BTreeMap<String, RgbaImage>,
    /// Pagination notices followed by asset notices.
    pub notices: Vec<Notice>,
}

/// Load every distinct illustration once and drop the blocks whose image
/// could not be produced. Never fails: asset problems become notices.
#[instrument(skip_all, fields(pages = planned.pages.len()))]
pub async fn render_interior<R: AssetResolver>(
    planned: &PlannedBook,
    resolver: &R,
    config: &EngineConfig,
) -> RenderedInterior {
    let timeout = Duration::from_millis(config.assets.timeout_ms);
    let dpi = config.assets.placeholder_dpi;

    // Largest placement per image, so placeholders are drawn big enough everywhere.
    let mut wanted: BTreeMap<String, (&ImageRef, Rect)> = BTreeMap::new();
    for page in &planned.pages {
        for block in &page.blocks {
            if let Block::Illustration { rect, image } = block {
                let entry = wanted.entry(image.cache_key()).or_insert((image, *rect));
                if rect.width * rect.height > entry.1.width * entry.1.height {
                    entry.1 = *rect;
                }
            }
        }
    }

    let mut illustrations = BTreeMap::new();
    let mut notices = planned.notices.clone();
    for (key, (image, rect)) in wanted {
        let size = (mm_to_px(rect.width, dpi), mm_to_px(rect.height, dpi));
        match load_image(resolver, image, size, timeout).await {
            Ok(decoded) => {
                illustrations.insert(key, decoded);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Illustration unavailable; block dropped");
                notices.push(Notice::AssetUnavailable {
                    source_key: key,
                    reason: err.to_string(),
                });
            }
        }
    }

    let pages: Vec<Page> = planned
        .pages
        .iter()
        .map(|page| {
            let mut page = page.clone();
            page.blocks.retain(|block| match block {
                Block::Illustration { image, .. } => illustrations.contains_key(&image.cache_key()),
                _ => true,
            });
            page
        })
        .collect();

    info!(
        illustrations = illustrations.len(),
        notices = notices.len(),
        "Interior rendered"
    );

    RenderedInterior {
        spec: planned.spec.clone(),
        plan: planned.plan.clone(),
        pages,
        illustrations,
        notices,
    }
}

pub(crate) fn mm_to_px(mm: f32, dpi: f32) -> u32 {
    ((mm / 25.4 * dpi).round() as u32).max(1)
}
