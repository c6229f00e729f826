// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Two-pass pagination pipeline.
//
// Ghost pass first, then the final pass with margins resolved from the
// ghost's estimate. No fixed-point loop: the final pass is authoritative even
// when its total lands in a different margin band than the estimate.

use satzwerk_core::EngineConfig;
use satzwerk_core::error::Result;
use satzwerk_core::types::{BookSelection, ExportId, Manuscript};
use tracing::{info, instrument, warn};

use crate::ghost::{GhostEstimate, GhostPaginator};
use crate::margins::LayoutSpecResolver;
use crate::planner::{FinalRenderPlanner, PlannedBook};

/// Paginate a manuscript in one go.
pub fn paginate(
    manuscript: &Manuscript,
    selection: &BookSelection,
    config: &EngineConfig,
) -> Result<PlannedBook> {
    run_passes(ExportId::new(), manuscript, selection, config)
}

#[instrument(skip(manuscript, selection, config), fields(export_id = %export_id, trim = %selection.trim.name))]
fn run_passes(
    export_id: ExportId,
    manuscript: &Manuscript,
    selection: &BookSelection,
    config: &EngineConfig,
) -> Result<PlannedBook> {
    let mut ghost = GhostPaginator::new(manuscript, selection, config)?;
    while ghost.step() {}
    let estimate = ghost.finish();

    let mut planner = FinalRenderPlanner::new(manuscript, &estimate, selection, config)?;
    while planner.step() {}
    let book = planner.finish()?;

    log_outcome(&estimate, &book, config)?;
    Ok(book)
}

/// Same result as [`paginate`], but hands control back to the runtime after
/// every chapter of both passes so long manuscripts do not starve other tasks.
pub async fn paginate_cooperatively(
    manuscript: &Manuscript,
    selection: &BookSelection,
    config: &EngineConfig,
) -> Result<PlannedBook> {
    run_passes_cooperatively(ExportId::new(), manuscript, selection, config).await
}

#[instrument(skip(manuscript, selection, config), fields(export_id = %export_id, trim = %selection.trim.name))]
async fn run_passes_cooperatively(
    export_id: ExportId,
    manuscript: &Manuscript,
    selection: &BookSelection,
    config: &EngineConfig,
) -> Result<PlannedBook> {
    let mut ghost = GhostPaginator::new(manuscript, selection, config)?;
    loop {
        let more = ghost.step();
        tokio::task::yield_now().await;
        if !more {
            break;
        }
    }
    let estimate = ghost.finish();

    let mut planner = FinalRenderPlanner::new(manuscript, &estimate, selection, config)?;
    loop {
        let more = planner.step();
        tokio::task::yield_now().await;
        if !more {
            break;
        }
    }
    let book = planner.finish()?;

    log_outcome(&estimate, &book, config)?;
    Ok(book)
}

fn log_outcome(estimate: &GhostEstimate, book: &PlannedBook, config: &EngineConfig) -> Result<()> {
    let resolver = LayoutSpecResolver::new(config);
    let estimated_inner = resolver.inner_margin(estimate.estimated_total_pages)?;
    let final_inner = resolver.inner_margin(book.plan.total_pages)?;
    let fingerprint = book.plan.fingerprint()?;

    if estimated_inner != final_inner {
        // The final plan stays authoritative; the gutter is one band off.
        warn!(
            ghost_total = estimate.estimated_total_pages,
            final_total = book.plan.total_pages,
            estimated_inner,
            final_inner,
            "Final page count crossed a margin band"
        );
    }
    info!(
        ghost_total = estimate.estimated_total_pages,
        final_total = book.plan.total_pages,
        chapters = book.plan.chapters.len(),
        notices = book.notices.len(),
        %fingerprint,
        "Pagination complete"
    );
    Ok(())
}
