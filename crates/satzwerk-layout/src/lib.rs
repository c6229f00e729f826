// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// satzwerk-layout — The numeric heart of Satzwerk.
//
// Everything here is synchronous and pure: spine thickness, KDP-style margin
// bands, the ghost (estimate) and final pagination passes, and cover wrap
// geometry. The only async entry point, `paginate_cooperatively`, just yields
// to the runtime between chapters.

pub mod cover;
pub mod flow;
pub mod ghost;
pub mod margins;
pub mod page;
pub mod pipeline;
pub mod plan;
pub mod planner;
pub mod spine;
pub mod text;

// Re-export the primary entry points so callers can use `satzwerk_layout::paginate` etc.
pub use cover::{CoverWrapLayout, SpineTextPlan};
pub use ghost::{GhostEstimate, GhostPaginator};
pub use margins::LayoutSpecResolver;
pub use page::{Block, Page, PageKind};
pub use pipeline::{paginate, paginate_cooperatively};
pub use plan::{ChapterBreakdown, PaginationPlan};
pub use planner::{FinalRenderPlanner, PlannedBook};
pub use spine::SpineModel;
