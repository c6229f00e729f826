// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// satzwerk-document — Everything that touches pixels, bytes or assets.
//
// Provides asset resolution (async, with timeouts), placeholder illustration
// themes, interior rendering, cover wrap composition with a protected barcode
// zone, and PDF output via `printpdf`.

pub mod assets;
pub mod cover;
pub mod image;
pub mod pdf;
pub mod render;

// Re-export the primary entry points so callers can use `satzwerk_document::PdfWriter` etc.
pub use assets::{AssetResolver, FsAssetResolver, MemoryAssetResolver, load_image};
pub use cover::{ComposedCover, CoverRequest, CoverTextBlock, CoverWrapComposer};
pub use image::processor::ImageProcessor;
pub use pdf::writer::PdfWriter;
pub use render::{RenderedInterior, render_interior};
