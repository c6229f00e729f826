// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, fill/fit scaling and procedural placeholder art.

pub mod placeholder;
pub mod processor;

pub use placeholder::draw_placeholder;
pub use processor::ImageProcessor;
