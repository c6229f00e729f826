// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Satzwerk — Core types, configuration and error definitions shared across all crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod notice;
pub mod types;

pub use catalog::TrimCatalog;
pub use config::EngineConfig;
pub use error::SatzwerkError;
pub use notice::Notice;
pub use types::*;
