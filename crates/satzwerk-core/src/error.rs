// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Satzwerk.

use thiserror::Error;

/// Top-level error type for all Satzwerk operations.
#[derive(Debug, Error)]
pub enum SatzwerkError {
    // -- Configuration errors --
    #[error("unknown trim size: {0}")]
    UnknownTrim(String),

    #[error("unknown paper class: {0}")]
    UnknownPaper(String),

    #[error("invalid page count: {0} (must be at least 1)")]
    InvalidPageCount(u32),

    #[error("manuscript has no chapters")]
    EmptyManuscript,

    #[error("chapter index {0} appears more than once")]
    DuplicateChapter(usize),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    // -- Asset errors (always recovered by the renderers) --
    #[error("asset {source_key} unavailable: {reason}")]
    AssetUnavailable { source_key: String, reason: String },

    #[error("asset {source_key} timed out after {timeout_ms} ms")]
    AssetTimeout { source_key: String, timeout_ms: u64 },

    // -- Layout defects --
    #[error(
        "contents entry for chapter {chapter} says page {contents}, but the plan starts it on page {planned}"
    )]
    InconsistentPlan {
        chapter: usize,
        planned: u32,
        contents: u32,
    },

    // -- Output --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How an error must be treated by the export collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Upstream programming or configuration defect. Fail fast.
    Configuration,
    /// A decorative asset could not be produced. Recover with a fallback.
    Asset,
    /// The engine contradicted itself or could not write its output.
    Defect,
}

impl SatzwerkError {
    /// Classify this error for the caller.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownTrim(_)
            | Self::UnknownPaper(_)
            | Self::InvalidPageCount(_)
            | Self::EmptyManuscript
            | Self::DuplicateChapter(_)
            | Self::InvalidConfig(_)
            | Self::Serialization(_) => ErrorClass::Configuration,

            Self::AssetUnavailable { .. } | Self::AssetTimeout { .. } | Self::ImageError(_) => {
                ErrorClass::Asset
            }

            Self::InconsistentPlan { .. } | Self::PdfError(_) | Self::Io(_) => ErrorClass::Defect,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SatzwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_trim_is_configuration() {
        let err = SatzwerkError::UnknownTrim("4x4".into());
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert_eq!(err.to_string(), "unknown trim size: 4x4");
    }

    #[test]
    fn timeout_is_asset() {
        let err = SatzwerkError::AssetTimeout {
            source_key: "cover.png".into(),
            timeout_ms: 10_000,
        };
        assert_eq!(err.class(), ErrorClass::Asset);
    }

    #[test]
    fn inconsistent_plan_is_defect() {
        let err = SatzwerkError::InconsistentPlan {
            chapter: 3,
            planned: 41,
            contents: 39,
        };
        assert_eq!(err.class(), ErrorClass::Defect);
        assert!(err.to_string().contains("page 41"));
    }
}
