// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asset resolution — fetching encoded image bytes for illustrations, cover
// art and barcodes.
//
// Layout never touches I/O; only the renderers call into a resolver. Every
// fetch runs under its own timeout, and failures are returned to the caller,
// which decides on the fallback.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use image::RgbaImage;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::types::ImageRef;
use tracing::{debug, instrument};

use crate::image::placeholder::draw_placeholder;
use crate::image::processor::ImageProcessor;

/// Source of encoded image bytes.
pub trait AssetResolver: Send + Sync {
    fn fetch(&self, source: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Resolves sources as relative paths under a root directory.
pub struct FsAssetResolver {
    root: PathBuf,
}

impl FsAssetResolver {
    /// Resolve source keys as relative paths under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join `source` onto the root, refusing anything that could leave it.
    fn resolve_path(&self, source: &str) -> Result<PathBuf> {
        let relative = Path::new(source);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if source.is_empty() || escapes {
            return Err(SatzwerkError::AssetUnavailable {
                source_key: source.to_string(),
                reason: "path escapes the asset root".into(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl AssetResolver for FsAssetResolver {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        let path = self.resolve_path(source)?;
        tokio::fs::read(&path)
            .await
            .map_err(|err| SatzwerkError::AssetUnavailable {
                source_key: source.to_string(),
                reason: err.to_string(),
            })
    }
}

/// In-memory assets, keyed by source.
#[derive(Default)]
pub struct MemoryAssetResolver {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetResolver {
    /// An empty resolver; every fetch fails until bytes are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `source`, replacing any previous entry.
    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(source.into(), bytes);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }
}

impl AssetResolver for MemoryAssetResolver {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        self.assets
            .get(source)
            .cloned()
            .ok_or_else(|| SatzwerkError::AssetUnavailable {
                source_key: source.to_string(),
                reason: "not found".into(),
            })
    }
}

/// Fetch and decode an image. Placeholders are drawn locally at
/// `placeholder_size` pixels and never fail.
#[instrument(skip(resolver, image), fields(key = %image.cache_key()))]
pub async fn load_image<R: AssetResolver>(
    resolver: &R,
    image: &ImageRef,
    placeholder_size: (u32, u32),
    timeout: Duration,
) -> Result<RgbaImage> {
    let source = match image {
        ImageRef::Placeholder(theme) => {
            return Ok(draw_placeholder(*theme, placeholder_size.0, placeholder_size.1));
        }
        ImageRef::Asset { source, .. } => source,
    };

    let bytes = tokio::time::timeout(timeout, resolver.fetch(source))
        .await
        .map_err(|_| SatzwerkError::AssetTimeout {
            source_key: source.clone(),
            timeout_ms: timeout.as_millis() as u64,
        })??;

    let decoded = ImageProcessor::from_bytes(&bytes).map_err(|err| {
        SatzwerkError::AssetUnavailable {
            source_key: source.clone(),
            reason: err.to_string(),
        }
    })?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        "Asset decoded"
    );
    Ok(decoded.into_rgba())
}

#[cfg(test)]
mod tests {
    use super::*;
    use satzwerk_core::types::Theme;

    use crate::image::processor::encode_png;

    fn tiny_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([200, 10, 10, 255]));
        encode_png(&img).expect("encode")
    }

    /// Never answers.
    struct StalledResolver;

    impl AssetResolver for StalledResolver {
        async fn fetch(&self, _source: &str) -> Result<Vec<u8>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn memory_resolver_round_trips_bytes() {
        let resolver = MemoryAssetResolver::new().with("art/front.png", tiny_png());
        let image = load_image(
            &resolver,
            &ImageRef::asset("art/front.png"),
            (10, 10),
            Duration::from_secs(1),
        )
        .await
        .expect("load");
        assert_eq!(image.dimensions(), (4, 3));
    }

    #[tokio::test]
    async fn missing_asset_is_unavailable() {
        let resolver = MemoryAssetResolver::new();
        let err = load_image(
            &resolver,
            &ImageRef::asset("nope.png"),
            (10, 10),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SatzwerkError::AssetUnavailable { .. }));
    }

    #[tokio::test]
    async fn undecodable_bytes_are_unavailable() {
        let resolver = MemoryAssetResolver::new().with("broken.png", b"not an image".to_vec());
        let err = load_image(
            &resolver,
            &ImageRef::asset("broken.png"),
            (10, 10),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SatzwerkError::AssetUnavailable { .. }));
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let err = load_image(
            &StalledResolver,
            &ImageRef::asset("slow.png"),
            (10, 10),
            Duration::from_millis(20),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            SatzwerkError::AssetTimeout { timeout_ms: 20, .. }
        ));
    }

    #[tokio::test]
    async fn placeholders_never_touch_the_resolver() {
        let image = load_image(
            &StalledResolver,
            &ImageRef::Placeholder(Theme::Mystery),
            (64, 48),
            Duration::from_millis(1),
        )
        .await
        .expect("placeholder");
        assert_eq!(image.dimensions(), (64, 48));
    }

    #[tokio::test]
    async fn fs_resolver_reads_under_root_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("art")).expect("mkdir");
        std::fs::write(dir.path().join("art/map.png"), tiny_png()).expect("write");

        let resolver = FsAssetResolver::new(dir.path());
        let bytes = resolver.fetch("art/map.png").await.expect("fetch");
        assert_eq!(bytes, tiny_png());

        for source in ["../secret.png", "/etc/passwd", "art/../../x.png", ""] {
            assert!(matches!(
                resolver.fetch(source).await,
                Err(SatzwerkError::AssetUnavailable { .. })
            ));
        }
        assert!(resolver.fetch("art/missing.png").await.is_err());
    }
}
