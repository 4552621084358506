use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cache::fingerprint::CacheKey;
use crate::foundation::error::ReelResult;

/// What kind of artifact a key names; decides directory and file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind<'a> {
    /// Synthesized speech, `audio/<key>.wav`.
    Audio,
    /// Materialized code snippet, `codes/<key>.<ext>`, or `codes/<key>_<tag>.<ext>` when the
    /// snippet carries a highlighter hint.
    CodeSource { ext: &'a str, tag: Option<&'a str> },
    /// Highlighted code image, `images/<key>.png`.
    CodeImage,
}

/// Result of [`ArtifactCache::ensure`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    /// The file already exists; the producer must not regenerate it.
    pub hit: bool,
}

/// Content-addressed artifact directory.
///
/// Trust is placed entirely in the key: an existing file is a hit, its contents are never
/// verified. Single writer, no locking.
#[derive(Clone, Debug)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("audio")
    }

    pub fn code_dir(&self) -> PathBuf {
        self.root.join("codes")
    }

    pub fn image_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Scratch space for encoder inputs; not content-addressed.
    pub fn work_dir(&self) -> PathBuf {
        self.root.join("work")
    }

    pub fn create_dirs(&self) -> ReelResult<()> {
        for dir in [
            self.audio_dir(),
            self.code_dir(),
            self.image_dir(),
            self.work_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create cache dir '{}'", dir.display()))?;
        }
        Ok(())
    }

    /// Deterministic location of an artifact.
    pub fn path_for(&self, key: CacheKey, kind: ArtifactKind<'_>) -> PathBuf {
        match kind {
            ArtifactKind::Audio => self.audio_dir().join(format!("{key}.wav")),
            ArtifactKind::CodeSource { ext, tag: None } => {
                self.code_dir().join(format!("{key}.{ext}"))
            }
            ArtifactKind::CodeSource {
                ext,
                tag: Some(tag),
            } => self.code_dir().join(format!("{key}_{tag}.{ext}")),
            ArtifactKind::CodeImage => self.image_dir().join(format!("{key}.png")),
        }
    }

    /// Resolve the location and report whether the artifact is already present.
    pub fn ensure(&self, key: CacheKey, kind: ArtifactKind<'_>) -> CacheEntry {
        let path = self.path_for(key, kind);
        let hit = path.is_file();
        tracing::debug!(path = %path.display(), hit, "cache lookup");
        CacheEntry { path, hit }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
