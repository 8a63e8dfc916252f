//! Content-addressed picture store.
//!
//! [`ImageStore::store`] filters out small pictures, encodes the rest as
//! JPEG and writes them to `{images_dir}/{content_id}.jpg`. Identical
//! encoded bytes always map to the same file, so re-running a conversion or
//! meeting the same figure twice never produces a second copy.

use crate::error::Pdf2MdError;
use crate::pipeline::encode::{content_id, encode_jpeg};
use image::DynamicImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A picture accepted and written by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// 16-hex-char content id.
    pub id: String,
    /// `{id}.jpg`
    pub filename: String,
    /// Full path of the written file.
    pub path: PathBuf,
    /// `true` when this run had already written the same content.
    pub duplicate: bool,
}

/// Result of offering a picture to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored(StoredImage),
    /// Shorter side below the threshold; nothing was written.
    Skipped { width: u32, height: u32 },
}

/// Writes accepted pictures under one directory.
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    min_side: u32,
    quality: u8,
    written: HashSet<String>,
}

impl ImageStore {
    /// `dir` is created lazily on the first accepted picture.
    pub fn new(dir: impl Into<PathBuf>, min_side: u32, quality: u8) -> Self {
        Self {
            dir: dir.into(),
            min_side,
            quality,
            written: HashSet::new(),
        }
    }

    /// Directory the JPEG files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of distinct files written so far.
    pub fn unique_count(&self) -> usize {
        self.written.len()
    }

    /// Filter, encode, hash and persist one picture.
    pub fn store(&mut self, img: &DynamicImage) -> Result<StoreOutcome, Pdf2MdError> {
        let (width, height) = (img.width(), img.height());
        if width.min(height) < self.min_side {
            debug!(
                "Skipping {}x{} picture (min side {} px)",
                width, height, self.min_side
            );
            return Ok(StoreOutcome::Skipped { width, height });
        }

        let bytes =
            encode_jpeg(img, self.quality).map_err(|source| Pdf2MdError::ImageEncode { source })?;
        let id = content_id(&bytes);
        let filename = format!("{id}.jpg");
        let path = self.dir.join(&filename);

        let duplicate = self.written.contains(&id);
        if duplicate {
            debug!("Picture {} already written in this run", filename);
        } else {
            if self.written.is_empty() {
                info!("Writing pictures to {}", self.dir().display());
            }
            std::fs::create_dir_all(&self.dir).map_err(|source| {
                Pdf2MdError::ImageWriteFailed {
                    path: self.dir.clone(),
                    source,
                }
            })?;
            std::fs::write(&path, &bytes).map_err(|source| Pdf2MdError::ImageWriteFailed {
                path: path.clone(),
                source,
            })?;
            self.written.insert(id.clone());
        }

        Ok(StoreOutcome::Stored(StoredImage {
            id,
            filename,
            path,
            duplicate,
        }))
    }
}
