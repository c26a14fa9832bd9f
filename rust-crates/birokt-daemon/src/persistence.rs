//! Local inspection storage
//!
//! Each save writes a directory `<inspections_dir>/<timestamp>/` holding
//! `inspection.json` and the captured photos.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use birokt_voice::{ImageBlob, InspectionDraft, Persistence, VoiceError};
use chrono::{Local, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedInspection<'a> {
    saved_at: String,
    #[serde(flatten)]
    draft: &'a InspectionDraft,
    photos: Vec<String>,
}

pub struct JsonPersistence {
    dir: PathBuf,
}

impl JsonPersistence {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fresh directory for one save; never reuses an existing one
    async fn allocate_dir(&self) -> std::io::Result<PathBuf> {
        let stamp = Local::now().format("%Y-%m-%d_%H%M%S").to_string();
        let mut candidate = self.dir.join(&stamp);
        let mut n = 1;
        while tokio::fs::try_exists(&candidate).await? {
            n += 1;
            candidate = self.dir.join(format!("{}-{}", stamp, n));
        }
        tokio::fs::create_dir_all(&candidate).await?;
        Ok(candidate)
    }
}

fn extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[async_trait]
impl Persistence for JsonPersistence {
    async fn submit(&self, draft: &InspectionDraft, photos: &[ImageBlob]) -> birokt_voice::Result<()> {
        let dir = self
            .allocate_dir()
            .await
            .map_err(|e| VoiceError::Persistence(format!("{}: {}", self.dir.display(), e)))?;

        let mut names = Vec::with_capacity(photos.len());
        for (i, photo) in photos.iter().enumerate() {
            let name = format!("bilde-{}.{}", i + 1, extension(&photo.mime_type));
            tokio::fs::write(dir.join(&name), &photo.bytes).await?;
            names.push(name);
        }

        let record = SavedInspection {
            saved_at: Utc::now().to_rfc3339(),
            draft,
            photos: names,
        };
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(dir.join("inspection.json"), json).await?;

        info!("💾 Inspection saved to {}", dir.display());
        Ok(())
    }
}
