use crate::draw::surface::CanvasSurface;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const GALLERY_FILE_NAME: &str = "gallery.json";
const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub created_at: String,
    pub data_url: String,
}

impl GalleryEntry {
    pub fn from_png(png: &[u8], now: DateTime<Local>) -> Self {
        Self {
            created_at: now.to_rfc3339(),
            data_url: format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)),
        }
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let encoded = self
            .data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .context("gallery entry is not a png data url")?;
        STANDARD
            .decode(encoded)
            .context("decode gallery entry base64 payload")
    }
}

/// Exported drawings of one session, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    session_key: String,
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new(session_key: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            entries: Vec::new(),
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn export(&mut self, surface: &CanvasSurface, now: DateTime<Local>) -> Result<&GalleryEntry> {
        let png = surface.encode_png().context("serialize canvas for gallery")?;
        self.entries.push(GalleryEntry::from_png(&png, now));
        Ok(&self.entries[self.entries.len() - 1])
    }
}

pub fn session_key_for(now: DateTime<Local>) -> String {
    format!("session_{}", now.format("%Y%m%d_%H%M%S"))
}

/// On-disk gallery: session key -> exported entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GalleryStore {
    #[serde(default)]
    pub sessions: BTreeMap<String, Vec<GalleryEntry>>,
}

impl GalleryStore {
    pub fn entries(&self, session_key: &str) -> &[GalleryEntry] {
        self.sessions
            .get(session_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replaces the stored entries for the gallery's session.
    pub fn record(&mut self, gallery: &Gallery) {
        self.sessions
            .insert(gallery.session_key().to_owned(), gallery.entries().to_vec());
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read gallery file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize gallery file {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create gallery parent folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize gallery")?;
        std::fs::write(path, json).with_context(|| format!("write gallery file {}", path.display()))
    }
}

/// Merges the session's gallery into the file at `path`, keeping other sessions.
pub fn persist(gallery: &Gallery, path: &Path) -> Result<()> {
    let mut store = GalleryStore::load_from_path(path)?;
    store.record(gallery);
    store.save_to_path(path)
}
