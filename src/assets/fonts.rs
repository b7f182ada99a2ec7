use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::error::{CoverError, CoverResult};

/// Font used for every text element on the banner.
#[derive(Clone)]
pub struct CoverFonts {
    bytes: Arc<Vec<u8>>,
    index: u32,
}

impl std::fmt::Debug for CoverFonts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverFonts")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl CoverFonts {
    /// Wrap raw TTF/OTF bytes (face 0).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_face_bytes(bytes, 0)
    }

    /// Wrap font bytes and select face `index` of a collection.
    pub fn from_face_bytes(bytes: Vec<u8>, index: u32) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index,
        }
    }

    /// Read a font file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> CoverResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// First sans-serif face installed on the host, or any face if none match.
    pub fn discover_system() -> CoverResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in extra_font_dirs() {
            load_fonts_from_dir(&mut db, &dir);
        }

        let query = usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| CoverError::validation("no system fonts available"))?;

        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| CoverError::validation("system font face data unavailable"))?;
        tracing::debug!(face_index = index, bytes = bytes.len(), "discovered system font");
        Ok(Self::from_face_bytes(bytes, index))
    }

    /// Raw font bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Face index inside a collection.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        let bytes = self.bytes.as_ref().clone();
        vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), self.index)
    }
}

fn extra_font_dirs() -> Vec<PathBuf> {
    ["assets", "assets/fonts", "fonts"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}
