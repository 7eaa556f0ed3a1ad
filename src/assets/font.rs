use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Defaults;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Families tried, in order, when the bundled default font is missing.
const FALLBACK_FAMILIES: &[&str] = &[
    "PingFang SC",
    "Noto Sans CJK SC",
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Helvetica",
    "Arial",
];

/// Where the font bytes came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    File(PathBuf),
    System { family: String },
    Memory,
}

/// Raw font file bytes plus the face index inside a collection.
#[derive(Clone, Debug)]
pub struct FontAsset {
    bytes: Arc<Vec<u8>>,
    index: u32,
    origin: FontOrigin,
}

impl FontAsset {
    pub fn from_bytes(bytes: Vec<u8>) -> CaptionResult<Self> {
        if bytes.is_empty() {
            return Err(CaptionError::font("font bytes are empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
            origin: FontOrigin::Memory,
        })
    }

    /// Load a font file.
    ///
    /// Only the built-in default path may fall back to a system face; an explicitly chosen font
    /// that cannot be read is an error.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> CaptionResult<Self> {
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => Ok(Self {
                bytes: Arc::new(bytes),
                index: 0,
                origin: FontOrigin::File(path.to_path_buf()),
            }),
            Ok(_) => Err(CaptionError::font(format!(
                "font file '{}' is empty",
                path.display()
            ))),
            Err(e) if path == Path::new(Defaults::STANDARD.font) => {
                tracing::warn!(
                    "default font '{}' unavailable ({e}); falling back to a system font",
                    path.display()
                );
                Self::system_fallback().ok_or_else(|| {
                    CaptionError::font(format!(
                        "default font '{}' unavailable ({e}) and no system font was found",
                        path.display()
                    ))
                })
            }
            Err(e) => Err(CaptionError::font(format!(
                "failed to read font '{}': {e}",
                path.display()
            ))),
        }
    }

    /// Resolve a sans-serif face from the fonts installed on this machine.
    pub fn system_fallback() -> Option<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let mut families: Vec<usvg::fontdb::Family<'_>> = FALLBACK_FAMILIES
            .iter()
            .copied()
            .map(usvg::fontdb::Family::Name)
            .collect();
        families.push(usvg::fontdb::Family::SansSerif);

        let id = db
            .query(&usvg::fontdb::Query {
                families: &families,
                ..Default::default()
            })
            .or_else(|| db.faces().next().map(|face| face.id))?;

        let family = db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        tracing::debug!(family = %family, index, "resolved system font");

        Some(Self {
            bytes: Arc::new(bytes),
            index,
            origin: FontOrigin::System { family },
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Face index inside a `.ttc` collection (0 for single-face files).
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_font_is_an_error() {
        let err = FontAsset::load(Path::new("target/definitely/missing.ttf")).unwrap_err();
        assert!(err.to_string().contains("font error:"));
        assert!(err.to_string().contains("missing.ttf"));
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(FontAsset::from_bytes(Vec::new()).is_err());
        let f = FontAsset::from_bytes(vec![0, 1, 0, 0]).unwrap();
        assert_eq!(f.origin(), &FontOrigin::Memory);
        assert_eq!(f.index(), 0);
    }

    #[test]
    fn default_path_falls_back_when_possible() {
        if Path::new(Defaults::STANDARD.font).exists() {
            return;
        }
        match FontAsset::load(Path::new(Defaults::STANDARD.font)) {
            Ok(f) => assert!(matches!(f.origin(), FontOrigin::System { .. })),
            Err(e) => assert!(e.to_string().contains("no system font")),
        }
    }
}
