use std::path::Path;

use crate::config::is_lossy_without_alpha;
use crate::foundation::color::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::composite::flatten_over;

/// Decode the source image into straight-alpha RGBA8.
pub fn load_source(path: &Path) -> CaptionResult<image::RgbaImage> {
    let dyn_img = image::open(path).map_err(|e| CaptionError::image(path, e))?;
    Ok(dyn_img.to_rgba8())
}

/// How the canvas is encoded on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Keep the alpha channel.
    Rgba,
    /// Flatten over the given color and write RGB8.
    Rgb { background: Rgba8 },
}

impl OutputMode {
    /// Lossy sources are flattened; so are destinations that cannot hold alpha.
    pub fn for_paths(source_is_lossy: bool, dest: &Path, background: Rgba8) -> Self {
        if source_is_lossy || is_lossy_without_alpha(dest) {
            Self::Rgb { background }
        } else {
            Self::Rgba
        }
    }
}

/// Encode `canvas` to `path`, choosing the container from the extension.
pub fn save_canvas(canvas: &image::RgbaImage, path: &Path, mode: OutputMode) -> CaptionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CaptionError::io(parent, e))?;
    }

    let written = match mode {
        OutputMode::Rgba => canvas.save(path),
        OutputMode::Rgb { background } => flatten_over(canvas, background).save(path),
    };
    written.map_err(|e| CaptionError::image(path, e))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn output_mode_follows_source_and_destination() {
        let bg = Rgba8::WHITE;
        assert_eq!(
            OutputMode::for_paths(true, Path::new("o.png"), bg),
            OutputMode::Rgb { background: bg }
        );
        assert_eq!(
            OutputMode::for_paths(false, Path::new("o.jpg"), bg),
            OutputMode::Rgb { background: bg }
        );
        assert_eq!(
            OutputMode::for_paths(false, Path::new("o.png"), bg),
            OutputMode::Rgba
        );
    }

    #[test]
    fn missing_source_reports_path() {
        let err = load_source(Path::new("target/nope/missing.png")).unwrap_err();
        assert!(matches!(err, CaptionError::Image { .. }));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn undecodable_source_is_an_image_error() {
        let dir = PathBuf::from("target").join("assets_image_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_an_image.png");
        std::fs::write(&path, b"plain text").unwrap();

        let err = load_source(&path).unwrap_err();
        assert!(matches!(err, CaptionError::Image { .. }));
        assert!(err.to_string().contains("not_an_image.png"));
    }

    #[test]
    fn unwritable_output_dir_is_an_io_error() {
        let dir = PathBuf::from("target").join("assets_image_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"file, not a dir").unwrap();

        let canvas = image::RgbaImage::new(1, 1);
        let err = save_canvas(&canvas, &blocker.join("out.png"), OutputMode::Rgba).unwrap_err();
        assert!(matches!(err, CaptionError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn unknown_extension_is_an_image_error() {
        let dir = PathBuf::from("target").join("assets_image_unit");
        let canvas = image::RgbaImage::new(1, 1);
        let err = save_canvas(&canvas, &dir.join("out.unknownext"), OutputMode::Rgba).unwrap_err();
        assert!(matches!(err, CaptionError::Image { .. }));
    }

    #[test]
    fn save_creates_parent_dirs_and_drops_alpha_for_rgb() {
        let dir = PathBuf::from("target").join("assets_image_unit").join("nested");
        let _ = std::fs::remove_dir_all(&dir);
        let canvas = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));

        let png = dir.join("a.png");
        save_canvas(&canvas, &png, OutputMode::Rgba).unwrap();
        assert!(image::open(&png).unwrap().color().has_alpha());

        let rgb_png = dir.join("b.png");
        save_canvas(
            &canvas,
            &rgb_png,
            OutputMode::Rgb {
                background: Rgba8::WHITE,
            },
        )
        .unwrap();
        let back = image::open(&rgb_png).unwrap();
        assert!(!back.color().has_alpha());
        assert_eq!(back.to_rgb8().get_pixel(2, 1).0, [10, 20, 30]);
    }
}
