//! The captioning session: one source image, one font, an append-only caption buffer.

use std::path::{Path, PathBuf};

use crate::assets::font::FontAsset;
use crate::assets::raster::{OutputMode, load_source, save_canvas};
use crate::config::{CaptionConfig, Defaults};
use crate::foundation::error::CaptionResult;
use crate::render::compose::{ComposeStyle, compose};
use crate::text::measure::ParleyMeasure;
use crate::text::metrics::{BlockStyle, LineBlock};
use crate::text::wrap::{CaptionLines, WrapOptions, normalize_and_wrap};

/// Loads the source image and font once; every [`Captioner::save`] draws a fresh canvas from the
/// caption accumulated so far.
pub struct Captioner {
    config: CaptionConfig,
    text: String,
    source: image::RgbaImage,
    font: FontAsset,
    measure: ParleyMeasure,
}

impl Captioner {
    #[tracing::instrument(skip_all, fields(src = %config.src.display()))]
    pub fn new(config: CaptionConfig) -> CaptionResult<Self> {
        let config = config.expand_paths();
        config.validate()?;

        let source = load_source(&config.src)?;
        let font = FontAsset::load(&config.font)?;
        let measure = ParleyMeasure::new(&font, config.font_size as f32)?;
        tracing::debug!(
            width = source.width(),
            height = source.height(),
            family = measure.family_name(),
            "loaded source image and font"
        );

        Ok(Self {
            text: config.text.clone(),
            config,
            source,
            font,
            measure,
        })
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    /// Caption accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `(width, height)` of the source image.
    pub fn source_size(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn font(&self) -> &FontAsset {
        &self.font
    }

    /// Append more caption text; nothing is drawn until the next save.
    pub fn append_text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    fn wrap_options(&self) -> WrapOptions {
        WrapOptions {
            max_width: self.source.width() as f32,
            side_padding: self.config.text_width_padding as f32,
            auto_split: self.config.auto_split_chars(),
        }
    }

    fn block_style(&self) -> BlockStyle {
        BlockStyle {
            top_padding: self.config.text_top_padding,
            bottom_padding: self.config.text_bottom_padding,
            vertical_nudge: Defaults::STANDARD.vertical_nudge,
            align: self.config.text_align,
        }
    }

    /// Wrap the current caption against the source width.
    pub fn wrapped_caption(&mut self) -> CaptionLines {
        let opts = self.wrap_options();
        normalize_and_wrap(&mut self.measure, &self.text, opts)
    }

    /// Line placement for `lines` on this source.
    pub fn layout(&mut self, lines: &CaptionLines) -> LineBlock {
        let (w, h) = self.source.dimensions();
        let style = self.block_style();
        LineBlock::measure(&mut self.measure, lines, w, h, style)
    }

    /// Draw `lines` into a new canvas below the source image.
    pub fn draw(&mut self, lines: &CaptionLines) -> CaptionResult<image::RgbaImage> {
        let block = self.layout(lines);
        let style = ComposeStyle {
            text_color: self.config.text_color,
            background: self.config.text_background_color,
        };
        compose(&self.source, &mut self.measure, lines, &block, style)
    }

    /// Wrap and draw the current caption without writing anything.
    pub fn render(&mut self) -> CaptionResult<image::RgbaImage> {
        let lines = self.wrapped_caption();
        self.draw(&lines)
    }

    /// Save to the configured destination (or the `-after` sibling of the source).
    pub fn save(&mut self) -> CaptionResult<PathBuf> {
        self.save_to(None)
    }

    /// Save to `path`, falling back to the configured destination when `None` or empty.
    pub fn save_to(&mut self, path: Option<&Path>) -> CaptionResult<PathBuf> {
        let dest = match path {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => self.config.resolved_output_path(),
        };

        let canvas = self.render()?;
        let mode = OutputMode::for_paths(
            self.config.source_is_lossy_without_alpha(),
            &dest,
            self.config.text_background_color,
        );
        save_canvas(&canvas, &dest, mode)?;
        tracing::info!(path = %dest.display(), ?mode, "saved captioned image");
        Ok(dest)
    }
}
