use crate::assets::font::FontAsset;
use crate::foundation::color::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Pixel measurement of single-line text.
///
/// Wrapping and block metrics only need these two numbers, so they are written against this trait
/// rather than a concrete shaper.
pub trait TextMeasure {
    /// Advance width of `text` laid out on one unbroken line.
    fn text_width(&mut self, text: &str) -> f32;

    /// Height of one line of `text` (ascent + descent + leading). Empty text has no height.
    fn line_height(&mut self, text: &str) -> f32;
}

/// Parley-backed measurement and layout for one font at one size.
pub struct ParleyMeasure {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family_name: String,
    size_px: f32,
}

impl ParleyMeasure {
    pub fn new(font: &FontAsset, size_px: f32) -> CaptionResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CaptionError::validation(
                "font size must be finite and > 0",
            ));
        }

        // Only the caption font is registered, so shaping never falls back to a face the
        // rasteriser was not given.
        let mut font_ctx = parley::FontContext {
            collection: parley::fontique::Collection::new(parley::fontique::CollectionOptions {
                system_fonts: false,
                ..Default::default()
            }),
            source_cache: parley::fontique::SourceCache::default(),
        };
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == font.index()))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| CaptionError::font("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::font("registered font family has no name"))?
            .to_string();
        tracing::debug!(
            family = %family_name,
            index = font.index(),
            size_px,
            "registered caption font"
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            size_px,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` as a single unbroken line painted with `brush`.
    pub fn layout_line(&mut self, text: &str, brush: Rgba8) -> parley::Layout<Rgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for ParleyMeasure {
    fn text_width(&mut self, text: &str) -> f32 {
        let layout = self.layout_line(text, Rgba8::default());
        layout
            .lines()
            .map(|line| line.metrics().advance)
            .fold(0.0, f32::max)
    }

    fn line_height(&mut self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let layout = self.layout_line(text, Rgba8::default());
        layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                m.ascent + m.descent + m.leading
            })
            .unwrap_or(0.0)
    }
}

/// Every character advances by the same amount. Deterministic stand-in for a real font.
#[cfg(test)]
pub(crate) struct FixedAdvance {
    pub(crate) advance: f32,
    pub(crate) height: f32,
}

#[cfg(test)]
impl TextMeasure for FixedAdvance {
    fn text_width(&mut self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn line_height(&mut self, text: &str) -> f32 {
        if text.is_empty() { 0.0 } else { self.height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_sizes() {
        let font = FontAsset::from_bytes(vec![1, 2, 3]).unwrap();
        assert!(ParleyMeasure::new(&font, 0.0).is_err());
        assert!(ParleyMeasure::new(&font, f32::NAN).is_err());
    }

    #[test]
    fn garbage_bytes_register_no_family() {
        let font = FontAsset::from_bytes(vec![1, 2, 3, 4]).unwrap();
        let err = ParleyMeasure::new(&font, 26.0).err().unwrap();
        assert!(err.to_string().contains("font error:"));
    }

    #[test]
    fn parley_widths_grow_with_text_if_font_available() {
        let Some(font) = FontAsset::system_fallback() else {
            return;
        };
        let mut m = ParleyMeasure::new(&font, 26.0).unwrap();
        let a = m.text_width("i");
        let b = m.text_width("iiii");
        assert!(b > a);
        assert_eq!(m.text_width(""), 0.0);
        assert!(m.line_height("Hg") > 0.0);
        assert_eq!(m.line_height(""), 0.0);
    }

    #[test]
    fn selects_the_family_of_the_loaded_face() {
        let Some(font) = FontAsset::system_fallback() else {
            return;
        };
        let mut ctx = parley::FontContext::default();
        let families = ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let expected = families
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == font.index()))
            .and_then(|(id, _)| ctx.collection.family_name(*id))
            .map(str::to_string)
            .unwrap();

        let m = ParleyMeasure::new(&font, 26.0).unwrap();
        assert_eq!(m.family_name(), expected);
    }
}
