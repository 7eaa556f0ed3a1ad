use crate::foundation::color::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::composite::over_layer_in_place;
use crate::text::measure::ParleyMeasure;
use crate::text::metrics::LineBlock;
use crate::text::wrap::CaptionLines;

/// Colors used while assembling the output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeStyle {
    pub text_color: Rgba8,
    pub background: Rgba8,
}

/// Allocate `source_width x (source_height + band_height)` filled with the background and paste
/// the source verbatim at the origin.
pub fn extend_canvas(
    source: &image::RgbaImage,
    band_height: u32,
    background: Rgba8,
) -> CaptionResult<image::RgbaImage> {
    let (w, h) = source.dimensions();
    let total_h = h
        .checked_add(band_height)
        .ok_or_else(|| CaptionError::validation("canvas height overflows u32"))?;
    let mut canvas = image::RgbaImage::from_pixel(w, total_h, background.into());
    image::imageops::replace(&mut canvas, source, 0, 0);
    Ok(canvas)
}

/// Rasterise every caption line into a transparent premultiplied layer the size of the canvas.
pub fn rasterize_lines(
    measure: &mut ParleyMeasure,
    lines: &CaptionLines,
    block: &LineBlock,
    color: Rgba8,
    width: u32,
    height: u32,
) -> CaptionResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CaptionError::validation("canvas width exceeds 65535 px"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CaptionError::validation("canvas height exceeds 65535 px"))?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);

    for (i, text) in lines.lines().enumerate() {
        if text.is_empty() {
            continue;
        }
        let layout = measure.layout_line(text, color);
        let x = f64::from(block.xs.get(i).copied().unwrap_or(block.origin_x));
        let y = f64::from(block.line_y(i));
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Offsets and baseline are relative to the line's top-left corner.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(run.run().font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap)
}

/// Build the captioned image: extended canvas, pasted source, text drawn into the band.
#[tracing::instrument(skip_all, fields(lines = lines.line_count()))]
pub fn compose(
    source: &image::RgbaImage,
    measure: &mut ParleyMeasure,
    lines: &CaptionLines,
    block: &LineBlock,
    style: ComposeStyle,
) -> CaptionResult<image::RgbaImage> {
    let mut canvas = extend_canvas(source, block.band_height, style.background)?;
    let (w, h) = canvas.dimensions();
    tracing::debug!(width = w, height = h, band = block.band_height, "allocated canvas");

    let layer = rasterize_lines(measure, lines, block, style.text_color, w, h)?;
    over_layer_in_place(&mut canvas, layer.data_as_u8_slice())?;
    Ok(canvas)
}
