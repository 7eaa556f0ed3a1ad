use crate::config::TextAlign;
use crate::text::measure::TextMeasure;
use crate::text::wrap::CaptionLines;

/// Pixel height of one caption line, taken from the first line only.
///
/// An empty first line followed by more lines is measured as a single space, so a leading break
/// cannot collapse the band. An entirely empty caption has no line height.
pub fn line_height_px<M: TextMeasure + ?Sized>(measure: &mut M, lines: &CaptionLines) -> u32 {
    let first = lines.first_line();
    let sample = if first.is_empty() && lines.line_count() > 1 {
        " "
    } else {
        first
    };
    measure.line_height(sample).ceil().max(0.0) as u32
}

/// `line_height * line_count + top + bottom`: the height of the caption band.
pub fn required_height<M: TextMeasure + ?Sized>(
    measure: &mut M,
    lines: &CaptionLines,
    top_padding: u32,
    bottom_padding: u32,
) -> u32 {
    let count = u32::try_from(lines.line_count()).unwrap_or(u32::MAX);
    line_height_px(measure, lines)
        .saturating_mul(count)
        .saturating_add(top_padding)
        .saturating_add(bottom_padding)
}

/// Shared horizontal origin: centres the widest line on the canvas.
pub fn draw_origin_x<M: TextMeasure + ?Sized>(
    measure: &mut M,
    lines: &CaptionLines,
    canvas_width: u32,
) -> f32 {
    let widest = lines
        .lines()
        .map(|l| measure.text_width(l))
        .fold(0.0, f32::max);
    (canvas_width as f32 - widest) / 2.0
}

/// Resolved placement of every caption line on the output canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBlock {
    pub line_height: u32,
    pub band_height: u32,
    pub origin_x: f32,
    /// Top edge of the first line.
    pub origin_y: f32,
    pub widths: Vec<f32>,
    /// Left edge of each line after alignment inside the block.
    pub xs: Vec<f32>,
}

/// Layout inputs that come from configuration rather than the text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockStyle {
    pub top_padding: u32,
    pub bottom_padding: u32,
    pub vertical_nudge: u32,
    pub align: TextAlign,
}

impl LineBlock {
    pub fn measure<M: TextMeasure + ?Sized>(
        measure: &mut M,
        lines: &CaptionLines,
        source_width: u32,
        source_height: u32,
        style: BlockStyle,
    ) -> Self {
        let line_height = line_height_px(measure, lines);
        let band_height =
            required_height(measure, lines, style.top_padding, style.bottom_padding);
        let origin_x = draw_origin_x(measure, lines, source_width);
        let widths: Vec<f32> = lines.lines().map(|l| measure.text_width(l)).collect();
        let widest = widths.iter().copied().fold(0.0, f32::max);
        let xs = widths
            .iter()
            .map(|&w| origin_x + align_offset(widest, w, style.align))
            .collect();
        let origin_y = source_height as f32
            - style.top_padding as f32
            - style.vertical_nudge as f32;

        Self {
            line_height,
            band_height,
            origin_x,
            origin_y,
            widths,
            xs,
        }
    }

    /// Top edge of line `i`.
    pub fn line_y(&self, i: usize) -> f32 {
        self.origin_y + (i as f32) * (self.line_height as f32)
    }
}

fn align_offset(container: f32, content: f32, align: TextAlign) -> f32 {
    let rem = (container - content).max(0.0);
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => rem * 0.5,
        TextAlign::Right => rem,
    }
}
