use crate::foundation::color::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    Rgba8::rgba(px[0], px[1], px[2], px[3]).to_premul_array()
}

pub fn unpremultiply(px: PremulRgba8) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 0 {
        return [0, 0, 0, 0];
    }
    if a == 255 {
        return px;
    }
    let un = |c: u8| ((u32::from(c) * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

/// Composite a premultiplied text layer over a straight-alpha canvas.
///
/// Pixels where the layer is fully transparent are left bit-for-bit untouched.
pub fn over_layer_in_place(canvas: &mut image::RgbaImage, layer_premul: &[u8]) -> CaptionResult<()> {
    let dst: &mut [u8] = canvas;
    if dst.len() != layer_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionError::render(
            "over_layer_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(layer_premul.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let dp = premultiply([d[0], d[1], d[2], d[3]]);
        let out = unpremultiply(over(dp, [s[0], s[1], s[2], s[3]]));
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Drop the alpha channel by blending over an opaque background.
pub fn flatten_over(canvas: &image::RgbaImage, bg: Rgba8) -> image::RgbImage {
    let bg = bg.opaque();
    let (w, h) = canvas.dimensions();
    let mut out = image::RgbImage::new(w, h);
    for (src, dst) in canvas.pixels().zip(out.pixels_mut()) {
        let a = u16::from(src[3]);
        if a == 255 {
            *dst = image::Rgb([src[0], src[1], src[2]]);
            continue;
        }
        let inv = 255 - a;
        let blend = |c: u8, b: u8| {
            mul_div255(u16::from(c), a).saturating_add(mul_div255(u16::from(b), inv))
        };
        *dst = image::Rgb([
            blend(src[0], bg.r),
            blend(src[1], bg.g),
            blend(src[2], bg.b),
        ]);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [0, 0, 0, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn unpremultiply_inverts_opaque_and_clear() {
        assert_eq!(unpremultiply([1, 2, 3, 255]), [1, 2, 3, 255]);
        assert_eq!(unpremultiply([9, 9, 9, 0]), [0, 0, 0, 0]);
        assert_eq!(unpremultiply([64, 0, 128, 128]), [128, 0, 255, 128]);
    }

    #[test]
    fn transparent_layer_leaves_canvas_untouched() {
        let mut canvas = image::RgbaImage::from_pixel(2, 2, image::Rgba([7, 8, 9, 77]));
        let before = canvas.clone();
        over_layer_in_place(&mut canvas, &[0u8; 16]).unwrap();
        assert_eq!(canvas, before);
    }

    #[test]
    fn opaque_layer_pixel_replaces_canvas_pixel() {
        let mut canvas = image::RgbaImage::from_pixel(1, 2, image::Rgba([255, 255, 255, 255]));
        over_layer_in_place(&mut canvas, &[0, 0, 0, 255, 0, 0, 0, 0]).unwrap();
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(0, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn layer_size_mismatch_is_an_error() {
        let mut canvas = image::RgbaImage::new(2, 2);
        assert!(over_layer_in_place(&mut canvas, &[0u8; 4]).is_err());
    }

    #[test]
    fn flatten_blends_over_opaque_background() {
        let canvas = image::RgbaImage::from_raw(
            3,
            1,
            vec![10, 20, 30, 255, 0, 0, 0, 0, 255, 0, 0, 128],
        )
        .unwrap();
        let rgb = flatten_over(&canvas, Rgba8::rgba(255, 255, 255, 10));
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(2, 0).0, [255, 127, 127]);
    }
}
