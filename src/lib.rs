//! Append a word-wrapped caption band below an image.
//!
//! A [`Captioner`] loads the source image and font once, wraps the caption against the image
//! width, extends the canvas by the height the wrapped lines need, draws them, and saves the result.
#![forbid(unsafe_code)]

pub mod assets;
pub mod captioner;
pub mod config;
pub mod foundation;
pub mod render;
pub mod text;

pub use crate::assets::font::{FontAsset, FontOrigin};
pub use crate::captioner::Captioner;
pub use crate::config::{CaptionConfig, Defaults, TextAlign, default_output_path, expand_home};
pub use crate::foundation::color::Rgba8;
pub use crate::foundation::error::{CaptionError, CaptionResult};
pub use crate::text::measure::{ParleyMeasure, TextMeasure};
pub use crate::text::metrics::{LineBlock, draw_origin_x, required_height};
pub use crate::text::wrap::{CaptionLines, WrapOptions, normalize_and_wrap, wrap_line};
