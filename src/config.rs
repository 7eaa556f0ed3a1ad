//! Caption configuration: defaults, alignment, and path handling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Process-wide default values. Read-only; there is no runtime mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Defaults {
    pub top_padding: u32,
    pub bottom_padding: u32,
    /// Horizontal budget subtracted from the image width before a wrapped line is closed.
    pub width_padding: u32,
    pub font_size: u32,
    pub font: &'static str,
    pub text_color: Rgba8,
    pub background_color: Rgba8,
    pub align: TextAlign,
    pub auto_split: bool,
    pub auto_split_num: usize,
    /// Extra upward shift of the text origin, on top of the top padding.
    pub vertical_nudge: u32,
}

impl Defaults {
    pub const STANDARD: Defaults = Defaults {
        top_padding: 10,
        bottom_padding: 10,
        width_padding: 80,
        font_size: 26,
        font: "./fonts/PingFang.ttc",
        text_color: Rgba8::BLACK,
        background_color: Rgba8::WHITE,
        align: TextAlign::Center,
        auto_split: false,
        auto_split_num: 13,
        vertical_nudge: 10,
    };
}

/// Horizontal alignment of each line inside the caption block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for TextAlign {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "centre" | "middle" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            other => Err(CaptionError::validation(format!(
                "invalid text align \"{other}\": expected left, center or right"
            ))),
        }
    }
}

impl TryFrom<String> for TextAlign {
    type Error = CaptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextAlign> for String {
    fn from(value: TextAlign) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// Everything needed to caption one source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Source image path.
    pub src: PathBuf,
    /// Destination path. `None` means `<stem>-after.<ext>` next to the source.
    #[serde(default)]
    pub out: Option<PathBuf>,
    /// Caption text. May be empty; a literal `\n` is a hard break.
    pub text: String,
    #[serde(default = "default_font")]
    pub font: PathBuf,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_top_padding")]
    pub text_top_padding: u32,
    #[serde(default = "default_bottom_padding")]
    pub text_bottom_padding: u32,
    #[serde(default = "default_width_padding")]
    pub text_width_padding: u32,
    #[serde(default = "default_text_color")]
    pub text_color: Rgba8,
    #[serde(default = "default_background_color")]
    pub text_background_color: Rgba8,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub text_auto_split: bool,
    #[serde(default = "default_auto_split_num")]
    pub text_auto_split_num: usize,
}

fn default_font() -> PathBuf {
    PathBuf::from(Defaults::STANDARD.font)
}

fn default_font_size() -> u32 {
    Defaults::STANDARD.font_size
}

fn default_top_padding() -> u32 {
    Defaults::STANDARD.top_padding
}

fn default_bottom_padding() -> u32 {
    Defaults::STANDARD.bottom_padding
}

fn default_width_padding() -> u32 {
    Defaults::STANDARD.width_padding
}

fn default_text_color() -> Rgba8 {
    Defaults::STANDARD.text_color
}

fn default_background_color() -> Rgba8 {
    Defaults::STANDARD.background_color
}

fn default_auto_split_num() -> usize {
    Defaults::STANDARD.auto_split_num
}

impl CaptionConfig {
    pub fn new(src: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let d = Defaults::STANDARD;
        Self {
            src: expand_home(src.into()),
            out: None,
            text: text.into(),
            font: default_font(),
            font_size: d.font_size,
            text_top_padding: d.top_padding,
            text_bottom_padding: d.bottom_padding,
            text_width_padding: d.width_padding,
            text_color: d.text_color,
            text_background_color: d.background_color,
            text_align: d.align,
            text_auto_split: d.auto_split,
            text_auto_split_num: d.auto_split_num,
        }
    }

    /// Parse a JSON document; omitted fields take their defaults.
    pub fn from_json_str(json: &str) -> CaptionResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| CaptionError::validation(format!("invalid caption config: {e}")))?;
        Ok(cfg.expand_paths())
    }

    /// Expand a leading `~` in the source and destination paths.
    pub fn expand_paths(mut self) -> Self {
        self.src = expand_home(self.src);
        self.out = self.out.map(expand_home);
        self
    }

    /// An empty path is treated the same as no destination at all.
    pub fn with_out(mut self, out: impl Into<PathBuf>) -> Self {
        let out = out.into();
        self.out = if out.as_os_str().is_empty() {
            None
        } else {
            Some(expand_home(out))
        };
        self
    }

    pub fn with_font(mut self, font: impl Into<PathBuf>) -> Self {
        self.font = font.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_padding(mut self, top: u32, bottom: u32, width: u32) -> Self {
        self.text_top_padding = top;
        self.text_bottom_padding = bottom;
        self.text_width_padding = width;
        self
    }

    pub fn with_colors(mut self, text: Rgba8, background: Rgba8) -> Self {
        self.text_color = text;
        self.text_background_color = background;
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    /// `Some(n)` enables the character-count split at `n` characters per chunk.
    pub fn with_auto_split(mut self, num: Option<usize>) -> Self {
        match num {
            Some(n) => {
                self.text_auto_split = true;
                self.text_auto_split_num = n;
            }
            None => self.text_auto_split = false,
        }
        self
    }

    pub fn validate(&self) -> CaptionResult<()> {
        if self.src.as_os_str().is_empty() {
            return Err(CaptionError::validation("source path must be non-empty"));
        }
        if self.font_size == 0 {
            return Err(CaptionError::validation("font size must be > 0"));
        }
        if self.text_auto_split && self.text_auto_split_num == 0 {
            return Err(CaptionError::validation(
                "auto split character count must be > 0",
            ));
        }
        Ok(())
    }

    pub fn source_is_lossy_without_alpha(&self) -> bool {
        is_lossy_without_alpha(&self.src)
    }

    /// Character budget for the auto split, if enabled.
    pub fn auto_split_chars(&self) -> Option<usize> {
        self.text_auto_split.then_some(self.text_auto_split_num)
    }

    /// Configured destination, or the `-after` sibling of the source.
    pub fn resolved_output_path(&self) -> PathBuf {
        match &self.out {
            Some(p) if !p.as_os_str().is_empty() => p.clone(),
            _ => default_output_path(&self.src),
        }
    }
}

/// Replace a leading `~` with the current user's home directory.
pub fn expand_home(path: PathBuf) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path;
    };
    let rest = if s == "~" {
        ""
    } else if let Some(rest) = s.strip_prefix("~/") {
        rest
    } else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => path,
    }
}

/// Case-sensitive `.jpg` / `.jpeg` sniff on the path text.
pub fn is_lossy_without_alpha(path: &Path) -> bool {
    let s = path.to_string_lossy();
    s.contains(".jpg") || s.contains(".jpeg")
}

/// `dir/name.ext` -> `dir/name-after.ext`.
pub fn default_output_path(src: &Path) -> PathBuf {
    let stem = src.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push("-after");
    if let Some(ext) = src.extension() {
        name.push(".");
        name.push(ext);
    }
    src.with_file_name(name)
}
