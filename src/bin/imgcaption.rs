use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use tracing::Level;

use imgcaption::{CaptionConfig, Captioner, Defaults, Rgba8, TextAlign};

#[derive(Parser, Debug)]
#[command(name = "imgcaption", version, about = "Append a caption band below an image")]
struct Cli {
    /// Source image.
    #[arg(long)]
    src: PathBuf,

    /// Caption text. A literal `\n` starts a new line.
    #[arg(long, allow_hyphen_values = true)]
    text: String,

    /// Output image. Defaults to `<name>-after.<ext>` next to the source.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Font file (.ttf, .otf or .ttc).
    #[arg(long, default_value = Defaults::STANDARD.font)]
    font: PathBuf,

    /// Font size in pixels.
    #[arg(long = "font_size", visible_alias = "font-size", default_value_t = Defaults::STANDARD.font_size)]
    font_size: u32,

    #[arg(long = "text_top_padding", visible_alias = "text-top-padding", default_value_t = Defaults::STANDARD.top_padding)]
    text_top_padding: u32,

    #[arg(long = "text_bottom_padding", visible_alias = "text-bottom-padding", default_value_t = Defaults::STANDARD.bottom_padding)]
    text_bottom_padding: u32,

    /// Horizontal room kept free when a line has to wrap.
    #[arg(long = "text_width_padding", visible_alias = "text-width-padding", default_value_t = Defaults::STANDARD.width_padding)]
    text_width_padding: u32,

    /// Text color, e.g. `rgb(0, 0, 0)`, `rgba(0, 0, 0, 0.5)` or `#000000`.
    #[arg(long = "text_color", visible_alias = "text-color", default_value_t = Defaults::STANDARD.text_color)]
    text_color: Rgba8,

    /// Caption band background color.
    #[arg(long = "text_background_color", visible_alias = "text-background-color", default_value_t = Defaults::STANDARD.background_color)]
    text_background_color: Rgba8,

    /// Line alignment inside the caption block: left, center or right.
    #[arg(long = "text_align", visible_alias = "text-align", default_value_t = Defaults::STANDARD.align)]
    text_align: TextAlign,

    /// Also break every segment into chunks of `--text_auto_split_num` characters.
    #[arg(
        long = "text_auto_split",
        visible_alias = "text-auto-split",
        num_args = 0..=1,
        default_value_t = Defaults::STANDARD.auto_split,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    text_auto_split: bool,

    #[arg(long = "text_auto_split_num", visible_alias = "text-auto-split-num", default_value_t = Defaults::STANDARD.auto_split_num)]
    text_auto_split_num: usize,

    /// Log debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    fn into_config(self) -> CaptionConfig {
        let mut cfg = CaptionConfig::new(self.src, self.text)
            .with_font(self.font)
            .with_font_size(self.font_size)
            .with_padding(
                self.text_top_padding,
                self.text_bottom_padding,
                self.text_width_padding,
            )
            .with_colors(self.text_color, self.text_background_color)
            .with_align(self.text_align)
            .with_auto_split(self.text_auto_split.then_some(self.text_auto_split_num));
        cfg.text_auto_split_num = self.text_auto_split_num;
        if let Some(out) = self.out {
            cfg = cfg.with_out(out);
        }
        cfg
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install tracing subscriber")?;

    let config = cli.into_config();
    tracing::debug!(
        config = %serde_json::to_string(&config).context("serialize config")?,
        "resolved configuration"
    );

    let src = config.src.clone();
    let mut captioner = Captioner::new(config)
        .with_context(|| format!("prepare caption for '{}'", src.display()))?;
    let out = captioner.save().context("save captioned image")?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
