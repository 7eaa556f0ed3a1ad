use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaptionError, CaptionResult};

/// Straight-alpha RGBA8 color as written on the command line.
///
/// Accepted spellings (case-insensitive, whitespace-tolerant):
/// - `rgb(r, g, b)` with 0..=255 channels
/// - `rgba(r, g, b, a)` where `a` is 0..=255, or a fraction in 0.0..=1.0 when it contains a `.`
/// - `#RRGGBB` / `#RRGGBBAA`
/// - `white`, `black`, `transparent`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn parse(s: &str) -> CaptionResult<Self> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        if let Some(hex) = norm.strip_prefix('#') {
            return parse_hex(hex).map_err(|e| invalid(s, &e));
        }
        if let Some(body) = functional_body(&norm, "rgba") {
            return parse_channels(body, true).map_err(|e| invalid(s, &e));
        }
        if let Some(body) = functional_body(&norm, "rgb") {
            return parse_channels(body, false).map_err(|e| invalid(s, &e));
        }

        Err(invalid(
            s,
            "expected rgb(r, g, b), rgba(r, g, b, a), #RRGGBB[AA] or a color name",
        ))
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Same color with the alpha channel forced to 255.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiplied RGBA8 bytes, rounding the same way the compositor does.
    pub fn to_premul_array(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            (((u16::from(c) * u16::from(a)) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba8 {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = CaptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_string()
    }
}

impl From<Rgba8> for image::Rgba<u8> {
    fn from(value: Rgba8) -> Self {
        image::Rgba(value.to_array())
    }
}

fn invalid(input: &str, why: &str) -> CaptionError {
    CaptionError::validation(format!("invalid color \"{input}\": {why}"))
}

fn functional_body<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')
}

fn parse_channels(body: &str, with_alpha: bool) -> Result<Rgba8, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(format!(
            "expected {expected} comma-separated channels, got {}",
            parts.len()
        ));
    }

    fn channel(part: &str) -> Result<u8, String> {
        part.parse::<u8>()
            .map_err(|_| format!("channel \"{part}\" must be an integer in 0..=255"))
    }

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        alpha(parts[3])?
    } else {
        255
    };
    Ok(Rgba8::rgba(r, g, b, a))
}

fn alpha(part: &str) -> Result<u8, String> {
    if part.contains('.') {
        let v: f64 = part
            .parse()
            .map_err(|_| format!("alpha \"{part}\" is not a number"))?;
        if !(0.0..=1.0).contains(&v) {
            return Err(format!("fractional alpha \"{part}\" must be in 0.0..=1.0"));
        }
        Ok((v * 255.0).round() as u8)
    } else {
        part.parse::<u8>()
            .map_err(|_| format!("alpha \"{part}\" must be an integer in 0..=255"))
    }
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }

    match s.len() {
        6 => Ok(Rgba8::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_rgb_strings() {
        assert_eq!(Rgba8::parse("rgb(255, 255, 255)").unwrap(), Rgba8::WHITE);
        assert_eq!(Rgba8::parse("rgb(0,0,0)").unwrap(), Rgba8::BLACK);
        assert_eq!(
            Rgba8::parse("  RGB( 12 , 34,56 ) ").unwrap(),
            Rgba8::rgb(12, 34, 56)
        );
    }

    #[test]
    fn parses_rgba_integer_and_fraction_alpha() {
        assert_eq!(
            Rgba8::parse("rgba(1, 2, 3, 128)").unwrap(),
            Rgba8::rgba(1, 2, 3, 128)
        );
        assert_eq!(
            Rgba8::parse("rgba(1, 2, 3, 0.5)").unwrap(),
            Rgba8::rgba(1, 2, 3, 128)
        );
        assert!(Rgba8::parse("rgba(1, 2, 3, 1.5)").is_err());
    }

    #[test]
    fn parses_hex_and_names() {
        assert_eq!(Rgba8::parse("#ff0000").unwrap(), Rgba8::rgb(255, 0, 0));
        assert_eq!(
            Rgba8::parse("#0000FF80").unwrap(),
            Rgba8::rgba(0, 0, 255, 128)
        );
        assert_eq!(Rgba8::parse("Transparent").unwrap(), Rgba8::TRANSPARENT);
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in [
            "",
            "rgb(1,2)",
            "rgb(256, 0, 0)",
            "rgb(1, 2, 3",
            "rgba(1, 2, 3)",
            "#12345",
            "#gg0000",
            "chartreuse",
        ] {
            let err = Rgba8::parse(bad).unwrap_err();
            assert!(
                err.to_string().contains("invalid color"),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for c in [Rgba8::rgb(9, 8, 7), Rgba8::rgba(9, 8, 7, 6)] {
            assert_eq!(Rgba8::parse(&c.to_string()).unwrap(), c);
        }
    }

    #[test]
    fn premul_scales_channels_by_alpha() {
        assert_eq!(Rgba8::rgba(255, 100, 0, 128).to_premul_array(), [128, 50, 0, 128]);
        assert_eq!(Rgba8::WHITE.to_premul_array(), [255, 255, 255, 255]);
    }
}
