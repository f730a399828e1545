use std::fmt;

use serde::{Deserialize, Serialize};

/// 24-bit RGB color, authored as `"#rrggbb"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const CYAN: Color = Color(0x00e0ff);
    pub const STAR_BLUE: Color = Color(0x7a8bff);
    pub const DEEP_SPACE: Color = Color(0x05060f);

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `0xrrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let hex = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(Color),
            3 => {
                let short = u32::from_str_radix(hex, 16).ok()?;
                let r = (short >> 8) & 0xf;
                let g = (short >> 4) & 0xf;
                let b = short & 0xf;
                Some(Color((r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11))
            }
            _ => None,
        }
    }

    /// Linear-ish `[r, g, b]` in 0..=1 for a renderer.
    pub fn to_rgb(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xff) as f32 / 255.0,
            ((self.0 >> 8) & 0xff) as f32 / 255.0,
            (self.0 & 0xff) as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::DEEP_SPACE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xff_ffff)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("not a hex color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}
