use crate::foundation::error::{CoverError, CoverResult};

pub use kurbo::{BezPath, Point, Rect};

/// Output surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas size as `u16` pairs, the range the CPU rasterizer accepts.
    pub fn as_u16(self) -> CoverResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| CoverError::validation("canvas width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| CoverError::validation("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(CoverError::validation("canvas must be non-empty"));
        }
        Ok((w, h))
    }
}

/// Straight (non-premultiplied) RGBA8 color. Also used as the Parley text brush.
///
/// Deserializes from `"#rrggbb"`, `"#rrggbbaa"` or `{ "r", "g", "b", "a"? }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from red, green and blue channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> CoverResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let channel = |i: usize| -> CoverResult<u8> {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| CoverError::validation(format!("invalid hex color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => Err(CoverError::validation(format!("invalid hex color '{s}'"))),
        }
    }

    /// Premultiplied byte quadruple suitable for direct pixmap writes.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { ((u16::from(c) * a + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "opaque")]
        a: u8,
    },
}

fn opaque() -> u8 {
    255
}

impl TryFrom<ColorRepr> for Rgba8 {
    type Error = CoverError;

    fn try_from(repr: ColorRepr) -> CoverResult<Self> {
        match repr {
            ColorRepr::Hex(s) => Self::from_hex(&s),
            ColorRepr::Channels { r, g, b, a } => Ok(Self { r, g, b, a }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
