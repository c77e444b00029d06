//! Pixel formats and their channel naming.
//!
//! A [`PixelFormat`] fixes the number of channels per pixel (the buffer
//! stride) and the letter aliases a program may use for them. Every format
//! also answers to the positional names `c1`..`c4`.
//!
//! # Usage
//!
//! ```rust
//! use pbx_core::PixelFormat;
//!
//! let fmt: PixelFormat = "CIE LCH(ab) alpha double".parse().unwrap();
//! assert_eq!(fmt, PixelFormat::Lcha);
//! assert_eq!(fmt.channels(), 4);
//! assert_eq!(fmt.channel_index("c"), Some(1));
//! assert_eq!(PixelFormat::positional_index("c3"), Some(2));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Highest positional channel name (`c4`).
pub const MAX_CHANNELS: usize = 4;

/// Channel layout of a pixel buffer.
///
/// All layouts store 64-bit floats; only the channel count and naming
/// differ between variants.
///
/// # Variants
///
/// Four channels:
/// - `Rgba`, `Hsla`, `Xyza`, `Laba`, `Lcha`, `Raw4`
///
/// Three channels:
/// - `Rgb`, `Hsl`, `Lab`, `Lch`, `Raw3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// Red, green, blue, alpha.
    #[default]
    Rgba,
    /// Red, green, blue.
    Rgb,
    /// Hue, saturation, lightness, alpha.
    Hsla,
    /// Hue, saturation, lightness.
    Hsl,
    /// CIE XYZ with alpha.
    Xyza,
    /// CIE L*a*b* with alpha.
    Laba,
    /// CIE L*a*b*.
    Lab,
    /// CIE LCH(ab) with alpha.
    Lcha,
    /// CIE LCH(ab).
    Lch,
    /// Three unnamed channels, positional names only.
    Raw3,
    /// Four unnamed channels, positional names only.
    Raw4,
}

impl PixelFormat {
    /// Every supported format, in listing order.
    pub const ALL: [PixelFormat; 11] = [
        Self::Rgba,
        Self::Rgb,
        Self::Hsla,
        Self::Hsl,
        Self::Xyza,
        Self::Laba,
        Self::Lab,
        Self::Lcha,
        Self::Lch,
        Self::Raw3,
        Self::Raw4,
    ];

    /// Number of channels per pixel; equals the buffer stride.
    #[inline]
    pub const fn channels(&self) -> usize {
        self.aliases().len()
    }

    /// Letter aliases in channel order.
    ///
    /// Raw formats have no letters; their slots are placeholders and never
    /// match an identifier.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Rgba => &["r", "g", "b", "a"],
            Self::Rgb => &["r", "g", "b"],
            Self::Hsla => &["h", "s", "l", "a"],
            Self::Hsl => &["h", "s", "l"],
            Self::Xyza => &["x", "y", "z", "a"],
            Self::Laba => &["l", "a", "b", "a"],
            Self::Lab => &["l", "a", "b"],
            Self::Lcha => &["l", "c", "h", "a"],
            Self::Lch => &["l", "c", "h"],
            Self::Raw3 => &["", "", ""],
            Self::Raw4 => &["", "", "", ""],
        }
    }

    /// Whether the format carries named channels.
    #[inline]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw3 | Self::Raw4)
    }

    /// Short lowercase name, as accepted by [`FromStr`].
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rgba => "rgba",
            Self::Rgb => "rgb",
            Self::Hsla => "hsla",
            Self::Hsl => "hsl",
            Self::Xyza => "xyza",
            Self::Laba => "laba",
            Self::Lab => "lab",
            Self::Lcha => "lcha",
            Self::Lch => "lch",
            Self::Raw3 => "raw3",
            Self::Raw4 => "raw4",
        }
    }

    /// Name of the equivalent babl format used by the image host.
    pub const fn host_name(&self) -> Option<&'static str> {
        match self {
            Self::Rgba => Some("RGBA double"),
            Self::Rgb => Some("RGB double"),
            Self::Hsla => Some("HSLA double"),
            Self::Hsl => Some("HSL double"),
            Self::Xyza => Some("CIE XYZ alpha double"),
            Self::Laba => Some("CIE Lab alpha double"),
            Self::Lab => Some("CIE Lab double"),
            Self::Lcha => Some("CIE LCH(ab) alpha double"),
            Self::Lch => Some("CIE LCH(ab) double"),
            Self::Raw3 | Self::Raw4 => None,
        }
    }

    /// Resolves a letter alias to its channel index.
    ///
    /// The first matching letter wins, so in [`PixelFormat::Laba`] the name
    /// `a` is the a* channel and alpha is reachable only as `c4`.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.aliases().iter().position(|alias| *alias == name)
    }

    /// Resolves a positional name (`c1`..`c4`) to a zero-based index.
    ///
    /// The result does not depend on the format; callers check it against
    /// [`PixelFormat::channels`].
    pub fn positional_index(name: &str) -> Option<usize> {
        let digits = name.strip_prefix('c')?;
        let n: usize = match digits {
            "1" => 1,
            "2" => 2,
            "3" => 3,
            "4" => 4,
            _ => return None,
        };
        Some(n - 1)
    }

    /// Fails with [`Error::ChannelMismatch`] unless `stride` equals the
    /// channel count.
    pub fn check_stride(&self, stride: usize) -> crate::Result<()> {
        if stride != self.channels() {
            return Err(Error::channel_mismatch(self.channels(), stride));
        }
        Ok(())
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let trimmed = s.trim();
        if let Some(fmt) = Self::ALL
            .iter()
            .find(|f| f.host_name().is_some_and(|h| h.eq_ignore_ascii_case(trimmed)))
        {
            return Ok(*fmt);
        }

        let lower = trimmed.to_ascii_lowercase();
        let fmt = match lower.as_str() {
            "rgba" => Self::Rgba,
            "rgb" => Self::Rgb,
            "hsla" => Self::Hsla,
            "hsl" => Self::Hsl,
            "xyza" => Self::Xyza,
            "laba" | "lab+a" => Self::Laba,
            "lab" => Self::Lab,
            "lcha" | "lch(ab)a" | "lch(ab)" => Self::Lcha,
            "lch" => Self::Lch,
            "raw3" => Self::Raw3,
            "raw" | "raw4" => Self::Raw4,
            _ => return Err(Error::unsupported_format(trimmed)),
        };
        Ok(fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_counts() {
        assert_eq!(PixelFormat::Rgba.channels(), 4);
        assert_eq!(PixelFormat::Lch.channels(), 3);
        assert_eq!(PixelFormat::Raw3.channels(), 3);
        for fmt in PixelFormat::ALL {
            assert!((3..=MAX_CHANNELS).contains(&fmt.channels()), "{fmt}");
        }
    }

    #[test]
    fn test_letter_aliases() {
        assert_eq!(PixelFormat::Rgba.channel_index("b"), Some(2));
        assert_eq!(PixelFormat::Lcha.channel_index("l"), Some(0));
        assert_eq!(PixelFormat::Lcha.channel_index("r"), None);
        assert_eq!(PixelFormat::Hsla.channel_index("a"), Some(3));
    }

    #[test]
    fn test_lab_alpha_first_match() {
        assert_eq!(PixelFormat::Laba.channel_index("a"), Some(1));
    }

    #[test]
    fn test_raw_has_no_letters() {
        assert_eq!(PixelFormat::Raw4.channel_index(""), None);
        assert_eq!(PixelFormat::Raw4.channel_index("r"), None);
        assert!(PixelFormat::Raw4.is_raw());
    }

    #[test]
    fn test_positional() {
        assert_eq!(PixelFormat::positional_index("c1"), Some(0));
        assert_eq!(PixelFormat::positional_index("c4"), Some(3));
        assert_eq!(PixelFormat::positional_index("c5"), None);
        assert_eq!(PixelFormat::positional_index("c"), None);
        assert_eq!(PixelFormat::positional_index("c01"), None);
    }

    #[test]
    fn test_parse_short_and_host_names() {
        assert_eq!("RGBA".parse::<PixelFormat>().unwrap(), PixelFormat::Rgba);
        assert_eq!("lch(ab)".parse::<PixelFormat>().unwrap(), PixelFormat::Lcha);
        assert_eq!(
            "CIE Lab alpha double".parse::<PixelFormat>().unwrap(),
            PixelFormat::Laba
        );
        assert_eq!("raw".parse::<PixelFormat>().unwrap(), PixelFormat::Raw4);
        assert!("cmyk".parse::<PixelFormat>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for fmt in PixelFormat::ALL {
            assert_eq!(fmt.to_string().parse::<PixelFormat>().unwrap(), fmt);
        }
    }

    #[test]
    fn test_check_stride() {
        assert!(PixelFormat::Rgba.check_stride(4).is_ok());
        assert_eq!(
            PixelFormat::Rgb.check_stride(4),
            Err(Error::channel_mismatch(3, 4))
        );
    }
}
