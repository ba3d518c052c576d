//! Color types used by the drawing surface.
//!
//! Provides `Srgb` (opaque channels), `Rgba` (sRGB plus straight alpha), and
//! `Hsla` (CSS-style hue/saturation/lightness, which is how star and nebula
//! colors are authored). All conversions are pure functions.

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// sRGB color with straight (non-premultiplied) alpha, all components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Hue in degrees, saturation and lightness in percent, alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f64,
    pub s: f64,
    pub l: f64,
    pub a: f64,
}

impl Srgb {
    /// Builds a color from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Srgb {
        Srgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Attaches an alpha value, clamped to [0, 1].
    pub fn with_alpha(self, a: f64) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: clamp_unit(a),
        }
    }
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Builds a color from 8-bit channels and an alpha in [0, 1].
    pub fn from_u8(r: u8, g: u8, b: u8, a: f64) -> Rgba {
        Srgb::from_u8(r, g, b).with_alpha(a)
    }

    /// Returns the opaque color channels.
    pub fn rgb(self) -> Srgb {
        Srgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Returns this color with its alpha replaced.
    pub fn with_alpha(self, a: f64) -> Rgba {
        self.rgb().with_alpha(a)
    }

    /// Linear interpolation of all four channels, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = clamp_unit(t);
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Formats as a CSS color, e.g. `rgba(255,255,245,0.12)`.
    pub fn to_css(self) -> String {
        let [r, g, b] = [self.r, self.g, self.b].map(channel_u8);
        let a = clamp_unit(self.a);
        format!("rgba({r},{g},{b},{a})")
    }
}

impl Hsla {
    /// Creates a color; saturation and lightness are clamped to [0, 100].
    pub fn new(h: f64, s: f64, l: f64, a: f64) -> Hsla {
        Hsla {
            h,
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
            a: clamp_unit(a),
        }
    }

    /// Converts to sRGB with alpha.
    pub fn to_rgba(self) -> Rgba {
        hsl_to_srgb(self.h, self.s / 100.0, self.l / 100.0).with_alpha(self.a)
    }
}

impl From<Hsla> for Rgba {
    fn from(c: Hsla) -> Rgba {
        c.to_rgba()
    }
}

/// Converts hue (degrees, any range) and saturation/lightness in [0, 1] to sRGB.
///
/// Uses the CSS Color 4 `hsl()` formula.
pub fn hsl_to_srgb(h: f64, s: f64, l: f64) -> Srgb {
    let h = h.rem_euclid(360.0);
    let s = clamp_unit(s);
    let l = clamp_unit(l);
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let a = s * l.min(1.0 - l);
        l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    Srgb {
        r: channel(0.0),
        g: channel(8.0),
        b: channel(4.0),
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn channel_u8(v: f64) -> u8 {
    (clamp_unit(v) * 255.0).round() as u8
}
