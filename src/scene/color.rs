use serde::{Deserialize, Serialize};

/// RGB color with components in `[0, 1]`, stored in sRGB space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Build from linear components, as glTF stores factors.
    pub fn from_linear(rgb: [f32; 3]) -> Self {
        Self {
            r: linear_to_srgb(rgb[0]),
            g: linear_to_srgb(rgb[1]),
            b: linear_to_srgb(rgb[2]),
        }
    }

    /// Hue wraps into `[0, 1)`; saturation and lightness are clamped.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::rgb(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self {
            r: hue_to_rgb(q, p, h + 1.0 / 3.0),
            g: hue_to_rgb(q, p, h),
            b: hue_to_rgb(q, p, h - 1.0 / 3.0),
        }
    }

    /// Returns `(h, s, l)` with every component in `[0, 1]`.
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;

        if (max - min).abs() <= f32::EPSILON {
            return (0.0, 0.0, lightness);
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };

        (hue / 6.0, saturation, lightness)
    }

    pub fn to_linear(&self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_green_round_trips_through_rgb() {
        let color = Color::from_hsl(1.0 / 3.0, 0.7, 0.5);
        assert!((color.r - 0.15).abs() < 1e-5);
        assert!((color.g - 0.85).abs() < 1e-5);
        assert!((color.b - 0.15).abs() < 1e-5);

        let (h, s, l) = color.to_hsl();
        assert!((h - 1.0 / 3.0).abs() < 1e-5);
        assert!((s - 0.7).abs() < 1e-5);
        assert!((l - 0.5).abs() < 1e-5);
    }

    #[test]
    fn hue_of_one_wraps_to_red() {
        let red = Color::from_hsl(1.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-6);
        assert!(red.g.abs() < 1e-6 && red.b.abs() < 1e-6);
    }

    #[test]
    fn hex_decodes_channels() {
        let c = Color::from_hex(0x88aaff);
        assert!((c.r - 136.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 170.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
    }
}
