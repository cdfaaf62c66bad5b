//! Hue and Saturation color representation.

use super::Color;

/// Hue and Saturation color representation.
///
/// - Hue: the color angle on the color wheel in degrees; wraps around 360
/// - Saturation: the intensity of the color in percent; clamped to 0-100
///
/// Any pair of finite numbers is accepted; out-of-range components are
/// normalized on conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HueSaturation {
    hue: f64,
    saturation: f64,
}

impl HueSaturation {
    /// Returns `None` unless both components are finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::HueSaturation;
    ///
    /// assert!(HueSaturation::create(0.0, 100.0).is_some());
    /// assert!(HueSaturation::create(400.0, -3.0).is_some());
    /// assert!(HueSaturation::create(f64::NAN, 50.0).is_none());
    /// ```
    pub fn create(hue: f64, saturation: f64) -> Option<Self> {
        (hue.is_finite() && saturation.is_finite()).then_some(HueSaturation { hue, saturation })
    }

    /// Convert to RGB Color.
    ///
    /// Uses HSV to RGB conversion with Value fixed at 255 (max brightness).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::HueSaturation;
    ///
    /// let color = HueSaturation::create(0.0, 100.0).unwrap().to_color();
    /// assert_eq!(color.channels(), [255, 0, 0]);
    ///
    /// let color = HueSaturation::create(480.0, 100.0).unwrap().to_color();
    /// assert_eq!(color.channels(), [0, 255, 0]);
    /// ```
    pub fn to_color(&self) -> Color {
        let h = self.hue.rem_euclid(360.0);
        let s = self.saturation.clamp(0.0, 100.0) / 100.0;
        let v = 1.0;

        if s == 0.0 {
            return Color::rgb(255, 255, 255);
        }

        let h = h / 60.0;
        let i = h.floor() as i32;
        let f = h - f64::from(i);
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Color {
            red: r * 255.0,
            green: g * 255.0,
            blue: b * 255.0,
        }
    }
}

impl From<&HueSaturation> for Color {
    fn from(hs: &HueSaturation) -> Self {
        hs.to_color()
    }
}
