//! RGB, RGBW, and RGBWW color representations.

use serde::{Deserialize, Serialize};

const CHANNEL_MAX: f64 = 255.0;

/// An RGB color. Channels are accepted as fractional values in 0-255 and
/// rounded when sent to a bulb.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Color {
    pub(crate) red: f64,
    pub(crate) green: f64,
    pub(crate) blue: f64,
}

impl Color {
    /// Create a color from whole channel values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: f64::from(red),
            green: f64::from(green),
            blue: f64::from(blue),
        }
    }

    /// Returns `None` if any channel is outside 0-255 or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Color;
    ///
    /// assert!(Color::create(10.0, 20.5, 255.0).is_some());
    /// assert!(Color::create(-1.0, 20.0, 30.0).is_none());
    /// assert!(Color::create(0.0, 0.0, 255.1).is_none());
    /// ```
    pub fn create(red: f64, green: f64, blue: f64) -> Option<Self> {
        [red, green, blue]
            .iter()
            .all(|c| (0.0..=CHANNEL_MAX).contains(c))
            .then_some(Self { red, green, blue })
    }

    /// Channels rounded to whole values.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Color;
    ///
    /// let color = Color::create(10.4, 20.5, 254.6).unwrap();
    /// assert_eq!(color.channels(), [10, 21, 255]);
    /// ```
    pub fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue].map(|c| c.round() as u8)
    }
}

/// An RGBW color (RGB + warm white, 0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ColorRGBW {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub warm: u8,
}

impl ColorRGBW {
    pub fn new(red: u8, green: u8, blue: u8, warm: u8) -> Self {
        Self {
            red,
            green,
            blue,
            warm,
        }
    }

    /// Returns `None` if any channel is outside 0-255.
    pub fn create(red: i64, green: i64, blue: i64, warm: i64) -> Option<Self> {
        Some(Self::new(
            channel(red)?,
            channel(green)?,
            channel(blue)?,
            channel(warm)?,
        ))
    }
}

/// An RGBWW color (RGB + cool white + warm white, 0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ColorRGBWW {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub cool: u8,
    pub warm: u8,
}

impl ColorRGBWW {
    pub fn new(red: u8, green: u8, blue: u8, cool: u8, warm: u8) -> Self {
        Self {
            red,
            green,
            blue,
            cool,
            warm,
        }
    }

    /// Returns `None` if any channel is outside 0-255.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::ColorRGBWW;
    ///
    /// assert!(ColorRGBWW::create(255, 128, 0, 30, 50).is_some());
    /// assert!(ColorRGBWW::create(255, 128, 0, 30, 256).is_none());
    /// ```
    pub fn create(red: i64, green: i64, blue: i64, cool: i64, warm: i64) -> Option<Self> {
        Some(Self::new(
            channel(red)?,
            channel(green)?,
            channel(blue)?,
            channel(cool)?,
            channel(warm)?,
        ))
    }
}

fn channel(value: i64) -> Option<u8> {
    u8::try_from(value).ok()
}
