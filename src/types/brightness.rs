//! Brightness control for Wiz lights.

use serde::{Deserialize, Serialize};

/// Brightness level on the 0-255 scale used by callers.
///
/// Bulbs themselves dim in percent (10-100); [`Brightness::percent`] and
/// [`Brightness::from_percent`] convert between the two.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 255;
    const MIN_PERCENT: u8 = 10;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (0-255).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Brightness;
    ///
    /// assert!(Brightness::create(-1).is_none());
    /// assert_eq!(Brightness::create(128).unwrap().value(), 128);
    /// assert!(Brightness::create(256).is_none());
    /// ```
    pub fn create(value: i64) -> Option<Self> {
        u8::try_from(value).ok().map(|value| Brightness { value })
    }

    /// Dimming percent sent to the bulb; never below 10.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Brightness;
    ///
    /// assert_eq!(Brightness::create(255).unwrap().percent(), 100);
    /// assert_eq!(Brightness::create(128).unwrap().percent(), 50);
    /// assert_eq!(Brightness::create(0).unwrap().percent(), 10);
    /// ```
    pub fn percent(&self) -> u8 {
        let percent = (f32::from(self.value) * 100.0 / 255.0).round() as u8;
        percent.max(Self::MIN_PERCENT)
    }

    /// Convert a dimming percent reported by a bulb back to the 0-255 scale.
    pub fn from_percent(percent: u8) -> Self {
        let value = (f32::from(percent.min(100)) * 255.0 / 100.0).round() as u8;
        Brightness { value }
    }
}
