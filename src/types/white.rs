//! White LED channel control.

use serde::{Deserialize, Serialize};

/// Intensity of the cool or warm white LED channel, from 0 to 255.
///
/// Some Wiz bulbs have separate cool and warm white LED channels that can be
/// controlled independently of the RGB LEDs.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct White {
    pub(crate) value: u8,
}

impl White {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 255;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns `None` if value is outside the valid range (0-255).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::White;
    ///
    /// assert!(White::create(0).is_some());
    /// assert!(White::create(255).is_some());
    /// assert!(White::create(256).is_none());
    /// ```
    pub fn create(value: i64) -> Option<Self> {
        u8::try_from(value).ok().map(|value| White { value })
    }
}
