//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin, accepted from 2000K to 6500K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Kelvin {
    pub const MIN: i64 = 2000;
    pub const MAX: i64 = 6500;

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Create a new Kelvin with the given value.
    ///
    /// Returns `None` if value is outside the valid range (2000-6500).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Kelvin;
    ///
    /// assert!(Kelvin::create(1999).is_none());
    /// assert!(Kelvin::create(2000).is_some());
    /// assert!(Kelvin::create(6500).is_some());
    /// assert!(Kelvin::create(6501).is_none());
    /// ```
    pub fn create(kelvin: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&kelvin) {
            Some(Kelvin {
                kelvin: kelvin as u16,
            })
        } else {
            None
        }
    }
}
