//! Animation speed for dynamic scenes.

use serde::{Deserialize, Serialize};

/// Animation speed for dynamic scenes, accepted from 0 to 100.
///
/// Speed only affects scenes with animation (like Party, Ocean, etc.).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Speed {
    pub(crate) value: u8,
}

impl Speed {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;

    /// Get the speed value.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Create a new Speed with the given value.
    ///
    /// Returns `None` if value is outside the valid range (0-100).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Speed;
    ///
    /// assert!(Speed::create(-1).is_none());
    /// assert_eq!(Speed::create(0).unwrap().value(), 0);
    /// assert_eq!(Speed::create(100).unwrap().value(), 100);
    /// assert!(Speed::create(101).is_none());
    /// ```
    pub fn create(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Speed { value: value as u8 })
        } else {
            None
        }
    }
}
