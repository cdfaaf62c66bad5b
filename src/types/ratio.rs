//! Ratio control for dual-head fixtures.

use serde::{Deserialize, Serialize};

/// Balance between the up and down light of a dual-head fixture, 0 to 100.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub(crate) value: u8,
}

impl Ratio {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;

    pub fn value(&self) -> u8 {
        self.value
    }

    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Ratio;
    ///
    /// assert!(Ratio::create(0).is_some());
    /// assert!(Ratio::create(100).is_some());
    /// assert!(Ratio::create(101).is_none());
    /// assert!(Ratio::create(-5).is_none());
    /// ```
    pub fn create(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Ratio { value: value as u8 })
        } else {
            None
        }
    }
}
