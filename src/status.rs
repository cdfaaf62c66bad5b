//! Bulb state as reported by `getPilot`.

use serde::{Deserialize, Serialize};

use crate::scenes;
use crate::types::Brightness;

/// Full `getPilot` reply envelope.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct PilotReply {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub env: Option<String>,
    pub result: RawDeviceState,
}

/// Raw lighting state of one bulb, exactly as the bulb reported it.
///
/// Built fresh for each query. Accessors expose the device's fields; only
/// [`RawDeviceState::brightness`] converts units (percent to 0-255).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawDeviceState {
    #[serde(default)]
    pub(crate) state: bool,
    #[serde(default)]
    pub(crate) src: Option<String>,
    #[serde(default)]
    pub(crate) mac: Option<String>,
    #[serde(default)]
    pub(crate) pc: Option<f64>,
    #[serde(default, rename = "r")]
    pub(crate) red: Option<u8>,
    #[serde(default, rename = "g")]
    pub(crate) green: Option<u8>,
    #[serde(default, rename = "b")]
    pub(crate) blue: Option<u8>,
    #[serde(default, rename = "c")]
    pub(crate) cool: Option<u8>,
    #[serde(default, rename = "w")]
    pub(crate) warm: Option<u8>,
    #[serde(default)]
    pub(crate) dimming: Option<u8>,
    #[serde(default)]
    pub(crate) temp: Option<u16>,
    #[serde(default)]
    pub(crate) speed: Option<u8>,
    #[serde(default)]
    pub(crate) ratio: Option<u8>,
    #[serde(default)]
    pub(crate) scene_id: Option<i64>,
    #[serde(default)]
    pub(crate) white_range: Option<Vec<f32>>,
    #[serde(default)]
    pub(crate) ext_range: Option<Vec<f32>>,
}

impl RawDeviceState {
    /// Whether the bulb is emitting light.
    pub fn state(&self) -> bool {
        self.state
    }

    /// What last changed the state (`"udp"`, `"hb"`, ...).
    pub fn source(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Power draw as reported by bulbs with metering.
    pub fn power(&self) -> Option<f64> {
        self.pc
    }

    pub fn warm_white(&self) -> Option<u8> {
        self.warm
    }

    pub fn cold_white(&self) -> Option<u8> {
        self.cool
    }

    pub fn white_range(&self) -> Option<&[f32]> {
        self.white_range.as_deref()
    }

    pub fn extended_white_range(&self) -> Option<&[f32]> {
        self.ext_range.as_deref()
    }

    pub fn speed(&self) -> Option<u8> {
        self.speed
    }

    pub fn ratio(&self) -> Option<u8> {
        self.ratio
    }

    pub fn scene_id(&self) -> Option<i64> {
        self.scene_id
    }

    /// Catalog name of the active scene, if any.
    pub fn scene(&self) -> Option<&'static str> {
        self.scene_id
            .and_then(scenes::scene_by_id)
            .map(|scene| scene.name)
    }

    pub fn rgb(&self) -> Option<[u8; 3]> {
        match (self.red, self.green, self.blue) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        }
    }

    pub fn rgbw(&self) -> Option<[u8; 4]> {
        let [r, g, b] = self.rgb()?;
        Some([r, g, b, self.warm?])
    }

    pub fn rgbww(&self) -> Option<[u8; 5]> {
        let [r, g, b] = self.rgb()?;
        Some([r, g, b, self.cool?, self.warm?])
    }

    /// Brightness on the 0-255 scale.
    pub fn brightness(&self) -> Option<u8> {
        self.dimming.map(|p| Brightness::from_percent(p).value())
    }

    pub fn color_temp(&self) -> Option<u16> {
        self.temp
    }
}
