//! `setPilot` parameters sent to Wiz lights.

use serde::{Deserialize, Serialize};

use crate::state_model::ValidatedState;
use crate::types::{
    Brightness, Color, ColorRGBW, ColorRGBWW, HueSaturation, Kelvin, Ratio, Speed, White,
};

/// A lighting command to send to a bulb.
///
/// Several attributes can be combined; they are applied by the bulb in a
/// single `setPilot` call. Attributes that share channels (`rgb`, `rgbw`,
/// `hucolor`, ...) overwrite each other in the order they are set.
///
/// # Examples
///
/// ```
/// use wizlights_mcp::{Brightness, Color, Payload};
///
/// let mut payload = Payload::new();
/// payload.brightness(&Brightness::create(255).unwrap());
/// payload.color(&Color::rgb(255, 128, 0));
/// assert!(payload.is_valid());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payload {
    pub(crate) state: Option<bool>,
    #[serde(rename = "sceneId")]
    pub(crate) scene: Option<i64>,
    pub(crate) dimming: Option<u8>,
    pub(crate) speed: Option<u8>,
    pub(crate) temp: Option<u16>,
    pub(crate) ratio: Option<u8>,
    #[serde(rename = "r")]
    pub(crate) red: Option<u8>,
    #[serde(rename = "g")]
    pub(crate) green: Option<u8>,
    #[serde(rename = "b")]
    pub(crate) blue: Option<u8>,
    #[serde(rename = "c")]
    pub(crate) cool: Option<u8>,
    #[serde(rename = "w")]
    pub(crate) warm: Option<u8>,
}

impl Payload {
    /// Create a new empty payload.
    ///
    /// At least one attribute must be set for the payload to be valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::Payload;
    ///
    /// let payload = Payload::new();
    /// assert_eq!(payload.is_valid(), false);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this payload contains at least one attribute a bulb acts on.
    ///
    /// Speed or ratio alone are not enough.
    pub fn is_valid(&self) -> bool {
        self.state.is_some()
            || self.scene.is_some()
            || self.dimming.is_some()
            || self.temp.is_some()
            || (self.red.is_some() && self.green.is_some() && self.blue.is_some())
            || self.cool.is_some()
            || self.warm.is_some()
    }

    /// Turn the light on or off.
    pub fn power(&mut self, on: bool) {
        self.state = Some(on);
    }

    /// Select a scene by id.
    pub fn scene(&mut self, scene_id: i64) {
        self.scene = Some(scene_id);
    }

    /// Set the brightness; sent as a dimming percent.
    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dimming = Some(brightness.percent());
    }

    /// Set the animation speed of the active scene.
    pub fn speed(&mut self, speed: &Speed) {
        self.speed = Some(speed.value);
    }

    /// Set the color temperature.
    pub fn temp(&mut self, temp: &Kelvin) {
        self.temp = Some(temp.kelvin);
    }

    /// Set the RGB color.
    pub fn color(&mut self, color: &Color) {
        let [red, green, blue] = color.channels();
        self.red = Some(red);
        self.green = Some(green);
        self.blue = Some(blue);
    }

    /// Set the RGBW color (RGB + warm white).
    pub fn color_rgbw(&mut self, color: &ColorRGBW) {
        self.red = Some(color.red);
        self.green = Some(color.green);
        self.blue = Some(color.blue);
        self.warm = Some(color.warm);
    }

    /// Set the RGBWW color (RGB + cool white + warm white).
    pub fn color_rgbww(&mut self, color: &ColorRGBWW) {
        self.red = Some(color.red);
        self.green = Some(color.green);
        self.blue = Some(color.blue);
        self.cool = Some(color.cool);
        self.warm = Some(color.warm);
    }

    /// Set the color using hue and saturation.
    pub fn hue_saturation(&mut self, hs: &HueSaturation) {
        self.color(&hs.to_color());
    }

    /// Set the cool white intensity.
    pub fn cool(&mut self, cool: &White) {
        self.cool = Some(cool.value);
    }

    /// Set the warm white intensity.
    pub fn warm(&mut self, warm: &White) {
        self.warm = Some(warm.value);
    }

    /// Set the ratio for dual-head fixtures.
    pub fn ratio(&mut self, ratio: &Ratio) {
        self.ratio = Some(ratio.value);
    }
}

impl From<&ValidatedState> for Payload {
    fn from(state: &ValidatedState) -> Self {
        let mut p = Payload::new();
        if let Some(warm) = &state.warm_white {
            p.warm(warm);
        }
        if let Some(cool) = &state.cold_white {
            p.cool(cool);
        }
        if let Some(speed) = &state.speed {
            p.speed(speed);
        }
        if let Some(scene) = state.scene {
            p.scene(scene);
        }
        if let Some(color) = &state.rgb {
            p.color(color);
        }
        if let Some(color) = &state.rgbw {
            p.color_rgbw(color);
        }
        if let Some(color) = &state.rgbww {
            p.color_rgbww(color);
        }
        if let Some(hs) = &state.hucolor {
            p.hue_saturation(hs);
        }
        if let Some(brightness) = &state.brightness {
            p.brightness(brightness);
        }
        if let Some(temp) = &state.colortemp {
            p.temp(temp);
        }
        if let Some(ratio) = &state.ratio {
            p.ratio(ratio);
        }
        p.power(state.power);
        p
    }
}
