//! Range-checked value types for the fields of a light state request.

mod brightness;
mod color;
mod hue_saturation;
mod kelvin;
mod ratio;
mod speed;
mod white;

pub use brightness::Brightness;
pub use color::{Color, ColorRGBW, ColorRGBWW};
pub use hue_saturation::HueSaturation;
pub use kelvin::Kelvin;
pub use ratio::Ratio;
pub use speed::Speed;
pub use white::White;
