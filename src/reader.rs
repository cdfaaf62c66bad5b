//! Reading a bulb's state into the fixed record returned to callers.

use log::debug;
use serde::Serialize;

use crate::address::parse_ipv4;
use crate::errors::Error;
use crate::status::RawDeviceState;
use crate::transport::{DeviceHandle, Transport};

type Result<T> = std::result::Result<T, Error>;

/// Lighting state of a bulb with a fixed set of keys.
///
/// Every key is always serialized; values a bulb did not report are `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedBulbState {
    pub state: bool,
    pub source: Option<String>,
    pub mac: Option<String>,
    pub power: Option<f64>,
    pub warm_white: Option<u8>,
    pub white_range: Option<Vec<f32>>,
    pub extended_white_range: Option<Vec<f32>>,
    pub speed: Option<u8>,
    pub ratio: Option<u8>,
    pub scene_id: Option<i64>,
    pub scene: Option<&'static str>,
    pub cold_white: Option<u8>,
    pub rgb: Option<[u8; 3]>,
    pub rgbw: Option<[u8; 4]>,
    pub rgbww: Option<[u8; 5]>,
    pub brightness: Option<u8>,
    pub color_temp: Option<u16>,
}

impl From<&RawDeviceState> for NormalizedBulbState {
    fn from(raw: &RawDeviceState) -> Self {
        NormalizedBulbState {
            state: raw.state(),
            source: raw.source().map(String::from),
            mac: raw.mac().map(String::from),
            power: raw.power(),
            warm_white: raw.warm_white(),
            white_range: raw.white_range().map(<[f32]>::to_vec),
            extended_white_range: raw.extended_white_range().map(<[f32]>::to_vec),
            speed: raw.speed(),
            ratio: raw.ratio(),
            scene_id: raw.scene_id(),
            scene: raw.scene(),
            cold_white: raw.cold_white(),
            rgb: raw.rgb(),
            rgbw: raw.rgbw(),
            rgbww: raw.rgbww(),
            brightness: raw.brightness(),
            color_temp: raw.color_temp(),
        }
    }
}

/// Read the bulb at `ip` and normalize its state.
///
/// An invalid address fails before the transport is touched. Transport
/// failures are returned as-is.
pub async fn read_state<T: Transport>(transport: &T, ip: &str) -> Result<NormalizedBulbState> {
    let addr = parse_ipv4(ip).ok_or_else(|| Error::InvalidAddress(ip.to_string()))?;
    let raw = transport.open(addr).read_state().await?;
    debug!("{addr} state: {raw:?}");
    Ok(NormalizedBulbState::from(&raw))
}
