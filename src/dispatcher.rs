//! The externally invokable bulb operations.

use std::net::Ipv4Addr;

use log::{debug, info};
use serde_json::Value;

use crate::address::parse_ipv4;
use crate::discovery::DiscoveredBulb;
use crate::errors::{Error, ErrorKind};
use crate::payload::Payload;
use crate::reader::{NormalizedBulbState, read_state};
use crate::scenes::{self, Scene};
use crate::state_model::validate_state;
use crate::transport::{DeviceHandle, Transport};

type Result<T> = std::result::Result<T, Error>;

/// Validates requests, turns them into bulb commands, and reads back the result.
///
/// Every operation checks its inputs before the transport is touched. No
/// operation retries; a transport failure is returned immediately.
#[derive(Debug, Clone, Default)]
pub struct BulbCommandDispatcher<T> {
    transport: T,
}

impl<T: Transport> BulbCommandDispatcher<T> {
    pub fn new(transport: T) -> Self {
        BulbCommandDispatcher { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Find the bulbs answering on the broadcast segment `broadcast`.
    pub async fn discover(&self, broadcast: &str) -> Result<Vec<DiscoveredBulb>> {
        let addr =
            parse_ipv4(broadcast).ok_or_else(|| Error::InvalidBroadcast(broadcast.to_string()))?;
        info!("discovering bulbs on {addr}");
        let bulbs = self.transport.discover(addr).await?;
        info!("found {} bulb(s) on {addr}", bulbs.len());
        Ok(bulbs)
    }

    /// Current state of the bulb at `ip`.
    pub async fn get_state(&self, ip: &str) -> Result<NormalizedBulbState> {
        read_state(&self.transport, ip).await
    }

    /// The catalog scene the bulb at `ip` is currently showing.
    pub async fn get_scene(&self, ip: &str) -> Result<Scene> {
        let state = read_state(&self.transport, ip)
            .await
            .map_err(|err| match err {
                Error::InvalidAddress(ip) => Error::UnknownBulb(ip),
                err if err.kind() == ErrorKind::DeviceUnreachable => {
                    Error::NotConnected(Box::new(err))
                }
                err => err,
            })?;
        let scene_id = state.scene_id.unwrap_or_default();
        scenes::scene_by_id(scene_id).ok_or(Error::SceneNotFound(scene_id))
    }

    /// All scenes a bulb can be set to.
    pub fn list_scenes(&self) -> &'static [Scene] {
        scenes::list_scenes()
    }

    /// Apply every field present in `request`, then read the bulb back.
    pub async fn set_state(&self, ip: &str, request: &Value) -> Result<NormalizedBulbState> {
        let addr = self.address(ip)?;
        let state = validate_state(request)?;
        let payload = Payload::from(&state);
        self.apply(addr, &payload).await
    }

    /// Flip the power of the bulb at `ip`, leaving everything else alone.
    pub async fn toggle(&self, ip: &str) -> Result<NormalizedBulbState> {
        let addr = self.address(ip)?;
        let current = self.transport.open(addr).read_state().await?;

        let mut payload = Payload::new();
        payload.power(!current.state());
        self.apply(addr, &payload).await
    }

    /// Switch the bulb at `ip` to the scene called `scene`.
    pub async fn set_scene(&self, ip: &str, scene: Option<&str>) -> Result<NormalizedBulbState> {
        let addr = self.address(ip)?;
        let name = scene.filter(|s| !s.is_empty()).ok_or(Error::SceneNameRequired)?;
        let scene_id =
            scenes::id_by_name(name).ok_or_else(|| Error::UnknownSceneName(name.to_string()))?;

        let mut payload = Payload::new();
        payload.scene(i64::from(scene_id));
        self.apply(addr, &payload).await
    }

    fn address(&self, ip: &str) -> Result<Ipv4Addr> {
        parse_ipv4(ip).ok_or_else(|| Error::InvalidAddress(ip.to_string()))
    }

    async fn apply(&self, addr: Ipv4Addr, payload: &Payload) -> Result<NormalizedBulbState> {
        debug!("{addr} applying {payload:?}");
        self.transport.open(addr).send_command(payload).await?;
        read_state(&self.transport, &addr.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::status::RawDeviceState;
    use crate::transport::fake::FakeTransport;

    const IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

    fn dispatcher(raw: serde_json::Value) -> BulbCommandDispatcher<FakeTransport> {
        let raw: RawDeviceState = serde_json::from_value(raw).unwrap();
        BulbCommandDispatcher::new(FakeTransport::default().with_bulb(IP, raw))
    }

    fn lit() -> BulbCommandDispatcher<FakeTransport> {
        dispatcher(json!({"mac": "a8bb50d46a1c", "state": true, "sceneId": 3, "dimming": 50}))
    }

    #[tokio::test]
    async fn test_discover() {
        let d = lit();
        let bulbs = d.discover("192.168.1.255").await.unwrap();
        assert_eq!(bulbs, vec![DiscoveredBulb { ip: IP, mac: "a8bb50d46a1c".into() }]);

        let err = d.discover("192.168.1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid broadcast space. Please provide a valid IP address."
        );
    }

    #[tokio::test]
    async fn test_get_state_validates_before_opening() {
        let d = lit();
        assert!(d.get_state("999.999.999.999").await.is_err());
        assert!(d.transport().opened().is_empty());

        let state = d.get_state("192.168.1.10").await.unwrap();
        assert!(state.state);
        assert_eq!(state.scene, Some("Sunset"));
    }

    #[tokio::test]
    async fn test_get_scene() {
        let scene = lit().get_scene("192.168.1.10").await.unwrap();
        assert_eq!(scene, Scene { id: 3, name: "Sunset" });

        let err = dispatcher(json!({"state": true, "sceneId": 0}))
            .get_scene("192.168.1.10")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_scene_error_messages() {
        let d = lit();
        let err = d.get_scene("not-an-ip").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid IP address or bulb not found.");
        assert!(d.transport().opened().is_empty());

        let err = d.get_scene("10.9.9.9").await.unwrap_err();
        assert_eq!(err.to_string(), "Bulb was either not found or is not connected.");
        assert_eq!(err.kind(), ErrorKind::DeviceUnreachable);
    }

    #[tokio::test]
    async fn test_set_state_sends_every_present_field() {
        let d = lit();
        let state = d
            .set_state("192.168.1.10", &json!({"rgb": [10, 20, 30], "brightness": 255, "state": "TRUE"}))
            .await
            .unwrap();

        let sent = d.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            serde_json::to_value(&sent[0].1).unwrap(),
            json!({"state": true, "dimming": 100, "r": 10, "g": 20, "b": 30})
        );
        assert_eq!(state.rgb, Some([10, 20, 30]));
        assert_eq!(state.brightness, Some(255));
    }

    #[tokio::test]
    async fn test_set_state_rejects_bad_payload_without_sending() {
        let d = lit();
        let err = d
            .set_state("192.168.1.10", &json!({"brightness": 300}))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid state structure: brightness must be between 0 and 255"
        );
        assert!(d.transport().opened().is_empty());
    }

    #[tokio::test]
    async fn test_set_state_power_off_string() {
        let d = lit();
        let state = d
            .set_state("192.168.1.10", &json!({"state": "off"}))
            .await
            .unwrap();
        assert!(!state.state);
    }

    #[tokio::test]
    async fn test_toggle_flips_only_power() {
        let d = lit();
        let state = d.toggle("192.168.1.10").await.unwrap();

        let sent = d.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(serde_json::to_value(&sent[0].1).unwrap(), json!({"state": false}));
        assert!(!state.state);

        let state = d.toggle("192.168.1.10").await.unwrap();
        assert!(state.state);
    }

    #[tokio::test]
    async fn test_toggle_unreachable() {
        let d = lit();
        let err = d.toggle("10.0.0.1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnreachable);
        assert!(d.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_skips_read_back() {
        let d = lit();

        let err = d
            .set_state("10.0.0.1", &json!({"brightness": 128}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnreachable);

        let err = d.set_scene("10.0.0.1", Some("Ocean")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnreachable);

        let unreachable = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(d.transport().sent().len(), 2);
        assert_eq!(d.transport().opened(), vec![unreachable, unreachable]);
        assert_eq!(d.transport().reads(), 0);
    }

    #[tokio::test]
    async fn test_set_scene() {
        let d = lit();
        let state = d.set_scene("192.168.1.10", Some("Ocean")).await.unwrap();
        assert_eq!(state.scene_id, Some(1));
        assert_eq!(state.scene, Some("Ocean"));

        let sent = d.transport().sent();
        assert_eq!(serde_json::to_value(&sent[0].1).unwrap(), json!({"sceneId": 1}));
    }

    #[tokio::test]
    async fn test_set_scene_rejections_skip_transport() {
        let d = lit();

        let err = d.set_scene("192.168.1.10", Some("unknown-scene-xyz")).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid scene name");

        let err = d.set_scene("192.168.1.10", Some("")).await.unwrap_err();
        assert_eq!(err.to_string(), "Scene name is required.");

        let err = d.set_scene("192.168.1.10", None).await.unwrap_err();
        assert_eq!(err, Error::SceneNameRequired);

        let err = d.set_scene("bulb", Some("Ocean")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(d.transport().opened().is_empty());
    }

    #[test]
    fn test_list_scenes() {
        assert_eq!(lit().list_scenes().len(), 37);
    }
}
