//! The seam between request handling and the network.
//!
//! [`crate::BulbCommandDispatcher`] only talks to bulbs through these traits;
//! [`WizTransport`] is the UDP implementation used in production.

use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::config::TransportConfig;
use crate::discovery::{DiscoveredBulb, discover_bulbs};
use crate::errors::Error;
use crate::light::Light;
use crate::payload::Payload;
use crate::status::RawDeviceState;

type Result<T> = std::result::Result<T, Error>;

/// Finds bulbs and opens handles to them.
pub trait Transport: Send + Sync {
    type Device: DeviceHandle;

    /// Broadcast-discover bulbs on the segment of `broadcast`.
    fn discover(
        &self,
        broadcast: Ipv4Addr,
    ) -> impl Future<Output = Result<Vec<DiscoveredBulb>>> + Send;

    /// Get a handle for the bulb at `ip`. No traffic is sent yet.
    fn open(&self, ip: Ipv4Addr) -> Self::Device;
}

/// A handle to one bulb.
pub trait DeviceHandle: Send + Sync {
    /// Ask the bulb for a full state refresh.
    fn read_state(&self) -> impl Future<Output = Result<RawDeviceState>> + Send;

    /// Send a lighting command.
    fn send_command(&self, payload: &Payload) -> impl Future<Output = Result<()>> + Send;
}

/// Wiz UDP transport.
#[derive(Debug, Clone, Default)]
pub struct WizTransport {
    config: Arc<TransportConfig>,
}

impl WizTransport {
    pub fn new(config: TransportConfig) -> Self {
        WizTransport {
            config: Arc::new(config),
        }
    }
}

impl Transport for WizTransport {
    type Device = Light;

    async fn discover(&self, broadcast: Ipv4Addr) -> Result<Vec<DiscoveredBulb>> {
        discover_bulbs(broadcast, &self.config).await
    }

    fn open(&self, ip: Ipv4Addr) -> Light {
        Light::new(ip, Arc::clone(&self.config))
    }
}

impl DeviceHandle for Light {
    async fn read_state(&self) -> Result<RawDeviceState> {
        self.get_pilot().await
    }

    async fn send_command(&self, payload: &Payload) -> Result<()> {
        self.set_pilot(payload).await
    }
}
