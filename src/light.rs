//! UDP connection to a single bulb.

use std::net::Ipv4Addr;
use std::sync::Arc;

use log::debug;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

use crate::config::TransportConfig;
use crate::errors::Error;
use crate::payload::Payload;
use crate::status::{PilotReply, RawDeviceState};

type Result<T> = std::result::Result<T, Error>;

/// A single Wiz smart light bulb, addressed by IPv4.
///
/// Each request opens a fresh socket; no state is cached between calls.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use std::sync::Arc;
/// use wizlights_mcp::{Light, TransportConfig};
///
/// let light = Light::new(Ipv4Addr::new(192, 168, 1, 100), Arc::new(TransportConfig::default()));
/// assert_eq!(light.ip(), Ipv4Addr::new(192, 168, 1, 100));
/// ```
#[derive(Debug, Clone)]
pub struct Light {
    ip: Ipv4Addr,
    config: Arc<TransportConfig>,
}

impl Light {
    pub fn new(ip: Ipv4Addr, config: Arc<TransportConfig>) -> Self {
        Light { ip, config }
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    /// Queries the bulb for its current state (live network call).
    pub async fn get_pilot(&self) -> Result<RawDeviceState> {
        let resp = self.send_command(&json!({"method": "getPilot", "params": {}})).await?;
        let reply: PilotReply = serde_json::from_value(resp).map_err(Error::JsonLoad)?;
        Ok(reply.result)
    }

    /// Applies lighting settings from a payload.
    pub async fn set_pilot(&self, payload: &Payload) -> Result<()> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }

        let msg = serde_json::to_value(payload).map_err(Error::JsonDump)?;
        let response = self
            .send_command(&json!({
                "method": "setPilot",
                "params": msg,
            }))
            .await?;

        debug!("{} setPilot response: {:?}", self.ip, response);
        Ok(())
    }

    async fn send_command(&self, msg: &Value) -> Result<Value> {
        let msg_str = serde_json::to_string(msg).map_err(Error::JsonDump)?;
        let mut attempt = 0;

        loop {
            match self.send_udp(&msg_str).await {
                Ok(response) => return check_reply(msg, response),
                Err(e) if attempt < self.config.max_retries => {
                    debug!("{} attempt {} failed: {}", self.ip, attempt + 1, e);
                    sleep(self.config.retry_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_udp(&self, msg: &str) -> Result<Value> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .connect((self.ip, self.config.port))
            .await
            .map_err(|e| Error::socket("connect", e))?;

        debug!("{} <- {}", self.ip, msg);
        socket
            .send(msg.as_bytes())
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = [0u8; 4096];

        let bytes = timeout(self.config.request_timeout, socket.recv(&mut buffer))
            .await
            .map_err(|_| {
                Error::socket(
                    "receive",
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "receive timeout"),
                )
            })?
            .map_err(|e| Error::socket("receive", e))?;

        let response = String::from_utf8(buffer[..bytes].to_vec()).map_err(Error::Utf8Decode)?;
        debug!("{} -> {}", self.ip, response);
        serde_json::from_str(&response).map_err(Error::JsonLoad)
    }
}

/// Turn an `{"error": {...}}` reply into [`Error::DeviceReply`].
fn check_reply(request: &Value, response: Value) -> Result<Value> {
    let Some(err) = response.get("error") else {
        return Ok(response);
    };
    Err(Error::DeviceReply {
        method: request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
        message: err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    })
}
