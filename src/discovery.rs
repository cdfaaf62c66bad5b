//! Device discovery via UDP broadcast.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::debug;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

use crate::config::TransportConfig;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// A Wiz bulb that answered a discovery broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredBulb {
    /// IP address of the discovered bulb
    pub ip: Ipv4Addr,
    /// MAC address of the discovered bulb
    pub mac: String,
}

/// Broadcast a registration probe to `broadcast` and collect the bulbs that
/// answer within `config.discovery_timeout`.
///
/// Replies are deduplicated by MAC address.
pub async fn discover_bulbs(
    broadcast: Ipv4Addr,
    config: &TransportConfig,
) -> Result<Vec<DiscoveredBulb>> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|e| Error::socket("bind", e))?;

    socket
        .set_broadcast(true)
        .map_err(|e| Error::socket("set_broadcast", e))?;

    let msg = json!({
        "method": "registration",
        "params": {
            "phoneMac": "AAAAAAAAAAAA",
            "register": false,
            "phoneIp": "1.2.3.4",
            "id": "1"
        }
    });
    let msg_bytes = serde_json::to_vec(&msg).map_err(Error::JsonDump)?;

    socket
        .send_to(&msg_bytes, (broadcast, config.port))
        .await
        .map_err(|e| Error::socket("send_to", e))?;
    debug!("discovery probe sent to {}:{}", broadcast, config.port);

    let mut discovered: HashMap<String, DiscoveredBulb> = HashMap::new();
    let deadline = Instant::now() + config.discovery_timeout;
    let mut buffer = [0u8; 4096];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining == Duration::ZERO {
            break;
        }
        match timeout(remaining, socket.recv_from(&mut buffer)).await {
            Ok(Ok((size, addr))) => {
                if let Ok(json) = serde_json::from_slice::<Value>(&buffer[..size])
                    && let Some(mac) = extract_mac(&json)
                {
                    let ip = match addr {
                        SocketAddr::V4(v4) => *v4.ip(),
                        SocketAddr::V6(_) => continue,
                    };
                    debug!("discovered bulb {ip} ({mac})");
                    discovered.insert(mac.clone(), DiscoveredBulb { ip, mac });
                }
            }
            // A failed receive does not end the discovery window
            Ok(Err(e)) => debug!("discovery receive failed: {e}"),
            Err(_) => break,
        }
    }

    let mut bulbs: Vec<DiscoveredBulb> = discovered.into_values().collect();
    bulbs.sort_by_key(|b| b.ip);
    Ok(bulbs)
}

fn extract_mac(json: &Value) -> Option<String> {
    json.get("result")
        .and_then(|r| r.get("mac"))
        .and_then(|m| m.as_str())
        .map(String::from)
}
