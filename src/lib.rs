//! # wizlights_mcp
//!
//! Validate, shape and dispatch control requests for WiZ smart lights, and
//! expose them to an MCP host as resources and tools.
//!
//! A request flows through four layers:
//!
//! 1. the [`OperationRegistry`] resolves a resource URI or tool name to an
//!    operation and extracts its arguments,
//! 2. the [`BulbCommandDispatcher`] validates the address and payload
//!    ([`is_valid_ipv4`], [`validate_state`]) and builds a [`Payload`],
//! 3. a [`Transport`] sends it to the bulb ([`WizTransport`] speaks UDP on
//!    port 38899),
//! 4. the bulb is read back into a [`NormalizedBulbState`].
//!
//! Failures never escape the registry: every operation answers either with
//! its result or with `{"error": "<message>"}`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wizlights_mcp::{BulbCommandDispatcher, WizTransport, build_registry, serve};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let dispatcher = Arc::new(BulbCommandDispatcher::new(WizTransport::default()));
//!     let registry = Arc::new(build_registry(dispatcher));
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     serve(registry, stdin, tokio::io::stdout()).await
//! }
//! ```
//!
//! Talking to a single bulb directly:
//!
//! ```no_run
//! use wizlights_mcp::{BulbCommandDispatcher, WizTransport};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), wizlights_mcp::Error> {
//! let dispatcher = BulbCommandDispatcher::new(WizTransport::default());
//! let state = dispatcher
//!     .set_state("192.168.1.100", &json!({"rgb": [255, 0, 0], "brightness": 128}))
//!     .await?;
//! println!("bulb is {}", if state.state { "on" } else { "off" });
//! # Ok(())
//! # }
//! ```
//!
//! ## Operations
//!
//! | operation | kind | address |
//! |---|---|---|
//! | `get_bulbs` | resource | `bulbs://{broadcast_space}` |
//! | `get_bulb_state` | resource | `bulbs://{ip}/state` |
//! | `get_bulb_scene` | resource | `bulbs://{ip}/scene` |
//! | `get_scenes` | resource | `scenes://` |
//! | `set_bulb_state` | tool | `ip`, `state` |
//! | `toggle_bulb` | tool | `ip` |
//! | `set_bulb_scene` | tool | `ip`, `scene` |
//!
//! ## Communication
//!
//! All communication with WiZ bulbs occurs over UDP on port 38899. Bulbs
//! must be on the same local network. Timeouts and retries are tuned with
//! [`TransportConfig`].

mod address;
mod config;
mod discovery;
mod dispatcher;
mod errors;
mod light;
mod payload;
mod reader;
mod registry;
pub mod scenes;
mod server;
mod state_model;
mod status;
mod transport;
mod types;

// Re-export public API
pub use address::{is_valid_ipv4, parse_ipv4};
pub use config::TransportConfig;
pub use discovery::{DiscoveredBulb, discover_bulbs};
pub use dispatcher::BulbCommandDispatcher;
pub use errors::{Error, ErrorKind};
pub use light::Light;
pub use payload::Payload;
pub use reader::{NormalizedBulbState, read_state};
pub use registry::{
    Arguments, ErrorPayload, Operation, OperationKind, OperationRegistry, Response, UriTemplate,
    build_registry, register_bulb_resources, register_bulb_tools, register_scene_resources,
};
pub use scenes::{Scene, SceneMode};
pub use server::{PROTOCOL_VERSION, RpcError, SERVER_NAME, serve};
pub use state_model::{FieldViolation, ValidatedState, ValidationError, validate_state};
pub use status::RawDeviceState;
pub use transport::{DeviceHandle, Transport, WizTransport};
pub use types::{
    Brightness, Color, ColorRGBW, ColorRGBWW, HueSaturation, Kelvin, Ratio, Speed, White,
};
