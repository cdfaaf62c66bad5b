//! Explicit registry of host-callable operations.
//!
//! Operations come in two flavors: read-only resources addressed by a URI
//! template (`bulbs://{ip}/state`) and tools called by name with named
//! arguments. The registry is built once at startup and shared read-only.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::dispatcher::BulbCommandDispatcher;
use crate::errors::Error;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// Named arguments of a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new(args: Map<String, Value>) -> Self {
        Arguments(args)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A string argument, or `None` if missing or not a string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn required_str(&self, name: &'static str) -> Result<&str> {
        self.str(name).ok_or(Error::MissingArgument(name))
    }

    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        self.0.insert(name.to_string(), value);
    }
}

impl From<Value> for Arguments {
    /// Non-object values carry no arguments.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Arguments(map),
            _ => Arguments::default(),
        }
    }
}

/// The shape every failed operation is reported in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

/// Outcome of an operation, serialized either as the success value or as
/// `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success(Value),
    Error(ErrorPayload),
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(ErrorPayload {
            error: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    pub fn from_result<S: Serialize>(result: Result<S>) -> Self {
        match result.and_then(|value| serde_json::to_value(value).map_err(Error::JsonDump)) {
            Ok(value) => Response::Success(value),
            Err(err) => {
                warn!("operation failed ({:?}): {err}", err.kind());
                Response::error(err.to_string())
            }
        }
    }

    /// The response as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Response::Success(value) => value.clone(),
            Response::Error(payload) => json!({ "error": payload.error }),
        }
    }
}

type HandlerFn = Arc<dyn Fn(Arguments) -> BoxFuture<'static, Response> + Send + Sync>;

/// A URI pattern such as `bulbs://{ip}/state`.
///
/// Both the pattern and candidate URIs are split on `/`; `{name}` segments
/// capture one non-empty segment, all others must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
}

impl UriTemplate {
    pub fn new(raw: &str) -> Self {
        UriTemplate {
            raw: raw.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template has any `{name}` segments.
    pub fn is_templated(&self) -> bool {
        self.raw.split('/').any(|s| param_name(s).is_some())
    }

    /// Match `uri`, returning the captured parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizlights_mcp::UriTemplate;
    ///
    /// let template = UriTemplate::new("bulbs://{ip}/state");
    /// let args = template.matches("bulbs://10.0.0.2/state").unwrap();
    /// assert_eq!(args.str("ip"), Some("10.0.0.2"));
    /// assert!(template.matches("bulbs://10.0.0.2").is_none());
    /// ```
    pub fn matches(&self, uri: &str) -> Option<Arguments> {
        let pattern: Vec<&str> = self.raw.split('/').collect();
        let segments: Vec<&str> = uri.split('/').collect();
        if pattern.len() != segments.len() {
            return None;
        }

        let mut args = Arguments::default();
        for (expected, actual) in pattern.iter().zip(&segments) {
            match param_name(expected) {
                Some(_) if actual.is_empty() => return None,
                Some(name) => args.insert(name, Value::String(actual.to_string())),
                None if expected != actual => return None,
                None => {}
            }
        }
        Some(args)
    }
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// How an operation is addressed by the host.
#[derive(Debug, Clone)]
pub enum OperationKind {
    Resource { uri: UriTemplate },
    Tool { input_schema: Value },
}

/// A registered operation.
#[derive(Clone)]
pub struct Operation {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OperationKind,
    handler: HandlerFn,
}

impl Operation {
    pub fn call(&self, args: Arguments) -> BoxFuture<'static, Response> {
        info!("calling {}", self.name);
        (self.handler)(args)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// All operations exposed to the host, in registration order.
#[derive(Debug, Default)]
pub struct OperationRegistry {
    operations: Vec<Operation>,
    by_name: HashMap<&'static str, usize>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a read-only resource served at `uri`.
    pub fn resource<F, Fut, S>(
        &mut self,
        name: &'static str,
        uri: &str,
        description: &'static str,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S>> + Send + 'static,
        S: Serialize + 'static,
    {
        let kind = OperationKind::Resource {
            uri: UriTemplate::new(uri),
        };
        self.insert(name, description, kind, handler)
    }

    /// Register a tool taking the arguments described by `input_schema`.
    pub fn tool<F, Fut, S>(
        &mut self,
        name: &'static str,
        description: &'static str,
        input_schema: Value,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S>> + Send + 'static,
        S: Serialize + 'static,
    {
        self.insert(name, description, OperationKind::Tool { input_schema }, handler)
    }

    fn insert<F, Fut, S>(
        &mut self,
        name: &'static str,
        description: &'static str,
        kind: OperationKind,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S>> + Send + 'static,
        S: Serialize + 'static,
    {
        let handler: HandlerFn = Arc::new(move |args| {
            let fut = handler(args);
            async move { Response::from_result(fut.await) }.boxed()
        });
        let operation = Operation {
            name,
            description,
            kind,
            handler,
        };

        match self.by_name.get(name) {
            Some(&idx) => self.operations[idx] = operation,
            None => {
                self.by_name.insert(name, self.operations.len());
                self.operations.push(operation);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.by_name.get(name).map(|&idx| &self.operations[idx])
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn resources(&self) -> impl Iterator<Item = (&Operation, &UriTemplate)> {
        self.operations.iter().filter_map(|op| match &op.kind {
            OperationKind::Resource { uri } => Some((op, uri)),
            OperationKind::Tool { .. } => None,
        })
    }

    pub fn tools(&self) -> impl Iterator<Item = (&Operation, &Value)> {
        self.operations.iter().filter_map(|op| match &op.kind {
            OperationKind::Tool { input_schema } => Some((op, input_schema)),
            OperationKind::Resource { .. } => None,
        })
    }

    /// Find the resource serving `uri` and the arguments captured from it.
    ///
    /// Literal templates win over templated ones.
    pub fn resolve(&self, uri: &str) -> Option<(&Operation, Arguments)> {
        let mut candidates: Vec<_> = self.resources().collect();
        candidates.sort_by_key(|(_, template)| template.is_templated());
        candidates
            .into_iter()
            .find_map(|(op, template)| template.matches(uri).map(|args| (op, args)))
    }

    /// Call the tool `name`; `None` if no such tool is registered.
    pub fn call_tool(&self, name: &str, args: Arguments) -> Option<BoxFuture<'static, Response>> {
        let op = self.get(name)?;
        matches!(op.kind, OperationKind::Tool { .. }).then(|| op.call(args))
    }

    /// Read the resource at `uri`; `None` if no template matches.
    pub fn read_resource(&self, uri: &str) -> Option<BoxFuture<'static, Response>> {
        self.resolve(uri).map(|(op, args)| op.call(args))
    }
}

/// Register discovery, state and scene resources for individual bulbs.
pub fn register_bulb_resources<T: Transport + 'static>(
    registry: &mut OperationRegistry,
    dispatcher: &Arc<BulbCommandDispatcher<T>>,
) {
    let d = Arc::clone(dispatcher);
    registry.resource(
        "get_bulbs",
        "bulbs://{broadcast_space}",
        "Get all available bulbs in the broadcast space",
        move |args| {
            let d = Arc::clone(&d);
            async move { d.discover(args.required_str("broadcast_space")?).await }
        },
    );

    let d = Arc::clone(dispatcher);
    registry.resource(
        "get_bulb_state",
        "bulbs://{ip}/state",
        "Get a specific bulb's state",
        move |args| {
            let d = Arc::clone(&d);
            async move { d.get_state(args.required_str("ip")?).await }
        },
    );

    let d = Arc::clone(dispatcher);
    registry.resource(
        "get_bulb_scene",
        "bulbs://{ip}/scene",
        "Get a specific bulb's scene",
        move |args| {
            let d = Arc::clone(&d);
            async move { d.get_scene(args.required_str("ip")?).await }
        },
    );
}

/// Register the static scene list.
pub fn register_scene_resources<T: Transport + 'static>(
    registry: &mut OperationRegistry,
    dispatcher: &Arc<BulbCommandDispatcher<T>>,
) {
    let d = Arc::clone(dispatcher);
    registry.resource("get_scenes", "scenes://", "Get all available scenes", move |_| {
        let scenes = d.list_scenes();
        async move { Ok::<_, Error>(scenes) }
    });
}

/// Register the state-changing tools.
pub fn register_bulb_tools<T: Transport + 'static>(
    registry: &mut OperationRegistry,
    dispatcher: &Arc<BulbCommandDispatcher<T>>,
) {
    let d = Arc::clone(dispatcher);
    registry.tool(
        "set_bulb_state",
        "Set a specific bulb's state",
        json!({
            "type": "object",
            "properties": {
                "ip": {"type": "string", "description": "IPv4 address of the bulb"},
                "state": state_schema(),
            },
            "required": ["ip", "state"],
        }),
        move |args| {
            let d = Arc::clone(&d);
            async move {
                let ip = args.required_str("ip")?;
                let state = args
                    .get("state")
                    .filter(|v| !v.is_null())
                    .ok_or(Error::MissingArgument("state"))?;
                d.set_state(ip, state).await
            }
        },
    );

    let d = Arc::clone(dispatcher);
    registry.tool(
        "toggle_bulb",
        "Toggle a specific bulb's state",
        json!({
            "type": "object",
            "properties": {
                "ip": {"type": "string", "description": "IPv4 address of the bulb"},
            },
            "required": ["ip"],
        }),
        move |args| {
            let d = Arc::clone(&d);
            async move { d.toggle(args.required_str("ip")?).await }
        },
    );

    let d = Arc::clone(dispatcher);
    registry.tool(
        "set_bulb_scene",
        "Set a specific bulb's scene",
        json!({
            "type": "object",
            "properties": {
                "ip": {"type": "string", "description": "IPv4 address of the bulb"},
                "scene": {"type": "string", "description": "Scene name, e.g. \"Ocean\""},
            },
            "required": ["ip", "scene"],
        }),
        move |args| {
            let d = Arc::clone(&d);
            async move { d.set_scene(args.required_str("ip")?, args.str("scene")).await }
        },
    );
}

/// Build the registry with every bulb and scene operation.
pub fn build_registry<T: Transport + 'static>(
    dispatcher: Arc<BulbCommandDispatcher<T>>,
) -> OperationRegistry {
    let mut registry = OperationRegistry::new();
    register_bulb_resources(&mut registry, &dispatcher);
    register_scene_resources(&mut registry, &dispatcher);
    register_bulb_tools(&mut registry, &dispatcher);
    registry
}

fn state_schema() -> Value {
    let channel = json!({"type": "integer", "minimum": 0, "maximum": 255});
    let percent = json!({"type": "integer", "minimum": 0, "maximum": 100});
    let tuple = |len: usize, item: &Value| {
        json!({"type": "array", "items": item, "minItems": len, "maxItems": len})
    };
    json!({
        "type": "object",
        "properties": {
            "rgb": tuple(3, &json!({"type": "number", "minimum": 0, "maximum": 255})),
            "rgbw": tuple(4, &channel),
            "rgbww": tuple(5, &channel),
            "brightness": channel,
            "colortemp": {"type": "integer", "minimum": 2000, "maximum": 6500},
            "warm_white": channel,
            "cold_white": channel,
            "speed": percent,
            "scene": {"type": "integer"},
            "hucolor": tuple(2, &json!({"type": "number"})),
            "ratio": percent,
            "state": {"type": ["boolean", "string"], "default": true},
        },
    })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::status::RawDeviceState;
    use crate::transport::fake::FakeTransport;

    fn registry() -> (OperationRegistry, FakeTransport) {
        let raw: RawDeviceState =
            serde_json::from_value(json!({"mac": "a8bb50d46a1c", "state": true, "sceneId": 6}))
                .unwrap();
        let transport = FakeTransport::default().with_bulb(Ipv4Addr::new(10, 0, 0, 2), raw);
        let dispatcher = Arc::new(BulbCommandDispatcher::new(transport.clone()));
        (build_registry(dispatcher), transport)
    }

    #[test]
    fn test_template_matching() {
        let t = UriTemplate::new("bulbs://{ip}/scene");
        assert!(t.is_templated());
        assert!(t.matches("bulbs://10.0.0.2/state").is_none());
        assert!(t.matches("bulbs:///scene").is_none());
        assert!(t.matches("lights://10.0.0.2/scene").is_none());

        let literal = UriTemplate::new("scenes://");
        assert!(!literal.is_templated());
        assert_eq!(literal.matches("scenes://"), Some(Arguments::default()));
        assert!(literal.matches("scenes://x").is_none());
    }

    #[test]
    fn test_registration_order_and_kinds() {
        let (registry, _) = registry();
        let resources: Vec<&str> = registry.resources().map(|(op, _)| op.name).collect();
        let tools: Vec<&str> = registry.tools().map(|(op, _)| op.name).collect();
        assert_eq!(
            resources,
            vec!["get_bulbs", "get_bulb_state", "get_bulb_scene", "get_scenes"]
        );
        assert_eq!(tools, vec!["set_bulb_state", "toggle_bulb", "set_bulb_scene"]);
    }

    #[test]
    fn test_resolve_uris() {
        let (registry, _) = registry();
        let (op, args) = registry.resolve("bulbs://10.0.0.255").unwrap();
        assert_eq!(op.name, "get_bulbs");
        assert_eq!(args.str("broadcast_space"), Some("10.0.0.255"));

        let (op, args) = registry.resolve("bulbs://10.0.0.2/state").unwrap();
        assert_eq!(op.name, "get_bulb_state");
        assert_eq!(args.str("ip"), Some("10.0.0.2"));

        assert_eq!(registry.resolve("scenes://").unwrap().0.name, "get_scenes");
        assert!(registry.resolve("bulbs://10.0.0.2/color").is_none());
    }

    #[tokio::test]
    async fn test_read_resources() {
        let (registry, _) = registry();

        let state = registry.read_resource("bulbs://10.0.0.2/state").unwrap().await;
        assert_eq!(state.to_value()["scene"], "Cozy");

        let scene = registry.read_resource("bulbs://10.0.0.2/scene").unwrap().await;
        assert_eq!(scene, Response::Success(json!({"id": 6, "name": "Cozy"})));

        let scenes = registry.read_resource("scenes://").unwrap().await;
        assert_eq!(scenes.to_value().as_array().unwrap().len(), 37);

        let bulbs = registry.read_resource("bulbs://10.0.0.255").unwrap().await;
        assert_eq!(bulbs, Response::Success(json!([{"ip": "10.0.0.2", "mac": "a8bb50d46a1c"}])));
    }

    #[tokio::test]
    async fn test_errors_become_payloads() {
        let (registry, transport) = registry();

        let resp = registry.read_resource("bulbs://999.1.1.1/state").unwrap().await;
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"error": "Invalid IP address. Please provide a valid IP address."})
        );

        let resp = registry.read_resource("bulbs://bad/scene").unwrap().await;
        assert_eq!(resp, Response::error("Invalid IP address or bulb not found."));

        let args = Arguments::from(json!({"ip": "10.0.0.2", "scene": "unknown-scene-xyz"}));
        let resp = registry.call_tool("set_bulb_scene", args).unwrap().await;
        assert_eq!(resp, Response::error("Invalid scene name"));
        assert!(transport.sent().is_empty());

        let resp = registry.call_tool("toggle_bulb", Arguments::default()).unwrap().await;
        assert_eq!(resp, Response::error("missing required argument `ip`"));

        let args = Arguments::from(json!({"ip": "10.0.0.2"}));
        let resp = registry.call_tool("set_bulb_state", args).unwrap().await;
        assert_eq!(resp, Response::error("missing required argument `state`"));

        let args = Arguments::from(json!({"ip": "10.0.0.2", "state": null}));
        let resp = registry.call_tool("set_bulb_state", args).unwrap().await;
        assert!(resp.is_error());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_call_tools() {
        let (registry, transport) = registry();

        let args = Arguments::from(json!({"ip": "10.0.0.2"}));
        let resp = registry.call_tool("toggle_bulb", args).unwrap().await;
        assert_eq!(resp.to_value()["state"], false);

        let args = Arguments::from(json!({"ip": "10.0.0.2", "state": {"colortemp": 4000}}));
        let resp = registry.call_tool("set_bulb_state", args).unwrap().await;
        assert!(!resp.is_error());
        assert_eq!(resp.to_value()["color_temp"], 4000);
        assert_eq!(resp.to_value()["state"], true);

        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn test_unknown_names() {
        let (registry, _) = registry();
        assert!(registry.call_tool("get_bulbs", Arguments::default()).is_none());
        assert!(registry.call_tool("reboot", Arguments::default()).is_none());
        assert!(registry.read_resource("files://etc/passwd").is_none());
    }
}
