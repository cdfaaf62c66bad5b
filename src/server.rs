//! Line-delimited JSON-RPC 2.0 host speaking the MCP resource and tool methods.
//!
//! Each request runs in its own task, so a slow bulb does not hold up the
//! others. Replies are written in completion order, one JSON object per line.

use std::io;
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::registry::{Arguments, OperationRegistry};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "WizLights";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const RESOURCE_NOT_FOUND: i64 = -32002;

const MIME_TYPE: &str = "application/json";

/// A protocol-level failure, reported in the JSON-RPC `error` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Serialize)]
struct Reply {
    jsonrpc: &'static str,
    id: Value,
    #[serde(flatten)]
    outcome: Outcome,
}

impl Reply {
    fn new(id: Value, outcome: std::result::Result<Value, RpcError>) -> Self {
        let outcome = match outcome {
            Ok(value) => Outcome::Result(value),
            Err(err) => Outcome::Error(err),
        };
        Reply {
            jsonrpc: "2.0",
            id,
            outcome,
        }
    }
}

struct Request {
    /// `None` for notifications.
    id: Option<Value>,
    method: String,
    params: Map<String, Value>,
}

fn parse_request(line: &str) -> std::result::Result<Request, Reply> {
    let value: Value = serde_json::from_str(line).map_err(|err| {
        Reply::new(Value::Null, Err(RpcError::new(PARSE_ERROR, err.to_string())))
    })?;

    let Value::Object(mut obj) = value else {
        return Err(Reply::new(
            Value::Null,
            Err(RpcError::new(INVALID_REQUEST, "request must be an object")),
        ));
    };
    let id = obj.remove("id");
    let invalid = |message: &str| {
        Reply::new(
            id.clone().unwrap_or(Value::Null),
            Err(RpcError::new(INVALID_REQUEST, message)),
        )
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(invalid("jsonrpc must be \"2.0\""));
    }
    let method = match obj.remove("method") {
        Some(Value::String(method)) => method,
        _ => return Err(invalid("method must be a string")),
    };
    let params = match obj.remove("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(params)) => params,
        Some(_) => return Err(invalid("params must be an object")),
    };

    Ok(Request { id, method, params })
}

fn required_param<'a>(
    params: &'a Map<String, Value>,
    name: &str,
) -> std::result::Result<&'a str, RpcError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, format!("missing string param `{name}`")))
}

async fn handle(
    registry: &OperationRegistry,
    method: &str,
    params: Map<String, Value>,
) -> std::result::Result<Value, RpcError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"resources": {}, "tools": {}},
            "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
        })),
        "ping" => Ok(json!({})),
        "resources/list" => {
            let resources: Vec<Value> = registry
                .resources()
                .filter(|(_, uri)| !uri.is_templated())
                .map(|(op, uri)| {
                    json!({
                        "uri": uri.as_str(),
                        "name": op.name,
                        "description": op.description,
                        "mimeType": MIME_TYPE,
                    })
                })
                .collect();
            Ok(json!({ "resources": resources }))
        }
        "resources/templates/list" => {
            let templates: Vec<Value> = registry
                .resources()
                .filter(|(_, uri)| uri.is_templated())
                .map(|(op, uri)| {
                    json!({
                        "uriTemplate": uri.as_str(),
                        "name": op.name,
                        "description": op.description,
                        "mimeType": MIME_TYPE,
                    })
                })
                .collect();
            Ok(json!({ "resourceTemplates": templates }))
        }
        "resources/read" => {
            let uri = required_param(&params, "uri")?;
            let response = registry.read_resource(uri).ok_or_else(|| {
                RpcError::new(RESOURCE_NOT_FOUND, format!("Resource not found: {uri}"))
            })?;
            let text = response.await.to_value().to_string();
            Ok(json!({
                "contents": [{"uri": uri, "mimeType": MIME_TYPE, "text": text}],
            }))
        }
        "tools/list" => {
            let tools: Vec<Value> = registry
                .tools()
                .map(|(op, schema)| {
                    json!({
                        "name": op.name,
                        "description": op.description,
                        "inputSchema": schema,
                    })
                })
                .collect();
            Ok(json!({ "tools": tools }))
        }
        "tools/call" => {
            let name = required_param(&params, "name")?;
            let args = params
                .get("arguments")
                .cloned()
                .map(Arguments::from)
                .unwrap_or_default();
            let response = registry
                .call_tool(name, args)
                .ok_or_else(|| RpcError::new(INVALID_PARAMS, format!("Unknown tool: {name}")))?
                .await;
            Ok(json!({
                "content": [{"type": "text", "text": response.to_value().to_string()}],
                "isError": response.is_error(),
            }))
        }
        _ => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )),
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(output: &mut W, reply: &Reply) -> io::Result<()> {
    let mut line = serde_json::to_vec(reply).map_err(io::Error::other)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await
}

/// Serve requests read line by line from `input` until it is closed.
///
/// Requests still in flight when `input` ends are completed and answered
/// before returning.
pub async fn serve<R, W>(
    registry: Arc<OperationRegistry>,
    mut input: R,
    mut output: W,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Reply>();
    let mut tasks = JoinSet::new();
    // Survives a cancelled read_until; only taken once a line is complete.
    let mut buf = Vec::new();
    let mut result = Ok(());

    info!("serving {} operations", registry.operations().len());
    loop {
        tokio::select! {
            read = input.read_until(b'\n', &mut buf) => {
                match read {
                    Ok(0) if buf.is_empty() => break,
                    Ok(_) => {}
                    Err(err) => {
                        error!("reading input failed: {err}");
                        result = Err(err);
                        break;
                    }
                }
                let line = match String::from_utf8(std::mem::take(&mut buf)) {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("rejected non utf-8 input: {err}");
                        let reply = Reply::new(
                            Value::Null,
                            Err(RpcError::new(PARSE_ERROR, err.to_string())),
                        );
                        write_reply(&mut output, &reply).await?;
                        continue;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let request = match parse_request(line) {
                    Ok(request) => request,
                    Err(reply) => {
                        warn!("rejected request: {line}");
                        write_reply(&mut output, &reply).await?;
                        continue;
                    }
                };

                debug!("-> {} {:?}", request.method, request.id);
                let registry = Arc::clone(&registry);
                let tx = tx.clone();
                tasks.spawn(async move {
                    let outcome = handle(&registry, &request.method, request.params).await;
                    match request.id {
                        Some(id) => {
                            let _ = tx.send(Reply::new(id, outcome));
                        }
                        None => debug!("notification {} handled", request.method),
                    }
                });
            }
            Some(reply) = rx.recv() => write_reply(&mut output, &reply).await?,
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(err) = joined {
                    error!("request task failed: {err}");
                }
            }
        }
    }

    drop(tx);
    while let Some(reply) = rx.recv().await {
        write_reply(&mut output, &reply).await?;
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            error!("request task failed: {err}");
        }
    }
    info!("input closed, shutting down");
    result
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::dispatcher::BulbCommandDispatcher;
    use crate::registry::build_registry;
    use crate::status::RawDeviceState;
    use crate::transport::fake::FakeTransport;

    async fn run(input: impl AsRef<[u8]>) -> Vec<Value> {
        let raw: RawDeviceState =
            serde_json::from_value(json!({"mac": "a8bb50d46a1c", "state": true, "sceneId": 1}))
                .unwrap();
        let transport = FakeTransport::default().with_bulb(Ipv4Addr::new(10, 0, 0, 2), raw);
        let registry = Arc::new(build_registry(Arc::new(BulbCommandDispatcher::new(transport))));

        let mut output = Vec::new();
        serve(registry, input.as_ref(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn by_id(replies: &[Value], id: i64) -> &Value {
        replies.iter().find(|r| r["id"] == id).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_ping() {
        let replies = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        ))
        .await;

        assert_eq!(replies.len(), 2);
        let init = &by_id(&replies, 1)["result"];
        assert_eq!(init["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(init["serverInfo"]["name"], "WizLights");
        assert_eq!(by_id(&replies, 2)["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let replies = run("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n").await;
        let tools = replies[0]["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["set_bulb_state", "toggle_bulb", "set_bulb_scene"]);
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["ip", "state"]));
    }

    #[tokio::test]
    async fn test_resource_listings() {
        let replies = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"resources/templates/list"}"#,
            "\n",
        ))
        .await;

        let resources = &by_id(&replies, 1)["result"]["resources"];
        assert_eq!(resources.as_array().unwrap().len(), 1);
        assert_eq!(resources[0]["uri"], "scenes://");

        let templates = by_id(&replies, 2)["result"]["resourceTemplates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["uriTemplate"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            templates,
            vec!["bulbs://{broadcast_space}", "bulbs://{ip}/state", "bulbs://{ip}/scene"]
        );
    }

    #[tokio::test]
    async fn test_resources_read() {
        let replies = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"bulbs://10.0.0.2/scene"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"resources/read","params":{"uri":"lamps://x"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"resources/read","params":{}}"#,
            "\n",
        ))
        .await;

        let contents = &by_id(&replies, 1)["result"]["contents"][0];
        assert_eq!(contents["uri"], "bulbs://10.0.0.2/scene");
        assert_eq!(contents["mimeType"], "application/json");
        let scene: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
        assert_eq!(scene, json!({"id": 1, "name": "Ocean"}));

        assert_eq!(by_id(&replies, 2)["error"]["code"], RESOURCE_NOT_FOUND);
        assert_eq!(by_id(&replies, 3)["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call() {
        let replies = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"toggle_bulb","arguments":{"ip":"10.0.0.2"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"set_bulb_scene","arguments":{"ip":"10.0.0.2","scene":"Nope"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"reboot"}}"#,
            "\n",
        ))
        .await;

        let ok = &by_id(&replies, 1)["result"];
        assert_eq!(ok["isError"], false);
        let state: Value = serde_json::from_str(ok["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(state["state"], false);

        let failed = &by_id(&replies, 2)["result"];
        assert_eq!(failed["isError"], true);
        assert_eq!(failed["content"][0]["text"], r#"{"error":"Invalid scene name"}"#);

        assert_eq!(by_id(&replies, 3)["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let replies = run(concat!(
            "not json\n",
            "\n",
            r#"[1,2]"#,
            "\n",
            r#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":8,"method":"lights/dance"}"#,
            "\n",
        ))
        .await;

        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[1]["error"]["code"], INVALID_REQUEST);
        assert_eq!(by_id(&replies, 7)["error"]["code"], INVALID_REQUEST);
        assert_eq!(by_id(&replies, 8)["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(by_id(&replies, 8)["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_answered_and_skipped() {
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        input.extend_from_slice(b"\xff\xfe\n");
        input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

        let replies = run(input).await;

        assert_eq!(replies.len(), 3);
        assert_eq!(by_id(&replies, 1)["result"], json!({}));
        assert_eq!(by_id(&replies, 2)["result"], json!({}));
        let rejected = replies.iter().find(|r| r["error"].is_object()).unwrap();
        assert_eq!(rejected["error"]["code"], PARSE_ERROR);
        assert_eq!(rejected["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let replies = run(r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#).await;
        assert_eq!(by_id(&replies, 5)["result"], json!({}));
    }
}
