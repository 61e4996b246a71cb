//! The JSON-RPC endpoint: one message per `POST /mcp` body.
//!
//! Auth happens in middleware; by the time a request lands here its
//! identity (if any) sits in the request extensions and is threaded through
//! explicitly. Dispatch covers the tool/resource/prompt surface; every
//! `tools/call` goes through the request wrapper.

use std::collections::HashMap;

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use ag_domain::types::AgentIdentity;

use crate::state::AppState;

use super::protocol::{
    prompt_messages, resource_contents, tool_call_result, JsonRpcRequest, JsonRpcResponse,
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    PROTOCOL_VERSION,
};
use super::wrapper;

pub async fn handle(
    State(state): State<AppState>,
    identity: Option<Extension<AgentIdentity>>,
    body: String,
) -> Response {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => {
            return Json(JsonRpcResponse::error(
                Value::Null,
                PARSE_ERROR,
                format!("parse error: {e}"),
            ))
            .into_response();
        }
    };

    if request.method.is_empty() {
        return Json(JsonRpcResponse::error(
            request.id.unwrap_or(Value::Null),
            INVALID_REQUEST,
            "missing method",
        ))
        .into_response();
    }

    let identity = identity.map(|Extension(i)| i);

    let Some(id) = request.id else {
        // Notifications get no response body.
        tracing::debug!(method = %request.method, "notification received");
        return StatusCode::ACCEPTED.into_response();
    };

    let response = dispatch(&state, identity.as_ref(), &request.method, request.params, id).await;
    Json(response).into_response()
}

async fn dispatch(
    state: &AppState,
    identity: Option<&AgentIdentity>,
    method: &str,
    params: Value,
    id: Value,
) -> JsonRpcResponse {
    match method {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}, "resources": {}, "prompts": {}},
                "serverInfo": {
                    "name": state.config.server.name,
                    "version": state.config.server.version,
                },
                "instructions": state.config.server.description,
            }),
        ),

        "ping" => JsonRpcResponse::success(id, json!({})),

        "tools/list" => {
            let mut tools: Vec<Value> = state
                .plugins
                .tools()
                .map(|tool| {
                    let manifest = tool.manifest();
                    json!({
                        "name": manifest.name,
                        "title": manifest.title,
                        "description": manifest.description,
                        "inputSchema": tool.input_schema(),
                    })
                })
                .collect();
            tools.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
            JsonRpcResponse::success(id, json!({"tools": tools}))
        }

        "tools/call" => {
            let Some(name) = params["name"].as_str() else {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "missing tool name");
            };
            let args = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let outcome = wrapper::run_tool(state, identity, name, args).await;
            let is_error = wrapper::is_error_body(&outcome);
            JsonRpcResponse::success(id, tool_call_result(outcome, is_error))
        }

        "resources/list" => {
            let mut resources: Vec<Value> = state
                .plugins
                .resources()
                .map(|resource| {
                    let manifest = resource.manifest();
                    json!({
                        "uri": resource.uri(),
                        "name": manifest.name,
                        "title": manifest.title,
                        "description": manifest.description,
                        "mimeType": "text/plain",
                    })
                })
                .collect();
            resources.sort_by(|a, b| a["uri"].as_str().cmp(&b["uri"].as_str()));
            JsonRpcResponse::success(id, json!({"resources": resources}))
        }

        "resources/read" => {
            let Some(uri) = params["uri"].as_str() else {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "missing resource uri");
            };
            let Some(resource) = state.plugins.resource(uri) else {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Unknown resource: {uri}"),
                );
            };
            match resource.read(identity).await {
                Ok(text) => JsonRpcResponse::success(id, resource_contents(uri, text)),
                Err(e) => {
                    tracing::error!(uri = %uri, error = %e, "resource read failed");
                    JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string())
                }
            }
        }

        "prompts/list" => {
            let mut prompts: Vec<Value> = state
                .plugins
                .prompts()
                .map(|prompt| {
                    let manifest = prompt.manifest();
                    let arguments: Vec<Value> = prompt
                        .arguments()
                        .iter()
                        .map(|a| {
                            json!({
                                "name": a.name,
                                "description": a.description,
                                "required": a.required,
                            })
                        })
                        .collect();
                    json!({
                        "name": prompt.prompt_name(),
                        "title": manifest.title,
                        "description": manifest.description,
                        "arguments": arguments,
                    })
                })
                .collect();
            prompts.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
            JsonRpcResponse::success(id, json!({"prompts": prompts}))
        }

        "prompts/get" => {
            let Some(name) = params["name"].as_str() else {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "missing prompt name");
            };
            let Some(prompt) = state.plugins.prompt(name) else {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Unknown prompt: {name}"),
                );
            };
            let arguments: HashMap<String, String> = params
                .get("arguments")
                .and_then(|v| v.as_object())
                .map(|obj| {
                    obj.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect()
                })
                .unwrap_or_default();
            match prompt.render(&arguments).await {
                Ok(text) => JsonRpcResponse::success(
                    id,
                    prompt_messages(&prompt.manifest().description, text),
                ),
                Err(e) => {
                    tracing::error!(prompt = %name, error = %e, "prompt render failed");
                    JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string())
                }
            }
        }

        other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    }
}
