// MCP server: routes JSON-RPC requests to tools, resources and prompts

use crate::error::ToolError;
use crate::prompts::ProjectPrompts;
use crate::protocol::*;
use crate::resources::ProjectResources;
use crate::tools::{project_tools, Dispatcher, ToolRegistry};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracker_core::ProjectTable;

const INSTRUCTIONS: &str = "Project status tracker for the Jamiat IT Department. \
Use list_projects for an overview, get_project for details, get_total_cost for hosting \
spend and search_by_status to filter by website or dashboard status.";

pub struct McpServer {
    info: ServerInfo,
    dispatcher: Dispatcher,
    resources: ProjectResources,
    prompts: ProjectPrompts,
}

impl McpServer {
    pub fn new(
        info: ServerInfo,
        dispatcher: Dispatcher,
        resources: ProjectResources,
        prompts: ProjectPrompts,
    ) -> Self {
        Self {
            info,
            dispatcher,
            resources,
            prompts,
        }
    }

    /// Register the project tools, resources and prompts for a table
    pub fn for_table(name: impl Into<String>, table: Arc<ProjectTable>) -> Result<Self, ToolError> {
        let registry = ToolRegistry::builder()
            .tools(project_tools(table.clone()))
            .build()?;

        tracing::info!("Registered {} tools", registry.len());

        Ok(Self::new(
            ServerInfo {
                name: name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            Dispatcher::new(registry),
            ProjectResources::new(table.clone()),
            ProjectPrompts::new(table),
        ))
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting unparseable message");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        if value.is_array() {
            return Some(JsonRpcResponse::error(
                Value::Null,
                JsonRpcError::invalid_request("Batch requests are not supported"),
            ));
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        };

        self.handle_request(request).await
    }

    /// Handle a decoded request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Invalid request: jsonrpc must be \"2.0\""),
            ));
        }

        let response = match self.route(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn route(&self, method: &str, params: Option<Value>) -> Result<Value, JsonRpcError> {
        match method {
            "initialize" => self.initialize(params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_result(ListToolsResult {
                tools: self.dispatcher.registry().schemas(),
            }),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => to_result(ListResourcesResult {
                resources: self.resources.list(),
            }),
            "resources/read" => self.read_resource(params),
            "prompts/list" => to_result(ListPromptsResult {
                prompts: self.prompts.list(),
            }),
            "prompts/get" => self.get_prompt(params),
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(p) => parse_params(p)?,
            None => InitializeParams::default(),
        };

        let protocol_version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version.clone()
        } else {
            LATEST_PROTOCOL_VERSION.to_string()
        };

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol_version = %protocol_version,
            "Client initialized"
        );

        to_result(InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability { list_changed: false }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
                prompts: Some(ListChangedCapability { list_changed: false }),
            },
            server_info: self.info.clone(),
            instructions: Some(INSTRUCTIONS.to_string()),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams =
            parse_params(params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?)?;

        let arguments = match params.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(JsonRpcError::invalid_params(
                    "Tool arguments must be an object",
                ))
            }
        };

        let text = self
            .dispatcher
            .invoke(&params.name, &arguments)
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        to_result(CallToolResult::text(text))
    }

    fn read_resource(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ReadResourceParams =
            parse_params(params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?)?;

        let contents = self
            .resources
            .read(&params.uri)
            .map_err(|e| JsonRpcError::internal_error(format!("{:#}", e)))?
            .ok_or_else(|| JsonRpcError::resource_not_found(&params.uri))?;

        to_result(ReadResourceResult {
            contents: vec![contents],
        })
    }

    fn get_prompt(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: GetPromptParams =
            parse_params(params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?)?;

        let prompt = self
            .prompts
            .get(&params.name)
            .map_err(|e| JsonRpcError::internal_error(format!("{:#}", e)))?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(format!("Unknown prompt: {}", params.name))
            })?;

        to_result(prompt)
    }

    /// Serve newline-delimited JSON-RPC until the reader closes
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new());
        let mut sink = FramedWrite::new(writer, LinesCodec::new());

        while let Some(line) = lines.next().await {
            let line = line.context("Failed to read message")?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let json = serde_json::to_string(&response).context("Failed to encode response")?;
                sink.send(json).await.context("Failed to write response")?;
            }
        }

        Ok(())
    }

    /// Serve over the process's stdin and stdout
    pub async fn serve_stdio(&self) -> Result<()> {
        tracing::info!("MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        tracing::info!("stdin closed, shutting down");
        Ok(())
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result(value: impl Serialize) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_core::{Project, ProjectStatus};

    fn server() -> McpServer {
        McpServer::for_table("jamiat-tracker", Arc::new(ProjectTable::builtin())).unwrap()
    }

    async fn call(server: &McpServer, method: &str, params: Value) -> JsonRpcResponse {
        server
            .handle_request(JsonRpcRequest::new(1, method, Some(params)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let resp = call(
            &server(),
            "initialize",
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "0.0.1"}
            }),
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "jamiat-tracker");
        assert!(result["capabilities"]["tools"].is_object());
        assert!(result["capabilities"]["resources"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_falls_back() {
        let resp = call(&server(), "initialize", json!({"protocolVersion": "1999-01-01"})).await;
        assert_eq!(resp.result.unwrap()["protocolVersion"], LATEST_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let resp = call(&server(), "tools/list", json!({})).await;
        let result: ListToolsResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        let names: Vec<_> = result.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["get_project", "list_projects", "get_total_cost", "search_by_status"]
        );
        assert_eq!(
            result.tools[0].input_schema["required"],
            json!(["project_id"])
        );
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let resp = call(
            &server(),
            "tools/call",
            json!({"name": "get_project", "arguments": {"project_id": "Sama"}}),
        )
        .await;
        let result: CallToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(result.is_error.is_none());
        assert!(result.joined_text().contains("\"name\": \"SAMA\""));
    }

    #[tokio::test]
    async fn test_tools_call_not_found_is_not_a_fault() {
        let resp = call(
            &server(),
            "tools/call",
            json!({"name": "get_project", "arguments": {"project_id": "nope"}}),
        )
        .await;
        assert!(resp.error.is_none());
        let result: CallToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(result.joined_text().contains("not found"));
    }

    #[tokio::test]
    async fn test_tools_call_faults_become_rpc_errors() {
        let s = server();

        let resp = call(&s, "tools/call", json!({"name": "no_such_op", "arguments": {}})).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);

        let resp = call(&s, "tools/call", json!({"name": "get_project"})).await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, error_codes::INVALID_PARAMS);
        assert_eq!(error.data, Some(json!({"kind": "missing_argument"})));

        let resp = call(&s, "tools/call", json!({"name": "get_project", "arguments": [1]})).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_data_integrity_is_internal_error() {
        let table = ProjectTable::new(vec![Project::new(
            "broken",
            "Broken",
            ProjectStatus::Live,
            ProjectStatus::Live,
            "Vercel",
            "about twenty",
        )])
        .unwrap();
        let s = McpServer::for_table("t", Arc::new(table)).unwrap();

        let resp = call(&s, "tools/call", json!({"name": "get_total_cost"})).await;
        let error = resp.error.unwrap();
        assert_eq!(error.code, error_codes::INTERNAL_ERROR);
        assert_eq!(error.data, Some(json!({"kind": "data_integrity"})));
    }

    #[tokio::test]
    async fn test_resources_and_prompts() {
        let s = server();

        let resp = call(&s, "resources/list", json!({})).await;
        assert_eq!(
            resp.result.unwrap()["resources"][0]["uri"],
            "tracker://projects/all"
        );

        let resp = call(&s, "resources/read", json!({"uri": "tracker://projects/all"})).await;
        let result: ReadResourceResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(result.contents[0].text.contains("\"jamiat\""));

        let resp = call(&s, "resources/read", json!({"uri": "tracker://nope"})).await;
        assert_eq!(resp.error.unwrap().code, error_codes::RESOURCE_NOT_FOUND);

        let resp = call(&s, "prompts/get", json!({"name": "monthly_report"})).await;
        let result: GetPromptResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.messages[0].role, "user");

        let resp = call(&s, "prompts/get", json!({"name": "nope"})).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method_and_notifications() {
        let s = server();

        let resp = call(&s, "tools/destroy", json!({})).await;
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);

        let notification = JsonRpcRequest::notification("notifications/initialized", None);
        assert!(s.handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_handle_message_rejects_bad_input() {
        let s = server();

        let resp = s.handle_message("not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
        assert_eq!(resp.id, Value::Null);

        let resp = s.handle_message(r#"{"jsonrpc":"2.0","id":5}"#).await.unwrap();
        assert_eq!(resp.id, json!(5));
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);

        let resp = s.handle_message(r#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#).await.unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);

        let resp = s
            .handle_message(r#"{"jsonrpc":"1.0","id":2,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_serve_line_delimited() {
        let s = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list_projects"}}"#,
            "\n"
        );
        let mut output = Vec::new();
        s.serve(input.as_bytes(), &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let responses: Vec<JsonRpcResponse> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, json!(1));
        assert_eq!(responses[1].id, json!(2));
        assert!(responses[1].result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("• Jamiat"));
    }
}
