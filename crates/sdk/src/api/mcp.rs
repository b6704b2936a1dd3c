//! JSON-RPC calls against the MCP endpoint.

use crate::client::TrackerClient;
use crate::error::{TrackerError, TrackerResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracker_mcp::protocol::{
    CallToolParams, CallToolResult, ClientInfo, GetPromptParams, GetPromptResult,
    InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListPromptsResult,
    ListResourcesResult, ListToolsResult, PromptDefinition, ReadResourceParams,
    ReadResourceResult, ResourceDefinition, ToolSchema, LATEST_PROTOCOL_VERSION,
};

/// MCP API for discovering and calling tools.
pub struct McpApi<'a> {
    client: &'a TrackerClient,
}

impl<'a> McpApi<'a> {
    pub(crate) fn new(client: &'a TrackerClient) -> Self {
        Self { client }
    }

    /// Perform the initialize handshake and acknowledge it.
    pub async fn initialize(&self) -> TrackerResult<InitializeResult> {
        let params = InitializeParams {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            client_info: ClientInfo {
                name: self.client.config.client_name.clone(),
                version: self.client.config.client_version.clone(),
            },
            ..Default::default()
        };

        let result: InitializeResult = self.request("initialize", Some(&params)).await?;
        debug!(
            server = %result.server_info.name,
            protocol = %result.protocol_version,
            "Initialized MCP session"
        );

        self.notify("notifications/initialized").await?;
        Ok(result)
    }

    /// Round-trip a ping.
    pub async fn ping(&self) -> TrackerResult<()> {
        let _: Value = self.request::<_, ()>("ping", None).await?;
        Ok(())
    }

    /// List tools in the server's registration order.
    pub async fn list_tools(&self) -> TrackerResult<Vec<ToolSchema>> {
        let result: ListToolsResult = self.request::<_, ()>("tools/list", None).await?;
        Ok(result.tools)
    }

    /// Call a tool. `arguments` should be a JSON object (or null).
    pub async fn call_tool(&self, name: &str, arguments: Value) -> TrackerResult<CallToolResult> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments: (!arguments.is_null()).then_some(arguments),
        };
        self.request("tools/call", Some(&params)).await
    }

    pub async fn list_resources(&self) -> TrackerResult<Vec<ResourceDefinition>> {
        let result: ListResourcesResult = self.request::<_, ()>("resources/list", None).await?;
        Ok(result.resources)
    }

    pub async fn read_resource(&self, uri: &str) -> TrackerResult<ReadResourceResult> {
        let params = ReadResourceParams {
            uri: uri.to_string(),
        };
        self.request("resources/read", Some(&params)).await
    }

    pub async fn list_prompts(&self) -> TrackerResult<Vec<PromptDefinition>> {
        let result: ListPromptsResult = self.request::<_, ()>("prompts/list", None).await?;
        Ok(result.prompts)
    }

    pub async fn get_prompt(&self, name: &str) -> TrackerResult<GetPromptResult> {
        let params = GetPromptParams {
            name: name.to_string(),
            arguments: None,
        };
        self.request("prompts/get", Some(&params)).await
    }

    async fn request<T, P>(&self, method: &str, params: Option<&P>) -> TrackerResult<T>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let id = self.client.next_request_id();
        let params = params.map(serde_json::to_value).transpose()?;
        let request = JsonRpcRequest::new(id, method, params);

        debug!(id = id, method = %method, "MCP request");

        let response: JsonRpcResponse = self
            .client
            .http
            .post(&self.client.config.mcp_path, &request, is_idempotent(method))
            .await?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        let result = response
            .result
            .ok_or_else(|| TrackerError::EmptyResponse(method.to_string()))?;
        Ok(serde_json::from_value(result)?)
    }

    async fn notify(&self, method: &str) -> TrackerResult<()> {
        let notification = JsonRpcRequest::notification(method, None);
        self.client
            .http
            .post_no_response(&self.client.config.mcp_path, &notification)
            .await
    }
}

/// Tool calls may have side effects on the server; everything else only reads
fn is_idempotent(method: &str) -> bool {
    method != "tools/call"
}

#[cfg(test)]
mod tests {
    use super::is_idempotent;
    use crate::config::RetryConfig;
    use crate::error::TrackerError;
    use crate::TrackerClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> TrackerClient {
        TrackerClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    fn rpc_ok(id: u64, result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    #[tokio::test]
    async fn test_initialize_sends_notification() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "initialize", "id": 1})))
            .respond_with(rpc_ok(
                1,
                json!({
                    "protocolVersion": "2025-06-18",
                    "capabilities": {"tools": {"listChanged": false}},
                    "serverInfo": {"name": "jamiat-tracker", "version": "0.1.0"}
                }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let result = client.mcp().initialize().await.unwrap();
        assert_eq!(result.server_info.name, "jamiat-tracker");
        assert_eq!(result.protocol_version, "2025-06-18");
    }

    #[tokio::test]
    async fn test_call_tool_returns_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({
                "method": "tools/call",
                "params": {"name": "get_project", "arguments": {"project_id": "jamiat"}}
            })))
            .respond_with(rpc_ok(
                1,
                json!({"content": [{"type": "text", "text": "{\"name\": \"Jamiat\"}"}]}),
            ))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let result = client
            .mcp()
            .call_tool("get_project", json!({"project_id": "jamiat"}))
            .await
            .unwrap();
        assert_eq!(result.joined_text(), "{\"name\": \"Jamiat\"}");
    }

    #[tokio::test]
    async fn test_rpc_error_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32602, "message": "unknown tool: nope"}
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let err = client.mcp().call_tool("nope", json!({})).await.unwrap_err();
        match err {
            TrackerError::Rpc { code, message, .. } => {
                assert_eq!(code, -32602);
                assert_eq!(message, "unknown tool: nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_list_tools_preserves_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(rpc_ok(
                1,
                json!({"tools": [
                    {"name": "get_project", "description": "d", "inputSchema": {"type": "object"}},
                    {"name": "list_projects", "description": "d", "inputSchema": {"type": "object"}}
                ]}),
            ))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let names: Vec<_> = client
            .mcp()
            .list_tools()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["get_project", "list_projects"]);
    }

    #[tokio::test]
    async fn test_empty_response_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1})))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let err = client.mcp().list_resources().await.unwrap_err();
        assert!(matches!(err, TrackerError::EmptyResponse(ref m) if m == "resources/list"));
    }

    async fn retrying_client(server: &MockServer) -> TrackerClient {
        TrackerClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig {
                max_retries: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(5),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_only_tool_calls_are_non_idempotent() {
        assert!(!is_idempotent("tools/call"));
        for method in ["initialize", "ping", "tools/list", "resources/read", "prompts/get"] {
            assert!(is_idempotent(method), "{method}");
        }
    }

    #[tokio::test]
    async fn test_tool_call_not_resent_after_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "tools/call"})))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = retrying_client(&server).await;
        let err = client.mcp().call_tool("get_total_cost", json!({})).await.unwrap_err();
        assert!(matches!(err, TrackerError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_list_tools_resent_after_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(rpc_ok(1, json!({"tools": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = retrying_client(&server).await;
        assert!(client.mcp().list_tools().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rpc_internal_error_not_resent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32603, "message": "tool 'get_total_cost' found malformed data"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = retrying_client(&server).await;
        let err = client.mcp().list_tools().await.unwrap_err();
        assert!(matches!(err, TrackerError::Rpc { code: -32603, .. }));
    }

    #[tokio::test]
    async fn test_read_resource_wire_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({
                "jsonrpc": "2.0",
                "method": "resources/read",
                "params": {"uri": "tracker://projects/all"}
            })))
            .respond_with(rpc_ok(
                1,
                json!({"contents": [{
                    "uri": "tracker://projects/all",
                    "mimeType": "application/json",
                    "text": "{\"jamiat\": {}}"
                }]}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let result = client.mcp().read_resource("tracker://projects/all").await.unwrap();
        assert_eq!(result.contents.len(), 1);
        assert_eq!(result.contents[0].mime_type.as_deref(), Some("application/json"));
        assert!(result.contents[0].text.contains("jamiat"));
    }

    #[tokio::test]
    async fn test_resource_not_found_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32002, "message": "Resource not found", "data": {"uri": "tracker://nope"}}
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        match client.mcp().read_resource("tracker://nope").await.unwrap_err() {
            TrackerError::Rpc { code, data, .. } => {
                assert_eq!(code, -32002);
                assert_eq!(data, Some(json!({"uri": "tracker://nope"})));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_prompts_wire_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "prompts/list"})))
            .respond_with(rpc_ok(
                1,
                json!({"prompts": [{"name": "monthly_report", "description": "Monthly IT report"}]}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({
                "method": "prompts/get",
                "params": {"name": "monthly_report"}
            })))
            .respond_with(rpc_ok(
                2,
                json!({
                    "description": "Monthly IT report",
                    "messages": [{"role": "user", "content": {"type": "text", "text": "Write the report"}}]
                }),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let prompts = client.mcp().list_prompts().await.unwrap();
        assert_eq!(prompts[0].name, "monthly_report");
        assert!(prompts[0].arguments.is_empty());

        let prompt = client.mcp().get_prompt("monthly_report").await.unwrap();
        assert_eq!(prompt.messages[0].role, "user");
        assert_eq!(
            prompt.messages[0].content,
            tracker_mcp::protocol::ToolContent::text("Write the report")
        );
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "ping", "id": 1})))
            .respond_with(rpc_ok(1, json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        client.mcp().ping().await.unwrap();
    }
}
