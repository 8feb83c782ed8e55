//! MCP tool definitions for the regmcp server.

use std::sync::Arc;

use crate::registry::{ops, search};
use crate::server::types::*;
use regkit::{ErrorKind, RegError, RegResult, RegistryAccess};
use rmcp::handler::server::{router::tool::ToolRouter, wrapper::Parameters};
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Serialize;
use tracing::{error, info, warn, Level};

fn serialize_error(e: serde_json::Error) -> McpError {
    McpError::internal_error(format!("Failed to serialize response: {}", e), None)
}

/// Success result carrying `payload` as pretty-printed JSON.
fn json_result<T: Serialize>(payload: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(payload).map_err(serialize_error)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Caller mistakes (bad path, missing key or value) log at warn; everything else at error.
fn failure_level(err: &RegError) -> Level {
    match err.kind() {
        ErrorKind::InvalidPath | ErrorKind::NotFound => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Error result carrying `{"error", "kind"}`.
fn error_result(context: &str, err: &RegError) -> Result<CallToolResult, McpError> {
    if failure_level(err) == Level::WARN {
        warn!("{}: {}", context, err);
    } else {
        error!("{}: {}", context, err);
    }
    let text = serde_json::to_string(&ErrorPayload::from(err)).map_err(serialize_error)?;
    Ok(CallToolResult::error(vec![Content::text(text)]))
}

fn respond<T: Serialize>(context: &str, result: RegResult<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(payload) => json_result(&payload),
        Err(e) => error_result(context, &e),
    }
}

/// Read-only registry MCP server.
#[derive(Clone)]
pub struct RegistryServer {
    registry: Arc<dyn RegistryAccess>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RegistryServer {
    pub fn new(registry: Arc<dyn RegistryAccess>) -> Self {
        RegistryServer {
            registry,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Read one registry value. Fields: keyPath (full key path, e.g. HKEY_LOCAL_MACHINE\\SOFTWARE\\Microsoft\\Windows\\CurrentVersion; short hive names like HKLM are accepted), valueName (empty string for the default value). Returns {type, value}; binary values carry base64 in value plus a hex displayValue, multi-string values carry an array.")]
    async fn get_value(&self, Parameters(req): Parameters<ValueRequest>) -> Result<CallToolResult, McpError> {
        info!("Getting registry value: keyPath={}, valueName={}", req.key_path, req.value_name);
        respond(
            "Error getting registry value",
            ops::get_value(self.registry.as_ref(), &req.key_path, &req.value_name),
        )
    }

    #[tool(description = "List the names of the direct subkeys of a registry key. Fields: keyPath (full key path).")]
    async fn get_sub_keys(&self, Parameters(req): Parameters<KeyPathRequest>) -> Result<CallToolResult, McpError> {
        info!("Getting registry subkeys: keyPath={}", req.key_path);
        respond(
            "Error getting registry subkeys",
            ops::get_sub_keys(self.registry.as_ref(), &req.key_path),
        )
    }

    #[tool(description = "List every value of a registry key as an object of value name to data rendered as text. Fields: keyPath (full key path).")]
    async fn get_values(&self, Parameters(req): Parameters<KeyPathRequest>) -> Result<CallToolResult, McpError> {
        info!("Getting registry values: keyPath={}", req.key_path);
        respond(
            "Error getting registry values",
            ops::get_values(self.registry.as_ref(), &req.key_path),
        )
    }

    #[tool(description = "Find registry keys whose full path contains a pattern (case-insensitive). Fields: rootKeyPath (key to search under), searchPattern, maxDepth (optional, default 2, clamped to 1..5). Returns at most about 100 full key paths.")]
    async fn find_keys(&self, Parameters(req): Parameters<SearchRequest>) -> Result<CallToolResult, McpError> {
        info!(
            "Searching registry keys: rootKeyPath={}, searchPattern={}, maxDepth={}",
            req.root_key_path,
            req.search_pattern,
            req.depth()
        );
        respond(
            "Error searching registry keys",
            search::find_keys(self.registry.as_ref(), &req.root_key_path, &req.search_pattern, req.depth()),
        )
    }

    #[tool(description = "Find registry values whose name or data contains a pattern (case-insensitive). Fields: rootKeyPath (key to search under), searchPattern, maxDepth (optional, default 2, clamped to 1..3). Returns an object of full value path to data, at most about 100 entries.")]
    async fn find_values(&self, Parameters(req): Parameters<SearchRequest>) -> Result<CallToolResult, McpError> {
        info!(
            "Searching registry values: rootKeyPath={}, searchPattern={}, maxDepth={}",
            req.root_key_path,
            req.search_pattern,
            req.depth()
        );
        respond(
            "Error searching registry values",
            search::find_values(self.registry.as_ref(), &req.root_key_path, &req.search_pattern, req.depth()),
        )
    }

    #[tool(description = "Get the type of a registry value (String, ExpandString, Binary, DWord, MultiString, QWord, None or Unknown). Fields: keyPath (full key path), valueName (empty string for the default value).")]
    async fn get_value_type(&self, Parameters(req): Parameters<ValueRequest>) -> Result<CallToolResult, McpError> {
        info!("Getting registry value type: keyPath={}, valueName={}", req.key_path, req.value_name);
        match ops::get_value_type(self.registry.as_ref(), &req.key_path, &req.value_name) {
            Ok(kind) => Ok(CallToolResult::success(vec![Content::text(kind.name())])),
            Err(e) => error_result("Error getting registry value type", &e),
        }
    }
}

#[tool_handler]
impl ServerHandler for RegistryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "regmcp: read-only Windows Registry access. \
                 Key paths start with a hive name (HKEY_LOCAL_MACHINE, HKEY_CURRENT_USER, \
                 HKEY_CLASSES_ROOT, HKEY_USERS, HKEY_CURRENT_CONFIG or HKLM/HKCU/HKCR/HKU/HKCC) \
                 followed by backslash-separated subkeys.\n\
                 Use get_sub_keys and get_values to browse, get_value or get_value_type for a single value.\n\
                 find_keys and find_values search a subtree by case-insensitive substring; \
                 results are capped at about 100 entries, so narrow the root or pattern when a search fills up.\n\
                 Errors come back as {\"error\", \"kind\"} with kind one of invalid_path, not_found, \
                 access_denied, os_failure."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
