// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maps the endpoint table onto MCP resources and tools.

use crate::error::{AppError, Result};
use crate::mcp::protocol::{
    CallToolResult, ReadResourceResult, ResourceContents, ResourceSchema, ToolSchema,
};
use crate::models::{DateRange, Endpoint};
use crate::services::WhoopClient;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

/// Name of the combined profile + body measurement tool.
pub const PERSONAL_INFO_TOOL: &str = "get_personal_info";

const JSON_MIME_TYPE: &str = "application/json";

/// A protocol-visible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `whoop://{name}`
    Resource(Endpoint),
    /// `get_{name}` taking `startDate`/`endDate`
    DateRangeTool(Endpoint),
    /// `get_personal_info`
    PersonalInfoTool,
}

/// Tool arguments for date-ranged endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeArgs {
    start_date: String,
    end_date: String,
}

/// Derive the capability set for a table of endpoints, in table order.
///
/// Every endpoint becomes a resource; date-ranged endpoints also become a
/// tool. Lookup keys are the resource URI and the tool name.
pub fn derive_capabilities(table: &[Endpoint]) -> Vec<(String, Capability)> {
    let mut capabilities: Vec<(String, Capability)> = table
        .iter()
        .map(|&e| (e.resource_uri(), Capability::Resource(e)))
        .collect();

    capabilities.extend(
        table
            .iter()
            .filter_map(|&e| e.tool_name().map(|name| (name, Capability::DateRangeTool(e)))),
    );

    capabilities
}

/// Registered resources and tools, backed by a [`WhoopClient`].
pub struct EndpointRegistry {
    client: WhoopClient,
    capabilities: Vec<(String, Capability)>,
}

impl EndpointRegistry {
    /// Register every known endpoint plus the personal info tool.
    pub fn new(client: WhoopClient) -> Self {
        let mut capabilities = derive_capabilities(&Endpoint::ALL);
        capabilities.push((PERSONAL_INFO_TOOL.to_string(), Capability::PersonalInfoTool));

        tracing::info!(count = capabilities.len(), "Capabilities registered");
        Self {
            client,
            capabilities,
        }
    }

    fn lookup(&self, key: &str) -> Option<Capability> {
        self.capabilities
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
    }

    pub fn list_resources(&self) -> Vec<ResourceSchema> {
        self.capabilities
            .iter()
            .filter_map(|(uri, capability)| match capability {
                Capability::Resource(endpoint) => Some(ResourceSchema {
                    uri: uri.clone(),
                    name: endpoint.name().to_string(),
                    description: resource_description(*endpoint),
                    mime_type: JSON_MIME_TYPE.to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.capabilities
            .iter()
            .filter_map(|(name, capability)| match capability {
                Capability::Resource(_) => None,
                Capability::DateRangeTool(endpoint) => Some(ToolSchema {
                    name: name.clone(),
                    description: format!(
                        "Get WHOOP {} data between startDate and endDate",
                        display_name(*endpoint)
                    ),
                    input_schema: date_range_schema(),
                }),
                Capability::PersonalInfoTool => Some(ToolSchema {
                    name: name.clone(),
                    description: "Get the WHOOP user's profile combined with body measurements"
                        .to_string(),
                    input_schema: json!({"type": "object", "properties": {}}),
                }),
            })
            .collect()
    }

    /// Read a `whoop://` resource.
    ///
    /// Date-ranged endpoints cover the seven days ending now.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let endpoint = match self.lookup(uri) {
            Some(Capability::Resource(endpoint)) => endpoint,
            _ => return Err(AppError::NotFound(uri.to_string())),
        };

        let data = if endpoint.requires_date_range() {
            let range = DateRange::last_week(Utc::now());
            self.client.fetch_endpoint(endpoint, Some(&range)).await?
        } else {
            self.client.fetch_endpoint(endpoint, None).await?
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: JSON_MIME_TYPE.to_string(),
                text: to_pretty_json(&data)?,
            }],
        })
    }

    /// Invoke a tool by name.
    ///
    /// Unknown tools and malformed arguments are `BadRequest`; session and
    /// upstream failures pass through unchanged.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let text = match self.lookup(name) {
            Some(Capability::DateRangeTool(endpoint)) => {
                let args: DateRangeArgs = serde_json::from_value(arguments)
                    .map_err(|e| AppError::BadRequest(format!("{}: {}", name, e)))?;
                let range = DateRange::new(args.start_date, args.end_date);
                let data = self.client.fetch_endpoint(endpoint, Some(&range)).await?;
                to_pretty_json(&data)?
            }
            Some(Capability::PersonalInfoTool) => {
                let info = self.client.fetch_personal_info().await?;
                to_pretty_json(&info)?
            }
            Some(Capability::Resource(_)) | None => {
                return Err(AppError::BadRequest(format!("Unknown tool: {}", name)))
            }
        };

        Ok(CallToolResult::text(text))
    }
}

fn display_name(endpoint: Endpoint) -> String {
    endpoint.name().replace('_', " ")
}

fn resource_description(endpoint: Endpoint) -> String {
    if endpoint.requires_date_range() {
        format!("WHOOP {} data for the last 7 days", display_name(endpoint))
    } else {
        format!("WHOOP {} data", display_name(endpoint))
    }
}

fn date_range_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "startDate": {"type": "string", "description": "Start of the range (ISO-8601)"},
            "endDate": {"type": "string", "description": "End of the range (ISO-8601)"}
        },
        "required": ["startDate", "endDate"]
    })
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.into()))
}
