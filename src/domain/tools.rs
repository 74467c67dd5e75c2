//! Interactive tools exposed via Model Context Protocol
//!
//! Each tool maps to one notes operation. Operation failures come back as
//! `isError` tool results so the calling agent sees the message instead of a
//! protocol error.

use rust_mcp_sdk::{
    macros,
    schema::{CallToolRequestParams, CallToolResult, ContentBlock, TextContent, Tool},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::format::{
    format_deleted, format_note, format_note_list, format_note_not_found, format_system_info,
};
use crate::mcp::rpc::{json_rpc_error, json_rpc_error_with_data, json_rpc_result};
use crate::{errors::RpcClientError, notes::UpdateNoteParams, AppState};

#[macros::mcp_tool(
    name = "system_info",
    description = "Get the application's name, version, operating system and architecture"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SystemInfoTool {}

#[macros::mcp_tool(name = "list_notes", description = "List all notes")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListNotesTool {}

#[macros::mcp_tool(name = "get_note", description = "Get a note by its id")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetNoteTool {
    /// Id of the note
    pub id: String,
}

#[macros::mcp_tool(name = "create_note", description = "Create a new note")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CreateNoteTool {
    /// Title of the note
    pub title: String,
    /// Body text of the note
    pub content: String,
}

#[macros::mcp_tool(
    name = "update_note",
    description = "Update the title and/or content of an existing note; omitted fields are left unchanged"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct UpdateNoteTool {
    /// Id of the note
    pub id: String,
    /// New title
    pub title: Option<String>,
    /// New body text
    pub content: Option<String>,
}

#[macros::mcp_tool(name = "delete_note", description = "Delete a note by its id")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct DeleteNoteTool {
    /// Id of the note
    pub id: String,
}

pub fn build_tools_list() -> Vec<Tool> {
    vec![
        SystemInfoTool::tool(),
        ListNotesTool::tool(),
        GetNoteTool::tool(),
        CreateNoteTool::tool(),
        UpdateNoteTool::tool(),
        DeleteNoteTool::tool(),
    ]
}

struct ToolOutput {
    text: String,
    structured: Map<String, Value>,
}

impl ToolOutput {
    fn new<const N: usize>(text: String, fields: [(&str, Value); N]) -> Self {
        Self {
            text,
            structured: fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }
}

pub async fn handle_tools_call(
    state: &AppState,
    id: Option<Value>,
    params: Option<Value>,
) -> Value {
    let Some(raw_params) = params else {
        return json_rpc_error(id, -32602, "Invalid params");
    };

    let tool_call: CallToolRequestParams = match serde_json::from_value(raw_params) {
        Ok(value) => value,
        Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
    };
    let tool_name = tool_call.name.clone();
    let arguments = Value::Object(tool_call.arguments.unwrap_or_default());
    let notes = &state.notes;

    let outcome = match tool_name.as_str() {
        "system_info" => notes.system_info().await.map(|info| {
            ToolOutput::new(format_system_info(&info), [("system_info", json!(info))])
        }),
        "list_notes" => notes.list_notes().await.map(|list| {
            ToolOutput::new(
                format_note_list(&list),
                [("total", json!(list.len())), ("notes", json!(list))],
            )
        }),
        "get_note" => {
            let args: GetNoteTool = match parse_arguments(arguments) {
                Ok(args) => args,
                Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
            };
            notes.get_note(args.id.clone()).await.map(|note| match note {
                Some(note) => ToolOutput::new(
                    format_note(&note),
                    [("found", json!(true)), ("note", json!(note))],
                ),
                None => ToolOutput::new(
                    format_note_not_found(&args.id),
                    [("found", json!(false)), ("note", Value::Null)],
                ),
            })
        }
        "create_note" => {
            let args: CreateNoteTool = match parse_arguments(arguments) {
                Ok(args) => args,
                Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
            };
            notes.create_note(args.title, args.content).await.map(|note| {
                ToolOutput::new(
                    format!("Created note:\n{}", format_note(&note)),
                    [("note", json!(note))],
                )
            })
        }
        "update_note" => {
            let args: UpdateNoteTool = match parse_arguments(arguments) {
                Ok(args) => args,
                Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
            };
            let note_id = args.id.clone();
            notes
                .update_note(UpdateNoteParams {
                    id: args.id,
                    title: args.title,
                    content: args.content,
                })
                .await
                .map(|note| match note {
                    Some(note) => ToolOutput::new(
                        format!("Updated note:\n{}", format_note(&note)),
                        [("found", json!(true)), ("note", json!(note))],
                    ),
                    None => ToolOutput::new(
                        format_note_not_found(&note_id),
                        [("found", json!(false)), ("note", Value::Null)],
                    ),
                })
        }
        "delete_note" => {
            let args: DeleteNoteTool = match parse_arguments(arguments) {
                Ok(args) => args,
                Err(_) => return json_rpc_error(id, -32602, "Invalid params"),
            };
            notes.delete_note(args.id.clone()).await.map(|deleted| {
                ToolOutput::new(format_deleted(&args.id, deleted), [("deleted", json!(deleted))])
            })
        }
        _ => {
            return json_rpc_error_with_data(
                id,
                -32601,
                "Method not found",
                Some(json!({
                    "code": "tool_not_found",
                    "message": "unknown tool name",
                    "details": {
                        "name": tool_name.clone(),
                    },
                })),
            )
        }
    };

    match outcome {
        Ok(output) => json_rpc_result(id, tool_success(output)),
        Err(err) => {
            warn!(tool = %tool_name, error = %err, "tool call failed");
            json_rpc_result(id, tool_failure(&err))
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(arguments)
}

fn tool_success(output: ToolOutput) -> Value {
    serde_json::to_value(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(output.text, None, None))],
        is_error: None,
        meta: None,
        structured_content: Some(output.structured),
    })
    .expect("tool result serialization")
}

fn tool_failure(err: &RpcClientError) -> Value {
    serde_json::to_value(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(
            format!("Error: {err}"),
            None,
            None,
        ))],
        is_error: Some(true),
        meta: None,
        structured_content: None,
    })
    .expect("tool error result serialization")
}
