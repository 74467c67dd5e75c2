//! Line-delimited stdio transport for MCP
//!
//! Each inbound line is one JSON-RPC message (or batch); each response is
//! written as one line of JSON followed by a flush.

use serde_json::Value;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::mcp::{
    rpc::{json_rpc_error, PARSE_ERROR},
    server::handle_json_rpc_payload,
};
use crate::AppState;

pub async fn serve_stdio(state: AppState) -> io::Result<()> {
    info!("mcp stdio server starting");
    serve_lines(&state, BufReader::new(io::stdin()), io::stdout()).await?;
    info!("stdin closed, mcp stdio server stopping");
    Ok(())
}

pub async fn serve_lines<R, W>(state: &AppState, reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(trimmed) {
            Ok(payload) => handle_json_rpc_payload(state, payload).await,
            Err(err) => {
                warn!(error = %err, "failed to parse mcp message");
                Some(json_rpc_error(None, PARSE_ERROR, "Parse error"))
            }
        };

        if let Some(response) = response {
            write_message(&mut writer, &response).await?;
        }
    }

    writer.flush().await
}

async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, message: &Value) -> io::Result<()> {
    let encoded = serde_json::to_string(message)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    debug!(bytes = encoded.len(), "sending mcp response");

    writer.write_all(encoded.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::Value;

    use super::serve_lines;
    use crate::{notes::NotesApi, testing::InMemoryNotesServer, AppState};

    async fn run(input: &str) -> Vec<Value> {
        let state = AppState::new(None, NotesApi::new(Arc::new(InMemoryNotesServer::default())));
        let mut output = Vec::new();
        serve_lines(&state, input.as_bytes(), &mut output)
            .await
            .expect("serve lines");

        String::from_utf8(output)
            .expect("utf8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[tokio::test]
    async fn answers_requests_in_order() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test-client","version":"1.0.0"},"capabilities":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"create_note","arguments":{"title":"T","content":"C"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"list_notes","arguments":{}}}"#,
            "\n",
        );

        let responses = run(input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(
            responses[1]["result"]["structuredContent"]["note"]["title"],
            "T"
        );
        assert_eq!(responses[2]["id"], 3);
        assert_eq!(responses[2]["result"]["structuredContent"]["total"], 1);
    }

    #[tokio::test]
    async fn malformed_line_gets_parse_error() {
        let responses = run("{not json\n").await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
    }
}
