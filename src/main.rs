//! labq · question uniqueness and difficulty engine driver
//!
//! - Reads one JSON request per stdin line, writes one JSON reply per stdout line
//! - Optional OpenAI oracles (via environment variables); local heuristics otherwise
//!
//! Important env variables:
//!   OPENAI_API_KEY     : enables the OpenAI semantic/difficulty oracles if present
//!   OPENAI_BASE_URL    : default "https://api.openai.com/v1"
//!   OPENAI_MODEL       : default "gpt-4o-mini"
//!   LABQ_CONFIG_PATH   : path to TOML config (oracle limits, prompts, difficulty fallback)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use labq_engine::logic::handle_line;
use labq_engine::protocol::ServerMessage;
use labq_engine::state::Engine;
use labq_engine::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let engine = Engine::from_env();

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdout = tokio::io::stdout();
  info!(target: "labq_engine", "Reading requests from stdin");

  let mut handled = 0usize;
  while let Some(line) = lines.next_line().await? {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let reply = handle_line(&engine, line).await;
    if let ServerMessage::Error { message } = &reply {
      error!(target: "labq_engine", %message, "Rejected request line");
    }

    let mut out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    out.push('\n');
    stdout.write_all(out.as_bytes()).await?;
    stdout.flush().await?;
    handled += 1;
  }

  info!(target: "labq_engine", handled, "Input closed; exiting");
  Ok(())
}
