use std::sync::Arc;

use rem_core::{Forge, ForgeError, SCHEMA_VERSION};
use rem_store::RecordStore;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

const DEFAULT_LIST_LIMIT: usize = 20;

#[derive(Clone)]
pub struct RemServer {
    forge: Arc<Forge>,
    store: Arc<Mutex<RecordStore>>,
    tool_router: ToolRouter<Self>,
}

impl RemServer {
    pub fn new(forge: Forge, store: RecordStore) -> Self {
        Self {
            forge: Arc::new(forge),
            store: Arc::new(Mutex::new(store)),
            tool_router: Self::tool_router(),
        }
    }

    /// Flush the archive WAL. Runs even when the runtime is shutting down,
    /// before `RecordStore::drop` gets a chance.
    pub async fn checkpoint_wal(&self) {
        let store = self.store.lock().await;
        if let Err(e) = store.checkpoint_truncate() {
            tracing::warn!("WAL checkpoint failed: {e}");
            return;
        }
        tracing::info!("WAL checkpoint complete");
    }

    fn json_result(value: &serde_json::Value) -> CallToolResult {
        CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(value).unwrap_or_default(),
        )])
    }
}

fn forge_error(e: ForgeError) -> McpError {
    match e {
        ForgeError::Input(msg) => McpError::invalid_params(msg, None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct ForgeRequest {
    /// Text describing an experience
    text: String,
    /// Optional context object, e.g. {"situational_context": "morning walk"}
    context: Option<serde_json::Value>,
    /// Archive the record (default true)
    save: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetRequest {
    /// Record id returned by rem_forge (TXT-...)
    rem_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListRequest {
    /// Maximum number of summaries (default 20)
    limit: Option<usize>,
}

#[tool_router]
impl RemServer {
    #[tool(
        description = "Forge an experiential record from a text. Returns the full record: clause segmentation, lexical anchors, noetic (intentional) mode, qualia signature, semantic vs phenomenal affect, multiscale and visualization views. The record is archived unless save is false."
    )]
    async fn rem_forge(
        &self,
        Parameters(req): Parameters<ForgeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let forge = Arc::clone(&self.forge);
        let context = req.context.unwrap_or(serde_json::Value::Null);
        let text = req.text;
        let record = tokio::task::spawn_blocking(move || forge.forge_value(&text, &context))
            .await
            .map_err(|e| McpError::internal_error(format!("forge task failed: {e}"), None))?
            .map_err(forge_error)?;

        if req.save.unwrap_or(true) {
            let store = self.store.lock().await;
            store
                .save_record(&record)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        }

        let value = serde_json::to_value(&record)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(Self::json_result(&value))
    }

    #[tool(description = "Fetch an archived experiential record by its rem_id.")]
    async fn rem_get(
        &self,
        Parameters(req): Parameters<GetRequest>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.store.lock().await;
        let record = store
            .get_record(&req.rem_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| {
                McpError::invalid_params(format!("record not found: {}", req.rem_id), None)
            })?;
        let value = serde_json::to_value(&record)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(Self::json_result(&value))
    }

    #[tool(
        description = "List archived records, newest first, as summaries (rem_id, created_at, intentional_mode, qualia_type, clause and anchor counts, narrative preview)."
    )]
    async fn rem_list(
        &self,
        Parameters(req): Parameters<ListRequest>,
    ) -> Result<CallToolResult, McpError> {
        let store = self.store.lock().await;
        let summaries = store
            .list_records(req.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(Self::json_result(&serde_json::json!({
            "records": summaries,
        })))
    }

    #[tool(
        description = "Archive statistics: total records, counts per intentional mode, and the active schema version, lexicon and anchor strategy."
    )]
    async fn rem_stats(&self) -> Result<CallToolResult, McpError> {
        let store = self.store.lock().await;
        let stats = store
            .stats()
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(Self::json_result(&serde_json::json!({
            "total": stats.total,
            "by_mode": stats.by_mode,
            "schema_version": SCHEMA_VERSION,
            "lexicon": self.forge.lexicon().tag(),
            "tier": self.forge.config().tier.as_str(),
            "anchor_strategy": self.forge.anchor_strategy(),
        })))
    }
}

#[tool_handler]
impl ServerHandler for RemServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "REMForge turns first-person descriptions of experience into structured experiential records.\n\n\
                 - rem_forge: forge a record from text (optionally with a context object). Archived by default.\n\
                 - rem_get: fetch an archived record by rem_id.\n\
                 - rem_list: recent records as summaries.\n\
                 - rem_stats: archive size and distribution of intentional modes."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_server() -> RemServer {
        let store = RecordStore::open_in_memory().unwrap();
        RemServer::new(Forge::default(), store)
    }

    fn text_from_result(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn parse_result(result: &CallToolResult) -> serde_json::Value {
        let text = text_from_result(result);
        serde_json::from_str(&text).expect("handler should return valid JSON")
    }

    async fn forge_text(server: &RemServer, text: &str) -> serde_json::Value {
        let result = server
            .rem_forge(Parameters(ForgeRequest {
                text: text.to_string(),
                context: None,
                save: None,
            }))
            .await
            .unwrap();
        parse_result(&result)
    }

    #[tokio::test]
    async fn test_rem_stats_empty() {
        let server = make_server();
        let json = parse_result(&server.rem_stats().await.unwrap());

        assert_eq!(json["total"], 0);
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
        assert_eq!(json["lexicon"], "en-1.0");
        assert_eq!(json["anchor_strategy"], "lexicon");
    }

    #[tokio::test]
    async fn test_rem_forge_returns_record_and_archives() {
        let server = make_server();
        let record = forge_text(&server, "I see a bright red light. I feel calm.").await;

        let rem_id = record["header"]["rem_id"].as_str().unwrap();
        assert!(rem_id.starts_with("TXT-"));
        assert_eq!(record["noetic_layer"]["intentional_mode"], "perception");
        assert_eq!(
            record["semantic_contamination"]["invariance_under_semantic_permutation"]["status"],
            "unimplemented"
        );

        let stats = parse_result(&server.rem_stats().await.unwrap());
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["by_mode"]["perception"], 1);
    }

    #[tokio::test]
    async fn test_rem_forge_with_context() {
        let server = make_server();
        let result = server
            .rem_forge(Parameters(ForgeRequest {
                text: "I walked home.".to_string(),
                context: Some(serde_json::json!({"situational_context": "evening"})),
                save: Some(false),
            }))
            .await
            .unwrap();
        let record = parse_result(&result);

        assert_eq!(record["header"]["context"]["situational_context"], "evening");
        assert!(
            record["experiential_stream"]["narrative_enriched"]
                .as_str()
                .unwrap()
                .starts_with("[Context: evening]")
        );

        let stats = parse_result(&server.rem_stats().await.unwrap());
        assert_eq!(stats["total"], 0, "save=false must not archive");
    }

    #[tokio::test]
    async fn test_rem_forge_rejects_non_object_context() {
        let server = make_server();
        let result = server
            .rem_forge(Parameters(ForgeRequest {
                text: "calm".to_string(),
                context: Some(serde_json::json!("not an object")),
                save: None,
            }))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rem_forge_empty_text() {
        let server = make_server();
        let record = forge_text(&server, "").await;
        assert_eq!(
            record["experiential_stream"]["clause_boundaries"]
                .as_array()
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn test_rem_get_roundtrip() {
        let server = make_server();
        let record = forge_text(&server, "I remember the cold room.").await;
        let rem_id = record["header"]["rem_id"].as_str().unwrap().to_string();

        let result = server
            .rem_get(Parameters(GetRequest {
                rem_id: rem_id.clone(),
            }))
            .await
            .unwrap();
        let fetched = parse_result(&result);
        assert_eq!(fetched["header"]["rem_id"], rem_id.as_str());
        assert_eq!(fetched["noetic_layer"], record["noetic_layer"]);
    }

    #[tokio::test]
    async fn test_rem_get_missing() {
        let server = make_server();
        let result = server
            .rem_get(Parameters(GetRequest {
                rem_id: "TXT-nope".to_string(),
            }))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rem_list_limit() {
        let server = make_server();
        for text in ["I see red.", "I hear a bell.", "I feel calm."] {
            forge_text(&server, text).await;
        }

        let all = parse_result(
            &server
                .rem_list(Parameters(ListRequest { limit: None }))
                .await
                .unwrap(),
        );
        assert_eq!(all["records"].as_array().unwrap().len(), 3);

        let one = parse_result(
            &server
                .rem_list(Parameters(ListRequest { limit: Some(1) }))
                .await
                .unwrap(),
        );
        let records = one["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0]["rem_id"].as_str().unwrap().starts_with("TXT-"));
    }

    #[tokio::test]
    async fn test_checkpoint_in_memory_is_harmless() {
        let server = make_server();
        server.checkpoint_wal().await;
        let stats = parse_result(&server.rem_stats().await.unwrap());
        assert_eq!(stats["total"], 0);
    }
}
