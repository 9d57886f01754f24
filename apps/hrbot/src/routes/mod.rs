pub mod chat;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant API
        .route("/api/v1/chat", post(chat::handle_chat))
        .route("/api/v1/query", post(chat::handle_query))
        .route("/api/v1/history", get(chat::handle_history))
        // Admin
        .route("/api/v1/ingest", post(chat::handle_reingest))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::assistant::Assistant;
    use crate::config::Config;
    use crate::embedding::Embedder;
    use crate::ingest::splitter::TextSplitter;
    use crate::ingest::IngestionStage;
    use crate::intent::IntentClassifier;
    use crate::rag::engine::QueryEngine;
    use crate::rag::fallback::FallbackPolicy;
    use crate::rag::history::ConversationLog;
    use crate::rag::ontology::Ontology;
    use crate::testing::{BrokenEmbedder, FixtureLoader, ScriptedLlm, TopicEmbedder};
    use crate::vector_store::{JsonVectorStore, VectorIndex};

    struct TestApp {
        _dir: tempfile::TempDir,
        router: Router,
        llm: Arc<ScriptedLlm>,
    }

    async fn test_app(embedder: Arc<dyn Embedder>, llm: ScriptedLlm) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("policy.pdf"), b"%PDF-1.4").unwrap();

        let config = Config::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("gsk_test".to_string()),
            _ => None,
        })
        .unwrap();

        let index: Arc<dyn VectorIndex> = Arc::new(
            JsonVectorStore::open(dir.path().join("hr_documents.json"))
                .await
                .unwrap(),
        );
        let llm = Arc::new(llm);
        let log = Arc::new(ConversationLog::new());
        let engine = QueryEngine::new(
            embedder.clone(),
            index.clone(),
            llm.clone(),
            FallbackPolicy::new(llm.clone(), Ontology::default(), log.clone()),
            log,
            config.retrieval(),
        );
        let ingestion = IngestionStage::new(
            data_dir,
            TextSplitter::default(),
            Arc::new(FixtureLoader::new(&[(
                "policy.pdf",
                &["Annual leave is 20 working days per year."],
            )])),
            embedder,
            index.clone(),
        );

        let state = AppState {
            assistant: Arc::new(Assistant::new(IntentClassifier::new(), engine)),
            ingestion: Arc::new(ingestion),
            index,
            config,
        };

        TestApp {
            _dir: dir,
            router: build_router(state),
            llm,
        }
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_reports_indexed_chunks() {
        let app = test_app(Arc::new(TopicEmbedder::new()), ScriptedLlm::answering("x")).await;
        let (status, body) = send(&app.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["indexed_chunks"], 0);
    }

    #[tokio::test]
    async fn test_chat_thanks_returns_acknowledgement() {
        let app = test_app(Arc::new(TopicEmbedder::new()), ScriptedLlm::answering("x")).await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/chat",
            Some(json!({"message": "thanks"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["answer"],
            "You're welcome 😊 Let me know if you need any help."
        );
        assert_eq!(body["intent"], "closing");
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_ingest_then_query_returns_sources_and_history() {
        let app = test_app(
            Arc::new(TopicEmbedder::new()),
            ScriptedLlm::answering("You get 20 working days."),
        )
        .await;

        let (status, report) = send(&app.router, "POST", "/api/v1/ingest", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["chunks"], 1);

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/query",
            Some(json!({"question": "How much annual leave do I get?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "answered");
        assert_eq!(body["answer"], "You get 20 working days.");
        assert_eq!(body["sources"], json!([{"source": "policy.pdf", "page": "0"}]));
        assert_eq!(body["history"].as_array().unwrap().len(), 1);

        let (_, history) = send(&app.router, "GET", "/api/v1/history", None).await;
        assert_eq!(
            history["records"][0]["question"],
            "How much annual leave do I get?"
        );
    }

    #[tokio::test]
    async fn test_escalated_query_has_empty_sources() {
        let app = test_app(Arc::new(TopicEmbedder::new()), ScriptedLlm::answering("x")).await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/query",
            Some(json!({"question": "How many sick leave days do I get?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "escalated");
        assert_eq!(
            body["answer"],
            "Please kindly visit Louisa at the HR office for proper assistance."
        );
        assert_eq!(body["sources"], json!([]));
        assert_eq!(body["history"][0]["sources"], json!([]));
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_query_rejects_blank_question() {
        let app = test_app(Arc::new(TopicEmbedder::new()), ScriptedLlm::answering("x")).await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/query",
            Some(json!({"question": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_embedding_outage_returns_polite_message() {
        let app = test_app(Arc::new(BrokenEmbedder), ScriptedLlm::answering("x")).await;
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/chat",
            Some(json!({"message": "How many sick leave days do I get?"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["error"]["message"],
            "HR system unavailable. Please try again."
        );
    }
}
