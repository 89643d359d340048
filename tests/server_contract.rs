use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use yt_transcript_extractor::server::build_router;
use yt_transcript_extractor::{
    ExtractionError, ExtractorRegistry, RawTranscript, TranscriptExtractor, TranscriptPipeline, VideoId,
};

/// Answers only for one video, fails for everything else
struct StubExtractor {
    known: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TranscriptExtractor for StubExtractor {
    async fn attempt(&self, video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if video_id.as_str() == self.known {
            Ok(RawTranscript::new("hello [Music] world. it works", "stub"))
        } else {
            Err(ExtractionError::NoTranscriptData("nothing for this video".into()))
        }
    }

    fn name(&self) -> &'static str {
        "Stub"
    }
}

struct AlwaysFails;

#[async_trait]
impl TranscriptExtractor for AlwaysFails {
    async fn attempt(&self, _video_id: &VideoId) -> Result<RawTranscript, ExtractionError> {
        Err(ExtractionError::NoSubtitleFile)
    }

    fn name(&self) -> &'static str {
        "Never"
    }
}

async fn start_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut registry = ExtractorRegistry::new();
    registry.register(Box::new(AlwaysFails));
    registry.register(Box::new(StubExtractor {
        known: "dQw4w9WgXcQ",
        calls: calls.clone(),
    }));
    let pipeline = Arc::new(TranscriptPipeline::with_registry(registry));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(pipeline)).await.unwrap();
    });

    (addr, calls)
}

#[tokio::test]
async fn post_extract_returns_transcript() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, _) = start_server().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/extract", addr))
        .json(&json!({ "video_id": "https://youtu.be/dQw4w9WgXcQ" }))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], "dQw4w9WgXcQ");
    assert_eq!(body["transcript"], "Hello world. It works");
    assert_eq!(body["method_used"], "stub");
    assert_eq!(body["word_count"], 4);
    assert_eq!(body["character_count"], 21);
    assert!(body["timestamp"].is_string());
    assert!(body.get("errors").is_none());

    Ok(())
}

#[tokio::test]
async fn get_extract_matches_post() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, _) = start_server().await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/extract", addr))
        .query(&[("video_id", "dQw4w9WgXcQ")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["transcript"], "Hello world. It works");

    Ok(())
}

#[tokio::test]
async fn invalid_identifier_is_400_and_runs_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, calls) = start_server().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/extract", addr))
        .json(&json!({ "video_id": "not a url" }))
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body["detail"]["message"], "Invalid video ID or URL");
    assert_eq!(body["detail"]["error"], "Invalid YouTube URL or video ID: not a url");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn exhausted_methods_are_404_with_every_error() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, calls) = start_server().await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/extract", addr))
        .query(&[("video_id", "aaaaaaaaaaa")])
        .send()
        .await?;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await?;
    assert_eq!(body["detail"]["message"], "Could not extract transcript");
    assert_eq!(body["detail"]["video_id"], "aaaaaaaaaaa");
    assert_eq!(
        body["detail"]["errors"],
        json!([
            "Never: no subtitle files found",
            "Stub: no transcript data: nothing for this video"
        ])
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn health_endpoints() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, _) = start_server().await;
    let client = reqwest::Client::new();

    let health: Value = client.get(format!("http://{}/health", addr)).send().await?.json().await?;
    assert_eq!(health, json!({ "status": "ok" }));

    let info: Value = client.get(format!("http://{}/", addr)).send().await?.json().await?;
    assert_eq!(info["status"], "healthy");
    assert_eq!(info["service"], "YouTube Transcript Extractor API");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));

    Ok(())
}

#[tokio::test]
async fn cors_headers_and_preflight() -> Result<(), Box<dyn std::error::Error>> {
    let (addr, _) = start_server().await;
    let client = reqwest::Client::new();

    let response = client.get(format!("http://{}/health", addr)).send().await?;
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/extract", addr))
        .header("Origin", "http://localhost:5678")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert_eq!(preflight.status(), 204);
    assert_eq!(preflight.headers()["access-control-allow-origin"], "*");
    assert!(preflight.headers()["access-control-allow-methods"]
        .to_str()?
        .contains("POST"));

    Ok(())
}
