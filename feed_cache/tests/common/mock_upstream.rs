//! Axum-based mock of an upstream site
//!
//! Each test starts its own server on an ephemeral port so hit counters never
//! leak between tests.

use axum::{Router, extract::State, http::StatusCode, response::Html, routing::get};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Default)]
struct MockState {
    news_hits: Arc<AtomicUsize>,
    flaky_hits: Arc<AtomicUsize>,
    flaky_healthy: Arc<AtomicBool>,
}

pub struct MockUpstream {
    pub base_url: String,
    state: MockState,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = MockState::default();

        let app = Router::new()
            .route("/news", get(news))
            .route("/slow", get(slow))
            .route("/flaky", get(flaky))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Mock upstream has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock upstream crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requests served by /news and /slow
    pub fn news_hits(&self) -> usize {
        self.state.news_hits.load(Ordering::SeqCst)
    }

    pub fn flaky_hits(&self) -> usize {
        self.state.flaky_hits.load(Ordering::SeqCst)
    }

    pub fn set_flaky_healthy(&self, healthy: bool) {
        self.state.flaky_healthy.store(healthy, Ordering::SeqCst);
    }
}

/// A Next.js App Router page with one post in its flight data
pub fn news_page(title: &str) -> String {
    let payload = format!(
        r#"1:["$","$L2",null,{{"page":{{"sections":[{{"posts":[{{"title":"{title}","slug":{{"current":"hello"}},"directories":[{{"value":"news"}}],"publishedOn":"2025-05-22T00:00:00Z","summary":"First post"}}]}}]}}}}]"#
    );
    let literal = serde_json::to_string(&payload).expect("payload serializes");
    format!(
        "<html><body><h1>News</h1><script nonce=\"n0nce\">self.__next_f.push([1,{literal}])</script></body></html>"
    )
}

async fn news(State(state): State<MockState>) -> Html<String> {
    state.news_hits.fetch_add(1, Ordering::SeqCst);
    Html(news_page("Hello from upstream"))
}

async fn slow(State(state): State<MockState>) -> Html<String> {
    state.news_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    Html(news_page("Slow hello"))
}

async fn flaky(State(state): State<MockState>) -> Result<Html<String>, StatusCode> {
    state.flaky_hits.fetch_add(1, Ordering::SeqCst);
    if state.flaky_healthy.load(Ordering::SeqCst) {
        Ok(Html(news_page("Recovered")))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
