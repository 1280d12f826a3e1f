use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use feed_cache::{CACHE_ROUTE_EXPIRE, CacheKey, Feed, Memoizer};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::routes::{RouteError, anthropic};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) memo: Memoizer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RouteQuery {
    /// Skip cached output and upstream content, then re-warm both
    #[serde(default)]
    refresh: bool,
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(
        r#"<h1>demo-feeds</h1>
<ul>
  <li><a href="/anthropic/news">/anthropic/news</a></li>
  <li><a href="/anthropic/engineering">/anthropic/engineering</a></li>
</ul>"#,
    )
}

pub(crate) async fn anthropic_news(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Feed>, (StatusCode, String)> {
    render_route(&state, "/anthropic/news", query.refresh, anthropic::news).await
}

pub(crate) async fn anthropic_engineering(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Feed>, (StatusCode, String)> {
    render_route(
        &state,
        "/anthropic/engineering",
        query.refresh,
        anthropic::engineering,
    )
    .await
}

/// Serve a route's feed from the route cache, running the route on a miss
async fn render_route<F, Fut>(
    state: &AppState,
    path: &str,
    refresh: bool,
    route: F,
) -> Result<Json<Feed>, (StatusCode, String)>
where
    F: FnOnce(Memoizer, bool) -> Fut,
    Fut: Future<Output = Result<Feed, RouteError>>,
{
    let key = CacheKey::new(format!("route:{path}"))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let memo = state.memo.clone();

    let feed = state
        .memo
        .try_get(
            &key,
            || route(memo, refresh),
            Duration::from_secs(*CACHE_ROUTE_EXPIRE),
            !refresh,
        )
        .await
        .map_err(|e| {
            tracing::error!("Route {} failed: {}", path, e);
            (e.status_code(), e.to_string())
        })?;

    tracing::debug!("Route {} served {} items", path, feed.item.len());
    Ok(Json(feed))
}
