//! www.anthropic.com news and engineering listings
//!
//! Both pages are Next.js App Router pages: the post lists live in the flight
//! data under `page.sections[].posts` (news) or `page.sections[].articles`
//! (engineering).

use feed_cache::{
    CacheKey, DataItem, ExtractError, Feed, Memoizer, extract_next_flight_objects, fetch_text,
};
use serde_json::Value;

use super::{RouteError, parse_date};

const BASE_URL: &str = "https://www.anthropic.com";

pub(crate) async fn news(memo: Memoizer, refresh: bool) -> Result<Feed, RouteError> {
    let link = format!("{BASE_URL}/news");
    let items = cached_listing(&memo, &link, refresh, parse_news).await?;

    let mut feed = Feed {
        title: "Anthropic News".to_string(),
        link,
        description: Some("Latest news from Anthropic".to_string()),
        image: None,
        item: items,
    };
    feed.sort_newest_first();
    Ok(feed)
}

pub(crate) async fn engineering(memo: Memoizer, refresh: bool) -> Result<Feed, RouteError> {
    let link = format!("{BASE_URL}/engineering");
    let items = cached_listing(&memo, &link, refresh, parse_engineering).await?;

    Ok(Feed {
        title: "Anthropic Engineering".to_string(),
        link,
        description: None,
        image: Some(format!("{BASE_URL}/images/icons/apple-touch-icon.png")),
        item: items,
    })
}

/// Fetch and parse `link`, memoized under the page URL for the content TTL
async fn cached_listing(
    memo: &Memoizer,
    link: &str,
    refresh: bool,
    parse: fn(&str) -> Result<Vec<DataItem>, RouteError>,
) -> Result<Vec<DataItem>, RouteError> {
    let key = CacheKey::new(link)?;
    memo.try_get(
        &key,
        || async move {
            let html = fetch_text(link).await?;
            parse(&html)
        },
        memo.config().default_ttl,
        !refresh,
    )
    .await
}

fn parse_news(html: &str) -> Result<Vec<DataItem>, RouteError> {
    collect_entries(html, "posts", |post| {
        let directory = post["directories"][0]["value"].as_str()?;
        let slug = post["slug"]["current"].as_str()?;
        Some(DataItem {
            title: post["title"].as_str()?.to_string(),
            link: format!("{BASE_URL}/{directory}/{slug}"),
            description: post["summary"].as_str().map(str::to_string),
            pub_date: post["publishedOn"].as_str().and_then(parse_date),
            image: post["cardPhoto"]["url"].as_str().map(str::to_string),
            author: None,
        })
    })
}

fn parse_engineering(html: &str) -> Result<Vec<DataItem>, RouteError> {
    collect_entries(html, "articles", |article| {
        let slug = article["slug"]["current"].as_str()?;
        Some(DataItem {
            title: article["title"].as_str()?.to_string(),
            link: format!("{BASE_URL}/engineering/{slug}"),
            description: article["summary"].as_str().map(str::to_string),
            pub_date: article["publishedOn"].as_str().and_then(parse_date),
            image: article["cardImage"]["url"].as_str().map(str::to_string),
            author: None,
        })
    })
}

/// Walk `page.sections[].<field>[]` of every flight chunk, mapping each entry
///
/// Entries missing a title or slug are skipped.
fn collect_entries(
    html: &str,
    field: &str,
    map: impl Fn(&Value) -> Option<DataItem>,
) -> Result<Vec<DataItem>, RouteError> {
    let chunks = extract_next_flight_objects(html);
    if chunks.is_empty() {
        return Err(ExtractError::NotFound("next data is undefined".to_string()).into());
    }

    let items = chunks
        .iter()
        .filter_map(|chunk| chunk.get("page")?.get("sections")?.as_array())
        .flatten()
        .filter_map(|section| section.get(field)?.as_array())
        .flatten()
        .filter_map(&map)
        .collect();

    Ok(items)
}
