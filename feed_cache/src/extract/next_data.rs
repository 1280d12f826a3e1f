use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::errors::ExtractError;

/// `self.__next_f.push([<n>, "<escaped payload>"])`
static FLIGHT_PUSH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"self\.__next_f\.push\(\[\s*(\d+)\s*,\s*"((?:[^"\\]|\\.)*)"\s*\]\)"#)
        .expect("flight push pattern must compile")
});

static NONCE_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[nonce]").expect("nonce script selector must parse")
});

static NEXT_DATA_SCRIPT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script#__NEXT_DATA__").expect("__NEXT_DATA__ selector must parse")
});

/// Collect the objects streamed by the Next.js App Router
///
/// Only `<script>` tags with a non-empty `nonce` are inspected. Each
/// `self.__next_f.push` chunk is unescaped, the `id:` prefix is dropped, and the
/// first JSON object inside the remaining array is kept. Chunks that are not
/// JSON (module references, plain text) are skipped.
pub fn extract_next_flight_objects(html: &str) -> Vec<Map<String, Value>> {
    let document = Html::parse_document(html);
    let mut objects = Vec::new();

    for script in document.select(&NONCE_SCRIPT) {
        let has_nonce = script
            .value()
            .attr("nonce")
            .is_some_and(|n| !n.trim().is_empty());
        if !has_nonce {
            continue;
        }

        let code: String = script.text().collect();
        for caps in FLIGHT_PUSH.captures_iter(&code) {
            if let Some(object) = decode_flight_chunk(&caps[2]) {
                objects.push(object);
            }
        }
    }

    tracing::debug!("Extracted {} flight objects", objects.len());
    objects
}

fn decode_flight_chunk(escaped: &str) -> Option<Map<String, Value>> {
    // The payload is a JSON string literal body; let serde undo the escaping
    let unescaped: String = serde_json::from_str(&format!("\"{escaped}\"")).ok()?;

    let (_, payload) = unescaped.split_once(':')?;
    match serde_json::from_str::<Value>(payload.trim()).ok()? {
        Value::Array(values) => values.into_iter().find_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        }),
        _ => None,
    }
}

/// Parse the `<script id="__NEXT_DATA__">` blob of a Pages Router site
pub fn extract_next_data(html: &str) -> Result<Value, ExtractError> {
    let document = Html::parse_document(html);
    let script = document
        .select(&NEXT_DATA_SCRIPT)
        .next()
        .ok_or_else(|| ExtractError::NotFound("script#__NEXT_DATA__".to_string()))?;

    let raw: String = script.text().collect();
    if raw.trim().is_empty() {
        return Err(ExtractError::NotFound(
            "script#__NEXT_DATA__ is empty".to_string(),
        ));
    }

    Ok(serde_json::from_str(raw.trim())?)
}
