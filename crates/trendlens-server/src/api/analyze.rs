use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use trendlens_core::cache::cache_key;

use super::AppState;
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    /// Target page URLs. The legacy single-URL field is folded in when the
    /// list is absent.
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default = "default_facet")]
    season: String,
    #[serde(default = "default_facet")]
    categories: String,
}

fn default_facet() -> String {
    "todos".to_string()
}

impl AnalyzeRequest {
    fn expanded_urls(&self) -> Vec<String> {
        let urls = if self.urls.is_empty() {
            self.url.clone().into_iter().collect()
        } else {
            self.urls.clone()
        };
        urls.into_iter().filter(|u| !u.trim().is_empty()).collect()
    }
}

/// Request-level failure envelope. Per-URL failures never reach this: they
/// degrade to smaller product lists inside the pipeline.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: String,
    details: String,
}

fn request_error(error: &str, details: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope {
            error: error.to_string(),
            details: details.into(),
        }),
    )
        .into_response()
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    // Body-parse failures get the same envelope as every other request-level
    // failure instead of axum's plain-text rejection.
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return request_error("Invalid request body", rejection.body_text());
        }
    };

    let urls = request.expanded_urls();
    if urls.is_empty() {
        return request_error(
            "At least one URL is required",
            "provide `urls` (list) or the legacy `url` field",
        );
    }

    if !state.analyzer.has_credential() {
        tracing::error!(request_id = %req_id.0, "extraction credential not configured");
        return request_error(
            "LLM API key not configured",
            "set TRENDLENS_LLM_API_KEY on the server",
        );
    }

    let key = cache_key(&urls, &request.season, &request.categories);
    if let Some(cached) = state.cache.get(&key) {
        tracing::info!(request_id = %req_id.0, urls = urls.len(), "cache hit");
        return Json(cached).into_response();
    }

    tracing::info!(
        request_id = %req_id.0,
        urls = urls.len(),
        season = %request.season,
        categories = %request.categories,
        "starting analysis"
    );

    let response = state
        .analyzer
        .analyze(&urls, &request.season, &request.categories)
        .await;
    state.cache.put(&key, response.clone());

    Json(response).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_urls_prefers_the_list() {
        let request = AnalyzeRequest {
            urls: vec!["https://a.example".to_string()],
            url: Some("https://legacy.example".to_string()),
            season: default_facet(),
            categories: default_facet(),
        };
        assert_eq!(request.expanded_urls(), vec!["https://a.example".to_string()]);
    }

    #[test]
    fn expanded_urls_falls_back_to_legacy_field() {
        let request = AnalyzeRequest {
            urls: vec![],
            url: Some("https://legacy.example".to_string()),
            season: default_facet(),
            categories: default_facet(),
        };
        assert_eq!(
            request.expanded_urls(),
            vec!["https://legacy.example".to_string()]
        );
    }

    #[test]
    fn expanded_urls_drops_blank_entries() {
        let request = AnalyzeRequest {
            urls: vec!["  ".to_string(), String::new()],
            url: None,
            season: default_facet(),
            categories: default_facet(),
        };
        assert!(request.expanded_urls().is_empty());
    }

    #[test]
    fn request_defaults_facets_to_todos() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"urls": ["https://a.example"]}"#).expect("parse");
        assert_eq!(request.season, "todos");
        assert_eq!(request.categories, "todos");
    }
}
