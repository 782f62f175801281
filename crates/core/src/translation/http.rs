//! HTTP translation client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::TranslationConfig;

use super::error::TranslationError;
use super::traits::TranslationClient;
use super::types::{TranslationRequest, TranslationResult};

/// Request body of `POST {url}/Text`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextRequestBody<'a> {
    src_lang: &'a str,
    trg_lang: &'a str,
    domain: Option<&'a str>,
    text: &'a [String],
    text_type: u8,
}

#[derive(Debug, Deserialize)]
struct TextResponseBody {
    translations: Vec<TranslationItem>,
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    translation: String,
}

/// Translation client talking to the machine-translation REST API.
pub struct HttpTranslationClient {
    client: Client,
    base_url: String,
}

impl HttpTranslationClient {
    /// Create a new client from configuration.
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TranslationError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn text_url(&self) -> String {
        format!("{}/Text", self.base_url)
    }
}

#[async_trait]
impl TranslationClient for HttpTranslationClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate_batch(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let start = Instant::now();

        let body = TextRequestBody {
            src_lang: &request.source_lang,
            trg_lang: &request.target_lang,
            domain: request.domain.as_deref(),
            text: &request.texts,
            text_type: request.text_type.code(),
        };

        let response = self
            .client
            .post(self.text_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::GATEWAY_TIMEOUT {
            return Err(TranslationError::Timeout);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: TextResponseBody = response
            .json()
            .await
            .map_err(|e| TranslationError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        if parsed.translations.len() != request.texts.len() {
            return Err(TranslationError::MalformedResponse(format!(
                "expected {} translations, got {}",
                request.texts.len(),
                parsed.translations.len()
            )));
        }

        debug!(
            segments = request.texts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Translation received"
        );

        Ok(TranslationResult {
            translations: parsed
                .translations
                .into_iter()
                .map(|t| t.translation)
                .collect(),
            domain: parsed
                .domain
                .filter(|d| !d.trim().is_empty())
                .or_else(|| request.domain.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::TextType;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(url: String) -> HttpTranslationClient {
        HttpTranslationClient::new(&TranslationConfig {
            url,
            request_timeout_secs: 5,
            text_type: TextType::Document,
        })
        .unwrap()
    }

    fn request(texts: &[&str], domain: Option<&str>) -> TranslationRequest {
        TranslationRequest {
            source_lang: "en".to_string(),
            target_lang: "lv".to_string(),
            domain: domain.map(String::from),
            texts: texts.iter().map(|t| t.to_string()).collect(),
            text_type: TextType::Document,
        }
    }

    #[tokio::test]
    async fn test_translate_success_sends_wire_format() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        let app = Router::new().route(
            "/Text",
            post(move |Json(body): Json<Value>| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    let texts = body["text"].as_array().unwrap().clone();
                    *seen.lock().unwrap() = Some(body);
                    let translations: Vec<Value> = texts
                        .iter()
                        .map(|t| json!({ "translation": format!("<{}>", t.as_str().unwrap()) }))
                        .collect();
                    Json(json!({ "translations": translations, "domain": "general" }))
                }
            }),
        );
        let client = client_for(spawn(app).await);

        let result = client
            .translate_batch(&request(&["hello", "world"], None))
            .await
            .unwrap();

        assert_eq!(result.translations, vec!["<hello>", "<world>"]);
        assert_eq!(result.domain.as_deref(), Some("general"));

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["srcLang"], "en");
        assert_eq!(body["trgLang"], "lv");
        assert_eq!(body["domain"], Value::Null);
        assert_eq!(body["textType"], 1);
    }

    #[tokio::test]
    async fn test_missing_domain_stays_unresolved() {
        let app = Router::new().route(
            "/Text",
            post(|| async { Json(json!({ "translations": [{ "translation": "x" }], "domain": "" })) }),
        );
        let client = client_for(spawn(app).await);

        let unresolved = client
            .translate_batch(&request(&["hello"], None))
            .await
            .unwrap();
        assert_eq!(unresolved.domain, None);

        let supplied = client
            .translate_batch(&request(&["hello"], Some("legal")))
            .await
            .unwrap();
        assert_eq!(supplied.domain.as_deref(), Some("legal"));
    }

    #[tokio::test]
    async fn test_gateway_timeout_is_timeout() {
        let app = Router::new().route("/Text", post(|| async { AxumStatus::GATEWAY_TIMEOUT }));
        let client = client_for(spawn(app).await);

        let err = client
            .translate_batch(&request(&["hello"], Some("legal")))
            .await
            .unwrap_err();
        assert_eq!(err, TranslationError::Timeout);
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let app = Router::new().route(
            "/Text",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = client_for(spawn(app).await);

        let err = client
            .translate_batch(&request(&["hello"], None))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Http { status: 500, .. }));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_count_mismatch_is_malformed() {
        let app = Router::new().route(
            "/Text",
            post(|| async { Json(json!({ "translations": [], "domain": "general" })) }),
        );
        let client = client_for(spawn(app).await);

        let err = client
            .translate_batch(&request(&["hello"], None))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_failed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = client_for(url);
        let err = client
            .translate_batch(&request(&["hello"], None))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::RequestFailed(_)));
    }
}
