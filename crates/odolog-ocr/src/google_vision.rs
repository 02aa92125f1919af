//! Google Cloud Vision API text extraction

use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{OcrError, TextExtractor};
use async_trait::async_trait;

/// Google Cloud Vision implementation of [`TextExtractor`]
pub struct GoogleVisionOcr {
    http_client: reqwest::Client,
    api_key: String,
    /// Overridable for tests against a local mock server.
    base_url: String,
}

impl Debug for GoogleVisionOcr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GoogleVisionOcr")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleVisionOcr {
    pub fn new(api_key: String, base_url: String) -> Result<Self, OcrError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OcrError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextExtractor for GoogleVisionOcr {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image);
        let request_body = json!({
            "requests": [{
                "image": { "content": image_base64 },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OcrError::Request(format!("Vision API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OcrError::Provider(format!(
                "Vision API returned {}: {}",
                status, error_text
            )));
        }

        let vision_response: VisionResponse = response
            .json()
            .await
            .map_err(|e| OcrError::Malformed(format!("Failed to parse Vision response: {}", e)))?;

        let text = parse_text(vision_response)?;

        tracing::debug!(
            text_chars = text.chars().count(),
            image_bytes = image.len(),
            "Vision text extraction completed"
        );

        Ok(text)
    }
}

/// Pick the detected text out of an annotate response.
///
/// Prefers the assembled `fullTextAnnotation`; falls back to the first
/// (whole-image) entry of `textAnnotations`. No text at all is an empty
/// string, but a provider-reported error fails the extraction.
fn parse_text(response: VisionResponse) -> Result<String, OcrError> {
    let Some(first) = response.responses.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.swap_remove(0))
        }
    }) else {
        return Ok(String::new());
    };

    if let Some(error) = first.error {
        return Err(OcrError::Provider(format!(
            "Vision API error {}: {}",
            error.code.unwrap_or_default(),
            error.message.unwrap_or_default()
        )));
    }

    if let Some(text) = first.full_text_annotation.and_then(|t| t.text) {
        return Ok(text);
    }

    Ok(first
        .text_annotations
        .and_then(|mut annotations| {
            if annotations.is_empty() {
                None
            } else {
                annotations.swap_remove(0).description
            }
        })
        .unwrap_or_default())
}

// Vision API response types, trimmed to what text detection returns
#[derive(Debug, Deserialize)]
struct VisionResponse {
    responses: Option<Vec<AnnotateImageResponse>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    text_annotations: Option<Vec<EntityAnnotation>>,
    error: Option<VisionError>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisionError {
    code: Option<i32>,
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, OcrError> {
        parse_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_prefers_full_text_annotation() {
        let text = parse(
            r#"{"responses": [{
                "fullTextAnnotation": {"text": "ODO 123456 km"},
                "textAnnotations": [{"description": "partial"}]
            }]}"#,
        )
        .unwrap();
        assert_eq!(text, "ODO 123456 km");
    }

    #[test]
    fn test_falls_back_to_first_text_annotation() {
        let text = parse(
            r#"{"responses": [{
                "textAnnotations": [
                    {"description": "123456"},
                    {"description": "123"}
                ]
            }]}"#,
        )
        .unwrap();
        assert_eq!(text, "123456");
    }

    #[test]
    fn test_no_text_is_empty_string() {
        assert_eq!(parse(r#"{"responses": [{}]}"#).unwrap(), "");
        assert_eq!(parse(r#"{"responses": []}"#).unwrap(), "");
        assert_eq!(parse(r#"{}"#).unwrap(), "");
    }

    #[test]
    fn test_provider_error_fails_extraction() {
        let err = parse(
            r#"{"responses": [{
                "error": {"code": 7, "message": "permission denied"}
            }]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, OcrError::Provider(_)));
    }
}
