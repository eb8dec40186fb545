use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::provider::ImageProvider;
use crate::types::{GenerationRequest, ImageBatch};
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google AI Studio client for the Imagen `:predict` endpoint.
#[derive(Clone)]
pub struct Google {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Google {
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn model_path(model: &str) -> String {
        let model = model.trim();
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn models_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/models")
    }

    fn predict_url(&self, model: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = Self::model_path(model);
        format!("{base}/{path}:predict")
    }
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default, rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
}

fn decode_predictions(parsed: PredictResponse) -> Result<Vec<Bytes>> {
    let mut images = Vec::<Bytes>::with_capacity(parsed.predictions.len());
    for prediction in parsed.predictions {
        let Some(encoded) = prediction
            .bytes_base64_encoded
            .as_deref()
            .filter(|v| !v.trim().is_empty())
        else {
            return Err(Error::InvalidResponse(
                "prediction is missing bytesBase64Encoded".to_string(),
            ));
        };
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| Error::InvalidResponse(format!("invalid image base64: {err}")))?;
        images.push(Bytes::from(decoded));
    }
    Ok(images)
}

#[async_trait]
impl ImageProvider for Google {
    async fn list_models(&self) -> Result<Vec<String>> {
        let mut out = Vec::<String>::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .http
                .get(self.models_url())
                .header("x-goog-api-key", &self.api_key);
            if let Some(token) = page_token.as_deref() {
                req = req.query(&[("pageToken", token)]);
            }
            let response = req.send().await?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(Error::Api { status, body: text });
            }

            let parsed = response.json::<ListModelsResponse>().await?;
            out.extend(
                parsed
                    .models
                    .into_iter()
                    .map(|entry| entry.name)
                    .filter(|name| !name.trim().is_empty()),
            );

            match parsed.next_page_token.filter(|t| !t.trim().is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(out),
            }
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<ImageBatch> {
        let body = json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": { "sampleCount": request.variant_count.get() },
        });

        let url = self.predict_url(&request.model);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body: text });
        }

        let parsed = response.json::<PredictResponse>().await?;
        Ok(ImageBatch {
            images: decode_predictions(parsed)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_keeps_existing_prefix() {
        assert_eq!(
            Google::model_path("models/imagen-4.0-generate-001"),
            "models/imagen-4.0-generate-001"
        );
        assert_eq!(
            Google::model_path("imagen-4.0-generate-001"),
            "models/imagen-4.0-generate-001"
        );
    }

    #[test]
    fn predict_url_strips_trailing_slash() {
        let client = Google::new("key").with_base_url("http://localhost:1/v1beta/");
        assert_eq!(
            client.predict_url("imagen-3.0-generate-001"),
            "http://localhost:1/v1beta/models/imagen-3.0-generate-001:predict"
        );
    }

    #[test]
    fn decode_predictions_rejects_missing_payload() {
        let parsed = serde_json::from_str::<PredictResponse>(r#"{"predictions":[{}]}"#)
            .expect("parse json");
        let err = decode_predictions(parsed).expect_err("should reject empty prediction");
        match err {
            Error::InvalidResponse(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_predictions_returns_ordered_bytes() -> crate::Result<()> {
        let first = base64::engine::general_purpose::STANDARD.encode(b"one");
        let second = base64::engine::general_purpose::STANDARD.encode(b"two");
        let parsed = serde_json::from_value::<PredictResponse>(serde_json::json!({
            "predictions": [
                { "bytesBase64Encoded": first },
                { "bytesBase64Encoded": second },
            ]
        }))?;
        let images = decode_predictions(parsed)?;
        assert_eq!(images, vec![Bytes::from_static(b"one"), Bytes::from_static(b"two")]);
        Ok(())
    }
}
