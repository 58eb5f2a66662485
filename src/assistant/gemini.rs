//! Gemini client for cover images and chat replies.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::assistant::{
    AssistantError, ChatBackend, CoverGenerator,
    chat::{ChatMessage, ChatRole},
};

/// Default Generative Language API address.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for connecting to the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API address, e.g. `"https://generativelanguage.googleapis.com"`.
    pub base_url: String,

    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,

    /// Model used for cover images.
    pub image_model: String,

    /// Model used for chat replies.
    pub chat_model: String,
}

impl GeminiConfig {
    /// Configuration for the public API with the default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    /// Point the client at another address.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:{method}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// HTTP client for the Gemini image and chat endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, AssistantError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(AssistantError::UnexpectedResponse(format!(
                "request failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CoverGenerator for GeminiClient {
    #[tracing::instrument(
        name = "assistant.gemini.generate_cover",
        skip(self, prompt),
        fields(model = %self.config.image_model),
        err
    )]
    async fn generate_cover(&self, prompt: &str) -> Result<String, AssistantError> {
        let url = self.config.model_url(&self.config.image_model, "predict");
        let response: PredictResponse = self.post(&url, &predict_request(prompt)).await?;

        image_data_url(response)
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    #[tracing::instrument(
        name = "assistant.gemini.reply",
        skip(self, system_instruction, history),
        fields(model = %self.config.chat_model, turns = history.len()),
        err
    )]
    async fn reply(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let url = self
            .config
            .model_url(&self.config.chat_model, "generateContent");

        let response: GenerateContentResponse = self
            .post(&url, &generate_content_request(system_instruction, history))
            .await?;

        reply_text(response)
    }
}

fn predict_request(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "instances": [{ "prompt": prompt }],
        "parameters": {
            "sampleCount": 1,
            "aspectRatio": "1:1",
            "outputOptions": { "mimeType": "image/jpeg" },
        },
    })
}

fn generate_content_request<'m>(
    system_instruction: &'m str,
    history: &'m [ChatMessage],
) -> GenerateContentRequest<'m> {
    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part {
                text: system_instruction,
            }],
        },
        contents: history
            .iter()
            .map(|message| Content {
                role: Some(message.role),
                parts: vec![Part {
                    text: &message.text,
                }],
            })
            .collect(),
    }
}

fn image_data_url(response: PredictResponse) -> Result<String, AssistantError> {
    let prediction = response
        .predictions
        .into_iter()
        .next()
        .ok_or(AssistantError::EmptyResponse)?;

    if prediction.bytes_base64_encoded.is_empty() {
        return Err(AssistantError::EmptyResponse);
    }

    let mime_type = prediction.mime_type.as_deref().unwrap_or("image/jpeg");

    Ok(format!(
        "data:{mime_type};base64,{}",
        prediction.bytes_base64_encoded
    ))
}

fn reply_text(response: GenerateContentResponse) -> Result<String, AssistantError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AssistantError::EmptyResponse)?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(AssistantError::EmptyResponse);
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'m> {
    system_instruction: Content<'m>,
    contents: Vec<Content<'m>>,
}

#[derive(Debug, Serialize)]
struct Content<'m> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<ChatRole>,
    parts: Vec<Part<'m>>,
}

#[derive(Debug, Serialize)]
struct Part<'m> {
    text: &'m str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: String,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn model_urls_include_model_and_method() {
        let config = GeminiConfig::new("key").with_base_url("http://localhost:8080/");

        assert_eq!(
            config.model_url(DEFAULT_IMAGE_MODEL, "predict"),
            "http://localhost:8080/v1beta/models/imagen-4.0-generate-001:predict"
        );
        assert_eq!(
            config.model_url(DEFAULT_CHAT_MODEL, "generateContent"),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn predict_request_asks_for_one_square_jpeg() {
        let body = predict_request("sleep,science");

        assert_eq!(body["instances"][0]["prompt"], "sleep,science");
        assert_eq!(body["parameters"]["sampleCount"], 1);
        assert_eq!(body["parameters"]["aspectRatio"], "1:1");
        assert_eq!(body["parameters"]["outputOptions"]["mimeType"], "image/jpeg");
    }

    #[test]
    fn chat_request_carries_instruction_and_roles() -> TestResult {
        let history = [
            ChatMessage::user("Hello"),
            ChatMessage::model("Greetings, traveller."),
            ChatMessage::user("What should I read?"),
        ];

        let body = serde_json::to_value(generate_content_request("Be wise.", &history))?;

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be wise.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "What should I read?");

        Ok(())
    }

    #[test]
    fn image_response_becomes_data_url() -> TestResult {
        let response: PredictResponse = serde_json::from_str(
            r#"{"predictions":[{"bytesBase64Encoded":"AAAA","mimeType":"image/jpeg"}]}"#,
        )?;

        assert_eq!(image_data_url(response)?, "data:image/jpeg;base64,AAAA");

        Ok(())
    }

    #[test]
    fn image_response_without_predictions_is_empty() -> TestResult {
        let response: PredictResponse = serde_json::from_str("{}")?;

        assert!(matches!(
            image_data_url(response),
            Err(AssistantError::EmptyResponse)
        ));

        Ok(())
    }

    #[test]
    fn reply_text_joins_parts() -> TestResult {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Read "},{"text":"slowly."}]}}]}"#,
        )?;

        assert_eq!(reply_text(response)?, "Read slowly.");

        Ok(())
    }

    #[test]
    fn reply_without_text_is_empty() -> TestResult {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#)?;

        assert!(matches!(
            reply_text(response),
            Err(AssistantError::EmptyResponse)
        ));

        Ok(())
    }
}
