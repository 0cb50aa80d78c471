//! Gemini client: Files API upload followed by a single `generateContent` call.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::retry::execute_with_retry;
use crate::{ApiKey, ImageRef, ModelConfig, ModelError, ReportModel};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// A file accepted by the provider, referenced by URI in the generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub uri: String,
    pub mime_type: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: UploadResponseFile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponseFile {
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP client for the Gemini generative language API.
pub struct GeminiClient {
    http: reqwest::Client,
    config: ModelConfig,
    api_key: ApiKey,
}

impl GeminiClient {
    /// Builds a client with the configured timeouts. The key is never logged.
    pub fn new(config: ModelConfig, api_key: ApiKey) -> Result<Self, ModelError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ModelError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    fn base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn upload_endpoint(&self) -> String {
        format!("{}/upload/v1beta/files", self.base())
    }

    fn generate_endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base(),
            self.config.model_name
        )
    }

    /// Uploads one image through the resumable protocol (`start`, then
    /// `upload, finalize` in a single chunk). Retried as one unit.
    pub async fn upload_file(&self, image: &ImageRef) -> Result<UploadedFile, ModelError> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| ModelError::ReadImage {
                path: image.path.clone(),
                source,
            })?;
        let display_name = display_name(&image.path);

        execute_with_retry(&self.config.retry, |_| {
            self.upload_once(&bytes, &image.mime_type, &display_name)
        })
        .await
        .into_result()
    }

    async fn upload_once(
        &self,
        bytes: &[u8],
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedFile, ModelError> {
        let start = self
            .http
            .post(self.upload_endpoint())
            .header(API_KEY_HEADER, self.api_key.expose())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ModelError::MalformedResponse("upload start returned no upload URL".into())
            })?;

        let finalize = self
            .http
            .post(upload_url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes.to_vec())
            .send()
            .await?;
        let finalize = check_status(finalize).await?;

        let parsed: UploadResponse = finalize
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(format!("upload response: {e}")))?;

        Ok(UploadedFile {
            uri: parsed.file.uri,
            mime_type: parsed
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    /// One `generateContent` call: the prompt part, then every file reference.
    pub async fn generate_from_files(
        &self,
        prompt: &str,
        files: &[UploadedFile],
    ) -> Result<String, ModelError> {
        let payload = build_generate_payload(prompt, files);

        let response = execute_with_retry(&self.config.retry, |_| {
            self.generate_once(&payload)
        })
        .await;

        if response.attempts > 1 {
            tracing::info!(attempts = response.attempts, "generation needed a retry");
        }
        let body = response.into_result()?;
        extract_text(body)
    }

    async fn generate_once(&self, payload: &Value) -> Result<Value, ModelError> {
        let response = self
            .http
            .post(self.generate_endpoint())
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(payload)
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(format!("generation response: {e}")))
    }
}

#[async_trait]
impl ReportModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn generate(&self, prompt: &str, images: &[ImageRef]) -> Result<String, ModelError> {
        let mut files = Vec::with_capacity(images.len());
        for image in images {
            let file = self.upload_file(image).await?;
            tracing::debug!(path = %image.path.display(), uri = %file.uri, "image uploaded");
            files.push(file);
        }

        tracing::info!(
            model = %self.config.model_name,
            images = files.len(),
            "requesting inspection report"
        );
        self.generate_from_files(prompt, &files).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ModelError::Status {
        status: status.as_u16(),
        body,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn build_generate_payload(prompt: &str, files: &[UploadedFile]) -> Value {
    let mut parts = Vec::with_capacity(files.len() + 1);
    parts.push(json!({ "text": prompt }));
    parts.extend(files.iter().map(|f| {
        json!({ "file_data": { "mime_type": f.mime_type, "file_uri": f.uri } })
    }));

    json!({ "contents": [{ "role": "user", "parts": parts }] })
}

/// Concatenated text parts of the first candidate, untouched.
fn extract_text(body: Value) -> Result<String, ModelError> {
    let parsed: GenerateResponse = serde_json::from_value(body)
        .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        Err(ModelError::EmptyResponse)
    } else {
        Ok(text)
    }
}
