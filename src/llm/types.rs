use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.5-flash-lite", "gemini-2.5-flash", "gemini-1.5-flash"];

/// Everything the service layer needs, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Candidate models, tried in order until one succeeds.
    pub models: Vec<String>,
    /// How long to wait between checks while an uploaded file is still processing.
    pub poll_interval: Duration,
    /// Status checks allowed before an upload that never becomes `ACTIVE` is abandoned.
    pub max_poll_attempts: u32,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 60,
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Reads `GEMINI_API_KEY` and, optionally, a comma-separated `GEMINI_MODELS`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok()?;
        let config = Self::new(api_key);
        match std::env::var("GEMINI_MODELS") {
            Ok(models) => {
                let models: Vec<String> = models
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect();
                if models.is_empty() {
                    Some(config)
                } else {
                    Some(config.with_models(models))
                }
            }
            Err(_) => Some(config),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractionEvent {
    Starting,
    Downloading { url: String },
    Uploading { filename: String },
    Prompting { document: String, model: String },
    ModelFailed { model: String, error: String },
    DocumentExtracted { document: String, years: Vec<String> },
    ComputingRatios,
    Success,
    Failed { reason: String },
}

/// A file that has been uploaded to the Gemini Files API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub uri: String,
    pub name: String,
    pub display_name: String,
    pub mime_type: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    pub fn user_with_files(text: impl Into<String>, documents: &[RemoteDocument]) -> Self {
        let mut parts = vec![Part::Text { text: text.into() }];
        parts.extend(documents.iter().map(|doc| Part::FileData {
            file_data: FileData {
                mime_type: doc.mime_type.clone(),
                file_uri: doc.uri.clone(),
            },
        }));
        Self {
            role: "user".to_string(),
            parts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}
