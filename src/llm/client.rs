use crate::error::{FinancialRatioError, Result};
use crate::llm::types::*;
use log::debug;
use reqwest::Client;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tokio::time::sleep;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_UPLOAD_URL: &str = "https://generativelanguage.googleapis.com/upload/v1beta/files";

static DOWNLOAD_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    /// Downloads a document into a fresh temporary file and returns its path. The caller owns
    /// the file and should remove it with [`remove_local_file`].
    pub async fn download_document(&self, url: &str) -> Result<PathBuf> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FinancialRatioError::ExtractionFailed(format!(
                "Could not download document (status {})",
                status
            )));
        }

        let bytes = res.bytes().await?;
        let path = std::env::temp_dir().join(format!(
            "statement-{}-{}.pdf",
            std::process::id(),
            DOWNLOAD_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&path, &bytes).await?;
        debug!("Downloaded {} bytes to {}", bytes.len(), path.display());

        Ok(path)
    }

    pub async fn upload_document(&self, path: &Path) -> Result<RemoteDocument> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                FinancialRatioError::ExtractionFailed("Invalid file name".to_string())
            })?;

        let file_size = fs::metadata(path).await?.len();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let file_bytes = fs::read(path).await?;

        let start_url = format!("{}?key={}", GEMINI_UPLOAD_URL, self.config.api_key);
        let metadata = json!({ "file": { "display_name": file_name } });

        let init_res = self
            .client
            .post(&start_url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", &mime_type)
            .header("Content-Type", "application/json")
            .json(&metadata)
            .send()
            .await?;

        let init_status = init_res.status();
        if !init_status.is_success() {
            let error_text = init_res.text().await?;
            return Err(FinancialRatioError::ExtractionFailed(format!(
                "Upload init failed (status {}): {}",
                init_status, error_text
            )));
        }

        let upload_url = init_res
            .headers()
            .get("x-goog-upload-url")
            .ok_or_else(|| {
                FinancialRatioError::ExtractionFailed("No upload URL in headers".to_string())
            })?
            .to_str()
            .map_err(|e| FinancialRatioError::ExtractionFailed(e.to_string()))?
            .to_string();

        let upload_res = self
            .client
            .post(&upload_url)
            .header("Content-Length", file_size.to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(file_bytes)
            .send()
            .await?;

        let upload_status = upload_res.status();
        if !upload_status.is_success() {
            let error_text = upload_res.text().await?;
            return Err(FinancialRatioError::ExtractionFailed(format!(
                "File upload failed (status {}): {}",
                upload_status, error_text
            )));
        }

        let upload_body: serde_json::Value = upload_res.json().await?;
        let file_obj = upload_body.get("file").ok_or_else(|| {
            FinancialRatioError::ExtractionFailed("Upload response missing 'file'".to_string())
        })?;

        let uri = required_str(file_obj, "uri")?;
        let name = required_str(file_obj, "name")?;
        let state = self.wait_until_active(&name, file_state(file_obj)).await?;

        Ok(RemoteDocument {
            uri,
            name,
            display_name: file_name.to_string(),
            mime_type,
            state,
        })
    }

    /// Polls the Files API until `name` is `ACTIVE`, giving up after `max_poll_attempts` checks.
    async fn wait_until_active(&self, name: &str, mut state: String) -> Result<String> {
        let mut attempts = 0;

        while !upload_ready(&state, attempts, self.config.max_poll_attempts)? {
            sleep(self.config.poll_interval).await;
            attempts += 1;

            let check_url = format!("{}/{}?key={}", self.base_url, name, self.config.api_key);
            let check_json: serde_json::Value =
                self.client.get(&check_url).send().await?.json().await?;
            state = file_state(check_json.get("file").unwrap_or(&check_json));
            debug!("File {} is {} after {} check(s)", name, state, attempts);
        }

        Ok(state)
    }

    pub async fn delete_document(&self, document: &RemoteDocument) -> Result<()> {
        let url = format!("{}/{}?key={}", self.base_url, document.name, self.config.api_key);
        let res = self.client.delete(&url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FinancialRatioError::ExtractionFailed(format!(
                "Deleting {} failed (status {})",
                document.name, status
            )));
        }
        Ok(())
    }

    /// Sends one prompt plus attached documents to `model` and returns the raw text reply.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        documents: &[RemoteDocument],
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.config.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user_with_files(prompt, documents)],
            system_instruction: None,
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(FinancialRatioError::ExtractionFailed(format!(
                "Gemini API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateContentResponse = res.json().await?;

        let text = body
            .candidates
            .ok_or_else(|| {
                FinancialRatioError::ExtractionFailed("No candidates returned".to_string())
            })?
            .into_iter()
            .next()
            .ok_or_else(|| {
                FinancialRatioError::ExtractionFailed("Empty candidates list".to_string())
            })?
            .content
            .parts
            .into_iter()
            .find_map(|part| match part {
                Part::Text { text } => Some(text),
                _ => None,
            })
            .ok_or_else(|| {
                FinancialRatioError::ExtractionFailed("Model returned no text content".to_string())
            })?;

        Ok(text.trim().to_string())
    }
}

pub async fn remove_local_file(path: &Path) -> Result<()> {
    if fs::try_exists(path).await? {
        fs::remove_file(path).await?;
    }
    Ok(())
}

fn file_state(file_obj: &serde_json::Value) -> String {
    file_obj
        .get("state")
        .and_then(|v| v.as_str())
        .unwrap_or("PROCESSING")
        .to_string()
}

/// `Ok(true)` once the upload is usable, `Ok(false)` while it is worth checking again.
fn upload_ready(state: &str, attempts: u32, max_attempts: u32) -> Result<bool> {
    match state {
        "ACTIVE" => Ok(true),
        "FAILED" => Err(FinancialRatioError::ExtractionFailed(
            "Google failed to process the file".to_string(),
        )),
        _ if attempts >= max_attempts => Err(FinancialRatioError::ExtractionFailed(format!(
            "File still {} after {} status checks",
            state, attempts
        ))),
        _ => Ok(false),
    }
}

fn required_str(obj: &serde_json::Value, key: &str) -> Result<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| {
            FinancialRatioError::ExtractionFailed(format!("Upload response missing {}", key))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remove_local_file_tolerates_missing_file() {
        let path = std::env::temp_dir().join(format!("missing-statement-{}.pdf", std::process::id()));
        assert!(remove_local_file(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_local_file_deletes_existing_file() {
        let path = std::env::temp_dir().join(format!("stale-statement-{}.pdf", std::process::id()));
        fs::write(&path, b"%PDF-1.4").await.unwrap();
        remove_local_file(&path).await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_upload_polling_gives_up() {
        assert!(upload_ready("ACTIVE", 0, 0).unwrap());
        assert!(!upload_ready("PROCESSING", 2, 3).unwrap());
        assert!(matches!(
            upload_ready("PROCESSING", 3, 3),
            Err(FinancialRatioError::ExtractionFailed(_))
        ));
        assert!(matches!(
            upload_ready("STATE_UNSPECIFIED", 5, 5),
            Err(FinancialRatioError::ExtractionFailed(_))
        ));
        assert!(upload_ready("FAILED", 0, 10).is_err());
    }

    #[test]
    fn test_file_state_defaults_to_processing() {
        assert_eq!(file_state(&json!({ "state": "ACTIVE" })), "ACTIVE");
        assert_eq!(file_state(&json!({ "name": "files/abc" })), "PROCESSING");
    }

    #[test]
    fn test_required_str() {
        let obj = json!({ "uri": "files/abc" });
        assert_eq!(required_str(&obj, "uri").unwrap(), "files/abc");
        assert!(required_str(&obj, "name").is_err());
    }
}
