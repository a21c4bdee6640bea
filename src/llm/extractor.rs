use crate::error::{FinancialRatioError, Result};
use crate::ingestion::{merge_statements, parse_statements};
use crate::llm::client::{remove_local_file, GeminiClient};
use crate::llm::prompts::{balance_sheet_prompt, ATTACHED_DOCUMENT_CONTEXT};
use crate::llm::types::*;
use crate::report::FinancialAnalysis;
use crate::response::extract_json;
use crate::schema::RawStatements;
use crate::RatioProcessor;
use futures::future::join_all;
use log::{info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::Sender;

/// Result of [`with_model_fallback`]: the winning model, its value, and every earlier failure.
#[derive(Debug)]
pub struct FallbackOutcome<T> {
    pub model: String,
    pub value: T,
    pub failures: Vec<(String, String)>,
}

/// Tries `attempt` with each model in order; the first success wins.
pub async fn with_model_fallback<T, F, Fut>(models: &[String], mut attempt: F) -> Result<FallbackOutcome<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures = Vec::new();

    for model in models {
        match attempt(model.clone()).await {
            Ok(value) => {
                return Ok(FallbackOutcome {
                    model: model.clone(),
                    value,
                    failures,
                })
            }
            Err(e) => {
                warn!("Model {} failed: {}", model, e);
                failures.push((model.clone(), e.to_string()));
            }
        }
    }

    Err(FinancialRatioError::AllModelsFailed {
        attempts: failures
            .into_iter()
            .map(|(model, error)| format!("{}: {}", model, error))
            .collect(),
    })
}

/// [`with_model_fallback`] that also emits a `ModelFailed` event for each failure as it happens.
pub async fn with_model_fallback_reporting<T, F, Fut>(
    models: &[String],
    progress: &Option<Sender<ExtractionEvent>>,
    mut attempt: F,
) -> Result<FallbackOutcome<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_model_fallback(models, |model| {
        let pending = attempt(model.clone());
        async move {
            let result = pending.await;
            if let (Err(e), Some(tx)) = (&result, progress) {
                let _ = tx
                    .send(ExtractionEvent::ModelFailed {
                        model,
                        error: e.to_string(),
                    })
                    .await;
            }
            result
        }
    })
    .await
}

/// Extracts per-year statements from documents (one per year) and computes their ratios.
pub struct StatementExtractor {
    client: GeminiClient,
    prompt: String,
}

impl StatementExtractor {
    pub fn new(client: GeminiClient) -> Result<Self> {
        Ok(Self {
            client,
            prompt: balance_sheet_prompt(ATTACHED_DOCUMENT_CONTEXT)?,
        })
    }

    /// Use a different extraction prompt (e.g. the income statement prompt).
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Asks the candidate models, in order, for the statements in one uploaded document. A
    /// reply with no recoverable JSON counts as a failed attempt.
    pub async fn extract_document(
        &self,
        document: &RemoteDocument,
        progress: &Option<Sender<ExtractionEvent>>,
    ) -> Result<RawStatements> {
        let docs = std::slice::from_ref(document);
        let outcome = with_model_fallback_reporting(self.client.models(), progress, |model| {
            let prompting = ExtractionEvent::Prompting {
                document: document.display_name.clone(),
                model: model.clone(),
            };
            async move {
                self.send_event(progress, prompting).await;
                let text = self.client.generate_content(&model, &self.prompt, docs).await?;
                parse_statements(extract_json(&text)?)
            }
        })
        .await?;

        info!(
            "Extracted {} year(s) from {} with {}",
            outcome.value.len(),
            document.display_name,
            outcome.model
        );
        self.send_event(
            progress,
            ExtractionEvent::DocumentExtracted {
                document: document.display_name.clone(),
                years: outcome.value.keys().cloned().collect(),
            },
        )
        .await;

        Ok(outcome.value)
    }

    /// Uploads each local file, extracts it, and merges the results by year. Uploaded files
    /// are deleted afterwards whether or not extraction succeeded.
    pub async fn extract_files(
        &self,
        paths: &[PathBuf],
        progress: &Option<Sender<ExtractionEvent>>,
    ) -> Result<RawStatements> {
        let mut uploaded = Vec::new();
        let result = self.upload_and_extract(paths, &mut uploaded, progress).await;

        for (document, outcome) in uploaded
            .iter()
            .zip(join_all(uploaded.iter().map(|doc| self.client.delete_document(doc))).await)
        {
            if let Err(e) = outcome {
                warn!("Could not delete uploaded file {}: {}", document.name, e);
            }
        }

        result
    }

    /// Downloads each URL to a temporary file, then behaves like [`Self::extract_files`].
    /// Temporary files are always removed.
    pub async fn extract_urls(
        &self,
        urls: &[String],
        progress: &Option<Sender<ExtractionEvent>>,
    ) -> Result<RawStatements> {
        let mut downloaded = Vec::new();
        let mut result = Ok(RawStatements::new());

        for url in urls {
            self.send_event(progress, ExtractionEvent::Downloading { url: url.clone() })
                .await;
            match self.client.download_document(url).await {
                Ok(path) => downloaded.push(path),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        if result.is_ok() {
            result = self.extract_files(&downloaded, progress).await;
        }

        for path in &downloaded {
            if let Err(e) = remove_local_file(path).await {
                warn!("Could not remove temporary file {}: {}", path.display(), e);
            }
        }

        result
    }

    /// Full pipeline: download, extract, merge and compute ratios.
    pub async fn analyze_urls(
        &self,
        urls: &[String],
        progress: Option<Sender<ExtractionEvent>>,
    ) -> Result<FinancialAnalysis> {
        self.send_event(&progress, ExtractionEvent::Starting).await;

        match self.extract_urls(urls, &progress).await {
            Ok(statements) => {
                self.send_event(&progress, ExtractionEvent::ComputingRatios)
                    .await;
                let analysis = RatioProcessor::analyze(statements);
                self.send_event(&progress, ExtractionEvent::Success).await;
                Ok(analysis)
            }
            Err(e) => {
                self.send_event(
                    &progress,
                    ExtractionEvent::Failed {
                        reason: e.to_string(),
                    },
                )
                .await;
                Err(e)
            }
        }
    }

    async fn upload_and_extract(
        &self,
        paths: &[PathBuf],
        uploaded: &mut Vec<RemoteDocument>,
        progress: &Option<Sender<ExtractionEvent>>,
    ) -> Result<RawStatements> {
        let mut batches = Vec::with_capacity(paths.len());

        for path in paths {
            self.send_event(
                progress,
                ExtractionEvent::Uploading {
                    filename: display_name(path),
                },
            )
            .await;
            let document = self.client.upload_document(path).await?;
            uploaded.push(document.clone());
            batches.push(self.extract_document(&document, progress).await?);
        }

        Ok(merge_statements(batches))
    }

    async fn send_event(&self, sender: &Option<Sender<ExtractionEvent>>, event: ExtractionEvent) {
        if let Some(tx) = sender {
            let _ = tx.send(event).await;
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
