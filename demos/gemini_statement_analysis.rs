use dotenv::dotenv;
use financial_ratio_engine::llm::{ExtractionEvent, GeminiClient, GeminiConfig, StatementExtractor};
use std::error::Error;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = GeminiConfig::from_env().ok_or("GEMINI_API_KEY must be set")?;
    let urls: Vec<String> = std::env::var("STATEMENT_URLS")
        .map_err(|_| "STATEMENT_URLS must list one PDF URL per year, comma-separated")?
        .split(',')
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    println!("🚀 Analyzing {} statement(s) with models {:?}", urls.len(), config.models);

    let extractor = StatementExtractor::new(GeminiClient::new(config))?;

    let (tx, mut rx) = mpsc::channel(32);
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ExtractionEvent::Downloading { url } => println!("⬇️  Downloading {}", url),
                ExtractionEvent::Uploading { filename } => println!("📤 Uploading {}", filename),
                ExtractionEvent::Prompting { document, model } => {
                    println!("🤖 Asking {} about {}", model, document)
                }
                ExtractionEvent::ModelFailed { model, error } => {
                    println!("⚠️  {} failed: {}", model, error)
                }
                ExtractionEvent::DocumentExtracted { document, years } => {
                    println!("✅ {}: years {:?}", document, years)
                }
                ExtractionEvent::Failed { reason } => println!("❌ {}", reason),
                other => println!("   {:?}", other),
            }
        }
    });

    let result = extractor.analyze_urls(&urls, Some(tx)).await;
    progress.await?;

    let analysis = result?;
    println!("\n{}", analysis.razones.to_markdown());
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
