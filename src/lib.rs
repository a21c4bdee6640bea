//! # Financial Ratio Engine
//!
//! A library for turning per-year balance sheet line items (extracted from scanned or PDF
//! statements by a generative model) into standardized bank-style financial ratios.
//!
//! ## Core Concepts
//!
//! - **Raw statements**: `year → label → value`, where labels are free text and values may be
//!   numbers, formatted strings (`"(1,000)"`, `"$2,500 MXN"`), empty strings or `"n/a"`
//! - **Canonical fields**: the fixed catalog of line items the engine recognizes; labels are
//!   matched case-insensitively and unknown labels are dropped
//! - **Null propagation**: a missing or unparsable value never raises, it turns every ratio that
//!   depends on it into `null`
//! - **Trends**: year-over-year percentage changes for revenue, net result and total assets,
//!   attached to every year except the first
//!
//! ## Example
//!
//! ```rust
//! use financial_ratio_engine::*;
//!
//! let model_output = r#"Aquí está el resultado:
//! {
//!   "2019": { "Total Activo Circulante": "10,500,000", "Total Pasivo a Corto Plazo": "6500" },
//!   "2020": { "Total Activo Circulante": "12,000,000", "Total Pasivo a Corto Plazo": "7000" }
//! }
//! Avísame si necesitas algo más."#;
//!
//! let statements = parse_statements(extract_json(model_output).unwrap()).unwrap();
//! let report = compute_financial_ratios(&statements);
//!
//! assert_eq!(report.get("2019").unwrap().ratio(RatioName::RazonCorriente), Some(1615.38));
//! assert!(report.get("2019").unwrap().trends.is_none());
//! assert!(report.get("2020").unwrap().trends.is_some());
//! ```

pub mod engine;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod response;
pub mod schema;
pub mod trends;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

pub use engine::{RatioEngine, TrendBasis, YearComputation};
pub use error::{FinancialRatioError, Result};
pub use ingestion::*;
pub use report::{FinancialAnalysis, RatioReport};
pub use response::extract_json;
pub use schema::*;
pub use trends::{percentage_change, TrendCalculator};
pub use utils::*;

use log::{debug, info};

pub struct RatioProcessor;

impl RatioProcessor {
    /// Normalizes every year, computes its ratios and appends year-over-year trends.
    ///
    /// Years are processed in ascending lexicographic order of their keys, and the report holds
    /// exactly one entry per input year.
    pub fn process(statements: &RawStatements) -> RatioReport {
        info!("Computing financial ratios for {} year(s)", statements.len());

        let per_year: Vec<(String, YearComputation)> = statements
            .iter()
            .map(|(year, raw)| {
                let normalized = normalize_statement(raw);
                debug!(
                    "Year {}: {} of {} line items recognized",
                    year,
                    normalized.len(),
                    raw.len()
                );
                (year.clone(), RatioEngine::compute_year(&normalized))
            })
            .collect();

        RatioReport::new(TrendCalculator::append_trends(&per_year))
    }

    /// Entry point for caller-corrected data. Unlike [`RatioProcessor::process`], an empty
    /// request is rejected.
    pub fn recalculate(statements: &RawStatements) -> Result<RatioReport> {
        if statements.is_empty() {
            return Err(FinancialRatioError::EmptyInput);
        }
        Ok(Self::process(statements))
    }

    /// Computes ratios and keeps the raw data they were computed from.
    pub fn analyze(statements: RawStatements) -> FinancialAnalysis {
        let razones = Self::process(&statements);
        FinancialAnalysis {
            datos_por_anio: statements,
            razones,
        }
    }

    /// Recovers statements from raw model output and computes their ratios. Fails before any
    /// computation if the text holds no usable JSON.
    pub fn process_model_output(text: &str) -> Result<RatioReport> {
        let statements = parse_statements(extract_json(text)?)?;
        Ok(Self::process(&statements))
    }
}

pub fn compute_financial_ratios(statements: &RawStatements) -> RatioReport {
    RatioProcessor::process(statements)
}
